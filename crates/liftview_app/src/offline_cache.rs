// SPDX-License-Identifier: MIT OR Apache-2.0
//! Versioned cache-first store for the viewer's page assets.
//!
//! Lifecycle:
//! - `install` fetches the whole manifest into the cache named after the
//!   current version; one failed entry fails the install and stores nothing
//! - `activate` deletes every cache whose name is not the current version
//! - `fetch` answers from any cache first, then from the network, storing
//!   successful same-origin responses; offline `.html` requests fall back
//!   to the cached index page

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Cache name of the current release
pub const DEFAULT_CACHE_NAME: &str = "elevator-app-v1";

/// Page served for offline navigations
pub const OFFLINE_FALLBACK: &str = "./index.html";

/// Response origin class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResponseKind {
    /// Same-origin
    Basic,
    /// Cross-origin with CORS
    Cors,
    /// Cross-origin without CORS
    Opaque,
}

/// A fetched resource
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    /// HTTP status
    pub status: u16,
    /// Origin class
    pub kind: ResponseKind,
    /// Body bytes
    pub body: Vec<u8>,
}

impl Response {
    /// A same-origin `200` response
    pub fn ok(body: impl Into<Vec<u8>>) -> Self {
        Self {
            status: 200,
            kind: ResponseKind::Basic,
            body: body.into(),
        }
    }

    /// Whether a runtime fetch of this response may be stored
    pub fn is_cacheable(&self) -> bool {
        self.status == 200 && self.kind == ResponseKind::Basic
    }

    /// Whether the status is in the 2xx range
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Offline cache errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CacheError {
    /// The network could not be reached
    #[error("Network error for {url}: {reason}")]
    Network {
        /// Requested URL
        url: String,
        /// What went wrong
        reason: String,
    },
    /// A manifest entry could not be cached
    #[error("Failed to cache {url}: {reason}")]
    Install {
        /// Manifest entry
        url: String,
        /// What went wrong
        reason: String,
    },
    /// Offline with no cached fallback
    #[error("Offline and not cached: {0}")]
    Offline(String),
}

/// Source of responses on a cache miss
pub trait Network {
    /// Fetch `url`
    fn fetch(&self, url: &str) -> Result<Response, CacheError>;
}

/// Offline cache settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OfflineSettings {
    /// Version tag; every other cache is deleted on activation
    pub cache_name: String,
    /// Entries fetched at install time
    pub manifest: Vec<String>,
    /// Directory the page is served from
    pub root: PathBuf,
}

impl Default for OfflineSettings {
    fn default() -> Self {
        Self {
            cache_name: DEFAULT_CACHE_NAME.to_string(),
            manifest: vec![
                "./".to_string(),
                "./index.html".to_string(),
                "./elevator.js".to_string(),
                "./manifest.json".to_string(),
                "./icons/icon-192.png".to_string(),
                "./icons/icon-512.png".to_string(),
                "https://cdnjs.cloudflare.com/ajax/libs/three.js/r128/three.min.js".to_string(),
                "https://cdn.jsdelivr.net/npm/three@0.128.0/examples/js/controls/OrbitControls.js"
                    .to_string(),
            ],
            root: PathBuf::from("web"),
        }
    }
}

/// Named caches, each mapping URL to response
#[derive(Debug, Clone, Default)]
pub struct CacheStorage {
    caches: IndexMap<String, IndexMap<String, Response>>,
}

impl CacheStorage {
    /// Create empty storage
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a cache, creating it if needed
    pub fn open(&mut self, name: &str) -> &mut IndexMap<String, Response> {
        self.caches.entry(name.to_string()).or_default()
    }

    /// Names of all caches, oldest first
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.caches.keys().map(String::as_str)
    }

    /// Delete a cache. Returns whether it existed.
    pub fn delete(&mut self, name: &str) -> bool {
        self.caches.shift_remove(name).is_some()
    }

    /// Look `url` up in every cache, oldest cache first
    pub fn match_url(&self, url: &str) -> Option<&Response> {
        self.caches.values().find_map(|cache| cache.get(url))
    }

    /// Number of entries in one cache
    pub fn len_of(&self, name: &str) -> usize {
        self.caches.get(name).map_or(0, IndexMap::len)
    }
}

/// Cache-first store bound to one version
#[derive(Debug, Clone)]
pub struct OfflineCache {
    settings: OfflineSettings,
    storage: CacheStorage,
}

impl OfflineCache {
    /// Create a cache over empty storage
    pub fn new(settings: OfflineSettings) -> Self {
        Self::with_storage(settings, CacheStorage::new())
    }

    /// Create a cache over existing storage (e.g. left by an older version)
    pub fn with_storage(settings: OfflineSettings, storage: CacheStorage) -> Self {
        Self { settings, storage }
    }

    /// Name of the current cache
    pub fn cache_name(&self) -> &str {
        &self.settings.cache_name
    }

    /// Underlying storage
    pub fn storage(&self) -> &CacheStorage {
        &self.storage
    }

    /// Fetch every manifest entry into the current cache.
    ///
    /// All or nothing: the cache is only written once every entry
    /// fetched successfully.
    pub fn install(&mut self, network: &impl Network) -> Result<usize, CacheError> {
        tracing::debug!("Opening cache {}", self.settings.cache_name);

        let mut fetched = Vec::with_capacity(self.settings.manifest.len());
        for url in &self.settings.manifest {
            let response = network.fetch(url).map_err(|e| CacheError::Install {
                url: url.clone(),
                reason: e.to_string(),
            })?;
            if !response.is_success() {
                return Err(CacheError::Install {
                    url: url.clone(),
                    reason: format!("status {}", response.status),
                });
            }
            fetched.push((url.clone(), response));
        }

        let count = fetched.len();
        let cache = self.storage.open(&self.settings.cache_name);
        cache.extend(fetched);

        tracing::info!("Cached {} entries in {}", count, self.settings.cache_name);
        Ok(count)
    }

    /// Delete every cache but the current one. Returns the deleted names.
    pub fn activate(&mut self) -> Vec<String> {
        let stale: Vec<String> = self
            .storage
            .keys()
            .filter(|name| *name != self.settings.cache_name)
            .map(str::to_string)
            .collect();

        for name in &stale {
            tracing::info!("Deleting old cache: {}", name);
            self.storage.delete(name);
        }

        tracing::info!("Cache {} active", self.settings.cache_name);
        stale
    }

    /// Cache-first fetch with network fallback
    pub fn fetch(&mut self, url: &str, network: &impl Network) -> Result<Response, CacheError> {
        if let Some(hit) = self.storage.match_url(url) {
            return Ok(hit.clone());
        }

        match network.fetch(url) {
            Ok(response) => {
                if response.is_cacheable() {
                    self.storage
                        .open(&self.settings.cache_name)
                        .insert(url.to_string(), response.clone());
                }
                Ok(response)
            }
            Err(e) if url.contains(".html") => {
                tracing::debug!("Serving offline fallback for {url}: {e}");
                self.storage
                    .match_url(OFFLINE_FALLBACK)
                    .cloned()
                    .ok_or_else(|| CacheError::Offline(url.to_string()))
            }
            Err(e) => Err(e),
        }
    }
}

/// Serves `./`-relative URLs from a local directory; everything else is unreachable
#[derive(Debug, Clone)]
pub struct DirectoryNetwork {
    root: PathBuf,
}

impl DirectoryNetwork {
    /// Serve files under `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl Network for DirectoryNetwork {
    fn fetch(&self, url: &str) -> Result<Response, CacheError> {
        let Some(relative) = url.strip_prefix("./") else {
            return Err(CacheError::Network {
                url: url.to_string(),
                reason: "unreachable".to_string(),
            });
        };
        let relative = if relative.is_empty() {
            "index.html"
        } else {
            relative
        };

        match std::fs::read(self.root.join(relative)) {
            Ok(body) => Ok(Response::ok(body)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Response {
                status: 404,
                kind: ResponseKind::Basic,
                body: Vec::new(),
            }),
            Err(e) => Err(CacheError::Network {
                url: url.to_string(),
                reason: e.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::collections::HashMap;

    struct MockNetwork {
        responses: HashMap<String, Response>,
        online: bool,
        calls: Cell<usize>,
    }

    impl MockNetwork {
        fn new(entries: &[(&str, Response)]) -> Self {
            Self {
                responses: entries
                    .iter()
                    .map(|(url, r)| (url.to_string(), r.clone()))
                    .collect(),
                online: true,
                calls: Cell::new(0),
            }
        }
    }

    impl Network for MockNetwork {
        fn fetch(&self, url: &str) -> Result<Response, CacheError> {
            self.calls.set(self.calls.get() + 1);
            if !self.online {
                return Err(CacheError::Network {
                    url: url.to_string(),
                    reason: "offline".to_string(),
                });
            }
            Ok(self.responses.get(url).cloned().unwrap_or(Response {
                status: 404,
                kind: ResponseKind::Basic,
                body: Vec::new(),
            }))
        }
    }

    fn settings(manifest: &[&str]) -> OfflineSettings {
        OfflineSettings {
            cache_name: "elevator-app-v2".to_string(),
            manifest: manifest.iter().map(|s| s.to_string()).collect(),
            root: PathBuf::from("web"),
        }
    }

    #[test]
    fn test_install_caches_manifest() {
        let net = MockNetwork::new(&[
            ("./", Response::ok("root")),
            ("./index.html", Response::ok("index")),
        ]);
        let mut cache = OfflineCache::new(settings(&["./", "./index.html"]));

        assert_eq!(cache.install(&net), Ok(2));
        assert_eq!(cache.storage().len_of("elevator-app-v2"), 2);
    }

    #[test]
    fn test_install_is_all_or_nothing() {
        let net = MockNetwork::new(&[("./index.html", Response::ok("index"))]);
        let mut cache = OfflineCache::new(settings(&["./index.html", "./missing.js"]));

        let err = cache.install(&net).unwrap_err();
        assert!(matches!(err, CacheError::Install { ref url, .. } if url == "./missing.js"));
        assert_eq!(cache.storage().len_of("elevator-app-v2"), 0);
    }

    #[test]
    fn test_activate_deletes_other_versions() {
        let mut storage = CacheStorage::new();
        storage.open("elevator-app-v1").insert("./".to_string(), Response::ok("old"));
        storage.open("scratch").insert("./x".to_string(), Response::ok("x"));
        let mut cache = OfflineCache::with_storage(settings(&[]), storage);
        cache.storage.open("elevator-app-v2");

        let deleted = cache.activate();
        assert_eq!(deleted, vec!["elevator-app-v1".to_string(), "scratch".to_string()]);
        assert_eq!(cache.storage().keys().collect::<Vec<_>>(), vec!["elevator-app-v2"]);
    }

    #[test]
    fn test_fetch_prefers_cache() {
        let net = MockNetwork::new(&[("./index.html", Response::ok("index"))]);
        let mut cache = OfflineCache::new(settings(&["./index.html"]));
        cache.install(&net).unwrap();
        let calls = net.calls.get();

        let response = cache.fetch("./index.html", &net).unwrap();
        assert_eq!(response.body, b"index");
        assert_eq!(net.calls.get(), calls);
    }

    #[test]
    fn test_fetch_stores_only_same_origin_ok() {
        let opaque = Response {
            status: 200,
            kind: ResponseKind::Opaque,
            body: b"cdn".to_vec(),
        };
        let net = MockNetwork::new(&[
            ("./app.js", Response::ok("app")),
            ("https://cdn.example/three.js", opaque),
        ]);
        let mut cache = OfflineCache::new(settings(&[]));

        cache.fetch("./app.js", &net).unwrap();
        cache.fetch("https://cdn.example/three.js", &net).unwrap();
        let missing = cache.fetch("./nope.png", &net).unwrap();

        assert_eq!(missing.status, 404);
        assert!(cache.storage().match_url("./app.js").is_some());
        assert!(cache.storage().match_url("https://cdn.example/three.js").is_none());
        assert!(cache.storage().match_url("./nope.png").is_none());
    }

    #[test]
    fn test_offline_html_falls_back_to_index() {
        let mut net = MockNetwork::new(&[("./index.html", Response::ok("index"))]);
        let mut cache = OfflineCache::new(settings(&["./index.html"]));
        cache.install(&net).unwrap();
        net.online = false;

        let page = cache.fetch("./floors.html", &net).unwrap();
        assert_eq!(page.body, b"index");

        let err = cache.fetch("./elevator.js", &net).unwrap_err();
        assert!(matches!(err, CacheError::Network { .. }));
    }

    #[test]
    fn test_offline_html_without_index() {
        let mut net = MockNetwork::new(&[]);
        net.online = false;
        let mut cache = OfflineCache::new(settings(&[]));
        assert_eq!(
            cache.fetch("./about.html", &net),
            Err(CacheError::Offline("./about.html".to_string()))
        );
    }

    #[test]
    fn test_default_manifest_needs_the_cdn() {
        let dir = std::env::temp_dir().join(format!("liftview-manifest-{}", std::process::id()));
        std::fs::create_dir_all(dir.join("icons")).unwrap();
        for file in ["index.html", "elevator.js", "manifest.json", "icons/icon-192.png", "icons/icon-512.png"] {
            std::fs::write(dir.join(file), file).unwrap();
        }

        let settings = OfflineSettings::default();
        assert_eq!(settings.manifest.len(), 8);
        assert!(settings.manifest.contains(&"./elevator.js".to_string()));

        let mut cache = OfflineCache::new(settings);
        let err = cache.install(&DirectoryNetwork::new(&dir)).unwrap_err();
        assert!(matches!(err, CacheError::Install { ref url, .. } if url.starts_with("https://cdnjs")));
        assert_eq!(cache.storage().len_of(DEFAULT_CACHE_NAME), 0);

        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn test_directory_network() {
        let dir = std::env::temp_dir().join(format!("liftview-offline-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("index.html"), "<html>").unwrap();

        let net = DirectoryNetwork::new(&dir);
        assert_eq!(net.fetch("./").unwrap().body, b"<html>");
        assert_eq!(net.fetch("./index.html").unwrap().status, 200);
        assert_eq!(net.fetch("./gone.css").unwrap().status, 404);
        assert!(net.fetch("https://cdn.example/x.js").is_err());

        let _ = std::fs::remove_dir_all(dir);
    }
}
