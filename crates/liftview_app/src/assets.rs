// SPDX-License-Identifier: MIT OR Apache-2.0
//! Asynchronous texture loading for the rider and control-panel images.
//!
//! Loads run on a worker thread. Every request produces exactly one
//! [`AssetLoad`] carrying either the decoded texture or an [`AssetError`];
//! the host collects them with [`AssetLoader::poll`] once per frame.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Load state of one requested asset
#[derive(Debug, Clone, PartialEq)]
pub enum AssetState {
    /// Worker is reading or decoding it
    Loading,
    /// Decoded successfully
    Ready {
        /// Width in pixels
        width: u32,
        /// Height in pixels
        height: u32,
    },
    /// Failed to load
    Failed(String),
}

impl fmt::Display for AssetState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetState::Loading => write!(f, "loading"),
            AssetState::Ready { width, height } => write!(f, "ready ({width}x{height})"),
            AssetState::Failed(reason) => write!(f, "failed: {reason}"),
        }
    }
}

/// Errors that can occur while loading a texture
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AssetError {
    /// File not found
    #[error("File not found: {0}")]
    NotFound(String),
    /// Unsupported format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
    /// Image decoding error
    #[error("Failed to decode image: {0}")]
    DecodeError(String),
    /// IO error
    #[error("IO error: {0}")]
    IoError(String),
    /// The worker is gone
    #[error("Asset worker stopped")]
    WorkerStopped,
}

/// Decoded RGBA texture
#[derive(Debug, Clone)]
pub struct LoadedTexture {
    /// RGBA8 pixel data
    pub pixels: Vec<u8>,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

/// Outcome of one load request
#[derive(Debug)]
pub struct AssetLoad {
    /// Requested path
    pub path: PathBuf,
    /// Texture or failure
    pub result: Result<LoadedTexture, AssetError>,
}

/// Texture loader backed by a worker thread
pub struct AssetLoader {
    /// Directory relative asset names resolve against
    root: PathBuf,
    /// Per-path load states
    states: Arc<RwLock<HashMap<PathBuf, AssetState>>>,
    /// Channel for sending load requests
    request_tx: mpsc::UnboundedSender<PathBuf>,
    /// Channel for receiving finished loads
    result_rx: mpsc::UnboundedReceiver<AssetLoad>,
}

impl AssetLoader {
    /// Create a loader resolving names against `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let (request_tx, request_rx) = mpsc::unbounded_channel();
        let (result_tx, result_rx) = mpsc::unbounded_channel();

        std::thread::spawn(move || {
            asset_worker(request_rx, result_tx);
        });

        Self {
            root: root.into(),
            states: Arc::new(RwLock::new(HashMap::new())),
            request_tx,
            result_rx,
        }
    }

    /// Resolve an asset name against the root directory
    pub fn resolve(&self, name: &str) -> PathBuf {
        self.root.join(name.trim_start_matches('/'))
    }

    /// Request a texture by asset name. Returns the resolved path the result will carry.
    ///
    /// A path that is already loading is not requested twice.
    pub fn request(&self, name: &str) -> PathBuf {
        let path = self.resolve(name);
        let mut states = self.states.write();

        if states.get(&path) == Some(&AssetState::Loading) {
            return path;
        }

        if self.request_tx.send(path.clone()).is_err() {
            tracing::warn!("Asset worker stopped, cannot load {}", path.display());
            states.insert(path.clone(), AssetState::Failed(AssetError::WorkerStopped.to_string()));
            return path;
        }

        states.insert(path.clone(), AssetState::Loading);
        path
    }

    /// Collect every load finished since the last poll
    pub fn poll(&mut self) -> Vec<AssetLoad> {
        let mut finished = Vec::new();

        while let Ok(load) = self.result_rx.try_recv() {
            let state = match &load.result {
                Ok(texture) => AssetState::Ready {
                    width: texture.width,
                    height: texture.height,
                },
                Err(e) => AssetState::Failed(e.to_string()),
            };
            match &load.result {
                Ok(texture) => tracing::debug!(
                    "Texture {} {}, {} bytes",
                    load.path.display(),
                    state,
                    texture.pixels.len()
                ),
                Err(_) => tracing::warn!("Texture {} {}", load.path.display(), state),
            }
            self.states.write().insert(load.path.clone(), state);
            finished.push(load);
        }

        finished
    }
}

#[cfg(test)]
impl AssetLoader {
    /// Load state for a path; `None` until requested
    fn state(&self, path: &Path) -> Option<AssetState> {
        self.states.read().get(path).cloned()
    }

    /// Number of loads still in flight
    fn pending_count(&self) -> usize {
        self.states
            .read()
            .values()
            .filter(|s| **s == AssetState::Loading)
            .count()
    }
}

/// Worker thread that processes load requests
fn asset_worker(
    mut request_rx: mpsc::UnboundedReceiver<PathBuf>,
    result_tx: mpsc::UnboundedSender<AssetLoad>,
) {
    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            tracing::error!("Failed to create asset runtime: {e}");
            return;
        }
    };

    rt.block_on(async {
        while let Some(path) = request_rx.recv().await {
            let result = load_texture(&path).await;
            if result_tx.send(AssetLoad { path, result }).is_err() {
                break; // Channel closed
            }
        }
    });
}

/// Read and decode one texture
async fn load_texture(path: &Path) -> Result<LoadedTexture, AssetError> {
    if !path.exists() {
        return Err(AssetError::NotFound(path.display().to_string()));
    }

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .ok_or_else(|| AssetError::UnsupportedFormat("No extension".to_string()))?;

    if !matches!(ext.as_str(), "png" | "jpg" | "jpeg") {
        return Err(AssetError::UnsupportedFormat(ext));
    }

    let data = tokio::fs::read(path)
        .await
        .map_err(|e| AssetError::IoError(e.to_string()))?;

    let img = image::load_from_memory(&data).map_err(|e| AssetError::DecodeError(e.to_string()))?;
    let rgba = img.to_rgba8();

    Ok(LoadedTexture {
        width: rgba.width(),
        height: rgba.height(),
        pixels: rgba.into_raw(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("liftview-assets-{}-{}", name, std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn wait_for(loader: &mut AssetLoader, count: usize) -> Vec<AssetLoad> {
        let deadline = Instant::now() + Duration::from_secs(10);
        let mut loads = Vec::new();
        while loads.len() < count && Instant::now() < deadline {
            loads.extend(loader.poll());
            std::thread::sleep(Duration::from_millis(5));
        }
        loads
    }

    #[test]
    fn test_loads_png() {
        let dir = scratch_dir("png");
        image::RgbaImage::new(3, 2).save(dir.join("cat.png")).unwrap();

        let mut loader = AssetLoader::new(&dir);
        let path = loader.request("/cat.png");
        assert_eq!(path, dir.join("cat.png"));
        assert_eq!(loader.state(&path), Some(AssetState::Loading));

        let loads = wait_for(&mut loader, 1);
        assert_eq!(loads.len(), 1);
        let texture = loads[0].result.as_ref().unwrap();
        assert_eq!((texture.width, texture.height), (3, 2));
        assert_eq!(texture.pixels.len(), 3 * 2 * 4);
        assert_eq!(loader.state(&path), Some(AssetState::Ready { width: 3, height: 2 }));
        assert_eq!(loader.pending_count(), 0);

        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn test_missing_file_fails() {
        let dir = scratch_dir("missing");
        let mut loader = AssetLoader::new(&dir);
        let path = loader.request("panda.png");

        let loads = wait_for(&mut loader, 1);
        assert!(matches!(loads[0].result, Err(AssetError::NotFound(_))));
        assert!(matches!(loader.state(&path), Some(AssetState::Failed(_))));
        assert_eq!(loader.state(&dir.join("other.png")), None);

        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn test_unsupported_and_corrupt_files_fail() {
        let dir = scratch_dir("corrupt");
        std::fs::write(dir.join("notes.txt"), "hello").unwrap();
        std::fs::write(dir.join("broken.png"), "not a png").unwrap();

        let mut loader = AssetLoader::new(&dir);
        loader.request("notes.txt");
        loader.request("broken.png");

        let loads = wait_for(&mut loader, 2);
        assert_eq!(loads.len(), 2);
        assert!(matches!(loads[0].result, Err(AssetError::UnsupportedFormat(_))));
        assert!(matches!(loads[1].result, Err(AssetError::DecodeError(_))));

        let _ = std::fs::remove_dir_all(dir);
    }
}
