// SPDX-License-Identifier: MIT OR Apache-2.0
//! Camera presets.

use serde::{Deserialize, Serialize};

/// Point the camera looks at for every preset
pub const CAMERA_TARGET: [f64; 3] = [0.0, 0.0, 0.0];

/// Named camera position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum CameraView {
    /// Facing the doors
    #[default]
    Front,
    /// From the right side of the building
    Side,
    /// Looking straight down
    Top,
}

impl CameraView {
    /// Get the display name
    pub fn name(&self) -> &'static str {
        match self {
            CameraView::Front => "Front",
            CameraView::Side => "Side",
            CameraView::Top => "Top",
        }
    }

    /// Eye position of this preset
    pub fn eye(&self) -> [f64; 3] {
        match self {
            CameraView::Front => [0.0, 5.0, 10.0],
            CameraView::Side => [10.0, 5.0, 0.0],
            CameraView::Top => [0.0, 15.0, 0.0],
        }
    }
}

/// Perspective camera placed by a preset
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Camera {
    /// Active preset
    pub view: CameraView,
    /// Eye position
    pub eye: [f64; 3],
    /// Look-at point
    pub target: [f64; 3],
    /// Vertical field of view in degrees
    pub fov_degrees: f64,
    /// Width over height
    pub aspect: f64,
    /// Near clip plane
    pub near: f64,
    /// Far clip plane
    pub far: f64,
}

impl Camera {
    /// Create a camera at a preset
    pub fn new(view: CameraView, aspect: f64) -> Self {
        Self {
            view,
            eye: view.eye(),
            target: CAMERA_TARGET,
            fov_degrees: 75.0,
            aspect,
            near: 0.1,
            far: 1000.0,
        }
    }

    /// Jump to another preset, keeping the lens
    pub fn set_view(&mut self, view: CameraView) {
        self.view = view;
        self.eye = view.eye();
        self.target = CAMERA_TARGET;
        tracing::debug!("Camera view: {}", view.name());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets() {
        assert_eq!(CameraView::Front.eye(), [0.0, 5.0, 10.0]);
        assert_eq!(CameraView::Side.eye(), [10.0, 5.0, 0.0]);
        assert_eq!(CameraView::Top.eye(), [0.0, 15.0, 0.0]);
    }

    #[test]
    fn test_set_view_keeps_lens() {
        let mut camera = Camera::new(CameraView::Front, 16.0 / 9.0);
        camera.set_view(CameraView::Top);
        assert_eq!(camera.eye, [0.0, 15.0, 0.0]);
        assert_eq!(camera.target, CAMERA_TARGET);
        assert_eq!(camera.fov_degrees, 75.0);
    }
}
