//! Camera module: the frame session and its view volume.
//!
//! A [`Camera`] owns render targets on a raster device and drives the whole
//! per-frame pipeline. Cameras are owned by the caller; the engine keeps no
//! list of them.

mod camera;
mod camera_config;
mod debug_info;
mod frustum;
mod render_targets;

pub use camera::Camera;
pub use camera_config::{CameraConfig, LightFocus, AccumulationMode};
pub use debug_info::{DebugInfo, DEBUG_WINDOW_SIZE};
pub use frustum::{SphereFactors, ViewFrustum};
