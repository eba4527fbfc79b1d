/*!
# Prism 3D Engine

Per-frame 3D render pipeline drawing onto 2D raster targets.

The engine does not own a rasterizer. It culls, sorts, batches and
transforms geometry on the CPU, then hands screen-space triangle streams and
fragment programs to a backend implementing [`prism3d::raster::RasterDevice`]
(see the `prism_3d_engine_renderer_soft` crate).

## Architecture

- **Camera**: frame session owning the render targets, the projection and the scratch arena
- **Scene**: models, lights, world settings, sectors and dynamic batches
- **Resource**: immutable meshes and materials shared through `Arc`
- **Raster**: the backend contract (images, triangle draws, fragment programs)
*/

// Internal modules
mod error;
mod engine;
mod pipeline;
pub mod log;
pub mod raster;
pub mod resource;
pub mod scene;
pub mod camera;

// Main prism3d namespace module
pub mod prism3d {
    // Error types
    pub use crate::error::{Error, Result};

    // Engine singleton
    pub use crate::engine::{Engine, SharedRasterDevice};

    // Camera (frame session)
    pub use crate::camera::{
        Camera, CameraConfig, LightFocus, AccumulationMode, DebugInfo, ViewFrustum, SphereFactors,
    };

    // Logging sub-module (types only, macros are exported at the crate root)
    pub mod log {
        pub use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger};
    }

    // Rasterizer contract
    pub mod raster {
        pub use crate::raster::*;
    }

    // Resource sub-module
    pub mod resource {
        pub use crate::resource::*;
    }

    // Scene sub-module
    pub mod scene {
        pub use crate::scene::*;
    }
}

// Re-export math library at crate root
pub use glam;
