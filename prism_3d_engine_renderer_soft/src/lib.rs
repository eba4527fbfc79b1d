/*!
# Prism3D Engine - Software Raster Backend

CPU implementation of the prism_3d_engine [`RasterDevice`] contract.

Images are kept as straight-alpha `Vec4` texels. Triangles are scan-converted
with edge functions at pixel centers, shaded by the bound fragment program and
blended into the target. No GPU or window is required, which makes this the
reference backend for tests and offscreen rendering.

# Example

```ignore
use std::sync::{Arc, Mutex};
use prism_3d_engine::prism3d::{Camera, CameraConfig, SharedRasterDevice};
use prism_3d_engine_renderer_soft::SoftRasterDevice;

let device: SharedRasterDevice = Arc::new(Mutex::new(SoftRasterDevice::new()));
let mut camera = Camera::new("main", device, CameraConfig::default())?;
```

[`RasterDevice`]: prism_3d_engine::prism3d::raster::RasterDevice
*/

mod soft_device;
mod soft_image;
mod soft_stats;

pub use soft_device::SoftRasterDevice;
pub use soft_stats::SoftStats;
