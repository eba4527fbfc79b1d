/// Camera render target set.
///
/// All images share the camera resolution except the 1x1 white texture bound
/// for untextured materials.

use crate::error::Result;
use crate::engine_debug;
use crate::raster::{ImageDesc, ImageKey, RasterDevice};
use crate::pipeline::dispatcher::PassTargets;

#[derive(Debug, Clone, Copy)]
pub(crate) struct RenderTargets {
    pub width: u32,
    pub height: u32,
    pub color: ImageKey,
    pub depth: ImageKey,
    pub normal: ImageKey,
    pub accumulation: ImageKey,
    pub accumulation_scratch: ImageKey,
    pub depth_intermediate: ImageKey,
    pub clip_intermediate: ImageKey,
    pub white: ImageKey,
}

impl RenderTargets {
    /// Allocate every target on `device`
    ///
    /// On failure the images created so far are destroyed again.
    pub fn create(device: &mut dyn RasterDevice, name: &str, width: u32, height: u32) -> Result<Self> {
        let mut created = Vec::with_capacity(8);
        let result = Self::create_all(device, name, width, height, &mut created);
        if result.is_err() {
            for image in created {
                device.destroy_image(image);
            }
        }
        result
    }

    fn create_all(
        device: &mut dyn RasterDevice,
        name: &str,
        width: u32,
        height: u32,
        created: &mut Vec<ImageKey>,
    ) -> Result<Self> {
        let mut image = |suffix: &str, w: u32, h: u32| -> Result<ImageKey> {
            let key = device.create_image(&ImageDesc::new(&format!("{}.{}", name, suffix), w, h))?;
            created.push(key);
            Ok(key)
        };

        let targets = Self {
            width,
            height,
            color: image("color", width, height)?,
            depth: image("depth", width, height)?,
            normal: image("normal", width, height)?,
            accumulation: image("accumulation", width, height)?,
            accumulation_scratch: image("accumulation_scratch", width, height)?,
            depth_intermediate: image("depth_intermediate", width, height)?,
            clip_intermediate: image("clip_intermediate", width, height)?,
            white: image("white", 1, 1)?,
        };
        device.clear_image(targets.white, glam::Vec4::ONE)?;

        engine_debug!("prism3d::Camera", "Camera '{}': allocated {}x{} render targets", name, width, height);
        Ok(targets)
    }

    pub fn destroy(&self, device: &mut dyn RasterDevice) {
        for image in self.all() {
            device.destroy_image(image);
        }
    }

    fn all(&self) -> [ImageKey; 8] {
        [
            self.color,
            self.depth,
            self.normal,
            self.accumulation,
            self.accumulation_scratch,
            self.depth_intermediate,
            self.clip_intermediate,
            self.white,
        ]
    }

    /// Images the dispatcher draws into this frame
    pub fn passes(&self, render_normals: bool) -> PassTargets {
        PassTargets {
            color: self.color,
            depth: self.depth,
            depth_intermediate: self.depth_intermediate,
            clip_intermediate: self.clip_intermediate,
            normal: render_normals.then_some(self.normal),
            white: self.white,
        }
    }
}
