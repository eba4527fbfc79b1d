/// Mock RasterDevice for unit tests (no pixels)
///
/// Records every command as a short string so tests can assert the exact pass
/// sequence issued by the dispatcher and the camera.

use glam::Vec4;
use slotmap::SlotMap;
use crate::error::Result;
use crate::engine_bail;
use super::raster_device::{BlendMode, DrawImageOptions, DrawTriangles, ImageDesc, ImageKey, RasterDevice};

struct MockImage {
    name: String,
    width: u32,
    height: u32,
}

/// Summary of one recorded draw_triangles call
#[derive(Debug, Clone)]
pub struct MockDraw {
    pub target: String,
    pub program: String,
    pub images: Vec<Option<String>>,
    pub vertex_count: usize,
    pub index_count: usize,
    pub alpha_clip: bool,
    pub blend: BlendMode,
}

pub struct MockRasterDevice {
    images: SlotMap<ImageKey, MockImage>,
    pub commands: Vec<String>,
    pub draws: Vec<MockDraw>,
}

impl MockRasterDevice {
    pub fn new() -> Self {
        Self {
            images: SlotMap::with_key(),
            commands: Vec::new(),
            draws: Vec::new(),
        }
    }

    pub fn image_name(&self, image: ImageKey) -> String {
        self.images
            .get(image)
            .map(|i| i.name.clone())
            .unwrap_or_else(|| "<unknown>".to_string())
    }

    pub fn image_count(&self) -> usize {
        self.images.len()
    }

    /// Forget everything recorded so far (images are kept)
    pub fn clear_log(&mut self) {
        self.commands.clear();
        self.draws.clear();
    }

    /// Commands starting with `prefix`
    pub fn commands_with(&self, prefix: &str) -> Vec<&str> {
        self.commands
            .iter()
            .filter(|c| c.starts_with(prefix))
            .map(|c| c.as_str())
            .collect()
    }
}

impl RasterDevice for MockRasterDevice {
    fn create_image(&mut self, desc: &ImageDesc) -> Result<ImageKey> {
        desc.validate()?;
        self.commands.push(format!("create:{}:{}x{}", desc.name, desc.width, desc.height));
        Ok(self.images.insert(MockImage {
            name: desc.name.clone(),
            width: desc.width,
            height: desc.height,
        }))
    }

    fn destroy_image(&mut self, image: ImageKey) {
        if let Some(removed) = self.images.remove(image) {
            self.commands.push(format!("destroy:{}", removed.name));
        }
    }

    fn image_size(&self, image: ImageKey) -> Option<(u32, u32)> {
        self.images.get(image).map(|i| (i.width, i.height))
    }

    fn clear_image(&mut self, image: ImageKey, _color: Vec4) -> Result<()> {
        if !self.images.contains_key(image) {
            engine_bail!("prism3d::MockRasterDevice", "clear of unknown image");
        }
        self.commands.push(format!("clear:{}", self.image_name(image)));
        Ok(())
    }

    fn draw_triangles(&mut self, target: ImageKey, draw: &DrawTriangles<'_>) -> Result<()> {
        draw.validate(target)?;
        let record = MockDraw {
            target: self.image_name(target),
            program: draw.program.name().to_string(),
            images: draw.images.iter().map(|i| i.map(|k| self.image_name(k))).collect(),
            vertex_count: draw.vertices.len(),
            index_count: draw.indices.len(),
            alpha_clip: draw.uniforms.alpha_clip,
            blend: draw.blend,
        };
        self.commands.push(format!("draw:{}:{}", record.target, record.program));
        self.draws.push(record);
        Ok(())
    }

    fn draw_image(&mut self, target: ImageKey, source: ImageKey, _options: &DrawImageOptions) -> Result<()> {
        if target == source {
            engine_bail!("prism3d::MockRasterDevice", "draw_image onto itself");
        }
        self.commands.push(format!(
            "blit:{}<-{}",
            self.image_name(target),
            self.image_name(source)
        ));
        Ok(())
    }

    fn read_pixels(&self, image: ImageKey) -> Result<Vec<Vec4>> {
        match self.images.get(image) {
            Some(i) => Ok(vec![Vec4::ZERO; (i.width * i.height) as usize]),
            None => engine_bail!(InvalidResource, "prism3d::MockRasterDevice", "unknown image"),
        }
    }
}
