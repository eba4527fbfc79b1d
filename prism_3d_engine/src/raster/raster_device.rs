/// RasterDevice trait and draw descriptors.
///
/// A device owns images (render targets and textures alike, addressed by
/// [`ImageKey`]) and draws indexed triangle lists into them. It is the only
/// seam between the pipeline and pixels.

use glam::Vec4;
use slotmap::new_key_type;
use crate::error::Result;
use crate::engine_bail;
use super::program::{FragmentProgram, Uniforms};
use super::vertex::RasterVertex;

/// Number of source images a draw call can bind
pub const MAX_SOURCE_IMAGES: usize = 4;

new_key_type! {
    /// Stable handle to an image owned by a RasterDevice
    pub struct ImageKey;
}

/// Image creation descriptor
#[derive(Debug, Clone)]
pub struct ImageDesc {
    /// Debug name
    pub name: String,
    pub width: u32,
    pub height: u32,
    /// Initial RGBA8 pixels, row-major, `width * height * 4` bytes.
    /// `None` creates a transparent-black image.
    pub pixels: Option<Vec<u8>>,
}

impl ImageDesc {
    pub fn new(name: &str, width: u32, height: u32) -> Self {
        Self {
            name: name.to_string(),
            width,
            height,
            pixels: None,
        }
    }

    pub fn with_pixels(mut self, pixels: Vec<u8>) -> Self {
        self.pixels = Some(pixels);
        self
    }

    /// Check dimensions and pixel buffer length
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            engine_bail!(InvalidResource, "prism3d::RasterDevice",
                "Image '{}' has zero size ({}x{})", self.name, self.width, self.height);
        }
        if let Some(pixels) = &self.pixels {
            let expected = self.width as usize * self.height as usize * 4;
            if pixels.len() != expected {
                engine_bail!(InvalidResource, "prism3d::RasterDevice",
                    "Image '{}': expected {} bytes of RGBA8 data, got {}",
                    self.name, expected, pixels.len());
            }
        }
        Ok(())
    }
}

/// How a fragment is combined with the destination texel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlendMode {
    /// Standard alpha compositing (straight alpha "over")
    #[default]
    SourceOver,
    /// `dst.rgb + src.rgb * src.a`
    Additive,
    /// `dst.rgb * src.rgb`
    Multiply,
    /// Replace the destination texel
    Copy,
    /// Keep whichever color-encoded depth is nearer; an unwritten
    /// destination (alpha 0) always takes the source
    NearestDepth,
}

/// Options for copying one whole image onto another
#[derive(Debug, Clone, Copy)]
pub struct DrawImageOptions {
    pub blend: BlendMode,
    /// Multiplied into every source texel before blending
    pub color_scale: Vec4,
}

impl Default for DrawImageOptions {
    fn default() -> Self {
        Self {
            blend: BlendMode::SourceOver,
            color_scale: Vec4::ONE,
        }
    }
}

/// One indexed triangle-list draw call
pub struct DrawTriangles<'a> {
    pub vertices: &'a [RasterVertex],
    /// Index triples into `vertices`
    pub indices: &'a [u16],
    pub program: &'a dyn FragmentProgram,
    /// Source images visible to the program, by slot
    pub images: [Option<ImageKey>; MAX_SOURCE_IMAGES],
    pub uniforms: Uniforms<'a>,
    pub blend: BlendMode,
}

impl<'a> DrawTriangles<'a> {
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Raw vertex bytes, for backends that upload the stream as-is
    pub fn vertex_bytes(&self) -> &'a [u8] {
        bytemuck::cast_slice(self.vertices)
    }

    /// Check the draw against the target it is about to be issued to
    ///
    /// Rejects index lists that are not whole triangles, indices past the
    /// vertex slice, and a target that is also bound as a source.
    pub fn validate(&self, target: ImageKey) -> Result<()> {
        if self.indices.len() % 3 != 0 {
            engine_bail!("prism3d::RasterDevice",
                "Index count {} is not a multiple of 3", self.indices.len());
        }
        if let Some(&index) = self.indices.iter().find(|&&i| i as usize >= self.vertices.len()) {
            engine_bail!("prism3d::RasterDevice",
                "Index {} out of range ({} vertices)", index, self.vertices.len());
        }
        if self.images.iter().flatten().any(|&image| image == target) {
            engine_bail!("prism3d::RasterDevice",
                "Program '{}' binds its own target as a source image", self.program.name());
        }
        Ok(())
    }
}

/// Triangle rasterizer backend
///
/// Implementations must support at least [`MAX_SOURCE_IMAGES`] bound source
/// images and honor fragment discards (`FragmentProgram::shade` returning
/// `None` leaves the destination texel untouched).
pub trait RasterDevice: Send + Sync {
    /// Create an image (render target or texture)
    fn create_image(&mut self, desc: &ImageDesc) -> Result<ImageKey>;

    /// Destroy an image. Unknown keys are ignored.
    fn destroy_image(&mut self, image: ImageKey);

    /// Image dimensions, `None` for unknown keys
    fn image_size(&self, image: ImageKey) -> Option<(u32, u32)>;

    /// Fill every texel with `color`
    fn clear_image(&mut self, image: ImageKey, color: Vec4) -> Result<()>;

    /// Rasterize an indexed triangle list into `target`
    fn draw_triangles(&mut self, target: ImageKey, draw: &DrawTriangles<'_>) -> Result<()>;

    /// Composite `source` onto `target`, texel for texel from the top-left corner
    fn draw_image(&mut self, target: ImageKey, source: ImageKey, options: &DrawImageOptions) -> Result<()>;

    /// Read back every texel (row-major, straight-alpha RGBA in `[0, 1]`)
    fn read_pixels(&self, image: ImageKey) -> Result<Vec<Vec4>>;
}
