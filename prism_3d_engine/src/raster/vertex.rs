/// Device-space vertex layout consumed by rasterizer backends.

use bytemuck::{Pod, Zeroable};

/// Largest vertex count a single draw call can address (u16 indices)
pub const MAX_VERTICES: usize = u16::MAX as usize;

/// Triangle count at which a mesh part saturates the index range of one draw
pub const MAX_TRIANGLES_PER_DRAW: usize = MAX_VERTICES / 3;

/// `custom` channel holding the normalized depth
pub const CUSTOM_DEPTH: usize = 0;

/// `custom` channel holding `1/w`, used to undo perspective-corrected texturing
pub const CUSTOM_INV_W: usize = 1;

/// One vertex after the vertex processor
///
/// All attributes are interpolated linearly in screen space by the backend.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct RasterVertex {
    /// Destination position in target pixels (origin top-left, Y down)
    pub dst: [f32; 2],
    /// Source texture position in texels (possibly pre-divided by w)
    pub src: [f32; 2],
    /// Straight-alpha vertex color (tint, lighting and fog already applied)
    pub color: [f32; 4],
    /// Extra channels, see `CUSTOM_*`
    pub custom: [f32; 4],
}
