//! Raster module: the contract between the pipeline and a triangle rasterizer.
//!
//! The engine never touches pixels itself. It produces device-space vertex and
//! index streams and hands them to a [`RasterDevice`] together with a
//! [`FragmentProgram`], up to four bound source images and a blend mode.
//! Backends (CPU, GPU) live in their own crates.

mod raster_device;
mod vertex;
mod program;
mod depth_codec;
mod builtin_programs;

#[cfg(test)]
pub(crate) mod mock_raster_device;

pub use raster_device::{
    RasterDevice, ImageKey, ImageDesc, BlendMode, DrawTriangles, DrawImageOptions,
    MAX_SOURCE_IMAGES,
};
pub use vertex::{
    RasterVertex, MAX_VERTICES, MAX_TRIANGLES_PER_DRAW, CUSTOM_DEPTH, CUSTOM_INV_W,
};
pub use program::{FragmentProgram, Fragment, SourceImages, Uniforms, ParamValue};
pub use depth_codec::{encode_depth, decode_depth, quantize_depth, depth_bits};
pub use builtin_programs::{
    DepthTestProgram, ClipAlphaCompositeProgram, ColorProgram, ALPHA_CLIP_THRESHOLD,
};
