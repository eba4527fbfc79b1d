/// Multi-pass draw dispatcher.
///
/// Turns the accumulated vertex stream into the sequence of draw calls one
/// material needs: depth, optional alpha-clip composite, depth merge, optional
/// normals, then color.

use glam::{Vec2, Vec4};
use crate::error::Result;
use crate::engine_trace;
use crate::raster::{
    BlendMode, ClipAlphaCompositeProgram, ColorProgram, DepthTestProgram, DrawImageOptions,
    DrawTriangles, FragmentProgram, ImageKey, RasterDevice, RasterVertex, Uniforms,
};
use crate::resource::{Material, TransparencyMode};
use super::arena::{FrameStats, VertexStream};

/// Images the passes of one frame draw into
#[derive(Debug, Clone, Copy)]
pub(crate) struct PassTargets {
    pub color: ImageKey,
    pub depth: ImageKey,
    pub depth_intermediate: ImageKey,
    pub clip_intermediate: ImageKey,
    /// Set when the normal pass is enabled
    pub normal: Option<ImageKey>,
    /// 1x1 white texture bound for untextured materials
    pub white: ImageKey,
}

/// Issues the passes for each flushed stream
pub(crate) struct Dispatcher<'a> {
    pub device: &'a mut dyn RasterDevice,
    pub targets: PassTargets,
    pub render_depth: bool,
    pub perspective_corrected: bool,
}

impl Dispatcher<'_> {
    /// Texture bound for `material`, falling back to white for missing or
    /// unknown images
    pub fn texture_for(&self, material: &Material) -> ImageKey {
        material
            .texture()
            .filter(|&texture| self.device.image_size(texture).is_some())
            .unwrap_or(self.targets.white)
    }

    /// Texel size of the texture bound for `material`
    pub fn texture_size(&self, material: &Material) -> Vec2 {
        self.device
            .image_size(self.texture_for(material))
            .map_or(Vec2::ONE, |(width, height)| Vec2::new(width as f32, height as f32))
    }

    /// Draw the stream with `material` and reset it
    ///
    /// `transparent` keeps the depth written by this draw out of the
    /// persistent depth target. An empty stream issues nothing.
    pub fn flush(
        &mut self,
        material: &Material,
        transparent: bool,
        stream: &mut VertexStream,
        normal_vertices: &mut Vec<RasterVertex>,
        stats: &mut FrameStats,
    ) -> Result<()> {
        if stream.is_empty() {
            stream.reset();
            return Ok(());
        }

        let targets = self.targets;
        let texture = self.texture_for(material);
        let alpha_clip = material.transparency_mode() == TransparencyMode::AlphaClip;
        let uniforms = Uniforms {
            perspective_corrected: self.perspective_corrected,
            alpha_clip,
            params: material.params(),
        };
        let unclipped = Uniforms { alpha_clip: false, ..uniforms };
        let indices = stream.indices.as_slice();

        // ========== DEPTH ==========
        if self.render_depth {
            self.device.clear_image(targets.depth_intermediate, Vec4::ZERO)?;
            let depth_test = DrawTriangles {
                vertices: &stream.vertices,
                indices,
                program: &DepthTestProgram,
                images: [Some(targets.depth), None, None, None],
                uniforms: unclipped,
                blend: BlendMode::NearestDepth,
            };
            if alpha_clip {
                self.device.clear_image(targets.clip_intermediate, Vec4::ZERO)?;
                self.device.draw_triangles(targets.clip_intermediate, &depth_test)?;
                self.device.draw_triangles(targets.depth_intermediate, &DrawTriangles {
                    program: &ClipAlphaCompositeProgram,
                    images: [Some(targets.clip_intermediate), Some(texture), Some(targets.depth), None],
                    uniforms,
                    ..depth_test
                })?;
            } else {
                self.device.draw_triangles(targets.depth_intermediate, &depth_test)?;
            }
            if !transparent {
                self.device.draw_image(targets.depth, targets.depth_intermediate, &DrawImageOptions::default())?;
            }
        }
        let gate = self.render_depth.then_some(targets.depth_intermediate);

        // ========== NORMALS ==========
        if let Some(normal_target) = targets.normal {
            normal_vertices.clear();
            normal_vertices.extend(stream.vertices.iter().zip(&stream.normal_colors).map(
                |(vertex, &color)| RasterVertex { color, ..*vertex },
            ));
            self.device.draw_triangles(normal_target, &DrawTriangles {
                vertices: normal_vertices,
                indices,
                program: &ColorProgram,
                images: [gate, None, None, None],
                uniforms: unclipped,
                blend: BlendMode::Copy,
            })?;
        }

        // ========== COLOR ==========
        let program: &dyn FragmentProgram = match material.fragment_program() {
            Some(custom) => custom.as_ref(),
            None => &ColorProgram,
        };
        self.device.draw_triangles(targets.color, &DrawTriangles {
            vertices: &stream.vertices,
            indices,
            program,
            images: [gate, Some(texture), None, None],
            uniforms,
            blend: material.blend_mode(),
        })?;

        stats.draw_calls += 1;
        stats.drawn_tris += stream.triangle_count();
        engine_trace!("prism3d::Dispatcher", "Flushed {} triangles ({} vertices) with material '{}'",
            stream.triangle_count(), stream.len(), material.name());
        stream.reset();
        Ok(())
    }
}

#[cfg(test)]
#[path = "dispatcher_tests.rs"]
mod tests;
