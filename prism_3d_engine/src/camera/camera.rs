/// Camera: the frame session.
///
/// A camera owns its render targets on a shared raster device, a cached
/// projection and the scratch arena reused by every frame. One frame is
/// `clear` (or `clear_with_color`) followed by one or more `render` calls.
/// Models passed to the same `render` call are culled, sorted and depth
/// tested together; separate calls draw on top of each other.

use std::sync::{Arc, MutexGuard};
use std::time::Instant;
use glam::{Mat3, Mat4, Quat, Vec2, Vec3, Vec4};
use crate::engine::SharedRasterDevice;
use crate::error::Result;
use crate::{engine_bail, engine_debug, engine_err, engine_trace};
use crate::pipeline::arena::RenderArena;
use crate::pipeline::culler::{collect_candidates, collect_lights, visible_sectors, SectorFilter};
use crate::pipeline::dispatcher::Dispatcher;
use crate::pipeline::frame::{draw_units, FrameBuffers, FrameContext};
use crate::pipeline::sort_batch::{classify, order_far_to_near, Classified};
use crate::pipeline::vertex_processor::{project_to_screen, FrameTransform};
use crate::raster::{BlendMode, DrawImageOptions, ImageKey, RasterDevice};
use crate::resource::Material;
use crate::scene::{LightKey, ModelKey, Scene, SectorKey};
use super::camera_config::{AccumulationMode, CameraConfig, LightFocus};
use super::debug_info::{DebugInfo, RenderTimeWindow};
use super::frustum::{SphereFactors, ViewFrustum};
use super::render_targets::RenderTargets;

/// Frame session rendering scenes into its own targets
pub struct Camera {
    name: String,
    device: SharedRasterDevice,
    config: CameraConfig,
    position: Vec3,
    rotation: Quat,
    /// Pixel-scaled projection, recomputed on every parameter change
    projection: Mat4,
    factors: SphereFactors,
    targets: RenderTargets,
    arena: RenderArena,
    default_material: Material,
    current_sector: Option<SectorKey>,
    debug: DebugInfo,
    render_times: RenderTimeWindow,
    rendered_since_clear: bool,
}

fn lock_device<'a>(device: &'a SharedRasterDevice, name: &str) -> Result<MutexGuard<'a, dyn RasterDevice + 'static>> {
    device
        .lock()
        .map_err(|_| engine_err!("prism3d::Camera", "Camera '{}': raster device lock poisoned", name))
}

impl Camera {
    /// Create a camera and allocate its targets on `device`
    ///
    /// The camera starts at the origin looking down -Z.
    pub fn new(name: &str, device: SharedRasterDevice, config: CameraConfig) -> Result<Self> {
        config.validate()?;
        let targets = {
            let mut guard = lock_device(&device, name)?;
            RenderTargets::create(&mut *guard, name, config.width, config.height)?
        };

        let mut camera = Self {
            name: name.to_string(),
            device,
            config,
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            projection: Mat4::IDENTITY,
            factors: SphereFactors::new(60.0, 1.0),
            targets,
            arena: RenderArena::new(),
            default_material: Material::default(),
            current_sector: None,
            debug: DebugInfo::default(),
            render_times: RenderTimeWindow::default(),
            rendered_since_clear: false,
        };
        camera.update_projection();
        engine_debug!("prism3d::Camera", "Camera '{}' created ({}x{})",
            camera.name, camera.config.width, camera.config.height);
        Ok(camera)
    }

    fn update_projection(&mut self) {
        let config = &self.config;
        let aspect = config.aspect();
        let scale = Mat4::from_scale(Vec3::new(0.5, 0.5, 1.0));
        self.projection = if config.perspective {
            scale * Mat4::perspective_rh(config.fov_y.to_radians(), aspect, config.near, config.far)
        } else {
            let half = self.ortho_half_extent();
            scale * Mat4::orthographic_rh(-half.x, half.x, -half.y, half.y, config.near, config.far)
        };
        self.factors = SphereFactors::new(config.fov_y, aspect);
    }

    fn ortho_half_extent(&self) -> Vec2 {
        let half_height = self.config.ortho_scale * 0.5;
        Vec2::new(half_height * self.config.aspect(), half_height)
    }

    // ===== GETTERS =====

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &CameraConfig {
        &self.config
    }

    pub fn width(&self) -> u32 {
        self.targets.width
    }

    pub fn height(&self) -> u32 {
        self.targets.height
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn rotation(&self) -> Quat {
        self.rotation
    }

    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::NEG_Z
    }

    /// Inverse of the camera's world transform
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.rotation, self.position).inverse()
    }

    /// Projection mapping the view volume to half-unit clip space, ready for
    /// the pixel mapping
    pub fn projection_matrix(&self) -> &Mat4 {
        &self.projection
    }

    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection * self.view_matrix()
    }

    /// View volume for the current pose and parameters
    pub fn frustum(&self) -> ViewFrustum {
        let config = &self.config;
        if config.perspective {
            ViewFrustum::perspective(self.position, self.rotation, config.near, config.far, self.factors)
        } else {
            ViewFrustum::orthographic(self.position, self.rotation, config.near, config.far, self.ortho_half_extent())
        }
    }

    pub fn device(&self) -> &SharedRasterDevice {
        &self.device
    }

    pub fn color_target(&self) -> ImageKey {
        self.targets.color
    }

    pub fn depth_target(&self) -> ImageKey {
        self.targets.depth
    }

    pub fn normal_target(&self) -> ImageKey {
        self.targets.normal
    }

    pub fn accumulation_target(&self) -> ImageKey {
        self.targets.accumulation
    }

    /// Sector containing the camera during the last sector-rendered frame
    pub fn current_sector(&self) -> Option<SectorKey> {
        self.current_sector
    }

    pub fn debug_info(&self) -> &DebugInfo {
        &self.debug
    }

    // ===== POSE =====

    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    pub fn set_rotation(&mut self, rotation: Quat) {
        self.rotation = rotation.normalize();
    }

    /// Turn the camera toward `target`; ignored when `target` is the camera position
    pub fn look_at(&mut self, target: Vec3, up: Vec3) {
        if target.distance_squared(self.position) <= f32::EPSILON {
            return;
        }
        let view = Mat4::look_at_rh(self.position, target, up);
        self.rotation = Quat::from_mat3(&Mat3::from_mat4(view.inverse())).normalize();
    }

    // ===== PARAMETERS =====

    /// Replace the whole configuration, reallocating targets when the size changes
    pub fn set_config(&mut self, mut config: CameraConfig) -> Result<()> {
        config.validate()?;
        let (width, height) = (config.width, config.height);
        config.width = self.targets.width;
        config.height = self.targets.height;
        self.config = config;
        self.update_projection();
        self.resize(width, height)
    }

    fn update_config(&mut self, change: impl FnOnce(&mut CameraConfig)) -> Result<()> {
        let mut config = self.config.clone();
        change(&mut config);
        config.validate()?;
        self.config = config;
        self.update_projection();
        Ok(())
    }

    pub fn set_fov_y(&mut self, degrees: f32) -> Result<()> {
        self.update_config(|c| c.fov_y = degrees)
    }

    pub fn set_clip_planes(&mut self, near: f32, far: f32) -> Result<()> {
        self.update_config(|c| {
            c.near = near;
            c.far = far;
        })
    }

    pub fn set_perspective(&mut self, perspective: bool) -> Result<()> {
        self.update_config(|c| c.perspective = perspective)
    }

    pub fn set_ortho_scale(&mut self, scale: f32) -> Result<()> {
        self.update_config(|c| c.ortho_scale = scale)
    }

    pub fn set_depth_margin(&mut self, margin: f32) -> Result<()> {
        self.update_config(|c| c.depth_margin = margin)
    }

    pub fn set_max_light_count(&mut self, count: usize) {
        self.config.max_light_count = count;
    }

    pub fn set_light_focus(&mut self, focus: LightFocus) {
        self.config.light_focus = focus;
    }

    pub fn set_render_depth(&mut self, enabled: bool) {
        self.config.render_depth = enabled;
    }

    pub fn set_render_normals(&mut self, enabled: bool) {
        self.config.render_normals = enabled;
    }

    pub fn set_sector_rendering(&mut self, enabled: bool, depth: u32) {
        self.config.sector_rendering = enabled;
        self.config.sector_render_depth = depth;
    }

    pub fn set_accumulation(&mut self, mode: AccumulationMode) -> Result<()> {
        self.update_config(|c| c.accumulation = mode)
    }

    /// Resize every target; a no-op when the size is unchanged
    pub fn resize(&mut self, width: u32, height: u32) -> Result<()> {
        if width == self.targets.width && height == self.targets.height {
            return Ok(());
        }
        if width == 0 || height == 0 {
            engine_bail!(ConfigurationError, "prism3d::Camera",
                "Camera '{}': cannot resize to {}x{}", self.name, width, height);
        }

        let device = Arc::clone(&self.device);
        let mut guard = lock_device(&device, &self.name)?;
        let targets = RenderTargets::create(&mut *guard, &self.name, width, height)?;
        self.targets.destroy(&mut *guard);
        self.targets = targets;
        self.config.width = width;
        self.config.height = height;
        drop(guard);

        self.update_projection();
        Ok(())
    }

    // ===== QUERIES =====

    /// Pixel position of a world point
    ///
    /// Points behind the camera project through the clamped `w` and land far
    /// outside the target.
    pub fn world_to_screen(&self, point: Vec3) -> Vec2 {
        let clip = self.view_projection_matrix() * point.extend(1.0);
        project_to_screen(clip, self.targets.width as f32, self.targets.height as f32).0
    }

    /// World point under a pixel
    ///
    /// `depth` is the distance from the camera for perspective cameras and the
    /// distance along the view axis for orthographic ones.
    pub fn screen_to_world(&self, screen: Vec2, depth: f32) -> Vec3 {
        let width = self.targets.width as f32;
        let height = self.targets.height as f32;
        let clip_x = (screen.x - width * 0.5) / width;
        let clip_y = -(screen.y - height * 0.5) / height;
        let inverse = self.view_projection_matrix().inverse();
        let near = inverse.project_point3(Vec3::new(clip_x, clip_y, 0.0));

        if self.config.perspective {
            let far = inverse.project_point3(Vec3::new(clip_x, clip_y, 1.0));
            self.position + (far - near).normalize_or_zero() * depth
        } else {
            near + self.forward() * (depth - self.config.near)
        }
    }

    pub fn point_in_frustum(&self, point: Vec3) -> bool {
        self.frustum().point_in_frustum(point)
    }

    pub fn sphere_in_frustum(&self, center: Vec3, radius: f32) -> bool {
        self.frustum().sphere_in_frustum(center, radius)
    }

    // ===== FRAME =====

    /// Start a frame with the scene's world clear color, transparent black
    /// without a world
    pub fn clear(&mut self, scene: &Scene) -> Result<()> {
        let color = scene.world().map_or(Vec4::ZERO, |world| world.clear_color);
        self.clear_with_color(color)
    }

    /// Start a frame: fold the finished frame into the accumulation target,
    /// reset color, depth and normals, and roll the debug window
    pub fn clear_with_color(&mut self, color: Vec4) -> Result<()> {
        let device = Arc::clone(&self.device);
        let mut guard = lock_device(&device, &self.name)?;
        let device: &mut dyn RasterDevice = &mut *guard;
        let targets = self.targets;

        if let AccumulationMode::Fade(factor) = self.config.accumulation {
            device.clear_image(targets.accumulation_scratch, Vec4::ZERO)?;
            device.draw_image(targets.accumulation_scratch, targets.accumulation, &DrawImageOptions {
                blend: BlendMode::Copy,
                color_scale: Vec4::new(1.0, 1.0, 1.0, factor),
            })?;
            device.draw_image(targets.accumulation_scratch, targets.color, &DrawImageOptions::default())?;
            device.clear_image(targets.accumulation, Vec4::ZERO)?;
            device.draw_image(targets.accumulation, targets.accumulation_scratch, &DrawImageOptions {
                blend: BlendMode::Copy,
                color_scale: Vec4::ONE,
            })?;
        }

        device.clear_image(targets.color, color)?;
        device.clear_image(targets.depth, Vec4::ZERO)?;
        device.clear_image(targets.normal, Vec4::ZERO)?;

        if self.rendered_since_clear {
            self.render_times.push(self.debug.render_time);
        }
        self.debug = DebugInfo {
            average_render_time: self.render_times.average(),
            max_render_time: self.render_times.max(),
            ..DebugInfo::default()
        };
        self.rendered_since_clear = false;
        Ok(())
    }

    /// Render every root model of the scene with every light
    pub fn render_scene(&mut self, scene: &Scene) -> Result<()> {
        let lights = scene.light_keys();
        self.render(scene, &lights, scene.roots())
    }

    /// Render `models` and their descendants lit by `lights`
    ///
    /// Unknown keys are rejected before anything is drawn.
    pub fn render(&mut self, scene: &Scene, lights: &[LightKey], models: &[ModelKey]) -> Result<()> {
        if let Some(key) = models.iter().find(|&&key| scene.model(key).is_none()) {
            engine_bail!(InvalidResource, "prism3d::Camera",
                "Camera '{}': model {:?} is not in scene '{}'", self.name, key, scene.name());
        }
        if let Some(key) = lights.iter().find(|&&key| scene.light(key).is_none()) {
            engine_bail!(InvalidResource, "prism3d::Camera",
                "Camera '{}': light {:?} is not in scene '{}'", self.name, key, scene.name());
        }
        if let LightFocus::Model(key) = self.config.light_focus {
            if scene.model(key).is_none() {
                engine_bail!(InvalidResource, "prism3d::Camera",
                    "Camera '{}': light focus model {:?} is not in scene '{}'", self.name, key, scene.name());
            }
        }

        let started = Instant::now();
        let frustum = self.frustum();
        let view = self.view_matrix();
        let transform = FrameTransform {
            view,
            view_projection: self.projection * view,
            eye: self.position,
            width: self.targets.width as f32,
            height: self.targets.height as f32,
            near: self.config.near,
            far: self.config.far,
            depth_margin: self.config.depth_margin,
            perspective_corrected: self.config.perspective_corrected_textures,
            fog: scene.world().map(|world| world.fog.clone()).filter(|fog| fog.enabled),
        };
        let focus = match self.config.light_focus {
            LightFocus::Camera => self.position,
            LightFocus::Model(key) => scene.model(key).map_or(self.position, |model| model.world_position()),
        };

        let device = Arc::clone(&self.device);
        let mut guard = lock_device(&device, &self.name)?;

        let arena = &mut self.arena;
        arena.begin_frame();
        let RenderArena {
            stream,
            bucket,
            stack,
            candidates,
            solids,
            transparents,
            batch_members,
            lights: frame_lights,
            model_lights,
            visible_sectors: sectors,
            normal_vertices,
            stats,
        } = arena;

        // ========== VISIBILITY ==========
        let graph = scene.sector_graph().filter(|_| self.config.sector_rendering);
        self.current_sector = graph.and_then(|graph| {
            visible_sectors(graph, self.position, self.config.sector_render_depth, sectors)
        });
        let visible: &_ = sectors;
        let filter = graph.map(|graph| SectorFilter { graph, visible });
        collect_candidates(scene, models, &frustum, filter.as_ref(), stack, candidates);
        collect_lights(scene, lights, focus, self.config.max_light_count, frame_lights);

        // ========== SORT & BATCH ==========
        classify(scene, candidates, self.position, &frustum, &self.default_material, Classified {
            solids: &mut *solids,
            transparents: &mut *transparents,
            batch_members: &mut *batch_members,
            stats: &mut *stats,
        });
        if !self.config.render_depth {
            order_far_to_near(solids);
        }
        order_far_to_near(transparents);

        // ========== DRAW ==========
        let ctx = FrameContext {
            scene,
            transform: &transform,
            default_material: &self.default_material,
            lighting: scene.world().is_some_and(|world| world.lighting),
        };
        let mut dispatcher = Dispatcher {
            device: &mut *guard,
            targets: self.targets.passes(self.config.render_normals),
            render_depth: self.config.render_depth,
            perspective_corrected: self.config.perspective_corrected_textures,
        };
        let mut buffers = FrameBuffers {
            stream,
            bucket,
            normal_vertices,
            lights: frame_lights,
            model_lights,
            stats,
        };
        draw_units(&ctx, &mut dispatcher, solids, batch_members, false, &mut buffers)?;
        draw_units(&ctx, &mut dispatcher, transparents, batch_members, true, &mut buffers)?;
        drop(guard);

        // ========== DEBUG ==========
        let frame = *buffers.stats;
        let debug = &mut self.debug;
        debug.draw_calls += frame.draw_calls;
        debug.total_parts += frame.total_parts;
        debug.drawn_parts += frame.drawn_parts;
        debug.total_tris += frame.total_tris;
        debug.drawn_tris += frame.drawn_tris;
        debug.light_count = buffers.lights.len();
        debug.render_time += started.elapsed();
        self.rendered_since_clear = true;

        engine_trace!("prism3d::Camera", "Camera '{}': {} draw calls, {}/{} parts, {}/{} triangles",
            self.name, frame.draw_calls, frame.drawn_parts, frame.total_parts, frame.drawn_tris, frame.total_tris);
        Ok(())
    }
}

impl Drop for Camera {
    fn drop(&mut self) {
        if let Ok(mut device) = self.device.lock() {
            self.targets.destroy(&mut *device);
        }
    }
}

#[cfg(test)]
#[path = "camera_tests.rs"]
mod tests;
