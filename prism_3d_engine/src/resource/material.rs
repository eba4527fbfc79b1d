/// Resource-level material type.
///
/// A Material describes how a mesh part is drawn: texture and tint, how it
/// takes part in depth and transparency, how its triangles are ordered, and
/// optionally a custom fragment program or depth function.
///
/// Materials are immutable once built and shared between meshes through `Arc`.

use std::sync::Arc;
use glam::{Vec3, Vec4};
use rustc_hash::{FxHashMap, FxHashSet};
use crate::error::Result;
use crate::engine_bail;
use crate::raster::{BlendMode, FragmentProgram, ImageKey, ParamValue};

/// Override for the per-vertex depth: `(world_position, computed_depth) -> depth`
///
/// The returned value feeds both the encoded depth and the fog blend.
pub type CustomDepthFn = Arc<dyn Fn(Vec3, f32) -> f32 + Send + Sync>;

// ===== MODES =====

/// How a material takes part in depth and transparency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransparencyMode {
    /// Transparent only if the tinted alpha of the part is below 1
    #[default]
    Auto,
    /// Always drawn in the solid pass
    Opaque,
    /// Solid pass, texels below the clip threshold discarded (depth included)
    AlphaClip,
    /// Blended pass, sorted far to near, never writes persistent depth
    Transparent,
}

/// Triangle order inside one draw unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TriangleSortMode {
    /// Farthest triangle center first
    #[default]
    BackToFront,
    /// Nearest triangle center first
    FrontToBack,
    /// Mesh order
    None,
}

// ===== DESCRIPTOR =====

/// Material creation descriptor
#[derive(Clone)]
pub struct MaterialDesc {
    pub name: String,
    /// Texture on the camera's raster device. `None` uses the default white texture.
    pub texture: Option<ImageKey>,
    /// Tint multiplied into every vertex color
    pub color: Vec4,
    pub transparency_mode: TransparencyMode,
    pub blend_mode: BlendMode,
    pub triangle_sort_mode: TriangleSortMode,
    /// `false` makes the material shadeless
    pub lighting: bool,
    pub backface_culling: bool,
    /// `true` ignores world fog
    pub fogless: bool,
    /// Replaces the default color program in the color pass
    pub fragment_program: Option<Arc<dyn FragmentProgram>>,
    pub custom_depth: Option<CustomDepthFn>,
    pub params: Vec<(String, ParamValue)>,
}

impl Default for MaterialDesc {
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            texture: None,
            color: Vec4::ONE,
            transparency_mode: TransparencyMode::Auto,
            blend_mode: BlendMode::SourceOver,
            triangle_sort_mode: TriangleSortMode::BackToFront,
            lighting: true,
            backface_culling: true,
            fogless: false,
            fragment_program: None,
            custom_depth: None,
            params: Vec::new(),
        }
    }
}

// ===== MATERIAL =====

/// Immutable material
pub struct Material {
    name: String,
    texture: Option<ImageKey>,
    color: Vec4,
    transparency_mode: TransparencyMode,
    blend_mode: BlendMode,
    triangle_sort_mode: TriangleSortMode,
    lighting: bool,
    backface_culling: bool,
    fogless: bool,
    fragment_program: Option<Arc<dyn FragmentProgram>>,
    custom_depth: Option<CustomDepthFn>,
    params: Vec<(String, ParamValue)>,
    param_names: FxHashMap<String, usize>,
}

impl Material {
    /// Create a material from a descriptor
    ///
    /// # Errors
    ///
    /// - duplicate parameter names
    /// - non-finite tint color
    pub fn from_desc(desc: MaterialDesc) -> Result<Self> {
        if !desc.color.is_finite() {
            engine_bail!(InvalidResource, "prism3d::Material",
                "Material '{}': tint color {:?} is not finite", desc.name, desc.color);
        }

        let mut seen = FxHashSet::default();
        for (param_name, _) in &desc.params {
            if !seen.insert(param_name.as_str()) {
                engine_bail!(InvalidResource, "prism3d::Material",
                    "Material '{}': duplicate parameter name '{}'", desc.name, param_name);
            }
        }

        let param_names = desc
            .params
            .iter()
            .enumerate()
            .map(|(index, (name, _))| (name.clone(), index))
            .collect();

        Ok(Self {
            name: desc.name,
            texture: desc.texture,
            color: desc.color,
            transparency_mode: desc.transparency_mode,
            blend_mode: desc.blend_mode,
            triangle_sort_mode: desc.triangle_sort_mode,
            lighting: desc.lighting,
            backface_culling: desc.backface_culling,
            fogless: desc.fogless,
            fragment_program: desc.fragment_program,
            custom_depth: desc.custom_depth,
            params: desc.params,
            param_names,
        })
    }

    /// Whether a part drawn with this material goes through the transparent pass
    ///
    /// `aggregate_alpha` is the lowest alpha the part can produce after vertex
    /// color and model tint; the material's own tint is folded in here.
    pub fn resolves_transparent(&self, aggregate_alpha: f32) -> bool {
        match self.transparency_mode {
            TransparencyMode::Transparent => true,
            TransparencyMode::Opaque | TransparencyMode::AlphaClip => false,
            TransparencyMode::Auto => aggregate_alpha * self.color.w < 1.0,
        }
    }

    // ===== GETTERS =====

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn texture(&self) -> Option<ImageKey> {
        self.texture
    }

    pub fn color(&self) -> Vec4 {
        self.color
    }

    pub fn transparency_mode(&self) -> TransparencyMode {
        self.transparency_mode
    }

    pub fn blend_mode(&self) -> BlendMode {
        self.blend_mode
    }

    pub fn triangle_sort_mode(&self) -> TriangleSortMode {
        self.triangle_sort_mode
    }

    pub fn lighting(&self) -> bool {
        self.lighting
    }

    pub fn backface_culling(&self) -> bool {
        self.backface_culling
    }

    pub fn fogless(&self) -> bool {
        self.fogless
    }

    pub fn fragment_program(&self) -> Option<&Arc<dyn FragmentProgram>> {
        self.fragment_program.as_ref()
    }

    pub fn custom_depth(&self) -> Option<&CustomDepthFn> {
        self.custom_depth.as_ref()
    }

    // ===== PARAM ACCESS =====

    pub fn param(&self, name: &str) -> Option<&ParamValue> {
        let index = self.param_names.get(name)?;
        self.params.get(*index).map(|(_, value)| value)
    }

    pub fn params(&self) -> &[(String, ParamValue)] {
        &self.params
    }
}

impl Default for Material {
    /// White, auto-transparent, lit, back-face culled, default program
    fn default() -> Self {
        let desc = MaterialDesc::default();
        Self {
            name: desc.name,
            texture: None,
            color: desc.color,
            transparency_mode: desc.transparency_mode,
            blend_mode: desc.blend_mode,
            triangle_sort_mode: desc.triangle_sort_mode,
            lighting: desc.lighting,
            backface_culling: desc.backface_culling,
            fogless: desc.fogless,
            fragment_program: None,
            custom_depth: None,
            params: Vec::new(),
            param_names: FxHashMap::default(),
        }
    }
}

impl std::fmt::Debug for Material {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Material")
            .field("name", &self.name)
            .field("transparency_mode", &self.transparency_mode)
            .field("blend_mode", &self.blend_mode)
            .field("triangle_sort_mode", &self.triangle_sort_mode)
            .field("custom_program", &self.fragment_program.as_ref().map(|p| p.name().to_string()))
            .finish()
    }
}

#[cfg(test)]
#[path = "material_tests.rs"]
mod tests;
