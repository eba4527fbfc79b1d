//! Resource module
//!
//! Meshes and materials: immutable, validated once, shared through `Arc`.

pub mod material;
pub mod mesh;

pub use material::{
    Material, MaterialDesc, TransparencyMode, TriangleSortMode, CustomDepthFn,
};
pub use mesh::{Mesh, MeshBuilder, MeshPart, Triangle, VertexData};
