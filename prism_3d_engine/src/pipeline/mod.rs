//! Per-frame pipeline stages driven by the camera.
//!
//! culler -> sort_batch -> vertex_processor -> sorting -> dispatcher, all
//! working out of one reusable [`arena::RenderArena`].

pub(crate) mod arena;
pub(crate) mod culler;
pub(crate) mod dispatcher;
pub(crate) mod frame;
pub(crate) mod sort_batch;
pub(crate) mod sorting;
pub(crate) mod vertex_processor;
