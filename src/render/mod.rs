//! Rasterization of engine state into RGBA frames.

/// Separable box blur over premultiplied RGBA8 buffers.
pub mod blur;
/// `vello_cpu` renderer: background wash, shape fills, optional blur.
pub mod cpu;
/// Frame buffers and alpha flattening.
pub mod frame;
/// Shape routines and their registry.
pub mod routine;
