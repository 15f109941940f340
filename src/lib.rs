//! Tessera paints animated tessellated backgrounds: a grid of triangles (or squares) whose
//! lightness breathes independently while the whole field drifts between gradient palettes.
//!
//! The API is handle-oriented:
//!
//! - Describe the look with an [`EngineConfig`] (JSON or code)
//! - Create an [`EngineHandle`] for a viewport with [`EngineHandle::initialize`]
//! - Call [`EngineHandle::on_frame`] from a refresh clock, or stream frames into a
//!   [`FrameSink`] with [`run_loop`]
//! - Forward viewport changes with [`EngineHandle::handle_resize`], stop with
//!   [`EngineHandle::dispose`]
#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod foundation;

/// Easing curves.
pub mod animation;
/// RGB/HSL color model and gradient swatches.
pub mod color;
/// Frame sinks: memory, PNG sequences, `ffmpeg`.
pub mod encode;
/// Animation state: configuration, timers, palette transitions.
pub mod engine;
/// Shape grid layout and per-shape animation.
pub mod grid;
/// Host integration: lifecycle handle and refresh loop.
pub mod host;
/// Row-indexed palette sampling.
pub mod palette;
/// CPU rasterization of engine state.
pub mod render;

pub use crate::foundation::core::{BezPath, Canvas, Fps, FrameIndex, Point};
pub use crate::foundation::error::{TesseraError, TesseraResult};

pub use crate::animation::ease::{CubicBezier, Ease, Easing};
pub use crate::color::blend::Opacity;
pub use crate::color::model::{Hsl, Rgb};
pub use crate::color::swatch::Swatch;
pub use crate::encode::ffmpeg::{FfmpegSink, FfmpegSinkOpts};
pub use crate::encode::sink::{FrameSink, InMemorySink, PngSequenceSink, SinkConfig};
pub use crate::engine::config::EngineConfig;
pub use crate::engine::state::Engine;
pub use crate::grid::layout::ShapeGrid;
pub use crate::grid::shape::Shape;
pub use crate::host::driver::{
    CancelToken, FixedRateSource, HostEvent, LoopStats, RefreshSource, ScriptedSource, run_loop,
};
pub use crate::host::handle::EngineHandle;
pub use crate::palette::sampler::PaletteSampler;
pub use crate::render::cpu::CpuRenderer;
pub use crate::render::frame::FrameRGBA;
pub use crate::render::routine::{Cell, ShapeRegistry, ShapeRoutine, Square, Triangle};
