/// Row-indexed gradient sampling.
pub mod sampler;
