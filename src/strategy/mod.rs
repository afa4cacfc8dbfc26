//! Execution Strategy Module
//!
//! - Parallel: batch annotation over the Rayon pool, one builder per input

pub mod parallel;

pub use parallel::{annotate_batch, annotate_batch_into};
