//! # Meridian Engine
//!
//! Layer 1 of the workspace: the accumulation-and-transformation engine.
//! It is a pure logic crate — no I/O, no clock, no persistence — depending
//! only on `series-types` (Layer 0).
//!
//! ## Components
//!
//! - **Windowing** ([`window`]): generic reducer application over
//!   fixed-size rolling windows and expanding windows.
//! - **Dispatcher** ([`dispatch`]): routes a [`Transformation`] descriptor
//!   (point / vector / reference-point) to the right execution path and
//!   wires the final scalar stage and optional calendar lag.
//! - **Combiner** ([`combine`]): merges N key-aligned series under
//!   per-series operators with union-of-keys semantics.
//!
//! Everything is single-threaded and synchronous: each logical reduction
//! owns its accumulator for the duration of one pass, inputs are read-only
//! borrows, and outputs are freshly allocated series.

pub mod combine;
pub mod dispatch;
pub mod error;
pub mod lag;
pub mod window;

// Re-export the key components to create a clean, public-facing API.
pub use combine::{combine, CombineOperator};
pub use dispatch::{
    dispatch, dispatch_with_lag, ReferenceSelector, TransformConfig, Transformation,
};
pub use error::EngineError;
pub use lag::lag_series;
pub use window::{expanding_window_reduce, fixed_window_reduce};
