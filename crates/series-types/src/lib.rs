//! # Meridian Series Types
//!
//! Layer 0 of the workspace: the value types every other crate computes
//! with. It has no knowledge of windows, transforms or combination — only
//! of records, their paired accumulators, keys and the series containers.
//!
//! ## Architectural Principles
//!
//! - **Immutable records, mutable surrogates:** records never mutate.
//!   Arithmetic happens in place on an [`Accumulator`] seeded from one
//!   record and consumed by [`Accumulator::into_record`].
//! - **Explicit undefined:** a record field is `Option<Decimal>`. `None`
//!   means "no value" — the state a field enters after a division-by-zero
//!   signal or inside an empty sentinel — and is never conflated with zero.
//! - **Provenance is sticky:** `is_rolled` / `is_synthetic` flags OR
//!   together through every combination.

pub mod accumulator;
pub mod error;
pub mod key;
pub mod record;
pub mod records;
pub mod series;

// Re-export the core types to provide a clean public API.
pub use accumulator::Accumulator;
pub use error::SeriesError;
pub use key::{CalendarKey, LagDaySelection, SeriesKey};
pub use record::{Provenance, Record};
pub use records::{Bar, Observation, Quote, Tick};
pub use series::{PairSeries, Series};
