use crate::error::SeriesError;
use crate::record::{Provenance, Record};
use rust_decimal::prelude::*;
use rust_decimal::{Decimal, MathematicalOps};
use std::marker::PhantomData;

/// The mutable computation surrogate paired with a record type.
///
/// An accumulator is seeded from one record and mutated in place through a
/// fold or reduce; no intermediate records are allocated until the terminal
/// [`Accumulator::into_record`] call, which consumes the builder. Move
/// semantics make reuse-after-materialize impossible.
///
/// Field semantics:
/// - A field holding `None` is *undefined*. Undefined poisons arithmetic
///   (`None + x = None`) but is treated as *absent* by `min`/`max`, where
///   the defined operand wins.
/// - Provenance flags accumulate as the logical OR of every record this
///   accumulator has combined.
#[derive(Debug, Clone)]
pub struct Accumulator<R: Record> {
    fields: Vec<Option<Decimal>>,
    provenance: Provenance,
    _record: PhantomData<R>,
}

impl<R: Record> Accumulator<R> {
    /// Seeds an accumulator with the field values of `record`.
    pub fn seed(record: &R) -> Self {
        Self {
            fields: record.fields(),
            provenance: record.provenance(),
            _record: PhantomData,
        }
    }

    /// Materializes the current state as a new immutable record, consuming
    /// the accumulator.
    pub fn into_record(self) -> R {
        R::from_fields(&self.fields, self.provenance)
    }

    fn combine<F>(&mut self, other: &R, op: F)
    where
        F: Fn(Decimal, Decimal) -> Option<Decimal>,
    {
        self.provenance = self.provenance.merged(other.provenance());
        for (mine, theirs) in self.fields.iter_mut().zip(other.fields()) {
            *mine = match (*mine, theirs) {
                (Some(a), Some(b)) => op(a, b),
                _ => None,
            };
        }
    }

    fn map_fields<F>(&mut self, op: F)
    where
        F: Fn(Decimal) -> Option<Decimal>,
    {
        for field in &mut self.fields {
            *field = field.and_then(&op);
        }
    }

    pub fn add(&mut self, other: &R) {
        self.combine(other, |a, b| a.checked_add(b));
    }

    pub fn subtract(&mut self, other: &R) {
        self.combine(other, |a, b| a.checked_sub(b));
    }

    pub fn multiply(&mut self, other: &R) {
        self.combine(other, |a, b| a.checked_mul(b));
    }

    /// Field-wise division by `other`.
    ///
    /// The divisor is checked against the record type's zero predicate
    /// first. On violation every field becomes undefined and an explicit
    /// [`SeriesError::DivisionByZero`] signal is returned; the accumulator
    /// itself stays usable and consumable. Callers must check the signal
    /// rather than rely on a panic.
    pub fn divide(&mut self, other: &R) -> Result<(), SeriesError> {
        self.provenance = self.provenance.merged(other.provenance());
        if other.is_zero() {
            for field in &mut self.fields {
                *field = None;
            }
            return Err(SeriesError::DivisionByZero);
        }
        for (mine, theirs) in self.fields.iter_mut().zip(other.fields()) {
            *mine = match (*mine, theirs) {
                (Some(a), Some(b)) => a.checked_div(b),
                _ => None,
            };
        }
        Ok(())
    }

    /// Adds a constant to every field.
    pub fn add_scalar(&mut self, scalar: Decimal) {
        self.map_fields(|v| v.checked_add(scalar));
    }

    /// Multiplies every field by a constant.
    pub fn scale(&mut self, scalar: Decimal) {
        self.map_fields(|v| v.checked_mul(scalar));
    }

    /// Raises every field to a constant decimal power.
    pub fn power(&mut self, exponent: Decimal) {
        self.map_fields(|v| v.checked_powd(exponent));
    }

    /// Field-wise maximum against `other`. Undefined fields are absent,
    /// not zero: the defined side wins, and only two undefined fields stay
    /// undefined.
    pub fn max(&mut self, other: &R) {
        self.select(other, |a, b| a.max(b));
    }

    /// Field-wise minimum against `other`; same undefined-as-absent rule
    /// as [`Accumulator::max`].
    pub fn min(&mut self, other: &R) {
        self.select(other, |a, b| a.min(b));
    }

    fn select<F>(&mut self, other: &R, pick: F)
    where
        F: Fn(Decimal, Decimal) -> Decimal,
    {
        self.provenance = self.provenance.merged(other.provenance());
        for (mine, theirs) in self.fields.iter_mut().zip(other.fields()) {
            *mine = match (*mine, theirs) {
                (Some(a), Some(b)) => Some(pick(a, b)),
                (Some(a), None) => Some(a),
                (None, Some(b)) => Some(b),
                (None, None) => None,
            };
        }
    }

    pub fn abs(&mut self) {
        self.map_fields(|v| Some(v.abs()));
    }

    /// Square root; negative fields become undefined.
    pub fn sqrt(&mut self) {
        self.map_fields(|v| v.sqrt());
    }

    /// Natural logarithm; non-positive fields become undefined.
    pub fn ln(&mut self) {
        self.map_fields(|v| if v > Decimal::ZERO { Some(v.ln()) } else { None });
    }

    /// Exponential; fields that would overflow become undefined.
    pub fn exp(&mut self) {
        self.map_fields(|v| v.checked_exp());
    }

    // Trigonometry has no exact decimal form; round-tripping through f64 is
    // a controlled and accepted precision trade-off.
    pub fn sin(&mut self) {
        self.map_fields(|v| trig(v, f64::sin));
    }

    pub fn cos(&mut self) {
        self.map_fields(|v| trig(v, f64::cos));
    }

    pub fn tan(&mut self) {
        self.map_fields(|v| trig(v, f64::tan));
    }

    /// Resets every field to the multiplicative identity. Provenance is
    /// kept: the accumulator still remembers what it has combined.
    pub fn set_to_one(&mut self) {
        for field in &mut self.fields {
            *field = Some(Decimal::ONE);
        }
    }
}

fn trig(value: Decimal, f: fn(f64) -> f64) -> Option<Decimal> {
    value.to_f64().map(f).and_then(Decimal::from_f64)
}
