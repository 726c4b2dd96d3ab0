use crate::record::{Provenance, Record};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A single-value observation, the workhorse record for price and index
/// series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    value: Option<Decimal>,
    provenance: Provenance,
}

impl Observation {
    pub fn new(value: Decimal) -> Self {
        Self {
            value: Some(value),
            provenance: Provenance::default(),
        }
    }

    pub fn with_provenance(value: Decimal, provenance: Provenance) -> Self {
        Self {
            value: Some(value),
            provenance,
        }
    }

    pub fn value(&self) -> Option<Decimal> {
        self.value
    }
}

impl Record for Observation {
    fn field_count() -> usize {
        1
    }

    fn fields(&self) -> Vec<Option<Decimal>> {
        vec![self.value]
    }

    fn from_fields(fields: &[Option<Decimal>], provenance: Provenance) -> Self {
        Self {
            value: fields.first().copied().flatten(),
            provenance,
        }
    }

    fn provenance(&self) -> Provenance {
        self.provenance
    }

    fn empty() -> Self {
        Self {
            value: None,
            provenance: Provenance::default(),
        }
    }

    fn one() -> Self {
        Self::new(Decimal::ONE)
    }
}

/// An OHLC price bar. Every arithmetic operation applies to all four fields
/// independently.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    open: Option<Decimal>,
    high: Option<Decimal>,
    low: Option<Decimal>,
    close: Option<Decimal>,
    provenance: Provenance,
}

impl Bar {
    pub fn new(open: Decimal, high: Decimal, low: Decimal, close: Decimal) -> Self {
        Self {
            open: Some(open),
            high: Some(high),
            low: Some(low),
            close: Some(close),
            provenance: Provenance::default(),
        }
    }

    pub fn with_provenance(
        open: Decimal,
        high: Decimal,
        low: Decimal,
        close: Decimal,
        provenance: Provenance,
    ) -> Self {
        Self {
            open: Some(open),
            high: Some(high),
            low: Some(low),
            close: Some(close),
            provenance,
        }
    }

    pub fn open(&self) -> Option<Decimal> {
        self.open
    }

    pub fn high(&self) -> Option<Decimal> {
        self.high
    }

    pub fn low(&self) -> Option<Decimal> {
        self.low
    }

    pub fn close(&self) -> Option<Decimal> {
        self.close
    }
}

impl Record for Bar {
    fn field_count() -> usize {
        4
    }

    fn fields(&self) -> Vec<Option<Decimal>> {
        vec![self.open, self.high, self.low, self.close]
    }

    fn from_fields(fields: &[Option<Decimal>], provenance: Provenance) -> Self {
        Self {
            open: fields.first().copied().flatten(),
            high: fields.get(1).copied().flatten(),
            low: fields.get(2).copied().flatten(),
            close: fields.get(3).copied().flatten(),
            provenance,
        }
    }

    fn provenance(&self) -> Provenance {
        self.provenance
    }

    fn empty() -> Self {
        Self {
            open: None,
            high: None,
            low: None,
            close: None,
            provenance: Provenance::default(),
        }
    }

    fn one() -> Self {
        Self::new(Decimal::ONE, Decimal::ONE, Decimal::ONE, Decimal::ONE)
    }
}

/// A two-sided bid/ask quote.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    bid: Option<Decimal>,
    ask: Option<Decimal>,
    provenance: Provenance,
}

impl Quote {
    pub fn new(bid: Decimal, ask: Decimal) -> Self {
        Self {
            bid: Some(bid),
            ask: Some(ask),
            provenance: Provenance::default(),
        }
    }

    pub fn with_provenance(bid: Decimal, ask: Decimal, provenance: Provenance) -> Self {
        Self {
            bid: Some(bid),
            ask: Some(ask),
            provenance,
        }
    }

    pub fn bid(&self) -> Option<Decimal> {
        self.bid
    }

    pub fn ask(&self) -> Option<Decimal> {
        self.ask
    }
}

impl Record for Quote {
    fn field_count() -> usize {
        2
    }

    fn fields(&self) -> Vec<Option<Decimal>> {
        vec![self.bid, self.ask]
    }

    fn from_fields(fields: &[Option<Decimal>], provenance: Provenance) -> Self {
        Self {
            bid: fields.first().copied().flatten(),
            ask: fields.get(1).copied().flatten(),
            provenance,
        }
    }

    fn provenance(&self) -> Provenance {
        self.provenance
    }

    fn empty() -> Self {
        Self {
            bid: None,
            ask: None,
            provenance: Provenance::default(),
        }
    }

    fn one() -> Self {
        Self::new(Decimal::ONE, Decimal::ONE)
    }
}

/// A trade print: executed price and quantity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tick {
    price: Option<Decimal>,
    quantity: Option<Decimal>,
    provenance: Provenance,
}

impl Tick {
    pub fn new(price: Decimal, quantity: Decimal) -> Self {
        Self {
            price: Some(price),
            quantity: Some(quantity),
            provenance: Provenance::default(),
        }
    }

    pub fn with_provenance(price: Decimal, quantity: Decimal, provenance: Provenance) -> Self {
        Self {
            price: Some(price),
            quantity: Some(quantity),
            provenance,
        }
    }

    pub fn price(&self) -> Option<Decimal> {
        self.price
    }

    pub fn quantity(&self) -> Option<Decimal> {
        self.quantity
    }
}

impl Record for Tick {
    fn field_count() -> usize {
        2
    }

    fn fields(&self) -> Vec<Option<Decimal>> {
        vec![self.price, self.quantity]
    }

    fn from_fields(fields: &[Option<Decimal>], provenance: Provenance) -> Self {
        Self {
            price: fields.first().copied().flatten(),
            quantity: fields.get(1).copied().flatten(),
            provenance,
        }
    }

    fn provenance(&self) -> Provenance {
        self.provenance
    }

    fn empty() -> Self {
        Self {
            price: None,
            quantity: None,
            provenance: Provenance::default(),
        }
    }

    fn one() -> Self {
        Self::new(Decimal::ONE, Decimal::ONE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn observation_round_trips_through_fields() {
        let obs = Observation::new(dec!(101.25));
        let rebuilt = Observation::from_fields(&obs.fields(), obs.provenance());
        assert_eq!(obs, rebuilt);
    }

    #[test]
    fn empty_record_is_undefined_everywhere() {
        let empty = Bar::empty();
        assert!(!empty.is_defined());
        assert!(empty.is_zero());
        assert!(empty.fields().iter().all(Option::is_none));
    }

    #[test]
    fn zero_predicate_fires_on_any_zero_field() {
        let bar = Bar::new(dec!(1), dec!(2), dec!(0), dec!(3));
        assert!(bar.is_zero());

        let bar = Bar::new(dec!(1), dec!(2), dec!(1.5), dec!(3));
        assert!(!bar.is_zero());
    }

    #[test]
    fn provenance_merge_is_logical_or() {
        let rolled = Provenance::new(true, false);
        let synthetic = Provenance::new(false, true);
        let merged = rolled.merged(synthetic);
        assert!(merged.is_rolled);
        assert!(merged.is_synthetic);

        let clean = Provenance::default();
        assert_eq!(clean.merged(clean), clean);
    }

    #[test]
    fn one_factory_is_multiplicative_identity_shape() {
        assert_eq!(Quote::one().bid(), Some(Decimal::ONE));
        assert_eq!(Quote::one().ask(), Some(Decimal::ONE));
        assert_eq!(Tick::one().fields().len(), Tick::field_count());
    }
}
