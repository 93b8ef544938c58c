use anyhow::ensure;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Non-negative amount in minor currency units, bounded by `i64::MAX` so that
/// profit arithmetic in signed cents cannot wrap.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money(u64);

impl Money {
    pub const ZERO: Money = Money(0);
    pub const MAX: Money = Money(i64::MAX as u64);

    pub fn from_cents(cents: i64) -> Option<Self> {
        u64::try_from(cents).ok().map(Money)
    }

    pub fn from_dollars(dollars: f64) -> Option<Self> {
        if !dollars.is_finite() || dollars < 0.0 {
            return None;
        }
        let cents = (dollars * 100.0).round();
        // i64::MAX is not representable as f64; the cast rounds up to 2^63.
        if cents >= i64::MAX as f64 {
            return None;
        }
        Some(Money(cents as u64))
    }

    pub fn cents(self) -> u64 {
        self.0
    }

    pub fn saturating_add(self, other: Money) -> Money {
        Money(self.0.saturating_add(other.0).min(Money::MAX.0))
    }

    fn signed_cents(self) -> i64 {
        i64::try_from(self.0).unwrap_or(i64::MAX)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${}.{:02}", self.0 / 100, self.0 % 100)
    }
}

/// Per-unit cost structure of a resale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UnitEconomics {
    pub buy_cost: Money,
    pub sale_price: Money,
    pub fees: Money,
}

impl UnitEconomics {
    pub fn try_new(buy_cost: Money, sale_price: Money, fees: Money) -> anyhow::Result<Self> {
        ensure!(buy_cost > Money::ZERO, "buy cost must be positive");
        Ok(Self {
            buy_cost,
            sale_price,
            fees,
        })
    }

    /// Net profit in minor units; negative when the unit loses money.
    pub fn net_profit_cents(&self) -> i64 {
        self.sale_price
            .signed_cents()
            .saturating_sub(self.fees.signed_cents())
            .saturating_sub(self.buy_cost.signed_cents())
    }

    pub fn roi_percent(&self) -> f64 {
        if self.buy_cost == Money::ZERO {
            return 0.0;
        }
        self.net_profit_cents() as f64 / self.buy_cost.cents() as f64 * 100.0
    }

    /// Highest buy cost that still reaches `target_roi_percent`.
    pub fn max_buy_cost_for(&self, target_roi_percent: f64) -> Money {
        let proceeds = self
            .sale_price
            .signed_cents()
            .saturating_sub(self.fees.signed_cents());
        if proceeds <= 0 {
            return Money::ZERO;
        }
        let max = proceeds as f64 / (1.0 + target_roi_percent / 100.0);
        Money::from_cents(max.floor() as i64).unwrap_or(Money::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dollars(v: f64) -> Money {
        Money::from_dollars(v).unwrap()
    }

    #[test]
    fn money_rejects_negative_amounts() {
        assert_eq!(Money::from_cents(-1), None);
        assert_eq!(Money::from_dollars(-0.5), None);
        assert_eq!(Money::from_dollars(f64::NAN), None);
        assert_eq!(Money::from_cents(1999).unwrap().to_string(), "$19.99");
    }

    #[test]
    fn huge_amounts_are_rejected_or_capped() {
        assert_eq!(Money::from_dollars(1e20), None);
        assert_eq!(Money::from_dollars(1e17), None);
        assert!(Money::from_dollars(1e15).is_some());
        assert_eq!(Money::MAX.saturating_add(dollars(1.0)), Money::MAX);

        let econ = UnitEconomics::try_new(dollars(10.0), Money::MAX, dollars(5.0)).unwrap();
        assert!(econ.net_profit_cents() > 0);
        assert!(econ.roi_percent() > 0.0);

        // Deserialized values above the bound still never wrap negative.
        let raw: Money = serde_json::from_str("18446744073709551615").unwrap();
        let econ = UnitEconomics::try_new(dollars(10.0), raw, Money::ZERO).unwrap();
        assert!(econ.net_profit_cents() > 0);
    }

    #[test]
    fn roi_and_max_buy_cost() {
        let econ = UnitEconomics::try_new(dollars(10.0), dollars(25.0), dollars(5.0)).unwrap();
        assert_eq!(econ.net_profit_cents(), 1000);
        assert!((econ.roi_percent() - 100.0).abs() < 1e-9);
        // (25 - 5) / 1.3 = 15.384...
        assert_eq!(econ.max_buy_cost_for(30.0), Money::from_cents(1538).unwrap());
    }

    #[test]
    fn losing_unit_has_negative_roi() {
        let econ = UnitEconomics::try_new(dollars(20.0), dollars(18.0), dollars(4.0)).unwrap();
        assert!(econ.roi_percent() < 0.0);
        assert!(UnitEconomics::try_new(Money::ZERO, dollars(1.0), Money::ZERO).is_err());
    }
}
