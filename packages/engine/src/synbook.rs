//! Spread pricing against the synthetic order book curve
use crate::prelude::*;

/// Pricing operations for a [SynBook].
pub trait SynBookExt {
    /// Spread owed for moving the book by `change`, starting from `latest`.
    ///
    /// The book price at a normalized skew `x = skew / scale` is the cubic
    /// `d0 + d1·x + d2·x² + d3·x³`, so the spread is its integral over the
    /// move multiplied by the notional `|change|·|price|`. Sells walk the
    /// mirrored curve. A move that would earn a rebate costs nothing.
    fn compute(&self, latest: Fixed6, change: Fixed6, price: Fixed6) -> Result<UFixed6>;
}

impl SynBookExt for SynBook {
    fn compute(&self, latest: Fixed6, change: Fixed6, price: Fixed6) -> Result<UFixed6> {
        if change.is_zero() {
            return Ok(UFixed6::zero());
        }

        let scale = self.scale.into_number();
        let mut from = latest.into_number().checked_div(scale)?;
        let mut to = latest.checked_add(change)?.into_number().checked_div(scale)?;
        if change.is_negative() {
            from = -from;
            to = -to;
        }
        let notional = change
            .abs()
            .into_number()
            .checked_mul(price.abs().into_number())?;

        let mut from_power = Number::ONE;
        let mut to_power = Number::ONE;
        let mut spread = Number::ZERO;
        for (degree, coefficient) in [self.d0, self.d1, self.d2, self.d3].into_iter().enumerate() {
            from_power = from_power.checked_mul(from)?;
            to_power = to_power.checked_mul(to)?;
            let order = Number::from(u64::try_from(degree)? + 1);
            let term = coefficient
                .into_signed()
                .into_number()
                .checked_mul(notional)?
                .checked_mul(to_power.checked_sub(from_power)?)?
                .checked_div(order)?;
            spread = spread.checked_add(term)?;
        }

        debug_log!(
            DebugLog::Matching,
            "synbook: latest {latest}, change {change}, price {price}, spread {spread}"
        );

        Ok(Fixed6::from_number(spread).max_zero().abs_unsigned())
    }
}
