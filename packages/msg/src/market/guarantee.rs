//! Pre-agreed fills with a fixed price and fee
use shared::prelude::*;
use shared::storage::StorageRange;

use super::order::Order;

/// Where a guarantee is being stored.
///
/// Aggregated market guarantees have no meaningful notional or referral,
/// since those only make sense for a single account.
#[cw_serde]
#[derive(Copy, Eq)]
pub enum StorageScope {
    /// Summed across every account in the market
    Global,
    /// A single account
    Local,
}

/// A subset of an order's taker activity whose price and fee were fixed
/// out of band.
///
/// Every size must be covered by the same-period [Order], see
/// [Guarantee::validate_against].
#[cw_serde]
#[derive(Copy, Default, Eq)]
pub struct Guarantee {
    /// Number of orders that already paid their settlement fee
    pub orders: u64,
    /// Long increase
    pub long_pos: UFixed6,
    /// Long decrease
    pub long_neg: UFixed6,
    /// Short increase
    pub short_pos: UFixed6,
    /// Short decrease
    pub short_neg: UFixed6,
    /// Taker size exempt from the trade fee
    pub taker_fee: UFixed6,
    /// Fixed notional, positive for long-like fills
    pub notional: Fixed6,
    /// Referral fee owed on the guaranteed fill
    pub referral: UFixed6,
}

const ORDERS_RANGE: StorageRange = StorageRange::unsigned(32);
const SIZE_RANGE: StorageRange = StorageRange::unsigned(64);
const NOTIONAL_RANGE: StorageRange = StorageRange::signed(63);

impl Guarantee {
    /// Build the guarantee for a single account's order at an agreed price.
    ///
    /// A guarantee only ever covers taker activity, so a maker order yields
    /// an empty guarantee.
    pub fn from_order(
        order: &Order,
        price: Fixed6,
        referral_fee: UFixed6,
        charge_settlement_fee: bool,
        charge_trade_fee: bool,
    ) -> Result<Self> {
        if order.is_maker() {
            return Ok(Guarantee::default());
        }
        let mut guarantee = Guarantee {
            orders: if charge_settlement_fee { 0 } else { order.orders },
            long_pos: order.long_pos,
            long_neg: order.long_neg,
            short_pos: order.short_pos,
            short_neg: order.short_neg,
            taker_fee: UFixed6::zero(),
            notional: Fixed6::ZERO,
            referral: order.taker_referral.checked_mul(referral_fee)?,
        };
        if !charge_trade_fee {
            guarantee.taker_fee = guarantee.taker_total()?;
        }
        guarantee.notional = guarantee.taker()?.checked_mul(price)?;
        Ok(guarantee)
    }

    /// Signed taker size, positive when the fill pushes the skew long.
    pub fn taker(&self) -> Result<Fixed6> {
        self.taker_pos()?
            .into_signed()
            .checked_sub(self.taker_neg()?.into_signed())
    }

    /// `long_pos + short_neg`
    pub fn taker_pos(&self) -> Result<UFixed6> {
        self.long_pos.checked_add(self.short_neg)
    }

    /// `long_neg + short_pos`
    pub fn taker_neg(&self) -> Result<UFixed6> {
        self.long_neg.checked_add(self.short_pos)
    }

    /// Sum of all four sizes
    pub fn taker_total(&self) -> Result<UFixed6> {
        self.taker_pos()?.checked_add(self.taker_neg()?)
    }

    /// Value owed to the account for settling at `price` instead of the
    /// guaranteed price: `taker * price - notional`.
    pub fn price_adjustment(&self, price: Fixed6) -> Result<Fixed6> {
        self.taker()?.checked_mul(price)?.checked_sub(self.notional)
    }

    /// Relative distance between the guaranteed price and `price`.
    ///
    /// Measured against the smaller of the two prices in magnitude. A
    /// zero guaranteed price gives the maximum value, and prices of
    /// opposite sign land above two.
    pub fn price_deviation(&self, price: Fixed6) -> Result<UFixed6> {
        let taker = self.taker()?;
        if taker.is_zero() {
            return Ok(UFixed6::zero());
        }
        let guarantee_price = self.notional.checked_div(taker)?;
        let distance = guarantee_price.checked_sub(price)?.abs_unsigned();
        let base = guarantee_price.abs_unsigned().min(price.abs_unsigned());
        Ok(distance.unsafe_div(base))
    }

    /// The part of `order` left to go through the synthetic book.
    pub fn matching_order(&self, order: &Order) -> Result<Order> {
        self.validate_against(order)?;
        Ok(Order {
            orders: order.orders - self.orders,
            long_pos: order.long_pos.checked_sub(self.long_pos)?,
            long_neg: order.long_neg.checked_sub(self.long_neg)?,
            short_pos: order.short_pos.checked_sub(self.short_pos)?,
            short_neg: order.short_neg.checked_sub(self.short_neg)?,
            ..*order
        })
    }

    /// Every magnitude must fit inside the same-period order.
    pub fn validate_against(&self, order: &Order) -> Result<()> {
        let checks = [
            ("long_pos", self.long_pos, order.long_pos),
            ("long_neg", self.long_neg, order.long_neg),
            ("short_pos", self.short_pos, order.short_pos),
            ("short_neg", self.short_neg, order.short_neg),
            ("taker_fee", self.taker_fee, order.taker_total()?),
        ];
        for (name, guaranteed, ordered) in checks {
            perp_ensure!(
                guaranteed <= ordered,
                PerpError::InvalidGuarantee {
                    reason: format!("{name} of {guaranteed} exceeds the order's {ordered}")
                }
            );
        }
        perp_ensure!(
            self.orders <= order.orders,
            PerpError::InvalidGuarantee {
                reason: format!(
                    "{} guaranteed orders exceed the order count of {}",
                    self.orders, order.orders
                )
            }
        );
        Ok(())
    }

    /// The record as it is persisted in the given scope.
    pub fn scoped(&self, scope: StorageScope) -> Guarantee {
        match scope {
            StorageScope::Local => *self,
            StorageScope::Global => Guarantee {
                notional: Fixed6::ZERO,
                referral: UFixed6::zero(),
                ..*self
            },
        }
    }

    /// Aggregate a single account's guarantee into a market-wide one.
    pub fn checked_add(&self, rhs: &Guarantee) -> Result<Guarantee> {
        Ok(Guarantee {
            orders: self
                .orders
                .checked_add(rhs.orders)
                .context("guarantee order count overflow")?,
            long_pos: self.long_pos.checked_add(rhs.long_pos)?,
            long_neg: self.long_neg.checked_add(rhs.long_neg)?,
            short_pos: self.short_pos.checked_add(rhs.short_pos)?,
            short_neg: self.short_neg.checked_add(rhs.short_neg)?,
            taker_fee: self.taker_fee.checked_add(rhs.taker_fee)?,
            notional: self.notional.checked_add(rhs.notional)?,
            referral: self.referral.checked_add(rhs.referral)?,
        })
    }
}

impl StorageRangeCheck for Guarantee {
    fn check_storage_range(&self) -> Result<()> {
        ORDERS_RANGE.check_u64("guarantee.orders", self.orders)?;
        SIZE_RANGE.check_ufixed6("guarantee.long_pos", self.long_pos)?;
        SIZE_RANGE.check_ufixed6("guarantee.long_neg", self.long_neg)?;
        SIZE_RANGE.check_ufixed6("guarantee.short_pos", self.short_pos)?;
        SIZE_RANGE.check_ufixed6("guarantee.short_neg", self.short_neg)?;
        SIZE_RANGE.check_ufixed6("guarantee.taker_fee", self.taker_fee)?;
        NOTIONAL_RANGE.check_fixed6("guarantee.notional", self.notional)?;
        SIZE_RANGE.check_ufixed6("guarantee.referral", self.referral)
    }
}
