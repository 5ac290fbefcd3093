//! Signed exposure triples and the synthetic order book state.
use shared::prelude::*;

/// One of the three position categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, enum_iterator::Sequence)]
pub enum Tranche {
    /// Liquidity providers taking the other side of taker skew
    Maker,
    /// Long takers
    Long,
    /// Short takers
    Short,
}

/// Directional sensitivity of each tranche to price after socialization.
///
/// Never stored. Always recomputed in full from a
/// [Position](super::position::Position).
#[cw_serde]
#[derive(Copy, Default, Eq)]
pub struct Exposure {
    /// Maker exposure, opposite in sign to the taker skew
    pub maker: Fixed6,
    /// Long exposure, zero or positive
    pub long: Fixed6,
    /// Short exposure, zero or negative
    pub short: Fixed6,
}

impl Exposure {
    /// Negate every component.
    pub fn flip(self) -> Self {
        Exposure {
            maker: -self.maker,
            long: -self.long,
            short: -self.short,
        }
    }

    /// Element-wise `to - from`.
    pub fn change(from: &Exposure, to: &Exposure) -> Result<Exposure> {
        Ok(Exposure {
            maker: to.maker.checked_sub(from.maker)?,
            long: to.long.checked_sub(from.long)?,
            short: to.short.checked_sub(from.short)?,
        })
    }

    /// Sum of all three components.
    pub fn skew(&self) -> Result<Fixed6> {
        self.maker.checked_add(self.long)?.checked_add(self.short)
    }

    /// The component belonging to the given tranche.
    pub fn get(&self, tranche: Tranche) -> Fixed6 {
        match tranche {
            Tranche::Maker => self.maker,
            Tranche::Long => self.long,
            Tranche::Short => self.short,
        }
    }
}

/// Synthetic prices bracketing the skew, in units of skew.
///
/// The midpoint is fixed when the book is created. Fills only ever push
/// `ask` up and `bid` down, so `ask >= midpoint >= bid` holds throughout.
#[cw_serde]
#[derive(Copy, Default, Eq)]
pub struct OrderbookState {
    /// Skew at the start of the settlement period
    pub midpoint: Fixed6,
    /// Skew after all buy-side fills so far
    pub ask: Fixed6,
    /// Skew after all sell-side fills so far
    pub bid: Fixed6,
}

impl OrderbookState {
    /// A book with no fills, centered on the given skew.
    pub fn new(midpoint: Fixed6) -> Self {
        OrderbookState {
            midpoint,
            ask: midpoint,
            bid: midpoint,
        }
    }

    /// Shift `ask` by the positive part and `bid` by the negative part of `delta`.
    pub fn apply_signed(self, delta: Fixed6) -> Result<Self> {
        Ok(OrderbookState {
            midpoint: self.midpoint,
            ask: self.ask.checked_add(delta.max_zero())?,
            bid: self.bid.checked_add(delta.min_zero())?,
        })
    }

    /// Apply each component of an exposure change independently.
    pub fn apply_exposure(self, exposure: &Exposure) -> Result<Self> {
        self.apply_signed(exposure.maker)?
            .apply_signed(exposure.long)?
            .apply_signed(exposure.short)
    }
}
