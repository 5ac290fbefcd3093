//! Order decomposition and spread matching against the synthetic book.
//!
//! An order is split into four stages that run in a fixed sequence: makers
//! closing, takers pushing the skew positive, takers pushing it negative,
//! then makers opening. Each stage moves the exposure of every tranche. The
//! tranches that drive the stage pay spread for the move, and the tranches
//! whose exposure moved the other way receive it.
use crate::prelude::*;
use crate::synbook::SynBookExt;

const MAKERS: &[Tranche] = &[Tranche::Maker];
const TAKERS: &[Tranche] = &[Tranche::Long, Tranche::Short];

/// Spread paid and received in a single stage.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MatchingFill {
    /// Signed exposure the paying tranches took from the rest of the market
    pub size: Fixed6,
    /// Spread paid
    pub spread: UFixed6,
    /// Spread received by makers
    pub maker: UFixed6,
    /// Spread received by longs
    pub long: UFixed6,
    /// Spread received by shorts
    pub short: UFixed6,
}

impl MatchingFill {
    /// Spread received by the given tranche.
    pub fn received(&self, tranche: Tranche) -> UFixed6 {
        match tranche {
            Tranche::Maker => self.maker,
            Tranche::Long => self.long,
            Tranche::Short => self.short,
        }
    }

    fn received_mut(&mut self, tranche: Tranche) -> &mut UFixed6 {
        match tranche {
            Tranche::Maker => &mut self.maker,
            Tranche::Long => &mut self.long,
            Tranche::Short => &mut self.short,
        }
    }
}

/// Outcome of matching one order against the book.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MatchingResult {
    /// Makers closing
    pub maker_close: MatchingFill,
    /// Takers pushing the skew positive
    pub taker_pos: MatchingFill,
    /// Takers pushing the skew negative
    pub taker_neg: MatchingFill,
    /// Makers opening
    pub maker_open: MatchingFill,
    /// Total spread paid by fills pushing the book up
    pub spread_pos: UFixed6,
    /// Total spread paid by fills pushing the book down
    pub spread_neg: UFixed6,
    /// Book after every stage
    pub book: OrderbookState,
}

impl MatchingResult {
    /// Every stage in the order they were matched.
    pub fn fills(&self) -> [&MatchingFill; 4] {
        [
            &self.maker_close,
            &self.taker_pos,
            &self.taker_neg,
            &self.maker_open,
        ]
    }

    /// Total spread received by the tranche across all stages.
    pub fn received(&self, tranche: Tranche) -> Result<UFixed6> {
        self.fills()
            .into_iter()
            .try_fold(UFixed6::zero(), |total, fill| {
                total.checked_add(fill.received(tranche))
            })
    }
}

/// Match `order` against the book, starting from `position`.
///
/// Both taker stages start from the position left by the makers closing,
/// so neither taker direction gets a better price for going second. The
/// positive side only ever moves the ask and the negative side the bid.
pub fn match_order(
    position: &Position,
    order: &Order,
    syn_book: &SynBook,
    price: Fixed6,
) -> Result<MatchingResult> {
    let mut book = OrderbookState::new(position.skew()?);

    let closed = position.apply(&order.extract_maker_close())?;
    let maker_close = fill(&mut book, position, &closed, MAKERS, syn_book, price)?;

    let taker_pos_order = order.extract_taker_pos();
    let taker_neg_order = order.extract_taker_neg();

    let after_pos = closed.apply(&taker_pos_order)?;
    let taker_pos = fill(&mut book, &closed, &after_pos, TAKERS, syn_book, price)?;

    let mut neg_book = book;
    let after_neg = closed.apply(&taker_neg_order)?;
    let taker_neg = fill(&mut neg_book, &closed, &after_neg, TAKERS, syn_book, price)?;
    book.bid = neg_book.bid;

    let trued_up = after_pos.apply(&taker_neg_order)?;
    let opened = trued_up.apply(&order.extract_maker_open())?;
    let maker_open = fill(&mut book, &trued_up, &opened, MAKERS, syn_book, price)?;

    let mut result = MatchingResult {
        maker_close,
        taker_pos,
        taker_neg,
        maker_open,
        book,
        ..MatchingResult::default()
    };
    for stage in [maker_close, taker_pos, taker_neg, maker_open] {
        if stage.size.is_strictly_positive() {
            result.spread_pos = result.spread_pos.checked_add(stage.spread)?;
        } else if stage.size.is_negative() {
            result.spread_neg = result.spread_neg.checked_add(stage.spread)?;
        }
    }

    debug_log!(
        DebugLog::Matching,
        "matched {order:?}: spread pos {}, spread neg {}, book {:?}",
        result.spread_pos,
        result.spread_neg,
        result.book
    );

    Ok(result)
}

fn fill(
    book: &mut OrderbookState,
    from: &Position,
    to: &Position,
    ordering: &[Tranche],
    syn_book: &SynBook,
    price: Fixed6,
) -> Result<MatchingFill> {
    let change = Exposure::change(&from.exposure()?, &to.exposure()?)?;
    let other_side = |tranche: Tranche| {
        if ordering.contains(&tranche) {
            Fixed6::ZERO
        } else {
            change.get(tranche)
        }
    };
    // What the paying tranches took off the book, component by component
    let taken = Exposure {
        maker: other_side(Tranche::Maker),
        long: other_side(Tranche::Long),
        short: other_side(Tranche::Short),
    }
    .flip();
    let size = taken.skew()?;
    if size.is_zero() {
        return Ok(MatchingFill::default());
    }

    let latest = if size.is_negative() { book.bid } else { book.ask };
    let spread = syn_book.compute(latest, size, price)?;
    *book = book.apply_exposure(&taken)?;

    let receivers = enum_iterator::all::<Tranche>()
        .filter(|tranche| {
            let moved = taken.get(*tranche);
            !moved.is_zero() && moved.is_negative() == size.is_negative()
        })
        .collect::<Vec<_>>();
    let total = receivers.iter().try_fold(UFixed6::zero(), |total, tranche| {
        total.checked_add(taken.get(*tranche).abs_unsigned())
    })?;

    let mut fill = MatchingFill {
        size,
        spread,
        ..MatchingFill::default()
    };
    let mut remaining = spread;
    for (idx, tranche) in receivers.iter().enumerate() {
        // Last receiver takes the rounding dust
        let share = if idx + 1 == receivers.len() {
            remaining
        } else {
            spread.checked_mul_div(taken.get(*tranche).abs_unsigned(), total)?
        };
        remaining = remaining.checked_sub(share)?;
        *fill.received_mut(*tranche) = share;
    }
    Ok(fill)
}

/// Weight an order's sizes by the exposure ratios recorded on `version`.
///
/// Returns the positive and negative exposure-weighted sizes. These are the
/// quantities that per-unit spread values are charged against.
pub fn exposure_weighted(order: &Order, version: &Version) -> Result<(UFixed6, UFixed6)> {
    let terms = [
        order
            .long_pos
            .into_signed()
            .checked_mul(version.long_pos_exposure.into_signed())?,
        -order
            .long_neg
            .into_signed()
            .checked_mul(version.long_neg_exposure.into_signed())?,
        -order
            .short_pos
            .into_signed()
            .checked_mul(version.short_pos_exposure.into_signed())?,
        order
            .short_neg
            .into_signed()
            .checked_mul(version.short_neg_exposure.into_signed())?,
        order
            .maker_pos
            .into_signed()
            .checked_mul(version.maker_pos_exposure)?,
        -order
            .maker_neg
            .into_signed()
            .checked_mul(version.maker_neg_exposure)?,
    ];

    let mut pos = UFixed6::zero();
    let mut neg = UFixed6::zero();
    for term in terms {
        if term.is_negative() {
            neg = neg.checked_add(term.abs_unsigned())?;
        } else {
            pos = pos.checked_add(term.abs_unsigned())?;
        }
    }
    Ok((pos, neg))
}
