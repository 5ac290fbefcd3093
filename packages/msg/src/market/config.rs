//! Market and risk parameters
mod defaults;

use defaults::{MarketParameterDefaults, RiskParameterDefaults};
use shared::prelude::*;

/// Fee curve for one side of the book.
///
/// The linear and proportional components are charged on traded size, the
/// adiabatic component on the change in skew.
#[cw_serde]
#[derive(Copy, Eq)]
pub struct FeeCurve {
    /// Flat rate on notional
    pub linear: UFixed6,
    /// Rate on notional that grows with `size / scale`
    pub proportional: UFixed6,
    /// Rate charged on the change in squared skew
    pub adiabatic: UFixed6,
    /// Size at which the proportional rate is reached in full
    pub scale: NonZero<UFixed6>,
}

impl Default for FeeCurve {
    fn default() -> Self {
        FeeCurve {
            linear: UFixed6::zero(),
            proportional: UFixed6::zero(),
            adiabatic: UFixed6::zero(),
            scale: NonZero::one(),
        }
    }
}

/// Coefficients of the synthetic order book curve.
///
/// The marginal price of moving the skew to `x = skew / scale` is
/// `d0 + d1·x + d2·x² + d3·x³`.
#[cw_serde]
#[derive(Copy, Eq)]
pub struct SynBook {
    /// Constant term
    pub d0: UFixed6,
    /// Linear term
    pub d1: UFixed6,
    /// Quadratic term
    pub d2: UFixed6,
    /// Cubic term
    pub d3: UFixed6,
    /// Skew normalisation
    pub scale: NonZero<UFixed6>,
}

impl Default for SynBook {
    fn default() -> Self {
        SynBook {
            d0: UFixed6::zero(),
            d1: UFixed6::zero(),
            d2: UFixed6::zero(),
            d3: UFixed6::zero(),
            scale: NonZero::one(),
        }
    }
}

/// Proportional controller driving the funding rate.
#[cw_serde]
#[derive(Copy, Eq)]
pub struct PController {
    /// Seconds for a full unit of skew to move the rate by one
    pub k: NonZero<UFixed6>,
    /// Lowest annualized rate
    pub min: Fixed6,
    /// Highest annualized rate
    pub max: Fixed6,
}

impl Default for PController {
    fn default() -> Self {
        PController {
            k: NonZero::one(),
            min: Fixed6::ZERO,
            max: Fixed6::ZERO,
        }
    }
}

/// Piecewise-linear interest rate as a function of utilization.
#[cw_serde]
#[derive(Copy, Default, Eq)]
pub struct UtilizationCurve {
    /// Rate at zero utilization
    pub min_rate: UFixed6,
    /// Rate at full utilization
    pub max_rate: UFixed6,
    /// Rate at the target utilization
    pub target_rate: UFixed6,
    /// Kink of the curve, between 0 and 1
    pub target_utilization: UFixed6,
}

impl UtilizationCurve {
    /// Annualized rate at the given utilization.
    ///
    /// Utilization above one is treated as one.
    pub fn compute(&self, utilization: UFixed6) -> Result<UFixed6> {
        let utilization = utilization.min(UFixed6::one());
        if utilization <= self.target_utilization {
            if self.target_utilization.is_zero() {
                return Ok(self.target_rate);
            }
            interpolate(
                self.min_rate,
                self.target_rate,
                utilization,
                self.target_utilization,
            )
        } else {
            interpolate(
                self.target_rate,
                self.max_rate,
                utilization.checked_sub(self.target_utilization)?,
                UFixed6::one().checked_sub(self.target_utilization)?,
            )
        }
    }
}

/// `from + (to - from)·progress/span`, for either direction of slope.
fn interpolate(from: UFixed6, to: UFixed6, progress: UFixed6, span: UFixed6) -> Result<UFixed6> {
    let delta = to
        .into_signed()
        .checked_sub(from.into_signed())?
        .checked_mul_div(progress.into_signed(), span.into_signed())?;
    from.into_signed()
        .checked_add(delta)?
        .try_into_non_negative_value()
        .context("interpolated rate is negative")
}

/// Parameters that shape fees and pricing for a market.
#[cw_serde]
#[derive(Copy, Eq)]
pub struct MarketParameter {
    /// Fraction of funding kept as a fee
    #[serde(default = "MarketParameterDefaults::funding_fee")]
    pub funding_fee: UFixed6,
    /// Fraction of interest kept as a fee
    #[serde(default = "MarketParameterDefaults::interest_fee")]
    pub interest_fee: UFixed6,
    /// Fee curve for maker orders
    #[serde(default = "MarketParameterDefaults::maker_fee")]
    pub maker_fee: FeeCurve,
    /// Fee curve for taker orders
    #[serde(default = "MarketParameterDefaults::taker_fee")]
    pub taker_fee: FeeCurve,
    /// Fraction of market fees owed to the oracle
    #[serde(default = "MarketParameterDefaults::oracle_fee")]
    pub oracle_fee: UFixed6,
    /// Fraction of market fees owed to the risk fund
    #[serde(default = "MarketParameterDefaults::risk_fee")]
    pub risk_fee: UFixed6,
    /// Fraction of a referred taker's notional paid to the referrer
    #[serde(default = "MarketParameterDefaults::referral_fee")]
    pub referral_fee: UFixed6,
    /// Closed markets stop accruing funding, interest and price exposure
    #[serde(default)]
    pub closed: bool,
    /// Synthetic order book curve
    #[serde(default = "MarketParameterDefaults::syn_book")]
    pub syn_book: SynBook,
}

impl Default for MarketParameter {
    fn default() -> Self {
        MarketParameter {
            funding_fee: MarketParameterDefaults::funding_fee(),
            interest_fee: MarketParameterDefaults::interest_fee(),
            maker_fee: MarketParameterDefaults::maker_fee(),
            taker_fee: MarketParameterDefaults::taker_fee(),
            oracle_fee: MarketParameterDefaults::oracle_fee(),
            risk_fee: MarketParameterDefaults::risk_fee(),
            referral_fee: MarketParameterDefaults::referral_fee(),
            closed: false,
            syn_book: MarketParameterDefaults::syn_book(),
        }
    }
}

fn invalid(name: &str, reason: impl Into<String>) -> anyhow::Error {
    perp_anyhow!(PerpError::InvalidParameter {
        name: name.to_owned(),
        reason: reason.into(),
    })
}

fn ensure_fraction(name: &str, value: UFixed6) -> Result<()> {
    if value > UFixed6::one() {
        Err(invalid(name, format!("{value} is greater than 1")))
    } else {
        Ok(())
    }
}

impl MarketParameter {
    /// Check the fee fractions.
    pub fn validate(&self) -> Result<()> {
        ensure_fraction("funding_fee", self.funding_fee)?;
        ensure_fraction("interest_fee", self.interest_fee)?;
        ensure_fraction("oracle_fee", self.oracle_fee)?;
        ensure_fraction("risk_fee", self.risk_fee)?;
        ensure_fraction("referral_fee", self.referral_fee)?;
        let split = self.oracle_fee.checked_add(self.risk_fee)?;
        if split > UFixed6::one() {
            return Err(invalid(
                "oracle_fee",
                format!("oracle_fee + risk_fee is {split}, which leaves nothing for the protocol"),
            ));
        }
        Ok(())
    }
}

/// Parameters that bound risk and drive funding and interest.
#[cw_serde]
#[derive(Copy, Eq)]
pub struct RiskParameter {
    /// Initial margin fraction
    #[serde(default = "RiskParameterDefaults::margin")]
    pub margin: UFixed6,
    /// Maintenance margin fraction
    #[serde(default = "RiskParameterDefaults::maintenance")]
    pub maintenance: UFixed6,
    /// Multiple of the per-order settlement fee charged per liquidation
    #[serde(default = "RiskParameterDefaults::liquidation_fee")]
    pub liquidation_fee: UFixed6,
    /// Funding rate controller
    #[serde(default = "RiskParameterDefaults::p_controller")]
    pub p_controller: PController,
    /// Interest rate curve
    #[serde(default = "RiskParameterDefaults::utilization_curve")]
    pub utilization_curve: UtilizationCurve,
    /// Makers only ever receive funding
    #[serde(default)]
    pub maker_receive_only: bool,
}

impl Default for RiskParameter {
    fn default() -> Self {
        RiskParameter {
            margin: RiskParameterDefaults::margin(),
            maintenance: RiskParameterDefaults::maintenance(),
            liquidation_fee: RiskParameterDefaults::liquidation_fee(),
            p_controller: RiskParameterDefaults::p_controller(),
            utilization_curve: RiskParameterDefaults::utilization_curve(),
            maker_receive_only: false,
        }
    }
}

impl RiskParameter {
    /// Check margins, controller bounds and curve ordering.
    pub fn validate(&self) -> Result<()> {
        ensure_fraction("margin", self.margin)?;
        if self.maintenance > self.margin {
            return Err(invalid(
                "maintenance",
                format!(
                    "maintenance {} is greater than margin {}",
                    self.maintenance, self.margin
                ),
            ));
        }
        if self.p_controller.min > self.p_controller.max {
            return Err(invalid(
                "p_controller",
                format!(
                    "min {} is greater than max {}",
                    self.p_controller.min, self.p_controller.max
                ),
            ));
        }
        let curve = &self.utilization_curve;
        ensure_fraction("utilization_curve.target_utilization", curve.target_utilization)?;
        if curve.min_rate > curve.target_rate || curve.target_rate > curve.max_rate {
            return Err(invalid(
                "utilization_curve",
                format!(
                    "rates must satisfy min {} <= target {} <= max {}",
                    curve.min_rate, curve.target_rate, curve.max_rate
                ),
            ));
        }
        Ok(())
    }
}

/// Both parameter sets, as loaded from a config file.
#[cw_serde]
#[derive(Copy, Default, Eq)]
pub struct SettlementConfig {
    /// Market parameters
    #[serde(default)]
    pub market: MarketParameter,
    /// Risk parameters
    #[serde(default)]
    pub risk: RiskParameter,
}

impl SettlementConfig {
    /// Parse and validate a JSON document. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: SettlementConfig =
            serde_json::from_str(json).context("Unable to parse settlement config")?;
        config.market.validate()?;
        config.risk.validate()?;
        Ok(config)
    }
}
