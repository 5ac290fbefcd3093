#![allow(missing_docs)]
use super::{FeeCurve, PController, SynBook, UtilizationCurve};
use shared::prelude::*;

pub struct MarketParameterDefaults {}

impl MarketParameterDefaults {
    pub fn funding_fee() -> UFixed6 {
        "0.1".parse().unwrap()
    }
    pub fn interest_fee() -> UFixed6 {
        "0.1".parse().unwrap()
    }
    pub fn maker_fee() -> FeeCurve {
        FeeCurve {
            linear: "0.0002".parse().unwrap(),
            proportional: UFixed6::zero(),
            adiabatic: UFixed6::zero(),
            scale: "10000".parse().unwrap(),
        }
    }
    pub fn taker_fee() -> FeeCurve {
        FeeCurve {
            linear: "0.0005".parse().unwrap(),
            proportional: "0.002".parse().unwrap(),
            adiabatic: "0.001".parse().unwrap(),
            scale: "10000".parse().unwrap(),
        }
    }
    pub fn oracle_fee() -> UFixed6 {
        "0.1".parse().unwrap()
    }
    pub fn risk_fee() -> UFixed6 {
        "0.2".parse().unwrap()
    }
    pub fn referral_fee() -> UFixed6 {
        "0.1".parse().unwrap()
    }
    pub fn syn_book() -> SynBook {
        SynBook {
            d0: "0.001".parse().unwrap(),
            d1: "0.002".parse().unwrap(),
            d2: "0.004".parse().unwrap(),
            d3: "0.008".parse().unwrap(),
            scale: "10000".parse().unwrap(),
        }
    }
}

pub struct RiskParameterDefaults {}

impl RiskParameterDefaults {
    pub fn margin() -> UFixed6 {
        "0.05".parse().unwrap()
    }
    pub fn maintenance() -> UFixed6 {
        "0.03".parse().unwrap()
    }
    pub fn liquidation_fee() -> UFixed6 {
        "5".parse().unwrap()
    }
    pub fn p_controller() -> PController {
        // Reach a 100% annualized rate after a day at full skew
        PController {
            k: "86400".parse().unwrap(),
            min: "-1".parse().unwrap(),
            max: "1".parse().unwrap(),
        }
    }
    pub fn utilization_curve() -> UtilizationCurve {
        UtilizationCurve {
            min_rate: "0.02".parse().unwrap(),
            max_rate: "0.8".parse().unwrap(),
            target_rate: "0.08".parse().unwrap(),
            target_utilization: "0.8".parse().unwrap(),
        }
    }
}
