//! Data model and helper types for perpetual-futures settlement.
#![deny(missing_docs)]
#![deny(clippy::as_conversions)]

pub mod market;
pub mod prelude;

/// Reexport the shared crate.
///
/// Reexported so that downstream tools only have to depend on one crate and
/// cannot accidentally mix incompatible versions of the number types.
pub use shared;

#[test]
fn unknown_fields_rejected() {
    use prelude::*;

    let receipt: OracleReceipt = serde_json::from_str(r#"{"settlement_fee":"0.5"}"#).unwrap();
    assert_eq!(receipt.settlement_fee, "0.5".parse().unwrap());
    serde_json::from_str::<OracleReceipt>(r#"{"settlement_fee":"0.5","oracle_fee":"0.1"}"#)
        .unwrap_err();
}
