//! Provides a number of data types, methods, and traits to have more
//! fine-grained and strongly-typed control of numeric data.
//!
//! # Fixed-point settlement math
//!
//! Every quantity that crosses a settlement boundary (sizes, prices, fees,
//! accumulated values) is a fixed-point decimal with six fractional digits.
//! Results are truncated toward zero after every multiplication or
//! division, and products are always taken before quotients, so two runs
//! over the same inputs agree to the last unit.
//!
//! # Decimal256, UFixed6, Signed, NonZero
//!
//! Math is carried out on [Decimal256](cosmwasm_std::Decimal256), which
//! holds 18 fractional digits. On top of it:
//!
//! * `UnsignedDecimal`: a _trait_, not a concrete type, implemented by
//! `Decimal256` and `UFixed6`.
//!
//! * `UFixed6`: an unsigned newtype that only ever holds six fractional
//! digits.
//!
//! * `Signed<T>`: a newtype wrapper which allows for positive or negative
//! values. `Fixed6` is `Signed<UFixed6>` and `Number` is
//! `Signed<Decimal256>`, used for intermediate results that must stay exact
//! before being truncated.
//!
//! * `NonZero<T>`: a newtype wrapper which ensures that the value is not
//! zero, used for parameters that end up as divisors.
//!
//! ```
//! use perps_settlement_shared::number::*;
//!
//! let size: UFixed6 = "10".parse().unwrap();
//! let price: Fixed6 = "-1.5".parse().unwrap();
//! let notional = size.into_signed().checked_mul(price).unwrap();
//! assert_eq!(notional.to_string(), "-15");
//!
//! // Divisions truncate toward zero at six digits
//! let third = Fixed6::ONE.checked_div("3".parse().unwrap()).unwrap();
//! assert_eq!(third.to_string(), "0.333333");
//! ```

mod convert;
pub use convert::*;
mod ops;
pub use ops::*;
mod serialize;
use schemars::schema::{InstanceType, Metadata, SchemaObject};
use schemars::JsonSchema;
mod nonzero;
pub use self::types::*;

mod types;

// schemars could not figure out that it is serialized as a string
// so gotta impl it manually
impl<T: UnsignedDecimal> JsonSchema for Signed<T> {
    fn schema_name() -> String {
        "Signed decimal".to_owned()
    }

    fn is_referenceable() -> bool {
        false
    }

    fn json_schema(_: &mut schemars::gen::SchemaGenerator) -> schemars::schema::Schema {
        let mut obj = SchemaObject {
            instance_type: Some(InstanceType::String.into()),
            ..Default::default()
        };

        let mut meta = match obj.metadata {
            None => Box::new(Metadata::default()),
            Some(m) => m,
        };

        meta.description = Some(
            "A signed decimal, string encoded, e.g. \"-1.234567\"".to_string(),
        );

        obj.metadata = Some(meta);

        obj.into()
    }
}

impl<T: UnsignedDecimal> Signed<T> {
    /// absolute value
    pub fn abs(self) -> Self {
        Self::new_positive(self.value())
    }

    /// Absolute value, but return the `T` underlying type directly
    pub fn abs_unsigned(self) -> T {
        self.value()
    }

    /// Checks if this number is greater than 0.
    pub fn is_strictly_positive(&self) -> bool {
        !self.is_zero() && !self.is_negative()
    }

    /// Checks if this number is greater than or equal to 0.
    pub fn is_positive_or_zero(&self) -> bool {
        !self.is_negative()
    }

    /// Is the value 0?
    pub fn is_zero(&self) -> bool {
        self.value().is_zero()
    }

    /// -1, 0 or 1 depending on the sign of the value
    pub fn signum(&self) -> i8 {
        if self.is_zero() {
            0
        } else if self.is_negative() {
            -1
        } else {
            1
        }
    }

    /// The positive part of the value, zero when negative
    pub fn max_zero(self) -> Self {
        if self.is_negative() {
            Self::zero()
        } else {
            self
        }
    }

    /// The negative part of the value, zero when positive
    pub fn min_zero(self) -> Self {
        if self.is_negative() {
            self
        } else {
            Self::zero()
        }
    }

    /// Apply a function to the inner value and rewrap.
    ///
    /// This will keep the current sign (positive or negative) in place,
    /// respecting invariants that a value of 0 must have negative set to false.
    pub fn map<U: UnsignedDecimal, F: FnOnce(T) -> U>(self, f: F) -> Signed<U> {
        Signed::from_parts(f(self.value()), self.is_negative())
    }

    /// Like `map` but may fail
    pub fn try_map<E, U: UnsignedDecimal, F: FnOnce(T) -> Result<U, E>>(
        self,
        f: F,
    ) -> Result<Signed<U>, E> {
        f(self.value()).map(|value| Signed::from_parts(value, self.is_negative()))
    }
}

#[cfg(test)]
mod test {
    use super::{Fixed6, Number, UFixed6};
    use std::str::FromStr;

    #[test]
    fn number_default() {
        assert_eq!(Number::ZERO, Number::default());
        assert_eq!(Fixed6::ZERO, Fixed6::default());
    }

    #[test]
    fn fixed6_serde() {
        let res = Fixed6::from(300u64).checked_div(Fixed6::from(7u64)).unwrap();

        assert_eq!(serde_json::to_value(res).unwrap(), "42.857142");
        assert_eq!(
            serde_json::from_str::<Fixed6>("\"42.857142\"").unwrap(),
            res
        );

        let res = -res;

        assert_eq!(serde_json::to_value(res).unwrap(), "-42.857142");
        assert_eq!(
            serde_json::from_str::<Fixed6>("\"-42.857142\"").unwrap(),
            res
        );

        serde_json::from_str::<Fixed6>("\"1.0000001\"").unwrap_err();
        serde_json::from_str::<UFixed6>("\"-1\"").unwrap_err();
    }

    #[test]
    fn number_arithmetic() {
        let a = Number::from(300u64);
        let b = Number::from(7u64);

        assert_eq!((a + b).to_string(), "307");
        assert_eq!((a - b).to_string(), "293");
        assert_eq!((b - a).to_string(), "-293");
        assert_eq!((a * b).to_string(), "2100");
        assert_eq!((a / b).to_string(), "42.857142857142857142");

        let a = -a;
        let b = -b;
        assert_eq!((a + b).to_string(), "-307");
        assert_eq!((a - b).to_string(), "-293");
        assert_eq!((b - a).to_string(), "293");
        assert_eq!((a * b).to_string(), "2100");
        assert_eq!((a / b).to_string(), "42.857142857142857142");

        let a = -a;
        assert_eq!((a + b).to_string(), "293");
        assert_eq!((a - b).to_string(), "307");
        assert_eq!((b - a).to_string(), "-307");
        assert_eq!((a * b).to_string(), "-2100");
        assert_eq!((a / b).to_string(), "-42.857142857142857142");
    }

    #[test]
    fn fixed6_arithmetic_truncates_toward_zero() {
        let a = Fixed6::from_str("0.000001").unwrap();
        let half = Fixed6::from_str("0.5").unwrap();
        assert_eq!(a.checked_mul(half).unwrap(), Fixed6::ZERO);
        assert_eq!((-a).checked_mul(half).unwrap(), Fixed6::ZERO);

        let two = Fixed6::from(2u64);
        let three = Fixed6::from(3u64);
        assert_eq!(two.checked_div(three).unwrap().to_string(), "0.666666");
        assert_eq!((-two).checked_div(three).unwrap().to_string(), "-0.666666");
        assert_eq!(
            (-two).checked_div_floor(three).unwrap().to_string(),
            "-0.666667"
        );
        assert_eq!(two.checked_div_floor(three).unwrap().to_string(), "0.666666");
        assert_eq!(
            (-Fixed6::from(6u64)).checked_div_floor(three).unwrap(),
            -two
        );
    }

    #[test]
    fn mul_div_multiplies_first() {
        let a = Fixed6::from_str("0.000001").unwrap();
        let b = Fixed6::from(3u64);
        let c = Fixed6::from(2u64);
        // (a / c) * b would lose everything
        assert_eq!(a.checked_mul_div(b, c).unwrap().to_string(), "0.000001");
        assert_eq!(a.checked_div(c).unwrap().checked_mul(b).unwrap(), Fixed6::ZERO);
    }

    #[test]
    fn zero_str() {
        assert_eq!(Fixed6::from_str("0").unwrap().to_string(), "0");
        assert_eq!(Fixed6::from_str("-0").unwrap().to_string(), "0");
        assert!(!Fixed6::from_str("-0").unwrap().is_negative());
    }

    #[test]
    fn unsafe_div_sentinels() {
        let one = Fixed6::ONE;
        assert_eq!(one.unsafe_div(Fixed6::ZERO), Fixed6::max_value());
        assert_eq!((-one).unsafe_div(Fixed6::ZERO), Fixed6::min_value());
        assert_eq!(Fixed6::ZERO.unsafe_div(Fixed6::ZERO), Fixed6::ONE);
    }

    #[test]
    fn catch_overflow() {
        let big = Fixed6::max_value();
        big.checked_add(Fixed6::ONE).unwrap_err();
        big.checked_mul(Fixed6::from(2u64)).unwrap_err();
        Fixed6::ONE.checked_div(Fixed6::ZERO).unwrap_err();
    }

    #[test]
    fn raw_units() {
        assert_eq!(Fixed6::from_raw(-14_851_225).to_string(), "-14.851225");
        assert_eq!(Fixed6::from_raw(18).to_string(), "0.000018");
        assert_eq!(Fixed6::from_str("-0.03").unwrap().raw_i128().unwrap(), -30_000);
        assert_eq!(UFixed6::from_raw(5).to_string(), "0.000005");
    }

    #[test]
    fn number_cmp() {
        let a = Fixed6::from_str("4.2").unwrap();
        let b = Fixed6::from_str("0.007").unwrap();
        assert!(a > b);
        assert!(-a < b);
        assert!(-a < -b);
        assert_eq!(a.max(b), a);
        assert_eq!((-a).min(b), -a);
    }
}
