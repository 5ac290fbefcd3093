use super::{Fixed6, Number, Signed, UFixed6, UnsignedDecimal};
use anyhow::{anyhow, Context, Result};
use std::cmp::Ordering;

// Multiplication and division are kept to the concrete types. Fixed6 math
// goes through Number so that every intermediate product is exact before
// the final truncation back to six digits.
//
// Addition and subtraction can be provided generically.

impl<T: UnsignedDecimal> Signed<T> {
    /// Addition that checks for integer overflow.
    pub fn checked_add(self, rhs: Self) -> Result<Self> {
        Ok(match (self.is_negative(), rhs.is_negative()) {
            (false, false) => Self::new_positive(self.value().checked_add(rhs.value())?),
            (true, true) => Self::new_negative(self.value().checked_add(rhs.value())?),
            (false, true) => {
                if self.value() >= rhs.value() {
                    Self::new_positive(self.value().checked_sub(rhs.value())?)
                } else {
                    Self::new_negative(rhs.value().checked_sub(self.value())?)
                }
            }
            (true, false) => {
                if self.value() >= rhs.value() {
                    Self::new_negative(self.value().checked_sub(rhs.value())?)
                } else {
                    Self::new_positive(rhs.value().checked_sub(self.value())?)
                }
            }
        })
    }

    /// Subtraction that checks for underflow
    pub fn checked_sub(self, rhs: Self) -> Result<Self> {
        self.checked_add(-rhs)
    }
}

impl Number {
    /// Multiplication that checks for integer overflow
    pub fn checked_mul(self, rhs: Self) -> Result<Self> {
        match self.value().checked_mul(rhs.value()).ok() {
            None => Err(anyhow!(
                "Overflow while multiplying {} and {}",
                self.value(),
                rhs.value()
            )),
            Some(value) => Ok(Signed::from_parts(
                value,
                self.is_negative() != rhs.is_negative(),
            )),
        }
    }

    /// Division that checks for underflow and divide-by-zero.
    pub fn checked_div(self, rhs: Self) -> Result<Self> {
        if rhs.is_zero() {
            Err(anyhow!("Cannot divide {self} by zero"))
        } else {
            match self.value().checked_div(rhs.value()).ok() {
                None => Err(anyhow!(
                    "Overflow while dividing {} by {}",
                    self.value(),
                    rhs.value()
                )),
                Some(value) => Ok(Signed::from_parts(
                    value,
                    self.is_negative() != rhs.is_negative(),
                )),
            }
        }
    }
}

impl Fixed6 {
    /// Multiplication, truncated toward zero.
    pub fn checked_mul(self, rhs: Self) -> Result<Self> {
        self.into_number()
            .checked_mul(rhs.into_number())
            .map(Fixed6::from_number)
    }

    /// Division, truncated toward zero.
    pub fn checked_div(self, rhs: Self) -> Result<Self> {
        self.into_number()
            .checked_div(rhs.into_number())
            .map(Fixed6::from_number)
    }

    /// Computes `self * num / den`, multiplying first, truncated toward zero.
    pub fn checked_mul_div(self, num: Self, den: Self) -> Result<Self> {
        self.into_number()
            .checked_mul(num.into_number())?
            .checked_div(den.into_number())
            .map(Fixed6::from_number)
    }

    /// Division rounded toward negative infinity.
    pub fn checked_div_floor(self, rhs: Self) -> Result<Self> {
        let truncated = self.checked_div(rhs)?;
        let exact = truncated.into_number().checked_mul(rhs.into_number())? == self.into_number();
        Self::floor_from_truncated(truncated, !exact && self.is_negative() != rhs.is_negative())
    }

    /// Computes `self * num / den` rounded toward negative infinity.
    pub fn checked_mul_div_floor(self, num: Self, den: Self) -> Result<Self> {
        let product = self.into_number().checked_mul(num.into_number())?;
        let truncated = Fixed6::from_number(product.checked_div(den.into_number())?);
        let exact = truncated.into_number().checked_mul(den.into_number())? == product;
        Self::floor_from_truncated(
            truncated,
            !exact && product.is_negative() != den.is_negative(),
        )
    }

    fn floor_from_truncated(truncated: Self, step_down: bool) -> Result<Self> {
        if step_down {
            truncated
                .checked_sub(Fixed6::from_raw(1))
                .context("floor division underflow")
        } else {
            Ok(truncated)
        }
    }

    /// Division that never fails on a zero divisor.
    ///
    /// `x / 0` saturates to the largest value carrying the sign of `x`, and
    /// `0 / 0` is one.
    pub fn unsafe_div(self, rhs: Self) -> Self {
        if rhs.is_zero() {
            if self.is_zero() {
                Fixed6::ONE
            } else if self.is_negative() {
                Fixed6::min_value()
            } else {
                Fixed6::max_value()
            }
        } else {
            self.checked_div(rhs).unwrap_or_else(|_| {
                if self.is_negative() != rhs.is_negative() {
                    Fixed6::min_value()
                } else {
                    Fixed6::max_value()
                }
            })
        }
    }
}

impl UFixed6 {
    /// Multiplication, truncated toward zero.
    pub fn checked_mul(self, rhs: Self) -> Result<Self> {
        self.into_decimal256()
            .checked_mul(rhs.into_decimal256())
            .map(UFixed6::from_decimal256)
            .with_context(|| format!("Overflow while multiplying {self} and {rhs}"))
    }

    /// Division, truncated toward zero.
    pub fn checked_div(self, rhs: Self) -> Result<Self> {
        if rhs.is_zero() {
            return Err(anyhow!("Cannot divide {self} by zero"));
        }
        self.into_decimal256()
            .checked_div(rhs.into_decimal256())
            .map(UFixed6::from_decimal256)
            .with_context(|| format!("Overflow while dividing {self} by {rhs}"))
    }

    /// Computes `self * num / den`, multiplying first, truncated toward zero.
    pub fn checked_mul_div(self, num: Self, den: Self) -> Result<Self> {
        if den.is_zero() {
            return Err(anyhow!("Cannot divide {self} * {num} by zero"));
        }
        self.into_decimal256()
            .checked_mul(num.into_decimal256())
            .ok()
            .and_then(|product| product.checked_div(den.into_decimal256()).ok())
            .map(UFixed6::from_decimal256)
            .with_context(|| format!("Overflow while computing {self} * {num} / {den}"))
    }

    /// Division where `x / 0` is the largest value and `0 / 0` is one.
    pub fn unsafe_div(self, rhs: Self) -> Self {
        if rhs.is_zero() {
            if self.is_zero() {
                UFixed6::one()
            } else {
                UFixed6::max_value()
            }
        } else {
            self.checked_div(rhs).unwrap_or_else(|_| UFixed6::max_value())
        }
    }
}

impl std::ops::Mul for Number {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        self.checked_mul(rhs).unwrap()
    }
}

impl std::ops::Div for Number {
    type Output = Self;

    fn div(self, rhs: Self) -> Self {
        self.checked_div(rhs).unwrap()
    }
}

impl<T: UnsignedDecimal> std::ops::Add for Signed<T> {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        self.checked_add(rhs).unwrap()
    }
}
impl<T: UnsignedDecimal> std::ops::AddAssign for Signed<T> {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl<T: UnsignedDecimal> std::ops::Sub for Signed<T> {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        self.checked_sub(rhs).unwrap()
    }
}

impl<T: UnsignedDecimal> std::ops::SubAssign for Signed<T> {
    fn sub_assign(&mut self, rhs: Self) {
        *self += -rhs;
    }
}

impl<T: UnsignedDecimal> std::cmp::PartialOrd for Signed<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T: UnsignedDecimal> std::cmp::Ord for Signed<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.is_positive_or_zero(), other.is_positive_or_zero()) {
            (true, true) => self.value().cmp(&other.value()),
            (false, false) => other.value().cmp(&self.value()),
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
        }
    }
}
