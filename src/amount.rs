//! Validation for monetary amounts.

use crate::Error;

/// Check that `amount` is a finite number.
///
/// # Errors
/// Returns [Error::NonFiniteAmount] if `amount` is NaN or infinite.
pub(crate) fn require_finite(amount: f64) -> Result<f64, Error> {
    if amount.is_finite() {
        Ok(amount)
    } else {
        Err(Error::NonFiniteAmount)
    }
}

/// Check that `amount` is a finite number greater than zero.
///
/// # Errors
/// Returns [Error::NonFiniteAmount] if `amount` is NaN or infinite, or
/// [Error::NonPositiveAmount] if it is zero or negative.
pub(crate) fn require_positive(amount: f64) -> Result<f64, Error> {
    let amount = require_finite(amount)?;

    if amount > 0.0 {
        Ok(amount)
    } else {
        Err(Error::NonPositiveAmount(amount))
    }
}

#[cfg(test)]
mod tests {
    use crate::Error;

    use super::{require_finite, require_positive};

    #[test]
    fn positive_amount_is_accepted() {
        assert_eq!(require_positive(0.01), Ok(0.01));
    }

    #[test]
    fn zero_is_not_positive() {
        assert_eq!(require_positive(0.0), Err(Error::NonPositiveAmount(0.0)));
    }

    #[test]
    fn negative_amount_is_rejected() {
        assert_eq!(
            require_positive(-12.5),
            Err(Error::NonPositiveAmount(-12.5))
        );
    }

    #[test]
    fn nan_is_rejected() {
        assert_eq!(require_positive(f64::NAN), Err(Error::NonFiniteAmount));
        assert_eq!(require_finite(f64::NAN), Err(Error::NonFiniteAmount));
    }

    #[test]
    fn negative_amount_is_finite() {
        assert_eq!(require_finite(-3.0), Ok(-3.0));
    }
}
