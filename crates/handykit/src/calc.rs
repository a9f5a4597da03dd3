//! Arithmetic and unit conversion tools

use thiserror::Error;

/// USD → GBP rate used by [`usd_to_gbp`]
pub const USD_TO_GBP_RATE: f64 = 0.79;

/// Errors from the calculators
#[derive(Debug, Error, PartialEq)]
pub enum CalcError {
    /// A divisor was zero
    #[error("division by zero: {0} must be non-zero")]
    DivisionByZero(&'static str),

    /// Result does not fit in the output type
    #[error("arithmetic overflow")]
    Overflow,
}

/// Add two integers
pub fn add(a: i64, b: i64) -> Result<i64, CalcError> {
    a.checked_add(b).ok_or(CalcError::Overflow)
}

/// Convert US dollars to pounds sterling, rounded to 2 decimals
pub fn usd_to_gbp(amount: f64) -> f64 {
    (amount * USD_TO_GBP_RATE * 100.0).round() / 100.0
}

/// Height of a 16:9 screen of the given width
pub fn height_for_16_9(width: f64) -> f64 {
    width * 9.0 / 16.0
}

/// Body mass index from weight in kilograms and height in metres
pub fn bmi(weight_kg: f64, height_m: f64) -> Result<f64, CalcError> {
    let squared = height_m * height_m;
    if squared == 0.0 {
        return Err(CalcError::DivisionByZero("height_m"));
    }
    Ok(weight_kg / squared)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add() {
        assert_eq!(add(2, 3), Ok(5));
        assert_eq!(add(-1, 1), Ok(0));
        assert_eq!(add(0, 0), Ok(0));
        assert_eq!(add(i64::MAX, 1), Err(CalcError::Overflow));
    }

    #[test]
    fn test_usd_to_gbp() {
        assert_eq!(usd_to_gbp(100.0), 79.00);
        assert_eq!(usd_to_gbp(1.0), 0.79);
        assert_eq!(usd_to_gbp(0.0), 0.00);
        assert_eq!(usd_to_gbp(12.345), 9.75);
    }

    #[test]
    fn test_height_for_16_9() {
        assert_eq!(height_for_16_9(1920.0), 1080.0);
        assert_eq!(height_for_16_9(3840.0), 2160.0);
        assert_eq!(height_for_16_9(0.0), 0.0);
    }

    #[test]
    fn test_bmi() {
        let value = bmi(70.0, 1.75).unwrap();
        assert!((value - 22.86).abs() < 0.01, "got {value}");
    }

    #[test]
    fn test_bmi_zero_height() {
        assert_eq!(bmi(70.0, 0.0), Err(CalcError::DivisionByZero("height_m")));
        // Squares to zero in f64
        assert_eq!(
            bmi(70.0, 1e-200),
            Err(CalcError::DivisionByZero("height_m"))
        );
        assert_eq!(
            CalcError::DivisionByZero("height_m").to_string(),
            "division by zero: height_m must be non-zero"
        );
    }
}
