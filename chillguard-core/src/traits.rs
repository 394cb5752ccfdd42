//! Core traits shared by the calculators
//!
//! Keep them small: the analytics are free functions over a borrowed
//! [`Window`](crate::window::Window), so traits only exist where more than one
//! type has to answer the same question.

/// Trait for values that can be checked before entering a window
pub trait Validatable {
    /// Check if the value is usable (not NaN, infinite, etc)
    fn is_valid(&self) -> bool;
}

impl Validatable for f32 {
    fn is_valid(&self) -> bool {
        self.is_finite()
    }
}

impl Validatable for f64 {
    fn is_valid(&self) -> bool {
        self.is_finite()
    }
}

/// Fixed-precision rounding for reported KPIs
pub trait RoundTo {
    /// Round half away from zero to `decimals` places
    fn round_to(self, decimals: u32) -> Self;
}

impl RoundTo for f64 {
    fn round_to(self, decimals: u32) -> Self {
        let scale = libm::pow(10.0, decimals as f64);
        libm::round(self * scale) / scale
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validatable_floats() {
        assert!(5.0f64.is_valid());
        assert!(!f64::NAN.is_valid());
        assert!(!f64::INFINITY.is_valid());
        assert!(!f32::NEG_INFINITY.is_valid());
    }

    #[test]
    fn rounding() {
        assert_eq!(0.123456f64.round_to(4), 0.1235);
        assert_eq!(12.345f64.round_to(0), 12.0);
        assert_eq!((-0.00004f64).round_to(4), 0.0);
        assert_eq!(5100.0f64.round_to(2), 5100.0);
    }
}
