use serde::Serialize;
use std::fmt;
use std::ops::AddAssign;

/// Accumulated spend of a window, USD
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct Cost(f64);

impl Cost {
    #[inline]
    pub fn new(value: f64) -> Self {
        Cost(value)
    }

    #[inline]
    pub fn value(&self) -> f64 {
        self.0
    }

    /// Two-decimal currency string; tiny and negative-zero values print as `$0.00`
    pub fn to_formatted_string(&self) -> String {
        let shown = if self.0.abs() < 0.005 { 0.0 } else { self.0 };
        format!("${:.2}", shown)
    }
}

impl AddAssign<f64> for Cost {
    fn add_assign(&mut self, rhs: f64) {
        self.0 += rhs;
    }
}

impl fmt::Display for Cost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_formatted_string())
    }
}
