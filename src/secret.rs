//! Masked wrapper for credential values.

use std::fmt;

/// Fixed string shown in place of a masked value.
pub const MASK_DISPLAY: &str = "****";

/// A string that masks itself when displayed or debug-printed.
///
/// The raw value is only reachable through [`Secret::expose`], so a
/// password can never leak through default stringification.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// The raw value. Only the driver boundary should need this.
    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(MASK_DISPLAY)
    }
}

impl fmt::Display for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(MASK_DISPLAY)
    }
}

impl From<&str> for Secret {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Secret {
    fn from(value: String) -> Self {
        Self(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_and_display_mask() {
        let secret = Secret::new("hunter2");
        assert_eq!(format!("{:?}", secret), "****");
        assert_eq!(format!("{}", secret), "****");
    }

    #[test]
    fn test_expose_returns_raw_value() {
        let secret = Secret::new("hunter2");
        assert_eq!(secret.expose(), "hunter2");
    }
}
