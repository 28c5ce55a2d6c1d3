//! Fixed-width hex color tokens.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use serde::Serialize;

use crate::error::LightError;

/// Number of hex digits in a color token.
pub const COLOR_DIGITS: usize = 8;

/// Four color bytes in token order.
///
/// The plane layout reads the low three bytes as red, green and blue and
/// ignores the leading byte. The entry layout sends all four unchanged.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(into = "String")]
pub struct Color(u32);

impl Color {
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Bytes in token order, most significant first.
    pub fn bytes(&self) -> [u8; 4] {
        self.0.to_be_bytes()
    }

    pub fn red(&self) -> u8 {
        (self.0 >> 16) as u8
    }

    pub fn green(&self) -> u8 {
        (self.0 >> 8) as u8
    }

    pub fn blue(&self) -> u8 {
        self.0 as u8
    }
}

impl FromStr for Color {
    type Err = LightError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // `from_str_radix` alone would accept a leading '+'.
        if s.len() != COLOR_DIGITS || !s.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(LightError::InvalidColor(s.to_string()));
        }

        u32::from_str_radix(s, 16)
            .map(Color)
            .map_err(|_| LightError::InvalidColor(s.to_string()))
    }
}

impl Display for Color {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{:08X}", self.0)
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_token_order() {
        let color: Color = "FFFA710F".parse().unwrap();
        assert_eq!(color.bytes(), [0xFF, 0xFA, 0x71, 0x0F]);
        assert_eq!((color.red(), color.green(), color.blue()), (0xFA, 0x71, 0x0F));
    }

    #[test]
    fn hex_digits_ignore_case() {
        let upper: Color = "00ABCDEF".parse().unwrap();
        let lower: Color = "00abcdef".parse().unwrap();
        let mixed: Color = "00aBcDeF".parse().unwrap();
        assert_eq!(upper, lower);
        assert_eq!(upper, mixed);
    }

    #[test]
    fn formats_canonical_upper_case() {
        for token in ["ffbf0ffa", "00000000", "FFFFFFFF", "0a0B0c0D"] {
            let color: Color = token.parse().unwrap();
            assert_eq!(color.to_string(), token.to_uppercase());
        }
    }

    #[test]
    fn rejects_wrong_length() {
        for token in ["", "F", "FF0000", "FFFA710", "FFFA710F0", "0xFFFA710F"] {
            assert_eq!(
                token.parse::<Color>().unwrap_err(),
                LightError::InvalidColor(token.to_string()),
                "{token}"
            );
        }
    }

    #[test]
    fn rejects_non_hex_characters() {
        for token in ["GGGGGGGG", "+FFFFFFF", "-0000001", "FFFA71 F", "#FFA710F", "ffbf0ffä"] {
            assert!(token.parse::<Color>().is_err(), "{token}");
        }
    }

    #[test]
    fn serializes_as_hex_string() {
        let color = Color::new(0xFFBF0FFA);
        assert_eq!(serde_json::to_string(&color).unwrap(), "\"FFBF0FFA\"");
    }
}
