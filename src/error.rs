//! Error taxonomy for the lighting pipeline.

use thiserror::Error;

/// Everything that can stop a run before or while talking to the keyboard.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LightError {
    /// Target is neither a key nor a group.
    #[error("Unknown key or group: {0}")]
    UnknownTarget(String),

    /// Color token is not exactly 8 hex digits.
    #[error("Invalid color: {0} (expected 8 hex digits, e.g. FFFA710F)")]
    InvalidColor(String),

    /// Arguments do not come in `target color` pairs.
    #[error("Malformed arguments: {0}")]
    MalformedArguments(String),

    /// A frame write failed or came up short.
    #[error("Transport error on frame {frame}: {reason}")]
    TransportError { frame: usize, reason: String },

    /// The control channel could not be acquired.
    #[error("Device unavailable: {0}")]
    DeviceUnavailable(String),
}

impl LightError {
    /// Process exit code for this error. These values are part of the CLI contract.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::MalformedArguments(_) => 2,
            Self::UnknownTarget(_) => 3,
            Self::InvalidColor(_) => 4,
            Self::DeviceUnavailable(_) => 5,
            Self::TransportError { .. } => 6,
        }
    }
}

pub type Result<T> = std::result::Result<T, LightError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_are_distinct_and_nonzero() {
        let errors = [
            LightError::MalformedArguments(String::new()),
            LightError::UnknownTarget(String::new()),
            LightError::InvalidColor(String::new()),
            LightError::DeviceUnavailable(String::new()),
            LightError::TransportError {
                frame: 0,
                reason: String::new(),
            },
        ];
        let mut codes: Vec<u8> = errors.iter().map(LightError::exit_code).collect();
        assert!(codes.iter().all(|&c| c > 1));
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
    }

    #[test]
    fn messages_carry_offending_token() {
        let err = LightError::UnknownTarget("foo".into());
        assert!(err.to_string().contains("foo"));
        let err = LightError::InvalidColor("12345".into());
        assert!(err.to_string().contains("12345"));
    }
}
