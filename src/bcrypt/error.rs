use std::fmt;

/// Errors raised by salt/hash generation, parsing, or comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BcryptError {
    /// `cost` was outside `[4, 31]`.
    InvalidCost(u32),
    /// A salt string didn't match `$2a$NN$<22 chars>` / `$2b$NN$<22 chars>`.
    InvalidSalt(String),
    /// A stored hash string didn't match the full 60-byte bcrypt format.
    InvalidHash(String),
    /// The system RNG failed while generating a salt.
    Rand(String),
}

impl fmt::Display for BcryptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidCost(c) => write!(f, "bcrypt cost {c} is outside the valid range [4, 31]"),
            Self::InvalidSalt(s) => write!(f, "malformed bcrypt salt string: '{s}'"),
            Self::InvalidHash(h) => write!(f, "malformed bcrypt hash string: '{h}'"),
            Self::Rand(e) => write!(f, "random number generation failed: {e}"),
        }
    }
}

impl std::error::Error for BcryptError {}

pub const CATEGORY: &str = "wireframe.bcrypt";

impl BcryptError {
    pub fn code(&self) -> u32 {
        match self {
            Self::InvalidCost(_) => 1,
            Self::InvalidSalt(_) => 2,
            Self::InvalidHash(_) => 3,
            Self::Rand(_) => 4,
        }
    }
}
