//! Password strength classification.
//!
//! A secret scores one point for each of: more than 8 characters, at least one
//! ASCII letter together with at least one ASCII digit, and at least one of
//! the symbols `!@#$%^&*`.

use serde::Serialize;

const STRENGTH_SYMBOLS: [char; 8] = ['!', '@', '#', '$', '%', '^', '&', '*'];

/// Coarse strength bucket shown next to a secret.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PasswordStrength {
    Weak,
    Medium,
    Strong,
}

impl PasswordStrength {
    pub fn label(&self) -> &'static str {
        match self {
            PasswordStrength::Weak => "Weak",
            PasswordStrength::Medium => "Medium",
            PasswordStrength::Strong => "Strong",
        }
    }

    /// Display color as a hex string.
    pub fn color(&self) -> &'static str {
        match self {
            PasswordStrength::Weak => "#EF4444",
            PasswordStrength::Medium => "#CA8A04",
            PasswordStrength::Strong => "#16A34A",
        }
    }

    fn from_score(score: u8) -> Self {
        match score {
            0 | 1 => PasswordStrength::Weak,
            2 => PasswordStrength::Medium,
            _ => PasswordStrength::Strong,
        }
    }
}

/// Returns the 0–3 score for `secret`.
pub fn strength_score(secret: &str) -> u8 {
    let long_enough = secret.chars().count() > 8;
    let has_letter = secret.chars().any(|c| c.is_ascii_alphabetic());
    let has_digit = secret.chars().any(|c| c.is_ascii_digit());
    let has_symbol = secret.chars().any(|c| STRENGTH_SYMBOLS.contains(&c));

    u8::from(long_enough) + u8::from(has_letter && has_digit) + u8::from(has_symbol)
}

/// Classifies `secret`. Total over every string; the empty string is `Weak`.
pub fn get_strength(secret: &str) -> PasswordStrength {
    PasswordStrength::from_score(strength_score(secret))
}
