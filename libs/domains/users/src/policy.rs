//! Acceptance rules for plaintext passwords.

/// Characters counted as "special" by [`PasswordPolicy::DEFAULT`].
pub const SPECIAL_CHARS: &str = "!@#$%^&*()_+-=[]{}|;:,.<>?";

/// Length bounds (in characters) plus the character classes a password
/// must draw from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordPolicy {
    pub min_chars: usize,
    pub max_chars: usize,
    pub special: &'static str,
}

/// The first rule a password breaks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyViolation {
    TooShort,
    TooLong,
    MissingUppercase,
    MissingLowercase,
    MissingDigit,
    MissingSpecial,
}

impl PolicyViolation {
    pub fn code(self) -> &'static str {
        match self {
            Self::TooShort => "password_too_short",
            Self::TooLong => "password_too_long",
            Self::MissingUppercase => "password_missing_uppercase",
            Self::MissingLowercase => "password_missing_lowercase",
            Self::MissingDigit => "password_missing_digit",
            Self::MissingSpecial => "password_missing_special",
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            Self::TooShort => "must be at least 8 characters",
            Self::TooLong => "cannot exceed 128 characters",
            Self::MissingUppercase => "needs an uppercase letter",
            Self::MissingLowercase => "needs a lowercase letter",
            Self::MissingDigit => "needs a digit",
            Self::MissingSpecial => "needs a special character",
        }
    }
}

impl PasswordPolicy {
    pub const DEFAULT: Self = Self {
        min_chars: 8,
        max_chars: 128,
        special: SPECIAL_CHARS,
    };

    pub fn check(&self, password: &str) -> Result<(), PolicyViolation> {
        let length = password.chars().count();
        if length < self.min_chars {
            return Err(PolicyViolation::TooShort);
        }
        if length > self.max_chars {
            return Err(PolicyViolation::TooLong);
        }

        let (mut upper, mut lower, mut digit, mut special) = (false, false, false, false);
        for c in password.chars() {
            upper |= c.is_uppercase();
            lower |= c.is_lowercase();
            digit |= c.is_ascii_digit();
            special |= self.special.contains(c);
        }

        match (upper, lower, digit, special) {
            (false, ..) => Err(PolicyViolation::MissingUppercase),
            (_, false, ..) => Err(PolicyViolation::MissingLowercase),
            (_, _, false, _) => Err(PolicyViolation::MissingDigit),
            (.., false) => Err(PolicyViolation::MissingSpecial),
            _ => Ok(()),
        }
    }
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self::DEFAULT
    }
}
