//! Rules a new password must satisfy.

use gatehouse_core::config::AuthConfig;
use gatehouse_core::error::AppError;

/// Character classes required when strong passwords are on, with the
/// message reported when a class is missing.
const REQUIRED_CLASSES: [(fn(char) -> bool, &str); 4] = [
    (char::is_uppercase, "an uppercase letter"),
    (char::is_lowercase, "a lowercase letter"),
    (is_digit, "a digit"),
    (is_symbol, "a symbol"),
];

fn is_digit(c: char) -> bool {
    c.is_ascii_digit()
}

fn is_symbol(c: char) -> bool {
    !c.is_alphanumeric()
}

/// Length bounds always apply; character classes and a zxcvbn score of at
/// least 3 apply with `auth.require_strong_passwords`.
#[derive(Debug, Clone)]
pub struct PasswordPolicy {
    min_length: usize,
    max_length: usize,
    require_strong: bool,
}

impl PasswordPolicy {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            min_length: config.password_min_length,
            max_length: config.password_max_length,
            require_strong: config.require_strong_passwords,
        }
    }

    /// Check a password chosen at registration. Reports the first rule broken.
    pub fn validate(&self, password: &str) -> Result<(), AppError> {
        let length = password.chars().count();
        if !(self.min_length..=self.max_length).contains(&length) {
            return Err(AppError::validation(format!(
                "Password must be between {} and {} characters",
                self.min_length, self.max_length
            )));
        }
        if !self.require_strong {
            return Ok(());
        }

        let missing: Vec<&str> = REQUIRED_CLASSES
            .iter()
            .filter(|(class, _)| !password.chars().any(class))
            .map(|(_, name)| *name)
            .collect();
        if !missing.is_empty() {
            return Err(AppError::validation(format!(
                "Password must contain {}",
                missing.join(", ")
            )));
        }

        if zxcvbn::zxcvbn(password, &[]).score() < zxcvbn::Score::Three {
            return Err(AppError::validation(
                "Password is too easy to guess; use a longer or less common one",
            ));
        }
        Ok(())
    }

    /// Check a replacement password: the usual rules, and it must differ
    /// from the current one.
    pub fn validate_change(&self, current: &str, new: &str) -> Result<(), AppError> {
        self.validate(new)?;
        if current == new {
            return Err(AppError::validation(
                "New password must be different from the current password",
            ));
        }
        Ok(())
    }
}
