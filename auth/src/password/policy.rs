use regex::Regex;

use super::errors::PasswordError;

/// Character classes a password must contain by default:
/// lowercase, uppercase, digit and symbol.
pub const DEFAULT_REQUIRED_PATTERNS: [&str; 4] = ["[a-z]", "[A-Z]", r"\d", r"[^\da-zA-Z]"];

/// Password strength rules.
///
/// A password is accepted when its length (in characters) lies within
/// `min_length..=max_length` and every required pattern matches somewhere
/// in it.
#[derive(Debug, Clone)]
pub struct PasswordPolicy {
    min_length: usize,
    max_length: usize,
    required: Vec<Regex>,
}

impl PasswordPolicy {
    pub const DEFAULT_MIN_LENGTH: usize = 12;
    pub const DEFAULT_MAX_LENGTH: usize = 128;

    /// Build a policy from explicit bounds and patterns.
    ///
    /// # Errors
    /// * `InvalidPattern` - A pattern does not compile, or the bounds are inverted
    pub fn new<S: AsRef<str>>(
        min_length: usize,
        max_length: usize,
        patterns: &[S],
    ) -> Result<Self, PasswordError> {
        if min_length > max_length {
            return Err(PasswordError::InvalidPattern(format!(
                "minimum length {} exceeds maximum length {}",
                min_length, max_length
            )));
        }

        let required = patterns
            .iter()
            .map(|p| {
                Regex::new(p.as_ref())
                    .map_err(|e| PasswordError::InvalidPattern(format!("{}: {}", p.as_ref(), e)))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            min_length,
            max_length,
            required,
        })
    }

    /// Check a candidate password.
    ///
    /// # Errors
    /// * `TooWeak` - Length out of bounds or a required class is missing
    pub fn validate(&self, password: &str) -> Result<(), PasswordError> {
        let length = password.chars().count();
        if length < self.min_length || length > self.max_length {
            return Err(PasswordError::TooWeak(format!(
                "length must be between {} and {} characters",
                self.min_length, self.max_length
            )));
        }

        if let Some(missing) = self.required.iter().find(|re| !re.is_match(password)) {
            return Err(PasswordError::TooWeak(format!(
                "must match {}",
                missing.as_str()
            )));
        }

        Ok(())
    }

    pub fn is_valid(&self, password: &str) -> bool {
        self.validate(password).is_ok()
    }
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        let required = DEFAULT_REQUIRED_PATTERNS
            .iter()
            .filter_map(|p| Regex::new(p).ok())
            .collect();

        Self {
            min_length: Self::DEFAULT_MIN_LENGTH,
            max_length: Self::DEFAULT_MAX_LENGTH,
            required,
        }
    }
}
