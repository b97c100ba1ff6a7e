//! Password strength policy and hashing.
//!
//! The policy is an ordered chain of [`PasswordValidator`]s. Every validator
//! runs and the messages of all failing ones are returned together.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use serde::Deserialize;
use tracing::{debug, trace};

use crate::error::{AccountsError, Result};

/// Account attributes a password must not resemble.
#[derive(Debug, Clone, Copy)]
pub struct UserAttributes<'a> {
    pub username: &'a str,
    pub email: &'a str,
}

/// One rule of the password policy.
pub trait PasswordValidator: Send + Sync {
    /// Returns every message describing why `password` is rejected.
    fn validate(&self, password: &str, user: &UserAttributes<'_>) -> std::result::Result<(), Vec<String>>;
}

/// Rejects passwords shorter than `min_length` characters.
#[derive(Debug, Clone)]
pub struct MinimumLengthValidator {
    pub min_length: usize,
}

impl PasswordValidator for MinimumLengthValidator {
    fn validate(&self, password: &str, _user: &UserAttributes<'_>) -> std::result::Result<(), Vec<String>> {
        if password.chars().count() < self.min_length {
            return Err(vec![format!(
                "This password is too short. It must contain at least {} characters.",
                self.min_length
            )]);
        }
        Ok(())
    }
}

/// Rejects passwords that contain, or are contained in, an account attribute.
#[derive(Debug, Clone, Default)]
pub struct UserAttributeSimilarityValidator;

impl UserAttributeSimilarityValidator {
    /// Attributes shorter than this are too weak a signal to compare against.
    const MIN_ATTRIBUTE_LEN: usize = 3;
}

impl PasswordValidator for UserAttributeSimilarityValidator {
    fn validate(&self, password: &str, user: &UserAttributes<'_>) -> std::result::Result<(), Vec<String>> {
        let password = password.to_lowercase();
        let local_part = user.email.split('@').next().unwrap_or_default();
        let attributes = [
            ("username", user.username),
            ("email address", user.email),
            ("email address", local_part),
        ];

        for (name, value) in attributes {
            let value = value.to_lowercase();
            if value.chars().count() < Self::MIN_ATTRIBUTE_LEN {
                continue;
            }
            if password.contains(&value) || value.contains(&password) {
                return Err(vec![format!("The password is too similar to the {}.", name)]);
            }
        }
        Ok(())
    }
}

const COMMON_PASSWORDS: &[&str] = &[
    "000000", "111111", "123123", "123456", "1234567", "12345678", "123456789",
    "1234567890", "1q2w3e4r", "654321", "abc123", "access", "admin", "baseball",
    "changeme", "dragon", "football", "freedom", "hello123", "iloveyou", "letmein",
    "login", "master", "michael", "monkey", "passw0rd", "password", "password1",
    "password123", "princess", "qazwsx", "qwerty", "qwerty123", "secret", "shadow",
    "starwars", "sunshine", "superman", "trustno1", "welcome", "whatever", "zaq12wsx",
];

/// Rejects passwords found in a list of commonly used passwords.
#[derive(Debug, Clone, Default)]
pub struct CommonPasswordValidator;

impl PasswordValidator for CommonPasswordValidator {
    fn validate(&self, password: &str, _user: &UserAttributes<'_>) -> std::result::Result<(), Vec<String>> {
        let candidate = password.trim().to_lowercase();
        if COMMON_PASSWORDS.contains(&candidate.as_str()) {
            return Err(vec!["This password is too common.".to_string()]);
        }
        Ok(())
    }
}

/// Rejects passwords made only of digits.
#[derive(Debug, Clone, Default)]
pub struct NumericPasswordValidator;

impl PasswordValidator for NumericPasswordValidator {
    fn validate(&self, password: &str, _user: &UserAttributes<'_>) -> std::result::Result<(), Vec<String>> {
        if !password.is_empty() && password.chars().all(|c| c.is_ascii_digit()) {
            return Err(vec!["This password is entirely numeric.".to_string()]);
        }
        Ok(())
    }
}

/// Which password rules are active.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PasswordPolicyConfig {
    pub min_length: usize,
    pub user_attribute_similarity: bool,
    pub common_passwords: bool,
    pub numeric: bool,
}

impl Default for PasswordPolicyConfig {
    fn default() -> Self {
        Self {
            min_length: 8,
            user_attribute_similarity: true,
            common_passwords: true,
            numeric: true,
        }
    }
}

/// Ordered chain of password validators.
pub struct PasswordPolicy {
    validators: Vec<Box<dyn PasswordValidator>>,
}

impl PasswordPolicy {
    pub fn new(validators: Vec<Box<dyn PasswordValidator>>) -> Self {
        Self { validators }
    }

    pub fn from_config(config: &PasswordPolicyConfig) -> Self {
        let mut validators: Vec<Box<dyn PasswordValidator>> = Vec::new();
        if config.user_attribute_similarity {
            validators.push(Box::new(UserAttributeSimilarityValidator));
        }
        if config.min_length > 0 {
            validators.push(Box::new(MinimumLengthValidator {
                min_length: config.min_length,
            }));
        }
        if config.common_passwords {
            validators.push(Box::new(CommonPasswordValidator));
        }
        if config.numeric {
            validators.push(Box::new(NumericPasswordValidator));
        }
        Self::new(validators)
    }

    /// Runs every validator and returns all collected messages.
    pub fn validate(&self, password: &str, user: &UserAttributes<'_>) -> Vec<String> {
        trace!("Running {} password validators", self.validators.len());
        let messages: Vec<String> = self
            .validators
            .iter()
            .filter_map(|validator| validator.validate(password, user).err())
            .flatten()
            .collect();
        if !messages.is_empty() {
            debug!("Password rejected by {} rule(s)", messages.len());
        }
        messages
    }
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self::from_config(&PasswordPolicyConfig::default())
    }
}

impl std::fmt::Debug for PasswordPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordPolicy")
            .field("validators", &self.validators.len())
            .finish()
    }
}

/// Hash a password with Argon2 and a fresh random salt.
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AccountsError::PasswordHash(format!("Failed to hash password: {}", e)))?;

    Ok(hash.to_string())
}

/// Verify a password against a stored PHC hash. Malformed hashes never match.
pub fn verify_password(password: &str, hash: &str) -> bool {
    let parsed_hash = match PasswordHash::new(hash) {
        Ok(h) => h,
        Err(_) => return false,
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}
