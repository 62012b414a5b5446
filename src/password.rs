//! Password strength checking and hashing.
//!
//! Raw passwords pass through [ValidatedPassword], which applies a strength
//! check, before they can be turned into a stored [PasswordHash].

use std::fmt::Display;

use bcrypt::{BcryptError, hash, verify};
use serde::{Deserialize, Serialize};
use zxcvbn::{Score, feedback::Feedback, zxcvbn};

use crate::Error;

/// A password that passed the strength check but has not been hashed yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidatedPassword(String);

impl ValidatedPassword {
    /// Check the strength of `raw_password_string` and wrap it if it is
    /// strong enough.
    ///
    /// # Errors
    ///
    /// Returns a [Error::TooWeak] holding the strength checker's feedback,
    /// which explains what makes the password weak and how to improve it.
    pub fn new(raw_password_string: &str) -> Result<Self, Error> {
        let password_analysis = zxcvbn(raw_password_string, &[]);

        match password_analysis.score() {
            Score::Three | Score::Four => Ok(Self(raw_password_string.to_string())),
            _ => Err(Error::TooWeak(
                password_analysis
                    .feedback()
                    .unwrap_or(&Feedback::default())
                    .to_string(),
            )),
        }
    }

    /// Wrap `raw_password_string` without checking its strength.
    ///
    /// Despite the `_unchecked` name this function is not `unsafe`: a weak
    /// password lets weak credentials into the system but cannot affect
    /// memory safety.
    pub fn new_unchecked(raw_password_string: &str) -> Self {
        Self(raw_password_string.to_string())
    }
}

impl Display for ValidatedPassword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", str::repeat("*", 8))
    }
}

/// A salted and hashed password as stored in the user table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// An alias for the default encryption cost for hashing passwords.
    pub const DEFAULT_COST: u32 = bcrypt::DEFAULT_COST;

    /// Hash a validated password with the given `cost`.
    ///
    /// `cost` sets the rounds of hashing and therefore how long verification
    /// takes. Use [PasswordHash::DEFAULT_COST] outside of tests, where a low
    /// cost keeps hashing fast.
    ///
    /// # Errors
    ///
    /// Returns a [Error::HashingError] if the password could not be hashed.
    pub fn new(password: ValidatedPassword, cost: u32) -> Result<Self, Error> {
        match hash(&password.0, cost) {
            Ok(password_hash) => Ok(Self(password_hash)),
            Err(e) => Err(Error::HashingError(e.to_string())),
        }
    }

    /// Wrap an existing hash string without validating it.
    ///
    /// Despite the `_unchecked` name this function is not `unsafe`: a
    /// malformed hash makes verification fail but cannot affect memory
    /// safety.
    pub fn new_unchecked(raw_password_hash: &str) -> Self {
        Self(raw_password_hash.to_string())
    }

    /// Validate and hash a raw password in one step.
    ///
    /// Named rather than exposed as `From<String>` or `FromStr` to make it
    /// clear that the input is a raw password, not an existing hash.
    ///
    /// # Errors
    ///
    /// Returns a [Error::TooWeak] if the password fails the strength check,
    /// or a [Error::HashingError] if it could not be hashed.
    pub fn from_raw_password(raw_password: &str, cost: u32) -> Result<Self, Error> {
        let validated_password = ValidatedPassword::new(raw_password)?;
        PasswordHash::new(validated_password, cost)
    }

    /// Check that `raw_password` matches the stored password.
    pub fn verify(&self, raw_password: &str) -> Result<bool, BcryptError> {
        verify(raw_password, &self.0)
    }
}

impl Display for PasswordHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
