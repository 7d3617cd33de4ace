//! Shared validation utilities
//!
//! Field-level checks reused by the resource commands.
//!
//! # Examples
//!
//! ```rust,ignore
//! use stockroom_server::features::shared::validation::{validate_name, validate_email};
//!
//! validate_name(&command.name, CATEGORY_NAME_MAX)?;
//! validate_email(&command.email)?;
//! ```

use serde_json::Value as JsonValue;
use thiserror::Error;

/// Errors that can occur during name validation
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NameValidationError {
    #[error("Name is required and cannot be empty")]
    Required,

    #[error("Name must be between 1 and {max_length} characters")]
    TooLong { max_length: usize },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EmailValidationError {
    #[error("Email is required and cannot be empty")]
    Required,

    #[error("Email must be at most {max_length} characters")]
    TooLong { max_length: usize },

    #[error("Email address is invalid")]
    InvalidFormat,
}

/// Longest email address the users table accepts
pub const EMAIL_MAX_LENGTH: usize = 255;

/// Validate a name field
///
/// # Rules
/// - Must not be empty (after trimming whitespace)
/// - Must not exceed max_length characters
pub fn validate_name(name: &str, max_length: usize) -> Result<(), NameValidationError> {
    if name.trim().is_empty() {
        return Err(NameValidationError::Required);
    }

    if name.chars().count() > max_length {
        return Err(NameValidationError::TooLong { max_length });
    }

    Ok(())
}

/// Validate an email address
///
/// Only the basic `local@domain` shape is checked; deliverability is not.
pub fn validate_email(email: &str) -> Result<(), EmailValidationError> {
    let email = email.trim();
    if email.is_empty() {
        return Err(EmailValidationError::Required);
    }

    if email.chars().count() > EMAIL_MAX_LENGTH {
        return Err(EmailValidationError::TooLong {
            max_length: EMAIL_MAX_LENGTH,
        });
    }

    match email.split_once('@') {
        Some((local, domain))
            if !local.is_empty()
                && !domain.is_empty()
                && !domain.contains('@')
                && !email.contains(char::is_whitespace) =>
        {
            Ok(())
        },
        _ => Err(EmailValidationError::InvalidFormat),
    }
}

/// Check that a JSON document is an object, as required for free-form
/// attribute columns such as `metadata` or `contact_info`
pub fn is_json_object(value: &JsonValue) -> bool {
    value.is_object()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_validate_name_valid() {
        assert!(validate_name("Electronics", 255).is_ok());
        assert!(validate_name("a", 255).is_ok());
    }

    #[test]
    fn test_validate_name_empty() {
        assert_eq!(validate_name("", 255), Err(NameValidationError::Required));
        assert_eq!(validate_name("   ", 255), Err(NameValidationError::Required));
    }

    #[test]
    fn test_validate_name_too_long() {
        let long_name = "a".repeat(101);
        assert_eq!(
            validate_name(&long_name, 100),
            Err(NameValidationError::TooLong { max_length: 100 })
        );
    }

    #[test]
    fn test_validate_name_counts_characters_not_bytes() {
        let name = "é".repeat(100);
        assert!(validate_name(&name, 100).is_ok());
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("staff@example.com").is_ok());
        assert_eq!(validate_email(""), Err(EmailValidationError::Required));
        assert_eq!(validate_email("no-at-sign"), Err(EmailValidationError::InvalidFormat));
        assert_eq!(validate_email("@example.com"), Err(EmailValidationError::InvalidFormat));
        assert_eq!(validate_email("a@b@c"), Err(EmailValidationError::InvalidFormat));
        assert_eq!(validate_email("a b@c.com"), Err(EmailValidationError::InvalidFormat));
    }

    #[test]
    fn test_is_json_object() {
        assert!(is_json_object(&json!({"phone": "555"})));
        assert!(!is_json_object(&json!(["phone"])));
        assert!(!is_json_object(&json!("phone")));
    }
}
