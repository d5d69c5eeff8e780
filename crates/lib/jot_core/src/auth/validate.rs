//! Field validation for account data.
//!
//! The routing layer is expected to shape-check requests up front; the
//! account service re-checks the invariants it depends on here regardless.

use super::AuthError;

/// Lowercase + trim an email for storage and comparison.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Minimal email syntax check: one `@`, non-empty local part, dotted domain.
pub fn validate_email(email: &str) -> Result<(), AuthError> {
    let invalid = || AuthError::Validation("email is not valid".into());
    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || local.chars().any(char::is_whitespace) {
        return Err(invalid());
    }
    let labels: Vec<&str> = domain.split('.').collect();
    let domain_ok = labels.len() >= 2
        && labels.iter().all(|label| {
            !label.is_empty()
                && label
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '-')
        });
    if !domain_ok {
        return Err(invalid());
    }
    Ok(())
}

/// Free-form phone check: digits, spaces, `+`, `-`, parentheses; minimum
/// length 8.
pub fn validate_phone(phone: &str) -> Result<(), AuthError> {
    let trimmed = phone.trim();
    if trimmed.len() < 8 {
        return Err(AuthError::Validation(
            "phone must be at least 8 characters".into(),
        ));
    }
    let allowed = trimmed
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, ' ' | '+' | '-' | '(' | ')'));
    if !allowed {
        return Err(AuthError::Validation(
            "phone contains invalid characters".into(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalization_lowercases_and_trims() {
        assert_eq!(normalize_email("  A@X.Com "), "a@x.com");
    }

    #[test]
    fn email_accepts_common_shapes() {
        for email in ["a@b.com", "first.last@mail.example.org", "a-b@x-y.co"] {
            assert!(validate_email(email).is_ok(), "{email}");
        }
    }

    #[test]
    fn email_rejects_bad_shapes() {
        for email in ["", "plain", "@b.com", "a@", "a@nodot", "a b@x.com", "a@x..com"] {
            assert!(validate_email(email).is_err(), "{email}");
        }
    }

    #[test]
    fn phone_accepts_free_form() {
        for phone in ["5551234567", "+1 (555) 123-4567", "555 123 4567"] {
            assert!(validate_phone(phone).is_ok(), "{phone}");
        }
    }

    #[test]
    fn phone_rejects_short_or_alphabetic() {
        assert!(validate_phone("1234567").is_err());
        assert!(validate_phone("555-CALL-NOW").is_err());
    }
}
