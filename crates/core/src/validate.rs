//! Field-level validation helpers shared by the record crates.

use crate::error::{DomainError, DomainResult};

/// Trim a required text field, rejecting blank input.
pub fn required_text(field: &'static str, value: Option<&str>) -> DomainResult<String> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(DomainError::validation(format!("{field} is required"))),
    }
}

/// Trim an optional text field; blank input collapses to `None`.
pub fn optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Required e-mail address. Only a shape check: one `@` with text on both sides.
pub fn required_email(field: &'static str, value: Option<&str>) -> DomainResult<String> {
    let email = required_text(field, value)?;
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() && !domain.contains('@') => {
            Ok(email)
        }
        _ => Err(DomainError::validation(format!("{field} must be a valid email address"))),
    }
}

/// Required integer that must not be negative.
pub fn non_negative(field: &'static str, value: Option<i64>) -> DomainResult<i64> {
    match value {
        Some(v) if v >= 0 => Ok(v),
        Some(_) => Err(DomainError::validation(format!("{field} cannot be negative"))),
        None => Err(DomainError::validation(format!("{field} is required"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_text_trims_and_rejects_blank() {
        assert_eq!(required_text("name", Some("  Widget ")).unwrap(), "Widget");
        assert!(required_text("name", Some("   ")).is_err());
        assert!(required_text("name", None).is_err());
    }

    #[test]
    fn optional_text_collapses_blank_to_none() {
        assert_eq!(optional_text(Some("")), None);
        assert_eq!(optional_text(Some(" x ")), Some("x".to_string()));
        assert_eq!(optional_text(None), None);
    }

    #[test]
    fn required_email_checks_shape() {
        assert!(required_email("email", Some("a@b.co")).is_ok());
        assert!(required_email("email", Some("nobody")).is_err());
        assert!(required_email("email", Some("@b.co")).is_err());
        assert!(required_email("email", Some("a@b@c")).is_err());
    }

    #[test]
    fn non_negative_requires_value() {
        assert_eq!(non_negative("quantity", Some(0)).unwrap(), 0);
        assert!(non_negative("quantity", Some(-1)).is_err());
        assert!(non_negative("quantity", None).is_err());
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Property: any non-negative value is accepted unchanged.
            #[test]
            fn non_negative_accepts_every_natural(v in 0i64..i64::MAX) {
                prop_assert_eq!(non_negative("quantity", Some(v)).unwrap(), v);
            }

            /// Property: surrounding whitespace never survives validation.
            #[test]
            fn required_text_output_is_trimmed(s in "[ \t]{0,3}[A-Za-z0-9]{1,20}[ \t]{0,3}") {
                let out = required_text("name", Some(&s)).unwrap();
                prop_assert_eq!(out.trim(), out.as_str());
            }
        }
    }
}
