//! Input validation for contact payloads and item names.
//!
//! Contact validation never fails fast: every offending field is reported in
//! one [`ValidationResult`]. Name validation percent-decodes the raw input
//! first (form style, `+` is a space) and returns the decoded name.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::error::CoreError;
use crate::model::ContactPayload;

pub const IDENTIFIER_MAX_LENGTH: usize = 254;
pub const PREFERRED_EMAIL_MAX_LENGTH: usize = 254;
pub const FIRST_NAME_MAX_LENGTH: usize = 50;
pub const SURNAME_MAX_LENGTH: usize = 50;

/// Longest folder or list name accepted.
pub const NAME_MAX_LENGTH: usize = 100;

/// Characters never permitted in folder or list names.
const RESERVED_NAME_CHARS: &[char] = &[
    '\\', '/', ':', '?', '"', '<', '>', '|', '[', ']', '*', '%', '$', '&', '#', '@', '^', '~',
    '{', '}', ';',
];

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?)+$",
    )
    .expect("email pattern compiles")
});

/// Why a field was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FieldErrorCode {
    Required,
    TooLong,
    InvalidFormat,
}

/// A single field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub code: FieldErrorCode,
    pub message: String,
}

impl FieldError {
    fn required(field: &str) -> Self {
        FieldError {
            field: field.to_string(),
            code: FieldErrorCode::Required,
            message: format!("{} is required", field),
        }
    }

    fn too_long(field: &str, max: usize) -> Self {
        FieldError {
            field: field.to_string(),
            code: FieldErrorCode::TooLong,
            message: format!("{} exceeds maximum length of {} characters", field, max),
        }
    }

    fn invalid_format(field: &str, reason: &str) -> Self {
        FieldError {
            field: field.to_string(),
            code: FieldErrorCode::InvalidFormat,
            message: format!("{}: {}", field, reason),
        }
    }
}

/// Aggregated outcome of validating a payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    pub errors: Vec<FieldError>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Errors reported against a single field.
    pub fn errors_for<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a FieldError> + 'a {
        self.errors.iter().filter(move |e| e.field == field)
    }

    /// Converts into `Err(CoreError::ValidationFailed)` when any error was found.
    pub fn into_result(self) -> Result<(), CoreError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(CoreError::ValidationFailed(self.errors))
        }
    }
}

/// Validates the fields required to create a contact.
pub fn validate_contact_payload(payload: &ContactPayload) -> ValidationResult {
    let mut result = ValidationResult::default();

    check_text(
        &mut result,
        "identifier",
        payload.identifier.as_deref(),
        IDENTIFIER_MAX_LENGTH,
    );
    if let Some(email) = check_text(
        &mut result,
        "preferred_email",
        payload.preferred_email.as_deref(),
        PREFERRED_EMAIL_MAX_LENGTH,
    ) {
        if !is_valid_email(email) {
            result.errors.push(FieldError::invalid_format(
                "preferred_email",
                "not a valid email address",
            ));
        }
    }
    check_text(
        &mut result,
        "first_name",
        payload.first_name.as_deref(),
        FIRST_NAME_MAX_LENGTH,
    );
    check_text(
        &mut result,
        "surname",
        payload.surname.as_deref(),
        SURNAME_MAX_LENGTH,
    );

    result
}

/// Records required/too-long errors; returns the value when it is present
/// and within length so callers can run format checks on it.
fn check_text<'a>(
    result: &mut ValidationResult,
    field: &str,
    value: Option<&'a str>,
    max: usize,
) -> Option<&'a str> {
    match value {
        None => {
            result.errors.push(FieldError::required(field));
            None
        }
        Some(v) if v.trim().is_empty() => {
            result.errors.push(FieldError::required(field));
            None
        }
        Some(v) if v.chars().count() > max => {
            result.errors.push(FieldError::too_long(field, max));
            None
        }
        Some(v) => Some(v),
    }
}

/// Email address syntax check.
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// Decodes and checks a folder or list name against the naming policy.
///
/// Returns the decoded name on success.
pub fn validate_name(raw: &str) -> Result<String, CoreError> {
    let invalid = |reason: &str| CoreError::InvalidName {
        name: raw.to_string(),
        reason: reason.to_string(),
    };

    let plus_as_space = raw.replace('+', " ");
    let decoded = urlencoding::decode(&plus_as_space)
        .map_err(|_| invalid("not valid UTF-8 after percent-decoding"))?
        .into_owned();

    if decoded.trim().is_empty() {
        return Err(invalid("name is empty"));
    }
    if decoded.trim() != decoded {
        return Err(invalid("leading or trailing whitespace"));
    }
    if decoded.chars().count() > NAME_MAX_LENGTH {
        return Err(invalid("name is too long"));
    }
    if decoded.ends_with('.') {
        return Err(invalid("name ends with a period"));
    }
    if let Some(c) = decoded
        .chars()
        .find(|c| c.is_control() || RESERVED_NAME_CHARS.contains(c))
    {
        return Err(invalid(&format!("character {:?} is not permitted", c)));
    }

    Ok(decoded)
}

/// Boolean form of [`validate_name`].
pub fn is_valid_name(raw: &str) -> bool {
    validate_name(raw).is_ok()
}

/// Case-insensitive name comparison used for sibling uniqueness.
pub fn same_name(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn payload(identifier: &str, email: &str, first: &str, surname: &str) -> ContactPayload {
        ContactPayload {
            contact_id: None,
            identifier: Some(identifier.to_string()),
            preferred_email: Some(email.to_string()),
            first_name: Some(first.to_string()),
            surname: Some(surname.to_string()),
        }
    }

    #[test]
    fn accepts_complete_payload() {
        let result = validate_contact_payload(&payload("jdoe", "jane@example.com", "Jane", "Doe"));
        assert!(result.is_valid(), "{:?}", result);
    }

    #[test]
    fn reports_every_missing_field() {
        let result = validate_contact_payload(&ContactPayload::default());
        assert_eq!(result.errors.len(), 4);
        assert!(result
            .errors
            .iter()
            .all(|e| e.code == FieldErrorCode::Required));
    }

    #[test]
    fn blank_counts_as_missing() {
        let result = validate_contact_payload(&payload("   ", "jane@example.com", "Jane", "Doe"));
        let errs: Vec<_> = result.errors_for("identifier").collect();
        assert_eq!(errs.len(), 1);
        assert_eq!(errs[0].code, FieldErrorCode::Required);
    }

    #[test]
    fn first_name_limit_is_fifty_chars() {
        let ok = "é".repeat(50);
        let too_long = "é".repeat(51);
        assert!(validate_contact_payload(&payload("id", "a@b.co", &ok, "Doe")).is_valid());
        let result = validate_contact_payload(&payload("id", "a@b.co", &too_long, "Doe"));
        assert_eq!(
            result.errors_for("first_name").next().map(|e| e.code),
            Some(FieldErrorCode::TooLong)
        );
    }

    #[test]
    fn malformed_email_is_rejected() {
        for bad in ["plainaddress", "@example.com", "jane@", "jane@@example.com", "jane@example"] {
            let result = validate_contact_payload(&payload("id", bad, "Jane", "Doe"));
            assert_eq!(
                result.errors_for("preferred_email").next().map(|e| e.code),
                Some(FieldErrorCode::InvalidFormat),
                "expected {bad} to be rejected"
            );
        }
    }

    #[test]
    fn into_result_carries_all_errors() {
        let err = validate_contact_payload(&payload("", "nope", "", "Doe"))
            .into_result()
            .unwrap_err();
        match err {
            CoreError::ValidationFailed(errors) => assert_eq!(errors.len(), 3),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn name_is_percent_decoded() {
        assert_eq!(validate_name("Spring%20Campaign").unwrap(), "Spring Campaign");
        assert_eq!(validate_name("Spring+Campaign").unwrap(), "Spring Campaign");
    }

    #[test]
    fn name_rejects_reserved_and_control_characters() {
        for bad in ["a/b", "a\\b", "what?", "a%2Fb", "tab\there", "x:y", "", "   ", "trail."] {
            assert!(!is_valid_name(bad), "expected {bad:?} to be rejected");
        }
    }

    #[test]
    fn name_rejects_overlong_input() {
        assert!(is_valid_name(&"n".repeat(NAME_MAX_LENGTH)));
        assert!(!is_valid_name(&"n".repeat(NAME_MAX_LENGTH + 1)));
    }

    #[test]
    fn same_name_ignores_case() {
        assert!(same_name("Spring", "sPRING"));
        assert!(!same_name("Spring", "Summer"));
    }

    proptest! {
        #[test]
        fn valid_payloads_have_no_errors(
            identifier in "[a-zA-Z0-9_-]{1,254}",
            local in "[a-z0-9]{1,30}",
            domain in "[a-z]{1,20}",
            tld in "[a-z]{2,6}",
            first in "[A-Za-z]{1,50}",
            surname in "[A-Za-z]{1,50}",
        ) {
            let email = format!("{local}@{domain}.{tld}");
            let result = validate_contact_payload(&payload(&identifier, &email, &first, &surname));
            prop_assert!(result.is_valid(), "{:?}", result);
        }

        #[test]
        fn overlong_identifier_is_flagged(identifier in "[a-z]{255,300}") {
            let result = validate_contact_payload(&payload(&identifier, "a@b.co", "Jane", "Doe"));
            prop_assert!(result.errors_for("identifier").any(|e| e.code == FieldErrorCode::TooLong));
            prop_assert_eq!(result.errors.len(), 1);
        }

        #[test]
        fn overlong_surname_is_flagged(surname in "[a-z]{51,80}") {
            let result = validate_contact_payload(&payload("id", "a@b.co", "Jane", &surname));
            prop_assert!(result.errors_for("surname").any(|e| e.code == FieldErrorCode::TooLong));
        }

        #[test]
        fn names_with_a_slash_are_rejected(prefix in "[a-z]{0,10}", suffix in "[a-z]{0,10}") {
            let name = format!("{prefix}/{suffix}");
            prop_assert!(!is_valid_name(&name));
        }
    }
}
