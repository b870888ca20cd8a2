//! Input validation for registration requests

use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;

use crate::models::JoinRequest;

/// Widest username the `users.username` column holds
pub const MAX_NAME_CHARS: usize = 64;
/// Widest email the `users.email` column holds
pub const MAX_EMAIL_CHARS: usize = 254;

/// A single rejected field and the reason
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

/// Validate every field of a [`JoinRequest`].
///
/// Every violated rule is reported, grouped by field in declaration order, so
/// one field may appear more than once. Equality of `password1` and
/// `password2` is not checked here.
pub fn validate_join_request(request: &JoinRequest) -> Result<(), Vec<FieldError>> {
    let checks = [
        ("email", email_violations(&request.email)),
        ("name", name_violations(&request.name)),
        (
            "password1",
            password_violations(
                &request.password1,
                "Password is required",
                "Password1 should be at least 2 characters",
            ),
        ),
        (
            "password2",
            password_violations(
                &request.password2,
                "Password confirmation is required",
                "Password2 should be at least 2 characters",
            ),
        ),
        ("termsAccepted", terms_violations(request.terms_accepted)),
    ];

    let errors: Vec<FieldError> = checks
        .into_iter()
        .flat_map(|(field, messages)| {
            messages.into_iter().map(move |message| FieldError {
                field,
                message: message.to_string(),
            })
        })
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Rules broken by an email address
pub fn email_violations(email: &str) -> Vec<&'static str> {
    static EMAIL_SHAPE: OnceLock<Regex> = OnceLock::new();
    let shape = EMAIL_SHAPE
        .get_or_init(|| Regex::new(r"^[^@\s]+@[^@\s]+$").expect("Failed to compile email regex"));

    static EMAIL_DOMAIN: OnceLock<Regex> = OnceLock::new();
    let domain = EMAIL_DOMAIN.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,6}$")
            .expect("Failed to compile email domain regex")
    });

    let mut violations = Vec::new();

    // An empty address has no shape to judge but still misses the domain pattern
    if email.is_empty() {
        violations.push("Email is required");
    } else if !shape.is_match(email) {
        violations.push("Invalid email format");
    }

    if !domain.is_match(email) {
        violations.push("Invalid email domain");
    }

    if email.chars().count() > MAX_EMAIL_CHARS {
        violations.push("Email should be at most 254 characters");
    }

    violations
}

/// Rules broken by a display/user name
pub fn name_violations(name: &str) -> Vec<&'static str> {
    let length = name.chars().count();
    let mut violations = Vec::new();

    if name.is_empty() {
        violations.push("Username is required");
    }

    if length < 3 {
        violations.push("Username should be at least 3 characters");
    }

    if length > MAX_NAME_CHARS {
        violations.push("Username should be at most 64 characters");
    }

    violations
}

fn password_violations(
    password: &str,
    required: &'static str,
    too_short: &'static str,
) -> Vec<&'static str> {
    let mut violations = Vec::new();

    if password.is_empty() {
        violations.push(required);
    }

    if password.chars().count() < 2 {
        violations.push(too_short);
    }

    violations
}

fn terms_violations(accepted: bool) -> Vec<&'static str> {
    if accepted {
        Vec::new()
    } else {
        vec!["You must accept the terms and conditions"]
    }
}
