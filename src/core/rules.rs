//! Field rules for contact form submissions.
//!
//! Every rule runs on every submission and all violations are reported
//! together.

use crate::domain::model::NewContactMessage;
use crate::utils::error::{ValidationError, ValidationErrors};
use regex::Regex;
use serde_json::{Map, Value};
use std::sync::OnceLock;

pub const NAME_MIN_CHARS: usize = 2;
pub const SUBJECT_MIN_CHARS: usize = 5;
pub const MESSAGE_MIN_CHARS: usize = 10;

fn email_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        // local-part "@" one or more dot-separated labels, TLD of 2+ letters
        Regex::new(r"^[A-Za-z0-9_'+\-.]*[A-Za-z0-9_+\-]@(?:[A-Za-z0-9][A-Za-z0-9\-]*\.)+[A-Za-z]{2,}$")
            .expect("email pattern is a valid regex")
    })
}

/// Counts Unicode scalar values; a UTF-16 code unit count (as browsers report) can be higher.
fn min_chars(value: &str, min: usize, label: &str) -> Option<String> {
    if value.chars().count() < min {
        Some(format!("{label} must be at least {min} characters."))
    } else {
        None
    }
}

fn name_rule(value: &str) -> Option<String> {
    min_chars(value, NAME_MIN_CHARS, "Name")
}

fn subject_rule(value: &str) -> Option<String> {
    min_chars(value, SUBJECT_MIN_CHARS, "Subject")
}

fn message_rule(value: &str) -> Option<String> {
    min_chars(value, MESSAGE_MIN_CHARS, "Message")
}

fn email_rule(value: &str) -> Option<String> {
    if is_valid_email(value) {
        None
    } else {
        Some("Please enter a valid email address.".to_string())
    }
}

pub fn is_valid_email(value: &str) -> bool {
    let Some((local, _)) = value.split_once('@') else {
        return false;
    };
    // The regex crate has no lookaround, so the dot placement checks live here.
    if local.starts_with('.') || value.contains("..") {
        return false;
    }
    email_pattern().is_match(value)
}

/// Check a decoded request body and reduce it to the four known fields.
///
/// Unknown keys are dropped. Missing keys and non-string values count as
/// violations of the field they belong to.
pub fn validate_submission(body: &Value) -> Result<NewContactMessage, ValidationErrors> {
    let Some(object) = body.as_object() else {
        return Err(ValidationErrors(vec![ValidationError::new(
            "body",
            "Request body must be a JSON object.",
        )]));
    };

    let mut errors = Vec::new();
    let name = check_field(object, "name", "Name", name_rule, &mut errors);
    let email = check_field(object, "email", "Email", email_rule, &mut errors);
    let subject = check_field(object, "subject", "Subject", subject_rule, &mut errors);
    let message = check_field(object, "message", "Message", message_rule, &mut errors);

    match (name, email, subject, message) {
        (Some(name), Some(email), Some(subject), Some(message)) if errors.is_empty() => Ok(
            NewContactMessage::from_validated(name, email, subject, message),
        ),
        _ => Err(ValidationErrors(errors)),
    }
}

fn check_field(
    object: &Map<String, Value>,
    field: &str,
    label: &str,
    rule: fn(&str) -> Option<String>,
    errors: &mut Vec<ValidationError>,
) -> Option<String> {
    let outcome = field_text(object, field, label).and_then(|text| match rule(text) {
        None => Ok(text.to_string()),
        Some(reason) => Err(reason),
    });
    match outcome {
        Ok(text) => Some(text),
        Err(reason) => {
            errors.push(ValidationError::new(field, reason));
            None
        }
    }
}

fn field_text<'a>(object: &'a Map<String, Value>, field: &str, label: &str) -> Result<&'a str, String> {
    match object.get(field) {
        Some(Value::String(text)) => Ok(text),
        None | Some(Value::Null) => Err(format!("{label} is required.")),
        Some(_) => Err(format!("{label} must be a string.")),
    }
}
