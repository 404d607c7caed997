use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::application::models::{
    ApplicationRecord, ADDRESS, ADVANTAGES, AGE, CAMERA, EXPERIENCE_YEARS, FULL_NAME, LAPTOP,
    PHONE, SKILLS,
};

const MSG_REQUIRED: &str = "Majburiy maydon";
const MSG_NOT_TEXT: &str = "Matn ko‘rinishida yuboring";
const MSG_NOT_A_NUMBER: &str = "Son kiriting";
const MSG_NOT_INTEGER: &str = "Butun son kiriting";

const MIN_TEXT_CHARS: usize = 3;
const MIN_PHONE_CHARS: usize = 7;

/// Per-field error messages, keyed by the JSON field name.
/// A field can collect more than one message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<&'static str, Vec<String>>);

impl ValidationErrors {
    fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.entry(field).or_default().push(message.into());
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Names of the fields that failed, in sorted order.
    pub fn fields(&self) -> Vec<&'static str> {
        self.0.keys().copied().collect()
    }

    pub fn messages(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Validates a raw submission body.
///
/// Every field is checked; the returned error map holds all failures at once
/// so the form can highlight them together. There is no partial acceptance.
pub fn validate_application(body: &Map<String, Value>) -> Result<ApplicationRecord, ValidationErrors> {
    let mut errors = ValidationErrors::default();

    let full_name = min_chars_text(
        &mut errors,
        body,
        FULL_NAME,
        MIN_TEXT_CHARS,
        "Ism-familya kamida 3 ta belgi",
    );
    let phone = phone_number(&mut errors, body);
    let age = bounded_integer(
        &mut errors,
        body,
        AGE,
        14,
        80,
        "Yosh 14 dan 80 gacha bo‘lishi kerak",
    );
    let experience_years = bounded_integer(
        &mut errors,
        body,
        EXPERIENCE_YEARS,
        0,
        50,
        "Ish staji 0 dan 50 yilgacha bo‘lishi kerak",
    );
    let address = min_chars_text(
        &mut errors,
        body,
        ADDRESS,
        MIN_TEXT_CHARS,
        "Manzil kamida 3 ta belgi",
    );
    let camera = optional_text(&mut errors, body, CAMERA);
    let laptop = optional_text(&mut errors, body, LAPTOP);
    let skills = min_chars_text(
        &mut errors,
        body,
        SKILLS,
        MIN_TEXT_CHARS,
        "Nimalarni bilishingizni yozing",
    );
    let advantages = min_chars_text(
        &mut errors,
        body,
        ADVANTAGES,
        MIN_TEXT_CHARS,
        "Afzalliklaringizni yozing",
    );

    // Each helper yields None exactly when it recorded an error for its field.
    let (
        Some(full_name),
        Some(phone),
        Some(age),
        Some(experience_years),
        Some(address),
        Some(camera),
        Some(laptop),
        Some(skills),
        Some(advantages),
    ) = (
        full_name,
        phone,
        age,
        experience_years,
        address,
        camera,
        laptop,
        skills,
        advantages,
    )
    else {
        return Err(errors);
    };

    Ok(ApplicationRecord {
        full_name,
        phone,
        age,
        experience_years,
        address,
        camera,
        laptop,
        skills,
        advantages,
    })
}

/// Returns the field as a string, recording an error when it is missing or
/// not a JSON string.
fn required_text<'a>(
    errors: &mut ValidationErrors,
    body: &'a Map<String, Value>,
    field: &'static str,
) -> Option<&'a str> {
    match body.get(field) {
        Some(Value::String(s)) => Some(s.as_str()),
        None | Some(Value::Null) => {
            errors.add(field, MSG_REQUIRED);
            None
        }
        Some(_) => {
            errors.add(field, MSG_NOT_TEXT);
            None
        }
    }
}

fn min_chars_text(
    errors: &mut ValidationErrors,
    body: &Map<String, Value>,
    field: &'static str,
    min: usize,
    too_short: &str,
) -> Option<String> {
    let value = required_text(errors, body, field)?;
    if value.chars().count() < min {
        errors.add(field, too_short);
        return None;
    }
    Some(value.to_string())
}

fn phone_number(errors: &mut ValidationErrors, body: &Map<String, Value>) -> Option<String> {
    let value = required_text(errors, body, PHONE)?;

    // Both rules are reported when both fail.
    let long_enough = value.chars().count() >= MIN_PHONE_CHARS;
    let allowed_chars = !value.is_empty() && value.chars().all(is_phone_char);
    if !long_enough {
        errors.add(PHONE, "Telefon raqam noto‘g‘ri");
    }
    if !allowed_chars {
        errors.add(PHONE, "Faqat raqam va + - ( ) bo‘lsin");
    }

    (long_enough && allowed_chars).then(|| value.to_string())
}

fn is_phone_char(c: char) -> bool {
    c.is_ascii_digit() || matches!(c, '+' | '-' | '(' | ')') || c.is_whitespace()
}

/// Absent and null both mean "not provided" and default to empty text.
fn optional_text(
    errors: &mut ValidationErrors,
    body: &Map<String, Value>,
    field: &'static str,
) -> Option<String> {
    match body.get(field) {
        None | Some(Value::Null) => Some(String::new()),
        Some(Value::String(s)) => Some(s.clone()),
        Some(_) => {
            errors.add(field, MSG_NOT_TEXT);
            None
        }
    }
}

fn bounded_integer(
    errors: &mut ValidationErrors,
    body: &Map<String, Value>,
    field: &'static str,
    min: u8,
    max: u8,
    out_of_range: &str,
) -> Option<u8> {
    let raw = match body.get(field) {
        None | Some(Value::Null) => {
            errors.add(field, MSG_REQUIRED);
            return None;
        }
        Some(raw) => raw,
    };

    let Some(number) = coerce_number(raw) else {
        errors.add(field, MSG_NOT_A_NUMBER);
        return None;
    };
    if number.fract() != 0.0 {
        errors.add(field, MSG_NOT_INTEGER);
        return None;
    }
    if number < f64::from(min) || number > f64::from(max) {
        errors.add(field, out_of_range);
        return None;
    }

    Some(number as u8)
}

/// Accepts a JSON number or a numeric string. Blank text and non-finite
/// values are not numbers.
fn coerce_number(raw: &Value) -> Option<f64> {
    let number = match raw {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                return None;
            }
            s.parse::<f64>().ok()
        }
        _ => None,
    };
    number.filter(|n| n.is_finite())
}
