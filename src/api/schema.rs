//! Input schema for expense payloads.
//!
//! Payloads arrive as raw JSON and are checked field by field so that every
//! problem is reported at once, keyed by field name. Messages follow the
//! wording API clients already match on.

use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

pub const TITLE_MAX_LEN: usize = 255;

const MISSING: &str = "Missing data for required field.";
const NULL: &str = "Field may not be null.";
const NOT_STRING: &str = "Not a valid string.";
const NOT_NUMBER: &str = "Not a valid number.";
const UNKNOWN: &str = "Unknown field.";
const INVALID_INPUT: &str = "Invalid input type.";

/// Field name to list of human-readable messages.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

/// Validated payload for creating an expense
#[derive(Debug, Clone, PartialEq)]
pub struct NewExpense {
    pub title: String,
    pub amount: f64,
}

/// Validated payload for a partial update. `None` means "leave unchanged".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExpensePatch {
    pub title: Option<String>,
    pub amount: Option<f64>,
}

impl ExpensePatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.amount.is_none()
    }
}

/// Validate a create payload: both fields required.
pub fn validate_new(payload: &Value) -> Result<NewExpense, FieldErrors> {
    let object = as_object(payload)?;
    let mut errors = FieldErrors::new();

    let title = required(object, "title", &mut errors).and_then(|v| check_title(v, &mut errors));
    let amount = required(object, "amount", &mut errors).and_then(|v| check_amount(v, &mut errors));
    reject_unknown(object, &mut errors);

    match (title, amount) {
        (Some(title), Some(amount)) if errors.is_empty() => Ok(NewExpense { title, amount }),
        _ => Err(errors),
    }
}

/// Validate an update payload: any subset of fields, each checked if present.
pub fn validate_patch(payload: &Value) -> Result<ExpensePatch, FieldErrors> {
    let object = as_object(payload)?;
    let mut errors = FieldErrors::new();

    let patch = ExpensePatch {
        title: object.get("title").and_then(|v| check_title(v, &mut errors)),
        amount: object.get("amount").and_then(|v| check_amount(v, &mut errors)),
    };
    reject_unknown(object, &mut errors);

    if errors.is_empty() {
        Ok(patch)
    } else {
        Err(errors)
    }
}

fn as_object(payload: &Value) -> Result<&Map<String, Value>, FieldErrors> {
    payload.as_object().ok_or_else(|| {
        let mut errors = FieldErrors::new();
        errors.add("_schema", INVALID_INPUT);
        errors
    })
}

fn required<'a>(
    object: &'a Map<String, Value>,
    field: &str,
    errors: &mut FieldErrors,
) -> Option<&'a Value> {
    let value = object.get(field);
    if value.is_none() {
        errors.add(field, MISSING);
    }
    value
}

fn check_title(value: &Value, errors: &mut FieldErrors) -> Option<String> {
    match value {
        Value::Null => {
            errors.add("title", NULL);
            None
        }
        Value::String(s) => {
            let len = s.chars().count();
            if len < 1 {
                errors.add("title", "Shorter than minimum length 1.");
                None
            } else if len > TITLE_MAX_LEN {
                errors.add("title", format!("Longer than maximum length {}.", TITLE_MAX_LEN));
                None
            } else {
                Some(s.clone())
            }
        }
        _ => {
            errors.add("title", NOT_STRING);
            None
        }
    }
}

fn check_amount(value: &Value, errors: &mut FieldErrors) -> Option<f64> {
    match value {
        Value::Null => {
            errors.add("amount", NULL);
            None
        }
        Value::Number(n) => match n.as_f64() {
            Some(v) if v.is_finite() && v >= 0.0 => Some(v),
            Some(v) if v.is_finite() => {
                errors.add("amount", "Must be greater than or equal to 0.");
                None
            }
            _ => {
                errors.add("amount", NOT_NUMBER);
                None
            }
        },
        // no coercion from booleans or numeric strings
        _ => {
            errors.add("amount", NOT_NUMBER);
            None
        }
    }
}

fn reject_unknown(object: &Map<String, Value>, errors: &mut FieldErrors) {
    for key in object.keys() {
        if key != "title" && key != "amount" {
            errors.add(key.as_str(), UNKNOWN);
        }
    }
}
