use std::collections::HashMap;

use axum::{Form, extract::rejection::FormRejection};
use bank::{Activity, Bank, Category};

use crate::error::AppError;

pub type Fields = HashMap<String, String>;

/// Form body as sent, repeated keys included.
pub type Pairs = Vec<(String, String)>;

/// Keeps the first value of a repeated key.
pub fn extract_form(form: Result<Form<Pairs>, FormRejection>) -> Result<Fields, AppError> {
    let Form(pairs) = form.map_err(|_| AppError::MalformedPayload)?;

    let mut fields = Fields::with_capacity(pairs.len());
    for (key, value) in pairs {
        fields.entry(key).or_insert(value);
    }

    Ok(fields)
}

/// Pulls the named fields in order. Absent and empty fields both count as missing.
pub fn required<'a, const N: usize>(
    fields: &'a Fields,
    names: [&'static str; N],
    message: &'static str,
) -> Result<[&'a str; N], AppError> {
    let mut values = [""; N];

    for (slot, name) in values.iter_mut().zip(names) {
        *slot = fields
            .get(name)
            .map(String::as_str)
            .filter(|value| !value.is_empty())
            .ok_or(AppError::MissingFields(message))?;
    }

    Ok(values)
}

pub fn parse_quantity(field: &'static str, value: &str) -> Result<f64, AppError> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|quantity| quantity.is_finite())
        .ok_or_else(|| AppError::InvalidQuantity {
            field,
            value: value.to_string(),
        })
}

/// One form field feeding one estimate.
pub struct Entry<'a> {
    pub category: Category,
    pub subtype: &'a str,
    pub field: &'static str,
    pub value: &'a str,
}

impl<'a> Entry<'a> {
    pub fn new(category: Category, subtype: &'a str, field: &'static str, value: &'a str) -> Self {
        Self {
            category,
            subtype,
            field,
            value,
        }
    }
}

/// Estimates every entry in order, stopping at the first failure.
pub fn estimate_entries(bank: &Bank, entries: &[Entry]) -> Result<Vec<f64>, AppError> {
    entries
        .iter()
        .map(|entry| -> Result<f64, AppError> {
            let quantity = parse_quantity(entry.field, entry.value)?;
            let activity = Activity::new(entry.category, entry.subtype, quantity);

            Ok(bank.estimate_activity(&activity)?)
        })
        .collect()
}
