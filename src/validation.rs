//! Field rules for product payloads.
//!
//! Input is the raw JSON body. Strings are trimmed and empty strings count as
//! null before any rule runs. Each field reports at most one message: the first
//! rule it fails.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value;

use crate::database::models::{max_price, NewProduct, ProductPatch, PRICE_SCALE};

pub const NAME_MAX_CHARS: usize = 255;

/// Per-field validation messages, kept in rule order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors {
    entries: Vec<(String, Vec<String>)>,
}

impl FieldErrors {
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        let message = message.into();
        match self.entries.iter_mut().find(|(name, _)| name == field) {
            Some((_, messages)) => messages.push(message),
            None => self.entries.push((field.to_string(), vec![message])),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total number of messages across all fields
    pub fn len(&self) -> usize {
        self.entries.iter().map(|(_, messages)| messages.len()).sum()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.entries
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, messages)| messages.as_slice())
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    /// "The name field is required. (and 2 more errors)"
    pub fn summary(&self) -> String {
        let Some(first) = self.entries.first().and_then(|(_, messages)| messages.first()) else {
            return "The given data was invalid.".to_string();
        };
        match self.len() - 1 {
            0 => first.clone(),
            1 => format!("{} (and 1 more error)", first),
            n => format!("{} (and {} more errors)", first, n),
        }
    }

    fn capture<T>(&mut self, field: &str, result: Result<T, String>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(message) => {
                self.add(field, message);
                None
            }
        }
    }

    fn into_result<T>(self, value: impl FnOnce() -> Option<T>) -> Result<T, FieldErrors> {
        if !self.is_empty() {
            return Err(self);
        }
        value().ok_or(self)
    }
}

impl Serialize for FieldErrors {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (field, messages) in &self.entries {
            map.serialize_entry(field, messages)?;
        }
        map.end()
    }
}

/// Rules for `POST /api/products`
pub fn validate_create(input: &Value) -> Result<NewProduct, FieldErrors> {
    let mut errors = FieldErrors::default();

    let name = match lookup(input, "name") {
        Field::Missing | Field::Null => {
            errors.add("name", required("name"));
            None
        }
        Field::Present(v) => errors.capture("name", name_rule(&v)),
    };
    let description = match lookup(input, "description") {
        Field::Missing | Field::Null => Some(None),
        Field::Present(v) => errors.capture("description", string_rule("description", &v)).map(Some),
    };
    let price = match lookup(input, "price") {
        Field::Missing | Field::Null => {
            errors.add("price", required("price"));
            None
        }
        Field::Present(v) => errors.capture("price", price_rule(&v)),
    };
    let stock = match lookup(input, "stock") {
        Field::Missing | Field::Null => {
            errors.add("stock", required("stock"));
            None
        }
        Field::Present(v) => errors.capture("stock", stock_rule(&v)),
    };

    errors.into_result(|| {
        Some(NewProduct {
            name: name?,
            description: description?,
            price: price?,
            stock: stock?,
        })
    })
}

/// Rules for `PUT|PATCH /api/products/{id}`: only supplied keys are checked
/// and only they end up in the patch
pub fn validate_update(input: &Value) -> Result<ProductPatch, FieldErrors> {
    let mut errors = FieldErrors::default();
    let mut patch = ProductPatch::default();

    match lookup(input, "name") {
        Field::Missing => {}
        Field::Null => errors.add("name", required("name")),
        Field::Present(v) => patch.name = errors.capture("name", name_rule(&v)),
    }
    match lookup(input, "description") {
        Field::Missing => {}
        Field::Null => patch.description = Some(None),
        Field::Present(v) => {
            patch.description = errors.capture("description", string_rule("description", &v)).map(Some)
        }
    }
    match lookup(input, "price") {
        Field::Missing => {}
        Field::Null => errors.add("price", required("price")),
        Field::Present(v) => patch.price = errors.capture("price", price_rule(&v)),
    }
    match lookup(input, "stock") {
        Field::Missing => {}
        Field::Null => errors.add("stock", required("stock")),
        Field::Present(v) => patch.stock = errors.capture("stock", stock_rule(&v)),
    }

    errors.into_result(|| Some(patch))
}

enum Field {
    Missing,
    Null,
    Present(Value),
}

fn lookup(input: &Value, key: &str) -> Field {
    let Some(value) = input.as_object().and_then(|map| map.get(key)) else {
        return Field::Missing;
    };
    match value {
        Value::Null => Field::Null,
        Value::String(s) if s.trim().is_empty() => Field::Null,
        Value::String(s) => Field::Present(Value::String(s.trim().to_string())),
        Value::Array(items) if items.is_empty() => Field::Null,
        other => Field::Present(other.clone()),
    }
}

fn required(field: &str) -> String {
    format!("The {} field is required.", field)
}

fn string_rule(field: &str, value: &Value) -> Result<String, String> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| format!("The {} field must be a string.", field))
}

fn name_rule(value: &Value) -> Result<String, String> {
    let name = string_rule("name", value)?;
    if name.chars().count() > NAME_MAX_CHARS {
        return Err(format!(
            "The name field must not be greater than {} characters.",
            NAME_MAX_CHARS
        ));
    }
    Ok(name)
}

fn price_rule(value: &Value) -> Result<Decimal, String> {
    let price = parse_decimal(value).ok_or_else(|| "The price field must be a number.".to_string())?;
    if price.is_sign_negative() && !price.is_zero() {
        return Err("The price field must be at least 0.".to_string());
    }
    let max = max_price();
    if price.round_dp(PRICE_SCALE) > max {
        return Err(format!("The price field must not be greater than {}.", max));
    }
    Ok(price)
}

fn stock_rule(value: &Value) -> Result<i32, String> {
    let stock = parse_integer(value).ok_or_else(|| "The stock field must be an integer.".to_string())?;
    if stock < 0 {
        return Err("The stock field must be at least 0.".to_string());
    }
    i32::try_from(stock).map_err(|_| format!("The stock field must not be greater than {}.", i32::MAX))
}

fn parse_decimal(value: &Value) -> Option<Decimal> {
    let text = match value {
        Value::Number(n) => n.to_string(),
        Value::String(s) if s.contains('_') => return None,
        Value::String(s) => s.clone(),
        _ => return None,
    };
    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .ok()
}

fn parse_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            let f = n.as_f64()?;
            (f.fract() == 0.0 && f >= i64::MIN as f64 && f <= i64::MAX as f64).then_some(f as i64)
        }),
        Value::String(s) => s.parse::<i64>().ok(),
        _ => None,
    }
}
