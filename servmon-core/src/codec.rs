// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Record codec: boxing records into typed store items and back.
//!
//! Both directions are total. Integers and floats are stored as `N` with
//! their decimal text; floats always carry a fractional part or an exponent
//! (`2.0`, `1e20`) so that whole-valued floats keep their kind. Numeric text
//! written by someone else without a `.` (for example `"5"`) decodes as an
//! integer whenever it fits in an i64.

use crate::record::{Record, Value};
use crate::store::{AttributeValue, Item};

/// Box a record into the store's typed encoding.
pub fn encode(record: &Record) -> Item {
    record
        .fields()
        .map(|(field, value)| (field.clone(), encode_value(value)))
        .collect()
}

/// Unbox a store item into a record.
pub fn decode(item: Item) -> Record {
    item.into_iter()
        .map(|(field, value)| (field, decode_value(value)))
        .collect()
}

fn encode_value(value: &Value) -> AttributeValue {
    match value {
        Value::Str(s) => AttributeValue::S(s.clone()),
        Value::Int(i) => AttributeValue::N(i.to_string()),
        // Debug formatting keeps `.0` on whole floats.
        Value::Float(x) => AttributeValue::N(format!("{:?}", x)),
    }
}

fn decode_value(value: AttributeValue) -> Value {
    match value {
        AttributeValue::S(s) => Value::Str(s),
        AttributeValue::N(text) => decode_number(text),
        other => Value::Str(format!("unsupported type {}", other.tag())),
    }
}

fn decode_number(text: String) -> Value {
    if !text.contains('.') {
        if let Ok(i) = text.parse::<i64>() {
            return Value::Int(i);
        }
    }

    match text.parse::<f64>() {
        Ok(x) => Value::Float(x),
        Err(_) => {
            tracing::warn!(text = %text, "Numeric attribute is not a number, keeping text");
            Value::Str(text)
        }
    }
}
