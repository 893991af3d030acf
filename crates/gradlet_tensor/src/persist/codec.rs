//! Nested bracketed literal encoding of tensor contents.
//!
//! The innermost level is a comma-joined list of numbers; each outer level
//! joins its children with `,\n`. A rank-0 tensor is a bare number. The text
//! is valid JSON, which is how it is read back.

use crate::{adapter::NestedData, Tensor};
use gradlet_core::error::{Error, Result};

pub fn encode(data: &NestedData) -> String {
    let mut out = String::new();
    write_nested(&mut out, data);
    out
}

fn write_nested(out: &mut String, data: &NestedData) {
    match data {
        NestedData::Number(value) => out.push_str(&format!("{:?}", value)),
        NestedData::List(items) => {
            let separator = match items.first() {
                Some(NestedData::List(_)) => ",\n",
                _ => ",",
            };
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push_str(separator);
                }
                write_nested(out, item);
            }
            out.push(']');
        }
    }
}

/// Encodes a tensor's contents. NaN and infinities have no literal form and
/// are rejected.
pub fn encode_tensor(tensor: &Tensor) -> Result<String> {
    if let Some(value) = tensor.data().iter().find(|v| !v.is_finite()) {
        return Err(Error::SerializationError(format!(
            "tensor {:?} holds non-finite value {}",
            tensor.id(),
            value
        )));
    }

    Ok(encode(&tensor.to_nested()))
}

pub fn decode(source: &str) -> Result<NestedData> {
    serde_json::from_str(source)
        .map_err(|e| Error::DeserializationError(format!("failed to decode tensor literal: {}", e)))
}

impl Tensor {
    pub fn to_literal(&self) -> Result<String> {
        encode_tensor(self)
    }

    pub fn from_literal(source: &str) -> Result<Self> {
        Tensor::new(decode(source)?)
    }
}
