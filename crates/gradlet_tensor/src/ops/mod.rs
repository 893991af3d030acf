pub(crate) mod binary;
pub(crate) mod fused;
pub(crate) mod matmul;
pub(crate) mod reduction;
pub(crate) mod transform;
pub(crate) mod unary;

use crate::Tensor;
use gradlet_core::error::{Error, Result};

/// Fetches the tensor a node saved at `position`.
pub(crate) fn saved_at<'a>(op: &'static str, saved: &'a [Option<Tensor>], position: usize) -> Result<&'a Tensor> {
    saved.get(position).and_then(Option::as_ref).ok_or_else(|| Error::Internal {
        message: format!("{} backward is missing the saved input at position {}", op, position),
    })
}
