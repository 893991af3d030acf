#![allow(dead_code)]

use gradlet_core::error::Result;
use gradlet_tensor::{adapter::TensorAdapter, Tensor};

pub const EPSILON: f64 = 1e-9;

// Helper functions
pub fn setup_tensor<T: TensorAdapter>(data: T) -> Result<Tensor> {
    Tensor::new(data)
}

pub fn setup_grad_tensor<T: TensorAdapter>(data: T) -> Result<Tensor> {
    let mut tensor = Tensor::new(data)?;
    tensor.with_grad()?;
    Ok(tensor)
}

pub fn assert_close(actual: &[f64], expected: &[f64]) {
    assert_eq!(actual.len(), expected.len(), "length mismatch: {:?} vs {:?}", actual, expected);
    for (i, (a, e)) in actual.iter().zip(expected.iter()).enumerate() {
        assert!((a - e).abs() < EPSILON, "element {}: {} != {} ({:?} vs {:?})", i, a, e, actual, expected);
    }
}

/// Gradient of `tensor` as a flat vector. Panics if no gradient was recorded.
pub fn grad_of(tensor: &Tensor) -> Result<Vec<f64>> {
    Ok(tensor.grad()?.expect("gradient should be present").to_flatten_vec())
}
