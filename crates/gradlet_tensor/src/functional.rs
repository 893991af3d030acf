//! Free-function form of the tensor API.
//!
//! Arguments arrive as [`Operand`]s, so passing a number where a tensor is
//! required surfaces as [`Error::TypeMismatch`] naming the operation and the
//! 1-based argument position.

use crate::{
    adapter::TensorAdapter,
    autograd::apply,
    operand::Operand,
    ops::{
        binary::{Add, Div, Mul, Pow, Sub},
        fused::Addcdiv,
        matmul::{Mm, Transpose},
        reduction::Sum,
        transform::View,
        unary::{Exp, Log, Neg, Sqrt},
    },
    Tensor,
};
use gradlet_core::error::{Error, Result};

fn expect_tensor(op: &'static str, position: usize, operand: Operand) -> Result<Tensor> {
    match operand {
        Operand::Tensor(t) => Ok(t),
        other => Err(Error::TypeMismatch {
            op,
            position,
            expected: "Tensor",
            got: other.kind(),
        }),
    }
}

pub fn tensor<T: TensorAdapter>(data: T, requires_grad: bool) -> Result<Tensor> {
    Tensor::new_with_spec(data, requires_grad)
}

pub fn zeros(shape: &[usize], requires_grad: bool) -> Result<Tensor> {
    Tensor::zeros_with_spec(shape, requires_grad)
}

pub fn ones(shape: &[usize], requires_grad: bool) -> Result<Tensor> {
    Tensor::ones_with_spec(shape, requires_grad)
}

pub fn full(shape: &[usize], value: f64, requires_grad: bool) -> Result<Tensor> {
    Tensor::full_with_spec(shape, value, requires_grad)
}

pub fn rand(shape: &[usize], requires_grad: bool) -> Result<Tensor> {
    Tensor::rand_with_spec(shape, requires_grad)
}

pub fn randn(shape: &[usize], requires_grad: bool) -> Result<Tensor> {
    Tensor::randn_with_spec(shape, requires_grad)
}

pub fn zeros_like(input: impl Into<Operand>, requires_grad: bool) -> Result<Tensor> {
    let input = expect_tensor("zeros_like", 1, input.into())?;
    Tensor::zeros_like_with_spec(&input, requires_grad)
}

pub fn linspace(start: f64, end: f64, steps: usize, requires_grad: bool) -> Result<Tensor> {
    Tensor::linspace_with_spec(start, end, steps, requires_grad)
}

pub fn add(input: impl Into<Operand>, other: impl Into<Operand>) -> Result<Tensor> {
    apply(Add::default(), &[input.into(), other.into()])
}

pub fn sub(input: impl Into<Operand>, other: impl Into<Operand>) -> Result<Tensor> {
    apply(Sub::default(), &[input.into(), other.into()])
}

pub fn mul(input: impl Into<Operand>, other: impl Into<Operand>) -> Result<Tensor> {
    apply(Mul::default(), &[input.into(), other.into()])
}

pub fn div(input: impl Into<Operand>, other: impl Into<Operand>) -> Result<Tensor> {
    apply(Div::default(), &[input.into(), other.into()])
}

pub fn pow(input: impl Into<Operand>, other: impl Into<Operand>) -> Result<Tensor> {
    apply(Pow::default(), &[input.into(), other.into()])
}

pub fn mm(input: impl Into<Operand>, mat2: impl Into<Operand>) -> Result<Tensor> {
    apply(Mm, &[input.into(), mat2.into()])
}

pub fn sqrt(input: impl Into<Operand>) -> Result<Tensor> {
    apply(Sqrt, &[input.into()])
}

pub fn t(input: impl Into<Operand>) -> Result<Tensor> {
    apply(Transpose, &[input.into()])
}

pub fn exp(input: impl Into<Operand>) -> Result<Tensor> {
    apply(Exp, &[input.into()])
}

pub fn log(input: impl Into<Operand>) -> Result<Tensor> {
    apply(Log, &[input.into()])
}

pub fn neg(input: impl Into<Operand>) -> Result<Tensor> {
    apply(Neg, &[input.into()])
}

pub fn sum(input: impl Into<Operand>) -> Result<Tensor> {
    apply(Sum::default(), &[input.into()])
}

pub fn view(input: impl Into<Operand>, shape: &[usize]) -> Result<Tensor> {
    apply(View::new(shape), &[input.into()])
}

/// `input + value * t1 / t2`; `value` defaults to 1.
pub fn addcdiv(
    input: impl Into<Operand>,
    t1: impl Into<Operand>,
    t2: impl Into<Operand>,
    value: Option<f64>,
) -> Result<Tensor> {
    apply(
        Addcdiv::new(value.unwrap_or(1.0)),
        &[input.into(), t1.into(), t2.into()],
    )
}

pub fn max(input: impl Into<Operand>) -> Result<Tensor> {
    expect_tensor("max", 1, input.into())?.max()
}

pub fn item(input: impl Into<Operand>) -> Result<f64> {
    expect_tensor("item", 1, input.into())?.item()
}
