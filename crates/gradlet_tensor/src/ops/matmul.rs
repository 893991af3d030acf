use crate::{
    autograd::{apply, Forward, Function},
    operand::Operand,
    ops::saved_at,
    Tensor,
};
use gradlet_core::error::{Error, Result};
use gradlet_cpu::ops::matmul;

fn matrix_dims(op: &str, operand: &Operand) -> Result<(usize, usize)> {
    match operand.shape() {
        &[rows, cols] => Ok((rows, cols)),
        shape => Err(Error::InvalidShape {
            message: format!("{} expects 2-D operands, got shape {:?}", op, shape),
        }),
    }
}

/// Matrix product of two 2-D tensors.
pub(crate) struct Mm;

impl Function for Mm {
    fn name(&self) -> &'static str {
        "mm"
    }

    fn arity(&self) -> usize {
        2
    }

    fn saved_positions(&self) -> &'static [usize] {
        &[0, 1]
    }

    fn forward(&mut self, inputs: &[Operand]) -> Result<Forward> {
        let (m, k) = matrix_dims(self.name(), &inputs[0])?;
        let (p, n) = matrix_dims(self.name(), &inputs[1])?;
        if k != p {
            return Err(Error::ShapeMismatch {
                expected: k,
                got: p,
                msg: format!(
                    "mm contraction: {:?} @ {:?}",
                    inputs[0].shape(),
                    inputs[1].shape()
                ),
            });
        }

        let mut out = vec![0.0; m * n];
        matmul::matmul(inputs[0].data(), inputs[1].data(), m, k, n, &mut out);
        Forward::new(out, &[m, n])
    }

    fn backward(&self, saved: &[Option<Tensor>], grad_output: &Tensor) -> Result<Vec<Option<Tensor>>> {
        let lhs = saved_at(self.name(), saved, 0)?;
        let rhs = saved_at(self.name(), saved, 1)?;

        Ok(vec![
            Some(grad_output.mm(&rhs.t()?)?),
            Some(lhs.t()?.mm(grad_output)?),
        ])
    }
}

/// Transpose of a 2-D tensor.
pub(crate) struct Transpose;

impl Function for Transpose {
    fn name(&self) -> &'static str {
        "t"
    }

    fn arity(&self) -> usize {
        1
    }

    fn forward(&mut self, inputs: &[Operand]) -> Result<Forward> {
        let (rows, cols) = matrix_dims(self.name(), &inputs[0])?;
        let mut out = vec![0.0; rows * cols];
        matmul::transpose(inputs[0].data(), rows, cols, &mut out);
        Forward::new(out, &[cols, rows])
    }

    fn backward(&self, _saved: &[Option<Tensor>], grad_output: &Tensor) -> Result<Vec<Option<Tensor>>> {
        Ok(vec![Some(grad_output.t()?)])
    }
}

impl Tensor {
    pub fn mm(&self, mat2: &Tensor) -> Result<Tensor> {
        apply(Mm, &[Operand::from(self), Operand::from(mat2)])
    }

    pub fn t(&self) -> Result<Tensor> {
        apply(Transpose, &[Operand::from(self)])
    }
}
