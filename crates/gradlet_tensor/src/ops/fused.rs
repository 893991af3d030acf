use crate::{
    autograd::{apply, Forward, Function},
    operand::Operand,
    ops::{
        binary::{broadcast_binary, ADD, DIV},
        saved_at,
    },
    Tensor,
};
use gradlet_core::error::Result;

/// `input + value * t1 / t2`, broadcast over all three operands.
pub(crate) struct Addcdiv {
    value: f64,
    shapes: [Vec<usize>; 3],
}

impl Addcdiv {
    pub(crate) fn new(value: f64) -> Self {
        Self {
            value,
            shapes: Default::default(),
        }
    }
}

impl Function for Addcdiv {
    fn name(&self) -> &'static str {
        "addcdiv"
    }

    fn arity(&self) -> usize {
        3
    }

    fn saved_positions(&self) -> &'static [usize] {
        &[1, 2]
    }

    fn forward(&mut self, inputs: &[Operand]) -> Result<Forward> {
        for (shape, input) in self.shapes.iter_mut().zip(inputs) {
            *shape = input.shape().to_vec();
        }

        let quotient = broadcast_binary(
            (inputs[1].data(), inputs[1].shape()),
            (inputs[2].data(), inputs[2].shape()),
            DIV,
        )?;
        let scaled: Vec<f64> = quotient.data.iter().map(|q| q * self.value).collect();

        broadcast_binary(
            (inputs[0].data(), inputs[0].shape()),
            (scaled.as_slice(), quotient.shape.as_slice()),
            ADD,
        )
    }

    fn backward(&self, saved: &[Option<Tensor>], grad_output: &Tensor) -> Result<Vec<Option<Tensor>>> {
        let t1 = saved_at(self.name(), saved, 1)?;
        let t2 = saved_at(self.name(), saved, 2)?;
        let scaled = grad_output.mul(self.value)?;

        let grad_input = grad_output.sum_to_shape(&self.shapes[0])?;
        let grad_t1 = scaled.div(t2)?.sum_to_shape(&self.shapes[1])?;
        // -value * t1 / t2^2
        let grad_t2 = scaled.mul(t1)?.div(t2.mul(t2)?)?.neg()?.sum_to_shape(&self.shapes[2])?;

        Ok(vec![Some(grad_input), Some(grad_t1), Some(grad_t2)])
    }
}

impl Tensor {
    /// `self + value * t1 / t2`.
    pub fn addcdiv(&self, t1: &Tensor, t2: &Tensor, value: f64) -> Result<Tensor> {
        apply(
            Addcdiv::new(value),
            &[Operand::from(self), Operand::from(t1), Operand::from(t2)],
        )
    }
}
