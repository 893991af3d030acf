use crate::{
    autograd::{apply, Forward, Function},
    operand::Operand,
    utils::broadcast::compute_broadcast_shape,
    Tensor,
};
use gradlet_core::{
    error::{Error, Result},
    layout::Layout,
};
use gradlet_cpu::ops::reduction;

/// Sum of all elements into a rank-0 tensor.
#[derive(Default)]
pub(crate) struct Sum {
    input_shape: Vec<usize>,
}

impl Function for Sum {
    fn name(&self) -> &'static str {
        "sum"
    }

    fn arity(&self) -> usize {
        1
    }

    fn forward(&mut self, inputs: &[Operand]) -> Result<Forward> {
        self.input_shape = inputs[0].shape().to_vec();
        Forward::new(vec![reduction::sum(inputs[0].data())], &[])
    }

    fn backward(&self, _saved: &[Option<Tensor>], grad_output: &Tensor) -> Result<Vec<Option<Tensor>>> {
        Ok(vec![Some(Tensor::full(&self.input_shape, grad_output.item()?)?)])
    }
}

impl Tensor {
    pub fn sum(&self) -> Result<Tensor> {
        apply(Sum::default(), &[Operand::from(self)])
    }

    /// Largest element as a rank-0 leaf. Not differentiable: the result never
    /// carries a graph node.
    pub fn max(&self) -> Result<Tensor> {
        let value = reduction::max(self.data()).ok_or_else(|| Error::InvalidArgument("max of an empty tensor".into()))?;
        Ok(Tensor::from_parts(vec![value], Layout::from_shape(&[]), false))
    }

    /// Sums a broadcast gradient back down to `shape`. Untracked.
    pub(crate) fn sum_to_shape(&self, shape: &[usize]) -> Result<Tensor> {
        if self.shape() == shape {
            return Ok(self.clone());
        }

        let broadcast = compute_broadcast_shape(shape, self.shape())?;
        if broadcast != self.shape() {
            return Err(Error::DimensionMismatch {
                expected: self.shape().to_vec(),
                got: shape.to_vec(),
            });
        }

        let data = reduction::sum_to_shape(self.data(), self.shape(), shape);
        Ok(Tensor::from_parts(data, Layout::from_shape(shape), false))
    }
}
