use crate::{
    autograd::{apply, Forward, Function},
    operand::Operand,
    Tensor,
};
use gradlet_core::{error::Result, layout::Layout};

/// Reinterprets the data under a new shape with the same element count.
pub(crate) struct View {
    target: Vec<usize>,
    input_shape: Vec<usize>,
}

impl View {
    pub(crate) fn new(target: &[usize]) -> Self {
        Self {
            target: target.to_vec(),
            input_shape: Vec::new(),
        }
    }
}

impl Function for View {
    fn name(&self) -> &'static str {
        "view"
    }

    fn arity(&self) -> usize {
        1
    }

    fn forward(&mut self, inputs: &[Operand]) -> Result<Forward> {
        self.input_shape = inputs[0].shape().to_vec();

        let mut layout = Layout::from_shape(&self.input_shape);
        layout.view(&self.target)?;

        Forward::new(inputs[0].data().to_vec(), layout.shape())
    }

    fn backward(&self, _saved: &[Option<Tensor>], grad_output: &Tensor) -> Result<Vec<Option<Tensor>>> {
        Ok(vec![Some(grad_output.view(&self.input_shape)?)])
    }
}

impl Tensor {
    pub fn view(&self, shape: &[usize]) -> Result<Tensor> {
        apply(View::new(shape), &[Operand::from(self)])
    }
}
