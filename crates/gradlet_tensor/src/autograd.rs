use crate::{
    graph::{self, Edge},
    is_grad_enabled,
    operand::Operand,
    Tensor,
};
use gradlet_core::{
    error::{Error, Result},
    layout::Layout,
};

/// Raw result of a forward computation.
#[derive(Debug, Clone)]
pub struct Forward {
    pub data: Vec<f64>,
    pub shape: Vec<usize>,
}

impl Forward {
    pub fn new(data: Vec<f64>, shape: &[usize]) -> Result<Self> {
        let size = Layout::compute_size(shape);
        if data.len() != size {
            return Err(Error::ShapeMismatch {
                expected: size,
                got: data.len(),
                msg: format!("forward output for shape {:?}", shape),
            });
        }
        Ok(Self {
            data,
            shape: shape.to_vec(),
        })
    }
}

/// A differentiable operation.
///
/// `forward` sees every input and may record what `backward` needs beyond
/// the saved tensors (original shapes, scalar arguments). `backward` receives
/// one slot per input, filled only at [`saved_positions`](Self::saved_positions),
/// and returns one gradient per input shaped like that input. `None` means
/// no gradient flows to that position.
pub trait Function: Send + Sync + 'static {
    fn name(&self) -> &'static str;

    fn arity(&self) -> usize;

    /// Whether a plain number is allowed at `position` (0-based).
    fn accepts_number(&self, _position: usize) -> bool {
        false
    }

    /// Input positions whose tensors `backward` reads.
    fn saved_positions(&self) -> &'static [usize] {
        &[]
    }

    fn forward(&mut self, inputs: &[Operand]) -> Result<Forward>;

    fn backward(&self, saved: &[Option<Tensor>], grad_output: &Tensor) -> Result<Vec<Option<Tensor>>>;
}

/// Runs `function` on `inputs` and attaches a graph node to the output when
/// any input requires gradients and the calling task is not inside
/// `no_grad`.
pub fn apply<F: Function>(mut function: F, inputs: &[Operand]) -> Result<Tensor> {
    if inputs.len() != function.arity() {
        return Err(Error::InvalidArgument(format!(
            "{} takes {} inputs, got {}",
            function.name(),
            function.arity(),
            inputs.len()
        )));
    }

    for (position, input) in inputs.iter().enumerate() {
        if input.as_tensor().is_none() && !function.accepts_number(position) {
            return Err(Error::TypeMismatch {
                op: function.name(),
                position: position + 1,
                expected: "Tensor",
                got: input.kind(),
            });
        }
    }

    let Forward { data, shape } = function.forward(inputs)?;
    let layout = Layout::try_from_shape(&shape)?;
    if data.len() != layout.size() {
        return Err(Error::Internal {
            message: format!(
                "{} produced {} elements for shape {:?}",
                function.name(),
                data.len(),
                shape
            ),
        });
    }

    let track = inputs.iter().any(Operand::requires_grad) && is_grad_enabled();
    let mut output = Tensor::from_parts(data, layout, false);

    if track {
        let saved_positions = function.saved_positions();
        let saved = inputs
            .iter()
            .enumerate()
            .map(|(i, input)| {
                if saved_positions.contains(&i) {
                    input.as_tensor().cloned()
                } else {
                    None
                }
            })
            .collect();
        let edges = inputs
            .iter()
            .map(|input| input.as_tensor().filter(|t| t.requires_grad()).map(Edge::from_tensor))
            .collect();
        let input_ids = inputs.iter().map(|input| input.as_tensor().map(Tensor::id)).collect();

        let node = graph::insert_node(Box::new(function), saved, edges, input_ids);
        output.attach_node(node);
    }

    Ok(output)
}
