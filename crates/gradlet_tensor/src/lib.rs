pub mod adapter;
pub mod autograd;
mod creation;
mod display;
pub mod functional;
mod grad_mode;
pub mod graph;
pub mod operand;
mod ops;
#[cfg(feature = "persist")]
pub mod persist;
pub mod utils;

pub use adapter::{NestedData, TensorAdapter};
pub use autograd::{apply, Forward, Function};
pub use grad_mode::{is_grad_enabled, no_grad, no_grad_mode, NoGradGuard, NO_GRAD};
pub use graph::{clear_graph, graph_len, NodeId, NodeInfo};

use graph::NodeHandle;
pub use operand::Operand;

use gradlet_core::{
    error::{Error, Result},
    layout::Layout,
};
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, RwLock,
};

// ────────────────────────────────────────────────────────────────────────────
//  Tensor
// ────────────────────────────────────────────────────────────────────────────

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TensorId(usize);
static TENSOR_COUNTER: AtomicUsize = AtomicUsize::new(1);
#[inline]
pub(crate) fn next_tensor_id() -> TensorId {
    TensorId(TENSOR_COUNTER.fetch_add(1, Ordering::SeqCst))
}

/// Gradient cell shared by every handle of one logical tensor.
pub(crate) type GradSlot = Arc<RwLock<Option<Tensor>>>;

/// An n-dimensional `f64` tensor.
///
/// Cloning a `Tensor` yields another handle to the same logical tensor: same
/// id, same storage, same gradient cell. Tensors produced by a tracked
/// operation carry a handle to their creator node in the graph arena; leaves
/// carry none. The node is released once no tensor or downstream node holds
/// it.
#[derive(Clone)]
pub struct Tensor {
    id: TensorId,
    storage: Arc<Vec<f64>>,
    layout: Layout,
    requires_grad: bool,
    grad: GradSlot,
    node: Option<Arc<NodeHandle>>,
}

impl Tensor {
    /// Builds a leaf from raw parts. Callers guarantee
    /// `data.len() == layout.size()`.
    pub(crate) fn from_parts(data: Vec<f64>, layout: Layout, requires_grad: bool) -> Self {
        debug_assert_eq!(data.len(), layout.size());
        Self {
            id: next_tensor_id(),
            storage: Arc::new(data),
            layout,
            requires_grad,
            grad: Arc::new(RwLock::new(None)),
            node: None,
        }
    }

    pub(crate) fn attach_node(&mut self, node: Arc<NodeHandle>) {
        self.requires_grad = true;
        self.node = Some(node);
    }

    pub(crate) fn node_handle(&self) -> Option<&Arc<NodeHandle>> {
        self.node.as_ref()
    }

    pub(crate) fn grad_slot(&self) -> &GradSlot {
        &self.grad
    }

    #[inline]
    pub fn id(&self) -> TensorId {
        self.id
    }

    // data

    pub fn data(&self) -> &[f64] {
        self.storage.as_slice()
    }

    pub fn to_flatten_vec(&self) -> Vec<f64> {
        self.storage.to_vec()
    }

    /// Returns the contents nested to mirror the shape.
    pub fn to_nested(&self) -> NestedData {
        fn build(data: &[f64], shape: &[usize]) -> NestedData {
            match shape.split_first() {
                None => NestedData::Number(data[0]),
                Some((&extent, rest)) => {
                    let chunk = Layout::compute_size(rest);
                    NestedData::List((0..extent).map(|i| build(&data[i * chunk..(i + 1) * chunk], rest)).collect())
                }
            }
        }

        build(self.data(), self.shape())
    }

    pub fn item(&self) -> Result<f64> {
        if self.size() != 1 {
            return Err(Error::InvalidArgument(format!(
                "item() can only be called on a tensor with a single element, but got tensor with {} elements",
                self.size()
            )));
        }

        Ok(self.data()[0])
    }

    // layout

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn shape(&self) -> &[usize] {
        self.layout.shape()
    }

    pub fn strides(&self) -> &[usize] {
        self.layout.strides()
    }

    pub fn size(&self) -> usize {
        self.layout.size()
    }

    pub fn ndim(&self) -> usize {
        self.layout.ndim()
    }

    pub fn dim_size(&self, dim: usize) -> Option<usize> {
        self.layout.dim_size(dim)
    }

    // grad

    pub fn requires_grad(&self) -> bool {
        self.requires_grad
    }

    /// A leaf has no creator node in the graph.
    pub fn is_leaf(&self) -> bool {
        self.node.is_none()
    }

    pub fn node_id(&self) -> Option<NodeId> {
        self.node.as_ref().map(|node| node.id())
    }

    /// Describes the operation that produced this tensor, if it is tracked
    /// and its node has not been released by a backward pass.
    pub fn grad_fn(&self) -> Option<NodeInfo> {
        self.node_id().and_then(graph::node_info)
    }

    /// Marks a leaf as requiring gradients.
    pub fn with_grad(&mut self) -> Result<()> {
        self.set_requires_grad(true)
    }

    pub fn set_requires_grad(&mut self, requires_grad: bool) -> Result<()> {
        if !self.is_leaf() && !requires_grad {
            return Err(Error::InvalidState(
                "requires_grad can only be cleared on leaf tensors; use detach() instead".into(),
            ));
        }

        self.requires_grad = requires_grad;
        Ok(())
    }

    pub fn grad(&self) -> Result<Option<Tensor>> {
        Ok(self.grad.read().map_err(|_| Error::Lock)?.clone())
    }

    pub fn zero_grad(&self) -> Result<()> {
        let mut guard = self.grad.write().map_err(|_| Error::Lock)?;
        if let Some(grad) = guard.as_ref() {
            *guard = Some(Tensor::zeros_like(grad)?);
        }
        Ok(())
    }

    pub(crate) fn accumulate_grad(&self, grad_in: &Tensor) -> Result<()> {
        graph::accumulate_into(&self.grad, grad_in)
    }

    /// Returns a new leaf sharing this tensor's storage but cut off from the
    /// graph.
    pub fn detach(&self) -> Tensor {
        Self {
            id: next_tensor_id(),
            storage: Arc::clone(&self.storage),
            layout: self.layout.clone(),
            requires_grad: false,
            grad: Arc::new(RwLock::new(None)),
            node: None,
        }
    }

    // backward

    /// Runs backpropagation seeded with ones and releases the visited graph.
    pub fn backward(&self) -> Result<()> {
        let seed = Tensor::ones_like(self)?;
        self.backward_with(&seed, false)
    }

    /// Runs backpropagation seeded with `grad`. With `retain_graph` the
    /// visited nodes stay in the arena so the graph can be walked again.
    pub fn backward_with(&self, grad: &Tensor, retain_graph: bool) -> Result<()> {
        if !self.requires_grad() {
            return Err(Error::InvalidState("tensor does not require gradients".into()));
        }

        graph::run_backward(self, grad, retain_graph)
    }
}

/// Disables gradient tracking for the calling task in the current lexical
/// scope. When the scope ends, the previous state is restored.
///
/// ### Example
/// ```rust
/// # use gradlet_tensor::Tensor;
/// let mut x = Tensor::ones(&[2]).unwrap();
/// x.with_grad().unwrap();
/// {
///     gradlet_tensor::no_grad!();
///     let y = x.mul(2.0).unwrap();
///     assert!(!y.requires_grad());
/// }
/// ```
#[macro_export]
macro_rules! no_grad {
    () => {
        let _grad_guard = $crate::no_grad_mode();
    };
}
