//! Arena of recorded operations and the reverse-mode walk over it.
//!
//! Tensors refer to their creator through a shared [`NodeHandle`]; nodes own
//! the tensors their backward pass reads plus one [`Edge`] per input that
//! requires gradients. Ids are handed out in creation order, so every node's
//! inputs carry smaller ids than the node itself.
//!
//! A node lives as long as something can still reach it: a tensor it
//! produced, or a downstream node's edge. When the last handle goes away the
//! node leaves the arena, releasing its saved tensors and, through its edges,
//! any upstream nodes nothing else holds.

use crate::{autograd::Function, no_grad_mode, GradSlot, Tensor, TensorId};
use dashmap::DashMap;
use gradlet_core::error::{Error, Result};
use std::{
    collections::{btree_map::Entry, BTreeMap},
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, LazyLock,
    },
};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);
static NODE_COUNTER: AtomicUsize = AtomicUsize::new(1);
#[inline]
fn next_node_id() -> NodeId {
    NodeId(NODE_COUNTER.fetch_add(1, Ordering::SeqCst))
}

/// Keeps one arena node alive. Dropping the last handle removes the node.
#[derive(Debug)]
pub(crate) struct NodeHandle {
    id: NodeId,
}

impl NodeHandle {
    pub(crate) fn id(&self) -> NodeId {
        self.id
    }
}

impl Drop for NodeHandle {
    fn drop(&mut self) {
        // the removed node is dropped after the map lock is released, so
        // upstream handles it frees can remove their own entries
        let removed = NODES.remove(&self.id);
        drop(removed);
    }
}

/// Where the gradient for one input goes.
pub(crate) struct Edge {
    tensor_id: TensorId,
    node: Option<Arc<NodeHandle>>,
    grad: GradSlot,
    shape: Vec<usize>,
}

impl Edge {
    pub(crate) fn from_tensor(tensor: &Tensor) -> Self {
        Self {
            tensor_id: tensor.id(),
            node: tensor.node_handle().cloned(),
            grad: Arc::clone(tensor.grad_slot()),
            shape: tensor.shape().to_vec(),
        }
    }
}

struct GraphNode {
    function: Box<dyn Function>,
    saved: Vec<Option<Tensor>>,
    edges: Vec<Option<Edge>>,
    inputs: Vec<Option<TensorId>>,
}

static NODES: LazyLock<DashMap<NodeId, Arc<GraphNode>>> = LazyLock::new(DashMap::new);

pub(crate) fn insert_node(
    function: Box<dyn Function>,
    saved: Vec<Option<Tensor>>,
    edges: Vec<Option<Edge>>,
    inputs: Vec<Option<TensorId>>,
) -> Arc<NodeHandle> {
    let nid = next_node_id();
    NODES.insert(
        nid,
        Arc::new(GraphNode {
            function,
            saved,
            edges,
            inputs,
        }),
    );
    Arc::new(NodeHandle { id: nid })
}

/// Number of nodes currently held by the arena.
pub fn graph_len() -> usize {
    NODES.len()
}

/// Releases every recorded node. Tensors that referred to them can no longer
/// be differentiated through.
pub fn clear_graph() {
    let ids: Vec<NodeId> = NODES.iter().map(|entry| *entry.key()).collect();
    for nid in ids {
        let removed = NODES.remove(&nid);
        drop(removed);
    }
}

/// Read-only description of a recorded operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeInfo {
    pub id: NodeId,
    pub op_name: &'static str,
    /// Ids of the input tensors the node keeps alive for its backward pass.
    pub saved: Vec<TensorId>,
    /// Tensor id per input position, `None` for number operands.
    pub inputs: Vec<Option<TensorId>>,
    /// Ids of the inputs gradients flow back to.
    pub grad_inputs: Vec<TensorId>,
}

pub(crate) fn node_info(nid: NodeId) -> Option<NodeInfo> {
    NODES.get(&nid).map(|node| NodeInfo {
        id: nid,
        op_name: node.function.name(),
        saved: node.saved.iter().flatten().map(Tensor::id).collect(),
        inputs: node.inputs.clone(),
        grad_inputs: node.edges.iter().flatten().map(|edge| edge.tensor_id).collect(),
    })
}

pub(crate) fn accumulate_into(slot: &GradSlot, grad_in: &Tensor) -> Result<()> {
    let mut guard = slot.write().map_err(|_| Error::Lock)?;
    let next = match guard.as_ref() {
        Some(existing) => {
            let _guard = no_grad_mode();
            existing.add(grad_in)?
        }
        None => grad_in.detach(),
    };
    *guard = Some(next);
    Ok(())
}

fn take_node(nid: NodeId, retain_graph: bool) -> Result<Arc<GraphNode>> {
    let node = if retain_graph {
        NODES.get(&nid).map(|node| Arc::clone(node.value()))
    } else {
        NODES.remove(&nid).map(|(_, node)| node)
    };

    node.ok_or_else(|| {
        Error::InvalidState(format!(
            "graph node {:?} was already released; pass retain_graph to backward_with to walk it again",
            nid
        ))
    })
}

pub(crate) fn run_backward(root: &Tensor, seed: &Tensor, retain_graph: bool) -> Result<()> {
    if seed.shape() != root.shape() {
        return Err(Error::DimensionMismatch {
            expected: root.shape().to_vec(),
            got: seed.shape().to_vec(),
        });
    }

    let _guard = no_grad_mode();

    let Some(root_node) = root.node_handle() else {
        return root.accumulate_grad(seed);
    };

    // pending entries hold their handle so a node stays in the arena until
    // it is visited, even after the downstream node that reached it is gone
    let mut pending: BTreeMap<NodeId, (Arc<NodeHandle>, Tensor)> = BTreeMap::new();
    pending.insert(root_node.id(), (Arc::clone(root_node), seed.detach()));

    while let Some((nid, (_handle, grad_output))) = pending.pop_last() {
        let node = take_node(nid, retain_graph)?;
        let grads = node.function.backward(&node.saved, &grad_output)?;

        if grads.len() != node.edges.len() {
            return Err(Error::Internal {
                message: format!(
                    "{} backward returned {} gradients for {} inputs",
                    node.function.name(),
                    grads.len(),
                    node.edges.len()
                ),
            });
        }

        for (edge, grad) in node.edges.iter().zip(grads) {
            let (Some(edge), Some(grad)) = (edge, grad) else {
                continue;
            };

            if grad.shape() != edge.shape.as_slice() {
                return Err(Error::DimensionMismatch {
                    expected: edge.shape.clone(),
                    got: grad.shape().to_vec(),
                });
            }

            match &edge.node {
                Some(next) => match pending.entry(next.id()) {
                    Entry::Vacant(e) => {
                        e.insert((Arc::clone(next), grad));
                    }
                    Entry::Occupied(mut e) => {
                        let sum = e.get().1.add(&grad)?;
                        e.get_mut().1 = sum;
                    }
                },
                None => accumulate_into(&edge.grad, &grad)?,
            }
        }
    }

    Ok(())
}
