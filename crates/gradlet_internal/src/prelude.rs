pub use crate::core::{
    context::TaskId,
    error::{Error, Result},
};
pub use crate::tensor::{
    adapter::TensorAdapter,
    autograd::{apply, Forward, Function},
    no_grad, Operand, Tensor,
};
#[cfg(feature = "persist")]
pub use crate::tensor::persist::{DirStore, MemoryStore, Persister, UnitStore};
