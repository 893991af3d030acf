pub mod prelude;

pub use gradlet_core as core;
pub use gradlet_tensor as tensor;

pub use crate::core::{
    config::{get_default_persist_config, set_default_persist_config, PersistConfig},
    context::{context_scope, enter_context, enter_task, exit_context, in_context, with_task, ContextManager, TaskId},
    error::{Error, Result},
};
pub use crate::tensor::{functional, is_grad_enabled, no_grad, no_grad_mode, Operand, Tensor};
#[cfg(feature = "persist")]
pub use crate::tensor::persist::{self, DirStore, MemoryStore, Persister, UnitStore};
