use gradlet_core::context::{context_scope, in_context, ContextGuard};

/// Name of the context that suppresses gradient tracking.
pub const NO_GRAD: &str = "no_grad";

/// Whether operations run by the calling task record graph nodes.
pub fn is_grad_enabled() -> bool {
    !in_context(NO_GRAD)
}

/// Keeps the calling task inside the `no_grad` context while alive.
pub struct NoGradGuard {
    _scope: ContextGuard<'static>,
}

pub fn no_grad_mode() -> NoGradGuard {
    NoGradGuard {
        _scope: context_scope(NO_GRAD),
    }
}

/// Runs `f` with gradient tracking suppressed for the calling task.
///
/// The context is left on every exit path of `f`, including a panic.
pub fn no_grad<F, R>(f: F) -> R
where
    F: FnOnce() -> R,
{
    let _guard = no_grad_mode();
    f()
}
