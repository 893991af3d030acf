use dashmap::DashMap;
use std::{
    cell::Cell,
    collections::HashSet,
    sync::{
        atomic::{AtomicUsize, Ordering},
        LazyLock,
    },
};

// ────────────────────────────────────────────────────────────────────────────
//  Task identity
// ────────────────────────────────────────────────────────────────────────────

/// Opaque handle for one logical unit of cooperative execution.
///
/// Every OS thread lazily receives its own task id. A cooperative scheduler
/// that multiplexes several tasks on a single thread switches the running
/// task explicitly with [`enter_task`] whenever it resumes one.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(usize);
static TASK_COUNTER: AtomicUsize = AtomicUsize::new(1);
#[inline]
pub fn next_task_id() -> TaskId {
    TaskId(TASK_COUNTER.fetch_add(1, Ordering::SeqCst))
}

thread_local! {
    static CURRENT_TASK: Cell<Option<TaskId>> = const { Cell::new(None) };
}

impl TaskId {
    /// Allocates a fresh task id that no thread is running yet.
    pub fn new() -> Self {
        next_task_id()
    }

    /// Returns the task running on the calling thread.
    pub fn current() -> Self {
        CURRENT_TASK.with(|c| match c.get() {
            Some(id) => id,
            None => {
                let id = next_task_id();
                c.set(Some(id));
                id
            }
        })
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

pub struct TaskGuard {
    prev_task: Option<TaskId>,
}

impl TaskGuard {
    fn new(task: TaskId) -> Self {
        let prev_task = CURRENT_TASK.with(|c| c.replace(Some(task)));
        Self { prev_task }
    }
}

impl Drop for TaskGuard {
    fn drop(&mut self) {
        CURRENT_TASK.with(|c| c.set(self.prev_task));
    }
}

/// Makes `task` the running task of this thread until the guard is dropped.
pub fn enter_task(task: TaskId) -> TaskGuard {
    TaskGuard::new(task)
}

pub fn with_task<F, R>(task: TaskId, f: F) -> R
where
    F: FnOnce() -> R,
{
    let _guard = TaskGuard::new(task);
    f()
}

// ────────────────────────────────────────────────────────────────────────────
//  Context manager
// ────────────────────────────────────────────────────────────────────────────

/// Named boolean flags scoped to individual tasks.
///
/// Each context name maps to the set of tasks currently inside it. The entry
/// for a name exists only while at least one task is marked.
#[derive(Default)]
pub struct ContextManager {
    contexts: DashMap<String, HashSet<TaskId>>,
}

impl ContextManager {
    pub fn new() -> Self {
        Self {
            contexts: DashMap::new(),
        }
    }

    /// Marks `task` as inside `name`. Entering twice is a no-op.
    pub fn enter(&self, name: &str, task: TaskId) {
        self.contexts.entry(name.to_string()).or_default().insert(task);
    }

    /// Unmarks `task`. Exiting a context the task never entered is a no-op.
    pub fn exit(&self, name: &str, task: TaskId) {
        if let Some(mut tasks) = self.contexts.get_mut(name) {
            tasks.remove(&task);
        }
        self.contexts.remove_if(name, |_, tasks| tasks.is_empty());
    }

    pub fn in_context(&self, name: &str, task: TaskId) -> bool {
        self.contexts
            .get(name)
            .map(|tasks| tasks.contains(&task))
            .unwrap_or(false)
    }

    /// Returns `true` while any task is inside `name`.
    pub fn is_active(&self, name: &str) -> bool {
        self.contexts.contains_key(name)
    }

    /// Number of context names with at least one task inside.
    pub fn len(&self) -> usize {
        self.contexts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contexts.is_empty()
    }

    /// Enters `name` for `task` and returns a guard that undoes the entry.
    pub fn scope(&self, name: &str, task: TaskId) -> ContextGuard<'_> {
        let was_inside = self.in_context(name, task);
        self.enter(name, task);
        ContextGuard {
            manager: self,
            name: name.to_string(),
            task,
            was_inside,
        }
    }
}

/// Leaves the context on drop, including during unwinding.
///
/// A guard created while its task was already inside the context leaves the
/// marking untouched, so an inner scope never ends an outer one.
pub struct ContextGuard<'a> {
    manager: &'a ContextManager,
    name: String,
    task: TaskId,
    was_inside: bool,
}

impl ContextGuard<'_> {
    pub fn task(&self) -> TaskId {
        self.task
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Drop for ContextGuard<'_> {
    fn drop(&mut self) {
        if !self.was_inside {
            self.manager.exit(&self.name, self.task);
        }
    }
}

static GLOBAL_CONTEXTS: LazyLock<ContextManager> = LazyLock::new(ContextManager::new);

/// The process-wide context registry.
pub fn global_contexts() -> &'static ContextManager {
    &GLOBAL_CONTEXTS
}

pub fn enter_context(name: &str) {
    global_contexts().enter(name, TaskId::current())
}

pub fn exit_context(name: &str) {
    global_contexts().exit(name, TaskId::current())
}

pub fn in_context(name: &str) -> bool {
    global_contexts().in_context(name, TaskId::current())
}

pub fn context_scope(name: &str) -> ContextGuard<'static> {
    global_contexts().scope(name, TaskId::current())
}
