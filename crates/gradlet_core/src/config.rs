use std::{cell::RefCell, time::Duration};

/// Payloads at or above this many characters take the chunked write path.
pub const DEFAULT_CHUNK_THRESHOLD: usize = 200_000;
/// Pause before a chunked edit, to stay under host edit rate limits.
pub const DEFAULT_EDIT_DELAY: Duration = Duration::from_millis(100);
pub const DEFAULT_GROUP_NAME: &str = "tensors";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistConfig {
    chunk_threshold: usize,
    edit_delay: Duration,
    group_name: String,
}

impl Default for PersistConfig {
    fn default() -> Self {
        Self {
            chunk_threshold: DEFAULT_CHUNK_THRESHOLD,
            edit_delay: DEFAULT_EDIT_DELAY,
            group_name: DEFAULT_GROUP_NAME.to_string(),
        }
    }
}

impl PersistConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_chunk_threshold(mut self, chunk_threshold: usize) -> Self {
        self.chunk_threshold = chunk_threshold;
        self
    }

    pub fn with_edit_delay(mut self, edit_delay: Duration) -> Self {
        self.edit_delay = edit_delay;
        self
    }

    pub fn with_group_name(mut self, group_name: impl Into<String>) -> Self {
        self.group_name = group_name.into();
        self
    }

    pub fn chunk_threshold(&self) -> usize {
        self.chunk_threshold
    }

    pub fn edit_delay(&self) -> Duration {
        self.edit_delay
    }

    pub fn group_name(&self) -> &str {
        &self.group_name
    }

    /// Whether a payload of `len` characters must be written in chunked mode.
    pub fn is_chunked(&self, len: usize) -> bool {
        len >= self.chunk_threshold
    }
}

thread_local! {
    static DEFAULT_PERSIST_CONFIG: RefCell<PersistConfig> = RefCell::new(PersistConfig::default());
}

pub fn get_default_persist_config() -> PersistConfig {
    DEFAULT_PERSIST_CONFIG.with(|c| c.borrow().clone())
}

pub fn set_default_persist_config(config: PersistConfig) {
    DEFAULT_PERSIST_CONFIG.with(|c| *c.borrow_mut() = config);
}
