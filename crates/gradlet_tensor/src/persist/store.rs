use gradlet_core::error::Result;
use std::{thread, time::Duration};

/// What a group member is. Only units carry tensors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemberKind {
    Unit,
    Other(String),
}

/// One group member as enumerated by a store.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredUnit {
    pub name: String,
    pub kind: MemberKind,
    pub id: Option<i64>,
    pub source: Option<String>,
}

impl StoredUnit {
    pub fn unit(name: impl Into<String>, id: i64) -> Self {
        Self {
            name: name.into(),
            kind: MemberKind::Unit,
            id: Some(id),
            source: None,
        }
    }
}

/// Incremental text edit of a unit's source, applied on `finish`.
pub trait SourceEditor {
    fn insert(&mut self, text: &str) -> Result<()>;

    fn finish(self: Box<Self>) -> Result<()>;
}

/// Durable storage for groups of persistence units.
pub trait UnitStore {
    fn has_write_privilege(&self) -> bool;

    /// Creates an empty group, replacing any existing group of that name.
    fn create_group(&self, group: &str) -> Result<()>;

    fn create_unit(&self, group: &str, name: &str, id: i64) -> Result<()>;

    /// Replaces the unit's source in one step.
    fn write_source(&self, group: &str, name: &str, source: &str) -> Result<()>;

    fn open_editor<'a>(&'a self, group: &str, name: &str) -> Result<Box<dyn SourceEditor + 'a>>;

    /// Waits `delay` before a chunked edit is applied.
    ///
    /// The default blocks the calling OS thread, which stalls every task a
    /// cooperative scheduler runs on it. Hosts that multiplex tasks override
    /// this to yield instead.
    fn wait_before_edit(&self, delay: Duration) {
        thread::sleep(delay);
    }

    /// Members of `group` in the store's physical order.
    fn list_units(&self, group: &str) -> Result<Vec<StoredUnit>>;
}

impl<S: UnitStore + ?Sized> UnitStore for &S {
    fn has_write_privilege(&self) -> bool {
        (**self).has_write_privilege()
    }

    fn create_group(&self, group: &str) -> Result<()> {
        (**self).create_group(group)
    }

    fn create_unit(&self, group: &str, name: &str, id: i64) -> Result<()> {
        (**self).create_unit(group, name, id)
    }

    fn write_source(&self, group: &str, name: &str, source: &str) -> Result<()> {
        (**self).write_source(group, name, source)
    }

    fn open_editor<'a>(&'a self, group: &str, name: &str) -> Result<Box<dyn SourceEditor + 'a>> {
        (**self).open_editor(group, name)
    }

    fn wait_before_edit(&self, delay: Duration) {
        (**self).wait_before_edit(delay)
    }

    fn list_units(&self, group: &str) -> Result<Vec<StoredUnit>> {
        (**self).list_units(group)
    }
}
