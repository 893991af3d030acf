use super::store::{MemberKind, SourceEditor, StoredUnit, UnitStore};
use dashmap::DashMap;
use gradlet_core::error::{Error, Result};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Order in which [`MemoryStore::list_units`] enumerates a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListingOrder {
    #[default]
    Insertion,
    Reversed,
}

/// In-process [`UnitStore`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    groups: DashMap<String, Vec<StoredUnit>>,
    read_only: bool,
    order: ListingOrder,
    atomic_writes: AtomicUsize,
    edits: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that refuses persistence calls.
    pub fn read_only() -> Self {
        Self {
            read_only: true,
            ..Self::default()
        }
    }

    pub fn with_listing_order(mut self, order: ListingOrder) -> Self {
        self.order = order;
        self
    }

    /// Appends an arbitrary member, creating the group if needed.
    pub fn insert_member(&self, group: &str, member: StoredUnit) {
        self.groups.entry(group.to_string()).or_default().push(member);
    }

    pub fn contains_group(&self, group: &str) -> bool {
        self.groups.contains_key(group)
    }

    /// Number of sources written in one step.
    pub fn atomic_writes(&self) -> usize {
        self.atomic_writes.load(Ordering::SeqCst)
    }

    /// Number of sources written through an editor.
    pub fn edits(&self) -> usize {
        self.edits.load(Ordering::SeqCst)
    }

    fn set_source(&self, group: &str, name: &str, source: String) -> Result<()> {
        let mut units = self
            .groups
            .get_mut(group)
            .ok_or_else(|| Error::Storage(format!("group '{}' does not exist", group)))?;
        let unit = units
            .iter_mut()
            .find(|u| u.name == name && u.kind == MemberKind::Unit)
            .ok_or_else(|| Error::Storage(format!("unit '{}' does not exist in group '{}'", name, group)))?;
        unit.source = Some(source);
        Ok(())
    }
}

impl UnitStore for MemoryStore {
    fn has_write_privilege(&self) -> bool {
        !self.read_only
    }

    fn create_group(&self, group: &str) -> Result<()> {
        self.groups.insert(group.to_string(), Vec::new());
        Ok(())
    }

    fn create_unit(&self, group: &str, name: &str, id: i64) -> Result<()> {
        let mut units = self
            .groups
            .get_mut(group)
            .ok_or_else(|| Error::Storage(format!("group '{}' does not exist", group)))?;
        units.push(StoredUnit::unit(name, id));
        Ok(())
    }

    fn write_source(&self, group: &str, name: &str, source: &str) -> Result<()> {
        self.set_source(group, name, source.to_string())?;
        self.atomic_writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn open_editor<'a>(&'a self, group: &str, name: &str) -> Result<Box<dyn SourceEditor + 'a>> {
        Ok(Box::new(MemoryEditor {
            store: self,
            group: group.to_string(),
            name: name.to_string(),
            buffer: String::new(),
        }))
    }

    fn list_units(&self, group: &str) -> Result<Vec<StoredUnit>> {
        let units = self
            .groups
            .get(group)
            .ok_or_else(|| Error::Storage(format!("group '{}' does not exist", group)))?;

        let mut listed = units.clone();
        if self.order == ListingOrder::Reversed {
            listed.reverse();
        }
        Ok(listed)
    }
}

struct MemoryEditor<'a> {
    store: &'a MemoryStore,
    group: String,
    name: String,
    buffer: String,
}

impl SourceEditor for MemoryEditor<'_> {
    fn insert(&mut self, text: &str) -> Result<()> {
        self.buffer.push_str(text);
        Ok(())
    }

    fn finish(self: Box<Self>) -> Result<()> {
        let Self {
            store,
            group,
            name,
            buffer,
        } = *self;
        store.set_source(&group, &name, buffer)?;
        store.edits.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
