//! Saving tensors as groups of persistence units and loading them back.
//!
//! Every saved tensor becomes one unit tagged with an id in `1..=N`. Loading
//! orders units by that id, never by the order a store happens to list
//! them in, and rebuilds each tensor as a fresh leaf.

pub mod codec;
mod dir;
mod memory;
pub mod store;

pub use dir::DirStore;
pub use memory::{ListingOrder, MemoryStore};
pub use store::{MemberKind, SourceEditor, StoredUnit, UnitStore};

use crate::Tensor;
use gradlet_core::{
    config::{get_default_persist_config, PersistConfig},
    error::{Error, Result},
};
use std::slice;

pub struct Persister<S: UnitStore> {
    store: S,
    config: PersistConfig,
}

impl<S: UnitStore> Persister<S> {
    /// Uses the calling thread's default [`PersistConfig`].
    pub fn new(store: S) -> Self {
        Self::with_config(store, get_default_persist_config())
    }

    pub fn with_config(store: S, config: PersistConfig) -> Self {
        Self { store, config }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &PersistConfig {
        &self.config
    }

    fn require_privilege(&self, op: &str) -> Result<()> {
        if !self.store.has_write_privilege() {
            return Err(Error::PrivilegeRequired(format!("{} needs a store with write privilege", op)));
        }
        Ok(())
    }

    /// Writes one unit per tensor into `name` (or the configured default
    /// group) and returns the group name.
    ///
    /// Nothing is written unless every tensor encodes. Payloads at or over
    /// the chunk threshold go through an editor after the store's
    /// [`UnitStore::wait_before_edit`] for `edit_delay`; with the default
    /// hook that blocks the calling OS thread.
    pub fn save(&self, tensors: &[Tensor], name: Option<&str>) -> Result<String> {
        self.require_privilege("save")?;

        let payloads = tensors
            .iter()
            .map(codec::encode_tensor)
            .collect::<Result<Vec<_>>>()?;

        let group = name.unwrap_or(self.config.group_name()).to_string();
        self.store.create_group(&group)?;

        for (index, payload) in payloads.iter().enumerate() {
            let id = index as i64 + 1;
            let unit = format!("tensor_{}", id);
            self.store.create_unit(&group, &unit, id)?;

            if self.config.is_chunked(payload.len()) {
                let mut editor = self.store.open_editor(&group, &unit)?;
                self.store.wait_before_edit(self.config.edit_delay());
                editor.insert(payload)?;
                editor.finish()?;
            } else {
                self.store.write_source(&group, &unit, payload)?;
            }
        }

        Ok(group)
    }

    pub fn save_tensor(&self, tensor: &Tensor, name: Option<&str>) -> Result<String> {
        self.save(slice::from_ref(tensor), name)
    }

    /// Reads every unit of `group` in id order. Members that are not
    /// well-formed units are skipped with a warning. `requires_grad`
    /// applies to all loaded tensors and defaults to `false`.
    pub fn load(&self, group: &str, requires_grad: Option<bool>) -> Result<Vec<Tensor>> {
        self.require_privilege("load")?;

        let requires_grad = requires_grad.unwrap_or(false);
        let mut loaded = Vec::new();
        for member in self.store.list_units(group)? {
            match conforming_unit(&member, requires_grad) {
                Ok(entry) => loaded.push(entry),
                Err(reason) => eprintln!(
                    "\x1b[33m[WARN]\x1b[0m skipping member '{}' of group '{}': {}",
                    member.name, group, reason
                ),
            }
        }

        loaded.sort_by_key(|(id, _)| *id);
        Ok(loaded.into_iter().map(|(_, tensor)| tensor).collect())
    }
}

fn conforming_unit(member: &StoredUnit, requires_grad: bool) -> std::result::Result<(i64, Tensor), String> {
    if let MemberKind::Other(kind) = &member.kind {
        return Err(format!("not a unit ({})", kind));
    }
    let id = match member.id {
        Some(id) if id >= 1 => id,
        Some(id) => return Err(format!("invalid id {}", id)),
        None => return Err("missing id".into()),
    };
    let source = member.source.as_deref().ok_or("missing source")?;
    let data = codec::decode(source).map_err(|e| e.to_string())?;
    let tensor = Tensor::new_with_spec(data, requires_grad).map_err(|e| e.to_string())?;

    Ok((id, tensor))
}

/// [`Persister::save`] with the default configuration.
pub fn save<S: UnitStore>(store: S, tensors: &[Tensor], name: Option<&str>) -> Result<String> {
    Persister::new(store).save(tensors, name)
}

/// [`Persister::load`] with the default configuration.
pub fn load<S: UnitStore>(store: S, group: &str, requires_grad: Option<bool>) -> Result<Vec<Tensor>> {
    Persister::new(store).load(group, requires_grad)
}
