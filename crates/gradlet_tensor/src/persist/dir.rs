use super::store::{MemberKind, SourceEditor, StoredUnit, UnitStore};
use gradlet_core::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Component, Path, PathBuf},
};

const UNIT_EXTENSION: &str = "json";

/// On-disk record of one unit.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct UnitFile {
    id: i64,
    #[serde(default)]
    source: Option<String>,
}

/// [`UnitStore`] backed by a directory: one subdirectory per group and one
/// `<unit>.json` file per unit.
#[derive(Debug, Clone)]
pub struct DirStore {
    root: PathBuf,
    read_only: bool,
}

impl DirStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            read_only: false,
        }
    }

    pub fn read_only(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            read_only: true,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn group_dir(&self, group: &str) -> Result<PathBuf> {
        Ok(self.root.join(single_component("group", group)?))
    }

    fn unit_path(&self, group: &str, name: &str) -> Result<PathBuf> {
        let name = single_component("unit", name)?;
        Ok(self.group_dir(group)?.join(format!("{}.{}", name, UNIT_EXTENSION)))
    }

    fn read_unit(path: &Path) -> Result<UnitFile> {
        let contents = fs::read_to_string(path)?;
        serde_json::from_str(&contents)
            .map_err(|e| Error::DeserializationError(format!("failed to read unit {}: {}", path.display(), e)))
    }

    /// Writes through a sibling temporary file so readers never see a
    /// partial record.
    fn write_unit(path: &Path, unit: &UnitFile) -> Result<()> {
        let contents = serde_json::to_string(unit)
            .map_err(|e| Error::SerializationError(format!("failed to encode unit {}: {}", path.display(), e)))?;
        let tmp = path.with_extension("tmp");
        fs::write(&tmp, contents)?;
        if let Err(e) = fs::rename(&tmp, path) {
            let _ = fs::remove_file(&tmp);
            return Err(e.into());
        }
        Ok(())
    }

    fn set_source(&self, group: &str, name: &str, source: String) -> Result<()> {
        let path = self.unit_path(group, name)?;
        let mut unit = Self::read_unit(&path)?;
        unit.source = Some(source);
        Self::write_unit(&path, &unit)
    }
}

impl UnitStore for DirStore {
    fn has_write_privilege(&self) -> bool {
        !self.read_only
    }

    fn create_group(&self, group: &str) -> Result<()> {
        let dir = self.group_dir(group)?;
        if dir.exists() {
            fs::remove_dir_all(&dir)?;
        }
        fs::create_dir_all(&dir)?;
        Ok(())
    }

    fn create_unit(&self, group: &str, name: &str, id: i64) -> Result<()> {
        if !self.group_dir(group)?.is_dir() {
            return Err(Error::Storage(format!("group '{}' does not exist", group)));
        }
        Self::write_unit(&self.unit_path(group, name)?, &UnitFile { id, source: None })
    }

    fn write_source(&self, group: &str, name: &str, source: &str) -> Result<()> {
        self.set_source(group, name, source.to_string())
    }

    fn open_editor<'a>(&'a self, group: &str, name: &str) -> Result<Box<dyn SourceEditor + 'a>> {
        Ok(Box::new(DirEditor {
            store: self,
            group: group.to_string(),
            name: name.to_string(),
            buffer: String::new(),
        }))
    }

    fn list_units(&self, group: &str) -> Result<Vec<StoredUnit>> {
        let dir = self.group_dir(group)?;
        if !dir.is_dir() {
            return Err(Error::Storage(format!("group '{}' does not exist", group)));
        }

        let mut units = Vec::new();
        for entry in fs::read_dir(&dir)? {
            let path = entry?.path();
            let name = path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();

            if path.is_dir() {
                units.push(StoredUnit {
                    name,
                    kind: MemberKind::Other("directory".into()),
                    id: None,
                    source: None,
                });
                continue;
            }

            if path.extension().and_then(|e| e.to_str()) != Some(UNIT_EXTENSION) {
                units.push(StoredUnit {
                    name,
                    kind: MemberKind::Other("file".into()),
                    id: None,
                    source: None,
                });
                continue;
            }

            // An unreadable record is still listed so the loader can report it.
            let (id, source) = match Self::read_unit(&path) {
                Ok(unit) => (Some(unit.id), unit.source),
                Err(_) => (None, None),
            };
            units.push(StoredUnit {
                name,
                kind: MemberKind::Unit,
                id,
                source,
            });
        }

        Ok(units)
    }
}

/// Accepts only names that are one plain path component, so a group or unit
/// always stays a direct child of its parent directory.
fn single_component<'n>(what: &str, name: &'n str) -> Result<&'n str> {
    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(name),
        _ => Err(Error::Storage(format!("invalid {} name '{}'", what, name))),
    }
}

struct DirEditor<'a> {
    store: &'a DirStore,
    group: String,
    name: String,
    buffer: String,
}

impl SourceEditor for DirEditor<'_> {
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
        store.set_source(&group, &name, buffer)
    }
}
