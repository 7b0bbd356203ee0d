use crate::error::InventoryError;
use crate::inventory::snapshot::{CharacterSnapshot, StoredInventory};
use crate::persistence::cache::{CacheStats, RecordCache};
use crate::telemetry::logging::{log_error, log_inventory};
use base64::engine::general_purpose::STANDARD as BASE64_ENGINE;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use sha1::{Digest, Sha1};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

pub const TABLE_FILE: &str = "inventories.yaml";

pub trait InventoryStore {
    fn load(&mut self, name: &str) -> Result<Option<StoredInventory>, InventoryError>;

    /// Inserts or replaces the whole record.
    fn save(&mut self, inventory: &StoredInventory) -> Result<(), InventoryError>;

    fn update_character(
        &mut self,
        name: &str,
        character: &CharacterSnapshot,
    ) -> Result<bool, InventoryError>;

    fn update_privacy(&mut self, name: &str, is_private: bool) -> Result<bool, InventoryError>;

    fn update_shared_with(
        &mut self,
        name: &str,
        shared_with: &BTreeSet<String>,
    ) -> Result<bool, InventoryError>;

    fn delete(&mut self, name: &str) -> Result<bool, InventoryError>;

    /// Names matching `filter`, sorted.
    fn list(&self, filter: &ListFilter) -> Result<Vec<String>, InventoryError>;
}

/// Set conditions are OR-ed together. No conditions matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListFilter {
    pub name: Option<String>,
    pub author: Option<String>,
    pub is_private: Option<bool>,
    pub user: Option<String>,
}

impl ListFilter {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.author.is_none() && self.is_private.is_none() && self.user.is_none()
    }

    pub fn matches<'a>(
        &self,
        name: &str,
        author: &str,
        is_private: bool,
        mut shared_with: impl Iterator<Item = &'a String>,
    ) -> bool {
        if self.is_empty() {
            return true;
        }
        if let Some(needle) = &self.name {
            if name.contains(needle.as_str()) {
                return true;
            }
        }
        if self.author.as_deref() == Some(author) {
            return true;
        }
        if self.is_private == Some(is_private) {
            return true;
        }
        match &self.user {
            Some(needle) => shared_with.any(|user| user.contains(needle.as_str())),
            None => false,
        }
    }
}

/// One persisted inventory. The character travels as base64 of the snapshot
/// bytes, with the SHA-1 of those bytes alongside.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct InventoryRow {
    name: String,
    author: String,
    private: bool,
    #[serde(default)]
    usernames: Vec<String>,
    character: String,
    checksum: String,
}

impl InventoryRow {
    fn encode(inventory: &StoredInventory) -> Result<Self, InventoryError> {
        let bytes = inventory
            .character
            .to_bytes()
            .map_err(InventoryError::Storage)?;
        Ok(Self {
            name: inventory.name.clone(),
            author: inventory.author.clone(),
            private: inventory.is_private,
            usernames: inventory.shared_with.iter().cloned().collect(),
            character: BASE64_ENGINE.encode(&bytes),
            checksum: sha1_hex(&bytes),
        })
    }

    fn decode(&self) -> Result<StoredInventory, InventoryError> {
        let bytes = BASE64_ENGINE.decode(self.character.as_bytes()).map_err(|err| {
            InventoryError::Corrupt(format!("character blob of \"{}\": {}", self.name, err))
        })?;
        let digest = sha1_hex(&bytes);
        if !digest.eq_ignore_ascii_case(&self.checksum) {
            return Err(InventoryError::Corrupt(format!(
                "checksum mismatch for \"{}\": expected {}, got {}",
                self.name, self.checksum, digest
            )));
        }
        let character = CharacterSnapshot::from_bytes(&bytes)
            .map_err(|err| InventoryError::Corrupt(format!("\"{}\": {}", self.name, err)))?;
        Ok(StoredInventory {
            name: self.name.clone(),
            author: self.author.clone(),
            is_private: self.private,
            shared_with: self.usernames.iter().cloned().collect(),
            character,
        })
    }

    fn set_character(&mut self, character: &CharacterSnapshot) -> Result<(), InventoryError> {
        let bytes = character.to_bytes().map_err(InventoryError::Storage)?;
        self.character = BASE64_ENGINE.encode(&bytes);
        self.checksum = sha1_hex(&bytes);
        Ok(())
    }
}

fn sha1_hex(bytes: &[u8]) -> String {
    let mut sha1 = Sha1::new();
    sha1.update(bytes);
    sha1.finalize()
        .iter()
        .map(|byte| format!("{:02x}", byte))
        .collect()
}

/// The inventory table kept as one YAML file under the data root.
pub struct YamlInventoryStore {
    path: PathBuf,
    rows: BTreeMap<String, InventoryRow>,
    cache: RecordCache,
}

impl YamlInventoryStore {
    pub fn open(root: &Path, cache_size: usize) -> Result<Self, InventoryError> {
        let path = root.join(TABLE_FILE);
        let rows = load_table(&path)?;
        Ok(Self {
            path,
            rows,
            cache: RecordCache::new(cache_size),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn backup_path(&self) -> PathBuf {
        backup_path(&self.path)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn cache_stats(&self) -> &CacheStats {
        self.cache.stats()
    }

    /// Swaps in `row` for `name` and writes the table. The previous row is
    /// put back when the write fails.
    fn replace_row(&mut self, name: &str, row: Option<InventoryRow>) -> Result<(), InventoryError> {
        let previous = match row {
            Some(row) => self.rows.insert(name.to_string(), row),
            None => self.rows.remove(name),
        };
        self.cache.invalidate(name);
        if let Err(err) = self.persist() {
            match previous {
                Some(previous) => {
                    self.rows.insert(name.to_string(), previous);
                }
                None => {
                    self.rows.remove(name);
                }
            }
            log_error(&format!("inventory table write failed: {}", err));
            return Err(err);
        }
        Ok(())
    }

    fn persist(&self) -> Result<(), InventoryError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|err| {
                InventoryError::Storage(format!(
                    "inventory dir create failed for {}: {}",
                    parent.display(),
                    err
                ))
            })?;
        }
        let rows: Vec<&InventoryRow> = self.rows.values().collect();
        let data = serde_yaml::to_string(&rows)
            .map_err(|err| InventoryError::Storage(format!("inventory table encode failed: {}", err)))?;

        if self.path.exists() {
            let backup = self.backup_path();
            fs::copy(&self.path, &backup).map_err(|err| {
                InventoryError::Storage(format!(
                    "inventory backup failed for {}: {}",
                    backup.display(),
                    err
                ))
            })?;
        }
        let temp = self.path.with_extension("yaml.tmp");
        fs::write(&temp, data).map_err(|err| {
            InventoryError::Storage(format!(
                "inventory write failed for {}: {}",
                temp.display(),
                err
            ))
        })?;
        fs::rename(&temp, &self.path).map_err(|err| {
            InventoryError::Storage(format!(
                "inventory rename failed for {}: {}",
                self.path.display(),
                err
            ))
        })
    }

    fn modify_row(
        &mut self,
        name: &str,
        change: impl FnOnce(&mut InventoryRow) -> Result<(), InventoryError>,
    ) -> Result<bool, InventoryError> {
        let Some(mut row) = self.rows.get(name).cloned() else {
            return Ok(false);
        };
        change(&mut row)?;
        self.replace_row(name, Some(row))?;
        Ok(true)
    }
}

fn backup_path(path: &Path) -> PathBuf {
    path.with_extension("yaml.bak")
}

fn load_table(path: &Path) -> Result<BTreeMap<String, InventoryRow>, InventoryError> {
    let data = match fs::read_to_string(path) {
        Ok(data) => data,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return load_backup_table(path).map(Option::unwrap_or_default);
        }
        Err(err) => {
            return Err(InventoryError::Storage(format!(
                "inventory read failed for {}: {}",
                path.display(),
                err
            )))
        }
    };
    match parse_table(&data) {
        Ok(rows) => Ok(rows),
        Err(err) => {
            if let Some(fallback) = load_backup_table(path)? {
                log_error(&format!(
                    "inventory table parse failed for {}, using backup: {}",
                    path.display(),
                    err
                ));
                return Ok(fallback);
            }
            Err(InventoryError::Storage(format!(
                "inventory parse failed for {}: {}",
                path.display(),
                err
            )))
        }
    }
}

fn load_backup_table(path: &Path) -> Result<Option<BTreeMap<String, InventoryRow>>, InventoryError> {
    let backup = backup_path(path);
    let data = match fs::read_to_string(&backup) {
        Ok(data) => data,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(err) => {
            return Err(InventoryError::Storage(format!(
                "inventory backup read failed for {}: {}",
                backup.display(),
                err
            )))
        }
    };
    parse_table(&data).map(Some).map_err(|err| {
        InventoryError::Storage(format!(
            "inventory backup parse failed for {}: {}",
            backup.display(),
            err
        ))
    })
}

fn parse_table(data: &str) -> Result<BTreeMap<String, InventoryRow>, String> {
    if data.trim().is_empty() {
        return Ok(BTreeMap::new());
    }
    let rows: Vec<InventoryRow> = serde_yaml::from_str(data).map_err(|err| err.to_string())?;
    let mut table = BTreeMap::new();
    for row in rows {
        if table.contains_key(&row.name) {
            return Err(format!("duplicate inventory name \"{}\"", row.name));
        }
        table.insert(row.name.clone(), row);
    }
    Ok(table)
}

impl InventoryStore for YamlInventoryStore {
    fn load(&mut self, name: &str) -> Result<Option<StoredInventory>, InventoryError> {
        let rows = &self.rows;
        let loaded = self
            .cache
            .get_or_load(name, || rows.get(name).map(InventoryRow::decode).transpose());
        if let Err(err) = &loaded {
            log_error(&format!("inventory load failed: {}", err));
        }
        loaded
    }

    fn save(&mut self, inventory: &StoredInventory) -> Result<(), InventoryError> {
        let row = InventoryRow::encode(inventory)?;
        self.replace_row(&inventory.name, Some(row))?;
        self.cache.insert(inventory.clone());
        log_inventory(&format!(
            "saved \"{}\" by {} ({} slots)",
            inventory.name,
            inventory.author,
            inventory.character.items.len()
        ));
        Ok(())
    }

    fn update_character(
        &mut self,
        name: &str,
        character: &CharacterSnapshot,
    ) -> Result<bool, InventoryError> {
        let updated = self.modify_row(name, |row| row.set_character(character))?;
        if updated {
            log_inventory(&format!(
                "updated \"{}\" ({} slots)",
                name,
                character.items.len()
            ));
        }
        Ok(updated)
    }

    fn update_privacy(&mut self, name: &str, is_private: bool) -> Result<bool, InventoryError> {
        let updated = self.modify_row(name, |row| {
            row.private = is_private;
            Ok(())
        })?;
        if updated {
            log_inventory(&format!(
                "\"{}\" is now {}",
                name,
                if is_private { "private" } else { "public" }
            ));
        }
        Ok(updated)
    }

    fn update_shared_with(
        &mut self,
        name: &str,
        shared_with: &BTreeSet<String>,
    ) -> Result<bool, InventoryError> {
        let updated = self.modify_row(name, |row| {
            row.usernames = shared_with.iter().cloned().collect();
            Ok(())
        })?;
        if updated {
            log_inventory(&format!(
                "\"{}\" shared with [{}]",
                name,
                row_users(shared_with.iter())
            ));
        }
        Ok(updated)
    }

    fn delete(&mut self, name: &str) -> Result<bool, InventoryError> {
        if !self.rows.contains_key(name) {
            return Ok(false);
        }
        self.replace_row(name, None)?;
        log_inventory(&format!("deleted \"{}\"", name));
        Ok(true)
    }

    fn list(&self, filter: &ListFilter) -> Result<Vec<String>, InventoryError> {
        Ok(self
            .rows
            .values()
            .filter(|row| filter.matches(&row.name, &row.author, row.private, row.usernames.iter()))
            .map(|row| row.name.clone())
            .collect())
    }
}

fn row_users<'a>(users: impl Iterator<Item = &'a String>) -> String {
    users.map(String::as_str).collect::<Vec<_>>().join(", ")
}

/// Keeps records in memory. Writes can be made to fail so callers can
/// exercise their storage-error paths.
#[derive(Debug, Default)]
pub struct MemoryInventoryStore {
    records: BTreeMap<String, StoredInventory>,
    failing: bool,
}

impl MemoryInventoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_failing(&mut self, failing: bool) {
        self.failing = failing;
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn check(&self) -> Result<(), InventoryError> {
        if self.failing {
            return Err(InventoryError::Storage("memory store unavailable".to_string()));
        }
        Ok(())
    }

    fn modify(
        &mut self,
        name: &str,
        change: impl FnOnce(&mut StoredInventory),
    ) -> Result<bool, InventoryError> {
        self.check()?;
        match self.records.get_mut(name) {
            Some(record) => {
                change(record);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

impl InventoryStore for MemoryInventoryStore {
    fn load(&mut self, name: &str) -> Result<Option<StoredInventory>, InventoryError> {
        self.check()?;
        Ok(self.records.get(name).cloned())
    }

    fn save(&mut self, inventory: &StoredInventory) -> Result<(), InventoryError> {
        self.check()?;
        self.records.insert(inventory.name.clone(), inventory.clone());
        Ok(())
    }

    fn update_character(
        &mut self,
        name: &str,
        character: &CharacterSnapshot,
    ) -> Result<bool, InventoryError> {
        self.modify(name, |record| record.character = character.clone())
    }

    fn update_privacy(&mut self, name: &str, is_private: bool) -> Result<bool, InventoryError> {
        self.modify(name, |record| record.is_private = is_private)
    }

    fn update_shared_with(
        &mut self,
        name: &str,
        shared_with: &BTreeSet<String>,
    ) -> Result<bool, InventoryError> {
        self.modify(name, |record| record.shared_with = shared_with.clone())
    }

    fn delete(&mut self, name: &str) -> Result<bool, InventoryError> {
        self.check()?;
        Ok(self.records.remove(name).is_some())
    }

    fn list(&self, filter: &ListFilter) -> Result<Vec<String>, InventoryError> {
        self.check()?;
        Ok(self
            .records
            .values()
            .filter(|record| {
                filter.matches(
                    &record.name,
                    &record.author,
                    record.is_private,
                    record.shared_with.iter(),
                )
            })
            .map(|record| record.name.clone())
            .collect())
    }
}
