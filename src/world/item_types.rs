use crate::entities::item::ItemTypeId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemType {
    pub id: i32,
    pub name: String,
}

/// Display names for item ids, used in slot-update messages.
#[derive(Debug, Default, Clone)]
pub struct ItemCatalog {
    types: HashMap<ItemTypeId, ItemType>,
}

impl ItemCatalog {
    /// Loads `items.yaml` from the data root. A missing file is not an error.
    pub fn load(root: &Path) -> Result<Option<Self>, String> {
        let path = root.join("items.yaml");
        let data = match fs::read_to_string(&path) {
            Ok(data) => data,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => {
                return Err(format!(
                    "item catalog read failed for {}: {}",
                    path.display(),
                    err
                ))
            }
        };
        Self::parse(&data)
            .map(Some)
            .map_err(|err| format!("item catalog parse failed for {}: {}", path.display(), err))
    }

    pub fn parse(data: &str) -> Result<Self, String> {
        let entries: Vec<ItemType> =
            serde_yaml::from_str(data).map_err(|err| err.to_string())?;
        let mut catalog = ItemCatalog::default();
        for entry in entries {
            catalog.insert(entry)?;
        }
        Ok(catalog)
    }

    pub fn get(&self, id: ItemTypeId) -> Option<&ItemType> {
        self.types.get(&id)
    }

    pub fn insert(&mut self, item: ItemType) -> Result<(), String> {
        let id = ItemTypeId(item.id);
        if id.is_none() {
            return Err("item type 0 is reserved for empty slots".to_string());
        }
        if self.types.contains_key(&id) {
            return Err(format!("item type {:?} already exists", id));
        }
        self.types.insert(id, item);
        Ok(())
    }

    pub fn display_name(&self, id: ItemTypeId) -> String {
        if id.is_none() {
            return String::new();
        }
        match self.types.get(&id) {
            Some(item) => item.name.clone(),
            None => format!("Item #{}", id.0),
        }
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_catalog_and_lookup_names() {
        let catalog = ItemCatalog::parse("- id: 1\n  name: Iron Pickaxe\n- id: 2\n  name: Dirt Block\n")
            .expect("catalog");
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.display_name(ItemTypeId(1)), "Iron Pickaxe");
        assert_eq!(catalog.display_name(ItemTypeId(77)), "Item #77");
        assert_eq!(catalog.display_name(ItemTypeId::NONE), "");
    }

    #[test]
    fn parse_rejects_duplicates_and_zero() {
        let err = ItemCatalog::parse("- id: 3\n  name: A\n- id: 3\n  name: B\n")
            .expect_err("duplicate");
        assert!(err.contains("already exists"));
        assert!(ItemCatalog::parse("- id: 0\n  name: Nothing\n").is_err());
    }

    #[test]
    fn load_missing_file_is_none() {
        let root = std::env::temp_dir().join(format!("invmanager-catalog-test-{}", std::process::id()));
        assert!(ItemCatalog::load(&root).expect("load").is_none());
    }
}
