use crate::world::item_types::ItemCatalog;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct ItemTypeId(pub i32);

impl ItemTypeId {
    pub const NONE: ItemTypeId = ItemTypeId(0);

    pub fn is_none(self) -> bool {
        self.0 == 0
    }
}

/// One live equipment slot as the host keeps it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Item {
    pub active: bool,
    pub type_id: ItemTypeId,
    pub stack: i32,
    pub prefix: u8,
    pub name: String,
}

impl Item {
    pub fn new(type_id: ItemTypeId, stack: i32, prefix: u8, catalog: &ItemCatalog) -> Self {
        let mut item = Item::default();
        item.set_defaults(type_id, catalog);
        item.stack = stack;
        item.prefix = prefix;
        item
    }

    /// Inactive, typeless and zero-stack items all count as an empty slot.
    pub fn is_empty(&self) -> bool {
        !self.active || self.type_id.is_none() || self.stack == 0
    }

    /// Resets the item to the catalog defaults for `type_id`. Id 0 yields an
    /// inactive, unnamed item.
    pub fn set_defaults(&mut self, type_id: ItemTypeId, catalog: &ItemCatalog) {
        self.type_id = type_id;
        self.prefix = 0;
        if type_id.is_none() {
            self.active = false;
            self.stack = 0;
            self.name.clear();
        } else {
            self.active = true;
            self.stack = 1;
            self.name = catalog.display_name(type_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_item_detection_covers_each_reason() {
        let catalog = ItemCatalog::default();
        let item = Item::new(ItemTypeId(4), 3, 1, &catalog);
        assert!(!item.is_empty());

        let mut inactive = item.clone();
        inactive.active = false;
        assert!(inactive.is_empty());

        let mut no_stack = item.clone();
        no_stack.stack = 0;
        assert!(no_stack.is_empty());

        let mut no_type = item;
        no_type.type_id = ItemTypeId::NONE;
        assert!(no_type.is_empty());
    }

    #[test]
    fn set_defaults_to_none_clears_item() {
        let catalog = ItemCatalog::default();
        let mut item = Item::new(ItemTypeId(9), 20, 5, &catalog);
        item.set_defaults(ItemTypeId::NONE, &catalog);
        assert!(!item.active);
        assert_eq!(item.stack, 0);
        assert_eq!(item.prefix, 0);
        assert!(item.name.is_empty());
    }
}
