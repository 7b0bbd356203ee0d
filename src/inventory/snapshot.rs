use crate::entities::inventory::ZONES;
use crate::entities::player::{ClientId, LiveCharacter};
use crate::inventory::appearance::AppearanceRecord;
use crate::inventory::item_slot::ItemSlot;
use crate::net::messages::ClientMessage;
use crate::net::packet::{PacketReader, PacketWriter};
use crate::world::item_types::ItemCatalog;
use std::collections::BTreeSet;

const SNAPSHOT_VERSION: u8 = 1;

/// Occupied equipment slots plus appearance, in zone scan order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CharacterSnapshot {
    pub items: Vec<ItemSlot>,
    pub appearance: AppearanceRecord,
}

impl CharacterSnapshot {
    pub fn capture(character: &LiveCharacter) -> Self {
        let mut items = Vec::new();
        for zone in ZONES {
            let start = zone.start();
            for (local, item) in character.zone(zone).iter().take(zone.len()).enumerate() {
                let absolute = (start + local) as i16;
                if let Some(slot) = ItemSlot::capture(absolute, item) {
                    items.push(slot);
                }
            }
        }
        Self {
            items,
            appearance: AppearanceRecord::capture(character),
        }
    }

    /// Applies every item, then the appearance.
    pub fn apply(
        &self,
        client: ClientId,
        character: &mut LiveCharacter,
        catalog: &ItemCatalog,
    ) -> Vec<ClientMessage> {
        let mut messages: Vec<ClientMessage> = self
            .items
            .iter()
            .filter_map(|slot| slot.apply(client, character, catalog))
            .collect();
        messages.extend(self.appearance.apply(client, character));
        messages
    }

    /// Empties every slot this snapshot occupies on `character`.
    pub fn clear(
        &self,
        client: ClientId,
        character: &mut LiveCharacter,
        catalog: &ItemCatalog,
    ) -> Vec<ClientMessage> {
        self.items
            .iter()
            .filter_map(|slot| ItemSlot::cleared(slot.slot).apply(client, character, catalog))
            .collect()
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, String> {
        let count = u16::try_from(self.items.len())
            .map_err(|_| format!("snapshot has too many items: {}", self.items.len()))?;
        let mut writer = PacketWriter::with_capacity(3 + self.items.len() * 11 + 31);
        writer.write_u8(SNAPSHOT_VERSION);
        writer.write_u16_le(count);
        for slot in &self.items {
            slot.write(&mut writer);
        }
        self.appearance.write(&mut writer);
        Ok(writer.into_vec())
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self, String> {
        let mut reader = PacketReader::new(data);
        let version = reader
            .read_u8()
            .ok_or_else(|| "snapshot missing version".to_string())?;
        if version != SNAPSHOT_VERSION {
            return Err(format!("unsupported snapshot version {}", version));
        }
        let count = reader
            .read_u16_le()
            .ok_or_else(|| "snapshot missing item count".to_string())?;
        let mut items = Vec::with_capacity(usize::from(count));
        for index in 0..count {
            let slot = ItemSlot::read(&mut reader)
                .ok_or_else(|| format!("snapshot item {} truncated", index))?;
            items.push(slot);
        }
        let appearance = AppearanceRecord::read(&mut reader)
            .ok_or_else(|| "snapshot appearance truncated".to_string())?;
        if reader.remaining() != 0 {
            return Err(format!("snapshot has {} trailing bytes", reader.remaining()));
        }
        Ok(Self { items, appearance })
    }
}

/// A named, persisted snapshot with its ownership and sharing rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredInventory {
    pub name: String,
    pub author: String,
    pub is_private: bool,
    pub shared_with: BTreeSet<String>,
    pub character: CharacterSnapshot,
}

impl StoredInventory {
    /// A fresh public record owned by `author`.
    pub fn new(name: impl Into<String>, author: impl Into<String>, character: CharacterSnapshot) -> Self {
        Self {
            name: name.into(),
            author: author.into(),
            is_private: false,
            shared_with: BTreeSet::new(),
            character,
        }
    }

    pub fn can_manage(&self, account: &str, is_admin: bool) -> bool {
        is_admin || self.author == account
    }

    pub fn can_load(&self, account: &str, is_admin: bool) -> bool {
        !self.is_private || self.can_manage(account, is_admin) || self.shared_with.contains(account)
    }

    /// Drops the in-memory payload once a swap no longer needs it.
    pub fn clear(&mut self) {
        self.shared_with.clear();
        self.character.items.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::inventory::{Zone, TOTAL_SLOTS};
    use crate::entities::item::{Item, ItemTypeId};

    fn lcg_next(state: &mut u64) -> u32 {
        *state = state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1);
        (*state >> 32) as u32
    }

    fn random_character(state: &mut u64, catalog: &ItemCatalog) -> LiveCharacter {
        let mut character = LiveCharacter::default();
        for absolute in 0..TOTAL_SLOTS as i32 {
            let roll = lcg_next(state) % 5;
            let type_id = ItemTypeId((lcg_next(state) % 5000) as i32);
            let stack = (lcg_next(state) % 999) as i32;
            let prefix = (lcg_next(state) % 80) as u8;
            let item = character.slot_mut(absolute).expect("slot");
            *item = Item::new(type_id, stack, prefix, catalog);
            if roll == 0 {
                item.active = false;
            }
        }
        for flag in character.hide_visible_accessory.iter_mut() {
            *flag = lcg_next(state) % 2 == 0;
        }
        character.hair = (lcg_next(state) % 160) as u8;
        character.skin_variant = (lcg_next(state) % 12) as u8;
        character.stat_life_max = (lcg_next(state) % 600) as i32;
        character.stat_mana_max = (lcg_next(state) % 400) as i32;
        character
    }

    #[test]
    fn capture_skips_empty_and_orders_by_zone() {
        let catalog = ItemCatalog::default();
        let mut character = LiveCharacter::default();
        character.misc_dyes[0] = Item::new(ItemTypeId(3), 1, 0, &catalog);
        character.inventory[10] = Item::new(ItemTypeId(1), 5, 0, &catalog);
        character.armor[2] = Item::new(ItemTypeId(2), 0, 0, &catalog);
        let snapshot = CharacterSnapshot::capture(&character);
        let slots: Vec<i16> = snapshot.items.iter().map(|slot| slot.slot).collect();
        assert_eq!(slots, vec![10, Zone::AccessoryDye.start() as i16]);
    }

    #[test]
    fn captured_snapshots_never_hold_empty_slots() {
        let catalog = ItemCatalog::default();
        let mut state = 0xfeed_beef_1234_5678;
        for _ in 0..64 {
            let character = random_character(&mut state, &catalog);
            let snapshot = CharacterSnapshot::capture(&character);
            assert_eq!(snapshot.items.len(), character.occupied_slots());
            for slot in &snapshot.items {
                assert!(!slot.type_id.is_none());
                assert_ne!(slot.stack, 0);
                assert!(!character.slot(i32::from(slot.slot)).expect("slot").is_empty());
            }
        }
    }

    #[test]
    fn bytes_roundtrip_for_random_characters() {
        let catalog = ItemCatalog::default();
        let mut state = 0x0bad_cafe_0000_0001;
        for _ in 0..64 {
            let character = random_character(&mut state, &catalog);
            let snapshot = CharacterSnapshot::capture(&character);
            let bytes = snapshot.to_bytes().expect("encode");
            let decoded = CharacterSnapshot::from_bytes(&bytes).expect("decode");
            assert_eq!(decoded, snapshot);
            assert_eq!(decoded.appearance.hide_visual, character.hide_visible_accessory);
        }
    }

    #[test]
    fn apply_to_empty_character_reproduces_capture() {
        let catalog = ItemCatalog::default();
        let mut state = 42;
        let source = random_character(&mut state, &catalog);
        let snapshot = CharacterSnapshot::capture(&source);
        let mut target = LiveCharacter::default();
        let messages = snapshot.apply(ClientId(1), &mut target, &catalog);
        assert!(messages.len() >= snapshot.items.len() + 1);
        assert_eq!(CharacterSnapshot::capture(&target).items, snapshot.items);
    }

    #[test]
    fn clear_empties_only_snapshot_slots() {
        let catalog = ItemCatalog::default();
        let mut character = LiveCharacter::default();
        character.inventory[0] = Item::new(ItemTypeId(1), 1, 0, &catalog);
        character.armor[0] = Item::new(ItemTypeId(2), 1, 0, &catalog);
        let snapshot = CharacterSnapshot {
            items: vec![ItemSlot::new(0, ItemTypeId(1), 1, 0)],
            appearance: AppearanceRecord::default(),
        };
        let messages = snapshot.clear(ClientId(0), &mut character, &catalog);
        assert_eq!(messages.len(), 1);
        assert!(character.inventory[0].is_empty());
        assert!(!character.armor[0].is_empty());
    }

    #[test]
    fn from_bytes_rejects_corruption() {
        let snapshot = CharacterSnapshot {
            items: vec![ItemSlot::new(3, ItemTypeId(8), 2, 0)],
            appearance: AppearanceRecord::default(),
        };
        let bytes = snapshot.to_bytes().expect("encode");
        assert!(CharacterSnapshot::from_bytes(&bytes[..bytes.len() - 1]).is_err());
        let mut extended = bytes.clone();
        extended.push(0);
        assert!(CharacterSnapshot::from_bytes(&extended).is_err());
        let mut wrong_version = bytes;
        wrong_version[0] = 9;
        assert!(CharacterSnapshot::from_bytes(&wrong_version).is_err());
    }

    #[test]
    fn access_rules() {
        let mut inventory = StoredInventory::new("Kit", "alice", CharacterSnapshot::default());
        assert!(inventory.can_load("bob", false));
        inventory.is_private = true;
        assert!(!inventory.can_load("bob", false));
        assert!(inventory.can_load("alice", false));
        assert!(inventory.can_load("bob", true));
        inventory.shared_with.insert("bob".to_string());
        assert!(inventory.can_load("bob", false));
        assert!(!inventory.can_manage("bob", false));
        assert!(inventory.can_manage("carol", true));
    }
}
