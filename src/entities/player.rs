use crate::entities::inventory::{zone_of, Zone, ZONES};
use crate::entities::item::Item;
use serde::{Deserialize, Serialize};

/// Host connection index of a client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClientId(pub u8);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

pub const HIDE_ACCESSORY_FLAGS: usize = 10;

/// Character state of a connected client as the host holds it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiveCharacter {
    pub inventory: Vec<Item>,
    pub armor: Vec<Item>,
    pub dye: Vec<Item>,
    pub misc_equips: Vec<Item>,
    pub misc_dyes: Vec<Item>,
    pub skin_variant: u8,
    pub hair: u8,
    pub hair_dye: u8,
    pub hide_misc: u8,
    pub hide_visible_accessory: [bool; HIDE_ACCESSORY_FLAGS],
    pub hair_color: Rgb,
    pub skin_color: Rgb,
    pub eye_color: Rgb,
    pub shirt_color: Rgb,
    pub under_shirt_color: Rgb,
    pub pants_color: Rgb,
    pub shoe_color: Rgb,
    pub stat_life: i32,
    pub stat_life_max: i32,
    pub stat_mana: i32,
    pub stat_mana_max: i32,
}

impl Default for LiveCharacter {
    fn default() -> Self {
        Self {
            inventory: vec![Item::default(); Zone::Inventory.len()],
            armor: vec![Item::default(); Zone::Armor.len()],
            dye: vec![Item::default(); Zone::Dye.len()],
            misc_equips: vec![Item::default(); Zone::Accessory.len()],
            misc_dyes: vec![Item::default(); Zone::AccessoryDye.len()],
            skin_variant: 0,
            hair: 0,
            hair_dye: 0,
            hide_misc: 0,
            hide_visible_accessory: [false; HIDE_ACCESSORY_FLAGS],
            hair_color: Rgb::new(215, 90, 55),
            skin_color: Rgb::new(255, 125, 90),
            eye_color: Rgb::new(105, 90, 75),
            shirt_color: Rgb::new(175, 165, 140),
            under_shirt_color: Rgb::new(160, 180, 215),
            pants_color: Rgb::new(255, 230, 175),
            shoe_color: Rgb::new(160, 105, 60),
            stat_life: 100,
            stat_life_max: 100,
            stat_mana: 20,
            stat_mana_max: 20,
        }
    }
}

impl LiveCharacter {
    pub fn zone(&self, zone: Zone) -> &[Item] {
        match zone {
            Zone::Inventory => &self.inventory,
            Zone::Armor => &self.armor,
            Zone::Dye => &self.dye,
            Zone::Accessory => &self.misc_equips,
            Zone::AccessoryDye => &self.misc_dyes,
        }
    }

    pub fn zone_mut(&mut self, zone: Zone) -> &mut [Item] {
        match zone {
            Zone::Inventory => &mut self.inventory,
            Zone::Armor => &mut self.armor,
            Zone::Dye => &mut self.dye,
            Zone::Accessory => &mut self.misc_equips,
            Zone::AccessoryDye => &mut self.misc_dyes,
        }
    }

    /// The live item behind an absolute slot. `None` when the slot falls
    /// outside every zone or past the end of this character's zone.
    pub fn slot_mut(&mut self, absolute: i32) -> Option<&mut Item> {
        let (zone, local) = zone_of(absolute)?;
        self.zone_mut(zone).get_mut(local)
    }

    pub fn slot(&self, absolute: i32) -> Option<&Item> {
        let (zone, local) = zone_of(absolute)?;
        self.zone(zone).get(local)
    }

    /// Every live item paired with its absolute slot, in zone scan order.
    pub fn slots(&self) -> impl Iterator<Item = (usize, &Item)> + '_ {
        ZONES.iter().flat_map(move |zone| {
            let start = zone.start();
            self.zone(*zone)
                .iter()
                .take(zone.len())
                .enumerate()
                .map(move |(local, item)| (start + local, item))
        })
    }

    pub fn occupied_slots(&self) -> usize {
        self.slots().filter(|(_, item)| !item.is_empty()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::inventory::TOTAL_SLOTS;
    use crate::entities::item::ItemTypeId;
    use crate::world::item_types::ItemCatalog;

    #[test]
    fn default_character_has_every_slot() {
        let character = LiveCharacter::default();
        assert_eq!(character.slots().count(), TOTAL_SLOTS);
        assert_eq!(character.occupied_slots(), 0);
    }

    #[test]
    fn slot_mut_resolves_zone_and_local_index() {
        let catalog = ItemCatalog::default();
        let mut character = LiveCharacter::default();
        *character.slot_mut(60).expect("armor slot") = Item::new(ItemTypeId(5), 1, 0, &catalog);
        assert_eq!(character.armor[1].type_id, ItemTypeId(5));
        assert_eq!(character.occupied_slots(), 1);
        assert!(character.slot_mut(-4).is_none());
        assert!(character.slot_mut(TOTAL_SLOTS as i32).is_none());
    }

    #[test]
    fn short_zone_has_no_target_past_its_end() {
        let mut character = LiveCharacter::default();
        character.misc_dyes.truncate(2);
        assert!(character.slot_mut(95).is_some());
        assert!(character.slot_mut(97).is_none());
    }
}
