//! Absolute slot addressing across the five equipment zones.
//!
//! The host numbers every equipment slot contiguously: primary inventory
//! first, then armor, dye, accessories and accessory dyes.

pub const INVENTORY_SLOTS: usize = 59;
pub const ARMOR_SLOTS: usize = 20;
pub const DYE_SLOTS: usize = 10;
pub const ACCESSORY_SLOTS: usize = 5;
pub const ACCESSORY_DYE_SLOTS: usize = 5;

pub const INVENTORY_START: usize = 0;
pub const ARMOR_START: usize = INVENTORY_START + INVENTORY_SLOTS;
pub const DYE_START: usize = ARMOR_START + ARMOR_SLOTS;
pub const ACCESSORY_START: usize = DYE_START + DYE_SLOTS;
pub const ACCESSORY_DYE_START: usize = ACCESSORY_START + ACCESSORY_SLOTS;
pub const TOTAL_SLOTS: usize = ACCESSORY_DYE_START + ACCESSORY_DYE_SLOTS;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Zone {
    Inventory,
    Armor,
    Dye,
    Accessory,
    AccessoryDye,
}

/// Zones in scan order.
pub const ZONES: [Zone; 5] = [
    Zone::Inventory,
    Zone::Armor,
    Zone::Dye,
    Zone::Accessory,
    Zone::AccessoryDye,
];

impl Zone {
    pub fn start(self) -> usize {
        match self {
            Zone::Inventory => INVENTORY_START,
            Zone::Armor => ARMOR_START,
            Zone::Dye => DYE_START,
            Zone::Accessory => ACCESSORY_START,
            Zone::AccessoryDye => ACCESSORY_DYE_START,
        }
    }

    pub fn len(self) -> usize {
        match self {
            Zone::Inventory => INVENTORY_SLOTS,
            Zone::Armor => ARMOR_SLOTS,
            Zone::Dye => DYE_SLOTS,
            Zone::Accessory => ACCESSORY_SLOTS,
            Zone::AccessoryDye => ACCESSORY_DYE_SLOTS,
        }
    }

    pub fn end(self) -> usize {
        self.start() + self.len()
    }

    /// Absolute index of `local` within this zone, if it fits.
    pub fn absolute(self, local: usize) -> Option<usize> {
        if local < self.len() {
            Some(self.start() + local)
        } else {
            None
        }
    }
}

/// Maps an absolute slot to its zone and local index. Anything outside
/// `0..TOTAL_SLOTS` has no target slot.
pub fn zone_of(absolute: i32) -> Option<(Zone, usize)> {
    let absolute = usize::try_from(absolute).ok()?;
    ZONES
        .iter()
        .find(|zone| absolute < zone.end())
        .map(|zone| (*zone, absolute - zone.start()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zone_boundaries_match_host_layout() {
        assert_eq!(zone_of(0), Some((Zone::Inventory, 0)));
        assert_eq!(zone_of(58), Some((Zone::Inventory, 58)));
        assert_eq!(zone_of(59), Some((Zone::Armor, 0)));
        assert_eq!(zone_of(78), Some((Zone::Armor, 19)));
        assert_eq!(zone_of(79), Some((Zone::Dye, 0)));
        assert_eq!(zone_of(89), Some((Zone::Accessory, 0)));
        assert_eq!(zone_of(94), Some((Zone::AccessoryDye, 0)));
        assert_eq!(zone_of(98), Some((Zone::AccessoryDye, 4)));
        assert_eq!(TOTAL_SLOTS, 99);
    }

    #[test]
    fn out_of_range_has_no_target() {
        assert_eq!(zone_of(-1), None);
        assert_eq!(zone_of(TOTAL_SLOTS as i32), None);
        assert_eq!(zone_of(i32::MAX), None);
    }

    #[test]
    fn absolute_inverts_zone_of() {
        for absolute in 0..TOTAL_SLOTS {
            let (zone, local) = zone_of(absolute as i32).expect("zone");
            assert_eq!(zone.absolute(local), Some(absolute));
        }
        assert_eq!(Zone::Accessory.absolute(5), None);
    }
}
