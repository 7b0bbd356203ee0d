use crate::entities::item::{Item, ItemTypeId};
use crate::entities::player::{ClientId, LiveCharacter};
use crate::net::messages::ClientMessage;
use crate::net::packet::{PacketReader, PacketWriter};
use crate::world::item_types::ItemCatalog;

/// One populated equipment slot, addressed by absolute index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemSlot {
    pub slot: i16,
    pub type_id: ItemTypeId,
    pub stack: i32,
    pub prefix: u8,
}

impl ItemSlot {
    pub fn new(slot: i16, type_id: ItemTypeId, stack: i32, prefix: u8) -> Self {
        Self {
            slot,
            type_id,
            stack,
            prefix,
        }
    }

    /// An empty item at `slot`. Applying it clears the live slot.
    pub fn cleared(slot: i16) -> Self {
        Self::new(slot, ItemTypeId::NONE, 0, 0)
    }

    /// `None` for empty live items; they are never stored.
    pub fn capture(slot: i16, item: &Item) -> Option<Self> {
        if item.is_empty() {
            return None;
        }
        Some(Self::new(slot, item.type_id, item.stack, item.prefix))
    }

    /// Overwrites the live slot and returns the slot-update message. Slots
    /// outside the live layout are skipped and produce nothing.
    pub fn apply(
        &self,
        client: ClientId,
        character: &mut LiveCharacter,
        catalog: &ItemCatalog,
    ) -> Option<ClientMessage> {
        let item = character.slot_mut(i32::from(self.slot))?;
        item.set_defaults(self.type_id, catalog);
        item.stack = self.stack;
        item.prefix = self.prefix;
        Some(ClientMessage::PlayerSlot {
            client,
            slot: self.slot,
            type_id: item.type_id,
            stack: item.stack,
            prefix: item.prefix,
            text: item.name.clone(),
        })
    }

    pub fn write(&self, writer: &mut PacketWriter) {
        writer.write_i16_le(self.slot);
        writer.write_i32_le(self.type_id.0);
        writer.write_i32_le(self.stack);
        writer.write_u8(self.prefix);
    }

    pub fn read(reader: &mut PacketReader<'_>) -> Option<Self> {
        Some(Self {
            slot: reader.read_i16_le()?,
            type_id: ItemTypeId(reader.read_i32_le()?),
            stack: reader.read_i32_le()?,
            prefix: reader.read_u8()?,
        })
    }
}
