use crate::entities::item::ItemTypeId;
use crate::entities::player::ClientId;

pub const MESSAGE_PLAYER_INFO: u8 = 4;
pub const MESSAGE_PLAYER_SLOT: u8 = 5;
pub const MESSAGE_WORLD_INFO: u8 = 7;
pub const MESSAGE_PLAYER_HP: u8 = 16;
pub const MESSAGE_PLAYER_MANA: u8 = 42;

/// Character-state messages the host serializes and broadcasts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientMessage {
    PlayerSlot {
        client: ClientId,
        slot: i16,
        type_id: ItemTypeId,
        stack: i32,
        prefix: u8,
        text: String,
    },
    PlayerInfo {
        client: ClientId,
    },
    PlayerMana {
        client: ClientId,
        mana: i32,
        mana_max: i32,
    },
    PlayerHp {
        client: ClientId,
        life: i32,
        life_max: i32,
    },
}

impl ClientMessage {
    pub fn message_type(&self) -> u8 {
        match self {
            ClientMessage::PlayerSlot { .. } => MESSAGE_PLAYER_SLOT,
            ClientMessage::PlayerInfo { .. } => MESSAGE_PLAYER_INFO,
            ClientMessage::PlayerMana { .. } => MESSAGE_PLAYER_MANA,
            ClientMessage::PlayerHp { .. } => MESSAGE_PLAYER_HP,
        }
    }

    pub fn client(&self) -> ClientId {
        match self {
            ClientMessage::PlayerSlot { client, .. }
            | ClientMessage::PlayerInfo { client }
            | ClientMessage::PlayerMana { client, .. }
            | ClientMessage::PlayerHp { client, .. } => *client,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outbound {
    /// A finished packet addressed to one client.
    Raw { client: ClientId, data: Vec<u8> },
    /// A character message broadcast to every client.
    Broadcast(ClientMessage),
}

/// Collects outbound traffic in emission order until the host flushes it.
#[derive(Debug, Default, Clone)]
pub struct Outbox {
    items: Vec<Outbound>,
}

impl Outbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn send_raw(&mut self, client: ClientId, data: Vec<u8>) {
        self.items.push(Outbound::Raw { client, data });
    }

    pub fn broadcast(&mut self, message: ClientMessage) {
        self.items.push(Outbound::Broadcast(message));
    }

    pub fn extend_broadcast(&mut self, messages: impl IntoIterator<Item = ClientMessage>) {
        for message in messages {
            self.broadcast(message);
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Outbound> {
        self.items.iter()
    }

    pub fn raw_packets(&self) -> impl Iterator<Item = &[u8]> {
        self.items.iter().filter_map(|item| match item {
            Outbound::Raw { data, .. } => Some(data.as_slice()),
            Outbound::Broadcast(_) => None,
        })
    }

    pub fn drain(&mut self) -> std::vec::Drain<'_, Outbound> {
        self.items.drain(..)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outbox_keeps_emission_order() {
        let mut outbox = Outbox::new();
        outbox.send_raw(ClientId(1), vec![3, 0, MESSAGE_WORLD_INFO]);
        outbox.broadcast(ClientMessage::PlayerInfo { client: ClientId(1) });
        outbox.send_raw(ClientId(1), vec![3, 0, MESSAGE_WORLD_INFO]);
        assert_eq!(outbox.len(), 3);
        assert_eq!(outbox.raw_packets().count(), 2);
        let drained: Vec<Outbound> = outbox.drain().collect();
        assert!(matches!(drained[1], Outbound::Broadcast(ClientMessage::PlayerInfo { .. })));
        assert!(outbox.is_empty());
    }

    #[test]
    fn message_types_match_protocol_ids() {
        let client = ClientId(3);
        assert_eq!(ClientMessage::PlayerInfo { client }.message_type(), 4);
        assert_eq!(
            ClientMessage::PlayerHp { client, life: 1, life_max: 1 }.message_type(),
            16
        );
        assert_eq!(
            ClientMessage::PlayerMana { client, mana: 1, mana_max: 1 }.client(),
            client
        );
    }
}
