//! Per-client swap sessions.
//!
//! A client is either idle (no entry) or swapped (one entry holding the
//! snapshot to return to). Every transition clears the slots currently
//! shown before applying new ones, so old and new item sets never render
//! together.

use crate::entities::player::{ClientId, LiveCharacter};
use crate::error::InventoryError;
use crate::inventory::snapshot::{CharacterSnapshot, StoredInventory};
use crate::net::messages::Outbox;
use crate::net::world_info::{write_world_info, WorldInfo};
use crate::telemetry::logging::log_session;
use crate::world::item_types::ItemCatalog;
use std::collections::hash_map::Entry;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapSession {
    original: CharacterSnapshot,
    pending: StoredInventory,
}

impl SwapSession {
    /// The live state captured before the first load.
    pub fn original(&self) -> &CharacterSnapshot {
        &self.original
    }

    /// The stored inventory currently worn.
    pub fn pending(&self) -> &StoredInventory {
        &self.pending
    }

    /// Puts the original state back on `character` without sending anything.
    pub fn restore_silently(
        mut self,
        client: ClientId,
        character: &mut LiveCharacter,
        catalog: &ItemCatalog,
    ) {
        let worn = CharacterSnapshot::capture(character);
        worn.clear(client, character, catalog);
        self.original.apply(client, character, catalog);
        self.original.items.clear();
        self.pending.clear();
        log_session(&format!(
            "client {} left while wearing \"{}\", state restored",
            client.0, self.pending.name
        ));
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Started,
    Chained,
}

/// Live state a transition works on. The borrows are split so the host can
/// hand out its character and world at once.
pub struct SwapContext<'a> {
    pub client: ClientId,
    pub character: &'a mut LiveCharacter,
    pub world: &'a WorldInfo,
    pub catalog: &'a ItemCatalog,
}

/// The two world packets that bracket a swap. Both are encoded before any
/// state changes, so an encoding failure leaves the client untouched.
struct Bracket {
    forced: Vec<u8>,
    ordinary: Vec<u8>,
}

impl Bracket {
    /// `None` when the host already runs server-side characters; the client
    /// needs no mode change then.
    fn build(world: &WorldInfo) -> Result<Option<Self>, InventoryError> {
        if world.server_side_characters {
            return Ok(None);
        }
        let forced = write_world_info(world, true).map_err(InventoryError::Encoding)?;
        let ordinary = write_world_info(world, world.server_side_characters)
            .map_err(InventoryError::Encoding)?;
        Ok(Some(Self { forced, ordinary }))
    }
}

#[derive(Debug, Default)]
pub struct SwapSessions {
    sessions: HashMap<ClientId, SwapSession>,
}

impl SwapSessions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, client: ClientId) -> Option<&SwapSession> {
        self.sessions.get(&client)
    }

    pub fn is_active(&self, client: ClientId) -> bool {
        self.sessions.contains_key(&client)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Puts `inventory` on the client. A client that is already swapped
    /// keeps its original snapshot and only changes what it wears.
    pub fn load(
        &mut self,
        ctx: SwapContext<'_>,
        inventory: StoredInventory,
        outbox: &mut Outbox,
    ) -> Result<LoadOutcome, InventoryError> {
        let bracket = Bracket::build(ctx.world)?;
        let client = ctx.client;
        let current = CharacterSnapshot::capture(ctx.character);

        if let Some(bracket) = &bracket {
            outbox.send_raw(client, bracket.forced.clone());
        }
        outbox.extend_broadcast(current.clear(client, ctx.character, ctx.catalog));
        outbox.extend_broadcast(inventory.character.apply(client, ctx.character, ctx.catalog));
        if let Some(bracket) = bracket {
            outbox.send_raw(client, bracket.ordinary);
        }

        let name = inventory.name.clone();
        let outcome = match self.sessions.entry(client) {
            Entry::Occupied(mut entry) => {
                entry.get_mut().pending = inventory;
                LoadOutcome::Chained
            }
            Entry::Vacant(entry) => {
                entry.insert(SwapSession {
                    original: current,
                    pending: inventory,
                });
                LoadOutcome::Started
            }
        };
        log_session(&format!(
            "client {} loaded \"{}\" ({:?})",
            client.0, name, outcome
        ));
        Ok(outcome)
    }

    /// Gives the client back the state it had before its first load.
    pub fn restore(&mut self, ctx: SwapContext<'_>, outbox: &mut Outbox) -> Result<(), InventoryError> {
        let client = ctx.client;
        if !self.sessions.contains_key(&client) {
            return Err(InventoryError::NoActiveSession);
        }
        let bracket = Bracket::build(ctx.world)?;
        let mut session = self
            .sessions
            .remove(&client)
            .ok_or(InventoryError::NoActiveSession)?;

        if let Some(bracket) = &bracket {
            outbox.send_raw(client, bracket.forced.clone());
        }
        let worn = CharacterSnapshot::capture(ctx.character);
        outbox.extend_broadcast(worn.clear(client, ctx.character, ctx.catalog));
        outbox.extend_broadcast(session.original.apply(client, ctx.character, ctx.catalog));
        session.original.items.clear();
        session.pending.clear();
        if let Some(bracket) = bracket {
            outbox.send_raw(client, bracket.ordinary);
        }
        log_session(&format!(
            "client {} restored from \"{}\"",
            client.0, session.pending.name
        ));
        Ok(())
    }

    /// Takes the client's session out of the table, whether or not its
    /// character can still be reached.
    pub fn remove(&mut self, client: ClientId) -> Option<SwapSession> {
        self.sessions.remove(&client)
    }

    /// Restores live state for a departing client without sending anything.
    /// Returns `false` when the client had no session.
    pub fn disconnect(
        &mut self,
        client: ClientId,
        character: &mut LiveCharacter,
        catalog: &ItemCatalog,
    ) -> bool {
        match self.remove(client) {
            Some(session) => {
                session.restore_silently(client, character, catalog);
                true
            }
            None => false,
        }
    }
}
