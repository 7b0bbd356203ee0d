//! The entry points a game host calls: `/inv` commands and player leave.

use crate::admin::commands::parse_inventory_command;
use crate::config::ManagerConfig;
use crate::entities::player::{ClientId, LiveCharacter};
use crate::error::InventoryError;
use crate::net::messages::Outbound;
use crate::net::world_info::WorldInfo;
use crate::persistence::store::InventoryStore;
use crate::session::swap::SwapSessions;
use crate::telemetry::logging::log_session;
use crate::world::item_types::ItemCatalog;

/// What the manager needs from the game server.
pub trait PluginHost {
    /// The live character of a connected client together with the current
    /// world state.
    fn client_state(&mut self, client: ClientId) -> Option<(&mut LiveCharacter, &WorldInfo)>;

    fn account_exists(&self, name: &str) -> bool;

    fn deliver(&mut self, outbound: Outbound);
}

/// Whoever typed the command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub account: Option<String>,
    /// Set for real in-game players.
    pub client: Option<ClientId>,
    pub permissions: Vec<String>,
    superuser: bool,
}

impl Caller {
    pub fn player(account: Option<&str>, client: ClientId, permissions: &[&str]) -> Self {
        Self {
            account: account.map(str::to_string),
            client: Some(client),
            permissions: permissions.iter().map(|perm| perm.to_string()).collect(),
            superuser: false,
        }
    }

    /// The server console: an administrator with no character.
    pub fn console() -> Self {
        Self {
            account: Some("Server".to_string()),
            client: None,
            permissions: Vec::new(),
            superuser: true,
        }
    }

    pub fn has_permission(&self, permission: &str) -> bool {
        self.superuser || self.permissions.iter().any(|perm| perm == permission)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyKind {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub kind: ReplyKind,
    pub text: String,
}

impl Reply {
    pub fn info(text: impl Into<String>) -> Self {
        Self { kind: ReplyKind::Info, text: text.into() }
    }

    pub fn success(text: impl Into<String>) -> Self {
        Self { kind: ReplyKind::Success, text: text.into() }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self { kind: ReplyKind::Error, text: text.into() }
    }
}

pub struct InventoryManager<S> {
    pub(crate) store: S,
    pub(crate) sessions: SwapSessions,
    pub(crate) catalog: ItemCatalog,
    pub(crate) config: ManagerConfig,
}

impl<S: InventoryStore> InventoryManager<S> {
    pub fn new(store: S, catalog: ItemCatalog, config: ManagerConfig) -> Self {
        Self {
            store,
            sessions: SwapSessions::new(),
            catalog,
            config,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn sessions(&self) -> &SwapSessions {
        &self.sessions
    }

    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    /// Handles `/inv <args>`.
    pub fn on_command(
        &mut self,
        caller: &Caller,
        args: &[String],
        host: &mut impl PluginHost,
    ) -> Vec<Reply> {
        if !caller.has_permission(&self.config.use_permission) {
            return vec![Reply::error("You do not have access to this command.")];
        }
        let Some(account) = caller.account.as_deref() else {
            return vec![Reply::error(InventoryError::NotLoggedIn.player_message())];
        };
        match parse_inventory_command(args) {
            Ok(command) => self.execute(caller, account, command, host),
            Err(usage) => vec![Reply::info(usage)],
        }
    }

    /// Handles a client leaving. Live state goes back to what it was before
    /// any load; nothing is sent. The session always ends, even when the
    /// host has already dropped the character, since client ids are reused.
    pub fn on_leave(&mut self, client: ClientId, host: &mut impl PluginHost) -> bool {
        let Some(session) = self.sessions.remove(client) else {
            return false;
        };
        match host.client_state(client) {
            Some((character, _)) => session.restore_silently(client, character, &self.catalog),
            None => log_session(&format!(
                "client {} left without a character, session \"{}\" dropped",
                client.0,
                session.pending().name
            )),
        }
        true
    }
}
