use crate::admin::commands::{InventoryCommand, ListQuery, HELP_TEXT};
use crate::admin::pagination::{build_lines, render_page, PageSettings, LINES_PER_PAGE, MAX_LINE_CHARS};
use crate::entities::player::ClientId;
use crate::error::InventoryError;
use crate::inventory::snapshot::{CharacterSnapshot, StoredInventory};
use crate::net::messages::Outbox;
use crate::net::world_info::WorldInfo;
use crate::persistence::store::InventoryStore;
use crate::plugin::{Caller, InventoryManager, PluginHost, Reply};
use crate::session::swap::SwapContext;
use crate::telemetry::logging::log_error;
use std::borrow::Cow;

/// Who is asking, resolved once per command.
struct Actor<'a> {
    account: &'a str,
    client: Option<ClientId>,
    is_admin: bool,
}

impl Actor<'_> {
    fn in_game(&self) -> Result<ClientId, InventoryError> {
        self.client.ok_or(InventoryError::NotInGame)
    }
}

impl<S: InventoryStore> InventoryManager<S> {
    pub(crate) fn execute(
        &mut self,
        caller: &Caller,
        account: &str,
        command: InventoryCommand,
        host: &mut impl PluginHost,
    ) -> Vec<Reply> {
        let actor = Actor {
            account,
            client: caller.client,
            is_admin: caller.has_permission(&self.config.admin_permission),
        };
        let result = match command {
            InventoryCommand::Load { name } => self.load_command(&actor, &name, host),
            InventoryCommand::Save { name } => self.save_command(&actor, &name, host),
            InventoryCommand::Rest => self.rest_command(&actor, host),
            InventoryCommand::Delete { name } => self.delete_command(&actor, &name),
            InventoryCommand::Privacy { is_private, name } => {
                self.privacy_command(&actor, &name, is_private)
            }
            InventoryCommand::Allow { user, name } => {
                self.share_command(&actor, &user, &name, true, &*host)
            }
            InventoryCommand::Remove { user, name } => {
                self.share_command(&actor, &user, &name, false, &*host)
            }
            InventoryCommand::List(query) => self.list_command(&query),
            InventoryCommand::Info { name } => self.info_command(&name),
            InventoryCommand::Help => Ok(vec![Reply::info(HELP_TEXT)]),
        };
        result.unwrap_or_else(|err| {
            if matches!(
                err,
                InventoryError::Storage(_) | InventoryError::Corrupt(_) | InventoryError::Encoding(_)
            ) {
                log_error(&format!("/inv from {} failed: {}", account, err));
            }
            vec![Reply::error(err.player_message())]
        })
    }

    fn find(&mut self, name: &str) -> Result<StoredInventory, InventoryError> {
        self.store
            .load(name)?
            .ok_or_else(|| InventoryError::NotFound(name.to_string()))
    }

    /// The world as the swap should see it. A host configured for
    /// server-side characters is treated as such even if its world state
    /// does not say so.
    fn effective_world<'w>(&self, world: &'w WorldInfo) -> Cow<'w, WorldInfo> {
        if self.config.server_side_characters && !world.server_side_characters {
            let mut forced = world.clone();
            forced.server_side_characters = true;
            Cow::Owned(forced)
        } else {
            Cow::Borrowed(world)
        }
    }

    fn load_command(
        &mut self,
        actor: &Actor<'_>,
        name: &str,
        host: &mut impl PluginHost,
    ) -> Result<Vec<Reply>, InventoryError> {
        let client = actor.in_game()?;
        let inventory = self.find(name)?;
        if !inventory.can_load(actor.account, actor.is_admin) {
            return Err(InventoryError::PermissionDenied("load"));
        }
        let mut outbox = Outbox::new();
        {
            let (character, world) = host.client_state(client).ok_or(InventoryError::NotInGame)?;
            let world = self.effective_world(world);
            self.sessions.load(
                SwapContext {
                    client,
                    character,
                    world: &world,
                    catalog: &self.catalog,
                },
                inventory,
                &mut outbox,
            )?;
        }
        for outbound in outbox.drain() {
            host.deliver(outbound);
        }
        Ok(vec![Reply::success(format!(
            "Inventory \"{}\" successfully loaded!",
            name
        ))])
    }

    fn save_command(
        &mut self,
        actor: &Actor<'_>,
        name: &str,
        host: &mut impl PluginHost,
    ) -> Result<Vec<Reply>, InventoryError> {
        let client = actor.in_game()?;
        let snapshot = {
            let (character, _) = host.client_state(client).ok_or(InventoryError::NotInGame)?;
            CharacterSnapshot::capture(character)
        };
        match self.store.load(name)? {
            None => {
                self.store
                    .save(&StoredInventory::new(name, actor.account, snapshot))?;
            }
            Some(existing) => {
                if !existing.can_manage(actor.account, actor.is_admin) {
                    return Err(InventoryError::PermissionDenied("change"));
                }
                if !self.store.update_character(name, &snapshot)? {
                    return Err(InventoryError::Storage(format!(
                        "inventory \"{}\" vanished during save",
                        name
                    )));
                }
            }
        }
        Ok(vec![Reply::success(format!(
            "Inventory \"{}\" successfully saved!",
            name
        ))])
    }

    fn rest_command(
        &mut self,
        actor: &Actor<'_>,
        host: &mut impl PluginHost,
    ) -> Result<Vec<Reply>, InventoryError> {
        let client = actor.in_game()?;
        if !self.sessions.is_active(client) {
            return Err(InventoryError::NoActiveSession);
        }
        let mut outbox = Outbox::new();
        {
            let (character, world) = host.client_state(client).ok_or(InventoryError::NotInGame)?;
            let world = self.effective_world(world);
            self.sessions.restore(
                SwapContext {
                    client,
                    character,
                    world: &world,
                    catalog: &self.catalog,
                },
                &mut outbox,
            )?;
        }
        for outbound in outbox.drain() {
            host.deliver(outbound);
        }
        Ok(vec![Reply::success("Your inventory is back!")])
    }

    fn delete_command(&mut self, actor: &Actor<'_>, name: &str) -> Result<Vec<Reply>, InventoryError> {
        let inventory = self.find(name)?;
        if !inventory.can_manage(actor.account, actor.is_admin) {
            return Err(InventoryError::PermissionDenied("delete"));
        }
        if !self.store.delete(name)? {
            return Err(InventoryError::Storage(format!(
                "inventory \"{}\" vanished during delete",
                name
            )));
        }
        Ok(vec![Reply::success(format!(
            "Inventory \"{}\" successfully deleted!",
            name
        ))])
    }

    fn privacy_command(
        &mut self,
        actor: &Actor<'_>,
        name: &str,
        is_private: bool,
    ) -> Result<Vec<Reply>, InventoryError> {
        let inventory = self.find(name)?;
        if !inventory.can_manage(actor.account, actor.is_admin) {
            return Err(InventoryError::PermissionDenied("change"));
        }
        if !self.store.update_privacy(name, is_private)? {
            return Err(InventoryError::Storage(format!(
                "inventory \"{}\" vanished during privacy change",
                name
            )));
        }
        Ok(vec![Reply::success(format!(
            "The status of the inventory \"{}\" changed: {}.",
            name,
            status(is_private)
        ))])
    }

    fn share_command(
        &mut self,
        actor: &Actor<'_>,
        user: &str,
        name: &str,
        allow: bool,
        host: &impl PluginHost,
    ) -> Result<Vec<Reply>, InventoryError> {
        if !host.account_exists(user) {
            return Err(InventoryError::UnknownUser(user.to_string()));
        }
        let mut inventory = self.find(name)?;
        if !inventory.can_manage(actor.account, actor.is_admin) {
            return Err(InventoryError::PermissionDenied("change"));
        }
        if allow {
            if !inventory.shared_with.insert(user.to_string()) {
                return Err(InventoryError::AlreadyShared(user.to_string()));
            }
        } else if !inventory.shared_with.remove(user) {
            return Err(InventoryError::NotShared(user.to_string()));
        }
        if !self.store.update_shared_with(name, &inventory.shared_with)? {
            return Err(InventoryError::Storage(format!(
                "inventory \"{}\" vanished during share change",
                name
            )));
        }
        Ok(vec![Reply::success("Done!")])
    }

    fn list_command(&mut self, query: &ListQuery) -> Result<Vec<Reply>, InventoryError> {
        let names = self.store.list(&query.filter)?;
        let lines = build_lines(&names, MAX_LINE_CHARS);

        let tags = query.tags();
        let header = |page: usize, total: usize| {
            if tags.is_empty() {
                format!("Inventories ({}/{}):", page, total)
            } else {
                format!("Inventories {} ({}/{}):", tags.join(", "), page, total)
            }
        };
        let footer = |next: usize| {
            let mut parts: Vec<String> = vec!["list".to_string()];
            parts.extend(query.tokens.iter().map(|token| format!("\"{}\"", token)));
            parts.push(next.to_string());
            format!("Type /inv {} for more.", parts.join(" "))
        };
        let settings = PageSettings {
            header: &header,
            footer: &footer,
            nothing_to_display: "Such inventories don't exist in this universe!",
            lines_per_page: LINES_PER_PAGE,
        };
        match render_page(&lines, query.page, &settings) {
            Ok(page) => Ok(page.into_iter().map(Reply::info).collect()),
            Err(message) => Ok(vec![Reply::error(message)]),
        }
    }

    fn info_command(&mut self, name: &str) -> Result<Vec<Reply>, InventoryError> {
        let inventory = self.find(name)?;
        let shared_with = if inventory.shared_with.is_empty() {
            "-".to_string()
        } else {
            inventory
                .shared_with
                .iter()
                .map(String::as_str)
                .collect::<Vec<_>>()
                .join(", ")
        };
        let appearance = &inventory.character.appearance;
        Ok(vec![
            Reply::info(format!("-- Inventory \"{}\" info --", inventory.name)),
            Reply::info(format!("Author: {}", inventory.author)),
            Reply::info(format!("Status: {}", status(inventory.is_private))),
            Reply::info(format!("Shared with: {}", shared_with)),
            Reply::info(format!(
                "Count of occupied slots: {}",
                inventory.character.items.len()
            )),
            Reply::info(format!("Mana: {}", appearance.max_mana)),
            Reply::info(format!("HP: {}", appearance.max_health)),
        ])
    }
}

fn status(is_private: bool) -> &'static str {
    if is_private {
        "private"
    } else {
        "public"
    }
}
