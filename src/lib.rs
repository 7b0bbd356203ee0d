pub mod admin;
mod config;
pub mod entities;
pub mod error;
pub mod inventory;
pub mod net;
pub mod persistence;
pub mod plugin;
pub mod session;
pub mod telemetry;
pub mod world;

pub use config::{ManagerConfig, DEFAULT_ADMIN_PERMISSION, DEFAULT_CACHE_SIZE, DEFAULT_USE_PERMISSION};
pub use error::InventoryError;
pub use net::packet::{PacketReader, PacketWriter};
pub use plugin::{Caller, InventoryManager, PluginHost, Reply, ReplyKind};

use entities::player::{ClientId, LiveCharacter};
use net::messages::Outbound;
use net::world_info::WorldInfo;
use persistence::store::YamlInventoryStore;
use world::item_types::ItemCatalog;

/// The offline admin binary has no connected clients and no account
/// registry, so every user name is accepted.
struct ConsoleHost;

impl PluginHost for ConsoleHost {
    fn client_state(&mut self, _client: ClientId) -> Option<(&mut LiveCharacter, &WorldInfo)> {
        None
    }

    fn account_exists(&self, _name: &str) -> bool {
        true
    }

    fn deliver(&mut self, _outbound: Outbound) {}
}

/// Runs one `/inv` verb against the data root as the console administrator.
pub fn run(args: &[String]) -> Result<(), String> {
    let config = config::AppConfig::from_args(args)?;
    telemetry::logging::init(&config.root)?;
    let catalog = ItemCatalog::load(&config.root)?.unwrap_or_default();
    let store = YamlInventoryStore::open(&config.root, config.manager.cache_size)
        .map_err(|err| err.to_string())?;
    telemetry::logging::log_inventory(&format!(
        "console: {} inventories, {} item names, verb {:?}",
        store.len(),
        catalog.len(),
        config.command.first().map(String::as_str).unwrap_or("help")
    ));

    let mut manager = InventoryManager::new(store, catalog, config.manager);
    let replies = manager.on_command(&Caller::console(), &config.command, &mut ConsoleHost);

    let mut errors = Vec::new();
    for reply in replies {
        match reply.kind {
            ReplyKind::Error => errors.push(reply.text),
            ReplyKind::Info | ReplyKind::Success => println!("{}", reply.text),
        }
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors.join("\n"))
    }
}
