#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InventoryError {
    NotFound(String),
    /// Carries the verb shown to the player, e.g. "load" or "delete".
    PermissionDenied(&'static str),
    NoActiveSession,
    UnknownUser(String),
    AlreadyShared(String),
    NotShared(String),
    NotLoggedIn,
    NotInGame,
    Storage(String),
    Corrupt(String),
    Encoding(String),
}

impl InventoryError {
    /// The text shown to the player who issued the command.
    pub fn player_message(&self) -> String {
        match self {
            InventoryError::NotFound(name) => format!("Inventory \"{}\" not found.", name),
            InventoryError::PermissionDenied(action) => {
                format!("You do not have permission to {} this inventory.", action)
            }
            InventoryError::NoActiveSession => "Your backpack not found.".to_string(),
            InventoryError::UnknownUser(user) => format!("User \"{}\" not found.", user),
            InventoryError::AlreadyShared(user) => {
                format!("User \"{}\" has already been allowed.", user)
            }
            InventoryError::NotShared(user) => format!("User \"{}\" has not been allowed.", user),
            InventoryError::NotLoggedIn => "Log in to your account, please.".to_string(),
            InventoryError::NotInGame => "This command must be used in game.".to_string(),
            InventoryError::Storage(_)
            | InventoryError::Corrupt(_)
            | InventoryError::Encoding(_) => {
                "Something went wrong...".to_string()
            }
        }
    }
}

impl std::fmt::Display for InventoryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InventoryError::NotFound(name) => write!(f, "inventory not found: {}", name),
            InventoryError::PermissionDenied(action) => write!(f, "permission denied: {}", action),
            InventoryError::NoActiveSession => write!(f, "no active swap session"),
            InventoryError::UnknownUser(user) => write!(f, "unknown user: {}", user),
            InventoryError::AlreadyShared(user) => write!(f, "already shared with {}", user),
            InventoryError::NotShared(user) => write!(f, "not shared with {}", user),
            InventoryError::NotLoggedIn => write!(f, "caller is not logged in"),
            InventoryError::NotInGame => write!(f, "caller is not an in-game player"),
            InventoryError::Storage(msg) => write!(f, "storage error: {}", msg),
            InventoryError::Corrupt(msg) => write!(f, "corrupt record: {}", msg),
            InventoryError::Encoding(msg) => write!(f, "packet encoding failed: {}", msg),
        }
    }
}

impl std::error::Error for InventoryError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_failures_hide_details_from_players() {
        let err = InventoryError::Storage("disk full".to_string());
        assert_eq!(err.player_message(), "Something went wrong...");
        assert_eq!(err.to_string(), "storage error: disk full");
    }

    #[test]
    fn not_found_names_the_inventory() {
        let err = InventoryError::NotFound("Mage Kit".to_string());
        assert_eq!(err.player_message(), "Inventory \"Mage Kit\" not found.");
    }

    #[test]
    fn permission_denied_names_the_action() {
        let err = InventoryError::PermissionDenied("delete");
        assert_eq!(
            err.player_message(),
            "You do not have permission to delete this inventory."
        );
    }
}
