use std::path::{Path, PathBuf};

pub const DEFAULT_CACHE_SIZE: usize = 64;
pub const DEFAULT_ADMIN_PERMISSION: &str = "invmanager.admin";
pub const DEFAULT_USE_PERMISSION: &str = "invmanager.use";

/// Runtime knobs handed to the inventory manager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagerConfig {
    pub cache_size: usize,
    pub admin_permission: String,
    pub use_permission: String,
    pub server_side_characters: bool,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            cache_size: DEFAULT_CACHE_SIZE,
            admin_permission: DEFAULT_ADMIN_PERMISSION.to_string(),
            use_permission: DEFAULT_USE_PERMISSION.to_string(),
            server_side_characters: false,
        }
    }
}

impl ManagerConfig {
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, String> {
        let mut config = Self::default();
        if let Some(value) = non_empty(lookup("INVMANAGER_CACHE_SIZE")) {
            config.cache_size = value
                .parse::<usize>()
                .map_err(|_| format!("INVMANAGER_CACHE_SIZE expected a number, got '{value}'"))?;
        }
        if let Some(value) = non_empty(lookup("INVMANAGER_ADMIN_PERMISSION")) {
            config.admin_permission = value;
        }
        if let Some(value) = non_empty(lookup("INVMANAGER_USE_PERMISSION")) {
            config.use_permission = value;
        }
        if let Some(value) = non_empty(lookup("INVMANAGER_SSC")) {
            config.server_side_characters = parse_flag(&value)
                .ok_or_else(|| format!("INVMANAGER_SSC expected on/off, got '{value}'"))?;
        }
        Ok(config)
    }
}

#[derive(Debug)]
pub struct AppConfig {
    pub root: PathBuf,
    /// The admin verb and its arguments, as typed after `/inv`.
    pub command: Vec<String>,
    pub manager: ManagerConfig,
}

impl AppConfig {
    pub fn from_args(args: &[String]) -> Result<Self, String> {
        if args.len() < 2 {
            return Err(
                "usage: invmanager <data-root> [load|save|del|allow|remove|rest|priv|info|list] [arguments]"
                    .to_string(),
            );
        }

        let root = Path::new(&args[1]).to_path_buf();
        let command = args[2..].to_vec();
        Ok(Self {
            root,
            command,
            manager: ManagerConfig::from_env()?,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.and_then(|value| {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Some(true),
        "0" | "false" | "off" | "no" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_without_environment() {
        let config = ManagerConfig::from_lookup(lookup(&[])).expect("config");
        assert_eq!(config, ManagerConfig::default());
        assert_eq!(config.cache_size, 64);
        assert_eq!(config.admin_permission, "invmanager.admin");
    }

    #[test]
    fn environment_overrides_apply() {
        let config = ManagerConfig::from_lookup(lookup(&[
            ("INVMANAGER_CACHE_SIZE", " 8 "),
            ("INVMANAGER_ADMIN_PERMISSION", "diogen.invmanager.admin"),
            ("INVMANAGER_USE_PERMISSION", ""),
            ("INVMANAGER_SSC", "On"),
        ]))
        .expect("config");
        assert_eq!(config.cache_size, 8);
        assert_eq!(config.admin_permission, "diogen.invmanager.admin");
        assert_eq!(config.use_permission, "invmanager.use");
        assert!(config.server_side_characters);
    }

    #[test]
    fn bad_values_are_rejected() {
        assert!(ManagerConfig::from_lookup(lookup(&[("INVMANAGER_CACHE_SIZE", "lots")])).is_err());
        assert!(ManagerConfig::from_lookup(lookup(&[("INVMANAGER_SSC", "maybe")])).is_err());
    }

    #[test]
    fn from_args_requires_root() {
        assert!(AppConfig::from_args(&["invmanager".to_string()]).is_err());
    }

    #[test]
    fn from_args_splits_root_and_command() {
        let args: Vec<String> = ["invmanager", "/srv/data", "info", "Mage", "Kit"]
            .iter()
            .map(|arg| arg.to_string())
            .collect();
        let config = AppConfig::from_args(&args).expect("config");
        assert_eq!(config.root, PathBuf::from("/srv/data"));
        assert_eq!(config.command, vec!["info", "Mage", "Kit"]);
    }
}
