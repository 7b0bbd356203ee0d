use crate::persistence::store::ListFilter;

pub const HELP_TEXT: &str = "Syntax: /inv [load|save|del|allow|remove|rest|priv|info|list] arguments";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InventoryCommand {
    Load { name: String },
    Save { name: String },
    Rest,
    Delete { name: String },
    Privacy { is_private: bool, name: String },
    Allow { user: String, name: String },
    Remove { user: String, name: String },
    List(ListQuery),
    Info { name: String },
    Help,
}

/// A parsed `list` request. `tokens` keeps the accepted filter tokens so the
/// next-page hint can repeat them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListQuery {
    pub filter: ListFilter,
    pub page: usize,
    pub tokens: Vec<String>,
}

impl ListQuery {
    /// Filter descriptions in header order.
    pub fn tags(&self) -> Vec<String> {
        let mut tags = Vec::new();
        if let Some(name) = &self.filter.name {
            tags.push(format!("called like {}", name));
        }
        if let Some(author) = &self.filter.author {
            tags.push(format!("created by {}", author));
        }
        if let Some(is_private) = self.filter.is_private {
            tags.push(if is_private { "private" } else { "public" }.to_string());
        }
        if let Some(user) = &self.filter.user {
            tags.push(format!("shared with {}", user));
        }
        tags
    }
}

/// Parses the arguments typed after `/inv`. `Err` carries the usage line
/// for a verb given with missing arguments. Unknown verbs fall back to help.
pub fn parse_inventory_command(args: &[String]) -> Result<InventoryCommand, String> {
    let Some((verb, rest)) = args.split_first() else {
        return Ok(InventoryCommand::Help);
    };
    let parsed = match verb.as_str() {
        "load" => InventoryCommand::Load {
            name: joined_name(rest).ok_or_else(|| "Syntax: /inv load Name".to_string())?,
        },
        "save" => InventoryCommand::Save {
            name: joined_name(rest).ok_or_else(|| "Syntax: /inv save Name".to_string())?,
        },
        "rest" => InventoryCommand::Rest,
        "del" => InventoryCommand::Delete {
            name: joined_name(rest).ok_or_else(|| "Syntax: /inv del Name".to_string())?,
        },
        "priv" => {
            let usage = || "Syntax: /inv priv [on|off] Name".to_string();
            let (mode, name_parts) = rest.split_first().ok_or_else(usage)?;
            let is_private = match mode.as_str() {
                "on" => true,
                "off" => false,
                _ => return Err(usage()),
            };
            InventoryCommand::Privacy {
                is_private,
                name: joined_name(name_parts).ok_or_else(usage)?,
            }
        }
        "allow" | "remove" => {
            let usage = || format!("Syntax: /inv {} Username Name", verb);
            let (user, name_parts) = rest.split_first().ok_or_else(usage)?;
            let name = joined_name(name_parts).ok_or_else(usage)?;
            let user = user.clone();
            if verb == "allow" {
                InventoryCommand::Allow { user, name }
            } else {
                InventoryCommand::Remove { user, name }
            }
        }
        "list" => InventoryCommand::List(parse_list_query(rest)),
        "info" => InventoryCommand::Info {
            name: joined_name(rest).ok_or_else(|| "Syntax: /inv info Name".to_string())?,
        },
        _ => InventoryCommand::Help,
    };
    Ok(parsed)
}

fn joined_name(parts: &[String]) -> Option<String> {
    if parts.is_empty() {
        return None;
    }
    Some(parts.join(" "))
}

/// Filter tokens: `name:`, `author:`, `user:` and their `(_)` forms, where
/// underscores stand for spaces; `-public`, `-private`; a bare number picks
/// the page. Anything else is ignored.
pub fn parse_list_query(tokens: &[String]) -> ListQuery {
    let mut query = ListQuery {
        page: 1,
        ..ListQuery::default()
    };
    for token in tokens {
        if let Ok(page) = token.parse::<i64>() {
            query.page = page.clamp(1, i64::from(u32::MAX)) as usize;
            continue;
        }
        let accepted = if let Some(value) = filter_value(token, "name:", false) {
            query.filter.name = Some(value);
            true
        } else if let Some(value) = filter_value(token, "author:", false) {
            query.filter.author = Some(value);
            true
        } else if let Some(value) = filter_value(token, "user:", false) {
            query.filter.user = Some(value);
            true
        } else if let Some(value) = filter_value(token, "name(_):", true) {
            query.filter.name = Some(value);
            true
        } else if let Some(value) = filter_value(token, "author(_):", true) {
            query.filter.author = Some(value);
            true
        } else if let Some(value) = filter_value(token, "user(_):", true) {
            query.filter.user = Some(value);
            true
        } else if token == "-public" {
            query.filter.is_private = Some(false);
            true
        } else if token == "-private" {
            query.filter.is_private = Some(true);
            true
        } else {
            false
        };
        if accepted {
            query.tokens.push(token.clone());
        }
    }
    query
}

fn filter_value(token: &str, prefix: &str, underscores: bool) -> Option<String> {
    let value = token.strip_prefix(prefix)?;
    if value.is_empty() {
        return None;
    }
    if underscores {
        Some(value.replace('_', " "))
    } else {
        Some(value.to_string())
    }
}
