pub mod commands;
pub mod dispatch;
pub mod pagination;
