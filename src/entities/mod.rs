pub mod inventory;
pub mod item;
pub mod player;
