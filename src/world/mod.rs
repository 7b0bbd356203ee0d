pub mod item_types;
