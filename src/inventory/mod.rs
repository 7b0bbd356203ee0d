pub mod appearance;
pub mod item_slot;
pub mod snapshot;
