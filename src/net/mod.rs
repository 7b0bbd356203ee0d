pub mod bits;
pub mod messages;
pub mod packet;
pub mod world_info;
