mod entity;
mod mapper;
mod record;

pub use entity::Entity;
pub use mapper::map_records;
pub use record::load_records;
