pub mod api;
pub mod garment;
pub mod wash;
