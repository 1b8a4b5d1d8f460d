pub mod cache;
pub mod lifecycle;
pub mod scrap;
pub mod status;
