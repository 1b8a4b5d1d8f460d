pub mod codes;
pub mod health;
pub mod metrics;
pub mod wash;
