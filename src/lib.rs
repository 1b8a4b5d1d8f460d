//! Uniform Wash Tracker
//!
//! This library provides the core functionality for the uniform-wash-tracker
//! service, which tracks individually coded work uniforms through the
//! launder / ESD-retest / rewash / scrap lifecycle.

pub mod app_state;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;
pub mod store;
