pub mod bootstrap;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod report;
pub mod schema;
pub mod state;
