/// Database connection and table creation
pub mod database;

/// Seed catalog loading from config.toml
pub mod seed;
