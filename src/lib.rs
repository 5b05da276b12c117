// Library surface for integration tests and reuse.
// Keep this lean to avoid coupling to bin-only types in main.rs.
pub mod analyze;
pub mod config;
pub mod coverage;
pub mod db;
pub mod freq;
pub mod input;
pub mod rarity;
pub mod reference;
pub mod report;
pub mod scoring;

/// Version stamped into every persisted analysis row.
pub const TOOL_VERSION: &str = env!("CARGO_PKG_VERSION");
