pub mod bar;
pub mod loader;

// Re-export the Bar struct for convenient access (e.g. `use crate::market_data::Bar`).
pub use bar::{Bar, Columns};
pub use loader::BarLoader;
