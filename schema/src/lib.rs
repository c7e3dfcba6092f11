// Shape Arena Schema - Shared type definitions
// This crate contains the core enums and catalog templates that are shared between
// the battle engine and anything that needs to read or write catalog data.

// Re-export the main types
pub use catalog_data::*;
pub use keys::*;
pub use move_types::*;
pub use shape_types::*;

pub mod catalog_data;
pub mod keys;
pub mod move_types;
pub mod shape_types;
