//! Core data layer
//!
//! Document types, the storage seam, and the typed repository that the
//! content services are built on.

pub mod data;
pub mod operations;
pub mod traits;
