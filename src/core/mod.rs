// perfsplit - core/mod.rs
//
// Core business logic layer: classification, pooling, discovery, export.
// Must NOT depend on: platform or app.

pub mod classifier;
pub mod discovery;
pub mod export;
pub mod model;
pub mod pool;
