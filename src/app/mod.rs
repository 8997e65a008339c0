// perfsplit - app/mod.rs
//
// Application layer: run orchestration over core and platform.

pub mod split;
