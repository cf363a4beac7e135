// src/services/mod.rs

pub mod analysis;
pub mod geo;
pub mod history;
pub mod selector;
