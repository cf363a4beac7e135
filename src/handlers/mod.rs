// src/handlers/mod.rs

pub mod history;
pub mod language;
pub mod quiz;
