// src/models/mod.rs

pub mod analysis;
pub mod history;
pub mod language;
pub mod question;
