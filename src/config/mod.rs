// src/config/mod.rs
//! Configuration: search/cache settings (`analyzer`) and the text-generation
//! provider (`ai`). Both follow the same lookup order: explicit env path,
//! then `config/`, then built-in defaults.

pub mod ai;
pub mod analyzer;
