//! Host input adapters: pointer coordinate mapping and keyboard commands.

pub mod mapping;
pub mod shortcuts;
