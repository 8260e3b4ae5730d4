//! Storage module

pub mod layout;
