//! Integration tests for the config store and commands

mod support;
mod test_store;
