//! Liquid Labs CLI Library
//!
//! Configuration, container runtime driver and commands for the on-prem stack.

pub mod cli;
pub mod commands;
pub mod config;
pub mod errors;
pub mod filesys;
pub mod logs;
pub mod runtime;
pub mod storage;
