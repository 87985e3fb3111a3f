//! Sitework - task dependency tracking for construction projects.
//!
//! This crate provides both a CLI application and a library for resolving
//! task dependencies and deciding which tasks may start.

#![forbid(unsafe_code)]

// Public modules for library usage
pub mod board;
pub mod domain;
pub mod error;
pub mod events;
pub mod graph;
pub mod loader;

// Public CLI module (needed by binary)
pub mod cli;

pub mod app;
pub mod config;
pub mod output;
