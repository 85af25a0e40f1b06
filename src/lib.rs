// src/lib.rs
#[macro_use]
pub mod macros;
#[macro_use]
pub mod log;

pub mod config;
pub mod core;
pub mod error;

pub mod record;
pub mod csv;
pub mod store;
pub mod ledger;
pub mod sources;
pub mod capture;
pub mod export;
pub mod progress;

pub mod cli;
pub mod gui;
