// src/gui/components/mod.rs
pub mod capture_bar;
pub mod confirm_reset;
pub mod export_bar;
pub mod ledger_table;
pub mod tabs;
