// src/config/consts.rs

// Local store (stands in for the site-origin key/value storage)
pub const STORE_DIR: &str = ".store";
pub const STORE_EXT: &str = "json";
pub const LOG_FILE: &str = "debug.log";

// Key layout inside the store
pub const SCOPE_MARKER_TAG: &str = "scope";

// Export
pub const DEFAULT_OUT_DIR: &str = "out";
pub const EXPORT_SUFFIX: &str = "export";
pub const EXPORT_EXT: &str = "csv";
pub const BOM: &str = "\u{FEFF}";

// Scope used when the caller gives none (e.g. CLI capture without --scope)
pub const DEFAULT_SCOPE: &str = "default";
