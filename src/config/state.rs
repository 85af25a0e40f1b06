// src/config/state.rs
use super::options::AppOptions;

#[derive(Clone, Debug)]
pub struct GuiState {
    /// Active tab index into `sources::all()`
    pub current_source_index: usize,

    /// Saved HTML snapshot to capture from
    pub html_path: String,

    /// Scope key for "once per day" gating (path + query of the captured page)
    pub scope_key: String,

    pub window_w: u32,
    pub window_h: u32,
}

impl Default for GuiState {
    fn default() -> Self {
        Self {
            current_source_index: 0,
            html_path: s!(),
            scope_key: s!(),
            window_w: 1100,
            window_h: 700,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct AppState {
    pub options: AppOptions,
    pub gui: GuiState,
}
