// src/bin/gui.rs
#![cfg_attr(target_os = "windows", windows_subsystem = "windows")]
use shop_ledger::{config::state::GuiState, gui};
use eframe::egui::{IconData, ViewportBuilder};

const ICON_SIZE: u32 = 32;

/// A ruled ledger page: paper fill, blue rules, red margin line.
fn app_icon() -> IconData {
    let n = ICON_SIZE;
    let mut rgba = Vec::with_capacity((n * n * 4) as usize);
    for y in 0..n {
        for x in 0..n {
            let border = x < 2 || y < 2 || x >= n - 2 || y >= n - 2;
            let px: [u8; 4] = if border {
                [0x3a, 0x3a, 0x46, 0xff]
            } else if x == 8 {
                [0xdc, 0x61, 0x49, 0xff]
            } else if y > 4 && y % 5 == 0 {
                [0x64, 0xb4, 0xff, 0xff]
            } else {
                [0xf4, 0xf1, 0xe6, 0xff]
            };
            rgba.extend_from_slice(&px);
        }
    }
    IconData { rgba, width: n, height: n }
}

fn main() {
    let gui = GuiState::default();
    let options = eframe::NativeOptions {
        viewport: ViewportBuilder::default()
            .with_inner_size([gui.window_w as f32, gui.window_h as f32])
            .with_icon(app_icon()),
        ..Default::default()
    };

    if let Err(e) = gui::run(options) {
        eprintln!("GUI failed: {}", e);
        std::process::exit(1);
    }
}
