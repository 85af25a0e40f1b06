// src/gui/actions/capture.rs
use std::fs;

use crate::{
    capture::{self, CaptureOutcome},
    config::consts::DEFAULT_SCOPE,
    gui::{app::App, progress::GuiProgress},
    sources::CaptureContext,
};

pub fn capture(app: &mut App) {
    let src = app.current_source();
    let path = app.state.gui.html_path.trim().to_string();

    if path.is_empty() {
        app.status("Choose a saved page (.html) first");
        logd!("Capture: Clicked without a page path");
        return;
    }

    let doc = match fs::read_to_string(&path) {
        Ok(doc) => doc,
        Err(e) => {
            loge!("Capture: Reading {} failed: {}", path, e);
            app.status(format!("Could not read page: {e}"));
            return;
        }
    };

    let scope = match app.state.gui.scope_key.trim() {
        "" => s!(DEFAULT_SCOPE),
        s => s!(s),
    };
    logf!("Capture: Begin source={} page={} scope={}", src.id(), path, scope);

    let ctx = CaptureContext::new(scope);
    let opts = app.state.options.capture.clone();
    let mut prog = GuiProgress::new(app.status.clone());

    let outcome = capture::capture(src, &doc, app.current_ledger_mut(), &ctx, &opts, Some(&mut prog));

    // the summary replaces whatever progress left behind
    app.status(outcome.summary());
    if let CaptureOutcome::Captured { failures, .. } | CaptureOutcome::Empty { failures } = &outcome {
        for f in failures {
            logd!("Capture: row {} skipped: {}", f.index, f.reason);
        }
    }
}
