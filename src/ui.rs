// UI layer: the little bit of terminal feedback the CLI gives. A spinner
// on stderr while the upload is in flight, then one line of outcome.

use std::path::Path;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use crate::error::Error;

/// Start a spinner with `msg`. indicatif hides it when stderr is not a
/// terminal, so piping the output stays clean.
pub fn spinner(msg: &'static str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message(msg);
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

pub fn saved_message(dst: &Path) -> String {
    format!("✅ Saved: {}", dst.display())
}

/// Usage errors print as-is; everything else gets the failure marker.
pub fn failure_message(err: &Error) -> String {
    match err {
        Error::Usage(usage) => usage.to_string(),
        other => format!("❌ {other}"),
    }
}

pub fn report_saved(dst: &Path) {
    println!("{}", saved_message(dst));
}

pub fn report_failure(err: &Error) {
    eprintln!("{}", failure_message(err));
}
