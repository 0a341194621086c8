// Library root
// -----------
// This crate exposes the pieces of the `background-erase` CLI: upload one
// image to the background removal API and save what comes back.
//
// Module responsibilities:
// - `config`: command-line flags and environment fallbacks.
// - `api`: the blocking HTTP client that builds the multipart request and
//   branches on the response status.
// - `output`: writes the returned bytes to the destination path.
// - `error`: the error type shared by all of the above.
// - `ui`: spinner and outcome messages for the terminal.
// - `logging`: tracing subscriber setup for the binary.
pub mod api;
pub mod config;
pub mod error;
pub mod logging;
pub mod output;
pub mod ui;

pub use api::{remove_background_to_file, ApiClient};
pub use config::Config;
pub use error::{Error, Result};
