// Entrypoint for the CLI application.
// - Parses flags, installs logging, runs the single upload.
// - Exit codes: 0 saved, 1 upload/save failure, 2 usage error.

use std::process;

use background_erase::config::{Config, UsageError};
use background_erase::{logging, remove_background_to_file, ui, Error};

fn main() {
    let config = match Config::from_env_args() {
        Ok(config) => config,
        Err(UsageError::Help) => {
            println!("{}", UsageError::help_text());
            return;
        }
        Err(usage) => {
            let err = Error::from(usage);
            ui::report_failure(&err);
            process::exit(err.exit_code());
        }
    };

    logging::init(config.verbose);
    tracing::debug!(?config, "starting");

    let spinner = ui::spinner("Removing background...");
    let result = remove_background_to_file(&config);
    spinner.finish_and_clear();

    match result {
        Ok(()) => ui::report_saved(&config.output),
        Err(err) => {
            ui::report_failure(&err);
            process::exit(err.exit_code());
        }
    }
}
