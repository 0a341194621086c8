// Configuration module: turns the command line (and a couple of
// environment variables) into a `Config`. Flags follow the single-dash
// style `-in path`, and also accept `-in=path`, `--in path`, `--in=path`.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use clap::error::ErrorKind;
use clap::{ArgAction, CommandFactory, Parser};

/// Fixed endpoint of the background removal service.
pub const DEFAULT_ENDPOINT: &str = "https://api.backgrounderase.net/v2";
/// Environment variable consulted when `-key` is absent.
pub const API_KEY_ENV: &str = "BACKGROUND_ERASE_API_KEY";
/// Environment variable consulted when `-url` is absent.
pub const ENDPOINT_ENV: &str = "BACKGROUND_ERASE_API_URL";
/// Client-side bound on the whole request.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

pub const USAGE: &str =
    "Usage: background-erase -in input.jpg -out output.png [-key YOUR_API_KEY]";
pub const KEY_HINT: &str = "Provide -key or set BACKGROUND_ERASE_API_KEY environment variable.";

#[derive(Parser, Debug)]
#[command(
    name = "background-erase",
    about = "Upload an image to the background removal API and save the result",
    override_usage = "background-erase -in input.jpg -out output.png [-key YOUR_API_KEY]",
    after_help = "Flags may be written with one or two dashes: -in photo.jpg, --in=photo.jpg",
    disable_help_flag = true
)]
struct Cli {
    /// Path to input image
    #[arg(long = "in", value_name = "path")]
    input: Option<String>,

    /// Path to save output image
    #[arg(long = "out", value_name = "path")]
    output: Option<String>,

    /// API key (or set BACKGROUND_ERASE_API_KEY)
    #[arg(long, value_name = "api key")]
    key: Option<String>,

    /// Override the API endpoint (or set BACKGROUND_ERASE_API_URL)
    #[arg(long, value_name = "url")]
    url: Option<String>,

    /// Request timeout in seconds
    #[arg(
        long,
        value_name = "secs",
        default_value_t = DEFAULT_TIMEOUT_SECS,
        allow_negative_numbers = true,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    timeout: u64,

    /// Verbose logging
    #[arg(
        long = "v",
        num_args = 0..=1,
        require_equals = true,
        default_value_t = false,
        default_missing_value = "true",
        action = ArgAction::Set
    )]
    verbose: bool,

    /// Print help
    #[arg(long = "help", alias = "h", action = ArgAction::Help)]
    help: Option<bool>,
}

/// Everything one invocation needs.
#[derive(Clone)]
pub struct Config {
    pub input: PathBuf,
    pub output: PathBuf,
    pub api_key: String,
    pub endpoint: String,
    pub timeout: Duration,
    pub verbose: bool,
}

// Hand-written so the API key never ends up in logs.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("input", &self.input)
            .field("output", &self.output)
            .field("api_key", &"<redacted>")
            .field("endpoint", &self.endpoint)
            .field("timeout", &self.timeout)
            .field("verbose", &self.verbose)
            .finish()
    }
}

/// Problems with the command line itself. All of these exit with code 2,
/// except `Help` which is a request rather than an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UsageError {
    /// `-h` / `-help` was given.
    Help,
    /// One or more required values are empty.
    Missing { input: bool, output: bool, key: bool },
    /// A flag was unknown, lacked a value, or had a bad value.
    Invalid(String),
}

impl UsageError {
    pub fn missing(input: bool, output: bool, key: bool) -> Self {
        UsageError::Missing { input, output, key }
    }

    /// Full help text printed for `-h`.
    pub fn help_text() -> String {
        Cli::command().render_help().to_string()
    }

    fn from_clap(err: clap::Error) -> Self {
        if err.kind() == ErrorKind::DisplayHelp {
            return UsageError::Help;
        }
        // First line only; the usage line is appended by `Display`.
        let rendered = err.to_string();
        let first = rendered.lines().next().unwrap_or_default();
        UsageError::Invalid(first.trim_start_matches("error: ").to_string())
    }
}

impl fmt::Display for UsageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UsageError::Help => f.write_str(&Self::help_text()),
            UsageError::Missing { key, .. } => {
                f.write_str(USAGE)?;
                if *key {
                    write!(f, "\n{KEY_HINT}")?;
                }
                Ok(())
            }
            UsageError::Invalid(msg) => write!(f, "{msg}\n{USAGE}"),
        }
    }
}

impl std::error::Error for UsageError {}

/// clap only knows `--name`; rewrite single-dash words such as `-in` or
/// `-key=abc` to that form. Negative numbers and `--` forms pass through.
fn normalize_flag(arg: String) -> String {
    let mut chars = arg.chars();
    match (chars.next(), chars.next()) {
        (Some('-'), Some(c)) if c.is_ascii_alphabetic() => format!("-{arg}"),
        _ => arg,
    }
}

impl Config {
    /// Build a config from the process arguments and environment.
    pub fn from_env_args() -> Result<Self, UsageError> {
        Self::from_args(std::env::args().skip(1), |name| std::env::var(name).ok())
    }

    /// Parse `args` (without the program name). `env` looks up environment
    /// variables so tests can supply their own.
    pub fn from_args<I, S, F>(args: I, env: F) -> Result<Self, UsageError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        F: Fn(&str) -> Option<String>,
    {
        let argv = std::iter::once("background-erase".to_string())
            .chain(args.into_iter().map(Into::into).map(normalize_flag));
        let cli = Cli::try_parse_from(argv).map_err(UsageError::from_clap)?;

        // Flag first, then environment; empty means missing.
        let key = cli
            .key
            .filter(|k| !k.is_empty())
            .or_else(|| env(API_KEY_ENV))
            .unwrap_or_default();
        let url = cli
            .url
            .filter(|u| !u.is_empty())
            .or_else(|| env(ENDPOINT_ENV).filter(|u| !u.is_empty()))
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());
        let input = cli.input.unwrap_or_default();
        let output = cli.output.unwrap_or_default();

        if key.is_empty() || input.is_empty() || output.is_empty() {
            return Err(UsageError::missing(
                input.is_empty(),
                output.is_empty(),
                key.is_empty(),
            ));
        }

        Ok(Config {
            input: PathBuf::from(input),
            output: PathBuf::from(output),
            api_key: key,
            endpoint: url,
            timeout: Duration::from_secs(cli.timeout),
            verbose: cli.verbose,
        })
    }
}
