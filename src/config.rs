// system configuration and command line processing

use argh::FromArgs;
use tracing::level_filters::LevelFilter;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(FromArgs, Debug, Default)]
/// pupforth: a small Forth with arbitrary-precision integers.
pub struct Config {
    /// source files to load, in order, before the prompt.
    #[argh(positional)]
    pub files: Vec<String>,

    /// skip loading the core library.
    #[argh(switch, short = 'n')]
    pub no_core: bool,

    /// no greeting or goodbye.
    #[argh(switch, short = 'q')]
    pub quiet: bool,

    /// log level for diagnostics on stderr: off, error, warn, info, debug or trace.
    #[argh(option, short = 'l', default = "String::from(\"warn\")")]
    pub log_level: String,
}

impl Config {
    pub fn from_env() -> Self {
        argh::from_env()
    }

    /// The log level as a filter. Anything unrecognised turns logging off.
    pub fn level_filter(&self) -> LevelFilter {
        self.log_level.parse().unwrap_or(LevelFilter::OFF)
    }
}
