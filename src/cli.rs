use std::time::Duration;

use clap::{ArgAction, Parser};

use crate::formatter::OutputFormat;

/// Long flags that may also be written with a single dash (`-json`).
const LONG_FLAGS: &[&str] = &[
    "plaintext",
    "keyvalue",
    "json",
    "yaml",
    "listeners",
    "timeout",
    "verbose",
    "help",
    "version",
];

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(name = "facter")]
#[command(about = "Collect facts about the local machine")]
pub struct Cli {
    /// Emit facts as key => value pairs
    #[arg(long)]
    pub plaintext: bool,

    /// Emit facts as key:value pairs
    #[arg(long)]
    pub keyvalue: bool,

    /// Emit facts as a JSON object
    #[arg(long)]
    pub json: bool,

    /// Emit facts as a YAML document
    #[arg(long)]
    pub yaml: bool,

    /// Additionally report listening TCP and UDP ports
    #[arg(long)]
    pub listeners: bool,

    /// Timeout in seconds for each external command
    #[arg(long, default_value_t = 5, value_name = "SECONDS")]
    pub timeout: u64,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Parse process arguments, accepting single-dash long flags.
    pub fn parse_args() -> Self {
        Cli::parse_from(normalize_args(std::env::args()))
    }

    /// First selected format wins, in declaration order.
    pub fn output_format(&self) -> OutputFormat {
        if self.plaintext {
            OutputFormat::Plain
        } else if self.keyvalue {
            OutputFormat::KeyValue
        } else if self.json {
            OutputFormat::Json
        } else if self.yaml {
            OutputFormat::Yaml
        } else {
            OutputFormat::Plain
        }
    }

    pub fn config(&self) -> Config {
        Config {
            format: self.output_format(),
            listeners: self.listeners,
            command_timeout: Duration::from_secs(self.timeout.max(1)),
            verbosity: self.verbose,
        }
    }
}

/// Run configuration, built once at startup and passed by reference.
#[derive(Debug, Clone)]
pub struct Config {
    pub format: OutputFormat,
    pub listeners: bool,
    pub command_timeout: Duration,
    pub verbosity: u8,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            format: OutputFormat::Plain,
            listeners: false,
            command_timeout: Duration::from_secs(5),
            verbosity: 0,
        }
    }
}

/// Rewrite `-json` / `-timeout=3` into their `--` forms. Everything after a
/// bare `--` is left alone.
pub fn normalize_args<I, S>(args: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut passthrough = false;
    args.into_iter()
        .map(Into::into)
        .enumerate()
        .map(|(idx, arg)| {
            if idx == 0 || passthrough {
                return arg;
            }
            if arg == "--" {
                passthrough = true;
                return arg;
            }
            match arg.strip_prefix('-') {
                Some(rest) if !rest.starts_with('-') => {
                    let name = rest.split('=').next().unwrap_or(rest);
                    if LONG_FLAGS.contains(&name) {
                        format!("-{}", arg)
                    } else {
                        arg
                    }
                }
                _ => arg,
            }
        })
        .collect()
}
