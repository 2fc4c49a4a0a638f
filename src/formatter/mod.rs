// Output formats for the collected facts
pub mod json;
pub mod keyvalue;
pub mod plain;
pub mod yaml;

pub use json::JsonFormatter;
pub use keyvalue::KeyValueFormatter;
pub use plain::PlainFormatter;
pub use yaml::YamlFormatter;

use crate::error::{FacterError, Result};
use crate::facts::{FactValue, Snapshot};

/// Renders a snapshot into its textual representation.
pub trait Formatter {
    fn render(&self, snapshot: &Snapshot) -> Result<String>;
}

/// Structured formats have no lossless encoding for NaN or infinities.
fn ensure_representable(snapshot: &Snapshot) -> Result<()> {
    for (key, value) in snapshot.iter() {
        if let FactValue::Float(x) = value {
            if !x.is_finite() {
                return Err(FacterError::Serialization(format!(
                    "fact `{}` has non-finite value {}",
                    key, x
                )));
            }
        }
    }
    Ok(())
}

/// Output format selected once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Plain,
    KeyValue,
    Json,
    Yaml,
}

impl OutputFormat {
    pub fn formatter(self) -> Box<dyn Formatter> {
        match self {
            OutputFormat::Plain => Box::new(PlainFormatter),
            OutputFormat::KeyValue => Box::new(KeyValueFormatter),
            OutputFormat::Json => Box::new(JsonFormatter),
            OutputFormat::Yaml => Box::new(YamlFormatter),
        }
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::facts::{FactValue, Snapshot};

    pub fn sample_snapshot() -> Snapshot {
        vec![
            ("hostname".to_string(), FactValue::from("x")),
            ("uptime_seconds".to_string(), FactValue::from(120u64)),
            ("is_virtual".to_string(), FactValue::from(false)),
        ]
        .into_iter()
        .collect()
    }
}
