use crate::error::Result;
use crate::facts::Snapshot;
use crate::formatter::{ensure_representable, Formatter};

/// YAML document prefixed with an explicit `---` marker.
#[derive(Debug, Default, Clone, Copy)]
pub struct YamlFormatter;

impl Formatter for YamlFormatter {
    fn render(&self, snapshot: &Snapshot) -> Result<String> {
        ensure_representable(snapshot)?;
        let body = serde_yaml::to_string(snapshot)?;
        Ok(format!("---\n{}", body))
    }
}
