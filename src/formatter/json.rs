use crate::error::Result;
use crate::facts::Snapshot;
use crate::formatter::{ensure_representable, Formatter};

/// A single compact JSON object followed by a newline.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonFormatter;

impl Formatter for JsonFormatter {
    fn render(&self, snapshot: &Snapshot) -> Result<String> {
        ensure_representable(snapshot)?;
        let mut out = serde_json::to_string(snapshot)?;
        out.push('\n');
        Ok(out)
    }
}
