use std::fmt::Write;

use crate::error::Result;
use crate::facts::Snapshot;
use crate::formatter::Formatter;

/// `key:value` per line.
#[derive(Debug, Default, Clone, Copy)]
pub struct KeyValueFormatter;

impl Formatter for KeyValueFormatter {
    fn render(&self, snapshot: &Snapshot) -> Result<String> {
        let mut out = String::new();
        for (key, value) in snapshot.iter() {
            let _ = writeln!(out, "{}:{}", key, value);
        }
        Ok(out)
    }
}
