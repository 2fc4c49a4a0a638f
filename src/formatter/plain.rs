use std::fmt::Write;

use crate::error::Result;
use crate::facts::Snapshot;
use crate::formatter::Formatter;

/// `key => value` per line.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainFormatter;

impl Formatter for PlainFormatter {
    fn render(&self, snapshot: &Snapshot) -> Result<String> {
        let mut out = String::new();
        for (key, value) in snapshot.iter() {
            // Writing into a String cannot fail
            let _ = writeln!(out, "{} => {}", key, value);
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formatter::fixtures::sample_snapshot;

    #[test]
    fn test_plain_lines() {
        let out = PlainFormatter.render(&sample_snapshot()).unwrap();
        assert_eq!(out, "hostname => x\nuptime_seconds => 120\nis_virtual => false\n");
    }

    #[test]
    fn test_empty_snapshot_renders_nothing() {
        let out = PlainFormatter.render(&Snapshot::default()).unwrap();
        assert!(out.is_empty());
    }
}
