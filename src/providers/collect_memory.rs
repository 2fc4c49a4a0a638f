use sysinfo::{MemoryRefreshKind, RefreshKind, System};

use crate::cli::Config;
use crate::error::{FacterError, Result};
use crate::facts::Facter;

const UNITS: [&str; 6] = ["bytes", "KiB", "MiB", "GiB", "TiB", "PiB"];

pub fn collect_memory_facts(facter: &mut Facter, _config: &Config) -> Result<()> {
    let sys = System::new_with_specifics(
        RefreshKind::new().with_memory(MemoryRefreshKind::everything()),
    );

    let total = sys.total_memory();
    if total == 0 {
        return Err(FacterError::Provider("total memory reported as zero".to_string()));
    }

    add_size_facts(facter, "memorysize", total);
    add_size_facts(facter, "memoryfree", sys.available_memory());
    add_size_facts(facter, "swapsize", sys.total_swap());
    add_size_facts(facter, "swapfree", sys.free_swap());

    Ok(())
}

fn add_size_facts(facter: &mut Facter, name: &str, bytes: u64) {
    facter.add(name, bytes_to_human(bytes));
    facter.add(format!("{}_mb", name), bytes_to_mb(bytes));
}

/// `16_700_000_000` -> `15.55 GiB`
fn bytes_to_human(bytes: u64) -> String {
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} {}", bytes, UNITS[0])
    } else {
        format!("{:.2} {}", value, UNITS[unit])
    }
}

fn bytes_to_mb(bytes: u64) -> f64 {
    let mb = bytes as f64 / 1024.0 / 1024.0;
    (mb * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facts::FactValue;
    use crate::formatter::OutputFormat;

    #[test]
    fn test_bytes_to_human() {
        assert_eq!(bytes_to_human(512), "512 bytes");
        assert_eq!(bytes_to_human(2048), "2.00 KiB");
        assert_eq!(bytes_to_human(16_700_000_000), "15.55 GiB");
        assert_eq!(bytes_to_human(0), "0 bytes");
    }

    #[test]
    fn test_bytes_to_mb_rounds() {
        assert_eq!(bytes_to_mb(1024 * 1024), 1.0);
        assert_eq!(bytes_to_mb(1_500_000), 1.43);
    }

    #[test]
    fn test_size_facts_pair() {
        let mut facter = Facter::with_formatter(OutputFormat::Plain.formatter());
        add_size_facts(&mut facter, "swapsize", 2 * 1024 * 1024 * 1024);
        assert_eq!(facter.get("swapsize"), Some(&FactValue::from("2.00 GiB")));
        assert_eq!(facter.get("swapsize_mb"), Some(&FactValue::Float(2048.0)));
    }
}
