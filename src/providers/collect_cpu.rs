use std::collections::HashSet;
use std::fs;

use sysinfo::{CpuRefreshKind, RefreshKind, System};
use tracing::debug;

use crate::cli::Config;
use crate::error::{FacterError, Result};
use crate::facts::Facter;

pub fn collect_cpu_facts(facter: &mut Facter, _config: &Config) -> Result<()> {
    let sys = System::new_with_specifics(
        RefreshKind::new().with_cpu(CpuRefreshKind::everything()),
    );

    let cpus = sys.cpus();
    if cpus.is_empty() {
        return Err(FacterError::Provider("no CPUs reported by the OS".to_string()));
    }

    facter.add("processorcount", cpus.len());

    match fs::read_to_string("/proc/cpuinfo") {
        Ok(cpuinfo) => {
            let sockets = count_physical_ids(&cpuinfo);
            if sockets > 0 {
                facter.add("physicalprocessorcount", sockets);
            }
        }
        Err(e) => debug!(error = %e, "Skipping physicalprocessorcount"),
    }

    for (index, cpu) in cpus.iter().enumerate() {
        let brand = cpu.brand().trim();
        if !brand.is_empty() {
            facter.add(format!("processor{}", index), brand);
        }
    }

    if let Some(cores) = sys.physical_core_count() {
        facter.add("cpu_cores", cores);
    }

    let first = &cpus[0];
    if !first.vendor_id().is_empty() {
        facter.add("cpu_vendor", first.vendor_id());
    }
    if first.frequency() > 0 {
        facter.add("cpu_frequency_mhz", first.frequency());
    }

    Ok(())
}

/// Number of distinct sockets listed in /proc/cpuinfo.
fn count_physical_ids(cpuinfo: &str) -> usize {
    cpuinfo
        .lines()
        .filter_map(|line| {
            let (key, value) = line.split_once(':')?;
            (key.trim() == "physical id").then(|| value.trim())
        })
        .collect::<HashSet<_>>()
        .len()
}
