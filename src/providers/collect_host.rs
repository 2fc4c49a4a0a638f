use std::fs;
use std::path::Path;
use std::time::Duration;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use smbioslib::*;
use sysinfo::{System, Users};
use tracing::debug;

use crate::cli::Config;
use crate::error::{FacterError, Result};
use crate::facts::Facter;
use crate::providers::command::run_command;
use crate::providers::sysfs::{meaningful, read_to_string_trim};

const DMI_TABLE: &str = "/sys/firmware/dmi/tables/DMI";
const DMI_ID_DIR: &str = "/sys/class/dmi/id";

/// Host identity, operating system, uptime, user and firmware facts.
pub fn collect_host_facts(facter: &mut Facter, config: &Config) -> Result<()> {
    let timeout = config.command_timeout;

    if let Some(fqdn) = get_fqdn(timeout) {
        let (hostname, domain) = split_fqdn(&fqdn);
        facter.add("fqdn", fqdn.as_str());
        if let Some(domain) = domain {
            facter.add("domain", domain);
        }
        facter.add("hostname", hostname);
    }

    let (is_virtual, virtual_kind) = detect_virtualization(timeout);
    facter.add("is_virtual", is_virtual);
    facter.add("virtual", virtual_kind);

    let kernel = capitalize(std::env::consts::OS);
    facter.add("kernel", kernel.as_str());
    if let Some(release) = System::kernel_version() {
        let (version, major) = kernel_versions(&release);
        facter.add("kernelversion", version);
        facter.add("kernelmajversion", major);
        facter.add("kernelrelease", release);
    }

    let distribution = System::distribution_id();
    facter.add("operatingsystem", capitalize(&distribution));
    if let Some(release) = System::os_version() {
        facter.add("operatingsystemrelease", release);
    }
    match os_family(&distribution) {
        Some(family) => facter.add("osfamily", family),
        None => facter.add("osfamily", kernel),
    }

    let machine = std::env::consts::ARCH;
    facter.add("hardwaremodel", machine);
    facter.add("architecture", guess_arch(machine));

    let uptime = System::uptime();
    facter.add("uptime_seconds", uptime);
    facter.add("uptime_minutes", uptime / 60);
    facter.add("uptime_hours", uptime / 60 / 60);
    facter.add("uptime_days", uptime / 60 / 60 / 24);
    facter.add("uptime", format!("{} days", uptime / 60 / 60 / 24));

    if let Ok(path) = std::env::var("PATH") {
        if !path.is_empty() {
            facter.add("path", path);
        }
    }

    facter.add("id", current_user()?);
    match local_timezone_name().and_then(|name| zone_abbreviation(&name, Utc::now())) {
        Some(zone) => facter.add("timezone", zone),
        None => debug!("Skipping timezone, local zone name unknown"),
    }

    match run_command("hostid", &[], timeout) {
        Ok(hostid) => facter.add("uniqueid", hostid.trim_end()),
        Err(e) => debug!(error = %e, "Skipping uniqueid"),
    }

    collect_dmi_facts(facter);
    Ok(())
}

/// Uppercase the first character.
fn capitalize(label: &str) -> String {
    let mut chars = label.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// `web01.example.com` -> (`web01`, Some(`example.com`))
fn split_fqdn(fqdn: &str) -> (&str, Option<&str>) {
    match fqdn.split_once('.') {
        Some((host, domain)) if !domain.is_empty() => (host, Some(domain)),
        Some((host, _)) => (host, None),
        None => (fqdn, None),
    }
}

fn get_fqdn(timeout: Duration) -> Option<String> {
    let from_command = run_command("hostname", &["-f"], timeout)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty() && s != "localhost");

    from_command
        .or_else(System::host_name)
        .or_else(|| read_to_string_trim("/proc/sys/kernel/hostname"))
}

/// (is_virtual, virtual) with `physical` when nothing is detected.
fn detect_virtualization(timeout: Duration) -> (bool, String) {
    // systemd-detect-virt exits non-zero when it prints "none"
    if let Ok(out) = run_command("systemd-detect-virt", &[], timeout) {
        return parse_detect_virt(&out);
    }

    if Path::new("/.dockerenv").exists() {
        return (true, "docker".to_string());
    }

    if let Ok(cpuinfo) = fs::read_to_string("/proc/cpuinfo") {
        if cpuinfo_has_hypervisor(&cpuinfo) {
            return (true, "virtual".to_string());
        }
    }

    (false, "physical".to_string())
}

fn parse_detect_virt(output: &str) -> (bool, String) {
    match output.trim() {
        "" | "none" => (false, "physical".to_string()),
        kind => (true, kind.to_string()),
    }
}

fn cpuinfo_has_hypervisor(cpuinfo: &str) -> bool {
    cpuinfo
        .lines()
        .filter(|line| line.starts_with("flags"))
        .any(|line| line.split_whitespace().any(|flag| flag == "hypervisor"))
}

/// `5.15.0-91-generic` -> (`5.15.0`, `5.15`)
fn kernel_versions(release: &str) -> (String, String) {
    let version = release.split('-').next().unwrap_or(release).to_string();
    let major = version.split('.').take(2).collect::<Vec<_>>().join(".");
    (version, major)
}

fn os_family(distribution: &str) -> Option<&'static str> {
    let family = match distribution.to_lowercase().as_str() {
        "debian" | "ubuntu" | "linuxmint" | "raspbian" | "pop" | "kali" => "Debian",
        "rhel" | "centos" | "fedora" | "rocky" | "almalinux" | "amzn" | "ol" | "scientific" => {
            "RedHat"
        }
        "sles" | "opensuse" | "opensuse-leap" | "opensuse-tumbleweed" | "suse" => "Suse",
        "arch" | "manjaro" | "endeavouros" => "Archlinux",
        "gentoo" => "Gentoo",
        "alpine" => "Alpine",
        _ => return None,
    };
    Some(family)
}

fn guess_arch(machine: &str) -> &str {
    match machine {
        "x86_64" => "amd64",
        "aarch64" => "arm64",
        "x86" => "i386",
        other => other,
    }
}

/// IANA name of the local zone. `TZ` wins over the system setting.
fn local_timezone_name() -> Option<String> {
    std::env::var("TZ")
        .ok()
        .map(|tz| tz.trim_start_matches(':').to_string())
        .filter(|tz| tz.parse::<Tz>().is_ok())
        .or_else(|| iana_time_zone::get_timezone().ok())
}

/// Zone abbreviation in effect at `at`, e.g. `CEST` for `Europe/Berlin` in July.
fn zone_abbreviation(name: &str, at: DateTime<Utc>) -> Option<String> {
    let tz: Tz = name.parse().ok()?;
    Some(at.with_timezone(&tz).format("%Z").to_string())
}

/// Resolve the invoking user. Failure here aborts the whole run.
fn current_user() -> Result<String> {
    let uid = procfs::process::Process::myself()
        .and_then(|me| me.uid())
        .map_err(|e| FacterError::FatalEnvironment(format!("cannot determine current uid: {}", e)))?;

    let users = Users::new_with_refreshed_list();
    if let Some(user) = users.iter().find(|u| **u.id() == uid) {
        return Ok(user.name().to_string());
    }

    std::env::var("USER")
        .ok()
        .filter(|name| !name.is_empty())
        .ok_or_else(|| FacterError::FatalEnvironment(format!("no user entry for uid {}", uid)))
}

fn collect_dmi_facts(facter: &mut Facter) {
    let smbios_data = match SMBiosData::try_load_from_file(DMI_TABLE, None) {
        Ok(data) => data,
        Err(_) => match fs::read(DMI_TABLE) {
            Ok(table_data) => SMBiosData::from_vec_and_version(table_data, None),
            Err(e) => {
                debug!(error = %e, "SMBIOS table unreadable, using {}", DMI_ID_DIR);
                collect_dmi_id_facts(facter, Path::new(DMI_ID_DIR));
                return;
            }
        },
    };

    for structure in smbios_data.iter() {
        match structure.defined_struct() {
            DefinedStruct::SystemInformation(system) => {
                add_meaningful(facter, "manufacturer", system.manufacturer().to_utf8_lossy());
                add_meaningful(facter, "productname", system.product_name().to_utf8_lossy());
                add_meaningful(facter, "serialnumber", system.serial_number().to_utf8_lossy());
            }
            DefinedStruct::Information(bios) => {
                add_meaningful(facter, "bios_vendor", bios.vendor().to_utf8_lossy());
                add_meaningful(facter, "bios_version", bios.version().to_utf8_lossy());
                add_meaningful(facter, "bios_release_date", bios.release_date().to_utf8_lossy());
            }
            _ => continue,
        }
    }
}

fn add_meaningful(facter: &mut Facter, key: &str, value: Option<String>) {
    if let Some(value) = value.as_deref().and_then(meaningful) {
        facter.add(key, value);
    }
}

/// World-readable subset of DMI exposed by the kernel.
fn collect_dmi_id_facts(facter: &mut Facter, dir: &Path) {
    let files = [
        ("manufacturer", "sys_vendor"),
        ("productname", "product_name"),
        ("serialnumber", "product_serial"),
        ("bios_vendor", "bios_vendor"),
        ("bios_version", "bios_version"),
        ("bios_release_date", "bios_date"),
    ];
    for (key, file) in files {
        add_meaningful(facter, key, read_to_string_trim(dir.join(file)));
    }
}
