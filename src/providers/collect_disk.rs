use std::collections::BTreeSet;
use std::path::Path;

use sysinfo::Disks;

use crate::cli::Config;
use crate::error::{FacterError, Result};
use crate::facts::Facter;
use crate::providers::sysfs::{key_suffix, list_dir_names, read_to_string_trim, read_to_u64};

const SYS_BLOCK: &str = "/sys/block";

#[derive(Debug, Clone, PartialEq)]
struct BlockDevice {
    name: String,
    size_bytes: Option<u64>,
    model: Option<String>,
    vendor: Option<String>,
}

pub fn collect_disk_facts(facter: &mut Facter, _config: &Config) -> Result<()> {
    let devices = scan_block_devices(Path::new(SYS_BLOCK))?;
    add_block_device_facts(facter, &devices);

    let disks = Disks::new_with_refreshed_list();
    let filesystems: BTreeSet<String> = disks
        .list()
        .iter()
        .map(|disk| disk.file_system().to_string_lossy().into_owned())
        .filter(|fs| !fs.is_empty())
        .collect();
    if !filesystems.is_empty() {
        facter.add("filesystems", join(filesystems));
    }

    Ok(())
}

fn is_virtual_block_device(name: &str) -> bool {
    name.starts_with("loop")
        || name.starts_with("ram")
        || name.starts_with("dm-")
        || name.starts_with("zram")
}

fn scan_block_devices(sys_block: &Path) -> Result<Vec<BlockDevice>> {
    let names = list_dir_names(sys_block).map_err(|e| {
        FacterError::Provider(format!("cannot read {}: {}", sys_block.display(), e))
    })?;

    let devices = names
        .into_iter()
        .filter(|name| !is_virtual_block_device(name))
        .map(|name| {
            let sys_path = sys_block.join(&name);
            let device_path = sys_path.join("device");
            BlockDevice {
                // Sizes are always reported in 512-byte sectors
                size_bytes: read_to_u64(sys_path.join("size")).map(|s| s.saturating_mul(512)),
                model: read_to_string_trim(device_path.join("model")),
                vendor: read_to_string_trim(device_path.join("vendor")),
                name,
            }
        })
        .collect();

    Ok(devices)
}

fn add_block_device_facts(facter: &mut Facter, devices: &[BlockDevice]) {
    facter.add(
        "blockdevices",
        join(devices.iter().map(|d| d.name.clone())),
    );

    for device in devices {
        let suffix = key_suffix(&device.name);
        if let Some(size) = device.size_bytes {
            facter.add(format!("blockdevice_{}_size", suffix), size);
        }
        if let Some(model) = &device.model {
            facter.add(format!("blockdevice_{}_model", suffix), model);
        }
        if let Some(vendor) = &device.vendor {
            facter.add(format!("blockdevice_{}_vendor", suffix), vendor);
        }
    }
}

fn join<I: IntoIterator<Item = String>>(items: I) -> String {
    items.into_iter().collect::<Vec<_>>().join(",")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facts::FactValue;
    use crate::formatter::OutputFormat;
    use std::fs;

    fn fake_device(root: &Path, name: &str, sectors: &str, model: Option<&str>) {
        let device = root.join(name).join("device");
        fs::create_dir_all(&device).unwrap();
        fs::write(root.join(name).join("size"), sectors).unwrap();
        if let Some(model) = model {
            fs::write(device.join("model"), model).unwrap();
        }
    }

    #[test]
    fn test_scan_skips_virtual_devices() {
        let dir = tempfile::tempdir().unwrap();
        fake_device(dir.path(), "sda", "1000\n", Some("INTEL SSDSC2KB48\n"));
        fake_device(dir.path(), "loop0", "8\n", None);
        fake_device(dir.path(), "dm-0", "8\n", None);
        fake_device(dir.path(), "nvme0n1", "2048\n", None);

        let devices = scan_block_devices(dir.path()).unwrap();
        let names: Vec<&str> = devices.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["nvme0n1", "sda"]);
        assert_eq!(devices[1].size_bytes, Some(512_000));
        assert_eq!(devices[1].model.as_deref(), Some("INTEL SSDSC2KB48"));
        assert_eq!(devices[0].model, None);
    }

    #[test]
    fn test_corrupt_size_saturates() {
        let dir = tempfile::tempdir().unwrap();
        fake_device(dir.path(), "sda", &format!("{}\n", u64::MAX), None);

        let devices = scan_block_devices(dir.path()).unwrap();
        assert_eq!(devices[0].size_bytes, Some(u64::MAX));
    }

    #[test]
    fn test_missing_sys_block_is_provider_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = scan_block_devices(&dir.path().join("nope")).unwrap_err();
        assert!(matches!(err, FacterError::Provider(_)));
    }

    #[test]
    fn test_block_device_facts() {
        let devices = vec![
            BlockDevice {
                name: "sda".into(),
                size_bytes: Some(512_000),
                model: Some("Disk".into()),
                vendor: Some("ATA".into()),
            },
            BlockDevice {
                name: "sr0".into(),
                size_bytes: None,
                model: None,
                vendor: None,
            },
        ];
        let mut facter = Facter::with_formatter(OutputFormat::Plain.formatter());
        add_block_device_facts(&mut facter, &devices);

        assert_eq!(facter.get("blockdevices"), Some(&FactValue::from("sda,sr0")));
        assert_eq!(facter.get("blockdevice_sda_size"), Some(&FactValue::Integer(512_000)));
        assert_eq!(facter.get("blockdevice_sda_vendor"), Some(&FactValue::from("ATA")));
        assert!(facter.get("blockdevice_sr0_size").is_none());
    }
}
