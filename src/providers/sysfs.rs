use std::fs;
use std::path::Path;

pub fn read_to_string_trim<P: AsRef<Path>>(path: P) -> Option<String> {
    fs::read_to_string(path)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

pub fn read_to_u64<P: AsRef<Path>>(path: P) -> Option<u64> {
    let s = read_to_string_trim(path)?;
    s.parse::<u64>().ok()
}

/// List the entry names of a directory, sorted. Non UTF-8 names are skipped.
pub fn list_dir_names<P: AsRef<Path>>(path: P) -> std::io::Result<Vec<String>> {
    let mut names: Vec<String> = fs::read_dir(path)?
        .flatten()
        .filter_map(|entry| entry.file_name().into_string().ok())
        .collect();
    names.sort();
    Ok(names)
}

/// Drop firmware placeholder strings such as "Not Specified".
pub fn meaningful(value: &str) -> Option<String> {
    let value = value.trim();
    match value {
        "" | "Not Specified" | "Not Available" | "To Be Filled By O.E.M." | "Default string"
        | "None" => None,
        _ => Some(value.to_string()),
    }
}

/// Turn an arbitrary device name into something usable inside a fact key.
pub fn key_suffix(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}
