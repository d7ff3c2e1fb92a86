use std::collections::BTreeMap;
use std::path::Path;

/// Name of the secrets file read next to `Droidplan.toml`.
pub const ENV_FILE: &str = ".droidplan.env";

/// Loads a `.droidplan.env` file (shell-style `KEY=value` lines).
///
/// Signing identities and repository credentials usually live here and are
/// pulled into the descriptor through `${env:VAR}` references.
pub fn load_env_file(path: &Path) -> std::io::Result<BTreeMap<String, String>> {
    let mut map = BTreeMap::new();
    if !path.is_file() {
        return Ok(map);
    }
    let content = std::fs::read_to_string(path)?;
    for line in content.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let trimmed = trimmed.strip_prefix("export ").unwrap_or(trimmed);
        if let Some((key, value)) = trimmed.split_once('=') {
            let value = value.trim().trim_matches('"');
            map.insert(key.trim().to_string(), value.to_string());
        }
    }
    Ok(map)
}

/// Replace `${env:VAR}` references, preferring `overrides` over the process
/// environment. Unknown variables expand to an empty string.
pub fn interpolate(input: &str, overrides: &BTreeMap<String, String>) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(start) = rest.find("${env:") {
        let Some(len) = rest[start..].find('}') else {
            break;
        };
        out.push_str(&rest[..start]);
        let key = &rest[start + 6..start + len];
        let value = overrides
            .get(key)
            .cloned()
            .or_else(|| std::env::var(key).ok())
            .unwrap_or_default();
        out.push_str(&value);
        rest = &rest[start + len + 1..];
    }
    out.push_str(rest);
    out
}
