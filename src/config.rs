use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::editor::SurfaceKind;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConfigFlags {
    pub preview: bool,
    pub perf: bool,
    pub mode: Option<SurfaceKind>,
    pub store: Option<PathBuf>,
    pub debounce_ms: Option<u64>,
    pub debug_log: Option<PathBuf>,
}

impl ConfigFlags {
    /// Merge `other` over `self`: switches are ORed, valued options from
    /// `other` win.
    pub fn union(&self, other: &Self) -> Self {
        Self {
            preview: self.preview || other.preview,
            perf: self.perf || other.perf,
            mode: other.mode.or(self.mode),
            store: other.store.clone().or_else(|| self.store.clone()),
            debounce_ms: other.debounce_ms.or(self.debounce_ms),
            debug_log: other.debug_log.clone().or_else(|| self.debug_log.clone()),
        }
    }
}

pub fn global_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        if let Some(appdata) = std::env::var_os("APPDATA") {
            return PathBuf::from(appdata).join("jotmark").join("config");
        }
    }

    #[cfg(target_os = "macos")]
    {
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home)
                .join("Library")
                .join("Application Support")
                .join("jotmark")
                .join("config");
        }
    }

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME") {
            return PathBuf::from(xdg).join("jotmark").join("config");
        }
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home).join(".config").join("jotmark").join("config");
        }
    }

    local_override_path()
}

pub fn local_override_path() -> PathBuf {
    PathBuf::from(".jotmarkrc")
}

/// Read a flag file. A missing file yields no flags.
pub fn load_config_flags(path: &Path) -> Result<ConfigFlags> {
    if !path.exists() {
        return Ok(ConfigFlags::default());
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    let tokens = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .flat_map(|line| line.split_whitespace().map(ToOwned::to_owned))
        .collect::<Vec<_>>();
    Ok(parse_flag_tokens(&tokens))
}

pub fn save_config_flags(path: &Path, flags: &ConfigFlags) -> Result<()> {
    let mut lines = vec!["# jotmark defaults (saved with --save)".to_string()];
    if let Some(mode) = flags.mode {
        lines.push(format!("--mode {}", mode_name(mode)));
    }
    if let Some(store) = &flags.store {
        lines.push(format!("--store {}", store.display()));
    }
    if let Some(ms) = flags.debounce_ms {
        lines.push(format!("--debounce-ms {ms}"));
    }
    if flags.preview {
        lines.push("--preview".to_string());
    }
    if flags.perf {
        lines.push("--perf".to_string());
    }
    if let Some(path) = &flags.debug_log {
        lines.push(format!("--debug-log {}", path.display()));
    }
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config dir {}", parent.display()))?;
    }
    fs::write(path, format!("{}\n", lines.join("\n")))
        .with_context(|| format!("Failed to write config {}", path.display()))
}

pub fn clear_config_flags(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_file(path).with_context(|| format!("Failed to remove {}", path.display()))?;
    }
    Ok(())
}

/// Pick the known flags out of `tokens`, ignoring everything else.
/// Both `--flag value` and `--flag=value` forms are accepted.
pub fn parse_flag_tokens(tokens: &[String]) -> ConfigFlags {
    let mut flags = ConfigFlags::default();
    let mut i = 0;
    while i < tokens.len() {
        let token = tokens[i].as_str();
        let (name, inline) = match token.split_once('=') {
            Some((name, value)) => (name, Some(value)),
            None => (token, None),
        };
        match name {
            "--preview" => flags.preview = true,
            "--perf" => flags.perf = true,
            "--mode" | "--store" | "--debounce-ms" | "--debug-log" => {
                let value = match inline {
                    Some(value) => Some(value),
                    None => {
                        let next = tokens.get(i + 1).map(String::as_str);
                        if next.is_some() {
                            i += 1;
                        }
                        next
                    }
                };
                if let Some(value) = value {
                    apply_valued(&mut flags, name, value);
                }
            }
            _ => {}
        }
        i += 1;
    }
    flags
}

fn apply_valued(flags: &mut ConfigFlags, name: &str, value: &str) {
    match name {
        "--mode" => flags.mode = parse_mode(value),
        "--store" => flags.store = Some(PathBuf::from(value)),
        "--debounce-ms" => flags.debounce_ms = value.parse().ok(),
        "--debug-log" => flags.debug_log = Some(PathBuf::from(value)),
        _ => {}
    }
}

fn parse_mode(s: &str) -> Option<SurfaceKind> {
    match s {
        "blocks" => Some(SurfaceKind::Blocks),
        "flat" => Some(SurfaceKind::Flat),
        _ => None,
    }
}

const fn mode_name(mode: SurfaceKind) -> &'static str {
    match mode {
        SurfaceKind::Blocks => "blocks",
        SurfaceKind::Flat => "flat",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn tokens(args: &[&str]) -> Vec<String> {
        args.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_parse_flag_tokens_extracts_known_flags() {
        let flags = parse_flag_tokens(&tokens(&[
            "jotmark",
            "--preview",
            "--mode",
            "flat",
            "--debounce-ms=250",
            "--store",
            "notes.json",
            "--debug-log=debug.log",
            "--unknown",
        ]));
        assert!(flags.preview);
        assert!(!flags.perf);
        assert_eq!(flags.mode, Some(SurfaceKind::Flat));
        assert_eq!(flags.debounce_ms, Some(250));
        assert_eq!(flags.store, Some(PathBuf::from("notes.json")));
        assert_eq!(flags.debug_log, Some(PathBuf::from("debug.log")));
    }

    #[test]
    fn test_invalid_values_are_dropped() {
        let flags = parse_flag_tokens(&tokens(&["--mode", "fancy", "--debounce-ms", "soon"]));
        assert_eq!(flags.mode, None);
        assert_eq!(flags.debounce_ms, None);
    }

    #[test]
    fn test_trailing_valued_flag_without_value() {
        let flags = parse_flag_tokens(&tokens(&["--perf", "--store"]));
        assert!(flags.perf);
        assert_eq!(flags.store, None);
    }

    #[test]
    fn test_config_union_merges_cli_over_file_for_options() {
        let file = ConfigFlags {
            preview: true,
            mode: Some(SurfaceKind::Flat),
            debounce_ms: Some(500),
            ..ConfigFlags::default()
        };
        let cli = ConfigFlags {
            perf: true,
            mode: Some(SurfaceKind::Blocks),
            ..ConfigFlags::default()
        };
        let merged = file.union(&cli);
        assert!(merged.preview);
        assert!(merged.perf);
        assert_eq!(merged.mode, Some(SurfaceKind::Blocks));
        assert_eq!(merged.debounce_ms, Some(500));
    }

    #[test]
    fn test_save_load_and_clear_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join(".jotmarkrc");
        let flags = ConfigFlags {
            preview: true,
            perf: true,
            mode: Some(SurfaceKind::Flat),
            store: Some(PathBuf::from("notes.json")),
            debounce_ms: Some(750),
            debug_log: Some(PathBuf::from("debug.log")),
        };

        save_config_flags(&path, &flags).unwrap();
        assert_eq!(load_config_flags(&path).unwrap(), flags);

        clear_config_flags(&path).unwrap();
        assert!(!path.exists());
        assert_eq!(load_config_flags(&path).unwrap(), ConfigFlags::default());
    }
}
