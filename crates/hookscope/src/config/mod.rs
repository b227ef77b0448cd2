use std::collections::BTreeMap;
use std::fs;
use std::path::{Component, Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::Deserialize;

use crate::decode::{DecodePolicy, Registries};
use crate::models::nlp::{EntityKindTag, EntityRequirements};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimePaths {
    pub home_dir: PathBuf,
    pub cwd: PathBuf,
    pub config_path: PathBuf,
    /// Whether `config_path` came from `--config` rather than the default location.
    pub config_explicit: bool,
}

pub fn resolve_runtime_paths(
    home_dir: &Path,
    cwd: &Path,
    config_override: Option<&Path>,
) -> Result<RuntimePaths> {
    if !home_dir.is_absolute() {
        bail!("home_dir must be absolute: {}", home_dir.display());
    }
    if !cwd.is_absolute() {
        bail!("cwd must be absolute: {}", cwd.display());
    }

    let home_dir = normalize_lexical(home_dir);
    let cwd = normalize_lexical(cwd);
    let config_path = match config_override {
        Some(path) => resolve_user_path(path, &home_dir, &cwd)?,
        None => home_dir.join(".hookscope").join("config.json"),
    };

    Ok(RuntimePaths {
        home_dir,
        cwd,
        config_path: normalize_lexical(&config_path),
        config_explicit: config_override.is_some(),
    })
}

/// Expands `~` against `home_dir` and anchors relative paths at `cwd`.
pub fn resolve_user_path(path: &Path, home_dir: &Path, cwd: &Path) -> Result<PathBuf> {
    let expanded = expand_tilde(path, home_dir)?;
    let resolved = if expanded.is_absolute() {
        expanded
    } else {
        cwd.join(expanded)
    };

    Ok(normalize_lexical(&resolved))
}

fn expand_tilde(path: &Path, home_dir: &Path) -> Result<PathBuf> {
    let mut components = path.components();
    match components.next() {
        Some(Component::Normal(first)) if first == "~" => {
            let mut expanded = home_dir.to_path_buf();
            for component in components {
                expanded.push(component.as_os_str());
            }
            Ok(expanded)
        }
        Some(Component::Normal(first))
            if first
                .to_str()
                .is_some_and(|segment| segment.starts_with('~')) =>
        {
            bail!(
                "unsupported home expansion syntax (only `~` and `~/...` are supported): {}",
                path.display()
            )
        }
        _ => Ok(path.to_path_buf()),
    }
}

fn normalize_lexical(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !normalized.pop() {
                    normalized.push(component.as_os_str());
                }
            }
            _ => normalized.push(component.as_os_str()),
        }
    }

    normalized
}

/// Contents of the optional JSON config file.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HookscopeConfig {
    #[serde(default)]
    pub fail_fast: Option<bool>,
    #[serde(default)]
    pub redact: Option<bool>,
    /// Entity kind name to the fields a reinterpretation requires.
    #[serde(default)]
    pub entity_requirements: BTreeMap<String, Vec<String>>,
}

/// Reads the config file. A missing default file yields the defaults; a missing
/// file named with `--config` is an error.
pub fn load_config(paths: &RuntimePaths) -> Result<HookscopeConfig> {
    if !paths.config_path.exists() {
        if paths.config_explicit {
            bail!("config file not found: {}", paths.config_path.display());
        }
        return Ok(HookscopeConfig::default());
    }

    let raw = fs::read_to_string(&paths.config_path)
        .with_context(|| format!("failed to read config {}", paths.config_path.display()))?;
    parse_config(&raw)
        .with_context(|| format!("invalid config {}", paths.config_path.display()))
}

pub fn parse_config(raw: &str) -> Result<HookscopeConfig> {
    let mut deserializer = serde_json::Deserializer::from_str(raw);
    serde_path_to_error::deserialize(&mut deserializer).map_err(|error| {
        anyhow::anyhow!("field `{}`: {}", error.path(), error.inner())
    })
}

/// Command-line switches that take precedence over the config file when set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecodeOverrides {
    pub fail_fast: bool,
    pub redact: bool,
}

/// Effective settings for one decode run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeSettings {
    pub policy: DecodePolicy,
    pub redact: bool,
    pub entity_requirements: EntityRequirements,
}

impl DecodeSettings {
    /// Merges config and switches. Without either, decoding is best-effort and
    /// excerpts are left unredacted.
    pub fn resolve(config: &HookscopeConfig, overrides: DecodeOverrides) -> Result<Self> {
        let fail_fast = overrides.fail_fast || config.fail_fast.unwrap_or(false);
        let redact = overrides.redact || config.redact.unwrap_or(false);

        let mut entity_requirements = EntityRequirements::standard().clone();
        for (kind, fields) in &config.entity_requirements {
            let Some(tag) = EntityKindTag::from_key(kind) else {
                bail!("unknown entity kind in entity_requirements: {kind}");
            };
            entity_requirements.set(tag, fields.iter().cloned());
        }

        Ok(Self {
            policy: DecodePolicy::from_fail_fast(fail_fast),
            redact,
            entity_requirements,
        })
    }

    /// The standard tables with this run's entity requirements.
    #[must_use]
    pub fn registries(&self) -> Registries {
        Registries::builder()
            .entity_requirements(self.entity_requirements.clone())
            .build()
    }
}
