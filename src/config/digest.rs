// src/config/digest.rs
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path, path::PathBuf};

// --- env defaults & names ---
pub const DEFAULT_PERIMETER_CONFIG_PATH: &str = "config/perimeter.toml";
pub const ENV_PERIMETER_CONFIG_PATH: &str = "PERIMETER_CONFIG_PATH";
pub const ENV_MAX_AGE_HOURS: &str = "DIGEST_MAX_AGE_HOURS";

/// Built-in perimeter, identical to the shipped `config/perimeter.toml`.
const SEED_TOML: &str = include_str!("../../config/perimeter.toml");

fn default_max_age_hours() -> i64 {
    48
}
fn default_label() -> String {
    "News Aumagne & alentours".to_string()
}
fn default_primary_cap() -> usize {
    5
}
fn default_other_cap() -> usize {
    8
}

/// Root of `perimeter.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DigestConfig {
    pub perimeter: PerimeterCfg,
    #[serde(default)]
    pub recency: RecencyCfg,
    #[serde(default)]
    pub digest: DigestCfg,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerimeterCfg {
    /// Home locality; forces the top-priority bucket.
    pub home: String,
    pub communes: Vec<String>,
    #[serde(default)]
    pub excluded: Vec<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecencyCfg {
    #[serde(default = "default_max_age_hours")]
    pub max_age_hours: i64,
}

impl Default for RecencyCfg {
    fn default() -> Self {
        Self {
            max_age_hours: default_max_age_hours(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DigestCfg {
    #[serde(default = "default_label")]
    pub label: String,
    #[serde(default = "default_primary_cap")]
    pub primary_cap: usize,
    #[serde(default = "default_other_cap")]
    pub surrounding_cap: usize,
    #[serde(default = "default_other_cap")]
    pub topical_cap: usize,
}

impl Default for DigestCfg {
    fn default() -> Self {
        Self {
            label: default_label(),
            primary_cap: default_primary_cap(),
            surrounding_cap: default_other_cap(),
            topical_cap: default_other_cap(),
        }
    }
}

impl DigestConfig {
    /// Load from a TOML string; lists are trimmed, lower-cased and emptied of blanks.
    pub fn from_toml_str(s: &str) -> anyhow::Result<Self> {
        let mut cfg: DigestConfig = toml::from_str(s).context("parsing perimeter config")?;

        cfg.perimeter.home = cfg.perimeter.home.trim().to_lowercase();
        if cfg.perimeter.home.is_empty() {
            anyhow::bail!("perimeter.home must not be empty");
        }
        cfg.perimeter.communes = clean_list(cfg.perimeter.communes);
        cfg.perimeter.excluded = clean_list(cfg.perimeter.excluded);
        cfg.perimeter.keywords = clean_list(cfg.perimeter.keywords);

        // Sanitize window: a non-positive window would drop every dated article.
        if !valid_hours(cfg.recency.max_age_hours) {
            cfg.recency.max_age_hours = default_max_age_hours();
        }
        Ok(cfg)
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let data = fs::read_to_string(path)
            .with_context(|| format!("reading perimeter config at {}", path.display()))?;
        Self::from_toml_str(&data)
    }

    /// $PERIMETER_CONFIG_PATH → config/perimeter.toml → built-in seed,
    /// then $DIGEST_MAX_AGE_HOURS overrides the window if it parses.
    pub fn load_default() -> anyhow::Result<Self> {
        let mut cfg = if let Ok(p) = std::env::var(ENV_PERIMETER_CONFIG_PATH) {
            Self::load_from_file(PathBuf::from(p))?
        } else if Path::new(DEFAULT_PERIMETER_CONFIG_PATH).exists() {
            Self::load_from_file(DEFAULT_PERIMETER_CONFIG_PATH)?
        } else {
            Self::default_seed()?
        };

        if let Some(h) = parse_hours_env(std::env::var(ENV_MAX_AGE_HOURS).ok()) {
            cfg.recency.max_age_hours = h;
        }
        Ok(cfg)
    }

    pub fn default_seed() -> anyhow::Result<Self> {
        Self::from_toml_str(SEED_TOML)
    }
}

fn parse_hours_env(raw: Option<String>) -> Option<i64> {
    raw.and_then(|s| s.trim().parse::<i64>().ok())
        .filter(|h| valid_hours(*h))
}

/// Positive and representable as a `chrono::Duration`.
fn valid_hours(h: i64) -> bool {
    h > 0 && chrono::Duration::try_hours(h).is_some()
}

/// Trim + lower-case, drop blanks, keep first occurrence order.
fn clean_list(items: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(items.len());
    for it in items {
        let t = it.trim().to_lowercase();
        if !t.is_empty() && !out.contains(&t) {
            out.push(t);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    #[test]
    fn seed_matches_documented_defaults() {
        let cfg = DigestConfig::default_seed().unwrap();
        assert_eq!(cfg.perimeter.home, "aumagne");
        assert!(cfg.perimeter.communes.contains(&"matha".to_string()));
        assert!(cfg.perimeter.excluded.contains(&"poitiers".to_string()));
        assert!(cfg.perimeter.keywords.contains(&"foire".to_string()));
        assert_eq!(cfg.recency.max_age_hours, 48);
        assert_eq!(
            (cfg.digest.primary_cap, cfg.digest.surrounding_cap, cfg.digest.topical_cap),
            (5, 8, 8)
        );
    }

    #[test]
    fn lists_are_cleaned_and_window_sanitized() {
        let cfg = DigestConfig::from_toml_str(
            r#"
[perimeter]
home = "  Aumagne "
communes = [" Matha", "", "matha", "AUJAC"]
[recency]
max_age_hours = -3
"#,
        )
        .unwrap();
        assert_eq!(cfg.perimeter.home, "aumagne");
        assert_eq!(cfg.perimeter.communes, vec!["matha", "aujac"]);
        assert!(cfg.perimeter.excluded.is_empty());
        assert_eq!(cfg.recency.max_age_hours, 48);
        assert_eq!(cfg.digest.label, "News Aumagne & alentours");
    }

    #[test]
    fn huge_window_is_rejected() {
        assert_eq!(parse_hours_env(Some(" 72 ".into())), Some(72));
        assert_eq!(parse_hours_env(Some(i64::MAX.to_string())), None);
        assert_eq!(parse_hours_env(Some((i64::MAX / 1000).to_string())), None);
        assert_eq!(parse_hours_env(Some("0".into())), None);
        assert_eq!(parse_hours_env(Some("soon".into())), None);

        let cfg = DigestConfig::from_toml_str(&format!(
            "[perimeter]\nhome = \"x\"\ncommunes = []\n[recency]\nmax_age_hours = {}\n",
            i64::MAX / 1000
        ))
        .unwrap();
        assert_eq!(cfg.recency.max_age_hours, 48);
    }

    #[test]
    fn empty_home_is_rejected() {
        let r = DigestConfig::from_toml_str("[perimeter]\nhome = \" \"\ncommunes = []\n");
        assert!(r.is_err());
    }

    #[serial_test::serial]
    #[test]
    fn env_path_and_window_override() {
        let tmp = tempfile::tempdir().unwrap();
        let p = tmp.path().join("p.toml");
        fs::write(&p, "[perimeter]\nhome = \"x\"\ncommunes = [\"x\"]\n").unwrap();
        env::set_var(ENV_PERIMETER_CONFIG_PATH, p.display().to_string());
        env::set_var(ENV_MAX_AGE_HOURS, "12");

        let cfg = DigestConfig::load_default().unwrap();
        assert_eq!(cfg.perimeter.home, "x");
        assert_eq!(cfg.recency.max_age_hours, 12);

        env::remove_var(ENV_PERIMETER_CONFIG_PATH);
        env::remove_var(ENV_MAX_AGE_HOURS);
    }
}
