use crate::errors::ConfigError;
use crate::model::{FamilyRule, ScoringPolicy, VerdictFilter};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

pub mod path_resolver;

pub const SUPPORTED_CONFIG_VERSION: u32 = 1;

pub const DEFAULT_YEAR: u32 = 2021;
pub const DEFAULT_TIME_LIMIT: f64 = 1200.0;
pub const DEFAULT_TRACK: &str = "single_query";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreConfig {
    #[serde(default = "default_version", alias = "configVersion")]
    pub version: u32,
    #[serde(default = "default_competition")]
    pub competition: String,
    #[serde(default = "default_year")]
    pub year: u32,
    #[serde(default = "default_track")]
    pub track: String,
    /// Wall-clock limit T in seconds.
    #[serde(default = "default_time_limit")]
    pub time_limit: f64,
    #[serde(default)]
    pub family: FamilyRule,
    #[serde(default)]
    pub use_families: bool,
    #[serde(default)]
    pub skip_unknown: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub division_map: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registrations: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub scorings: Vec<ScoringSpec>,
}

/// A named scoring kind. Unset fields inherit from the enclosing config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringSpec {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_limit: Option<f64>,
    #[serde(default)]
    pub sequential: bool,
    #[serde(default)]
    pub verdict: VerdictFilter,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skip_unknown: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub use_families: Option<bool>,
}

impl ScoringSpec {
    fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            time_limit: None,
            sequential: false,
            verdict: VerdictFilter::All,
            skip_unknown: None,
            use_families: None,
        }
    }
}

fn default_version() -> u32 {
    SUPPORTED_CONFIG_VERSION
}

fn default_competition() -> String {
    "SMT-COMP".to_string()
}

fn default_year() -> u32 {
    DEFAULT_YEAR
}

fn default_track() -> String {
    DEFAULT_TRACK.to_string()
}

fn default_time_limit() -> f64 {
    DEFAULT_TIME_LIMIT
}

impl Default for ScoreConfig {
    fn default() -> Self {
        Self {
            version: SUPPORTED_CONFIG_VERSION,
            competition: default_competition(),
            year: DEFAULT_YEAR,
            track: default_track(),
            time_limit: DEFAULT_TIME_LIMIT,
            family: FamilyRule::Top,
            use_families: false,
            skip_unknown: false,
            division_map: None,
            registrations: None,
            scorings: Vec::new(),
        }
    }
}

/// The single-query report set: sequential, parallel, sat, unsat and 24s.
pub fn default_scorings() -> Vec<ScoringSpec> {
    vec![
        ScoringSpec {
            sequential: true,
            ..ScoringSpec::named("sequential")
        },
        ScoringSpec::named("parallel"),
        ScoringSpec {
            verdict: VerdictFilter::Sat,
            ..ScoringSpec::named("sat")
        },
        ScoringSpec {
            verdict: VerdictFilter::Unsat,
            ..ScoringSpec::named("unsat")
        },
        ScoringSpec {
            time_limit: Some(24.0),
            ..ScoringSpec::named("24s")
        },
    ]
}

impl ScoreConfig {
    pub fn policies(&self) -> Vec<ScoringPolicy> {
        let specs = if self.scorings.is_empty() {
            default_scorings()
        } else {
            self.scorings.clone()
        };
        specs
            .into_iter()
            .map(|s| ScoringPolicy {
                name: s.name,
                time_limit: s.time_limit.unwrap_or(self.time_limit),
                sequential: s.sequential,
                verdict: s.verdict,
                skip_unknown: s.skip_unknown.unwrap_or(self.skip_unknown),
                use_families: s.use_families.unwrap_or(self.use_families),
                year: self.year,
            })
            .collect()
    }

    pub fn policy(&self, name: &str) -> Option<ScoringPolicy> {
        self.policies().into_iter().find(|p| p.name == name)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version != 0 && self.version != SUPPORTED_CONFIG_VERSION {
            return Err(ConfigError(format!(
                "unsupported config version {} (supported: 0, {})",
                self.version, SUPPORTED_CONFIG_VERSION
            )));
        }
        if !(self.time_limit.is_finite() && self.time_limit > 0.0) {
            return Err(ConfigError(format!(
                "time_limit must be a positive number of seconds, got {}",
                self.time_limit
            )));
        }
        let mut seen = HashSet::new();
        for s in &self.scorings {
            if s.name.trim().is_empty() {
                return Err(ConfigError("scoring with empty name".into()));
            }
            // names become output file stems
            if s.name.contains(['/', '\\']) || s.name == "." || s.name == ".." {
                return Err(ConfigError(format!(
                    "scoring name '{}' must not contain path separators",
                    s.name
                )));
            }
            if !seen.insert(s.name.as_str()) {
                return Err(ConfigError(format!("duplicate scoring name '{}'", s.name)));
            }
            if let Some(t) = s.time_limit {
                if !(t.is_finite() && t > 0.0) {
                    return Err(ConfigError(format!(
                        "scoring '{}': time_limit must be positive, got {}",
                        s.name, t
                    )));
                }
            }
        }
        Ok(())
    }
}

pub fn load_config(path: &Path, strict: bool) -> Result<ScoreConfig, ConfigError> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| ConfigError(format!("failed to read config {}: {}", path.display(), e)))?;

    let mut ignored_keys = std::collections::BTreeSet::new();
    let deserializer = serde_yaml::Deserializer::from_str(&raw);

    // serde_ignored wrapper to capture unknown fields
    let mut cfg: ScoreConfig = serde_ignored::deserialize(deserializer, |path| {
        ignored_keys.insert(path.to_string());
    })
    .map_err(|e| ConfigError(format!("failed to parse YAML: {}", e)))?;

    // YAML anchors live under `_`/`x-` keys
    let meaningful_unknowns: Vec<_> = ignored_keys
        .iter()
        .filter(|k| !k.starts_with('_') && !k.starts_with("x-"))
        .collect();

    if !meaningful_unknowns.is_empty() {
        if strict {
            return Err(ConfigError(format!(
                "Unknown fields detected in strict mode: {:?} (file: {})",
                meaningful_unknowns,
                path.display()
            )));
        }
        tracing::warn!(
            event = "podium.config.unknown_fields",
            fields = ?meaningful_unknowns,
            file = %path.display(),
            "ignoring unknown config fields"
        );
    }

    cfg.validate()?;

    let r = path_resolver::PathResolver::new(path);
    r.resolve_opt(&mut cfg.division_map);
    r.resolve_opt(&mut cfg.registrations);

    Ok(cfg)
}

pub fn write_sample_config(path: &Path) -> Result<(), ConfigError> {
    std::fs::write(
        path,
        r#"version: 1
competition: SMT-COMP
year: 2021
track: single_query
time_limit: 1200
family: top
use_families: false
skip_unknown: false
# division_map: divisions.yaml
# registrations: solvers.csv
scorings:
  - name: sequential
    sequential: true
  - name: parallel
  - name: sat
    verdict: sat
  - name: unsat
    verdict: unsat
  - name: 24s
    time_limit: 24
"#,
    )
    .map_err(|e| ConfigError(format!("failed to write sample config: {}", e)))?;
    Ok(())
}
