//! Rule configuration store: load, folder resolution, suppression.
//!
//! Reads `.rulerun.yaml` from the repository root and exposes the effective
//! settings for any project-relative file path. Defaults:
//! - `max_file_length`: 350
//! - `min_coverage`: 90
//! - `skip_rules`: empty
//! - `folders`: empty
//! - `suppressed_rules`: empty
//!
//! A missing config file yields the defaults so every consumer can run
//! standalone; a malformed file is a fatal `ConfigError`. Suppression reasons
//! may carry an `until:YYYY-MM-DD` expiry token which is validated once at
//! load time into a structured `Suppression` record.

use regex::Regex;
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::Path;
use std::sync::OnceLock;
use thiserror::Error;

/// Well-known config file name, relative to the repository root.
pub const CONFIG_FILE: &str = ".rulerun.yaml";

pub const DEFAULT_MAX_FILE_LENGTH: u32 = 350;
pub const DEFAULT_MIN_COVERAGE: u32 = 90;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{path} is not valid YAML: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("invalid expiry '{token}' in suppression for rule '{rule}' (expected until:YYYY-MM-DD)")]
    InvalidExpiry { rule: String, token: String },
}

/// A calendar date in ISO-8601 field order; comparisons follow field order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct IsoDate {
    pub year: i32,
    pub month: u32,
    pub day: u32,
}

impl IsoDate {
    pub fn new(year: i32, month: u32, day: u32) -> Option<IsoDate> {
        if !(1..=12).contains(&month) || day < 1 || day > days_in_month(year, month) {
            return None;
        }
        Some(IsoDate { year, month, day })
    }

    /// Parse `YYYY-MM-DD`, rejecting impossible calendar dates.
    pub fn parse(s: &str) -> Option<IsoDate> {
        let mut it = s.splitn(3, '-');
        let y = it.next()?;
        let m = it.next()?;
        let d = it.next()?;
        if y.len() != 4 || m.len() != 2 || d.len() != 2 {
            return None;
        }
        IsoDate::new(y.parse().ok()?, m.parse().ok()?, d.parse().ok()?)
    }

    /// Today's date in UTC, derived from the system clock.
    pub fn today() -> IsoDate {
        let secs = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs() as i64)
            .unwrap_or(0);
        civil_from_days(secs / 86_400)
    }

    /// The date `n` days after `self`.
    pub fn plus_days(self, n: u32) -> IsoDate {
        let mut d = self;
        for _ in 0..n {
            if d.day < days_in_month(d.year, d.month) {
                d.day += 1;
            } else if d.month < 12 {
                d.month += 1;
                d.day = 1;
            } else {
                d.year += 1;
                d.month = 1;
                d.day = 1;
            }
        }
        d
    }
}

impl fmt::Display for IsoDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }
}

fn is_leap(y: i32) -> bool {
    y % 4 == 0 && (y % 100 != 0 || y % 400 == 0)
}

fn days_in_month(y: i32, m: u32) -> u32 {
    match m {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 => {
            if is_leap(y) {
                29
            } else {
                28
            }
        }
        _ => 0,
    }
}

// Days-since-epoch to civil date (Howard Hinnant's algorithm).
fn civil_from_days(z: i64) -> IsoDate {
    let z = z + 719_468;
    let era = (if z >= 0 { z } else { z - 146_096 }) / 146_097;
    let doe = z - era * 146_097;
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let y = yoe + era * 400;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let d = (doy - (153 * mp + 2) / 5 + 1) as u32;
    let m = if mp < 10 { mp + 3 } else { mp - 9 } as u32;
    IsoDate {
        year: (if m <= 2 { y + 1 } else { y }) as i32,
        month: m,
        day: d,
    }
}

/// A rule suppression with its free-text reason and optional parsed expiry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suppression {
    pub reason: String,
    pub expires_at: Option<IsoDate>,
}

impl Suppression {
    pub fn is_expired(&self, today: IsoDate) -> bool {
        matches!(self.expires_at, Some(exp) if exp < today)
    }
}

/// Per-folder override; scalar fields replace the global value, while
/// `suppressed_rules` deep-merges on top of the global map.
#[derive(Debug, Clone, Default)]
pub struct FolderOverride {
    pub max_file_length: Option<u32>,
    pub min_coverage: Option<u32>,
    pub skip_rules: Option<BTreeSet<String>>,
    pub suppressed_rules: BTreeMap<String, Suppression>,
}

/// Resolved configuration for the whole project.
#[derive(Debug, Clone)]
pub struct RuleConfig {
    pub max_file_length: u32,
    pub min_coverage: u32,
    pub skip_rules: BTreeSet<String>,
    pub folders: BTreeMap<String, FolderOverride>,
    pub suppressed_rules: BTreeMap<String, Suppression>,
}

impl Default for RuleConfig {
    fn default() -> Self {
        RuleConfig {
            max_file_length: DEFAULT_MAX_FILE_LENGTH,
            min_coverage: DEFAULT_MIN_COVERAGE,
            skip_rules: BTreeSet::new(),
            folders: BTreeMap::new(),
            suppressed_rules: BTreeMap::new(),
        }
    }
}

// Raw serde shapes; reason strings become `Suppression` records after load.
#[derive(Debug, Default, Deserialize)]
struct RawConfig {
    max_file_length: Option<u32>,
    min_coverage: Option<u32>,
    #[serde(default)]
    skip_rules: BTreeSet<String>,
    #[serde(default)]
    folders: BTreeMap<String, RawFolderOverride>,
    #[serde(default)]
    suppressed_rules: BTreeMap<String, String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawFolderOverride {
    max_file_length: Option<u32>,
    min_coverage: Option<u32>,
    skip_rules: Option<BTreeSet<String>>,
    #[serde(default)]
    suppressed_rules: BTreeMap<String, String>,
}

fn expiry_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)until:(\S+)").expect("valid expiry regex"))
}

fn parse_suppression(rule: &str, reason: &str) -> Result<Suppression, ConfigError> {
    let expires_at = match expiry_regex().captures(reason) {
        Some(caps) => {
            let token = &caps[1];
            match IsoDate::parse(token) {
                Some(d) => Some(d),
                None => {
                    return Err(ConfigError::InvalidExpiry {
                        rule: rule.to_string(),
                        token: token.to_string(),
                    })
                }
            }
        }
        None => None,
    };
    Ok(Suppression {
        reason: reason.to_string(),
        expires_at,
    })
}

fn parse_suppressions(
    raw: BTreeMap<String, String>,
) -> Result<BTreeMap<String, Suppression>, ConfigError> {
    raw.into_iter()
        .map(|(rule, reason)| {
            let sup = parse_suppression(&rule, &reason)?;
            Ok((rule, sup))
        })
        .collect()
}

/// Parse a config document; pure counterpart of `load_config` for testing.
pub fn parse_config(text: &str, path_label: &str) -> Result<RuleConfig, ConfigError> {
    let raw: RawConfig = serde_yaml::from_str(text).map_err(|source| ConfigError::Parse {
        path: path_label.to_string(),
        source,
    })?;
    let mut folders = BTreeMap::new();
    for (prefix, ov) in raw.folders {
        folders.insert(
            prefix,
            FolderOverride {
                max_file_length: ov.max_file_length,
                min_coverage: ov.min_coverage,
                skip_rules: ov.skip_rules,
                suppressed_rules: parse_suppressions(ov.suppressed_rules)?,
            },
        );
    }
    Ok(RuleConfig {
        max_file_length: raw.max_file_length.unwrap_or(DEFAULT_MAX_FILE_LENGTH),
        min_coverage: raw.min_coverage.unwrap_or(DEFAULT_MIN_COVERAGE),
        skip_rules: raw.skip_rules,
        folders,
        suppressed_rules: parse_suppressions(raw.suppressed_rules)?,
    })
}

/// Load `.rulerun.yaml` from the repository root.
///
/// Absence yields the documented defaults; read or parse failures propagate.
pub fn load_config(root: &Path) -> Result<RuleConfig, ConfigError> {
    let path = root.join(CONFIG_FILE);
    if !path.exists() {
        return Ok(RuleConfig::default());
    }
    let text = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
        path: path.to_string_lossy().to_string(),
        source,
    })?;
    parse_config(&text, &path.to_string_lossy())
}

/// Effective settings for a project-relative file path.
///
/// The first folder key that is a string prefix of `rel_path` applies; its
/// scalar fields replace the global values and its suppressions merge on top
/// of the global map (override wins on key collision). No match returns the
/// global config unchanged.
pub fn resolve_for_file(rel_path: &str, config: &RuleConfig) -> RuleConfig {
    for (prefix, ov) in &config.folders {
        if !rel_path.starts_with(prefix.as_str()) {
            continue;
        }
        let mut suppressed = config.suppressed_rules.clone();
        for (rule, sup) in &ov.suppressed_rules {
            suppressed.insert(rule.clone(), sup.clone());
        }
        return RuleConfig {
            max_file_length: ov.max_file_length.unwrap_or(config.max_file_length),
            min_coverage: ov.min_coverage.unwrap_or(config.min_coverage),
            skip_rules: ov
                .skip_rules
                .clone()
                .unwrap_or_else(|| config.skip_rules.clone()),
            folders: config.folders.clone(),
            suppressed_rules: suppressed,
        };
    }
    config.clone()
}

/// Whether `rule_id` is suppressed in the given (already resolved) config,
/// returning the suppression record for display and audit.
pub fn is_suppressed<'a>(rule_id: &str, config: &'a RuleConfig) -> Option<&'a Suppression> {
    config.suppressed_rules.get(rule_id)
}

/// Suppressions whose expiry has already passed.
pub fn expired(config: &RuleConfig, today: IsoDate) -> Vec<(&String, &Suppression)> {
    config
        .suppressed_rules
        .iter()
        .filter(|(_, s)| s.is_expired(today))
        .collect()
}

/// Suppressions that expire within the next `days` days (inclusive).
pub fn due_within(config: &RuleConfig, today: IsoDate, days: u32) -> Vec<(&String, &Suppression)> {
    let horizon = today.plus_days(days);
    config
        .suppressed_rules
        .iter()
        .filter(|(_, s)| matches!(s.expires_at, Some(exp) if exp >= today && exp <= horizon))
        .collect()
}
