use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::env;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};

/// Directory holding config, mutes and period state under a project root.
pub const VITALS_DIR: &str = ".vitals";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectConfig {
    #[serde(default)]
    pub thresholds: ThresholdConfig,
    #[serde(default)]
    pub impact: ImpactConfig,
    #[serde(default)]
    pub sources: SourceConfig,
}

/// An absolute ceiling plus a per-period regression allowance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricThreshold {
    pub limit: f64,
    pub delta: f64,
}

impl MetricThreshold {
    #[must_use]
    pub const fn new(limit: f64, delta: f64) -> Self {
        Self { limit, delta }
    }

    /// `value` is over the ceiling, or it regressed by more than `delta`.
    #[must_use]
    pub fn is_exceeded(&self, value: f64, diff: Option<f64>) -> bool {
        value > self.limit || diff.is_some_and(|diff| diff > self.delta)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdConfig {
    #[serde(default = "default_score_poor")]
    pub score_poor: i64,
    #[serde(default = "default_score_good")]
    pub score_good: i64,
    #[serde(default = "default_score_trend_min")]
    pub score_trend_min: i64,
    #[serde(default = "default_layout_shift")]
    pub layout_shift: MetricThreshold,
    #[serde(default = "default_input_delay")]
    pub input_delay: MetricThreshold,
    #[serde(default = "default_largest_paint")]
    pub largest_paint: MetricThreshold,
    #[serde(default = "default_time_to_interactive")]
    pub time_to_interactive: MetricThreshold,
    #[serde(default = "default_bootup_time")]
    pub bootup_time: MetricThreshold,
    #[serde(default = "default_blocking_time")]
    pub blocking_time: MetricThreshold,
    #[serde(default = "default_third_party_blocking")]
    pub third_party_blocking: f64,
    #[serde(default = "default_composition_share")]
    pub composition_share: f64,
    #[serde(default = "default_weight_growth")]
    pub weight_growth: f64,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            score_poor: default_score_poor(),
            score_good: default_score_good(),
            score_trend_min: default_score_trend_min(),
            layout_shift: default_layout_shift(),
            input_delay: default_input_delay(),
            largest_paint: default_largest_paint(),
            time_to_interactive: default_time_to_interactive(),
            bootup_time: default_bootup_time(),
            blocking_time: default_blocking_time(),
            third_party_blocking: default_third_party_blocking(),
            composition_share: default_composition_share(),
            weight_growth: default_weight_growth(),
        }
    }
}

/// Parameters of the load-time to conversion-loss extrapolation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImpactConfig {
    /// Load time in milliseconds below which no loss is estimated.
    #[serde(default = "default_target_load_time")]
    pub target_load_time: f64,
    /// Estimated conversion loss, in percent, per second over target.
    #[serde(default = "default_loss_per_second")]
    pub loss_per_second: f64,
    #[serde(default = "default_max_loss")]
    pub max_loss: f64,
}

impl Default for ImpactConfig {
    fn default() -> Self {
        Self {
            target_load_time: default_target_load_time(),
            loss_per_second: default_loss_per_second(),
            max_loss: default_max_loss(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceConfig {
    /// The monitored site's own host; files served from it attribute to `site`.
    #[serde(default)]
    pub site_host: Option<String>,
    /// Host -> label overrides for large-file attribution.
    #[serde(default)]
    pub hosts: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UserConfig {
    #[serde(default)]
    pub output: Option<String>,
}

pub fn vitals_dir(project_root: &Path) -> PathBuf {
    project_root.join(VITALS_DIR)
}

pub fn load_project_config(project_root: &Path) -> Result<ProjectConfig> {
    let path = vitals_dir(project_root).join("config.toml");
    if !path.exists() {
        return Ok(ProjectConfig::default());
    }

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<ProjectConfig>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

pub fn load_user_config() -> Result<UserConfig> {
    let Some(config_dir) = dirs::config_dir() else {
        return Ok(UserConfig::default());
    };

    let path = config_dir.join("vitals/config.toml");
    if !path.exists() {
        return Ok(UserConfig::default());
    }

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<UserConfig>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

/// Resolve the output mode name: `--json` > `FORMAT` env > user config > TTY.
pub fn resolve_output(cli_json: bool, user: &UserConfig) -> String {
    let env_format = env::var("FORMAT").ok();
    resolve_output_inner(
        cli_json,
        user.output.as_deref(),
        env_format.as_deref(),
        std::io::stdout().is_terminal(),
    )
}

fn resolve_output_inner(
    cli_json: bool,
    user_output: Option<&str>,
    env_format: Option<&str>,
    is_tty: bool,
) -> String {
    fn normalize_output_mode(raw: &str) -> Option<&'static str> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "pretty" | "human" => Some("pretty"),
            "text" | "table" => Some("text"),
            "json" => Some("json"),
            _ => None,
        }
    }

    if cli_json {
        return "json".to_string();
    }

    if let Some(mode) = env_format.and_then(normalize_output_mode) {
        return mode.to_string();
    }

    if let Some(mode) = user_output.and_then(normalize_output_mode) {
        return mode.to_string();
    }

    if is_tty { "pretty" } else { "text" }.to_string()
}

const fn default_score_poor() -> i64 {
    50
}

const fn default_score_good() -> i64 {
    90
}

const fn default_score_trend_min() -> i64 {
    5
}

const fn default_layout_shift() -> MetricThreshold {
    MetricThreshold::new(0.1, 0.05)
}

const fn default_input_delay() -> MetricThreshold {
    MetricThreshold::new(100.0, 50.0)
}

const fn default_largest_paint() -> MetricThreshold {
    MetricThreshold::new(2500.0, 500.0)
}

const fn default_time_to_interactive() -> MetricThreshold {
    MetricThreshold::new(3800.0, 1000.0)
}

const fn default_bootup_time() -> MetricThreshold {
    MetricThreshold::new(2000.0, 500.0)
}

const fn default_blocking_time() -> MetricThreshold {
    MetricThreshold::new(300.0, 100.0)
}

const fn default_third_party_blocking() -> f64 {
    250.0
}

const fn default_composition_share() -> f64 {
    0.6
}

const fn default_weight_growth() -> f64 {
    100_000.0
}

const fn default_target_load_time() -> f64 {
    2000.0
}

const fn default_loss_per_second() -> f64 {
    7.0
}

const fn default_max_loss() -> f64 {
    100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_project_config(root: &Path, body: &str) {
        let dir = vitals_dir(root);
        std::fs::create_dir_all(&dir).expect("config dir must be created");
        std::fs::write(dir.join("config.toml"), body).expect("config must be written");
    }

    #[test]
    fn missing_project_config_uses_defaults() {
        let temp = tempfile::tempdir().expect("temp dir should be created");
        let config = load_project_config(temp.path()).expect("defaults load");
        assert_eq!(config, ProjectConfig::default());
        assert_eq!(config.thresholds.score_good, 90);
    }

    #[test]
    fn partial_project_config_keeps_other_defaults() {
        let temp = tempfile::tempdir().expect("temp dir should be created");
        write_project_config(
            temp.path(),
            r#"
[thresholds]
score_good = 85
largest_paint = { limit = 3000.0, delta = 750.0 }

[sources]
site_host = "example.com"

[sources.hosts]
"fonts.gstatic.com" = "Google Fonts"
"#,
        );

        let config = load_project_config(temp.path()).expect("config loads");
        assert_eq!(config.thresholds.score_good, 85);
        assert_eq!(config.thresholds.score_poor, 50);
        assert_eq!(
            config.thresholds.largest_paint,
            MetricThreshold::new(3000.0, 750.0)
        );
        assert_eq!(config.sources.site_host.as_deref(), Some("example.com"));
        assert_eq!(config.sources.hosts["fonts.gstatic.com"], "Google Fonts");
        assert_eq!(config.impact, ImpactConfig::default());
    }

    #[test]
    fn malformed_project_config_is_an_error() {
        let temp = tempfile::tempdir().expect("temp dir should be created");
        write_project_config(temp.path(), "[thresholds\nscore_good = ");
        let err = load_project_config(temp.path()).expect_err("parse must fail");
        assert!(err.to_string().contains("Failed to parse"));
    }

    #[test]
    fn threshold_trips_on_limit_or_regression() {
        let threshold = MetricThreshold::new(100.0, 50.0);
        assert!(threshold.is_exceeded(120.0, None));
        assert!(threshold.is_exceeded(80.0, Some(60.0)));
        assert!(!threshold.is_exceeded(80.0, Some(20.0)));
        assert!(!threshold.is_exceeded(100.0, None));
    }

    #[test]
    fn output_resolution_precedence() {
        assert_eq!(resolve_output_inner(true, Some("text"), Some("pretty"), true), "json");
        assert_eq!(resolve_output_inner(false, Some("text"), Some("JSON"), true), "json");
        assert_eq!(resolve_output_inner(false, Some("table"), None, true), "text");
        assert_eq!(resolve_output_inner(false, Some("bogus"), Some("bogus"), true), "pretty");
        assert_eq!(resolve_output_inner(false, None, None, false), "text");
    }
}
