//! # Configuration
//!
//! Centralizes all settings with a clear override hierarchy:
//! defaults → config file → env vars → CLI flags.
//!
//! Config lives at `~/.takahashi/config.toml`. If missing on first run, a
//! commented-out default is generated so users can discover all options.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

use crate::core::fit::{FitConfig, FitStrategy};
use crate::core::outline::IndentMode;
use crate::inference::{Effort, TransformSettings};

// ============================================================================
// Config Structs (all fields Option<T> for sparse TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct TakahashiConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub outline: OutlineConfig,
    #[serde(default)]
    pub presentation: PresentationConfig,
    #[serde(default)]
    pub openrouter: OpenRouterConfig,
    #[serde(default)]
    pub lmstudio: LmStudioConfig,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct GeneralConfig {
    pub default_provider: Option<String>,
    pub default_model: Option<String>,
    pub max_output_tokens: Option<u32>,
    pub temperature: Option<f32>,
    pub reasoning_effort: Option<Effort>,
    pub system_prompt: Option<String>,
    pub system_prompt_file: Option<String>,
    pub transform_timeout_secs: Option<u64>,
    pub ready_timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct OutlineConfig {
    pub indent_mode: Option<IndentMode>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct PresentationConfig {
    pub fit_strategy: Option<FitStrategy>,
    pub min_size: Option<f32>,
    pub max_size: Option<f32>,
    pub step: Option<f32>,
    pub margin: Option<f32>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct OpenRouterConfig {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct LmStudioConfig {
    pub base_url: Option<String>,
}

// ============================================================================
// Defaults
// ============================================================================

pub const DEFAULT_MODEL: &str = "google/gemma-3-27b-it";
pub const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 4096;
pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_TRANSFORM_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_READY_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api/v1";
pub const DEFAULT_LMSTUDIO_BASE_URL: &str = "http://localhost:1234/v1";

// ============================================================================
// Resolved Config (concrete values, no Options)
// ============================================================================

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub provider: String,
    pub model_name: String,
    pub max_output_tokens: u32,
    pub temperature: f32,
    pub effort: Effort,
    /// `None` means the built-in Takahashi directive.
    pub system_prompt: Option<String>,
    pub transform_timeout: Duration,
    pub ready_timeout: Duration,
    pub indent_mode: IndentMode,
    pub fit_strategy: FitStrategy,
    pub fit: FitConfig,
    pub openrouter_api_key: Option<String>,
    pub openrouter_base_url: String,
    pub lmstudio_base_url: String,
}

impl ResolvedConfig {
    /// Transform knobs for the configured model.
    pub fn transform_settings(&self) -> TransformSettings {
        TransformSettings {
            model: self.model_name.clone(),
            system_prompt: self.system_prompt.clone(),
            effort: self.effort,
            max_output_tokens: self.max_output_tokens,
            temperature: self.temperature,
            timeout: self.transform_timeout,
            ready_timeout: self.ready_timeout,
        }
    }
}

/// Values given on the command line. `None` = not specified.
#[derive(Debug, Default, Clone, Copy)]
pub struct CliOverrides<'a> {
    pub provider: Option<&'a str>,
    pub model: Option<&'a str>,
    pub indent_mode: Option<IndentMode>,
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "config I/O error: {e}"),
            ConfigError::Parse(e) => write!(f, "config parse error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Loading
// ============================================================================

fn config_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".takahashi"))
}

/// Returns the path to `~/.takahashi/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|d| d.join("config.toml"))
}

/// Load config from `~/.takahashi/config.toml`.
///
/// If the file doesn't exist, generates a commented-out default and
/// returns `TakahashiConfig::default()`. If it exists but is malformed,
/// returns `ConfigError::Parse`.
pub fn load_config() -> Result<TakahashiConfig, ConfigError> {
    let Some(path) = config_path() else {
        warn!("Could not determine home directory, using default config");
        return Ok(TakahashiConfig::default());
    };

    if !path.exists() {
        info!("No config file found, generating default at {}", path.display());
        generate_default_config(&path);
        return Ok(TakahashiConfig::default());
    }

    let contents = fs::read_to_string(&path).map_err(ConfigError::Io)?;
    let config = parse_config(&contents)?;
    info!("Loaded config from {}", path.display());
    debug!("Config: {:?}", config);
    Ok(config)
}

pub fn parse_config(contents: &str) -> Result<TakahashiConfig, ConfigError> {
    toml::from_str(contents).map_err(ConfigError::Parse)
}

const DEFAULT_CONFIG_FILE: &str = r#"# Takahashi Configuration
# All settings are optional; defaults are used for anything not specified.
# Override hierarchy: defaults → this file → env vars → CLI flags.

# [general]
# default_provider = "openrouter"    # "openrouter" or "lmstudio"
# default_model = "google/gemma-3-27b-it"
# max_output_tokens = 4096
# temperature = 0.7
# reasoning_effort = "auto"          # "high", "medium", "low", "auto", "none"
# system_prompt = "..."              # Replaces the built-in slide-writing rules
# system_prompt_file = "prompt.md"   # Path relative to ~/.takahashi/
# transform_timeout_secs = 120
# ready_timeout_secs = 30

# [outline]
# indent_mode = "flat"               # "flat": every "- " line is a slide
#                                    # "memo": indented "- " lines are speaker memos

# [presentation]
# fit_strategy = "measured"          # "measured" or "heuristic"
# min_size = 1.0
# max_size = 8.0
# step = 1.0
# margin = 0.9                       # Fraction of the screen the text may fill

# [openrouter]
# api_key = "sk-or-..."              # Or set OPENROUTER_API_KEY env var
# base_url = "https://openrouter.ai/api/v1"

# [lmstudio]
# base_url = "http://localhost:1234/v1"
"#;

/// Generates a commented-out default config file at the given path.
fn generate_default_config(path: &Path) {
    if let Some(parent) = path.parent()
        && let Err(e) = fs::create_dir_all(parent)
    {
        warn!("Failed to create config directory: {}", e);
        return;
    }
    if let Err(e) = fs::write(path, DEFAULT_CONFIG_FILE) {
        warn!("Failed to write default config: {}", e);
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// Resolve the final config by collapsing: defaults → config file → env vars → CLI.
pub fn resolve(config: &TakahashiConfig, cli: &CliOverrides<'_>) -> ResolvedConfig {
    // Provider: CLI → env → config → default
    let provider = cli
        .provider
        .map(str::to_string)
        .or_else(|| std::env::var("TAKAHASHI_PROVIDER").ok())
        .or_else(|| config.general.default_provider.clone())
        .unwrap_or_else(|| "openrouter".to_string());

    // Model: CLI → env → config → default
    let model_name = cli
        .model
        .map(str::to_string)
        .or_else(|| std::env::var("TAKAHASHI_MODEL").ok())
        .or_else(|| config.general.default_model.clone())
        .unwrap_or_else(|| DEFAULT_MODEL.to_string());

    let openrouter_api_key = std::env::var("OPENROUTER_API_KEY")
        .ok()
        .or_else(|| config.openrouter.api_key.clone());

    let openrouter_base_url = std::env::var("OPENROUTER_BASE_URL")
        .ok()
        .or_else(|| config.openrouter.base_url.clone())
        .unwrap_or_else(|| DEFAULT_OPENROUTER_BASE_URL.to_string());

    let lmstudio_base_url = std::env::var("LM_STUDIO_BASE_URL")
        .ok()
        .or_else(|| config.lmstudio.base_url.clone())
        .unwrap_or_else(|| DEFAULT_LMSTUDIO_BASE_URL.to_string());

    let general = &config.general;
    ResolvedConfig {
        provider,
        model_name,
        max_output_tokens: general
            .max_output_tokens
            .unwrap_or(DEFAULT_MAX_OUTPUT_TOKENS),
        temperature: general.temperature.unwrap_or(DEFAULT_TEMPERATURE),
        effort: general.reasoning_effort.unwrap_or_default(),
        system_prompt: resolve_system_prompt(general, config_dir().as_deref()),
        transform_timeout: Duration::from_secs(
            general
                .transform_timeout_secs
                .unwrap_or(DEFAULT_TRANSFORM_TIMEOUT_SECS),
        ),
        ready_timeout: Duration::from_secs(
            general.ready_timeout_secs.unwrap_or(DEFAULT_READY_TIMEOUT_SECS),
        ),
        indent_mode: cli
            .indent_mode
            .or(config.outline.indent_mode)
            .unwrap_or_default(),
        fit_strategy: config.presentation.fit_strategy.unwrap_or_default(),
        fit: resolve_fit(&config.presentation),
        openrouter_api_key,
        openrouter_base_url,
        lmstudio_base_url,
    }
}

/// Fills in the fit bounds, repairing values that would make the search
/// range empty.
fn resolve_fit(presentation: &PresentationConfig) -> FitConfig {
    let defaults = FitConfig::default();
    let min_size = presentation.min_size.unwrap_or(defaults.min_size).max(1.0);
    let max_size = presentation.max_size.unwrap_or(defaults.max_size).max(min_size);
    let step = presentation
        .step
        .filter(|s| *s > 0.0)
        .unwrap_or(defaults.step);
    let margin = presentation
        .margin
        .filter(|m| *m > 0.0 && *m <= 1.0)
        .unwrap_or(defaults.margin);

    FitConfig {
        min_size,
        max_size,
        step,
        margin,
        default_size: defaults.default_size.clamp(min_size, max_size),
    }
}

/// Inline prompt wins over file. `None` falls back to the built-in directive.
fn resolve_system_prompt(general: &GeneralConfig, base_dir: Option<&Path>) -> Option<String> {
    if let Some(prompt) = &general.system_prompt {
        return Some(prompt.clone());
    }

    let file = general.system_prompt_file.as_ref()?;
    let prompt_path = base_dir?.join(file);
    match fs::read_to_string(&prompt_path) {
        Ok(contents) => {
            let trimmed = contents.trim();
            if trimmed.is_empty() {
                warn!("System prompt file is empty: {}", prompt_path.display());
                return None;
            }
            info!("Loaded system prompt from {}", prompt_path.display());
            Some(trimmed.to_string())
        }
        Err(e) => {
            warn!(
                "Failed to read system prompt file {}: {}",
                prompt_path.display(),
                e
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_file_is_all_comments() {
        let config = parse_config(DEFAULT_CONFIG_FILE).unwrap();
        assert!(config.general.default_provider.is_none());
        assert!(config.outline.indent_mode.is_none());
        assert!(config.presentation.margin.is_none());
    }

    #[test]
    fn test_resolve_uses_defaults_when_empty() {
        let resolved = resolve(&TakahashiConfig::default(), &CliOverrides::default());
        assert_eq!(resolved.max_output_tokens, DEFAULT_MAX_OUTPUT_TOKENS);
        assert_eq!(resolved.effort, Effort::default());
        assert_eq!(resolved.temperature, DEFAULT_TEMPERATURE);
        assert_eq!(resolved.indent_mode, IndentMode::Flat);
        assert_eq!(resolved.fit_strategy, FitStrategy::Measured);
        assert_eq!(resolved.fit, FitConfig::default());
        assert_eq!(resolved.transform_timeout, Duration::from_secs(120));
        assert_eq!(resolved.ready_timeout, Duration::from_secs(30));
        assert!(resolved.system_prompt.is_none());
    }

    #[test]
    fn test_resolve_config_values_override_defaults() {
        let config = TakahashiConfig {
            general: GeneralConfig {
                default_provider: Some("lmstudio".to_string()),
                default_model: Some("my-model".to_string()),
                max_output_tokens: Some(1024),
                temperature: Some(0.3),
                reasoning_effort: Some(Effort::High),
                system_prompt: Some("Custom prompt.".to_string()),
                transform_timeout_secs: Some(10),
                ..Default::default()
            },
            outline: OutlineConfig {
                indent_mode: Some(IndentMode::Memo),
            },
            ..Default::default()
        };
        let resolved = resolve(&config, &CliOverrides::default());
        assert_eq!(resolved.max_output_tokens, 1024);
        assert_eq!(resolved.temperature, 0.3);
        assert_eq!(resolved.effort, Effort::High);
        assert_eq!(resolved.system_prompt.as_deref(), Some("Custom prompt."));
        assert_eq!(resolved.transform_timeout, Duration::from_secs(10));
        assert_eq!(resolved.indent_mode, IndentMode::Memo);
    }

    #[test]
    fn test_transform_settings_follow_config() {
        let mut resolved = resolve(&TakahashiConfig::default(), &CliOverrides::default());
        resolved.model_name = "m".to_string();
        resolved.temperature = 0.2;
        let settings = resolved.transform_settings();
        assert_eq!(settings.model, "m");
        assert_eq!(settings.temperature, 0.2);
        assert_eq!(settings.timeout, resolved.transform_timeout);
        assert!(settings.system_prompt.is_none());
    }

    #[test]
    fn test_resolve_cli_wins() {
        let config = TakahashiConfig {
            general: GeneralConfig {
                default_provider: Some("lmstudio".to_string()),
                ..Default::default()
            },
            outline: OutlineConfig {
                indent_mode: Some(IndentMode::Memo),
            },
            ..Default::default()
        };
        let cli = CliOverrides {
            provider: Some("openrouter"),
            model: Some("cli-model"),
            indent_mode: Some(IndentMode::Flat),
        };
        let resolved = resolve(&config, &cli);
        assert_eq!(resolved.provider, "openrouter");
        assert_eq!(resolved.model_name, "cli-model");
        assert_eq!(resolved.indent_mode, IndentMode::Flat);
    }

    #[test]
    fn test_toml_sections_parse() {
        let toml_str = r#"
[general]
default_provider = "openrouter"
reasoning_effort = "medium"
ready_timeout_secs = 5

[outline]
indent_mode = "memo"

[presentation]
fit_strategy = "heuristic"
max_size = 6.0
margin = 0.8

[openrouter]
api_key = "sk-test-123"

[lmstudio]
base_url = "http://192.168.1.100:1234/v1"
"#;
        let config = parse_config(toml_str).unwrap();
        assert_eq!(config.general.reasoning_effort, Some(Effort::Medium));
        assert_eq!(config.general.ready_timeout_secs, Some(5));
        assert_eq!(config.outline.indent_mode, Some(IndentMode::Memo));
        assert_eq!(config.presentation.fit_strategy, Some(FitStrategy::Heuristic));
        assert_eq!(config.presentation.max_size, Some(6.0));
        assert_eq!(config.openrouter.api_key.as_deref(), Some("sk-test-123"));
        assert_eq!(
            config.lmstudio.base_url.as_deref(),
            Some("http://192.168.1.100:1234/v1")
        );
    }

    #[test]
    fn test_malformed_toml_is_parse_error() {
        let err = parse_config("[outline]\nindent_mode = \"sideways\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
        assert!(err.to_string().starts_with("config parse error"));
    }

    #[test]
    fn test_fit_bounds_are_repaired() {
        let fit = resolve_fit(&PresentationConfig {
            min_size: Some(6.0),
            max_size: Some(2.0),
            step: Some(0.0),
            margin: Some(1.5),
            ..Default::default()
        });
        assert_eq!(fit.min_size, 6.0);
        assert_eq!(fit.max_size, 6.0);
        assert_eq!(fit.step, FitConfig::default().step);
        assert_eq!(fit.margin, FitConfig::default().margin);
        assert_eq!(fit.default_size, 6.0);
    }

    #[test]
    fn test_inline_system_prompt_wins_over_file() {
        let general = GeneralConfig {
            system_prompt: Some("Inline wins.".to_string()),
            system_prompt_file: Some("should-not-load.md".to_string()),
            ..Default::default()
        };
        assert_eq!(
            resolve_system_prompt(&general, Some(Path::new("/nonexistent"))).as_deref(),
            Some("Inline wins.")
        );
    }

    #[test]
    fn test_system_prompt_file_is_read_relative_to_base() {
        let dir = std::env::temp_dir().join(format!("takahashi-cfg-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("prompt.md"), "  Custom rules\n").unwrap();

        let general = GeneralConfig {
            system_prompt_file: Some("prompt.md".to_string()),
            ..Default::default()
        };
        assert_eq!(
            resolve_system_prompt(&general, Some(&dir)).as_deref(),
            Some("Custom rules")
        );

        let missing = GeneralConfig {
            system_prompt_file: Some("absent.md".to_string()),
            ..Default::default()
        };
        assert!(resolve_system_prompt(&missing, Some(&dir)).is_none());
        fs::remove_dir_all(&dir).unwrap();
    }
}
