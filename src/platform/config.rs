// perfsplit - platform/config.rs
//
// config.toml location and loading with startup validation.
//
// Uses the `directories` crate for XDG (Linux), AppData (Windows),
// Library (macOS) compliance. Command-line flags override whatever is
// loaded here; that merge happens in main.rs.

use crate::core::export::is_file_name_safe;
use crate::util::constants;
use crate::util::error::ConfigError;
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

// Loading runs before the logging subscriber exists (the log level comes
// from the config), so nothing here logs. What happened is reported back in
// `LoadedConfig` for the caller to log once logging is up.

/// Platform default location of config.toml, if one can be determined.
pub fn default_config_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", constants::APP_ID)
        .map(|dirs| dirs.config_dir().join(constants::CONFIG_FILE_NAME))
}

// =============================================================================
// Raw TOML shape
// =============================================================================

/// Raw deserialisable shape of config.toml.
///
/// Unknown keys are silently ignored for forward compatibility.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct RawConfig {
    pub discovery: DiscoverySection,
    pub classifier: ClassifierSection,
    pub export: ExportSection,
    pub parsing: ParsingSection,
    pub logging: LoggingSection,
}

/// `[discovery]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct DiscoverySection {
    pub max_depth: Option<usize>,
    pub include_patterns: Option<Vec<String>>,
    pub exclude_patterns: Option<Vec<String>>,
}

/// `[classifier]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct ClassifierSection {
    /// Regex with a named `ip` group.
    pub pattern: Option<String>,
}

/// `[export]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct ExportSection {
    pub file_prefix: Option<String>,
    pub unclassified_name: Option<String>,
    /// Write into a timestamped subdirectory of the root (default true).
    pub timestamped_dir: Option<bool>,
}

/// `[parsing]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct ParsingSection {
    /// Number of worker threads (0 = auto).
    pub worker_threads: Option<usize>,
}

/// `[logging]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level: "error", "warn", "info", "debug", "trace".
    pub level: Option<String>,
}

// =============================================================================
// Validated configuration
// =============================================================================

/// Validated run configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitConfig {
    pub include_patterns: Vec<String>,
    pub exclude_patterns: Vec<String>,
    pub max_depth: usize,
    pub ip_pattern: String,
    pub file_prefix: String,
    pub unclassified_name: String,
    pub timestamped_dir: bool,
    pub worker_threads: usize,
    pub log_level: Option<String>,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            include_patterns: to_strings(constants::DEFAULT_INCLUDE_PATTERNS),
            exclude_patterns: to_strings(constants::DEFAULT_EXCLUDE_PATTERNS),
            max_depth: constants::DEFAULT_MAX_DEPTH,
            ip_pattern: constants::DEFAULT_IP_PATTERN.to_string(),
            file_prefix: constants::DEFAULT_FILE_PREFIX.to_string(),
            unclassified_name: constants::DEFAULT_UNCLASSIFIED_NAME.to_string(),
            timestamped_dir: true,
            worker_threads: constants::DEFAULT_WORKER_THREADS,
            log_level: None,
        }
    }
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}

// =============================================================================
// Loading
// =============================================================================

/// Result of loading configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedConfig {
    pub config: SplitConfig,

    /// Non-fatal problems: invalid values replaced by defaults, or an
    /// unusable default-location file.
    pub warnings: Vec<String>,

    /// The file the configuration was read from; `None` means defaults.
    pub source: Option<PathBuf>,
}

impl LoadedConfig {
    fn defaults(warnings: Vec<String>) -> Self {
        Self {
            config: SplitConfig::default(),
            warnings,
            source: None,
        }
    }
}

/// Load configuration.
///
/// An `explicit` path must exist and parse; any failure is returned as an
/// error. Without one, the platform default is used: a missing file means
/// defaults, an unreadable or unparseable one means defaults plus a warning.
pub fn load_config(explicit: Option<&Path>) -> Result<LoadedConfig, ConfigError> {
    if let Some(path) = explicit {
        return load_config_file(path);
    }

    let Some(path) = default_config_path() else {
        return Ok(LoadedConfig::defaults(Vec::new()));
    };

    if !path.exists() {
        return Ok(LoadedConfig::defaults(Vec::new()));
    }

    match load_config_file(&path) {
        Ok(loaded) => Ok(loaded),
        Err(e) => Ok(LoadedConfig::defaults(vec![format!("{e}. Using defaults.")])),
    }
}

/// Read and validate the config file at `path`.
pub fn load_config_file(path: &Path) -> Result<LoadedConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    let (config, warnings) = parse_config(&content, path)?;
    Ok(LoadedConfig {
        config,
        warnings,
        source: Some(path.to_path_buf()),
    })
}

/// Parse config.toml content. `path` is used for error context only.
pub fn parse_config(
    content: &str,
    path: &Path,
) -> Result<(SplitConfig, Vec<String>), ConfigError> {
    let raw: RawConfig = toml::from_str(content).map_err(|e| ConfigError::TomlParse {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(validate(raw))
}

/// Validate each field against named constants, accumulating all warnings.
/// Invalid values fall back to defaults.
pub fn validate(raw: RawConfig) -> (SplitConfig, Vec<String>) {
    let mut config = SplitConfig::default();
    let mut warnings: Vec<String> = Vec::new();

    // -- Discovery --
    if let Some(depth) = raw.discovery.max_depth {
        if (1..=constants::ABSOLUTE_MAX_DEPTH).contains(&depth) {
            config.max_depth = depth;
        } else {
            warnings.push(format!(
                "[discovery] max_depth = {depth} is out of range (1-{}). Using default ({}).",
                constants::ABSOLUTE_MAX_DEPTH,
                constants::DEFAULT_MAX_DEPTH,
            ));
        }
    }

    if let Some(patterns) = raw.discovery.include_patterns {
        if patterns.is_empty() {
            warnings.push(
                "[discovery] include_patterns is empty, which would match every file. \
                 Using default."
                    .to_string(),
            );
        } else {
            config.include_patterns = patterns;
        }
    }

    if let Some(patterns) = raw.discovery.exclude_patterns {
        config.exclude_patterns = patterns;
    }

    // -- Classifier --
    // Compiled (and rejected if invalid) by the classifier at startup.
    if let Some(pattern) = raw.classifier.pattern {
        config.ip_pattern = pattern;
    }

    // -- Export --
    if let Some(prefix) = raw.export.file_prefix {
        if is_file_name_safe(&prefix) {
            config.file_prefix = prefix;
        } else {
            warnings.push(format!(
                "[export] file_prefix = \"{prefix}\" must be non-empty and contain no path \
                 separators. Using default ({}).",
                constants::DEFAULT_FILE_PREFIX,
            ));
        }
    }

    if let Some(name) = raw.export.unclassified_name {
        if is_file_name_safe(&name) {
            config.unclassified_name = name;
        } else {
            warnings.push(format!(
                "[export] unclassified_name = \"{name}\" must be non-empty and contain no path \
                 separators. Using default ({}).",
                constants::DEFAULT_UNCLASSIFIED_NAME,
            ));
        }
    }

    if let Some(timestamped) = raw.export.timestamped_dir {
        config.timestamped_dir = timestamped;
    }

    // -- Parsing --
    if let Some(threads) = raw.parsing.worker_threads {
        if threads <= constants::ABSOLUTE_MAX_WORKER_THREADS {
            config.worker_threads = threads;
        } else {
            warnings.push(format!(
                "[parsing] worker_threads = {threads} is out of range (0-{}). Using default (auto).",
                constants::ABSOLUTE_MAX_WORKER_THREADS,
            ));
        }
    }

    // -- Logging --
    if let Some(level) = raw.logging.level {
        let valid = ["error", "warn", "info", "debug", "trace"];
        if valid.contains(&level.to_lowercase().as_str()) {
            config.log_level = Some(level);
        } else {
            warnings.push(format!(
                "[logging] level = \"{level}\" is not recognised. \
                 Valid values: error, warn, info, debug, trace. Using default (info).",
            ));
        }
    }

    (config, warnings)
}
