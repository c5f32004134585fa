use serde::Deserialize;
use std::env;
use std::fs;
use std::path::PathBuf;

/// Default config template created when no config exists
const DEFAULT_CONFIG: &str = r#"
[skills]
# Scanned in order; later directories override skills with the same name
directories = ["~/.skillpack/skills", ".skillpack/skills"]

[checklist]
# Platform version rules are evaluated against (e.g. 17 for iOS 17)
# target_version = 17
rulesets = []

[logging]
level = "warn"  # trace, debug, info, warn, error
json = false
"#;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct SkillsConfig {
    #[serde(default)]
    pub directories: Vec<String>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ChecklistConfig {
    #[serde(default)]
    pub target_version: Option<u32>,
    /// Rule sets checked by `skillpack check` when none are given
    #[serde(default)]
    pub rulesets: Vec<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_level")]
    pub level: String,
    #[serde(default)]
    pub json: bool,
}

fn default_level() -> String {
    "warn".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            json: false,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub skills: SkillsConfig,
    #[serde(default)]
    pub checklist: ChecklistConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Get the global config path: ~/.skillpack/skillpack.toml
    fn global_config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".skillpack").join("skillpack.toml"))
    }

    /// Ensure global config directory and file exist, creating defaults if needed
    fn ensure_global_config() -> anyhow::Result<Option<PathBuf>> {
        let Some(config_path) = Self::global_config_path() else {
            return Ok(None);
        };

        if let Some(config_dir) = config_path.parent() {
            if !config_dir.exists() {
                fs::create_dir_all(config_dir)?;
                eprintln!("Created config directory: {}", config_dir.display());
            }
        }

        if !config_path.exists() {
            fs::write(&config_path, DEFAULT_CONFIG.trim())?;
            eprintln!("Created default config: {}", config_path.display());
        }

        Ok(Some(config_path))
    }

    /// Load configuration with layered approach:
    /// 1. Global config: ~/.skillpack/skillpack.toml (auto-created if missing)
    /// 2. Local override: ./skillpack.toml (workspace, optional)
    /// 3. Environment variables (highest priority)
    pub fn load() -> anyhow::Result<Self> {
        // Load .env file from current directory
        dotenvy::dotenv().ok();

        let mut config_builder = config::Config::builder();

        // Layer 1: Global config
        if let Some(global_config_path) = Self::ensure_global_config()? {
            config_builder = config_builder.add_source(config::File::from(global_config_path));
        }

        // Layer 2: Local workspace config (optional override)
        config_builder = config_builder
            .add_source(config::File::with_name("skillpack").required(false))
            // Layer 3: Environment variables with SKILLPACK__ prefix
            .add_source(
                config::Environment::with_prefix("SKILLPACK")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("skills.directories")
                    .with_list_parse_key("checklist.rulesets")
                    .try_parsing(true),
            );

        // Layer 4: Apply convenience env var overrides (highest priority)
        if let Ok(level) = env::var("SKILLPACK_LOG") {
            config_builder = config_builder.set_override("logging.level", level)?;
        }

        if let Ok(version) = env::var("SKILLPACK_TARGET_VERSION") {
            let version: u32 = version.trim().parse().map_err(|e| {
                anyhow::anyhow!("SKILLPACK_TARGET_VERSION must be an integer: {}", e)
            })?;
            config_builder =
                config_builder.set_override("checklist.target_version", i64::from(version))?;
        }

        let config = config_builder.build()?;

        let config: Self = config.try_deserialize()?;
        Ok(config)
    }

    /// Skills directories with a leading `~` expanded to the home directory
    pub fn skill_directories(&self) -> Vec<PathBuf> {
        self.skills
            .directories
            .iter()
            .map(|dir| expand_home(dir))
            .collect()
    }
}

/// Expand a leading `~` to the home directory
pub fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix('~') {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest.trim_start_matches(['/', '\\']));
        }
    }
    PathBuf::from(path)
}
