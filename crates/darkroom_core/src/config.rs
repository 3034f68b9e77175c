//! Pipeline configuration.
//!
//! Configuration is layered with later sources taking precedence:
//! 1. Bundled defaults (darkroom.toml shipped with the library)
//! 2. `~/.config/darkroom/darkroom.toml`
//! 3. `./darkroom.toml`
//! 4. `DARKROOM__<SECTION>__<KEY>` environment variables

use crate::Capabilities;
use darkroom_error::{ConfigError, ConfigErrorKind, DarkroomError, DarkroomResult};
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, instrument};

const DEFAULT_CONFIG: &str = include_str!("../../../darkroom.toml");

/// A bounding box. A zero bound leaves that axis unconstrained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoxSize {
    /// Maximum width, 0 for unbounded
    pub width: u32,
    /// Maximum height, 0 for unbounded
    pub height: u32,
}

impl BoxSize {
    /// Create a box.
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// The box at double density.
    pub const fn doubled(&self) -> Self {
        Self {
            width: self.width * 2,
            height: self.height * 2,
        }
    }
}

/// Nominal variant boxes and encoding settings.
///
/// ```toml
/// [variants]
/// jpeg_quality = 90
/// thumb_2x = true
///
/// [variants.small]
/// width = 0
/// height = 360
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantSettings {
    /// Square thumbnail box
    pub thumb: BoxSize,
    /// Small box
    pub small: BoxSize,
    /// Medium box
    pub medium: BoxSize,
    /// Whether `thumb2x` is produced
    #[serde(default = "default_true")]
    pub thumb_2x: bool,
    /// Whether `small2x` is produced
    #[serde(default = "default_true")]
    pub small_2x: bool,
    /// Whether `medium2x` is produced
    #[serde(default = "default_true")]
    pub medium_2x: bool,
    /// JPEG quality of derived variants (1..=100)
    #[serde(default = "default_quality")]
    pub jpeg_quality: u8,
}

fn default_true() -> bool {
    true
}

fn default_quality() -> u8 {
    90
}

impl Default for VariantSettings {
    fn default() -> Self {
        Self {
            thumb: BoxSize::new(200, 200),
            small: BoxSize::new(0, 360),
            medium: BoxSize::new(1920, 1080),
            thumb_2x: true,
            small_2x: true,
            medium_2x: true,
            jpeg_quality: default_quality(),
        }
    }
}

impl VariantSettings {
    /// Check that the settings describe producible variants.
    pub fn validate(&self) -> DarkroomResult<()> {
        if self.thumb.width != self.thumb.height || self.thumb.width == 0 {
            return Err(ConfigError::new(ConfigErrorKind::NonSquareThumb {
                width: self.thumb.width,
                height: self.thumb.height,
            })
            .into());
        }
        for (name, size) in [("small", self.small), ("medium", self.medium)] {
            if size.width == 0 && size.height == 0 {
                return Err(ConfigError::new(ConfigErrorKind::EmptyBox(name.to_string())).into());
            }
        }
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(
                ConfigError::new(ConfigErrorKind::QualityOutOfRange(self.jpeg_quality)).into(),
            );
        }
        Ok(())
    }
}

/// Where originals and variants are written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageSettings {
    /// Root directory of the file store
    pub root: PathBuf,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            root: PathBuf::from("uploads"),
        }
    }
}

/// Defaults for the `generate-thumbs` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackfillSettings {
    /// Maximum records per run
    pub amount: usize,
    /// Time budget per run in seconds
    pub timeout_secs: u64,
}

impl BackfillSettings {
    /// The time budget.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for BackfillSettings {
    fn default() -> Self {
        Self {
            amount: 100,
            timeout_secs: 600,
        }
    }
}

/// Database connection settings.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DatabaseSettings {
    /// Connection URL; falls back to `DATABASE_URL` when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Top-level configuration.
///
/// # Example
///
/// ```no_run
/// use darkroom_core::DarkroomConfig;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = DarkroomConfig::load()?;
/// println!("small box: {:?}", config.variants.small);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DarkroomConfig {
    /// Optional external tools
    #[serde(default)]
    pub capabilities: Capabilities,
    /// Variant boxes
    #[serde(default)]
    pub variants: VariantSettings,
    /// File store
    #[serde(default)]
    pub storage: StorageSettings,
    /// Backfill defaults
    #[serde(default)]
    pub backfill: BackfillSettings,
    /// Database
    #[serde(default)]
    pub database: DatabaseSettings,
}

impl DarkroomConfig {
    /// Load configuration from a single file layered over the bundled defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<std::path::Path>) -> DarkroomResult<Self> {
        debug!("Loading configuration from file");

        let config: Self = Config::builder()
            .add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml))
            .add_source(File::from(path.as_ref()))
            .build()
            .map_err(|e| {
                DarkroomError::from(ConfigError::new(ConfigErrorKind::Load {
                    layer: path.as_ref().display().to_string(),
                    reason: e.to_string(),
                }))
            })?
            .try_deserialize()
            .map_err(|e| {
                DarkroomError::from(ConfigError::new(ConfigErrorKind::Parse(e.to_string())))
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration with precedence: environment > current dir > home dir > bundled.
    ///
    /// User config files are optional and silently skipped if not found.
    #[instrument]
    pub fn load() -> DarkroomResult<Self> {
        debug!("Loading configuration with precedence: env > current dir > home dir > bundled");

        let mut builder =
            Config::builder().add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml));

        if let Some(home) = dirs::home_dir() {
            let home_config = home.join(".config/darkroom/darkroom.toml");
            builder = builder.add_source(File::from(home_config).required(false));
        }

        builder = builder
            .add_source(File::with_name("darkroom").required(false))
            .add_source(
                Environment::with_prefix("DARKROOM")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            );

        let config: Self = builder
            .build()
            .map_err(|e| {
                DarkroomError::from(ConfigError::new(ConfigErrorKind::Load {
                    layer: "layered sources".to_string(),
                    reason: e.to_string(),
                }))
            })?
            .try_deserialize()
            .map_err(|e| {
                DarkroomError::from(ConfigError::new(ConfigErrorKind::Parse(e.to_string())))
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Validate every section.
    pub fn validate(&self) -> DarkroomResult<()> {
        self.variants.validate()
    }
}
