// Copyright 2025 Adobe. All rights reserved.
// This file is licensed to you under the Apache License,
// Version 2.0 (http://www.apache.org/licenses/LICENSE-2.0)
// or the MIT license (http://opensource.org/licenses/MIT),
// at your option.

// Unless required by applicable law or agreed to in writing,
// this software is distributed on an "AS IS" BASIS, WITHOUT
// WARRANTIES OR REPRESENTATIONS OF ANY KIND, either express or
// implied. See the LICENSE-MIT and LICENSE-APACHE files for the
// specific language governing permissions and limitations under
// each license.

use std::path::Path;

use config::{Config, FileFormat};
use serde_derive::{Deserialize, Serialize};

use crate::{normalizer::DEFAULT_NORMALIZER, Error, Result};

const VERSION: u32 = 1;
const MAX_BIAS: i32 = 255;

pub(crate) trait SettingsValidate {
    // returns error if settings are invalid
    fn validate(&self) -> Result<()> {
        Ok(())
    }
}

/// Settings for parsing containers.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct ReaderSettings {
    /// Retain the reassembled XMP packets on [`ContainerMetadata::xmp`].
    ///
    /// [`ContainerMetadata::xmp`]: crate::ContainerMetadata::xmp
    pub keep_xmp: bool,
}

impl SettingsValidate for ReaderSettings {}

/// Settings for depth map normalization.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct NormalizerSettings {
    /// Strategy used when a call does not name one.
    pub default_strategy: String,
    /// Added to every normalized value, then clamped to `0..=255`.
    pub bias: i32,
}

impl Default for NormalizerSettings {
    fn default() -> Self {
        Self {
            default_strategy: DEFAULT_NORMALIZER.to_owned(),
            bias: 0,
        }
    }
}

impl SettingsValidate for NormalizerSettings {
    fn validate(&self) -> Result<()> {
        if self.default_strategy.trim().is_empty() {
            return Err(Error::BadParam(
                "normalizer.default_strategy must not be empty".into(),
            ));
        }
        if !(-MAX_BIAS..=MAX_BIAS).contains(&self.bias) {
            return Err(Error::BadParam(format!(
                "normalizer.bias must be within -{MAX_BIAS}..={MAX_BIAS}"
            )));
        }
        Ok(())
    }
}

/// Settings for [`DepthReader::load`](crate::DepthReader::load).
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct LoaderSettings {
    /// URL schemes the default loader accepts. Plain paths count as `file`.
    pub allowed_schemes: Vec<String>,
}

impl Default for LoaderSettings {
    fn default() -> Self {
        Self {
            allowed_schemes: vec!["file".into(), "http".into(), "https".into()],
        }
    }
}

impl SettingsValidate for LoaderSettings {
    fn validate(&self) -> Result<()> {
        if self.allowed_schemes.iter().any(|s| s.trim().is_empty()) {
            return Err(Error::BadParam(
                "loader.allowed_schemes must not contain empty entries".into(),
            ));
        }
        Ok(())
    }
}

/// Reader configuration.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Settings {
    /// Version of the configuration.
    pub version: u32,
    pub reader: ReaderSettings,
    pub normalizer: NormalizerSettings,
    pub loader: LoaderSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: VERSION,
            reader: ReaderSettings::default(),
            normalizer: NormalizerSettings::default(),
            loader: LoaderSettings::default(),
        }
    }
}

impl SettingsValidate for Settings {
    fn validate(&self) -> Result<()> {
        if self.version != VERSION {
            return Err(Error::BadParam(format!(
                "settings version {} is not supported",
                self.version
            )));
        }
        self.reader.validate()?;
        self.normalizer.validate()?;
        self.loader.validate()
    }
}

fn file_format(format: &str) -> Result<FileFormat> {
    match format.to_lowercase().as_str() {
        "json" => Ok(FileFormat::Json),
        "toml" => Ok(FileFormat::Toml),
        _ => Err(Error::UnsupportedType),
    }
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load [Settings] from a file. The format is taken from the extension.
    pub fn from_file<P: AsRef<Path>>(settings_path: P) -> Result<Self> {
        let ext = settings_path
            .as_ref()
            .extension()
            .ok_or(Error::UnsupportedType)?
            .to_string_lossy();

        let setting_buf = std::fs::read(&settings_path).map_err(Error::IoError)?;
        Settings::from_string(&String::from_utf8_lossy(&setting_buf), &ext)
    }

    /// Load [Settings] from a string, overlaid on the defaults.
    /// Format of configuration must be supplied (json or toml).
    pub fn from_string(settings_str: &str, format: &str) -> Result<Self> {
        let mut settings = Settings::default();
        settings.update_from_str(settings_str, format)?;
        Ok(settings)
    }

    pub fn from_toml(toml: &str) -> Result<Self> {
        Settings::from_string(toml, "toml")
    }

    /// Overlay a configuration string on top of this instance.
    ///
    /// The result is validated before it is committed; on error `self` is
    /// unchanged.
    ///
    /// # Example
    /// ```
    /// use depth_reader::settings::Settings;
    ///
    /// let mut settings = Settings::default();
    /// settings
    ///     .update_from_str(
    ///         r#"
    ///     [normalizer]
    ///     bias = 12
    /// "#,
    ///         "toml",
    ///     )
    ///     .unwrap();
    ///
    /// assert_eq!(settings.normalizer.bias, 12);
    /// assert_eq!(settings.normalizer.default_strategy, "default");
    /// ```
    pub fn update_from_str(&mut self, settings_str: &str, format: &str) -> Result<()> {
        let file_format = file_format(format)?;

        let current_config = Config::try_from(&*self)
            .map_err(|e| Error::BadParam(format!("could not convert settings: {e}")))?;

        let merged_config = Config::builder()
            .add_source(current_config)
            .add_source(config::File::from_str(settings_str, file_format))
            .build()
            .map_err(|e| Error::BadParam(format!("could not merge configuration: {e}")))?;

        let updated_settings = merged_config
            .try_deserialize::<Settings>()
            .map_err(|e| Error::BadParam(e.to_string()))?;

        updated_settings.validate()?;

        *self = updated_settings;
        Ok(())
    }

    /// Builder form of [`Settings::update_from_str`] for JSON.
    pub fn with_json(mut self, json: &str) -> Result<Self> {
        self.update_from_str(json, "json")?;
        Ok(self)
    }

    /// Builder form of [`Settings::update_from_str`] for TOML.
    pub fn with_toml(mut self, toml: &str) -> Result<Self> {
        self.update_from_str(toml, "toml")?;
        Ok(self)
    }

    /// Set a value by its dotted path, for example `"normalizer.bias"`.
    pub fn with_value<T: Into<config::Value>>(mut self, value_path: &str, value: T) -> Result<Self> {
        let current_config = Config::try_from(&self)
            .map_err(|e| Error::BadParam(format!("could not convert settings: {e}")))?;

        let updated = Config::builder()
            .add_source(current_config)
            .set_override(value_path, value)
            .and_then(|builder| builder.build())
            .map_err(|e| Error::BadParam(format!("could not set {value_path}: {e}")))?;

        let settings = updated
            .try_deserialize::<Settings>()
            .map_err(|e| Error::BadParam(e.to_string()))?;
        settings.validate()?;

        self = settings;
        Ok(self)
    }
}
