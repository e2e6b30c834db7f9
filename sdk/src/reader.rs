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

use std::sync::Arc;

use log::debug;

use crate::{
    asset_handlers::jpeg_io::XmpPackets,
    dialect::parse_packets,
    image_codec::{ImageCodec, RasterCodec},
    loader::{ByteLoader, DefaultLoader},
    metadata::ContainerMetadata,
    normalizer::{normalize_depth, NormalizeOptions, NormalizeParams, NormalizerRegistry},
    settings::Settings,
    Result,
};

/// Reads depth photo metadata from XDM and Lens Blur JPEGs.
///
/// A reader holds no per-image state and may be shared between tasks. The
/// collaborators it uses can be replaced with the `with_*` methods.
///
/// # Example
/// ```no_run
/// use depth_reader::{DepthReader, NormalizeOptions};
///
/// # async fn run() -> depth_reader::Result<()> {
/// let reader = DepthReader::new();
/// let mut metadata = reader.load("photo.jpg").await?;
/// println!("{metadata}");
///
/// let depth_uri = reader.normalize_depth_map(&mut metadata, &NormalizeOptions::new())?;
/// assert!(depth_uri.starts_with("data:"));
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct DepthReader {
    settings: Settings,
    loader: Option<Arc<dyn ByteLoader>>,
    codec: Arc<dyn ImageCodec>,
    registry: Arc<NormalizerRegistry>,
}

impl DepthReader {
    /// A reader with default settings and the global normalizer registry.
    pub fn new() -> Self {
        Self {
            settings: Settings::default(),
            loader: None,
            codec: Arc::new(RasterCodec),
            registry: NormalizerRegistry::global(),
        }
    }

    pub fn with_settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    /// Replace the loader used by [`DepthReader::load`].
    ///
    /// A custom loader is not subject to `loader.allowed_schemes`.
    pub fn with_loader<L: ByteLoader + 'static>(mut self, loader: L) -> Self {
        self.loader = Some(Arc::new(loader));
        self
    }

    pub fn with_codec<C: ImageCodec + 'static>(mut self, codec: C) -> Self {
        self.codec = Arc::new(codec);
        self
    }

    /// Use `registry` instead of the global one.
    pub fn with_registry(mut self, registry: Arc<NormalizerRegistry>) -> Self {
        self.registry = registry;
        self
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn registry(&self) -> &NormalizerRegistry {
        &self.registry
    }

    /// Parse the metadata of an in-memory JPEG.
    pub fn parse_bytes(&self, bytes: &[u8]) -> Result<ContainerMetadata> {
        let packets = XmpPackets::from_jpeg(bytes)?;
        let mut metadata = parse_packets(&packets)?;
        debug!(
            "parsed {} container ({} bytes)",
            if metadata.is_xdm { "XDM" } else { "Lens Blur" },
            bytes.len()
        );

        if self.settings.reader.keep_xmp {
            metadata.xmp = Some(packets);
        }
        Ok(metadata)
    }

    /// Fetch `location` (a path, `file://` or `http(s)://` URL) and parse it.
    pub async fn load(&self, location: &str) -> Result<ContainerMetadata> {
        let bytes = match &self.loader {
            Some(loader) => loader.load(location).await?,
            None => {
                DefaultLoader::new(&self.settings.loader.allowed_schemes)
                    .load(location)
                    .await?
            }
        };
        self.parse_bytes(&bytes)
    }

    /// Normalize the depth map of `metadata` and return its new data URI.
    ///
    /// Options not set fall back to the `normalizer` settings. Repeating a
    /// call with the same strategy returns the cached result unless
    /// [`NormalizeOptions::force`] is set. On failure the depth map is left
    /// untouched.
    pub fn normalize_depth_map(
        &self,
        metadata: &mut ContainerMetadata,
        options: &NormalizeOptions,
    ) -> Result<String> {
        let name = options
            .strategy
            .as_deref()
            .unwrap_or(&self.settings.normalizer.default_strategy);
        let params = NormalizeParams {
            bias: options.bias.unwrap_or(self.settings.normalizer.bias),
        };

        normalize_depth(
            &mut metadata.depth,
            self.codec.as_ref(),
            &self.registry,
            name,
            &params,
            options.force,
        )
    }
}

impl Default for DepthReader {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for DepthReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DepthReader")
            .field("settings", &self.settings)
            .field("custom_loader", &self.loader.is_some())
            .field("registry", &self.registry)
            .finish()
    }
}
