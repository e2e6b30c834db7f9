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

//! Depth map normalization.
//!
//! A depth map as stored in the container rarely uses the full 8-bit range,
//! which makes it look flat when displayed. A normalization strategy rescales
//! the luminance channel in place; the strategies live in a
//! [`NormalizerRegistry`] keyed by name, and the registry returned by
//! [`NormalizerRegistry::global`] is shared by the whole process.
//!
//! Every strategy starts from the depth map as it was parsed, never from an
//! earlier normalized result.

use std::{
    collections::HashMap,
    panic::{catch_unwind, AssertUnwindSafe},
    sync::{Arc, LazyLock, Mutex, MutexGuard},
};

use base64::{engine::general_purpose, Engine as _};
use log::{debug, error};

use crate::{
    image_codec::{DecodedImage, ImageCodec, PixelBuffer},
    metadata::Depth,
    utils::data_uri,
    Error, Result,
};

/// Name under which [`min_max_normalize`] is registered.
pub const DEFAULT_NORMALIZER: &str = "default";

/// Outcome of running a strategy over a pixel buffer.
pub type StrategyResult = std::result::Result<(), Box<dyn std::error::Error + Send + Sync>>;

/// A pixel transform that rewrites an RGBA buffer in place.
pub type Strategy = Arc<dyn Fn(&mut PixelBuffer, &NormalizeParams) -> StrategyResult + Send + Sync>;

/// Parameters handed to every strategy.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NormalizeParams {
    /// Added to every normalized value before clamping to `0..=255`.
    pub bias: i32,
}

/// Per-call normalization options. Unset fields fall back to the reader settings.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NormalizeOptions {
    pub strategy: Option<String>,
    pub bias: Option<i32>,
    /// Re-derive even if the same strategy was already applied.
    pub force: bool,
}

impl NormalizeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn strategy<S: Into<String>>(mut self, name: S) -> Self {
        self.strategy = Some(name.into());
        self
    }

    pub fn bias(mut self, bias: i32) -> Self {
        self.bias = Some(bias);
        self
    }

    pub fn force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }
}

/// Stretch channel 0 over the full `0..=255` range and write the result to
/// the R, G and B channels. Alpha is untouched.
///
/// The lower bound is widened by one so the spread is never zero; a map with
/// a single depth value therefore becomes uniformly 255.
pub fn min_max_normalize(pixels: &mut PixelBuffer, params: &NormalizeParams) -> StrategyResult {
    let Some((min, max)) = pixels.pixels().fold(None, |acc, px| {
        let v = px[0];
        Some(match acc {
            None => (v, v),
            Some((lo, hi)) => (v.min(lo), v.max(hi)),
        })
    }) else {
        // zero-sized image
        return Ok(());
    };

    let floor = f64::from(min) - 1.0;
    let spread = f64::from(max) - floor;
    let mut last: Option<(u8, u8)> = None;

    for px in pixels.pixels_mut() {
        let value = px[0];
        let norm = match last {
            Some((prev, norm)) if prev == value => norm,
            _ => {
                let scaled = ((f64::from(value) - floor) / spread * 255.0).round() as i32;
                let norm = (scaled + params.bias).clamp(0, 255) as u8;
                last = Some((value, norm));
                norm
            }
        };
        px[0] = norm;
        px[1] = norm;
        px[2] = norm;
    }
    Ok(())
}

/// Named normalization strategies.
pub struct NormalizerRegistry {
    strategies: Mutex<HashMap<String, Strategy>>,
}

static GLOBAL_REGISTRY: LazyLock<Arc<NormalizerRegistry>> =
    LazyLock::new(|| Arc::new(NormalizerRegistry::new()));

impl NormalizerRegistry {
    /// A registry holding only the [`DEFAULT_NORMALIZER`].
    pub fn new() -> Self {
        let mut strategies: HashMap<String, Strategy> = HashMap::new();
        strategies.insert(DEFAULT_NORMALIZER.to_owned(), Arc::new(min_max_normalize));
        Self {
            strategies: Mutex::new(strategies),
        }
    }

    /// The process-wide registry.
    pub fn global() -> Arc<NormalizerRegistry> {
        Arc::clone(&GLOBAL_REGISTRY)
    }

    // A strategy that panicked while holding the lock cannot leave the map
    // half-updated, so a poisoned lock is still usable.
    fn lock(&self) -> MutexGuard<'_, HashMap<String, Strategy>> {
        self.strategies
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Register `strategy` under `name`.
    ///
    /// Fails with [`Error::InvalidNormalizer`] if the name is blank or taken.
    pub fn register<F>(&self, name: &str, strategy: F) -> Result<()>
    where
        F: Fn(&mut PixelBuffer, &NormalizeParams) -> StrategyResult + Send + Sync + 'static,
    {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::InvalidNormalizer("empty name".to_owned()));
        }

        let mut strategies = self.lock();
        if strategies.contains_key(name) {
            return Err(Error::InvalidNormalizer(format!("{name} already registered")));
        }
        strategies.insert(name.to_owned(), Arc::new(strategy));
        debug!("registered normalizer {name}");
        Ok(())
    }

    pub fn get(&self, name: &str) -> Result<Strategy> {
        self.lock()
            .get(name.trim())
            .cloned()
            .ok_or_else(|| Error::NormalizerNotFound(name.to_owned()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.lock().contains_key(name.trim())
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.lock().keys().cloned().collect();
        names.sort();
        names
    }
}

impl Default for NormalizerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for NormalizerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NormalizerRegistry")
            .field("strategies", &self.names())
            .finish()
    }
}

/// Register a strategy on the [global](NormalizerRegistry::global) registry.
pub fn register_normalizer<F>(name: &str, strategy: F) -> Result<()>
where
    F: Fn(&mut PixelBuffer, &NormalizeParams) -> StrategyResult + Send + Sync + 'static,
{
    NormalizerRegistry::global().register(name, strategy)
}

/// Normalize `depth` in place with the strategy `name` and return the new
/// depth map data URI.
///
/// If `name` already produced the current data and `force` is not set, the
/// current data URI is returned unchanged. On any failure `depth` is left as
/// it was.
pub(crate) fn normalize_depth(
    depth: &mut Depth,
    codec: &dyn ImageCodec,
    registry: &NormalizerRegistry,
    name: &str,
    params: &NormalizeParams,
    force: bool,
) -> Result<String> {
    if !force && depth.normalized_with() == Some(name) {
        if let Some(data) = &depth.payload.data {
            return Ok(data.clone());
        }
    }

    let strategy = registry.get(name)?;
    let source = depth
        .original_data()
        .ok_or_else(|| Error::ImageDecode("depth map has no data".to_owned()))?
        .to_owned();

    let (_, bytes) = data_uri::decode(&source)?;
    let DecodedImage { mut pixels, mime } = codec.decode(&bytes)?;

    match catch_unwind(AssertUnwindSafe(|| strategy(&mut pixels, params))) {
        Ok(Ok(())) => {}
        Ok(Err(e)) => {
            error!("normalizer {name} failed: {e}");
            return Err(Error::NormalizerFailed(format!("{name}: {e}")));
        }
        Err(_) => {
            error!("normalizer {name} panicked");
            return Err(Error::NormalizerFailed(format!("{name}: panicked")));
        }
    }

    let encoded = codec.encode(&pixels, &mime)?;
    let uri = data_uri::from_bytes(&mime, &encoded);

    if depth.original.is_none() {
        depth.original = Some(source);
    }
    depth.payload.mime = mime;
    depth.payload.base64_data = Some(general_purpose::STANDARD.encode(&encoded));
    depth.payload.data = Some(uri.clone());
    depth.normalized_with = Some(name.to_owned());

    debug!(
        "normalized {}x{} depth map with {name}",
        pixels.width(),
        pixels.height()
    );
    Ok(uri)
}
