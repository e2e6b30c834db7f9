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

//! Unified model for the metadata of one depth photo.
//!
//! Serialization follows the interchange contract: snake_case field names,
//! and anything the source dialect never populated is omitted rather than
//! emitted as `null` or `0`. Embedded image bytes are not serialized.

use std::{fmt, str::FromStr};

use serde::Serialize;

use crate::{asset_handlers::jpeg_io::XmpPackets, utils::data_uri, Error, Result};

/// Encoding of depth values in the depth map.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum DepthFormat {
    RangeInverse,
    RangeLinear,
}

impl FromStr for DepthFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "RangeInverse" => Ok(Self::RangeInverse),
            "RangeLinear" => Ok(Self::RangeLinear),
            other => Err(Error::BadParam(format!("unknown depth format {other:?}"))),
        }
    }
}

impl fmt::Display for DepthFormat {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

/// An embedded bitmap: reference image, depth map, raw depth map or
/// confidence map.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ImagePayload {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub mime: String,
    /// Base64 text as found in the XMP.
    #[serde(skip)]
    pub base64_data: Option<String>,
    /// `data:` URI, present only when both `mime` and `base64_data` are.
    #[serde(skip)]
    pub data: Option<String>,
}

impl ImagePayload {
    pub fn new<M, D>(mime: M, base64_data: Option<D>) -> Self
    where
        M: Into<String>,
        D: Into<String>,
    {
        let mut payload = Self {
            mime: mime.into(),
            base64_data: base64_data.map(Into::into).filter(|d| !d.is_empty()),
            data: None,
        };
        payload.make_data_uri();
        payload
    }

    pub(crate) fn make_data_uri(&mut self) {
        self.data = self
            .base64_data
            .as_deref()
            .and_then(|b64| data_uri::encode(&self.mime, b64));
    }

    pub fn has_data_uri(&self) -> bool {
        self.data.is_some()
    }

    /// Nothing at all was found for this payload.
    pub fn is_empty(&self) -> bool {
        self.mime.is_empty() && self.base64_data.is_none()
    }

    /// The embedded bytes, taken from the data URI when there is one.
    pub fn decode(&self) -> Result<Vec<u8>> {
        match (&self.data, &self.base64_data) {
            (Some(uri), _) => data_uri::decode(uri).map(|(_, bytes)| bytes),
            (None, Some(b64)) => data_uri::decode_base64(b64),
            (None, None) => Err(Error::ImageDecode("no image data".to_owned())),
        }
    }
}

/// The depth map and its depth-to-distance calibration.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Depth {
    #[serde(flatten)]
    pub payload: ImagePayload,
    /// Distances are in meters. Always set by Lens Blur.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metric: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<DepthFormat>,
    /// `far >= near` is expected but not guaranteed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub near: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub far: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<ImagePayload>,
    #[serde(skip)]
    pub(crate) normalized_with: Option<String>,
    #[serde(skip)]
    pub(crate) original: Option<String>,
}

impl Depth {
    pub fn is_metric(&self) -> bool {
        self.metric.unwrap_or(false)
    }

    /// Nothing at all was found for the depth map.
    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
            && self.metric.is_none()
            && self.format.is_none()
            && self.near.is_none()
            && self.far.is_none()
            && self.raw.is_none()
    }

    /// Name of the strategy that produced the current `payload.data`.
    pub fn normalized_with(&self) -> Option<&str> {
        self.normalized_with.as_deref()
    }

    pub fn is_normalized(&self) -> bool {
        self.normalized_with.is_some()
    }

    /// The depth map data URI as it was before any normalization.
    pub fn original_data(&self) -> Option<&str> {
        self.original.as_deref().or(self.payload.data.as_deref())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Vendor {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manufacturer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

/// Geographic pose of the device.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct DevicePose {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub altitude: Option<f64>,
}

/// Position and orientation of a camera relative to the device.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct CameraPose {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position_x: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position_y: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position_z: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation_axis_x: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation_axis_y: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation_axis_z: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation_angle: Option<f64>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Device {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vendor: Option<Vendor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pose: Option<DevicePose>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Camera {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vendor: Option<Vendor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pose: Option<CameraPose>,
}

/// Pinhole imaging model of the reference camera.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Perspective {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub focal_length_x: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub focal_length_y: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub principal_point_x: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub principal_point_y: Option<f64>,
}

/// Lens Blur focus settings.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Focus {
    pub focal_point_x: f64,
    pub focal_point_y: f64,
    pub focal_distance: f64,
    pub blur_at_infinity: f64,
}

/// Everything extracted from one XDM or Lens Blur JPEG.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ContainerMetadata {
    pub is_xdm: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revision: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device: Option<Device>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub camera: Option<Camera>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub perspective: Option<Perspective>,
    #[serde(skip_serializing_if = "Depth::is_empty")]
    pub depth: Depth,
    #[serde(skip_serializing_if = "ImagePayload::is_empty")]
    pub image: ImagePayload,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<ImagePayload>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub focus: Option<Focus>,
    /// Reassembled XMP, retained when `reader.keep_xmp` is set.
    #[serde(skip)]
    pub xmp: Option<XmpPackets>,
}

impl ContainerMetadata {
    /// Materialize the data URI of every payload.
    pub(crate) fn make_data_uris(&mut self) {
        self.image.make_data_uri();
        self.depth.payload.make_data_uri();
        if let Some(raw) = self.depth.raw.as_mut() {
            raw.make_data_uri();
        }
        if let Some(confidence) = self.confidence.as_mut() {
            confidence.make_data_uri();
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl fmt::Display for ContainerMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let json = self.to_json().map_err(|_| fmt::Error)?;
        f.write_str(&json)
    }
}
