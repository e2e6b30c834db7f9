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

use thiserror::Error;

use crate::loader::LoadError;

/// `Error` enumerates errors returned by depth reader operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    // --- container errors ---
    /// The input does not start with the JPEG start-of-image marker.
    #[error("not a JPEG image")]
    NotJpeg,

    /// An XMP packet is not well-formed XML, or its `rdf:Description`
    /// node could not be located.
    #[error("cannot parse the XMP XML: {0}")]
    XmpParse(String),

    // --- image errors ---
    /// An embedded image could not be decoded as a raster image.
    #[error("cannot load image: {0}")]
    ImageDecode(String),

    #[error("cannot encode image: {0}")]
    ImageEncode(String),

    // --- normalizer errors ---
    /// A normalizer was registered with a blank or already used name.
    #[error("invalid name/function: {0}")]
    InvalidNormalizer(String),

    #[error("normalizer not registered: {0}")]
    NormalizerNotFound(String),

    /// A registered normalizer reported a failure or panicked.
    #[error("normalizer failed: {0}")]
    NormalizerFailed(String),

    // --- configuration errors ---
    #[error("bad parameter: {0}")]
    BadParam(String),

    #[error("type is unsupported")]
    UnsupportedType,

    // --- third-party errors ---
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    IoError(#[from] std::io::Error),

    #[error(transparent)]
    JsonError(#[from] serde_json::Error),
}

/// A specialized `Result` type for depth reader operations.
pub type Result<T> = std::result::Result<T, Error>;
