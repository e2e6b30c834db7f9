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

#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::unwrap_used)]

//! This library reads the depth photo metadata embedded in the XMP of JPEG
//! images written in the XDM (eXtensible Device Metadata) or Google Lens
//! Blur dialects, and turns the embedded depth map into a viewable
//! grayscale image.
//!
//! # Example: Reading a depth photo
//!
//! ```no_run
//! # use depth_reader::Result;
//! use depth_reader::{DepthReader, NormalizeOptions};
//!
//! # fn main() -> Result<()> {
//! let bytes = std::fs::read("tests/fixtures/depth.jpg")?;
//!
//! let reader = DepthReader::new();
//! let mut metadata = reader.parse_bytes(&bytes)?;
//! println!("{metadata}");
//!
//! if metadata.depth.payload.has_data_uri() {
//!     let normalized = reader.normalize_depth_map(&mut metadata, &NormalizeOptions::new())?;
//!     println!("{normalized}");
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Example: Registering a normalizer
//!
//! ```
//! use depth_reader::{register_normalizer, NormalizeOptions};
//!
//! register_normalizer("invert", |pixels, _params| {
//!     for px in pixels.pixels_mut() {
//!         px[0] = 255 - px[0];
//!         px[1] = px[0];
//!         px[2] = px[0];
//!     }
//!     Ok(())
//! })?;
//!
//! let options = NormalizeOptions::new().strategy("invert");
//! # let _ = options;
//! # Ok::<(), depth_reader::Error>(())
//! ```

/// The internal name of the depth reader library.
pub const NAME: &str = "depth-reader";

/// The version of this depth reader library.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod asset_handlers;
pub mod dialect;
pub(crate) mod error;
pub mod image_codec;
pub mod loader;
pub mod metadata;
pub mod normalizer;
pub(crate) mod reader;
pub mod settings;
pub mod utils;

pub use asset_handlers::jpeg_io::{scan_segments, RawSegment, SegmentKind, XmpPackets};
pub use dialect::{parse_packets, Dialect};
pub use error::{Error, Result};
pub use image_codec::{ImageCodec, PixelBuffer, RasterCodec};
#[cfg(feature = "http_reqwest")]
pub use loader::HttpLoader;
pub use loader::{ByteLoader, DefaultLoader, FileLoader, LoadError};
pub use metadata::{
    Camera, CameraPose, ContainerMetadata, Depth, DepthFormat, Device, DevicePose, Focus,
    ImagePayload, Perspective, Vendor,
};
pub use normalizer::{
    min_max_normalize, register_normalizer, NormalizeOptions, NormalizeParams,
    NormalizerRegistry, Strategy, StrategyResult, DEFAULT_NORMALIZER,
};
pub use reader::DepthReader;
pub use settings::Settings;
pub use utils::data_uri;
