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

//! Detects which depth photo dialect an XMP pair carries and maps it into
//! [`ContainerMetadata`].

use log::debug;
use roxmltree::Node;

use crate::{
    asset_handlers::jpeg_io::XmpPackets,
    metadata::ContainerMetadata,
    utils::xmp_inmemory_utils::{description_node, namespace, parse_xmp},
    Error, Result,
};

mod lens_blur;
mod xdm;

const XDM_DOMAIN: &str = "xdm.org";

// older writers used `GImage`
const IMAGE_PREFIXES: [&str; 2] = ["Image", "GImage"];

/// Depth photo metadata conventions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Dialect {
    /// Extensible Device Metadata.
    Xdm,
    /// Google Lens Blur (`GDepth` / `GFocus`).
    LensBlur,
}

impl Dialect {
    /// Detect the dialect from the image namespace declared on the extended
    /// XMP description node.
    pub(crate) fn detect(ext_desc: Node) -> Self {
        match image_namespace(ext_desc) {
            Some(ns) if ns.contains(XDM_DOMAIN) => Dialect::Xdm,
            _ => Dialect::LensBlur,
        }
    }
}

fn image_namespace<'a>(desc: Node<'a, '_>) -> Option<&'a str> {
    IMAGE_PREFIXES
        .iter()
        .find_map(|prefix| namespace(desc, prefix))
}

/// Parse reassembled XMP packets into [`ContainerMetadata`].
///
/// The extended packet is required by both dialects; the standard packet
/// is only required for Lens Blur. A non-empty packet that is not
/// well-formed fails the whole parse.
pub fn parse_packets(packets: &XmpPackets) -> Result<ContainerMetadata> {
    let standard = parse_xmp(&packets.standard)?;
    let extended = parse_xmp(&packets.extended)?;

    let std_desc = standard.as_ref().map(description_node).transpose()?;
    let ext_desc = extended
        .as_ref()
        .map(description_node)
        .transpose()?
        .ok_or_else(|| Error::XmpParse("no extended XMP found".to_owned()))?;

    let image_ns = image_namespace(ext_desc);
    let dialect = Dialect::detect(ext_desc);
    debug!("detected {dialect:?} metadata (image namespace {image_ns:?})");

    let mut metadata = match dialect {
        Dialect::Xdm => xdm::parse(ext_desc, image_ns),
        Dialect::LensBlur => {
            let std_desc =
                std_desc.ok_or_else(|| Error::XmpParse("no standard XMP found".to_owned()))?;
            lens_blur::parse(ext_desc, std_desc, image_ns)
        }
    };
    metadata.make_data_uris();
    Ok(metadata)
}

// keep only structs with at least one populated field
fn populated<T: Default + PartialEq>(value: T) -> Option<T> {
    (value != T::default()).then_some(value)
}
