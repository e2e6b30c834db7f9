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

use log::warn;
use roxmltree::Node;

use super::image_namespace;
use crate::{
    metadata::{ContainerMetadata, Depth, DepthFormat, Focus, ImagePayload},
    utils::xmp_inmemory_utils::{namespace, parse_float, FieldSource},
};

const GFOCUS: &str = "GFocus";
const GDEPTH: &str = "GDepth";

/// Lens Blur stores every property as an attribute. Writers put the small
/// properties in the standard packet and the base64 data in the extended
/// one, so each lookup tries the extended node first and then the standard.
struct Attributes<'a, 'input> {
    nodes: [Node<'a, 'input>; 2],
}

impl Attributes<'_, '_> {
    fn get(&self, ns: Option<&str>, name: &str) -> Option<String> {
        let ns = ns?;
        self.nodes
            .iter()
            .find_map(|&node| FieldSource::attributes(node, ns).string(name))
    }

    fn float(&self, ns: Option<&str>, name: &str) -> Option<f64> {
        self.get(ns, name).as_deref().and_then(parse_float)
    }
}

pub(super) fn parse<'a>(
    ext_desc: Node<'a, '_>,
    std_desc: Node<'a, '_>,
    image_ns: Option<&'a str>,
) -> ContainerMetadata {
    let focus_ns = namespace(std_desc, GFOCUS);
    let depth_ns = namespace(ext_desc, GDEPTH).or_else(|| namespace(std_desc, GDEPTH));
    let image_ns = image_ns.or_else(|| image_namespace(std_desc));
    let attrs = Attributes {
        nodes: [ext_desc, std_desc],
    };

    let focus_value = |name: &str| {
        focus_ns
            .and_then(|ns| std_desc.attribute((ns, name)))
            .and_then(parse_float)
            .unwrap_or(0.0)
    };

    let format = attrs.get(depth_ns, "Format").and_then(|format| {
        format
            .parse::<DepthFormat>()
            .map_err(|e| warn!("ignoring depth map format: {e}"))
            .ok()
    });

    ContainerMetadata {
        is_xdm: false,
        image: ImagePayload::new(
            attrs.get(image_ns, "Mime").unwrap_or_default(),
            attrs.get(image_ns, "Data"),
        ),
        depth: Depth {
            payload: ImagePayload::new(
                attrs.get(depth_ns, "Mime").unwrap_or_default(),
                attrs.get(depth_ns, "Data"),
            ),
            // unspecified by Lens Blur
            metric: Some(true),
            format,
            near: attrs.float(depth_ns, "Near"),
            far: attrs.float(depth_ns, "Far"),
            ..Default::default()
        },
        focus: Some(Focus {
            focal_point_x: focus_value("FocalPointX"),
            focal_point_y: focus_value("FocalPointY"),
            focal_distance: focus_value("FocalDistance"),
            blur_at_infinity: focus_value("BlurAtInfinity"),
        }),
        ..Default::default()
    }
}
