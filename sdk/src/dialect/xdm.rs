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

use super::populated;
use crate::{
    metadata::{
        Camera, CameraPose, ContainerMetadata, Depth, DepthFormat, Device, DevicePose,
        ImagePayload, Perspective, Vendor,
    },
    utils::xmp_inmemory_utils::{find_element, namespace, FieldSource},
};

const DEVICE: &str = "Device";
const CAMERA: &str = "Camera";
const DEPTHMAP: &str = "Depthmap";
const VENDOR_INFO: &str = "VendorInfo";
const POSE: &str = "Pose";
const PERSPECTIVE: &str = "Perspective";

/// Namespaces declared for the XDM schemas in scope of the description.
struct Namespaces<'a> {
    image: Option<&'a str>,
    device: Option<&'a str>,
    camera: Option<&'a str>,
    depthmap: Option<&'a str>,
    vendor: Option<&'a str>,
    pose: Option<&'a str>,
    perspective: Option<&'a str>,
}

impl<'a> Namespaces<'a> {
    fn new(desc: Node<'a, '_>, image: Option<&'a str>) -> Self {
        Self {
            image,
            device: namespace(desc, DEVICE),
            camera: namespace(desc, CAMERA),
            depthmap: namespace(desc, DEPTHMAP),
            vendor: namespace(desc, VENDOR_INFO),
            pose: namespace(desc, POSE),
            perspective: namespace(desc, PERSPECTIVE),
        }
    }
}

pub(super) fn parse(desc: Node, image_ns: Option<&str>) -> ContainerMetadata {
    let ns = Namespaces::new(desc, image_ns);
    let mut metadata = ContainerMetadata {
        is_xdm: true,
        ..Default::default()
    };

    if let Some(device_ns) = ns.device {
        metadata.revision = FieldSource::probe(desc, device_ns).float("Revision");
        metadata.device = parse_device(desc, device_ns, &ns);
    }

    let Some(camera_ns) = ns.camera else {
        warn!("XDM metadata declares no Camera namespace");
        return metadata;
    };

    if let Some(image_ns) = ns.image {
        if let Some(image) = find_element(desc, camera_ns, "Image") {
            metadata.image = read_payload(image, image_ns);
        }
    }

    if let Some(depth_ns) = ns.depthmap {
        if let Some(depth_map) = find_element(desc, camera_ns, "DepthMap") {
            metadata.depth = parse_depth(depth_map, depth_ns);
        }
        metadata.depth.raw = find_map(desc, camera_ns, depth_ns, "RawDepthMap")
            .map(|raw| read_payload(raw, depth_ns))
            .and_then(populated);
        metadata.confidence = find_map(desc, camera_ns, depth_ns, "ConfidenceMap")
            .map(|confidence| read_payload(confidence, depth_ns))
            .and_then(populated);
    }

    metadata.camera = parse_camera(desc, camera_ns, &ns);
    metadata.perspective = ns.perspective.and_then(|perspective_ns| {
        // the imaging model hangs off the camera; fall back to a document-wide search
        let host = find_element(desc, camera_ns, "ImagingModel").unwrap_or(desc);
        parse_perspective(FieldSource::probe(host, perspective_ns))
    });

    metadata
}

// RawDepthMap and ConfidenceMap have been written under both schemas
fn find_map<'a, 'input>(
    desc: Node<'a, 'input>,
    camera_ns: &str,
    depth_ns: &str,
    name: &str,
) -> Option<Node<'a, 'input>> {
    find_element(desc, camera_ns, name).or_else(|| find_element(desc, depth_ns, name))
}

fn read_payload(element: Node, ns: &str) -> ImagePayload {
    let source = FieldSource::probe(element, ns);
    ImagePayload::new(source.string("Mime").unwrap_or_default(), source.string("Data"))
}

fn parse_depth(depth_map: Node, depth_ns: &str) -> Depth {
    let source = FieldSource::probe(depth_map, depth_ns);
    let format = source.string("Format").and_then(|format| {
        format
            .parse::<DepthFormat>()
            .map_err(|e| warn!("ignoring depth map format: {e}"))
            .ok()
    });
    Depth {
        payload: read_payload(depth_map, depth_ns),
        metric: source.boolean("Metric"),
        format,
        near: source.float("Near"),
        far: source.float("Far"),
        ..Default::default()
    }
}

fn parse_vendor(parent: Node, parent_ns: &str, ns: &Namespaces) -> Option<Vendor> {
    let vendor_ns = ns.vendor?;
    let source = FieldSource::probe(find_element(parent, parent_ns, VENDOR_INFO)?, vendor_ns);
    populated(Vendor {
        manufacturer: source.string("Manufacturer"),
        model: source.string("Model"),
    })
}

fn parse_device(desc: Node, device_ns: &str, ns: &Namespaces) -> Option<Device> {
    let pose = ns.pose.and_then(|pose_ns| {
        let source = FieldSource::probe(find_element(desc, device_ns, POSE)?, pose_ns);
        populated(DevicePose {
            latitude: source.float("Latitude"),
            longitude: source.float("Longitude"),
            altitude: source.float("Altitude"),
        })
    });
    populated(Device {
        vendor: parse_vendor(desc, device_ns, ns),
        pose,
    })
}

fn parse_camera(desc: Node, camera_ns: &str, ns: &Namespaces) -> Option<Camera> {
    let pose = ns.pose.and_then(|pose_ns| {
        let source = FieldSource::probe(find_element(desc, camera_ns, POSE)?, pose_ns);
        populated(CameraPose {
            position_x: source.float("PositionX"),
            position_y: source.float("PositionY"),
            position_z: source.float("PositionZ"),
            rotation_axis_x: source.float("RotationAxisX"),
            rotation_axis_y: source.float("RotationAxisY"),
            rotation_axis_z: source.float("RotationAxisZ"),
            rotation_angle: source.float("RotationAngle"),
        })
    });
    populated(Camera {
        vendor: parse_vendor(desc, camera_ns, ns),
        pose,
    })
}

fn parse_perspective(source: FieldSource) -> Option<Perspective> {
    populated(Perspective {
        focal_length_x: source.float("FocalLengthX"),
        focal_length_y: source.float("FocalLengthY"),
        principal_point_x: source.float("PrincipalPointX"),
        principal_point_y: source.float("PrincipalPointY"),
    })
}

#[cfg(test)]
pub mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::{
        asset_handlers::jpeg_io::XmpPackets,
        dialect::parse_packets,
        utils::xmp_inmemory_utils::{description_node, parse_xmp},
    };

    const NAMESPACES: &str = r#"
        xmlns:Device="http://ns.xdm.org/photos/1.0/device/"
        xmlns:Camera="http://ns.xdm.org/photos/1.0/camera/"
        xmlns:Image="http://ns.xdm.org/photos/1.0/image/"
        xmlns:Depthmap="http://ns.xdm.org/photos/1.0/depthmap/"
        xmlns:VendorInfo="http://ns.xdm.org/photos/1.0/vendorinfo/"
        xmlns:Pose="http://ns.xdm.org/photos/1.0/pose/"
        xmlns:Perspective="http://ns.xdm.org/photos/1.0/perspectivemodel/""#;

    fn wrap(body: &str) -> String {
        format!(
            r#"<x:xmpmeta xmlns:x="adobe:ns:meta/"><rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#">{body}</rdf:RDF></x:xmpmeta>"#
        )
    }

    // XDM beta layout: every property is a child element
    fn element_encoded() -> String {
        wrap(&format!(
            r#"<rdf:Description {NAMESPACES}>
              <Device:Revision>1.0</Device:Revision>
              <Device:VendorInfo>
                <VendorInfo:Manufacturer>Intel</VendorInfo:Manufacturer>
                <VendorInfo:Model>R200</VendorInfo:Model>
              </Device:VendorInfo>
              <Device:Cameras><rdf:Seq><rdf:li>
                <Camera:Image>
                  <Image:Mime>image/png</Image:Mime>
                  <Image:Data>iVBORw0K</Image:Data>
                </Camera:Image>
                <Camera:DepthMap>
                  <Depthmap:Metric>False</Depthmap:Metric>
                  <Depthmap:Format>RangeInverse</Depthmap:Format>
                  <Depthmap:Near>0.0</Depthmap:Near>
                  <Depthmap:Far>0.0</Depthmap:Far>
                  <Depthmap:Mime>image/png</Depthmap:Mime>
                  <Depthmap:Data>AAEC</Depthmap:Data>
                </Camera:DepthMap>
                <Camera:Pose>
                  <Pose:PositionX>0.05</Pose:PositionX>
                  <Pose:RotationAngle>0</Pose:RotationAngle>
                </Camera:Pose>
              </rdf:li></rdf:Seq></Device:Cameras>
            </rdf:Description>"#
        ))
    }

    // XDM 1.0 layout: nested rdf:Description nodes carrying attributes
    fn attribute_encoded() -> String {
        wrap(&format!(
            r#"<rdf:Description {NAMESPACES} Device:Revision="1.1">
              <Device:Pose><rdf:Description Pose:Latitude="45.5" Pose:Longitude="-122.6"/></Device:Pose>
              <Device:Cameras><rdf:Seq><rdf:li rdf:parseType="Resource">
                <Device:Camera><rdf:Description>
                  <Camera:VendorInfo VendorInfo:Manufacturer="Intel"/>
                  <Camera:Image Image:Mime="image/jpeg" Image:Data="/9j/4AAQ"/>
                  <Camera:DepthMap><rdf:Description
                      Depthmap:Metric="true" Depthmap:Format="RangeLinear"
                      Depthmap:Near="0.25" Depthmap:Far="4.5"
                      Depthmap:Mime="image/png" Depthmap:Data="AAEC"/></Camera:DepthMap>
                  <Camera:RawDepthMap Depthmap:Mime="image/png" Depthmap:Data="AAED"/>
                  <Camera:ConfidenceMap Depthmap:Mime="image/png"/>
                  <Camera:ImagingModel><rdf:Description
                      Perspective:FocalLengthX="0.91" Perspective:FocalLengthY="1.22"
                      Perspective:PrincipalPointX="0.5" Perspective:PrincipalPointY="0.5"/></Camera:ImagingModel>
                </rdf:Description></Device:Camera>
              </rdf:li></rdf:Seq></Device:Cameras>
            </rdf:Description>"#
        ))
    }

    fn parse_ext(xml: &str) -> ContainerMetadata {
        parse_packets(&XmpPackets {
            standard: String::new(),
            extended: xml.to_owned(),
        })
        .unwrap()
    }

    #[test]
    fn test_element_encoded() {
        let metadata = parse_ext(&element_encoded());

        assert!(metadata.is_xdm);
        assert_eq!(metadata.revision, Some(1.0));
        assert_eq!(metadata.image.mime, "image/png");
        assert_eq!(
            metadata.image.data.as_deref(),
            Some("data:image/png;base64,iVBORw0K")
        );
        assert_eq!(metadata.depth.metric, Some(false));
        assert_eq!(metadata.depth.format, Some(DepthFormat::RangeInverse));
        assert_eq!(metadata.depth.near, Some(0.0));
        assert_eq!(metadata.depth.far, Some(0.0));
        assert_eq!(metadata.depth.payload.mime, "image/png");
        assert!(metadata.depth.payload.has_data_uri());
        assert_eq!(metadata.depth.raw, None);
        assert_eq!(metadata.confidence, None);

        let vendor = metadata.device.unwrap().vendor.unwrap();
        assert_eq!(vendor.manufacturer.as_deref(), Some("Intel"));
        assert_eq!(vendor.model.as_deref(), Some("R200"));

        let pose = metadata.camera.unwrap().pose.unwrap();
        assert_eq!(pose.position_x, Some(0.05));
        assert_eq!(pose.rotation_angle, Some(0.0));
        assert_eq!(pose.position_y, None);
        assert_eq!(metadata.perspective, None);
        assert_eq!(metadata.focus, None);
    }

    #[test]
    fn test_attribute_encoded() {
        let metadata = parse_ext(&attribute_encoded());

        assert!(metadata.is_xdm);
        assert_eq!(metadata.revision, Some(1.1));
        assert_eq!(metadata.image.mime, "image/jpeg");
        assert!(metadata.image.has_data_uri());
        assert!(metadata.depth.is_metric());
        assert_eq!(metadata.depth.format, Some(DepthFormat::RangeLinear));
        assert_eq!(metadata.depth.near, Some(0.25));
        assert_eq!(metadata.depth.far, Some(4.5));

        let raw = metadata.depth.raw.as_ref().unwrap();
        assert_eq!(raw.data.as_deref(), Some("data:image/png;base64,AAED"));

        // mime without data still counts as present, but has no data URI
        let confidence = metadata.confidence.as_ref().unwrap();
        assert_eq!(confidence.mime, "image/png");
        assert!(!confidence.has_data_uri());

        let device = metadata.device.as_ref().unwrap();
        assert_eq!(device.vendor, None);
        let pose = device.pose.as_ref().unwrap();
        assert_eq!(pose.latitude, Some(45.5));
        assert_eq!(pose.longitude, Some(-122.6));
        assert_eq!(pose.altitude, None);

        let camera = metadata.camera.as_ref().unwrap();
        assert_eq!(
            camera.vendor.as_ref().unwrap().manufacturer.as_deref(),
            Some("Intel")
        );
        assert_eq!(camera.pose, None);

        let perspective = metadata.perspective.as_ref().unwrap();
        assert_eq!(perspective.focal_length_x, Some(0.91));
        assert_eq!(perspective.principal_point_y, Some(0.5));
    }

    #[test]
    fn test_revision_absent() {
        let xml = wrap(&format!(
            r#"<rdf:Description {NAMESPACES}><Camera:Image Image:Mime="image/png"/></rdf:Description>"#
        ));
        let metadata = parse_ext(&xml);
        assert_eq!(metadata.revision, None);
        assert_eq!(metadata.device, None);
        assert_eq!(metadata.image.mime, "image/png");
        assert!(!metadata.image.has_data_uri());
        assert!(metadata.depth.is_empty());
    }

    #[test]
    fn test_image_only_omits_depth() {
        let xml = wrap(&format!(
            r#"<rdf:Description {NAMESPACES}><Camera:Image Image:Mime="image/jpeg" Image:Data="/9j/4AAQ"/></rdf:Description>"#
        ));
        let value: serde_json::Value =
            serde_json::from_str(&parse_ext(&xml).to_json().unwrap()).unwrap();

        assert_eq!(value, serde_json::json!({ "is_xdm": true, "image": { "mime": "image/jpeg" } }));
    }

    #[test]
    fn test_depth_without_calibration_omits_it() {
        let xml = wrap(&format!(
            r#"<rdf:Description {NAMESPACES}><Camera:DepthMap Depthmap:Mime="image/png" Depthmap:Data="AAEC"/></rdf:Description>"#
        ));
        let value: serde_json::Value =
            serde_json::from_str(&parse_ext(&xml).to_json().unwrap()).unwrap();

        assert_eq!(value["depth"], serde_json::json!({ "mime": "image/png" }));
        assert!(value.get("image").is_none());
    }

    #[test]
    fn test_unknown_format_is_dropped() {
        let xml = wrap(&format!(
            r#"<rdf:Description {NAMESPACES}><Camera:DepthMap Depthmap:Format="RangeCubic" Depthmap:Near="1"/></rdf:Description>"#
        ));
        let metadata = parse_ext(&xml);
        assert_eq!(metadata.depth.format, None);
        assert_eq!(metadata.depth.near, Some(1.0));
        assert_eq!(metadata.depth.far, None);
        assert_eq!(metadata.depth.metric, None);
    }

    #[test]
    fn test_vendor_requires_namespace() {
        let xml = element_encoded().replace(
            r#"xmlns:VendorInfo="http://ns.xdm.org/photos/1.0/vendorinfo/""#,
            "",
        );
        // the prefix is now unbound, which is not well-formed XML
        assert!(parse_xmp(&xml).is_err());

        let xml = attribute_encoded();
        let doc = parse_xmp(&xml).unwrap().unwrap();
        let desc = description_node(&doc).unwrap();
        let mut ns = Namespaces::new(desc, Some("http://ns.xdm.org/photos/1.0/image/"));
        ns.vendor = None;
        let camera_ns = ns.camera.unwrap();
        assert_eq!(parse_vendor(desc, camera_ns, &ns), None);
    }
}
