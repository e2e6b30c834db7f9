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

//! Builders for synthetic depth photo containers.

#![allow(dead_code)]

use base64::{engine::general_purpose, Engine as _};
use depth_reader::{ImageCodec, PixelBuffer, RasterCodec};

#[macro_export]
macro_rules! assert_err {
    ($expression:expr, $($pattern:tt)+) => {
        match $expression {
            $($pattern)+ => (),
            ref e => panic!("expected `{}` but got `{:?}`", stringify!($($pattern)+), e),
        }
    }
}
#[allow(unused_imports)]
pub(super) use assert_err;

pub const XMP_SIGNATURE: &[u8] = b"http://ns.adobe.com/xap/1.0/\0";
pub const XMP_EXT_SIGNATURE: &[u8] = b"http://ns.adobe.com/xmp/extension/\0";
pub const EXIF_SIGNATURE: &[u8] = b"Exif\0\0";

const GUID: &[u8; 32] = b"7A0C1F6B4E2D3C5A9B8E7F6D5C4B3A21";

/// One APP1 segment: marker, big-endian length, then `body`.
pub fn app1(body: &[u8]) -> Vec<u8> {
    let length = u16::try_from(body.len() + 2).unwrap();
    let mut segment = vec![0xff, 0xe1];
    segment.extend_from_slice(&length.to_be_bytes());
    segment.extend_from_slice(body);
    segment
}

pub fn standard_segment(xml: &str) -> Vec<u8> {
    app1(&[XMP_SIGNATURE, xml.as_bytes()].concat())
}

/// Split `xml` into extended XMP segments of at most `chunk` payload bytes.
pub fn extended_segments(xml: &str, chunk: usize) -> Vec<Vec<u8>> {
    let total = u32::try_from(xml.len()).unwrap();
    xml.as_bytes()
        .chunks(chunk)
        .enumerate()
        .map(|(i, part)| {
            let offset = u32::try_from(i * chunk).unwrap();
            let mut body = XMP_EXT_SIGNATURE.to_vec();
            body.extend_from_slice(GUID);
            body.extend_from_slice(&total.to_be_bytes());
            body.extend_from_slice(&offset.to_be_bytes());
            body.extend_from_slice(part);
            app1(&body)
        })
        .collect()
}

/// SOI, the given segments, a stand-in scan and EOI.
pub fn jpeg(segments: &[Vec<u8>]) -> Vec<u8> {
    let mut bytes = vec![0xff, 0xd8];
    for segment in segments {
        bytes.extend_from_slice(segment);
    }
    bytes.extend_from_slice(&[0xff, 0xda, 0x00, 0x02, 0x11, 0x22]);
    bytes.extend_from_slice(&[0xff, 0xd9]);
    bytes
}

/// Base64 PNG of a `width` x `height` gray depth map.
pub fn depth_png_base64(width: u32, height: u32, values: &[u8]) -> String {
    let data = values.iter().flat_map(|&v| [v, v, v, 255]).collect();
    let pixels = PixelBuffer::new(width, height, data).unwrap();
    let png = RasterCodec.encode(&pixels, "image/png").unwrap();
    general_purpose::STANDARD.encode(png)
}

/// Base64 JPEG reference image.
pub fn reference_jpeg_base64() -> String {
    let data = [90u8, 120, 150, 255].repeat(16);
    let pixels = PixelBuffer::new(4, 4, data).unwrap();
    let jpeg = RasterCodec.encode(&pixels, "image/jpeg").unwrap();
    general_purpose::STANDARD.encode(jpeg)
}

pub fn xmpmeta(desc: &str) -> String {
    format!(
        r#"<x:xmpmeta xmlns:x="adobe:ns:meta/"><rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#">{desc}</rdf:RDF></x:xmpmeta>"#
    )
}

/// XDM 1.0 extended packet with attribute-encoded properties.
pub fn xdm_xmp(depth_b64: &str, image_b64: &str) -> String {
    xmpmeta(&format!(
        r#"<rdf:Description
            xmlns:Device="http://ns.xdm.org/photos/1.0/device/"
            xmlns:Camera="http://ns.xdm.org/photos/1.0/camera/"
            xmlns:Image="http://ns.xdm.org/photos/1.0/image/"
            xmlns:Depthmap="http://ns.xdm.org/photos/1.0/depthmap/"
            xmlns:VendorInfo="http://ns.xdm.org/photos/1.0/vendorinfo/"
            Device:Revision="1.0">
          <Device:VendorInfo><rdf:Description VendorInfo:Manufacturer="Intel" VendorInfo:Model="RealSense"/></Device:VendorInfo>
          <Device:Cameras><rdf:Seq><rdf:li rdf:parseType="Resource">
            <Device:Camera><rdf:Description>
              <Camera:Image><rdf:Description Image:Mime="image/jpeg" Image:Data="{image_b64}"/></Camera:Image>
              <Camera:DepthMap><rdf:Description
                  Depthmap:Metric="1" Depthmap:Format="RangeInverse"
                  Depthmap:Near="0.0" Depthmap:Far="3.5"
                  Depthmap:Mime="image/png" Depthmap:Data="{depth_b64}"/></Camera:DepthMap>
            </rdf:Description></Device:Camera>
          </rdf:li></rdf:Seq></Device:Cameras>
        </rdf:Description>"#
    ))
}

pub fn lens_blur_standard_xmp() -> String {
    xmpmeta(
        r#"<rdf:Description rdf:about=""
            xmlns:GFocus="http://ns.google.com/photos/1.0/focus/"
            xmlns:GImage="http://ns.google.com/photos/1.0/image/"
            xmlns:GDepth="http://ns.google.com/photos/1.0/depthmap/"
            xmlns:xmpNote="http://ns.adobe.com/xmp/note/"
            GFocus:BlurAtInfinity="0.014069436"
            GFocus:FocalDistance="9.190595"
            GFocus:FocalPointX="0.5"
            GFocus:FocalPointY="0.5"
            GImage:Mime="image/jpeg"
            GDepth:Format="RangeInverse"
            GDepth:Near="6.097831726074219"
            GDepth:Far="24.221643447875977"
            GDepth:Mime="image/png"
            xmpNote:HasExtendedXMP="7A0C1F6B4E2D3C5A9B8E7F6D5C4B3A21"/>"#,
    )
}

pub fn lens_blur_extended_xmp(depth_b64: &str, image_b64: &str) -> String {
    xmpmeta(&format!(
        r#"<rdf:Description rdf:about=""
            xmlns:GImage="http://ns.google.com/photos/1.0/image/"
            xmlns:GDepth="http://ns.google.com/photos/1.0/depthmap/"
            GImage:Data="{image_b64}"
            GDepth:Data="{depth_b64}"/>"#
    ))
}

/// XDM container with a 4x2 depth map ramp, extended XMP split over
/// several segments and an EXIF segment in front.
pub fn xdm_jpeg() -> Vec<u8> {
    let depth = depth_png_base64(4, 2, &[40, 50, 60, 70, 80, 90, 100, 110]);
    let ext = xdm_xmp(&depth, &reference_jpeg_base64());

    let mut segments = vec![app1(&[EXIF_SIGNATURE, b"MM\0*"].concat())];
    segments.extend(extended_segments(&ext, 200));
    jpeg(&segments)
}

pub fn lens_blur_jpeg() -> Vec<u8> {
    let depth = depth_png_base64(2, 2, &[10, 20, 30, 40]);
    let ext = lens_blur_extended_xmp(&depth, &reference_jpeg_base64());

    let mut segments = vec![standard_segment(&lens_blur_standard_xmp())];
    segments.extend(extended_segments(&ext, 256));
    jpeg(&segments)
}
