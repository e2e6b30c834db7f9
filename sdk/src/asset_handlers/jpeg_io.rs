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

//! Locates XMP packets inside a JPEG byte stream.
//!
//! Every APP1 marker segment is classified by the namespace identifier that
//! follows its length field. Standard XMP payloads and extended XMP payloads
//! are then concatenated, in file order, into two XML strings.

use byteorder::{BigEndian, ByteOrder};
use log::{debug, warn};

use crate::error::{Error, Result};

const SOI_MARKER: [u8; 2] = [0xff, 0xd8];
const APP1_MARKER: [u8; 2] = [0xff, 0xe1];

const XMP_SIGNATURE: &[u8] = b"http://ns.adobe.com/xap/1.0/";
const XMP_EXT_SIGNATURE: &[u8] = b"http://ns.adobe.com/xmp/extension/";

const LENGTH_FIELD_SIZE: usize = 2;
const SIGNATURE_TERMINATOR_SIZE: usize = 1; // skip null or space char at end

// 32-byte GUID followed by the 4-byte full length and 4-byte fragment offset.
// Fragments are assumed to be stored in order, so none of it is interpreted.
const XMP_EXT_PREFIX_SIZE: usize = 40;

/// Classification of an APP1 marker segment.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SegmentKind {
    /// `http://ns.adobe.com/xap/1.0/` packet.
    StandardXmp,
    /// `http://ns.adobe.com/xmp/extension/` fragment.
    ExtendedXmp,
    /// Any other APP1 payload (EXIF and friends).
    Other,
}

impl SegmentKind {
    fn signature(self) -> Option<&'static [u8]> {
        match self {
            SegmentKind::StandardXmp => Some(XMP_SIGNATURE),
            SegmentKind::ExtendedXmp => Some(XMP_EXT_SIGNATURE),
            SegmentKind::Other => None,
        }
    }

    // number of bytes between the start of the length field and the payload
    fn header_size(self) -> usize {
        let prefix = match self {
            SegmentKind::ExtendedXmp => XMP_EXT_PREFIX_SIZE,
            _ => 0,
        };
        self.signature().map_or(LENGTH_FIELD_SIZE, |sig| {
            LENGTH_FIELD_SIZE + sig.len() + SIGNATURE_TERMINATOR_SIZE + prefix
        })
    }
}

/// One APP1 marker segment found by [`scan_segments`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawSegment {
    /// Offset of the APP1 marker from the beginning of the file.
    pub offset: usize,
    /// Declared segment length, which includes the 2-byte length field.
    pub length: usize,
    pub kind: SegmentKind,
    /// Payload decoded one byte per char; empty for [`SegmentKind::Other`].
    pub payload: String,
}

/// Standard and extended XMP packets reassembled from a JPEG.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct XmpPackets {
    pub standard: String,
    pub extended: String,
}

impl XmpPackets {
    /// Concatenate segment payloads by class, in scan order.
    pub fn from_segments(segments: &[RawSegment]) -> Self {
        let mut packets = Self::default();
        for segment in segments {
            match segment.kind {
                SegmentKind::StandardXmp => packets.standard.push_str(&segment.payload),
                SegmentKind::ExtendedXmp => packets.extended.push_str(&segment.payload),
                SegmentKind::Other => {}
            }
        }
        packets
    }

    /// Scan a JPEG byte stream and reassemble its XMP packets.
    pub fn from_jpeg(asset_bytes: &[u8]) -> Result<Self> {
        scan_segments(asset_bytes).map(|segments| Self::from_segments(&segments))
    }

    pub fn is_empty(&self) -> bool {
        self.standard.is_empty() && self.extended.is_empty()
    }
}

/// Scan a JPEG byte stream for APP1 segments.
///
/// Returns [`Error::NotJpeg`] if the stream does not begin with the
/// start-of-image marker. A segment whose declared length cannot hold its
/// header, or which runs past the end of the stream, produces no payload.
pub fn scan_segments(asset_bytes: &[u8]) -> Result<Vec<RawSegment>> {
    if !asset_bytes.starts_with(&SOI_MARKER) {
        return Err(Error::NotJpeg);
    }

    let mut segments = Vec::new();
    let mut pos = SOI_MARKER.len();

    while let Some(marker) = find_marker(asset_bytes, pos) {
        let seg_start = marker + APP1_MARKER.len();
        let Some(length_field) = asset_bytes.get(seg_start..seg_start + LENGTH_FIELD_SIZE) else {
            warn!("APP1 marker at {marker} is missing its length field");
            break;
        };
        let length = BigEndian::read_u16(length_field) as usize;
        let kind = classify(asset_bytes, seg_start + LENGTH_FIELD_SIZE);

        // always move past the length field, even if the declared length is bogus
        pos = seg_start + length.max(LENGTH_FIELD_SIZE);

        if kind == SegmentKind::Other {
            segments.push(RawSegment {
                offset: marker,
                length,
                kind,
                payload: String::new(),
            });
            continue;
        }

        match read_payload(asset_bytes, seg_start, length, kind.header_size()) {
            Some(payload) => {
                debug!(
                    "{kind:?} segment at {marker}: {} payload bytes",
                    payload.len()
                );
                segments.push(RawSegment {
                    offset: marker,
                    length,
                    kind,
                    payload,
                });
            }
            None => warn!("{kind:?} segment at {marker} has a corrupt length ({length}), skipped"),
        }
    }

    Ok(segments)
}

// index of the next APP1 marker at or after pos
fn find_marker(asset_bytes: &[u8], pos: usize) -> Option<usize> {
    asset_bytes
        .get(pos..)?
        .windows(APP1_MARKER.len())
        .position(|w| w == APP1_MARKER)
        .map(|i| pos + i)
}

fn classify(asset_bytes: &[u8], pos: usize) -> SegmentKind {
    let has_signature = |sig: &[u8]| {
        asset_bytes
            .get(pos..pos + sig.len())
            .is_some_and(|bytes| bytes == sig)
    };
    if has_signature(XMP_SIGNATURE) {
        SegmentKind::StandardXmp
    } else if has_signature(XMP_EXT_SIGNATURE) {
        SegmentKind::ExtendedXmp
    } else {
        SegmentKind::Other
    }
}

fn read_payload(asset_bytes: &[u8], seg_start: usize, length: usize, header: usize) -> Option<String> {
    let size = length.checked_sub(header)?;
    let begin = seg_start + header;
    let bytes = asset_bytes.get(begin..begin.checked_add(size)?)?;
    // 8-bit text, not UTF-8
    Some(bytes.iter().copied().map(char::from).collect())
}
