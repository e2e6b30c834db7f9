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

//! Self-contained `data:` URIs for embedded payloads.

use base64::{engine::general_purpose, Engine as _};

use crate::{Error, Result};

const DATA_SCHEME: &str = "data:";
const BASE64_MARKER: &str = ";base64,";

/// Build `data:<mime>;base64,<data>` from a MIME type and base64 text.
///
/// Returns `None` unless both parts are non-empty.
pub fn encode(mime: &str, base64_data: &str) -> Option<String> {
    if mime.is_empty() || base64_data.is_empty() {
        return None;
    }
    Some(format!("{DATA_SCHEME}{mime}{BASE64_MARKER}{base64_data}"))
}

/// Build a data URI from raw bytes.
pub fn from_bytes(mime: &str, data: &[u8]) -> String {
    format!(
        "{DATA_SCHEME}{mime}{BASE64_MARKER}{}",
        general_purpose::STANDARD.encode(data)
    )
}

/// Split a base64 data URI into its MIME type and decoded bytes.
pub fn decode(uri: &str) -> Result<(String, Vec<u8>)> {
    let rest = uri
        .strip_prefix(DATA_SCHEME)
        .ok_or_else(|| Error::ImageDecode("not a data URI".to_owned()))?;
    let (mime, data) = rest
        .split_once(BASE64_MARKER)
        .ok_or_else(|| Error::ImageDecode("data URI is not base64 encoded".to_owned()))?;
    Ok((mime.to_owned(), decode_base64(data)?))
}

/// Decode base64 text, ignoring the line breaks XMP serializers insert.
pub fn decode_base64(data: &str) -> Result<Vec<u8>> {
    let compact: String = data.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    general_purpose::STANDARD
        .decode(compact)
        .map_err(|e| Error::ImageDecode(e.to_string()))
}

#[cfg(test)]
pub mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn test_encode_requires_both_parts() {
        assert_eq!(
            encode("image/png", "AAEC"),
            Some("data:image/png;base64,AAEC".to_owned())
        );
        assert_eq!(encode("", "AAEC"), None);
        assert_eq!(encode("image/png", ""), None);
    }

    #[test]
    fn test_decode() {
        let (mime, bytes) = decode("data:image/png;base64,AAEC").unwrap();
        assert_eq!(mime, "image/png");
        assert_eq!(bytes, vec![0, 1, 2]);

        let uri = from_bytes("image/jpeg", &[9, 8, 7, 6]);
        assert!(uri.starts_with("data:image/jpeg;base64,"));
        assert_eq!(decode(&uri).unwrap().1, vec![9, 8, 7, 6]);
    }

    #[test]
    fn test_decode_ignores_line_breaks() {
        assert_eq!(decode_base64("AA\n  EC\r\n").unwrap(), vec![0, 1, 2]);
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(matches!(decode("image/png;base64,AAEC"), Err(Error::ImageDecode(_))));
        assert!(matches!(decode("data:image/png,AAEC"), Err(Error::ImageDecode(_))));
        assert!(matches!(decode("data:image/png;base64,!!!"), Err(Error::ImageDecode(_))));
    }
}
