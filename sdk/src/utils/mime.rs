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

use image::ImageFormat;

/// Converts a MIME type or file extension to a raster format
pub fn format_to_image_format(format: &str) -> Option<ImageFormat> {
    Some(match format.trim().to_ascii_lowercase().as_str() {
        "jpg" | "jpeg" | "image/jpeg" | "image/jpg" => ImageFormat::Jpeg,
        "png" | "image/png" => ImageFormat::Png,
        _ => return None,
    })
}

/// Converts a raster format to its MIME type
pub fn image_format_to_mime(format: ImageFormat) -> Option<&'static str> {
    Some(match format {
        ImageFormat::Jpeg => "image/jpeg",
        ImageFormat::Png => "image/png",
        _ => return None,
    })
}
