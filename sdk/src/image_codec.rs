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

//! Raster decode/encode used to normalize depth maps.

use std::io::Cursor;

use image::{DynamicImage, ImageFormat, RgbaImage};

use crate::{
    utils::mime::{format_to_image_format, image_format_to_mime},
    Error, Result,
};

const BYTES_PER_PIXEL: usize = 4;

/// RGBA pixels, 4 bytes per pixel, row major.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl PixelBuffer {
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|n| n.checked_mul(BYTES_PER_PIXEL))
            .ok_or_else(|| Error::BadParam("image dimensions overflow".to_owned()))?;
        if data.len() != expected {
            return Err(Error::BadParam(format!(
                "pixel buffer holds {} bytes, expected {expected}",
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    /// Iterate `[r, g, b, a]` pixels.
    pub fn pixels(&self) -> impl Iterator<Item = &[u8]> {
        self.data.chunks_exact(BYTES_PER_PIXEL)
    }

    pub fn pixels_mut(&mut self) -> impl Iterator<Item = &mut [u8]> {
        self.data.chunks_exact_mut(BYTES_PER_PIXEL)
    }
}

/// Decoded raster together with the MIME type of its source encoding.
#[derive(Clone, Debug)]
pub struct DecodedImage {
    pub pixels: PixelBuffer,
    pub mime: String,
}

/// Raster image decode and encode.
pub trait ImageCodec: Send + Sync {
    /// Decode encoded image bytes into RGBA pixels.
    fn decode(&self, bytes: &[u8]) -> Result<DecodedImage>;

    /// Encode RGBA pixels in the format named by `mime`.
    fn encode(&self, pixels: &PixelBuffer, mime: &str) -> Result<Vec<u8>>;
}

/// [`ImageCodec`] backed by the `image` crate (JPEG and PNG).
#[derive(Clone, Copy, Debug, Default)]
pub struct RasterCodec;

impl ImageCodec for RasterCodec {
    fn decode(&self, bytes: &[u8]) -> Result<DecodedImage> {
        let format = image::guess_format(bytes).map_err(|e| Error::ImageDecode(e.to_string()))?;
        let mime = image_format_to_mime(format)
            .ok_or_else(|| Error::ImageDecode(format!("unsupported format {format:?}")))?;
        let img = image::load_from_memory_with_format(bytes, format)
            .map_err(|e| Error::ImageDecode(e.to_string()))?;
        let rgba = img.to_rgba8();
        let (width, height) = rgba.dimensions();

        Ok(DecodedImage {
            pixels: PixelBuffer::new(width, height, rgba.into_raw())?,
            mime: mime.to_owned(),
        })
    }

    fn encode(&self, pixels: &PixelBuffer, mime: &str) -> Result<Vec<u8>> {
        let format = format_to_image_format(mime)
            .ok_or_else(|| Error::ImageEncode(format!("unsupported format {mime}")))?;
        let rgba = RgbaImage::from_raw(pixels.width, pixels.height, pixels.data.clone())
            .ok_or_else(|| Error::ImageEncode("pixel buffer size mismatch".to_owned()))?;

        // JPEG has no alpha channel
        let img = match format {
            ImageFormat::Jpeg => DynamicImage::ImageRgb8(DynamicImage::ImageRgba8(rgba).to_rgb8()),
            _ => DynamicImage::ImageRgba8(rgba),
        };

        let mut cursor = Cursor::new(Vec::new());
        img.write_to(&mut cursor, format)
            .map_err(|e| Error::ImageEncode(e.to_string()))?;
        Ok(cursor.into_inner())
    }
}

#[cfg(test)]
pub mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    fn gray(width: u32, height: u32, values: &[u8]) -> PixelBuffer {
        let data = values.iter().flat_map(|&v| [v, v, v, 255]).collect();
        PixelBuffer::new(width, height, data).unwrap()
    }

    #[test]
    fn test_pixel_buffer_size_checked() {
        assert!(PixelBuffer::new(2, 2, vec![0; 16]).is_ok());
        assert!(matches!(
            PixelBuffer::new(2, 2, vec![0; 15]),
            Err(Error::BadParam(_))
        ));
    }

    #[test]
    fn test_png_round_trip() {
        let codec = RasterCodec;
        let pixels = gray(3, 1, &[10, 128, 250]);
        let png = codec.encode(&pixels, "image/png").unwrap();
        let decoded = codec.decode(&png).unwrap();
        assert_eq!(decoded.mime, "image/png");
        assert_eq!(decoded.pixels, pixels);
    }

    #[test]
    fn test_jpeg_encode_drops_alpha() {
        let codec = RasterCodec;
        let jpeg = codec.encode(&gray(8, 8, &[100; 64]), "image/jpeg").unwrap();
        assert_eq!(&jpeg[..2], &[0xff, 0xd8]);
        let decoded = codec.decode(&jpeg).unwrap();
        assert_eq!(decoded.mime, "image/jpeg");
        assert_eq!(decoded.pixels.width(), 8);
        assert!(decoded.pixels.pixels().all(|px| px[3] == 255));
    }

    #[test]
    fn test_decode_garbage() {
        assert!(matches!(
            RasterCodec.decode(b"definitely not an image"),
            Err(Error::ImageDecode(_))
        ));
        // valid signature, truncated body
        assert!(matches!(
            RasterCodec.decode(&[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a, 0]),
            Err(Error::ImageDecode(_))
        ));
    }

    #[test]
    fn test_encode_unsupported() {
        assert!(matches!(
            RasterCodec.encode(&gray(1, 1, &[0]), "image/gif"),
            Err(Error::ImageEncode(_))
        ));
    }
}
