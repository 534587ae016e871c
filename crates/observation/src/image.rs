//! Tile image encoding.
//!
//! A tile is embedded in its observation as a grayscale+alpha PNG wrapped
//! in a `data:` URI: valid samples are min-max scaled to 8 bits and fully
//! opaque, masked samples become fully transparent, preserving tile shape
//! and position. A 1x1 tile bypasses image encoding entirely and is
//! represented as a bare floating-point value.

use std::io::Write;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

use cube_common::{CubeError, CubeResult, Tile};

/// The payload attached to an observation's image-data property.
#[derive(Debug, Clone, PartialEq)]
pub enum ImagePayload {
    /// `data:image/png;base64,...` for real tiles.
    DataUri(String),
    /// Bare value for 1x1 tiles.
    Scalar(f64),
}

/// Encode a tile into its observation payload.
pub fn encode_tile(tile: &Tile) -> CubeResult<ImagePayload> {
    if tile.is_single_pixel() {
        return Ok(ImagePayload::Scalar(tile.get(0, 0)));
    }

    let (gray, alpha) = gray_alpha_planes(tile);
    let png = encode_gray_alpha_png(tile.cols(), tile.rows(), &gray, &alpha)?;
    Ok(ImagePayload::DataUri(format!(
        "data:image/png;base64,{}",
        BASE64.encode(&png)
    )))
}

/// Split a tile into 8-bit gray and alpha planes.
///
/// Valid samples are scaled linearly from the tile's own value range;
/// masked samples render as transparent black.
pub fn gray_alpha_planes(tile: &Tile) -> (Vec<u8>, Vec<u8>) {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for row in 0..tile.rows() {
        for col in 0..tile.cols() {
            if tile.is_valid(row, col) {
                let value = tile.get(row, col);
                min = min.min(value);
                max = max.max(value);
            }
        }
    }
    let scale = if max > min { 255.0 / (max - min) } else { 0.0 };

    let mut gray = Vec::with_capacity(tile.rows() * tile.cols());
    let mut alpha = Vec::with_capacity(tile.rows() * tile.cols());
    for row in 0..tile.rows() {
        for col in 0..tile.cols() {
            if tile.is_valid(row, col) {
                gray.push(((tile.get(row, col) - min) * scale).round() as u8);
                alpha.push(255);
            } else {
                gray.push(0);
                alpha.push(0);
            }
        }
    }
    (gray, alpha)
}

/// Encode gray and alpha planes as a PNG (color type 4, bit depth 8).
fn encode_gray_alpha_png(
    width: usize,
    height: usize,
    gray: &[u8],
    alpha: &[u8],
) -> CubeResult<Vec<u8>> {
    let mut png = Vec::new();

    // PNG signature
    png.extend_from_slice(&[137, 80, 78, 71, 13, 10, 26, 10]);

    // IHDR chunk
    let mut ihdr_data = Vec::with_capacity(13);
    ihdr_data.extend_from_slice(&(width as u32).to_be_bytes());
    ihdr_data.extend_from_slice(&(height as u32).to_be_bytes());
    ihdr_data.push(8); // bit depth
    ihdr_data.push(4); // color type 4 = grayscale with alpha
    ihdr_data.push(0); // compression method
    ihdr_data.push(0); // filter method
    ihdr_data.push(0); // interlace method
    write_chunk(&mut png, b"IHDR", &ihdr_data);

    // IDAT chunk (image data)
    let idat_data = deflate_idat(gray, alpha, width, height)
        .map_err(|e| CubeError::ImageEncode(format!("IDAT compression failed: {e}")))?;
    write_chunk(&mut png, b"IDAT", &idat_data);

    // IEND chunk
    write_chunk(&mut png, b"IEND", &[]);

    Ok(png)
}

/// Deflate interleaved gray/alpha scanlines for the IDAT chunk.
fn deflate_idat(
    gray: &[u8],
    alpha: &[u8],
    width: usize,
    height: usize,
) -> Result<Vec<u8>, std::io::Error> {
    // Each scanline: filter byte (0 = none) + width * [gray, alpha]
    let mut uncompressed = Vec::with_capacity(height * (1 + width * 2));
    for y in 0..height {
        uncompressed.push(0); // filter type: none
        for x in 0..width {
            let idx = y * width + x;
            uncompressed.push(gray[idx]);
            uncompressed.push(alpha[idx]);
        }
    }

    let mut encoder = flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::fast());
    encoder.write_all(&uncompressed)?;
    encoder.finish()
}

/// Write a PNG chunk
fn write_chunk(png: &mut Vec<u8>, chunk_type: &[u8; 4], data: &[u8]) {
    png.extend_from_slice(&(data.len() as u32).to_be_bytes());
    png.extend_from_slice(chunk_type);
    png.extend_from_slice(data);

    let crc_data = [chunk_type.as_slice(), data].concat();
    png.extend_from_slice(&crc32fast::hash(&crc_data).to_be_bytes());
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode_data_uri(payload: &ImagePayload) -> Vec<u8> {
        let ImagePayload::DataUri(uri) = payload else {
            panic!("expected a data URI payload");
        };
        let b64 = uri.strip_prefix("data:image/png;base64,").unwrap();
        BASE64.decode(b64).unwrap()
    }

    #[test]
    fn test_single_pixel_bypasses_encoding() {
        let tile = Tile::new(1, 1, vec![17.5]).unwrap();
        assert_eq!(encode_tile(&tile).unwrap(), ImagePayload::Scalar(17.5));
    }

    #[test]
    fn test_unmasked_tile_fully_opaque() {
        let tile = Tile::new(2, 2, vec![0.0, 1.0, 2.0, 3.0]).unwrap();
        let (gray, alpha) = gray_alpha_planes(&tile);
        assert_eq!(alpha, vec![255; 4]);
        assert_eq!(gray, vec![0, 85, 170, 255]);
    }

    #[test]
    fn test_sentinel_positions_transparent() {
        let tile = Tile::new(2, 2, vec![1.0, -999.0, 3.0, -999.0])
            .unwrap()
            .masked_by_sentinel(-999.0);
        let (gray, alpha) = gray_alpha_planes(&tile);
        assert_eq!(alpha, vec![255, 0, 255, 0]);
        // Transparent samples render as black and don't pollute the range
        assert_eq!(gray[1], 0);
        assert_eq!(gray[3], 0);
        assert_eq!(gray[0], 0);
        assert_eq!(gray[2], 255);
    }

    #[test]
    fn test_constant_tile_still_encodes() {
        let tile = Tile::new(2, 2, vec![5.0; 4]).unwrap();
        let (gray, alpha) = gray_alpha_planes(&tile);
        assert_eq!(gray, vec![0; 4]);
        assert_eq!(alpha, vec![255; 4]);
        assert!(matches!(
            encode_tile(&tile).unwrap(),
            ImagePayload::DataUri(_)
        ));
    }

    #[test]
    fn test_png_structure() {
        let tile = Tile::new(3, 4, (0..12).map(|i| i as f64).collect()).unwrap();
        let png = decode_data_uri(&encode_tile(&tile).unwrap());

        // Signature
        assert_eq!(&png[0..8], &[137, 80, 78, 71, 13, 10, 26, 10]);
        // IHDR: width 4, height 3
        assert_eq!(&png[12..16], b"IHDR");
        assert_eq!(&png[16..20], &4u32.to_be_bytes());
        assert_eq!(&png[20..24], &3u32.to_be_bytes());
        // Bit depth 8, color type 4 (gray + alpha)
        assert_eq!(png[24], 8);
        assert_eq!(png[25], 4);
        // Trailer
        assert_eq!(&png[png.len() - 8..png.len() - 4], b"IEND");
    }

    #[test]
    fn test_all_invalid_tile_encodes_transparent() {
        let tile = Tile::new(2, 2, vec![-999.0; 4])
            .unwrap()
            .masked_by_sentinel(-999.0);
        let (gray, alpha) = gray_alpha_planes(&tile);
        assert_eq!(alpha, vec![0; 4]);
        assert_eq!(gray, vec![0; 4]);
        assert!(encode_tile(&tile).is_ok());
    }
}
