//! PNG encoding for rendered pixel data.
//!
//! Hand-rolled chunk writer over `flate2` and `crc32fast`; supports the
//! two color types the renderers produce: RGB (color type 2) for
//! thumbnails and RGBA (color type 6) for color-mapped index images.

use std::io::Write;

/// Create a PNG image from interleaved RGB pixel data (3 bytes per pixel).
pub fn encode_rgb(pixels: &[u8], width: usize, height: usize) -> Result<Vec<u8>, String> {
    encode(pixels, width, height, 2, 3)
}

/// Create a PNG image from interleaved RGBA pixel data (4 bytes per pixel).
pub fn encode_rgba(pixels: &[u8], width: usize, height: usize) -> Result<Vec<u8>, String> {
    encode(pixels, width, height, 6, 4)
}

fn encode(
    pixels: &[u8],
    width: usize,
    height: usize,
    color_type: u8,
    bytes_per_pixel: usize,
) -> Result<Vec<u8>, String> {
    if pixels.len() != width * height * bytes_per_pixel {
        return Err(format!(
            "pixel buffer is {} bytes, {}x{} at {} bytes/pixel requires {}",
            pixels.len(),
            width,
            height,
            bytes_per_pixel,
            width * height * bytes_per_pixel
        ));
    }

    let mut png = Vec::new();

    // PNG signature
    png.extend_from_slice(&[137, 80, 78, 71, 13, 10, 26, 10]);

    // IHDR chunk
    let mut ihdr_data = Vec::with_capacity(13);
    ihdr_data.extend_from_slice(&(width as u32).to_be_bytes());
    ihdr_data.extend_from_slice(&(height as u32).to_be_bytes());
    ihdr_data.push(8); // bit depth
    ihdr_data.push(color_type);
    ihdr_data.push(0); // compression method
    ihdr_data.push(0); // filter method
    ihdr_data.push(0); // interlace method
    write_chunk(&mut png, b"IHDR", &ihdr_data);

    // IDAT chunk (image data)
    let idat_data = deflate_idat(pixels, width, height, bytes_per_pixel)
        .map_err(|e| format!("IDAT compression failed: {}", e))?;
    write_chunk(&mut png, b"IDAT", &idat_data);

    // IEND chunk
    write_chunk(&mut png, b"IEND", &[]);

    Ok(png)
}

/// Write a PNG chunk
fn write_chunk(png: &mut Vec<u8>, chunk_type: &[u8; 4], data: &[u8]) {
    png.extend_from_slice(&(data.len() as u32).to_be_bytes());
    png.extend_from_slice(chunk_type);
    png.extend_from_slice(data);

    let mut hasher = crc32fast::Hasher::new();
    hasher.update(chunk_type);
    hasher.update(data);
    png.extend_from_slice(&hasher.finalize().to_be_bytes());
}

/// Deflate image data for the IDAT chunk.
fn deflate_idat(
    pixels: &[u8],
    width: usize,
    height: usize,
    bytes_per_pixel: usize,
) -> Result<Vec<u8>, std::io::Error> {
    // Add filter byte (0 = no filter) to each scanline
    let row_bytes = width * bytes_per_pixel;
    let mut uncompressed = Vec::with_capacity(height * (1 + row_bytes));
    for y in 0..height {
        uncompressed.push(0); // filter type: none
        let row_start = y * row_bytes;
        uncompressed.extend_from_slice(&pixels[row_start..row_start + row_bytes]);
    }

    let mut encoder = flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::fast());
    encoder.write_all(&uncompressed)?;
    encoder.finish()
}
