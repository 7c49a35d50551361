//! Bitmap payloads: DIB and Bitmap16 to embeddable BMP/JPEG/PNG data

use base64::{engine::general_purpose, Engine as _};
use byteorder::{ByteOrder, LittleEndian};
use log::{debug, info, warn};

const BMP_FILE_HEADER_SIZE: usize = 14;
const BITMAPCOREHEADER_SIZE: u32 = 12;
const BITMAPINFOHEADER_SIZE: u32 = 40;

const BI_BITFIELDS: u32 = 3;
const BI_JPEG: u32 = 4;
const BI_PNG: u32 = 5;

/// Largest Bitmap16 accepted, in pixels
const MAX_BITMAP16_PIXELS: usize = 1 << 24;

/// Image bytes with their MIME type, ready for a data URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbeddedImage {
    pub mime: &'static str,
    pub width: i32,
    pub height: i32,
    pub data: Vec<u8>,
}

impl EmbeddedImage {
    pub fn data_url(&self) -> String {
        let encoded = general_purpose::STANDARD.encode(&self.data);
        format!("data:{};base64,{}", self.mime, encoded)
    }
}

/// Wrap a device-independent bitmap (info header + colors + bits) in a
/// BMP file header. JPEG and PNG compressed DIBs are passed through.
pub fn dib_to_image(dib: &[u8]) -> Option<EmbeddedImage> {
    if dib.len() < 4 {
        return None;
    }
    let header_size = LittleEndian::read_u32(&dib[0..4]);

    let (width, height, bit_count, compression, colors_used, entry_size) =
        if header_size == BITMAPCOREHEADER_SIZE {
            if dib.len() < 12 {
                return None;
            }
            let width = LittleEndian::read_u16(&dib[4..6]) as i32;
            let height = LittleEndian::read_u16(&dib[6..8]) as i32;
            let bit_count = LittleEndian::read_u16(&dib[10..12]);
            (width, height, bit_count, 0, 0, 3usize)
        } else if header_size >= BITMAPINFOHEADER_SIZE {
            if dib.len() < 40 {
                return None;
            }
            let width = LittleEndian::read_i32(&dib[4..8]);
            let height = LittleEndian::read_i32(&dib[8..12]);
            let bit_count = LittleEndian::read_u16(&dib[14..16]);
            let compression = LittleEndian::read_u32(&dib[16..20]);
            let colors_used = LittleEndian::read_u32(&dib[32..36]);
            (width, height, bit_count, compression, colors_used, 4usize)
        } else {
            debug!("DIB header size {} not recognized", header_size);
            return None;
        };

    let header_len = header_size as usize;
    if header_len > dib.len() {
        return None;
    }

    if compression == BI_JPEG || compression == BI_PNG {
        let mime = if compression == BI_JPEG {
            "image/jpeg"
        } else {
            "image/png"
        };
        return Some(EmbeddedImage {
            mime,
            width,
            height: height.abs(),
            data: dib[header_len..].to_vec(),
        });
    }

    let mut color_table = if bit_count <= 8 {
        let colors = if colors_used > 0 {
            colors_used as usize
        } else {
            1usize << bit_count
        };
        colors.saturating_mul(entry_size)
    } else {
        colors_used as usize * entry_size
    };
    if compression == BI_BITFIELDS && header_size == BITMAPINFOHEADER_SIZE {
        color_table += 12;
    }

    let bits_offset = BMP_FILE_HEADER_SIZE + header_len + color_table;
    let file_size = BMP_FILE_HEADER_SIZE + dib.len();
    if bits_offset > file_size {
        debug!(
            "DIB color table runs past the bitmap ({} > {})",
            bits_offset, file_size
        );
        return None;
    }

    let mut data = Vec::with_capacity(file_size);
    data.extend_from_slice(b"BM");
    push_u32(&mut data, file_size as u32);
    push_u32(&mut data, 0);
    push_u32(&mut data, bits_offset as u32);
    data.extend_from_slice(dib);

    Some(EmbeddedImage {
        mime: "image/bmp",
        width,
        height: height.abs(),
        data,
    })
}

/// Convert a device-dependent Bitmap16 (header + bits) into a BMP.
///
/// Only single-plane monochrome and true-color bitmaps can be expressed
/// without the device palette.
pub fn bitmap16_to_image(
    width: i16,
    height: i16,
    width_bytes: i16,
    planes: u8,
    bits_pixel: u8,
    bits: &[u8],
) -> Option<EmbeddedImage> {
    if width <= 0 || height <= 0 || width_bytes <= 0 || planes != 1 {
        return None;
    }
    if !matches!(bits_pixel, 1 | 24 | 32) {
        info!("Bitmap16 with {} bits per pixel is not supported", bits_pixel);
        return None;
    }

    let width = width as usize;
    let height = height as usize;
    let src_stride = width_bytes as usize;
    // rows are padded to 16 bits
    let min_stride = (width * bits_pixel as usize).div_ceil(16) * 2;
    if src_stride < min_stride {
        warn!(
            "Bitmap16 row of {} bytes is too short for {} pixels at {} bpp",
            src_stride, width, bits_pixel
        );
        return None;
    }
    if width.checked_mul(height).map_or(true, |n| n > MAX_BITMAP16_PIXELS) {
        warn!("Bitmap16 of {}x{} pixels rejected", width, height);
        return None;
    }
    match src_stride.checked_mul(height) {
        Some(needed) if bits.len() >= needed => {}
        _ => return None,
    }

    let dst_stride = (width * bits_pixel as usize).div_ceil(32) * 4;
    let colors = if bits_pixel == 1 { 2usize } else { 0 };

    let mut dib = Vec::with_capacity(40 + colors * 4 + dst_stride * height);
    push_u32(&mut dib, BITMAPINFOHEADER_SIZE);
    push_u32(&mut dib, width as u32);
    // negative height: rows are stored top-down like the source
    push_u32(&mut dib, (-(height as i32)) as u32);
    push_u16(&mut dib, 1);
    push_u16(&mut dib, bits_pixel as u16);
    push_u32(&mut dib, 0);
    push_u32(&mut dib, (dst_stride * height) as u32);
    push_u32(&mut dib, 0);
    push_u32(&mut dib, 0);
    push_u32(&mut dib, colors as u32);
    push_u32(&mut dib, 0);
    if bits_pixel == 1 {
        dib.extend_from_slice(&[0, 0, 0, 0, 255, 255, 255, 0]);
    }

    let copy = src_stride.min(dst_stride);
    for row in bits.chunks_exact(src_stride).take(height) {
        dib.extend_from_slice(&row[..copy]);
        dib.resize(dib.len() + dst_stride - copy, 0);
    }

    dib_to_image(&dib)
}

fn push_u16(out: &mut Vec<u8>, value: u16) {
    let mut buf = [0u8; 2];
    LittleEndian::write_u16(&mut buf, value);
    out.extend_from_slice(&buf);
}

fn push_u32(out: &mut Vec<u8>, value: u32) {
    let mut buf = [0u8; 4];
    LittleEndian::write_u32(&mut buf, value);
    out.extend_from_slice(&buf);
}
