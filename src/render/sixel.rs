//! DECSIXEL encoding for pixel-streamed terminals
//!
//! Each sixel character carries a 6-pixel vertical strip; the image is
//! emitted band by band, one pass per color register used in the band,
//! with `$` returning the carriage between passes and `-` advancing to
//! the next band. Colors are quantized onto a 216-entry 6x6x6 cube and
//! defined as RGB percentages (`#Pc;2;Pr;Pg;Pb`).
//!
//! Format reference: VT340 Graphics Programming, chapter 14.

use image::RgbaImage;

/// Quantization levels per channel; 6^3 = 216 color registers.
const LEVELS: u32 = 6;
const REGISTERS: usize = 216;

/// Runs longer than this are emitted as `!n` repeats. Shorter runs cost
/// fewer bytes written out literally.
const RLE_THRESHOLD: u32 = 3;

/// Encode a full bitmap as a DECSIXEL stream, carrying its own pixel
/// dimensions in the raster attributes.
pub fn encode(img: &RgbaImage) -> String {
    let width = img.width();
    let height = img.height();

    // register index per pixel, row-major
    let regs: Vec<u16> = img
        .pixels()
        .map(|p| register_for(p[0], p[1], p[2]))
        .collect();

    let mut out = String::with_capacity(regs.len() / 2 + 256);
    // DCS q; P2=1 leaves unset pixels at the current background
    out.push_str("\x1bP0;1;0q");
    out.push_str(&format!("\"1;1;{width};{height}"));

    let mut used = [false; REGISTERS];
    for &r in &regs {
        used[usize::from(r)] = true;
    }
    for (i, flag) in used.iter().enumerate() {
        if *flag {
            let (r, g, b) = register_rgb(i);
            out.push_str(&format!("#{i};2;{r};{g};{b}"));
        }
    }

    let mut band_start = 0u32;
    while band_start < height {
        let band_rows = (height - band_start).min(6);

        let mut band_used = [false; REGISTERS];
        for y in band_start..band_start + band_rows {
            for x in 0..width {
                band_used[usize::from(regs[(y * width + x) as usize])] = true;
            }
        }

        let mut first_pass = true;
        for (reg, flag) in band_used.iter().enumerate() {
            if !*flag {
                continue;
            }
            if !first_pass {
                out.push('$');
            }
            first_pass = false;
            out.push_str(&format!("#{reg}"));
            emit_band_pass(&mut out, &regs, width, band_start, band_rows, reg as u16);
        }

        out.push('-');
        band_start += band_rows;
    }

    out.push_str("\x1b\\");
    out
}

/// One left-to-right pass over a band for a single color register,
/// run-length encoded.
fn emit_band_pass(
    out: &mut String,
    regs: &[u16],
    width: u32,
    band_start: u32,
    band_rows: u32,
    reg: u16,
) {
    let mut run_bits = 0u8;
    let mut run_len = 0u32;
    for x in 0..width {
        let mut bits = 0u8;
        for dy in 0..band_rows {
            let idx = ((band_start + dy) * width + x) as usize;
            if regs[idx] == reg {
                bits |= 1 << dy;
            }
        }
        if run_len > 0 && bits == run_bits {
            run_len += 1;
        } else {
            flush_run(out, run_bits, run_len);
            run_bits = bits;
            run_len = 1;
        }
    }
    flush_run(out, run_bits, run_len);
}

fn flush_run(out: &mut String, bits: u8, len: u32) {
    if len == 0 {
        return;
    }
    let ch = char::from(b'?' + bits);
    if len > RLE_THRESHOLD {
        out.push_str(&format!("!{len}"));
        out.push(ch);
    } else {
        for _ in 0..len {
            out.push(ch);
        }
    }
}

/// Nearest register on the 6x6x6 cube for an RGB pixel. Alpha is ignored;
/// rasterized pages are fully opaque.
fn register_for(r: u8, g: u8, b: u8) -> u16 {
    let q = |c: u8| (u32::from(c) * (LEVELS - 1) + 127) / 255;
    (q(r) * LEVELS * LEVELS + q(g) * LEVELS + q(b)) as u16
}

/// Register index back to RGB percentages (0-100) for the palette entry.
fn register_rgb(reg: usize) -> (u8, u8, u8) {
    let reg = reg as u32;
    let to_pct = |v: u32| (v * 100 / (LEVELS - 1)) as u8;
    (
        to_pct(reg / (LEVELS * LEVELS) % LEVELS),
        to_pct(reg / LEVELS % LEVELS),
        to_pct(reg % LEVELS),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn test_framing_and_raster_attributes() {
        let img = RgbaImage::from_pixel(8, 8, Rgba([255, 255, 255, 255]));
        let seq = encode(&img);
        assert!(seq.starts_with("\x1bP0;1;0q"));
        assert!(seq.contains("\"1;1;8;8"));
        assert!(seq.ends_with("\x1b\\"));
    }

    #[test]
    fn test_solid_white_uses_single_register() {
        let img = RgbaImage::from_pixel(4, 4, Rgba([255, 255, 255, 255]));
        let seq = encode(&img);
        // white quantizes to the last cube entry, defined at 100% each
        assert!(seq.contains("#215;2;100;100;100"));
        // only one palette definition present
        assert_eq!(seq.matches(";2;").count(), 1);
    }

    #[test]
    fn test_register_round_trip_extremes() {
        assert_eq!(register_for(0, 0, 0), 0);
        assert_eq!(register_for(255, 255, 255), 215);
        assert_eq!(register_rgb(0), (0, 0, 0));
        assert_eq!(register_rgb(215), (100, 100, 100));
    }

    #[test]
    fn test_band_count() {
        // 13 rows -> bands of 6, 6 and 1; one '-' terminates each band
        let img = RgbaImage::from_pixel(2, 13, Rgba([0, 0, 0, 255]));
        let seq = encode(&img);
        assert_eq!(seq.matches('-').count(), 3);
    }

    #[test]
    fn test_rle_for_wide_runs() {
        let img = RgbaImage::from_pixel(100, 6, Rgba([0, 0, 0, 255]));
        let seq = encode(&img);
        // full 6-bit column of black, repeated 100 times
        assert!(seq.contains("!100~"));
    }

    #[test]
    fn test_two_colors_share_band_with_carriage_return() {
        let mut img = RgbaImage::from_pixel(4, 6, Rgba([0, 0, 0, 255]));
        for y in 0..6 {
            img.put_pixel(3, y, Rgba([255, 255, 255, 255]));
        }
        let seq = encode(&img);
        // two palette definitions, two passes separated by '$'
        assert_eq!(seq.matches(";2;").count(), 2);
        assert!(seq.contains('$'));
    }
}
