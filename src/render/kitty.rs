//! Kitty graphics protocol sequences
//!
//! Transmits a PNG via APC escape sequences, sized in character cells —
//! the terminal scales the image into the requested cell rectangle.
//!
//! Protocol: <https://sw.kovidgoyal.net/kitty/graphics-protocol/>

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};

/// Base64 payload bytes per escape chunk, per the protocol limit.
const CHUNK_SIZE: usize = 4096;

/// Build the APC sequence that transmits `png` and displays it scaled
/// into a `cols` x `rows` cell rectangle.
///
/// Keys: `a=T` transmit and display, `f=100` PNG, `c`/`r` cell rect,
/// `q=2` suppress responses, `m` chunk continuation.
pub fn transmit_sequence(png: &[u8], cols: u16, rows: u16) -> String {
    let b64 = BASE64.encode(png);
    if b64.is_empty() {
        return format!("\x1b_Ga=T,f=100,q=2,c={cols},r={rows},m=0;\x1b\\");
    }

    let chunks: Vec<&[u8]> = b64.as_bytes().chunks(CHUNK_SIZE).collect();
    let last = chunks.len() - 1;
    let mut result = String::with_capacity(b64.len() + chunks.len() * 24);

    for (i, chunk) in chunks.iter().enumerate() {
        let more = u8::from(i != last);
        result.push_str("\x1b_G");
        if i == 0 {
            result.push_str(&format!("a=T,f=100,q=2,c={cols},r={rows},m={more};"));
        } else {
            result.push_str(&format!("m={more};"));
        }
        // chunks are slices of base64 output, always valid ASCII
        result.push_str(std::str::from_utf8(chunk).unwrap_or(""));
        result.push_str("\x1b\\");
    }
    result
}
