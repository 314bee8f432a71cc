use crate::{EPILOGUE_BYTE, EPILOGUE_LEN, FRAME_OVERHEAD_BYTES, PREAMBLE_BYTE, PREAMBLE_LEN};
use serde::Serialize;
use std::fmt;

/// Bit value used to fill a trailing partial byte
const PAD_BIT: u8 = 1;

/// Expand bytes into bits, least-significant bit first within each byte
pub fn bytes_to_bits(bytes: &[u8]) -> Vec<u8> {
    let mut bits = Vec::with_capacity(bytes.len() * 8);
    for &byte in bytes {
        for i in 0..8 {
            bits.push((byte >> i) & 1);
        }
    }
    bits
}

/// Group bits into bytes, LSB first
///
/// A final group shorter than 8 bits has its missing high-order bits set to 1.
pub fn pack_bits(bits: &[u8]) -> Vec<u8> {
    bits.chunks(8)
        .map(|chunk| {
            (0..8).fold(0u8, |byte, j| {
                let bit = chunk.get(j).copied().unwrap_or(PAD_BIT) & 1;
                byte | (bit << j)
            })
        })
        .collect()
}

/// Strip trailing all-ones bytes left behind by bit padding
///
/// Intended for display of decoded text. A payload that genuinely ends in
/// 0xFF bytes loses them too.
pub fn trim_trailing_padding(bytes: &[u8]) -> &[u8] {
    let end = bytes
        .iter()
        .rposition(|&b| b != 0xFF)
        .map_or(0, |pos| pos + 1);
    &bytes[..end]
}

/// How far a decode got
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FrameStatus {
    /// Preamble, payload and epilogue were all present
    Complete,
    /// No analysis window rose above the noise floor
    NoActivity,
    /// Fewer bytes than preamble + epilogue were recovered
    FrameTooShort,
}

impl fmt::Display for FrameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            FrameStatus::Complete => "complete",
            FrameStatus::NoActivity => "no signal detected",
            FrameStatus::FrameTooShort => "message too short",
        };
        f.write_str(text)
    }
}

/// Outcome of one decode call
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecodeResult {
    pub payload: Vec<u8>,
    /// Fraction of framing bits received wrong, 1.0 when no frame was found
    pub error_rate: f64,
    /// Hard bits, one per symbol period, before byte packing
    pub symbols: Vec<u8>,
    pub status: FrameStatus,
}

impl DecodeResult {
    fn empty(status: FrameStatus, symbols: Vec<u8>) -> Self {
        Self {
            payload: Vec::new(),
            error_rate: 1.0,
            symbols,
            status,
        }
    }

    pub fn no_activity() -> Self {
        Self::empty(FrameStatus::NoActivity, Vec::new())
    }

    pub fn frame_too_short(symbols: Vec<u8>) -> Self {
        Self::empty(FrameStatus::FrameTooShort, symbols)
    }

    /// Complete frame with every framing bit intact
    pub fn is_clean(&self) -> bool {
        self.status == FrameStatus::Complete && self.error_rate == 0.0
    }

    /// Symbols rendered as `[1, 0, 1, ...]` for diagnostics
    pub fn symbol_string(&self) -> String {
        let bits: Vec<String> = self.symbols.iter().map(|b| b.to_string()).collect();
        format!("[{}]", bits.join(", "))
    }
}

pub struct FrameEncoder;
pub struct FrameDecoder;

impl FrameEncoder {
    /// preamble ‖ payload ‖ epilogue
    pub fn encode(payload: &[u8]) -> Vec<u8> {
        let mut frame = Vec::with_capacity(payload.len() + FRAME_OVERHEAD_BYTES);
        frame.extend(std::iter::repeat(PREAMBLE_BYTE).take(PREAMBLE_LEN));
        frame.extend_from_slice(payload);
        frame.extend(std::iter::repeat(EPILOGUE_BYTE).take(EPILOGUE_LEN));
        frame
    }

    /// Frame as the bit stream fed to the synthesizer
    pub fn encode_bits(payload: &[u8]) -> Vec<u8> {
        bytes_to_bits(&Self::encode(payload))
    }
}

impl FrameDecoder {
    /// Pack symbols into bytes, score the framing and cut out the payload
    pub fn decode(symbols: Vec<u8>) -> DecodeResult {
        let bytes = pack_bits(&symbols);
        log::debug!("Decoded bytes: {:?}", bytes);

        if bytes.len() < FRAME_OVERHEAD_BYTES {
            return DecodeResult::frame_too_short(symbols);
        }

        let epilogue_start = bytes.len() - EPILOGUE_LEN;
        let preamble_errors: u32 = bytes[..PREAMBLE_LEN]
            .iter()
            .map(|&b| (b ^ PREAMBLE_BYTE).count_ones())
            .sum();
        let epilogue_errors: u32 = bytes[epilogue_start..]
            .iter()
            .map(|&b| (b ^ EPILOGUE_BYTE).count_ones())
            .sum();
        let error_bits = preamble_errors + epilogue_errors;

        DecodeResult {
            payload: bytes[PREAMBLE_LEN..epilogue_start].to_vec(),
            error_rate: error_bits as f64 / 8.0 / FRAME_OVERHEAD_BYTES as f64,
            symbols,
            status: FrameStatus::Complete,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bits_lsb_first() {
        assert_eq!(bytes_to_bits(&[0b0000_0001]), vec![1, 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(bytes_to_bits(&[0x48]), vec![0, 0, 0, 1, 0, 0, 1, 0]);
    }

    #[test]
    fn test_single_byte_bit_order() {
        for b in 0..=255u8 {
            assert_eq!(pack_bits(&bytes_to_bits(&[b])), vec![b], "byte {:#04x}", b);
        }
    }

    #[test]
    fn test_partial_byte_padded_with_ones() {
        assert_eq!(pack_bits(&[0, 0, 0]), vec![0b1111_1000]);
        assert_eq!(pack_bits(&[1, 0, 1, 0, 1, 0, 1, 0, 0]), vec![0x55, 0xFE]);
        assert!(pack_bits(&[]).is_empty());
    }

    #[test]
    fn test_frame_layout() {
        let frame = FrameEncoder::encode(b"HI");
        assert_eq!(frame, vec![0x55, 0x55, 0x48, 0x49, 0xFF]);
        assert_eq!(FrameEncoder::encode_bits(b"HI").len(), 40);
    }

    #[test]
    fn test_frame_decode_clean() {
        let result = FrameDecoder::decode(FrameEncoder::encode_bits(b"Hello"));
        assert_eq!(result.payload, b"Hello");
        assert_eq!(result.error_rate, 0.0);
        assert_eq!(result.status, FrameStatus::Complete);
        assert!(result.is_clean());
    }

    #[test]
    fn test_empty_payload_frame() {
        let result = FrameDecoder::decode(FrameEncoder::encode_bits(b""));
        assert!(result.payload.is_empty());
        assert!(result.is_clean());
    }

    #[test]
    fn test_frame_too_short() {
        let symbols = bytes_to_bits(&[0x55, 0x55]);
        let result = FrameDecoder::decode(symbols.clone());
        assert!(result.payload.is_empty());
        assert_eq!(result.error_rate, 1.0);
        assert_eq!(result.status, FrameStatus::FrameTooShort);
        assert_eq!(result.symbols, symbols);
    }

    #[test]
    fn test_framing_errors_counted() {
        let mut symbols = FrameEncoder::encode_bits(b"A");
        // one bit in the first preamble byte, two in the epilogue
        symbols[0] ^= 1;
        let len = symbols.len();
        symbols[len - 1] ^= 1;
        symbols[len - 2] ^= 1;

        let result = FrameDecoder::decode(symbols);
        assert_eq!(result.payload, b"A");
        assert!((result.error_rate - 3.0 / 24.0).abs() < 1e-12);
    }

    #[test]
    fn test_payload_flips_leave_error_rate() {
        let clean = FrameDecoder::decode(FrameEncoder::encode_bits(b"data"));

        let mut symbols = FrameEncoder::encode_bits(b"data");
        for k in [16, 21, 30, 47] {
            symbols[k] ^= 1;
        }
        let corrupted = FrameDecoder::decode(symbols);

        assert_eq!(corrupted.error_rate, clean.error_rate);
        assert_ne!(corrupted.payload, clean.payload);
        assert_eq!(corrupted.payload.len(), clean.payload.len());
    }

    #[test]
    fn test_all_framing_wrong_is_rate_one() {
        let mut symbols = FrameEncoder::encode_bits(b"xy");
        let len = symbols.len();
        for k in (0..16).chain(len - 8..len) {
            symbols[k] ^= 1;
        }
        let result = FrameDecoder::decode(symbols);
        assert_eq!(result.error_rate, 1.0);
        assert_eq!(result.payload, b"xy");
    }

    #[test]
    fn test_symbol_string() {
        let result = FrameDecoder::decode(vec![1, 0, 1]);
        assert_eq!(result.symbol_string(), "[1, 0, 1]");
        assert_eq!(DecodeResult::no_activity().symbol_string(), "[]");
    }

    #[test]
    fn test_trim_trailing_padding() {
        assert_eq!(trim_trailing_padding(&[0x48, 0x49, 0xFF, 0xFF]), &[0x48, 0x49]);
        assert_eq!(trim_trailing_padding(&[0x48, 0xFF, 0x49]), &[0x48, 0xFF, 0x49]);
        assert!(trim_trailing_padding(&[0xFF, 0xFF]).is_empty());
        assert!(trim_trailing_padding(&[]).is_empty());
    }
}
