use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use bfskmodem_core::{trim_trailing_padding, DecodeResult, FrameStatus};
use serde::Serialize;
use std::fmt;

/// Decode outcome shaped for humans and JSON consumers
#[derive(Debug, Clone, Serialize)]
pub struct DecodeReport {
    pub status: FrameStatus,
    pub error_rate: f64,
    pub payload_len: usize,
    pub payload_base64: String,
    /// Payload as UTF-8 with invalid sequences replaced
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symbols: Option<String>,
    #[serde(skip)]
    pub payload: Vec<u8>,
}

impl DecodeReport {
    pub fn new(result: &DecodeResult, trim_padding: bool, with_symbols: bool) -> Self {
        let payload = if trim_padding {
            trim_trailing_padding(&result.payload).to_vec()
        } else {
            result.payload.clone()
        };

        Self {
            status: result.status,
            error_rate: result.error_rate,
            payload_len: payload.len(),
            payload_base64: STANDARD.encode(&payload),
            text: String::from_utf8_lossy(&payload).into_owned(),
            symbols: with_symbols.then(|| result.symbol_string()),
            payload,
        }
    }
}

impl fmt::Display for DecodeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Status: {}", self.status)?;
        writeln!(f, "Error rate: {:.4}", self.error_rate)?;
        write!(f, "Payload ({} bytes): {}", self.payload_len, self.text)?;
        if let Some(symbols) = &self.symbols {
            write!(f, "\nSymbols: {}", symbols)?;
        }
        Ok(())
    }
}
