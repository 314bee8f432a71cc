use bfskmodem_core::{ChannelParams, DecodeResult, Decoder, Encoder, FrameStatus};
use wasm_bindgen::prelude::*;

fn to_js_error(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

#[wasm_bindgen]
pub struct WasmEncoder {
    inner: Encoder,
}

#[wasm_bindgen]
impl WasmEncoder {
    /// Channel in Hz and seconds; pass the AudioContext sample rate as `sample_rate`
    #[wasm_bindgen(constructor)]
    pub fn new(
        carrier_frequency: f64,
        frequency_deviation: f64,
        symbol_period: f64,
        sample_rate: f64,
    ) -> Result<WasmEncoder, JsValue> {
        let params = ChannelParams::new(carrier_frequency, frequency_deviation, symbol_period, sample_rate);
        Encoder::new(params)
            .map(|encoder| WasmEncoder { inner: encoder })
            .map_err(to_js_error)
    }

    /// Encode binary data into audio samples
    /// Takes a Uint8Array and returns Float32Array of audio samples
    #[wasm_bindgen]
    pub fn encode(&self, data: &[u8]) -> Result<Vec<f32>, JsValue> {
        self.inner
            .encode(data)
            .map(|samples| samples.into_iter().map(|s| s as f32).collect())
            .map_err(to_js_error)
    }

    /// Same as `encode` with a one-off carrier frequency
    #[wasm_bindgen(js_name = encodeWithCarrier)]
    pub fn encode_with_carrier(&self, carrier_frequency: f64, data: &[u8]) -> Result<Vec<f32>, JsValue> {
        self.inner
            .encode_with_carrier(carrier_frequency, data)
            .map(|samples| samples.into_iter().map(|s| s as f32).collect())
            .map_err(to_js_error)
    }
}

#[wasm_bindgen]
pub struct WasmDecodeResult {
    inner: DecodeResult,
}

#[wasm_bindgen]
impl WasmDecodeResult {
    #[wasm_bindgen(getter)]
    pub fn payload(&self) -> Vec<u8> {
        self.inner.payload.clone()
    }

    #[wasm_bindgen(getter, js_name = errorRate)]
    pub fn error_rate(&self) -> f64 {
        self.inner.error_rate
    }

    #[wasm_bindgen(getter)]
    pub fn symbols(&self) -> Vec<u8> {
        self.inner.symbols.clone()
    }

    /// Symbols as `[1, 0, ...]`
    #[wasm_bindgen(getter, js_name = symbolString)]
    pub fn symbol_string(&self) -> String {
        self.inner.symbol_string()
    }

    /// "complete", "no_activity" or "frame_too_short"
    #[wasm_bindgen(getter)]
    pub fn status(&self) -> String {
        match self.inner.status {
            FrameStatus::Complete => "complete",
            FrameStatus::NoActivity => "no_activity",
            FrameStatus::FrameTooShort => "frame_too_short",
        }
        .to_string()
    }
}

#[wasm_bindgen]
pub struct WasmDecoder {
    inner: Decoder,
}

#[wasm_bindgen]
impl WasmDecoder {
    #[wasm_bindgen(constructor)]
    pub fn new(
        carrier_frequency: f64,
        frequency_deviation: f64,
        symbol_period: f64,
        sample_rate: f64,
    ) -> Result<WasmDecoder, JsValue> {
        let params = ChannelParams::new(carrier_frequency, frequency_deviation, symbol_period, sample_rate);
        Decoder::new(params)
            .map(|decoder| WasmDecoder { inner: decoder })
            .map_err(to_js_error)
    }

    /// Decode audio samples back to binary data
    /// Takes a Float32Array recorded at the decoder's sample rate
    #[wasm_bindgen]
    pub fn decode(&self, samples: &[f32]) -> WasmDecodeResult {
        let samples: Vec<f64> = samples.iter().map(|&s| f64::from(s)).collect();
        WasmDecodeResult {
            inner: self.inner.decode(&samples),
        }
    }
}
