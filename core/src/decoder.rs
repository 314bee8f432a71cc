use crate::activity;
use crate::channel::ChannelParams;
use crate::error::Result;
use crate::framing::{DecodeResult, FrameDecoder};
use crate::slicer;
use crate::stft::SpectralTracker;

/// Decoder for binary FSK frames
///
/// Tracks the energy of both tones over sliding windows, trims to the
/// region with signal, slices one bit per symbol and unpacks the frame.
/// Holds no state between calls.
pub struct Decoder {
    params: ChannelParams,
    tracker: SpectralTracker,
}

impl Decoder {
    pub fn new(params: ChannelParams) -> Result<Self> {
        params.validate_for_decode()?;
        Ok(Self {
            params,
            tracker: SpectralTracker::new(params.sample_rate),
        })
    }

    pub fn params(&self) -> &ChannelParams {
        &self.params
    }

    /// Decode audio samples back to the framed payload
    ///
    /// Silence and truncated frames are not errors: they come back as a
    /// result with empty payload, `error_rate` 1.0 and a matching status.
    pub fn decode(&self, samples: &[f64]) -> DecodeResult {
        let (f0, f1) = (self.params.f0(), self.params.f1());
        log::debug!("f0: {} Hz, f1: {} Hz, {} samples", f0, f1, samples.len());

        let tracks = self.tracker.track(samples, f0, f1);
        let active = activity::trim(&tracks);
        if active.is_empty() {
            return DecodeResult::no_activity();
        }

        let symbols = slicer::decide(&active, self.params.windows_per_symbol());
        let result = FrameDecoder::decode(symbols);
        log::debug!("Decode raw: {}", result.symbol_string());
        result
    }
}

impl Default for Decoder {
    fn default() -> Self {
        let params = ChannelParams::default();
        Self {
            params,
            tracker: SpectralTracker::new(params.sample_rate),
        }
    }
}
