use crate::bfsk::BfskModulator;
use crate::channel::ChannelParams;
use crate::error::Result;

/// Encoder using binary FSK with preamble/epilogue framing
///
/// Output layout: 2 preamble bytes + payload + 1 epilogue byte, every bit
/// one symbol period long, least-significant bit of each byte first.
pub struct Encoder {
    bfsk: BfskModulator,
}

impl Encoder {
    pub fn new(params: ChannelParams) -> Result<Self> {
        Ok(Self {
            bfsk: BfskModulator::new(params)?,
        })
    }

    pub fn params(&self) -> &ChannelParams {
        self.bfsk.params()
    }

    /// Encode binary data into audio samples at the configured carrier
    pub fn encode(&self, data: &[u8]) -> Result<Vec<f64>> {
        self.encode_with_carrier(self.params().carrier_frequency, data)
    }

    /// Encode around a different carrier, keeping deviation and timing
    pub fn encode_with_carrier(&self, carrier_frequency: f64, data: &[u8]) -> Result<Vec<f64>> {
        let samples = self.bfsk.synthesize(carrier_frequency, data)?;
        log::debug!(
            "Encoded {} bytes at {} Hz carrier into {} samples",
            data.len(),
            carrier_frequency,
            samples.len()
        );
        Ok(samples)
    }

    /// Duration of the encoded signal for a payload of `payload_len` bytes
    pub fn duration_secs(&self, payload_len: usize) -> f64 {
        let params = self.params();
        let bits = (payload_len + crate::FRAME_OVERHEAD_BYTES) * 8;
        bits as f64 * params.samples_per_symbol() as f64 / params.sample_rate
    }
}

impl Default for Encoder {
    fn default() -> Self {
        Self {
            bfsk: BfskModulator::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encoder_basic() {
        let encoder = Encoder::default();
        let samples = encoder.encode(b"Hello").unwrap();
        assert_eq!(samples.len(), (5 + 3) * 8 * 4800);
    }

    #[test]
    fn test_encoder_empty_data() {
        let encoder = Encoder::default();
        // framing only
        let samples = encoder.encode(b"").unwrap();
        assert_eq!(samples.len(), 3 * 8 * 4800);
    }

    #[test]
    fn test_encoder_carrier_override() {
        let encoder = Encoder::default();
        let a = encoder.encode(b"x").unwrap();
        let b = encoder.encode_with_carrier(8000.0, b"x").unwrap();
        assert_eq!(a.len(), b.len());
        assert_ne!(a, b);
    }

    #[test]
    fn test_encoder_rejects_invalid_params() {
        let params = ChannelParams::new(6000.0, 7000.0, 0.1, 48000.0);
        assert!(Encoder::new(params).is_err());
    }

    #[test]
    fn test_duration() {
        let encoder = Encoder::default();
        assert!((encoder.duration_secs(2) - 4.0).abs() < 1e-9);
    }
}
