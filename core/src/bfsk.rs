use crate::channel::ChannelParams;
use crate::error::{ModemError, Result};
use crate::framing::FrameEncoder;
use crate::MAX_SIGNAL_SAMPLES;
use std::f64::consts::PI;

// Binary FSK tone generation
//
// Every bit becomes one symbol period of a pure cosine: f1 = fc + fd for a
// 1, f0 = fc - fd for a 0. Phase restarts at zero on each symbol; the
// decoder only looks at tone energy so no phase continuity is kept.

/// Generate `num_samples` of cos(2π·f·j/fs) starting at phase zero
fn generate_tone(frequency: f64, num_samples: usize, sample_rate: f64) -> Vec<f64> {
    let angular_freq = 2.0 * PI * frequency / sample_rate;
    (0..num_samples)
        .map(|j| (angular_freq * j as f64).cos())
        .collect()
}

/// BFSK modulator - one tone burst per bit
///
/// Deviation, symbol period and sample rate are fixed at construction; the
/// carrier can be chosen per call.
pub struct BfskModulator {
    params: ChannelParams,
}

impl BfskModulator {
    pub fn new(params: ChannelParams) -> Result<Self> {
        params.validate()?;
        Ok(Self { params })
    }

    pub fn params(&self) -> &ChannelParams {
        &self.params
    }

    /// Modulate a bit stream (values 0/1) at the configured carrier
    pub fn modulate_bits(&self, bits: &[u8]) -> Result<Vec<f64>> {
        Self::render(&self.params, bits)
    }

    /// Frame `payload` and modulate it around `carrier_frequency`
    ///
    /// Output holds exactly `(payload.len() + 3) * 8 * samples_per_symbol`
    /// samples.
    pub fn synthesize(&self, carrier_frequency: f64, payload: &[u8]) -> Result<Vec<f64>> {
        let params = self.params.with_carrier(carrier_frequency);
        params.validate()?;
        Self::render(&params, &FrameEncoder::encode_bits(payload))
    }

    fn render(params: &ChannelParams, bits: &[u8]) -> Result<Vec<f64>> {
        let samples_per_symbol = params.samples_per_symbol();
        if samples_per_symbol <= 0 {
            return Err(ModemError::InvalidParameter(format!(
                "{} samples per symbol",
                samples_per_symbol
            )));
        }
        let samples_per_symbol = samples_per_symbol as usize;
        let total = bits
            .len()
            .checked_mul(samples_per_symbol)
            .filter(|&n| n <= MAX_SIGNAL_SAMPLES)
            .ok_or_else(|| {
                ModemError::InvalidParameter(format!(
                    "{} bits at {} samples per symbol exceed the {} sample signal limit",
                    bits.len(),
                    samples_per_symbol,
                    MAX_SIGNAL_SAMPLES
                ))
            })?;

        // Both symbols are identical every time, render them once
        let tone0 = generate_tone(params.f0(), samples_per_symbol, params.sample_rate);
        let tone1 = generate_tone(params.f1(), samples_per_symbol, params.sample_rate);

        let mut samples = Vec::with_capacity(total);
        for &bit in bits {
            let tone = if bit & 1 == 1 { &tone1 } else { &tone0 };
            samples.extend_from_slice(tone);
        }

        Ok(samples)
    }
}

impl Default for BfskModulator {
    fn default() -> Self {
        Self {
            params: ChannelParams::default(),
        }
    }
}
