use crate::error::{ModemError, Result};
use crate::{
    DEFAULT_CARRIER_FREQUENCY, DEFAULT_FREQUENCY_DEVIATION, DEFAULT_SAMPLE_RATE,
    DEFAULT_SYMBOL_PERIOD, MAX_SAMPLES_PER_SYMBOL, MAX_SAMPLE_RATE, STFT_HOP,
};
use serde::{Deserialize, Serialize};

/// BFSK channel configuration
///
/// Bit 0 is sent at `f0 = fc - fd`, bit 1 at `f1 = fc + fd`. Each bit lasts
/// one symbol period and the waveform is sampled at `sample_rate`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelParams {
    /// Carrier frequency `fc` in Hz
    pub carrier_frequency: f64,
    /// Frequency deviation `fd` in Hz
    pub frequency_deviation: f64,
    /// Symbol period `ts` in seconds
    pub symbol_period: f64,
    /// Sample rate `fs` in Hz
    pub sample_rate: f64,
}

impl ChannelParams {
    pub fn new(
        carrier_frequency: f64,
        frequency_deviation: f64,
        symbol_period: f64,
        sample_rate: f64,
    ) -> Self {
        Self {
            carrier_frequency,
            frequency_deviation,
            symbol_period,
            sample_rate,
        }
    }

    /// Same channel with a different carrier
    pub fn with_carrier(self, carrier_frequency: f64) -> Self {
        Self {
            carrier_frequency,
            ..self
        }
    }

    /// Tone for bit 0
    pub fn f0(&self) -> f64 {
        self.carrier_frequency - self.frequency_deviation
    }

    /// Tone for bit 1
    pub fn f1(&self) -> f64 {
        self.carrier_frequency + self.frequency_deviation
    }

    pub fn nyquist(&self) -> f64 {
        self.sample_rate / 2.0
    }

    /// round(ts * fs); may be zero or negative for a bad configuration
    pub fn samples_per_symbol(&self) -> i64 {
        (self.symbol_period * self.sample_rate).round() as i64
    }

    /// Analysis windows spanned by one symbol, ts * fs / hop
    ///
    /// Kept fractional: symbol boundaries are rounded one at a time so they
    /// do not drift when the ratio is not an integer.
    pub fn windows_per_symbol(&self) -> f64 {
        self.symbol_period * self.sample_rate / STFT_HOP as f64
    }

    /// Check the invariants the synthesizer relies on
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("carrier frequency", self.carrier_frequency),
            ("frequency deviation", self.frequency_deviation),
            ("symbol period", self.symbol_period),
            ("sample rate", self.sample_rate),
        ];
        for (name, value) in fields {
            if !value.is_finite() || value <= 0.0 {
                return Err(ModemError::InvalidParameter(format!(
                    "{} must be a positive number, got {}",
                    name, value
                )));
            }
        }

        if self.sample_rate > MAX_SAMPLE_RATE {
            return Err(ModemError::InvalidParameter(format!(
                "sample rate {} Hz is above the {} Hz limit",
                self.sample_rate, MAX_SAMPLE_RATE
            )));
        }

        if self.frequency_deviation >= self.carrier_frequency {
            return Err(ModemError::InvalidParameter(format!(
                "deviation {} Hz must be below carrier {} Hz",
                self.frequency_deviation, self.carrier_frequency
            )));
        }

        if self.f1() >= self.nyquist() {
            return Err(ModemError::InvalidParameter(format!(
                "f1 = {} Hz is not below Nyquist ({} Hz)",
                self.f1(),
                self.nyquist()
            )));
        }

        // samples_per_symbol saturates, so huge periods land on i64::MAX
        let samples_per_symbol = self.samples_per_symbol();
        if samples_per_symbol <= 0 || samples_per_symbol > MAX_SAMPLES_PER_SYMBOL as i64 {
            return Err(ModemError::InvalidParameter(format!(
                "symbol period {} s at {} Hz yields {} samples per symbol (limit {})",
                self.symbol_period, self.sample_rate, samples_per_symbol, MAX_SAMPLES_PER_SYMBOL
            )));
        }

        Ok(())
    }

    /// Stricter check for decoding: every symbol must span at least one
    /// analysis window.
    pub fn validate_for_decode(&self) -> Result<()> {
        self.validate()?;
        if self.windows_per_symbol() < 1.0 {
            return Err(ModemError::InvalidParameter(format!(
                "symbol period {} s is shorter than one analysis hop ({} samples)",
                self.symbol_period, STFT_HOP
            )));
        }
        Ok(())
    }
}

impl Default for ChannelParams {
    fn default() -> Self {
        Self {
            carrier_frequency: DEFAULT_CARRIER_FREQUENCY,
            frequency_deviation: DEFAULT_FREQUENCY_DEVIATION,
            symbol_period: DEFAULT_SYMBOL_PERIOD,
            sample_rate: DEFAULT_SAMPLE_RATE,
        }
    }
}
