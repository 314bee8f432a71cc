//! PCM sample conversion for feeding the modem from audio devices and files
//!
//! Samples inside the modem are `f64` in [-1, 1]. Audio sinks and sources
//! speak 16-bit signed little-endian PCM, sometimes interleaved and at a
//! different rate; these helpers bridge the two.

use crate::error::{ModemError, Result};
use crate::MAX_SIGNAL_SAMPLES;

const PCM16_SCALE: f64 = i16::MAX as f64; // 32767

/// Scale to 16-bit PCM, saturating anything outside [-1, 1]
pub fn to_pcm16(samples: &[f64]) -> Vec<i16> {
    samples
        .iter()
        .map(|&s| {
            if s > 1.0 {
                i16::MAX
            } else if s < -1.0 {
                i16::MIN
            } else {
                (s * PCM16_SCALE).round() as i16
            }
        })
        .collect()
}

/// 16-bit PCM back to [-1, 1]
pub fn from_pcm16(samples: &[i16]) -> Vec<f64> {
    samples.iter().map(|&s| s as f64 / PCM16_SCALE).collect()
}

/// Raw s16le byte stream
pub fn to_pcm16_le_bytes(samples: &[f64]) -> Vec<u8> {
    to_pcm16(samples)
        .into_iter()
        .flat_map(i16::to_le_bytes)
        .collect()
}

/// Parse a raw s16le byte stream
///
/// A dangling odd byte is dropped; capture buffers can end mid-sample.
pub fn from_pcm16_le_bytes(bytes: &[u8]) -> Vec<f64> {
    if bytes.len() % 2 != 0 {
        log::warn!(
            "PCM stream has odd length {}, dropping the last byte",
            bytes.len()
        );
    }
    bytes
        .chunks_exact(2)
        .map(|pair| i16::from_le_bytes([pair[0], pair[1]]) as f64 / PCM16_SCALE)
        .collect()
}

/// Average interleaved channels down to mono
///
/// # Arguments
/// * `samples` - Interleaved audio [c0, c1, ..., c0, c1, ...]
/// * `channels` - Number of interleaved channels
pub fn downmix(samples: &[f64], channels: usize) -> Result<Vec<f64>> {
    if channels == 0 {
        return Err(ModemError::InvalidPcm("zero channels".to_string()));
    }
    if channels == 1 {
        return Ok(samples.to_vec());
    }
    if samples.len() % channels != 0 {
        return Err(ModemError::InvalidPcm(format!(
            "{} samples do not divide into {} channels",
            samples.len(),
            channels
        )));
    }

    Ok(samples
        .chunks_exact(channels)
        .map(|frame| frame.iter().sum::<f64>() / channels as f64)
        .collect())
}

/// Resample to a target sample rate using linear interpolation
///
/// # Example
/// ```
/// use bfskmodem_core::pcm::resample;
/// let audio_24k = vec![0.0; 24000];
/// let audio_48k = resample(&audio_24k, 24000.0, 48000.0).unwrap();
/// assert_eq!(audio_48k.len(), 48000);
/// ```
pub fn resample(samples: &[f64], from_rate: f64, to_rate: f64) -> Result<Vec<f64>> {
    if !(from_rate.is_finite() && to_rate.is_finite()) || from_rate <= 0.0 || to_rate <= 0.0 {
        return Err(ModemError::InvalidPcm(format!(
            "cannot resample from {} Hz to {} Hz",
            from_rate, to_rate
        )));
    }
    if from_rate == to_rate || samples.is_empty() {
        return Ok(samples.to_vec());
    }

    log::info!("Resampling {} samples from {} Hz to {} Hz", samples.len(), from_rate, to_rate);

    let ratio = to_rate / from_rate;
    let new_length = ((samples.len() as f64) * ratio).ceil();
    if new_length > MAX_SIGNAL_SAMPLES as f64 {
        return Err(ModemError::InvalidPcm(format!(
            "resampling {} samples from {} Hz to {} Hz exceeds the {} sample limit",
            samples.len(),
            from_rate,
            to_rate,
            MAX_SIGNAL_SAMPLES
        )));
    }
    let new_length = new_length as usize;
    let mut resampled = Vec::with_capacity(new_length);

    for i in 0..new_length {
        let src_idx = i as f64 / ratio;
        let src_idx_floor = (src_idx.floor() as usize).min(samples.len() - 1);
        let src_idx_ceil = src_idx_floor + 1;
        let fraction = src_idx - src_idx_floor as f64;

        let interpolated = if src_idx_ceil < samples.len() {
            samples[src_idx_floor] * (1.0 - fraction) + samples[src_idx_ceil] * fraction
        } else {
            samples[src_idx_floor]
        };

        resampled.push(interpolated);
    }

    Ok(resampled)
}
