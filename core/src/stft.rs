use crate::{STFT_HOP, STFT_WINDOW};
use std::f64::consts::PI;

/// Magnitude of two tones over time, one value per analysis window
///
/// Both tracks always have the same length.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToneTracks {
    track0: Vec<f64>,
    track1: Vec<f64>,
}

impl ToneTracks {
    /// # Panics
    /// If the tracks differ in length.
    pub fn new(track0: Vec<f64>, track1: Vec<f64>) -> Self {
        assert_eq!(
            track0.len(),
            track1.len(),
            "tone tracks must cover the same windows"
        );
        Self { track0, track1 }
    }

    /// Energy at f0 (bit 0)
    pub fn track0(&self) -> &[f64] {
        &self.track0
    }

    /// Energy at f1 (bit 1)
    pub fn track1(&self) -> &[f64] {
        &self.track1
    }

    pub fn len(&self) -> usize {
        self.track0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.track0.is_empty()
    }

    /// track0[i]² + track1[i]²
    pub fn energy(&self) -> Vec<f64> {
        self.track0
            .iter()
            .zip(&self.track1)
            .map(|(a, b)| a * a + b * b)
            .collect()
    }
}

/// Number of hops that fit: floor((len - hop) / hop) + 1, zero below one hop
pub fn window_count(signal_len: usize, hop: usize) -> usize {
    if signal_len < hop {
        0
    } else {
        (signal_len - hop) / hop + 1
    }
}

/// DFT bin index nearest to `frequency` for a window of `n` samples
pub fn frequency_bin(frequency: f64, n: usize, sample_rate: f64) -> usize {
    (frequency * n as f64 / sample_rate).round().max(0.0) as usize
}

/// Single DFT coefficient X[k] = Σ x[m]·exp(-2πi·k·m/n), as (re, im)
pub fn dft_bin(window: &[f64], k: usize) -> (f64, f64) {
    let n = window.len();
    if n == 0 {
        return (0.0, 0.0);
    }

    let mut re = 0.0;
    let mut im = 0.0;
    for (m, &x) in window.iter().enumerate() {
        // reduce k·m mod n first so the angle stays small and exact
        let theta = 2.0 * PI * ((k * m) % n) as f64 / n as f64;
        re += x * theta.cos();
        im -= x * theta.sin();
    }
    (re, im)
}

/// |X[k]| over `window`
pub fn dft_magnitude(window: &[f64], k: usize) -> f64 {
    let (re, im) = dft_bin(window, k);
    re.hypot(im)
}

/// cos/sin table for one bin over a full-length window
struct Twiddles {
    k: usize,
    cos: Vec<f64>,
    sin: Vec<f64>,
}

impl Twiddles {
    fn new(k: usize, n: usize) -> Self {
        let (cos, sin) = (0..n)
            .map(|m| {
                let theta = 2.0 * PI * ((k * m) % n) as f64 / n as f64;
                (theta.cos(), theta.sin())
            })
            .unzip();
        Self { k, cos, sin }
    }

    fn magnitude(&self, window: &[f64]) -> f64 {
        let mut re = 0.0;
        let mut im = 0.0;
        for ((&x, &c), &s) in window.iter().zip(&self.cos).zip(&self.sin) {
            re += x * c;
            im -= x * s;
        }
        re.hypot(im)
    }
}

/// Sliding-window single-bin DFT
///
/// Windows start every `hop` samples and span `window` samples, cut short at
/// the end of the signal. The bin for each target frequency is recomputed
/// from the actual window length, so the shortened tail windows are still
/// tuned to the right tone.
pub struct SpectralTracker {
    sample_rate: f64,
    window: usize,
    hop: usize,
}

impl SpectralTracker {
    pub fn new(sample_rate: f64) -> Self {
        Self {
            sample_rate,
            window: STFT_WINDOW,
            hop: STFT_HOP,
        }
    }

    pub fn window_len(&self) -> usize {
        self.window
    }

    pub fn hop(&self) -> usize {
        self.hop
    }

    /// Magnitude track for each frequency in `frequencies`
    pub fn stft(&self, signal: &[f64], frequencies: &[f64]) -> Vec<Vec<f64>> {
        let count = window_count(signal.len(), self.hop);
        let full: Vec<Twiddles> = frequencies
            .iter()
            .map(|&f| Twiddles::new(frequency_bin(f, self.window, self.sample_rate), self.window))
            .collect();

        let mut tracks = vec![Vec::with_capacity(count); frequencies.len()];
        for i in 0..count {
            let start = i * self.hop;
            let end = (start + self.window).min(signal.len());
            let segment = &signal[start..end];

            for ((track, &f), twiddles) in tracks.iter_mut().zip(frequencies).zip(&full) {
                let magnitude = if segment.len() == self.window {
                    twiddles.magnitude(segment)
                } else {
                    let k = frequency_bin(f, segment.len(), self.sample_rate);
                    dft_magnitude(segment, k)
                };
                track.push(magnitude);
            }
        }

        tracks
    }

    /// Track the bit-0 and bit-1 tones in lockstep
    pub fn track(&self, signal: &[f64], f0: f64, f1: f64) -> ToneTracks {
        let mut tracks = self.stft(signal, &[f0, f1]);
        let track1 = tracks.pop().unwrap_or_default();
        let track0 = tracks.pop().unwrap_or_default();
        log::debug!(
            "Tracked {} windows at f0 = {} Hz (bin {}), f1 = {} Hz (bin {})",
            track0.len(),
            f0,
            self.full_window_bin(f0),
            f1,
            self.full_window_bin(f1)
        );
        ToneTracks::new(track0, track1)
    }

    fn full_window_bin(&self, frequency: f64) -> usize {
        frequency_bin(frequency, self.window, self.sample_rate)
    }
}
