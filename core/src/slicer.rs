use crate::stft::ToneTracks;
use crate::{HIGH_BAND, LOW_BAND, SOFT_BIT_STEEPNESS};

/// Soft bit from the two tone magnitudes of one window
///
/// v = 1 / (1 + (m1/m0)^-30): near 1 when f1 dominates, near 0 when f0 does.
/// With no f0 energy the ratio is undefined; any f1 energy reads as 1 and a
/// window with neither tone reads as 0.5, which falls in neither decision band.
pub fn soft_bit(m0: f64, m1: f64) -> f64 {
    if m0 == 0.0 {
        return if m1 > 0.0 { 1.0 } else { 0.5 };
    }
    1.0 / (1.0 + (m1 / m0).powi(-SOFT_BIT_STEEPNESS))
}

/// Soft bit per window of the (trimmed) tracks
pub fn soft_bits(tracks: &ToneTracks) -> Vec<f64> {
    tracks
        .track0()
        .iter()
        .zip(tracks.track1())
        .map(|(&m0, &m1)| soft_bit(m0, m1))
        .collect()
}

/// Majority vote over the soft bits of one symbol; ties go to 0
pub fn hard_decision(soft: &[f64]) -> u8 {
    let high = soft.iter().filter(|&&v| v > HIGH_BAND).count();
    let low = soft.iter().filter(|&&v| v < LOW_BAND).count();
    if high > low {
        1
    } else {
        0
    }
}

/// One hard bit per symbol period
///
/// Symbol `s` covers windows `[round(s·w), round((s+1)·w))`, clipped to the
/// sequence. Slicing ends at the first symbol that would start past the
/// last window.
pub fn slice_symbols(soft: &[f64], windows_per_symbol: f64) -> Vec<u8> {
    if windows_per_symbol.is_nan() || windows_per_symbol <= 0.0 {
        return Vec::new();
    }

    let mut symbols = Vec::new();
    for s in 0usize.. {
        let start = (s as f64 * windows_per_symbol).round() as usize;
        if start >= soft.len() {
            break;
        }
        let end = (((s + 1) as f64 * windows_per_symbol).round() as usize).min(soft.len());
        symbols.push(hard_decision(&soft[start..end]));
    }
    symbols
}

/// Trimmed tracks straight to symbols
pub fn decide(tracks: &ToneTracks, windows_per_symbol: f64) -> Vec<u8> {
    slice_symbols(&soft_bits(tracks), windows_per_symbol)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_soft_bit_extremes() {
        assert!(soft_bit(100.0, 1.0) < 1e-6);
        assert!(soft_bit(1.0, 100.0) > 1.0 - 1e-6);
        assert!((soft_bit(3.0, 3.0) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_soft_bit_is_steep() {
        // a 10% energy advantage is already decisive
        assert!(soft_bit(1.0, 1.1) > HIGH_BAND);
        assert!(soft_bit(1.1, 1.0) < LOW_BAND);
    }

    #[test]
    fn test_soft_bit_singularities() {
        assert_eq!(soft_bit(0.0, 2.0), 1.0);
        assert_eq!(soft_bit(0.0, 0.0), 0.5);
        assert_eq!(soft_bit(2.0, 0.0), 0.0);
        assert_eq!(soft_bit(1e-300, 1.0), 1.0);
        assert!(!soft_bit(1.0, 1e-300).is_nan());
    }

    #[test]
    fn test_soft_bits_from_tracks() {
        let tracks = ToneTracks::new(vec![10.0, 0.1, 0.0], vec![0.1, 10.0, 0.0]);
        let soft = soft_bits(&tracks);
        assert_eq!(soft.len(), 3);
        assert!(soft[0] < LOW_BAND);
        assert!(soft[1] > HIGH_BAND);
        assert_eq!(soft[2], 0.5);
    }

    #[test]
    fn test_hard_decision_majority() {
        assert_eq!(hard_decision(&[0.95, 0.99, 0.05]), 1);
        assert_eq!(hard_decision(&[0.95, 0.01, 0.05]), 0);
        // undecided windows do not vote
        assert_eq!(hard_decision(&[0.5, 0.5, 0.95]), 1);
    }

    #[test]
    fn test_hard_decision_ties_are_zero() {
        assert_eq!(hard_decision(&[0.95, 0.05]), 0);
        assert_eq!(hard_decision(&[0.5, 0.5]), 0);
        assert_eq!(hard_decision(&[]), 0);
    }

    #[test]
    fn test_slice_whole_symbols() {
        let mut soft = vec![1.0; 4];
        soft.extend(vec![0.0; 4]);
        soft.extend(vec![1.0; 4]);
        assert_eq!(slice_symbols(&soft, 4.0), vec![1, 0, 1]);
    }

    #[test]
    fn test_slice_partial_last_symbol() {
        let soft = vec![1.0, 1.0, 1.0, 1.0, 0.0, 0.0];
        assert_eq!(slice_symbols(&soft, 4.0), vec![1, 0]);
    }

    #[test]
    fn test_slice_fractional_windows_per_symbol() {
        // 2.5 windows per symbol: boundaries 0, 3, 5, 8, 10 (halves round up)
        let soft = vec![1.0, 1.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 0.0, 0.0];
        assert_eq!(slice_symbols(&soft, 2.5), vec![1, 0, 1, 0]);
    }

    #[test]
    fn test_slice_empty() {
        assert!(slice_symbols(&[], 48.0).is_empty());
        assert!(slice_symbols(&[1.0; 10], 0.0).is_empty());
    }

    #[test]
    fn test_decide_from_tracks() {
        let track0 = [vec![50.0; 3], vec![1.0; 3]].concat();
        let track1 = [vec![1.0; 3], vec![50.0; 3]].concat();
        let tracks = ToneTracks::new(track0, track1);
        assert_eq!(decide(&tracks, 3.0), vec![0, 1]);
    }
}
