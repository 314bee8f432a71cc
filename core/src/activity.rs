//! Locate the part of the tracked spectrum that actually carries a signal.

use crate::stft::ToneTracks;
use crate::ACTIVITY_THRESHOLD_RATIO;
use std::ops::Range;

/// Window interval whose combined tone energy exceeds 1% of the peak
///
/// `None` when nothing rises above the threshold, which includes all-zero
/// input where the peak itself is zero.
pub fn active_range(tracks: &ToneTracks) -> Option<Range<usize>> {
    let energy = tracks.energy();
    let max = energy.iter().copied().fold(0.0f64, f64::max);
    let threshold = max * ACTIVITY_THRESHOLD_RATIO;

    let start = energy.iter().position(|&e| e > threshold)?;
    let last = energy.iter().rposition(|&e| e > threshold)?;
    Some(start..last + 1)
}

/// Cut both tracks down to their active range
///
/// Returns empty tracks when no activity is found.
pub fn trim(tracks: &ToneTracks) -> ToneTracks {
    match active_range(tracks) {
        Some(range) => {
            log::debug!(
                "Active windows {}..{} of {}",
                range.start,
                range.end,
                tracks.len()
            );
            ToneTracks::new(
                tracks.track0()[range.clone()].to_vec(),
                tracks.track1()[range].to_vec(),
            )
        }
        None => {
            log::debug!("No window above the noise threshold");
            ToneTracks::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracks(track0: &[f64], track1: &[f64]) -> ToneTracks {
        ToneTracks::new(track0.to_vec(), track1.to_vec())
    }

    #[test]
    fn test_trims_quiet_edges() {
        let input = tracks(
            &[0.01, 0.02, 10.0, 0.5, 9.0, 0.03],
            &[0.00, 0.01, 0.5, 10.0, 0.4, 0.02],
        );
        assert_eq!(active_range(&input), Some(2..5));

        let trimmed = trim(&input);
        assert_eq!(trimmed.track0(), [10.0, 0.5, 9.0]);
        assert_eq!(trimmed.track1(), [0.5, 10.0, 0.4]);
    }

    #[test]
    fn test_last_active_window_is_kept() {
        let input = tracks(&[0.0, 5.0, 5.0], &[0.0, 0.0, 5.0]);
        assert_eq!(active_range(&input), Some(1..3));
    }

    #[test]
    fn test_quiet_gap_inside_is_kept() {
        let input = tracks(&[10.0, 0.0, 10.0], &[0.0, 0.0, 0.0]);
        assert_eq!(active_range(&input), Some(0..3));
    }

    #[test]
    fn test_threshold_one_percent_of_peak() {
        // peak energy 100: 0.81 is below 1%, 1.21 above
        let input = tracks(&[0.9, 10.0, 1.1], &[0.0, 0.0, 0.0]);
        assert_eq!(active_range(&input), Some(1..3));
    }

    #[test]
    fn test_silence_yields_empty() {
        let input = tracks(&[0.0; 5], &[0.0; 5]);
        assert_eq!(active_range(&input), None);
        assert!(trim(&input).is_empty());
    }

    #[test]
    fn test_empty_input() {
        let input = ToneTracks::default();
        assert_eq!(active_range(&input), None);
        assert!(trim(&input).is_empty());
    }

    #[test]
    fn test_trim_is_idempotent() {
        let input = tracks(
            &[0.1, 3.0, 7.0, 0.2, 8.0, 0.1, 0.0],
            &[0.0, 6.0, 0.3, 9.0, 0.1, 0.2, 0.1],
        );
        let once = trim(&input);
        assert_eq!(active_range(&once), Some(0..once.len()));
        assert_eq!(trim(&once), once);
    }
}
