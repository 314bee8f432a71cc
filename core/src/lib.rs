//! Acoustic BFSK data modem
//!
//! Turns a byte payload into a two-tone audible waveform and recovers the
//! payload from a captured signal. Decoding tracks the energy of both tones
//! with a sliding single-bin DFT, trims the silent edges, slices soft bits
//! into one hard bit per symbol and checks the preamble/epilogue framing.

pub mod activity;
pub mod bfsk;
pub mod channel;
pub mod control;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod framing;
pub mod pcm;
pub mod slicer;
pub mod stft;

pub use channel::ChannelParams;
pub use control::{SessionControl, SessionState};
pub use decoder::Decoder;
pub use encoder::Encoder;
pub use error::{ModemError, Result};
pub use framing::{trim_trailing_padding, DecodeResult, FrameStatus};

// Default channel configuration
pub const DEFAULT_CARRIER_FREQUENCY: f64 = 6000.0; // Hz
pub const DEFAULT_FREQUENCY_DEVIATION: f64 = 1000.0; // Hz
pub const DEFAULT_SYMBOL_PERIOD: f64 = 0.1; // seconds
pub const DEFAULT_SAMPLE_RATE: f64 = 48000.0; // Hz

// Frame configuration
pub const PREAMBLE_BYTE: u8 = 0b0101_0101;
pub const PREAMBLE_LEN: usize = 2;
pub const EPILOGUE_BYTE: u8 = 0b1111_1111;
pub const EPILOGUE_LEN: usize = 1;
pub const FRAME_OVERHEAD_BYTES: usize = PREAMBLE_LEN + EPILOGUE_LEN; // 3

// Size limits: keep derived buffer sizes allocatable
pub const MAX_SAMPLE_RATE: f64 = 768_000.0; // Hz
pub const MAX_SAMPLES_PER_SYMBOL: usize = 1 << 22; // ~87 s at 48 kHz
pub const MAX_SIGNAL_SAMPLES: usize = 1 << 27; // ~46 min at 48 kHz

// Spectral tracking
pub const STFT_WINDOW: usize = 500; // samples
pub const STFT_HOP: usize = 100; // samples

// Activity trimming: windows above 1% of the peak energy carry signal
pub const ACTIVITY_THRESHOLD_RATIO: f64 = 0.01;

// Symbol decision
pub const SOFT_BIT_STEEPNESS: i32 = 30;
pub const HIGH_BAND: f64 = 0.9;
pub const LOW_BAND: f64 = 0.1;

/// Samples handed to an audio sink per write (100ms at 48kHz)
pub const PLAYBACK_CHUNK_SAMPLES: usize = 4800;
