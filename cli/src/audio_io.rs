use crate::error::CliError;
use bfskmodem_core::pcm::{downmix, from_pcm16, from_pcm16_le_bytes, resample, to_pcm16, to_pcm16_le_bytes};
use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use std::fs::File;
use std::io::{BufReader, BufWriter, Cursor, Read, Seek, Write};
use std::path::Path;

/// On-disk signal representation, chosen by file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalFormat {
    /// 16-bit mono WAV on write; 16/24/32-bit int or 32-bit float, any
    /// channel count and rate on read
    Wav,
    /// Headerless signed 16-bit little-endian mono
    Pcm,
    /// One decimal sample per line
    Text,
}

impl SignalFormat {
    pub fn from_path(path: &Path) -> Result<Self, CliError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());

        match extension.as_deref() {
            Some("wav") => Ok(SignalFormat::Wav),
            Some("pcm") | Some("raw") => Ok(SignalFormat::Pcm),
            Some("txt") => Ok(SignalFormat::Text),
            _ => Err(CliError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

fn wav_spec(sample_rate: f64) -> WavSpec {
    WavSpec {
        channels: 1,
        sample_rate: sample_rate.round() as u32,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    }
}

fn write_wav<W: Write + Seek>(sink: W, samples: &[f64], sample_rate: f64) -> Result<(), CliError> {
    let mut writer = WavWriter::new(sink, wav_spec(sample_rate))?;
    for sample in to_pcm16(samples) {
        writer.write_sample(sample)?;
    }
    writer.finalize()?;
    Ok(())
}

/// Encode samples as an in-memory 16-bit mono WAV file
pub fn wav_bytes(samples: &[f64], sample_rate: f64) -> Result<Vec<u8>, CliError> {
    let mut cursor = Cursor::new(Vec::new());
    write_wav(&mut cursor, samples, sample_rate)?;
    Ok(cursor.into_inner())
}

/// Read a WAV stream as mono samples at `target_rate`
pub fn samples_from_wav<R: Read>(mut reader: WavReader<R>, target_rate: f64) -> Result<Vec<f64>, CliError> {
    let spec = reader.spec();
    tracing::info!(
        "Read WAV: {} Hz, {} channels, {} bits",
        spec.sample_rate,
        spec.channels,
        spec.bits_per_sample
    );

    let interleaved: Vec<f64> = match (spec.sample_format, spec.bits_per_sample) {
        (SampleFormat::Int, 16) => {
            let int_samples: Result<Vec<i16>, _> = reader.samples::<i16>().collect();
            from_pcm16(&int_samples?)
        }
        (SampleFormat::Int, bits) if bits > 16 && bits <= 32 => {
            let full_scale = ((1i64 << (bits - 1)) - 1) as f64;
            let int_samples: Result<Vec<i32>, _> = reader.samples::<i32>().collect();
            int_samples?.into_iter().map(|s| s as f64 / full_scale).collect()
        }
        (SampleFormat::Float, 32) => {
            let float_samples: Result<Vec<f32>, _> = reader.samples::<f32>().collect();
            float_samples?.into_iter().map(f64::from).collect()
        }
        (format, bits) => {
            return Err(CliError::UnsupportedFormat(format!(
                "{:?} WAV with {} bits per sample",
                format, bits
            )));
        }
    };

    let mono = downmix(&interleaved, spec.channels as usize)?;
    let source_rate = f64::from(spec.sample_rate);
    Ok(resample(&mono, source_rate, target_rate)?)
}

/// Decode an in-memory WAV file
pub fn samples_from_wav_bytes(bytes: &[u8], target_rate: f64) -> Result<Vec<f64>, CliError> {
    samples_from_wav(WavReader::new(Cursor::new(bytes))?, target_rate)
}

fn parse_text(text: &str) -> Result<Vec<f64>, CliError> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(index, line)| {
            line.trim()
                .parse::<f64>()
                .map_err(|source| CliError::BadSample { line: index + 1, source })
        })
        .collect()
}

/// Write a signal file; WAV files are stamped with `sample_rate`
pub fn write_signal(path: &Path, samples: &[f64], sample_rate: f64) -> Result<(), CliError> {
    match SignalFormat::from_path(path)? {
        SignalFormat::Wav => write_wav(BufWriter::new(File::create(path)?), samples, sample_rate)?,
        SignalFormat::Pcm => std::fs::write(path, to_pcm16_le_bytes(samples))?,
        SignalFormat::Text => {
            let mut writer = BufWriter::new(File::create(path)?);
            for sample in samples {
                writeln!(writer, "{}", sample)?;
            }
            writer.flush()?;
        }
    }
    tracing::info!("Wrote {} samples to {}", samples.len(), path.display());
    Ok(())
}

/// Read a signal file as mono samples at `sample_rate`
///
/// Only WAV carries its own rate; PCM and text files are taken to already
/// be at `sample_rate`.
pub fn read_signal(path: &Path, sample_rate: f64) -> Result<Vec<f64>, CliError> {
    let samples = match SignalFormat::from_path(path)? {
        SignalFormat::Wav => {
            let reader = WavReader::new(BufReader::new(File::open(path)?))?;
            samples_from_wav(reader, sample_rate)?
        }
        SignalFormat::Pcm => from_pcm16_le_bytes(&std::fs::read(path)?),
        SignalFormat::Text => parse_text(&std::fs::read_to_string(path)?)?,
    };
    tracing::info!("Read {} samples from {}", samples.len(), path.display());
    Ok(samples)
}
