use crate::error::CliError;
use bfskmodem_core::pcm::{from_pcm16_le_bytes, to_pcm16_le_bytes};
use bfskmodem_core::{SessionControl, PLAYBACK_CHUNK_SAMPLES};
use std::io::{ErrorKind, Read, Write};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Duration;

/// How often a capture waiting on input checks for a stop request
const STOP_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Install a Ctrl-C handler that asks `control` to stop
pub fn stop_on_interrupt(control: &SessionControl) -> Result<(), CliError> {
    let handler_control = control.clone();
    ctrlc::set_handler(move || {
        if handler_control.request_stop() {
            tracing::info!("Interrupt received, stopping");
        }
    })?;
    Ok(())
}

/// Stream samples as s16le in playback-sized chunks until done or stopped
///
/// Returns the number of samples written.
pub fn transmit<W: Write>(samples: &[f64], sink: &mut W, control: &SessionControl) -> Result<usize, CliError> {
    control.start()?;
    let result = stream_chunks(samples, sink, control);
    control.finish();
    result
}

fn stream_chunks<W: Write>(samples: &[f64], sink: &mut W, control: &SessionControl) -> Result<usize, CliError> {
    let mut written = 0;
    for chunk in samples.chunks(PLAYBACK_CHUNK_SAMPLES) {
        if !control.is_running() {
            tracing::info!("Playback stopped after {} of {} samples", written, samples.len());
            break;
        }
        sink.write_all(&to_pcm16_le_bytes(chunk))?;
        written += chunk.len();
    }
    sink.flush()?;
    Ok(written)
}

/// Capture s16le from `source` until EOF or a stop request
///
/// A stop request ends the capture even while `source` is blocked in a read.
pub fn receive<R: Read + Send + 'static>(source: R, control: &SessionControl) -> Result<Vec<f64>, CliError> {
    control.start()?;
    let result = capture(source, control);
    control.finish();
    result
}

// ctrlc installs its handler with SA_RESTART, so a blocked stdin read is not
// woken by Ctrl-C. Reads run on their own thread and this loop polls the stop
// flag between chunks; a reader still blocked after a stop is left behind.
fn capture<R: Read + Send + 'static>(source: R, control: &SessionControl) -> Result<Vec<f64>, CliError> {
    let chunks = spawn_reader(source);
    let mut pcm = Vec::new();

    while control.is_running() {
        match chunks.recv_timeout(STOP_POLL_INTERVAL) {
            Ok(chunk) => pcm.extend_from_slice(&chunk?),
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }

    tracing::info!("Captured {} bytes", pcm.len());
    Ok(from_pcm16_le_bytes(&pcm))
}

/// Read `source` to EOF on a helper thread, forwarding each chunk
fn spawn_reader<R: Read + Send + 'static>(mut source: R) -> mpsc::Receiver<std::io::Result<Vec<u8>>> {
    let (sender, receiver) = mpsc::sync_channel(16);
    thread::spawn(move || {
        let mut buffer = vec![0u8; PLAYBACK_CHUNK_SAMPLES * 2];
        loop {
            let chunk = match source.read(&mut buffer) {
                Ok(0) => break,
                Ok(n) => Ok(buffer[..n].to_vec()),
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => Err(e),
            };
            let failed = chunk.is_err();
            if sender.send(chunk).is_err() || failed {
                break;
            }
        }
    });
    receiver
}

#[cfg(test)]
mod tests {
    use super::*;
    use bfskmodem_core::{ModemError, SessionState};
    use std::io::Cursor;
    use std::time::Instant;

    /// Source that yields one chunk and then blocks like an idle stdin
    struct StallAfterFirstRead {
        first: Option<Vec<u8>>,
    }

    impl Read for StallAfterFirstRead {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            match self.first.take() {
                Some(bytes) => {
                    buf[..bytes.len()].copy_from_slice(&bytes);
                    Ok(bytes.len())
                }
                None => loop {
                    thread::park();
                },
            }
        }
    }

    /// Source whose first read fails
    struct Broken;

    impl Read for Broken {
        fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
            Err(std::io::Error::other("device unplugged"))
        }
    }

    /// Sink that asks the session to stop after its first chunk
    struct StopAfterFirstWrite {
        control: SessionControl,
        bytes: Vec<u8>,
    }

    impl Write for StopAfterFirstWrite {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.bytes.extend_from_slice(buf);
            self.control.request_stop();
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_transmit_writes_every_sample() {
        let control = SessionControl::new();
        let samples = vec![0.25; PLAYBACK_CHUNK_SAMPLES * 2 + 10];
        let mut sink = Vec::new();

        let written = transmit(&samples, &mut sink, &control).unwrap();
        assert_eq!(written, samples.len());
        assert_eq!(sink.len(), samples.len() * 2);
        assert_eq!(control.state(), SessionState::Idle);
    }

    #[test]
    fn test_transmit_honours_stop() {
        let control = SessionControl::new();
        let samples = vec![0.25; PLAYBACK_CHUNK_SAMPLES * 3];
        let mut sink = StopAfterFirstWrite {
            control: control.clone(),
            bytes: Vec::new(),
        };

        let written = transmit(&samples, &mut sink, &control).unwrap();
        assert_eq!(written, PLAYBACK_CHUNK_SAMPLES);
        assert_eq!(sink.bytes.len(), PLAYBACK_CHUNK_SAMPLES * 2);
        assert_eq!(control.state(), SessionState::Idle);
    }

    #[test]
    fn test_busy_session_rejected() {
        let control = SessionControl::new();
        control.start().unwrap();

        let mut sink = Vec::new();
        let err = transmit(&[0.0; 10], &mut sink, &control).unwrap_err();
        assert!(matches!(err, CliError::Modem(ModemError::SessionBusy)));
        assert!(sink.is_empty());
        // the rejected call must not reset someone else's session
        assert!(control.is_running());
    }

    #[test]
    fn test_receive_reads_until_eof() {
        let samples: Vec<f64> = (0..10_000).map(|i| ((i % 200) as f64 - 100.0) / 200.0).collect();
        let source = Cursor::new(to_pcm16_le_bytes(&samples));

        let control = SessionControl::new();
        let captured = receive(source, &control).unwrap();
        assert_eq!(captured.len(), samples.len());
        for (a, b) in samples.iter().zip(&captured) {
            assert!((a - b).abs() < 1e-4);
        }
        assert_eq!(control.state(), SessionState::Idle);
    }

    #[test]
    fn test_receive_stops_while_source_is_blocked() {
        let source = StallAfterFirstRead {
            first: Some(to_pcm16_le_bytes(&[0.5; 100])),
        };
        let control = SessionControl::new();
        let stopper = control.clone();
        let started = Instant::now();
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(300));
            stopper.request_stop();
        });

        let captured = receive(source, &control).unwrap();
        handle.join().unwrap();
        assert_eq!(captured.len(), 100);
        assert!(started.elapsed() < Duration::from_secs(5));
        assert_eq!(control.state(), SessionState::Idle);
    }

    #[test]
    fn test_receive_reports_read_errors() {
        let control = SessionControl::new();
        let err = receive(Broken, &control).unwrap_err();
        assert!(matches!(err, CliError::Io(_)));
        assert_eq!(control.state(), SessionState::Idle);
    }
}
