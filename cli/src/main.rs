mod audio_io;
mod config;
mod error;
mod logging;
mod report;
mod server;
mod session;

use audio_io::{read_signal, write_signal};
use bfskmodem_core::{ChannelParams, Decoder, Encoder, SessionControl};
use clap::{Parser, Subcommand};
use config::ChannelArgs;
use error::CliError;
use report::DecodeReport;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "bfskmodem")]
#[command(version, about = "Send bytes over sound with binary FSK, and read them back", long_about = None)]
struct Cli {
    #[command(flatten)]
    channel: ChannelArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Encode a payload into a signal file (.wav, .pcm or .txt)
    Encode {
        /// Output signal file
        output: PathBuf,

        /// Binary file to send
        #[arg(short, long, required_unless_present = "message", conflicts_with = "message")]
        input: Option<PathBuf>,

        /// Text to send
        #[arg(short, long)]
        message: Option<String>,
    },

    /// Decode a signal file (.wav, .pcm or .txt)
    Decode {
        /// Input signal file
        input: PathBuf,

        /// Write the recovered payload here
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Include the raw symbol sequence
        #[arg(long)]
        symbols: bool,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,

        /// Strip trailing 0xFF padding bytes from the payload
        #[arg(long)]
        trim_padding: bool,
    },

    /// Stream the encoded signal as raw s16le PCM (stdout by default)
    Transmit {
        /// Binary file to send
        #[arg(short, long, required_unless_present = "message", conflicts_with = "message")]
        input: Option<PathBuf>,

        /// Text to send
        #[arg(short, long)]
        message: Option<String>,

        /// Write the stream to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Capture raw s16le PCM from stdin until EOF or Ctrl-C, then decode
    Receive {
        /// Keep the capture as a signal file
        #[arg(long)]
        save: Option<PathBuf>,

        /// Write the recovered payload here
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,

        /// Strip trailing 0xFF padding bytes from the payload
        #[arg(long)]
        trim_padding: bool,
    },

    /// Serve encode/decode over HTTP
    Serve {
        /// Address to listen on
        #[arg(long, default_value = "127.0.0.1:8080")]
        bind: SocketAddr,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init_logging();

    let cli = Cli::parse();
    let params = cli.channel.resolve()?;

    match cli.command {
        Commands::Encode { output, input, message } => {
            let payload = load_payload(input.as_deref(), message)?;
            encode_command(params, &payload, &output)?;
        }
        Commands::Decode {
            input,
            output,
            symbols,
            json,
            trim_padding,
        } => {
            let decoder = Decoder::new(params)?;
            let samples = read_signal(&input, params.sample_rate)?;
            let report = decode_samples(&decoder, &samples, trim_padding, symbols);
            emit_report(&report, output.as_deref(), json)?;
        }
        Commands::Transmit { input, message, output } => {
            let payload = load_payload(input.as_deref(), message)?;
            transmit_command(params, &payload, output.as_deref())?;
        }
        Commands::Receive {
            save,
            output,
            json,
            trim_padding,
        } => {
            receive_command(params, save.as_deref(), output.as_deref(), json, trim_padding)?;
        }
        Commands::Serve { bind } => {
            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(server::run(bind, params))?;
        }
    }

    Ok(())
}

fn load_payload(input: Option<&Path>, message: Option<String>) -> Result<Vec<u8>, CliError> {
    match (input, message) {
        (_, Some(message)) => Ok(message.into_bytes()),
        (Some(path), None) => {
            let data = std::fs::read(path)?;
            tracing::info!("Read {} bytes from {}", data.len(), path.display());
            Ok(data)
        }
        (None, None) => Err(CliError::BadRequest("pass --input or --message".to_string())),
    }
}

fn encode_command(params: ChannelParams, payload: &[u8], output: &Path) -> Result<(), CliError> {
    let encoder = Encoder::new(params)?;
    let samples = encoder.encode(payload)?;
    println!(
        "Encoded {} bytes to {} samples ({:.2} s)",
        payload.len(),
        samples.len(),
        encoder.duration_secs(payload.len())
    );

    write_signal(output, &samples, params.sample_rate)?;
    println!("Wrote {}", output.display());
    Ok(())
}

fn decode_samples(decoder: &Decoder, samples: &[f64], trim_padding: bool, with_symbols: bool) -> DecodeReport {
    DecodeReport::new(&decoder.decode(samples), trim_padding, with_symbols)
}

fn emit_report(report: &DecodeReport, output: Option<&Path>, json: bool) -> Result<(), CliError> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
    } else {
        println!("{}", report);
    }

    if let Some(path) = output {
        std::fs::write(path, &report.payload)?;
        tracing::info!("Wrote {} bytes to {}", report.payload.len(), path.display());
    }
    Ok(())
}

fn transmit_command(params: ChannelParams, payload: &[u8], output: Option<&Path>) -> Result<(), CliError> {
    let samples = Encoder::new(params)?.encode(payload)?;
    tracing::info!(
        "Transmitting {} bytes as {} samples at {} Hz",
        payload.len(),
        samples.len(),
        params.sample_rate
    );

    let control = SessionControl::new();
    session::stop_on_interrupt(&control)?;

    let written = match output {
        Some(path) => {
            let mut sink = BufWriter::new(File::create(path)?);
            session::transmit(&samples, &mut sink, &control)?
        }
        None => {
            let stdout = std::io::stdout();
            let mut sink = stdout.lock();
            let written = session::transmit(&samples, &mut sink, &control)?;
            sink.flush()?;
            written
        }
    };

    tracing::info!("Sent {} of {} samples", written, samples.len());
    Ok(())
}

fn receive_command(
    params: ChannelParams,
    save: Option<&Path>,
    output: Option<&Path>,
    json: bool,
    trim_padding: bool,
) -> Result<(), CliError> {
    let decoder = Decoder::new(params)?;
    let control = SessionControl::new();
    session::stop_on_interrupt(&control)?;

    tracing::info!("Listening on stdin (s16le, {} Hz); Ctrl-C to stop", params.sample_rate);
    let samples = session::receive(std::io::stdin(), &control)?;

    if let Some(path) = save {
        write_signal(path, &samples, params.sample_rate)?;
    }

    let report = decode_samples(&decoder, &samples, trim_padding, false);
    emit_report(&report, output, json)
}
