use crate::error::CliError;
use bfskmodem_core::ChannelParams;
use clap::Args;
use std::path::PathBuf;

/// Channel parameters shared by every subcommand
#[derive(Args, Debug, Clone, Default)]
pub struct ChannelArgs {
    /// JSON file with channel parameters (missing fields use defaults)
    #[arg(long, global = true, value_name = "FILE.JSON")]
    pub config: Option<PathBuf>,

    /// Carrier frequency in Hz [default: 6000]
    #[arg(long, global = true)]
    pub carrier: Option<f64>,

    /// Frequency deviation in Hz [default: 1000]
    #[arg(long, global = true)]
    pub deviation: Option<f64>,

    /// Symbol period in seconds [default: 0.1]
    #[arg(long, global = true)]
    pub symbol_period: Option<f64>,

    /// Sample rate in Hz [default: 48000]
    #[arg(long, global = true)]
    pub sample_rate: Option<f64>,
}

impl ChannelArgs {
    /// Defaults, then the config file, then command-line overrides
    pub fn resolve(&self) -> Result<ChannelParams, CliError> {
        let mut params = match &self.config {
            Some(path) => {
                let text = std::fs::read_to_string(path)?;
                serde_json::from_str(&text)?
            }
            None => ChannelParams::default(),
        };

        if let Some(carrier) = self.carrier {
            params.carrier_frequency = carrier;
        }
        if let Some(deviation) = self.deviation {
            params.frequency_deviation = deviation;
        }
        if let Some(symbol_period) = self.symbol_period {
            params.symbol_period = symbol_period;
        }
        if let Some(sample_rate) = self.sample_rate {
            params.sample_rate = sample_rate;
        }

        params.validate()?;
        tracing::debug!(?params, "Channel parameters");
        Ok(params)
    }
}
