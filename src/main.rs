use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::EnvFilter;
use voxstream_core::{AppConfig, AudioEncoding, RecognitionOptions};

#[derive(Parser)]
#[command(name = "voxstream", about = "Stream an audio file to a speech recognizer")]
struct Cli {
    /// Audio file to recognize (.wav is decoded, anything else is sent raw)
    input: PathBuf,

    /// Path to the configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Audio encoding [default: LINEAR16]
    #[arg(long)]
    encoding: Option<AudioEncoding>,

    /// Sample rate in hertz [default: 16000]
    #[arg(long)]
    rate: Option<u32>,

    /// Number of audio channels [default: 1]
    #[arg(long)]
    num_channels: Option<u16>,

    /// Recognition language [default: ru-RU]
    #[arg(long)]
    language_code: Option<String>,

    /// Maximum number of alternatives per result [default: 1]
    #[arg(long)]
    max_alternatives: Option<u32>,

    #[arg(long)]
    disable_profanity_filter: bool,

    #[arg(long)]
    disable_automatic_punctuation: bool,

    #[arg(long)]
    single_utterance: bool,

    #[arg(long)]
    interim_results: bool,

    #[arg(long)]
    do_not_perform_vad: bool,

    /// Silence that ends an utterance, in seconds [default: 0.6]
    #[arg(long)]
    silence_duration_threshold: Option<f32>,

    /// Transport name, overrides the config file
    #[arg(long)]
    transport: Option<String>,

    /// Result sink name, overrides the config file
    #[arg(long)]
    sink: Option<String>,

    /// Bytes per audio chunk, overrides the config file
    #[arg(long)]
    chunk_size: Option<usize>,
}

impl Cli {
    /// Apply command-line overrides on top of the loaded config.
    fn apply(&self, config: &mut AppConfig) {
        let rec: &mut RecognitionOptions = &mut config.recognition;
        if let Some(encoding) = self.encoding {
            rec.encoding = encoding;
        }
        if let Some(rate) = self.rate {
            rec.rate = rate;
        }
        if let Some(n) = self.num_channels {
            rec.num_channels = n;
        }
        if let Some(ref code) = self.language_code {
            rec.language_code = code.clone();
        }
        if let Some(n) = self.max_alternatives {
            rec.max_alternatives = n;
        }
        if let Some(seconds) = self.silence_duration_threshold {
            rec.silence_duration_threshold = seconds;
        }
        rec.disable_profanity_filter |= self.disable_profanity_filter;
        rec.disable_automatic_punctuation |= self.disable_automatic_punctuation;
        rec.single_utterance |= self.single_utterance;
        rec.interim_results |= self.interim_results;
        rec.do_not_perform_vad |= self.do_not_perform_vad;

        if let Some(ref name) = self.transport {
            config.transport.name = name.clone();
        }
        if let Some(ref name) = self.sink {
            config.sink.plugin = name.clone();
        }
        if let Some(size) = self.chunk_size {
            config.streaming.chunk_size = size;
        }
    }
}

fn new_session(
    channel: voxstream_transport::RecognitionChannel,
    source: Box<dyn voxstream_audio::AudioSource>,
    chunk_size: usize,
) -> Result<voxstream_session::StreamingSession> {
    voxstream_session::StreamingSession::new(channel, source, chunk_size)
        .with_context(|| format!("failed to set up streaming session (chunk size {chunk_size})"))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match cli.config {
        Some(ref path) => AppConfig::load_from_file(path)
            .with_context(|| format!("failed to load config from {path:?}"))?,
        None => AppConfig::default(),
    };
    cli.apply(&mut config);
    config.validate().context("invalid options")?;

    let env_filter = EnvFilter::try_new(&config.general.log_level)
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let subscriber = tracing_subscriber::Registry::default()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(false),
        );

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    tracing::info!(input = ?cli.input, "voxstream starting");

    let options = &config.recognition;
    let format = voxstream_audio::WavFormat {
        encoding: options.encoding,
        channels: options.num_channels,
        sample_rate: options.rate,
    };
    let source = voxstream_audio::open_source(&cli.input, format)
        .await
        .with_context(|| format!("failed to open audio input {:?}", cli.input))?;

    let transports = voxstream_transport::TransportRegistry::new();
    let transport = transports
        .connect(&config.transport.name, config.transport_settings())
        .await
        .with_context(|| format!("failed to set up transport '{}'", config.transport.name))?;
    let channel = transport
        .open()
        .await
        .context("failed to open recognition stream")?;

    let sinks = voxstream_sink::SinkRegistry::new();
    let mut sink = sinks
        .build(&config.sink.plugin, config.sink_settings())
        .await
        .with_context(|| format!("failed to set up sink '{}'", config.sink.plugin))?;

    let session = new_session(channel, source, config.streaming.chunk_size)?;
    let outcome = session
        .run(options.to_streaming_config(), sink.as_mut())
        .await;

    if let Err(e) = sink.shutdown().await {
        tracing::warn!("sink shutdown failed: {e}");
    }
    if let Err(e) = transport.shutdown().await {
        tracing::warn!("transport shutdown failed: {e}");
    }

    match outcome {
        Ok(summary) => {
            tracing::info!(
                chunks = summary.chunks_sent,
                bytes = summary.bytes_sent,
                responses = summary.responses_rendered,
                "voxstream finished"
            );
            Ok(())
        }
        Err(e) => {
            let phase = e.phase();
            tracing::error!(%phase, "session failed: {e}");
            Err(e).with_context(|| format!("recognition session failed during {phase}"))
        }
    }
}
