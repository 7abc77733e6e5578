//! pinch_relay: command-line entry point.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tracing::info;

use pinch_relay::{
    HandSource, HeadlessRenderer, Orchestrator, RelayConfig, Renderer, ReplaySource, StopReason,
    SyntheticSource,
};
use pinch_telemetry::TelemetryClient;

#[derive(Parser, Debug)]
#[command(name = "pinch_relay", about = "Detect hand pinches and relay them over TCP")]
struct Cli {
    /// TOML configuration file; flags below override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Replay hand observations from a JSON-lines file (`-` for stdin)
    #[arg(long, conflicts_with = "synthetic")]
    input: Option<PathBuf>,

    /// Use the built-in scripted hand (default when no other source is given)
    #[arg(long)]
    synthetic: bool,

    /// Stop the synthetic hand after N frames
    #[arg(long)]
    frames: Option<u64>,

    /// Pace replay and synthetic frames at this rate
    #[arg(long)]
    fps: Option<f64>,

    /// Telemetry consumer host
    #[arg(long)]
    host: Option<String>,

    /// Telemetry consumer port
    #[arg(long)]
    port: Option<u16>,

    /// Thumb-to-tip distance below which a finger counts as pinching
    #[arg(long)]
    pinch_threshold: Option<f32>,

    /// Samples per finger used for the confidence estimate
    #[arg(long)]
    window: Option<usize>,

    #[arg(long)]
    max_reconnect_attempts: Option<u32>,

    #[arg(long)]
    reconnect_delay_ms: Option<u64>,

    #[arg(long)]
    connect_timeout_ms: Option<u64>,

    /// Keep up to N records while disconnected and resend them on reconnect
    #[arg(long)]
    replay_capacity: Option<usize>,

    /// Track and draw hands without detecting pinches
    #[arg(long)]
    no_pinch: bool,

    /// Open the landmark viewer window
    #[cfg(feature = "viewer")]
    #[arg(long)]
    viewer: bool,

    /// Read hands from a LeapMotion controller
    #[cfg(feature = "leap")]
    #[arg(long, conflicts_with_all = ["input", "synthetic"])]
    leap: bool,
}

impl Cli {
    fn relay_config(&self) -> anyhow::Result<RelayConfig> {
        let mut cfg = match &self.config {
            Some(path) => RelayConfig::load(path)
                .with_context(|| format!("loading configuration from {}", path.display()))?,
            None => RelayConfig::default(),
        };

        if let Some(h) = &self.host                { cfg.telemetry.host = h.clone(); }
        if let Some(p) = self.port                 { cfg.telemetry.port = p; }
        if let Some(t) = self.pinch_threshold      { cfg.detector.threshold = t; }
        if let Some(w) = self.window               { cfg.detector.window = w; }
        if let Some(n) = self.max_reconnect_attempts { cfg.telemetry.max_reconnect_attempts = n; }
        if let Some(ms) = self.reconnect_delay_ms  { cfg.telemetry.reconnect_delay = Duration::from_millis(ms); }
        if let Some(ms) = self.connect_timeout_ms  { cfg.telemetry.connect_timeout = Duration::from_millis(ms); }
        if let Some(n) = self.replay_capacity      { cfg.telemetry.replay_capacity = n; }
        if self.no_pinch                           { cfg.pinch_enabled = false; }

        cfg.validate().context("invalid configuration")?;
        Ok(cfg)
    }

    fn frame_interval(&self) -> anyhow::Result<Option<Duration>> {
        match self.fps {
            None => Ok(None),
            Some(fps) if fps.is_finite() && fps > 0.0 => Ok(Some(Duration::from_secs_f64(1.0 / fps))),
            Some(fps) => anyhow::bail!("--fps must be positive, got {fps}"),
        }
    }

    fn hand_source(&self) -> anyhow::Result<Box<dyn HandSource>> {
        let interval = self.frame_interval()?;

        #[cfg(feature = "leap")]
        if self.leap {
            info!("hand source: LeapMotion");
            let src = pinch_relay::leap::LeapHandSource::open()
                .context("opening LeapMotion controller")?;
            return Ok(Box::new(src));
        }

        let Some(path) = self.input.as_ref().filter(|_| !self.synthetic) else {
            info!("hand source: synthetic right hand");
            let mut src = SyntheticSource::new(1.0, 60)
                .with_frame_interval(interval.unwrap_or(Duration::from_millis(33)));
            if let Some(n) = self.frames { src = src.with_limit(n); }
            return Ok(Box::new(src));
        };

        if path.as_os_str() == "-" {
            info!("hand source: replay from stdin");
            let mut src = ReplaySource::new(io::stdin().lock());
            if let Some(i) = interval { src = src.with_frame_interval(i); }
            return Ok(Box::new(src));
        }

        info!(path = %path.display(), "hand source: replay");
        let mut src = ReplaySource::open(path)
            .with_context(|| format!("opening {}", path.display()))?;
        if let Some(i) = interval { src = src.with_frame_interval(i); }
        Ok(Box::new(src))
    }

    fn renderer(&self) -> anyhow::Result<Box<dyn Renderer>> {
        #[cfg(feature = "viewer")]
        if self.viewer {
            let viewer = pinch_relay::viewer::Viewer::new()
                .map_err(anyhow::Error::msg)
                .context("opening viewer window")?;
            return Ok(Box::new(viewer));
        }
        Ok(Box::new(HeadlessRenderer::new()))
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pinch_relay=info,pinch_telemetry=info,pinch_gesture=info".into()),
        )
        .init();

    info!("pinch_relay v{} starting", env!("CARGO_PKG_VERSION"));

    let cfg = cli.relay_config()?;
    let source = cli.hand_source()?;
    let renderer = cli.renderer()?;

    info!(addr = %cfg.telemetry.address(), "telemetry target");
    let telemetry = TelemetryClient::start(cfg.telemetry.clone());

    let summary = Orchestrator::new(cfg, source, renderer, telemetry)
        .context("building frame loop")?
        .run();

    println!(
        "{} frames, {} hands, {} pinch events sent",
        summary.frames, summary.hands_seen, summary.events_sent
    );
    if summary.stop == StopReason::SourceError {
        anyhow::bail!("hand source failed after {} frames", summary.frames);
    }
    Ok(())
}
