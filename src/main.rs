//! Dashboard binary
//!
//! `eink-dashboard` drives the HAT until SIGINT/SIGTERM, then blanks the
//! panel and puts it to sleep. `eink-dashboard --demo` renders every panel
//! once to PNG files instead.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use eink_dashboard::settings::Settings;

#[derive(Parser, Debug)]
#[clap(version, about = "Tri-color e-paper dashboard for the 2.7\" HAT (B)")]
struct Args {
    /// Settings file (TOML); defaults apply when omitted
    #[clap(long)]
    config: Option<PathBuf>,

    /// Render every panel to PNG files and exit
    #[clap(long)]
    demo: bool,

    /// Output directory for --demo, overriding the settings file
    #[clap(long)]
    output: Option<PathBuf>,
}

fn art_seed() -> u64 {
    chrono::Utc::now().timestamp_millis() as u64
}

#[cfg(feature = "png")]
fn run_demo(settings: &Settings, output: Option<PathBuf>) -> Result<()> {
    use std::collections::VecDeque;

    use eink_dashboard::demo::PngSink;
    use eink_dashboard::scheduler::MonotonicClock;
    use eink_dashboard::{Compositor, Config, Scheduler, panels};

    let config = Config::epd2in7b();
    let output = output.unwrap_or_else(|| settings.demo.output_dir.clone());
    let sink = PngSink::new(&output, config.rotation)
        .with_context(|| format!("preparing {}", output.display()))?;

    let mut scheduler = Scheduler::new(
        panels::default_panels(art_seed()),
        Compositor::new(&config),
        sink,
        VecDeque::new(),
        MonotonicClock::new(),
        settings.scheduler.config(),
    );
    let count = scheduler.render_all().context("rendering panels")?;
    info!(
        "Wrote {} files for {count} panels to {}",
        scheduler.sink().written().len(),
        output.display()
    );
    Ok(())
}

#[cfg(not(feature = "png"))]
fn run_demo(_settings: &Settings, _output: Option<PathBuf>) -> Result<()> {
    anyhow::bail!("built without the `png` feature; --demo is unavailable")
}

#[cfg(feature = "linux")]
fn run_device(settings: &Settings, shutdown: &Arc<AtomicBool>) -> Result<()> {
    use anyhow::anyhow;
    use eink_dashboard::hardware;
    use eink_dashboard::scheduler::MonotonicClock;
    use eink_dashboard::sink::FrameSink;
    use eink_dashboard::{Compositor, Scheduler, panels};
    use log::{error, warn};

    let config = hardware::panel_config(&settings.hardware)?;
    let frame = Compositor::new(&config);
    let mut sink = hardware::open_display(&settings.hardware, config)?;
    sink.start()
        .map_err(|e| anyhow!("{e}"))
        .context("starting display")?;

    let monitor = hardware::open_buttons(&settings.hardware, &settings.input)?;
    let events = monitor.queue();
    let input = monitor
        .spawn(settings.input.sample_interval(), Arc::clone(shutdown))
        .context("spawning input thread")?;

    let mut scheduler = Scheduler::new(
        panels::default_panels(art_seed()),
        frame,
        sink,
        events,
        MonotonicClock::new(),
        settings.scheduler.config(),
    );

    let outcome = scheduler.run(shutdown);
    shutdown.store(true, core::sync::atomic::Ordering::Relaxed);
    if input.join().is_err() {
        warn!("Input thread panicked");
    }

    match outcome {
        Ok(()) => {
            let mut sink = scheduler.into_sink();
            sink.shutdown()
                .map_err(|e| anyhow!("{e}"))
                .context("putting display to sleep")?;
            info!("Display asleep");
            Ok(())
        }
        Err(e) => {
            // The controller state is unknown; leave it alone
            error!("Display fault: {e}");
            Err(anyhow!("{e}")).context("driving display")
        }
    }
}

#[cfg(not(feature = "linux"))]
fn run_device(_settings: &Settings, _shutdown: &Arc<AtomicBool>) -> Result<()> {
    anyhow::bail!("built without the `linux` feature; use --demo to render to files")
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    info!("eink-dashboard {}", env!("CARGO_PKG_VERSION"));

    let settings = match &args.config {
        Some(path) => Settings::load(path)
            .with_context(|| format!("loading settings from {}", path.display()))?,
        None => Settings::default(),
    };

    if args.demo {
        return run_demo(&settings, args.output);
    }

    let shutdown = Arc::new(AtomicBool::new(false));
    for signal in [signal_hook::consts::SIGINT, signal_hook::consts::SIGTERM] {
        signal_hook::flag::register(signal, Arc::clone(&shutdown))
            .context("installing signal handler")?;
    }
    run_device(&settings, &shutdown)
}
