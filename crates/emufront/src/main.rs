//! emufront - emulator frontend driver host
//!
//! Loads the frontend config, brings up the configured audio, video and input
//! drivers and runs until the video output closes.
//!
//! Fatal driver errors (unknown driver names, video or input that fails to
//! open, an impossible resampling ratio) print a diagnostic and exit with
//! status 1.

mod tone;

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::{Duration, Instant};

use anyhow::Result;
use clap::Parser;

use emufront_core::config::{default_config_path, load_config, save_config, FrontendConfig};
use emufront_core::{DriverError, DriverKind, DriverRegistry, Drivers};

use tone::ToneGenerator;

/// Frames per second of the emulated display
const FRAME_RATE: u32 = 60;

/// Size of the blank frame sent in tone mode
const FRAME_WIDTH: u32 = 256;
const FRAME_HEIGHT: u32 = 224;

const TONE_FREQUENCY: f32 = 440.0;

#[derive(Parser)]
#[command(name = "emufront")]
#[command(about = "Emulator frontend driver host")]
#[command(version)]
struct Cli {
    /// Config file (default: <config dir>/emufront/config.yaml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print the available drivers and exit
    #[arg(long)]
    list_drivers: bool,

    /// Write the default config to the config path and exit
    #[arg(long)]
    write_default_config: bool,

    /// Play a 440 Hz test tone with blank frames for this many seconds
    #[arg(long, value_name = "SECONDS")]
    tone: Option<u64>,
}

fn main() -> ExitCode {
    // Set RUST_LOG=debug for verbose output
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", report(&e));
            ExitCode::from(failure_status(&e))
        }
    }
}

/// Message printed for a failed run
fn report(err: &anyhow::Error) -> String {
    match err.downcast_ref::<DriverError>() {
        Some(driver_error) => driver_error.diagnostic(),
        None => format!("Error: {:#}", err),
    }
}

/// Exit status for a failed run
fn failure_status(err: &anyhow::Error) -> u8 {
    err.downcast_ref::<DriverError>()
        .and_then(|e| u8::try_from(e.exit_code()).ok())
        .unwrap_or(1)
}

fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config.unwrap_or_else(default_config_path);

    if cli.write_default_config {
        save_config(&FrontendConfig::default(), &config_path)?;
        println!("Wrote default config to {}", config_path.display());
        return Ok(());
    }

    if cli.list_drivers {
        print!("{}", driver_listing(&DriverRegistry::with_builtin()));
        return Ok(());
    }

    let config: FrontendConfig = load_config(&config_path);
    let mut drivers = Drivers::with_builtin(config);
    drivers.init_drivers()?;

    let seconds = cli.tone.unwrap_or(0);
    if seconds > 0 {
        run_tone(&mut drivers, seconds);
    } else {
        log::info!("Drivers initialized, no core attached");
    }

    drivers.uninit_drivers();
    Ok(())
}

fn driver_listing(registry: &DriverRegistry) -> String {
    let mut out = String::new();
    for kind in [DriverKind::Audio, DriverKind::Video, DriverKind::Input] {
        out.push_str(&format!("{} drivers:\n", kind));
        for ident in registry.idents(kind) {
            out.push_str(&format!("\t{}\n", ident));
        }
    }
    out
}

/// Stand-in run loop: one blank frame and one frame's worth of tone per tick
fn run_tone(drivers: &mut Drivers, seconds: u64) {
    let in_rate = drivers.config().audio.in_rate;
    let samples_per_frame = (in_rate / FRAME_RATE) as usize;
    let frame_time = Duration::from_secs(1) / FRAME_RATE;
    let total_frames = seconds * u64::from(FRAME_RATE);

    let mut tone = ToneGenerator::new(TONE_FREQUENCY, in_rate);
    let mut samples = Vec::with_capacity(samples_per_frame * 2);
    let blank = vec![0u16; (FRAME_WIDTH * FRAME_HEIGHT) as usize];
    let pitch = FRAME_WIDTH as usize * std::mem::size_of::<u16>();

    log::info!("Playing {}Hz tone for {}s", TONE_FREQUENCY, seconds);
    let mut deadline = Instant::now();

    for _ in 0..total_frames {
        if !drivers.alive() {
            log::info!("Video closed");
            break;
        }

        drivers.poll_input();
        drivers.video_frame(&blank, FRAME_WIDTH, FRAME_HEIGHT, pitch);

        tone.fill(&mut samples, samples_per_frame);
        drivers.audio_samples(&samples);

        // Blocking audio already paces the loop; this covers null and wav output
        deadline += frame_time;
        let now = Instant::now();
        if deadline > now {
            std::thread::sleep(deadline - now);
        } else {
            deadline = now;
        }
    }
}
