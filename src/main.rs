use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;

use freq_cutoff::config::CONFIG_FILENAME;
use freq_cutoff::constants::{MAX_CUTOFF_HZ, SAMPLE_RATE};
use freq_cutoff::signal_processing::ButterworthCoefficients;
use freq_cutoff::wav::{load_voice_wav, save_voice_wav};
use freq_cutoff::{BufferOutcome, CutoffEngine, FilterSetting, FilterStore, StaticResolver};

/// Voice buffers are delivered in 20 ms frames.
const FRAME_MS: u32 = 20;

const RENDER_SCOPE: u64 = 1;
const RENDER_HANDLE: u16 = 1;

#[derive(Parser, Debug)]
#[command(name = "freq-cutoff")]
#[command(
    about = "Manage per-speaker low-pass cutoffs and render voice audio through them",
    long_about = None
)]
struct Args {
    /// Per-speaker settings file
    #[arg(short = 'c', long, default_value = CONFIG_FILENAME)]
    config: PathBuf,

    /// Increase log verbosity
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List configured speakers
    List {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Set the cutoff for a speaker
    Set {
        /// Speaker unique identity
        speaker: String,
        /// Cutoff frequency in Hz
        #[arg(value_parser = clap::value_parser!(u32).range(0..=MAX_CUTOFF_HZ as i64))]
        cutoff_hz: u32,
        /// Store the setting but leave filtering off
        #[arg(long)]
        disabled: bool,
    },
    /// Remove a speaker's setting
    Remove {
        /// Speaker unique identity
        speaker: String,
    },
    /// Print the filter coefficients for a cutoff
    Coefficients {
        /// Cutoff frequency in Hz
        cutoff_hz: u32,
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Filter a WAV file as if it were spoken by a configured speaker
    Render {
        /// Speaker unique identity
        speaker: String,
        /// Input WAV file
        input: PathBuf,
        /// Output WAV file (16-bit)
        output: PathBuf,
    },
}

#[derive(Serialize)]
struct SpeakerEntry<'a> {
    speaker: &'a str,
    #[serde(flatten)]
    setting: &'a FilterSetting,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let level = match args.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match args.command {
        Command::List { json } => list(&args.config, json),
        Command::Set {
            speaker,
            cutoff_hz,
            disabled,
        } => {
            let store = open_store(&args.config)?;
            store.set(&speaker, FilterSetting::new(!disabled, cutoff_hz));
            store.persist()?;
            Ok(())
        }
        Command::Remove { speaker } => {
            let store = open_store(&args.config)?;
            if store.get(&speaker).is_none() {
                anyhow::bail!("No setting for {}", speaker);
            }
            store.remove(&speaker);
            store.persist()?;
            Ok(())
        }
        Command::Coefficients { cutoff_hz, json } => coefficients(cutoff_hz, json),
        Command::Render {
            speaker,
            input,
            output,
        } => render(&args.config, &speaker, &input, &output),
    }
}

fn open_store(path: &Path) -> anyhow::Result<FilterStore> {
    FilterStore::open(path).with_context(|| format!("Failed to load {}", path.display()))
}

fn list(path: &Path, json: bool) -> anyhow::Result<()> {
    let store = open_store(path)?;
    let snapshot = store.load();

    if json {
        let entries: Vec<SpeakerEntry> = snapshot
            .iter()
            .map(|(speaker, setting)| SpeakerEntry { speaker, setting })
            .collect();
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    for (speaker, setting) in snapshot.iter() {
        println!(
            "{:<40} {:>6} Hz  {}",
            speaker,
            setting.cutoff_hz(),
            if setting.enabled() { "enabled" } else { "disabled" }
        );
    }
    Ok(())
}

fn coefficients(cutoff_hz: u32, json: bool) -> anyhow::Result<()> {
    let coeffs = ButterworthCoefficients::lowpass(cutoff_hz);

    if json {
        println!("{}", serde_json::to_string_pretty(&coeffs)?);
        return Ok(());
    }

    println!("Butterworth low-pass, {} Hz @ {} Hz", cutoff_hz, SAMPLE_RATE);
    for (i, (b, a)) in coeffs
        .feedforward()
        .iter()
        .zip(coeffs.feedback().iter())
        .enumerate()
    {
        println!("  b[{}] = {:>+.12e}   a[{}] = {:>+.12e}", i, b, i, a);
    }
    println!(
        "  gain at cutoff: {:.2} dB, at 2x cutoff: {:.2} dB",
        coeffs.magnitude_db_at(cutoff_hz as f64),
        coeffs.magnitude_db_at(2.0 * cutoff_hz as f64)
    );
    Ok(())
}

fn render(config: &Path, speaker: &str, input: &Path, output: &Path) -> anyhow::Result<()> {
    let store = Arc::new(open_store(config)?);
    match store.get(speaker) {
        Some(setting) if setting.enabled() => {
            log::info!("Rendering {} with cutoff {} Hz", speaker, setting.cutoff_hz())
        }
        Some(_) => log::warn!("Filter for {} is disabled, output will be unchanged", speaker),
        None => log::warn!("No setting for {}, output will be unchanged", speaker),
    }

    let mut clip =
        load_voice_wav(input).with_context(|| format!("Failed to read {}", input.display()))?;
    if clip.sample_rate as f64 != SAMPLE_RATE {
        log::warn!(
            "Input is {} Hz; filters are designed for {} Hz",
            clip.sample_rate,
            SAMPLE_RATE
        );
    }

    let resolver = StaticResolver::new().with_client(RENDER_SCOPE, RENDER_HANDLE, speaker, speaker);
    let mut engine = CutoffEngine::new(store, resolver);

    let channels = clip.channels as usize;
    let frame_len = (clip.sample_rate * FRAME_MS / 1000) as usize * channels;
    let mut filtered_frames = 0usize;
    for buffer in clip.samples.chunks_mut(frame_len.max(channels)) {
        if engine.process_voice_data(RENDER_SCOPE, RENDER_HANDLE, buffer, channels)
            == BufferOutcome::Filtered
        {
            filtered_frames += 1;
        }
    }

    save_voice_wav(output, &clip).with_context(|| format!("Failed to write {}", output.display()))?;
    println!(
        "Wrote {} ({} of {} buffers filtered)",
        output.display(),
        filtered_frames,
        clip.samples.len().div_ceil(frame_len.max(channels))
    );
    Ok(())
}
