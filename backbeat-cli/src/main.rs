//! Backbeat CLI: live drum and bass playback and offline WAV rendering.

use std::error::Error;
use std::io::{self, BufRead};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use backbeat_engine::{
    list_output_devices, AudioDevice, BlockEngine, CpalOutput, Engine, OutputOptions, SchedulerConfig,
    DEFAULT_GENRE, DEFAULT_TEMPO_BPM,
};
use clap::{Parser, Subcommand};
use hound::{SampleFormat, WavSpec, WavWriter};
use tracing::{info, warn};

/// Longest voice; queued sounds need this long to ring out after `stop`.
const RING_OUT: Duration = Duration::from_millis(1100);

#[derive(Parser)]
#[command(name = "backbeat")]
#[command(about = "Genre-aware drum and bass player", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List audio output devices
    Devices,

    /// Play live through an output device
    Play {
        /// Genre label (e.g. "Techno", "Acoustic Rock", "Lo-fi")
        #[arg(short, long, default_value = DEFAULT_GENRE)]
        genre: String,

        /// Tempo in BPM
        #[arg(short, long, default_value_t = DEFAULT_TEMPO_BPM)]
        tempo: f32,

        /// Output device name (default device if omitted)
        #[arg(long)]
        device: Option<String>,

        /// Requested sample rate in Hz
        #[arg(short, long)]
        sample_rate: Option<u32>,

        /// Requested channel count
        #[arg(short, long)]
        channels: Option<u16>,

        /// Master gain
        #[arg(long, default_value = "0.8")]
        gain: f32,

        /// Stop after this many seconds; otherwise read commands from stdin
        #[arg(short, long)]
        duration: Option<f32>,

        /// Scheduler lookahead in seconds
        #[arg(long, default_value = "0.1")]
        lookahead: f64,

        /// Scheduler wake interval in milliseconds
        #[arg(long, default_value = "25")]
        wake_ms: u64,
    },

    /// Render to a 32-bit float WAV file
    Render {
        /// Output WAV file path
        output: PathBuf,

        #[arg(short, long, default_value = DEFAULT_GENRE)]
        genre: String,

        #[arg(short, long, default_value_t = DEFAULT_TEMPO_BPM)]
        tempo: f32,

        /// Length in seconds
        #[arg(long, default_value = "8.0")]
        seconds: f64,

        #[arg(short, long, default_value = "48000")]
        sample_rate: u32,

        #[arg(short, long, default_value = "2")]
        channels: u16,

        #[arg(long, default_value = "0.8")]
        gain: f32,
    },
}

/// One line of live input.
#[derive(Debug, PartialEq)]
enum Command {
    Tempo(f32),
    Genre(String),
    Start,
    Stop,
    Quit,
}

fn parse_command(line: &str) -> Result<Command, String> {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((w, r)) => (w, r.trim()),
        None => (line, ""),
    };
    match word {
        "tempo" => rest.parse().map(Command::Tempo).map_err(|_| format!("not a tempo: {rest:?}")),
        "genre" => Ok(Command::Genre(rest.to_string())),
        "start" => Ok(Command::Start),
        "stop" => Ok(Command::Stop),
        "quit" | "exit" => Ok(Command::Quit),
        other => Err(format!("unknown command: {other:?}")),
    }
}

fn run_commands<D: AudioDevice + 'static>(engine: &Engine<D>) -> Result<(), Box<dyn Error>> {
    println!("commands: tempo <bpm> | genre <label> | start | stop | quit");
    for line in io::stdin().lock().lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        match parse_command(&line) {
            Ok(Command::Tempo(bpm)) => {
                engine.set_tempo(bpm);
                info!(tempo = engine.tempo(), "tempo set");
            }
            Ok(Command::Genre(label)) => {
                engine.set_genre(label);
                info!(genre = %engine.genre(), class = %engine.classification(), "genre set");
            }
            Ok(Command::Start) => engine.start(),
            Ok(Command::Stop) => engine.stop(),
            Ok(Command::Quit) => break,
            Err(e) => warn!("{e}"),
        }
    }
    Ok(())
}

fn play(
    opts: OutputOptions,
    config: SchedulerConfig,
    genre: String,
    tempo: f32,
    duration: Option<f32>,
) -> Result<(), Box<dyn Error>> {
    let (output, link) = CpalOutput::open(&opts)?;
    println!(
        "Using device: {} ({} Hz, {} ch)",
        output.device_name(),
        output.sample_rate(),
        output.channels()
    );

    let engine = Engine::with_config(link, config)?;
    engine.set_tempo(tempo);
    engine.set_genre(genre);
    engine.start();

    match duration {
        Some(secs) if secs.is_finite() => thread::sleep(Duration::from_secs_f32(secs.max(0.0))),
        _ => run_commands(&engine)?,
    }

    engine.stop();
    thread::sleep(RING_OUT);
    Ok(())
}

fn render(
    path: &Path,
    genre: String,
    tempo: f32,
    seconds: f64,
    sample_rate: u32,
    channels: u16,
    gain: f32,
) -> Result<(), Box<dyn Error>> {
    let channels = channels.max(1);
    let mut engine = BlockEngine::new(sample_rate as f32)?;
    engine.set_tempo(tempo);
    engine.set_genre(genre);
    engine.set_gain(gain);
    engine.start();

    let spec = WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 32,
        sample_format: SampleFormat::Float,
    };
    let mut writer = WavWriter::create(path, spec)?;

    let total = (seconds.max(0.0) * f64::from(sample_rate)).round() as usize;
    let ch = usize::from(channels);
    let mut block = vec![0.0_f32; 4096 * ch];
    let mut done = 0;
    while done < total {
        let frames = (total - done).min(4096);
        let buf = &mut block[..frames * ch];
        engine.render(buf, ch);
        for s in buf.iter() {
            writer.write_sample(*s)?;
        }
        done += frames;
    }
    writer.finalize()?;

    info!(path = %path.display(), frames = total, "render finished");
    println!("Wrote {} ({total} frames)", path.display());
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Devices => {
            println!("Available output devices:");
            for name in list_output_devices()? {
                println!("- {name}");
            }
        }
        Commands::Play { genre, tempo, device, sample_rate, channels, gain, duration, lookahead, wake_ms } => {
            let opts = OutputOptions { device_name: device, sample_rate, channels, gain };
            let config = SchedulerConfig { lookahead, wake_interval: Duration::from_millis(wake_ms) };
            play(opts, config, genre, tempo, duration)?;
        }
        Commands::Render { output, genre, tempo, seconds, sample_rate, channels, gain } => {
            render(&output, genre, tempo, seconds, sample_rate, channels, gain)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_live_commands() {
        assert_eq!(parse_command("tempo 96.5"), Ok(Command::Tempo(96.5)));
        assert_eq!(parse_command("  genre Deep House "), Ok(Command::Genre("Deep House".into())));
        assert_eq!(parse_command("genre"), Ok(Command::Genre(String::new())));
        assert_eq!(parse_command("stop"), Ok(Command::Stop));
        assert_eq!(parse_command("start"), Ok(Command::Start));
        assert_eq!(parse_command("quit"), Ok(Command::Quit));
        assert!(parse_command("tempo fast").is_err());
        assert!(parse_command("louder").is_err());
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
