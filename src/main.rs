// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Result, anyhow, Context};
use log::{error, warn, info, debug, LevelFilter, Log, Metadata, Record, Level, SetLoggerError};
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use clap::{Args, Parser, ValueEnum, CommandFactory, Subcommand};
use clap_complete::{generate, Shell};
use tokio::sync::mpsc;

use langrepeat::app_config::{self, Config, JumpPolicy};
use langrepeat::app_controller::Controller;
use langrepeat::display::{ConsoleDisplay, DisplayAdapter, LogDisplay};
use langrepeat::playback::UserCommand;
use langrepeat::playback::commands::COMMAND_HELP;
use langrepeat::progress::ProgressStore;
use langrepeat::subtitle_processor;

// @const: Capacity of the user command channel
const COMMAND_CHANNEL_CAPACITY: usize = 32;

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

/// CLI Wrapper for JumpPolicy to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliJumpPolicy {
    Drill,
    FreePlay,
}

impl From<CliJumpPolicy> for JumpPolicy {
    fn from(cli_policy: CliJumpPolicy) -> Self {
        match cli_policy {
            CliJumpPolicy::Drill => JumpPolicy::Drill,
            CliJumpPolicy::FreePlay => JumpPolicy::FreePlay,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Drill a video segment by segment (default command)
    Play(PlayArgs),

    /// List the segments parsed from a subtitle file
    Segments {
        /// Subtitle file to parse
        #[arg(value_name = "SUBTITLE")]
        subtitle: PathBuf,
    },

    /// Show the stored progress records
    Progress,

    /// Generate shell completions for langrepeat
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args, Debug)]
struct PlayArgs {
    /// Video file, or the file name of a video with stored progress
    #[arg(value_name = "VIDEO")]
    video: PathBuf,

    /// Subtitle file (defaults to the companion file next to the video)
    #[arg(value_name = "SUBTITLE")]
    subtitle: Option<PathBuf>,

    #[command(flatten)]
    options: PlayOptions,
}

#[derive(Args, Debug, Default)]
struct PlayOptions {
    /// Times each segment is played
    #[arg(long)]
    repetitions: Option<u32>,

    /// Pause between repetitions in milliseconds
    #[arg(long)]
    delay_ms: Option<u64>,

    /// Segment to start from when no progress is stored (1-based)
    #[arg(long)]
    start_segment: Option<usize>,

    /// What navigation commands do with the target segment
    #[arg(long, value_enum)]
    jump_policy: Option<CliJumpPolicy>,

    /// Length of the headless media in milliseconds
    #[arg(long)]
    duration_ms: Option<u64>,

    /// Log segment changes instead of drawing a progress bar
    #[arg(short, long)]
    quiet_display: bool,
}

/// LangRepeat - segment repetition player for language learning
///
/// Plays a video one subtitle segment at a time, repeating each segment
/// before moving on, and remembers where you stopped.
#[derive(Parser, Debug)]
#[command(name = "langrepeat")]
#[command(version)]
#[command(about = "Segment repetition player for language learning")]
#[command(long_about = "LangRepeat plays a video one subtitle segment at a time, repeats each segment a
configured number of times, then moves on. The position is saved so the next
session resumes where the last one stopped.

EXAMPLES:
    langrepeat movie.mkv                        # Drill using the companion subtitle file
    langrepeat movie.mkv movie.en.srt           # Drill with an explicit subtitle file
    langrepeat --repetitions 5 movie.mkv        # Play each segment five times
    langrepeat --start-segment 12 movie.mkv     # Start at segment 12 when nothing is stored
    langrepeat segments movie.en.srt            # List parsed segments
    langrepeat progress                         # Show stored progress
    langrepeat completions bash > langrepeat.bash

COMMANDS WHILE PLAYING (type and press enter):
    p  pause/resume    n  next     b  previous    g <n>  go to segment
    +  more extra      -  less extra              r  reload    q  quit

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config. If the config file doesn't exist, a default one
    will be created automatically.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Video file to drill
    #[arg(value_name = "VIDEO")]
    video: Option<PathBuf>,

    /// Subtitle file (defaults to the companion file next to the video)
    #[arg(value_name = "SUBTITLE")]
    subtitle: Option<PathBuf>,

    #[command(flatten)]
    options: PlayOptions,

    /// Configuration file path
    #[arg(short, long, global = true, default_value = "conf.json")]
    config: PathBuf,

    /// Set logging level
    #[arg(short, long, global = true, value_enum)]
    log_level: Option<CliLogLevel>,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: Tag and ANSI colour for log level
    fn style_for_level(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("ERROR", "\x1B[1;31m"),
            Level::Warn => ("WARN ", "\x1B[1;33m"),
            Level::Info => ("INFO ", "\x1B[1;32m"),
            Level::Debug => ("DEBUG", "\x1B[1;36m"),
            Level::Trace => ("TRACE", "\x1B[1;35m"),
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let (tag, colour) = Self::style_for_level(record.level());

            let mut stderr = std::io::stderr();
            let _ = writeln!(stderr, "{}{} {} {}\x1B[0m", colour, now, tag, record.args());
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // The logger accepts every level; the max level does the filtering
    CustomLogger::init(LevelFilter::Trace)?;
    log::set_max_level(LevelFilter::Info);

    let cli = CommandLineOptions::parse();

    if let Some(level) = &cli.log_level {
        let level: app_config::LogLevel = level.clone().into();
        log::set_max_level(level.to_level_filter());
    }

    match cli.command {
        Some(Commands::Completions { shell }) => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "langrepeat", &mut std::io::stdout());
            Ok(())
        }
        Some(Commands::Segments { subtitle }) => list_segments(&subtitle),
        Some(Commands::Progress) => {
            let config = load_config(&cli.config, cli.log_level.as_ref())?;
            show_progress(&config)
        }
        Some(Commands::Play(args)) => {
            let config = load_config(&cli.config, cli.log_level.as_ref())?;
            run_play(config, args).await
        }
        None => {
            let video = cli.video.ok_or_else(|| {
                anyhow!("VIDEO is required when no subcommand is specified")
            })?;
            let config = load_config(&cli.config, cli.log_level.as_ref())?;
            let args = PlayArgs {
                video,
                subtitle: cli.subtitle,
                options: cli.options,
            };
            run_play(config, args).await
        }
    }
}

// @loads: Config file, with the log level from the command line or the file
fn load_config(path: &Path, cli_level: Option<&CliLogLevel>) -> Result<Config> {
    let mut config = Config::load_or_create(path)?;

    match cli_level {
        Some(level) => config.log_level = level.clone().into(),
        None => log::set_max_level(config.log_level.to_level_filter()),
    }

    Ok(config)
}

fn apply_play_options(config: &mut Config, options: &PlayOptions) {
    if let Some(repetitions) = options.repetitions {
        config.playback.repetitions_per_segment = repetitions;
    }
    if let Some(delay_ms) = options.delay_ms {
        config.playback.repeat_delay_ms = delay_ms;
    }
    if let Some(start) = options.start_segment {
        config.playback.start_segment_index = start.saturating_sub(1);
    }
    if let Some(policy) = &options.jump_policy {
        config.playback.jump_policy = policy.clone().into();
    }
}

async fn run_play(mut config: Config, args: PlayArgs) -> Result<()> {
    apply_play_options(&mut config, &args.options);

    let controller = Controller::with_config(config)
        .context("Configuration validation failed")?;

    let (tx, rx) = mpsc::channel(COMMAND_CHANNEL_CAPACITY);
    spawn_console_reader(tx.clone());

    let ctrl_c_tx = tx;
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            debug!("Interrupt received");
            let _ = ctrl_c_tx.send(UserCommand::Quit).await;
        }
    });

    eprintln!("{}", COMMAND_HELP);

    let display: Box<dyn DisplayAdapter> = if args.options.quiet_display {
        Box::new(LogDisplay)
    } else {
        Box::new(ConsoleDisplay::new(0))
    };

    let summary = controller
        .run(&args.video, args.subtitle.as_deref(), args.options.duration_ms, display, rx)
        .await
        .with_context(|| format!("Failed to start a session for {}", args.video.display()))?;

    if summary.finished {
        info!("Reached the end of the media");
    }
    if let Some(message) = summary.error {
        return Err(anyhow!("Playback failed: {}", message));
    }

    Ok(())
}

// Reads commands on a plain thread; a blocked read must not hold up runtime shutdown
fn spawn_console_reader(tx: mpsc::Sender<UserCommand>) {
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else {
                break;
            };
            if line.is_empty() {
                continue;
            }
            match line.parse::<UserCommand>() {
                Ok(command) => {
                    if tx.blocking_send(command).is_err() {
                        break;
                    }
                }
                Err(e) => warn!("{} ({})", e, COMMAND_HELP),
            }
        }
        debug!("Console input closed");
    });
}

fn list_segments(subtitle: &Path) -> Result<()> {
    let segments = subtitle_processor::parse_srt_file(subtitle)
        .with_context(|| format!("Failed to load subtitles from {}", subtitle.display()))?;

    if segments.is_empty() {
        warn!("No segments found in {}", subtitle.display());
        return Ok(());
    }

    let mut stdout = std::io::stdout();
    for (index, segment) in segments.iter().enumerate() {
        writeln!(
            stdout,
            "{:>4}  {} --> {}  {}",
            index + 1,
            segment.format_start_time(),
            segment.format_end_time(),
            segment.text.replace('\n', " / ")
        )?;
    }
    Ok(())
}

fn show_progress(config: &Config) -> Result<()> {
    let store = ProgressStore::new(config.progress_file.clone());
    let records = match store.try_load() {
        Ok(records) => records,
        Err(e) => {
            error!("Cannot read {}: {}", store.path().display(), e);
            return Ok(());
        }
    };

    if records.is_empty() {
        info!("No progress stored in {}", store.path().display());
        return Ok(());
    }

    let mut stdout = std::io::stdout();
    for (video, record) in &records {
        let segment = record
            .current_segment
            .map_or_else(|| "-".to_string(), |index| (index + 1).to_string());
        let path = record
            .full_path
            .as_ref()
            .map_or_else(String::new, |p| p.display().to_string());
        writeln!(stdout, "{:<40} segment {:>5}  {}", video, segment, path)?;
    }
    Ok(())
}
