//! BatchResize CLI - Parallel Batch Image Resizer
//!
//! Resizes one image (`--file`) or every image in a directory (`--dir`) and
//! writes the results under `--outdir`, mirroring the input tree.

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{bail, Context};
use clap::{ArgGroup, Parser, ValueEnum};
use console::style;
use tracing::{debug, info};

use batchresize::parallel::count_message;
use batchresize::{
    init_logging, AssumeYes, BatchCoordinator, BatchOutcome, BatchResult, Config, Confirm,
    FilterType, ImageResizer, InputSource, ItemProcessor, LogTarget, Prompt, ResizeSpec,
};

/// BatchResize - Parallel Batch Image Resizer
#[derive(Parser)]
#[command(
    name = "batchresize",
    version,
    about = "Resize image(s) to a given dimension",
    long_about = "Resize image(s) to a given dimension. \
                  Specify at least one of --width and --height, and one of --file (for a single \
                  image) or --dir (for all images in a directory). Resized images are written to \
                  the directory given by --outdir, mirroring the input layout.",
    group(ArgGroup::new("dimensions").args(["width", "height"]).required(true).multiple(true)),
    group(ArgGroup::new("input").args(["dir", "file"]).required(true))
)]
struct Cli {
    /// The maximum width for the resized image
    #[arg(long, value_name = "PIXELS", value_parser = clap::value_parser!(u32).range(1..))]
    width: Option<u32>,

    /// The maximum height for the resized image
    #[arg(long, value_name = "PIXELS", value_parser = clap::value_parser!(u32).range(1..))]
    height: Option<u32>,

    /// The directory to find images in
    #[arg(short, long, value_name = "PATH")]
    dir: Option<PathBuf>,

    /// The image to resize
    #[arg(short, long, value_name = "PATH")]
    file: Option<PathBuf>,

    /// Iterate over the directory recursively
    #[arg(short, long)]
    recursive: bool,

    /// The image extension, e.g. jpg, jpeg, png [default: jpg]
    #[arg(long, value_name = "EXT")]
    ext: Option<String>,

    /// The directory to put the resized files in
    #[arg(short, long, value_name = "PATH")]
    outdir: PathBuf,

    /// Do not display the progress bar
    #[arg(long)]
    no_progress: bool,

    /// Log each processing step
    #[arg(short, long)]
    verbose: bool,

    /// Do not ask for confirmation
    #[arg(short = 'y', long)]
    yes: bool,

    /// Number of worker threads (default: logical cores)
    #[arg(short, long, value_name = "COUNT")]
    threads: Option<usize>,

    /// JPEG output quality (1-100) [default: 90]
    #[arg(short, long, value_name = "QUALITY", value_parser = clap::value_parser!(u8).range(1..=100))]
    quality: Option<u8>,

    /// Resampling filter [default: lanczos3]
    #[arg(long, value_enum, value_name = "FILTER")]
    filter: Option<CliFilter>,

    /// Padding colour when both width and height are given [default: ffffff]
    #[arg(long, value_name = "RRGGBB", value_parser = parse_color)]
    fill: Option<[u8; 3]>,

    /// Configuration file path (.toml or .yaml)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Show what would be processed without actually processing
    #[arg(long)]
    dry_run: bool,

    /// Print the summary as JSON
    #[arg(long)]
    json: bool,
}

/// CLI-compatible filter enum
#[derive(Clone, Copy, Debug, ValueEnum)]
enum CliFilter {
    Nearest,
    Triangle,
    CatmullRom,
    Gaussian,
    Lanczos3,
}

impl From<CliFilter> for FilterType {
    fn from(filter: CliFilter) -> Self {
        match filter {
            CliFilter::Nearest => FilterType::Nearest,
            CliFilter::Triangle => FilterType::Triangle,
            CliFilter::CatmullRom => FilterType::CatmullRom,
            CliFilter::Gaussian => FilterType::Gaussian,
            CliFilter::Lanczos3 => FilterType::Lanczos3,
        }
    }
}

/// Parse a colour string (e.g., "ff8800" or "#ff8800")
fn parse_color(s: &str) -> Result<[u8; 3], String> {
    let hex = s.strip_prefix('#').unwrap_or(s);
    if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err("Colour must be six hex digits, e.g. 'ffffff'".to_string());
    }

    let channel = |i: usize| {
        u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| "Invalid colour value".to_string())
    };
    Ok([channel(0)?, channel(2)?, channel(4)?])
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}: {:#}", style("Error").red().bold(), e);
            ExitCode::from(2)
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let config = load_config(&cli)?;

    let log_level = if cli.verbose {
        "debug"
    } else {
        config.logging.level.as_str()
    };
    // JSON mode keeps stdout for the summary
    let log_target = if cli.json { LogTarget::Stderr } else { LogTarget::Stdout };
    init_logging(log_level, config.logging.json_format, log_target);
    debug!("Effective configuration: {:?}", config);

    let mode = ResizeSpec::new(cli.width, cli.height).mode()?;

    let source = match (&cli.dir, &cli.file) {
        (Some(dir), None) => InputSource::Directory {
            root: dir.clone(),
            extension: config.processing.extension.clone(),
            recursive: cli.recursive,
        },
        (None, Some(file)) => InputSource::File(file.clone()),
        (Some(_), Some(_)) => bail!("You must choose between --dir and --file"),
        (None, None) => bail!("Specify one of --dir and --file arguments"),
    };

    let resizer = ImageResizer::with_filter(config.processing.filter)
        .fill_color(config.processing.fill_color);
    let processor = ItemProcessor::new(resizer).quality(config.processing.quality);
    let coordinator = BatchCoordinator::new(processor, config.processing.threads)
        .quiet(!shows_progress(&cli));

    info!("Resizing to {} into {:?}", mode, cli.outdir);

    if cli.dry_run {
        let items = coordinator.enumerate(&source, &cli.outdir, mode)?;
        println!("{} would be processed:", count_message(items.len()));
        for item in &items {
            println!("  {} -> {}", item.source_path.display(), item.output_path()?.display());
        }
        return Ok(ExitCode::SUCCESS);
    }

    let mut confirm: Box<dyn Confirm> = if cli.yes {
        Box::new(AssumeYes)
    } else if cli.json {
        Box::new(Prompt::new(io::stdin().lock(), io::stderr()))
    } else {
        Box::new(Prompt::stdio())
    };

    let outcome = coordinator.run(&source, &cli.outdir, mode, confirm.as_mut())?;

    let result = match outcome {
        BatchOutcome::NothingToDo => {
            if cli.json {
                print_json(&BatchResult::new(0))?;
            } else {
                println!("{}", count_message(0));
            }
            return Ok(ExitCode::SUCCESS);
        }
        BatchOutcome::Canceled => {
            if cli.json {
                eprintln!("Canceled.");
            } else {
                println!("Canceled.");
            }
            return Ok(ExitCode::SUCCESS);
        }
        BatchOutcome::Completed(result) => result,
    };

    if cli.json {
        print_json(&result)?;
    } else {
        result.print_summary();
    }

    Ok(if result.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Per-item debug lines come from worker threads and would tear the bar
fn shows_progress(cli: &Cli) -> bool {
    !(cli.no_progress || cli.json || cli.verbose)
}

/// Load the optional config file and layer command-line overrides on top
fn load_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => Config::default(),
    };

    if let Some(threads) = cli.threads {
        config.processing.threads = Some(threads);
    }
    if let Some(quality) = cli.quality {
        config.processing.quality = quality;
    }
    if let Some(filter) = cli.filter {
        config.processing.filter = filter.into();
    }
    if let Some(fill) = cli.fill {
        config.processing.fill_color = fill;
    }
    if let Some(ext) = &cli.ext {
        config.processing.extension = ext.clone();
    }

    config.validate()?;
    Ok(config)
}

fn print_json(result: &BatchResult) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(result)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_color() {
        assert_eq!(parse_color("ff8000").unwrap(), [255, 128, 0]);
        assert_eq!(parse_color("#000000").unwrap(), [0, 0, 0]);
        assert!(parse_color("fff").is_err());
        assert!(parse_color("gg0000").is_err());
    }

    #[test]
    fn test_dimension_and_input_groups() {
        let parse = |args: &[&str]| Cli::try_parse_from(std::iter::once("batchresize").chain(args.iter().copied()));

        assert!(parse(&["--width", "10", "-d", "in", "-o", "out"]).is_ok());
        assert!(parse(&["--width", "10", "--height", "5", "-f", "a.jpg", "-o", "out"]).is_ok());
        assert!(parse(&["-d", "in", "-o", "out"]).is_err());
        assert!(parse(&["--width", "10", "-o", "out"]).is_err());
        assert!(parse(&["--width", "10", "-d", "in", "-f", "a.jpg", "-o", "out"]).is_err());
        assert!(parse(&["--width", "10", "-d", "in"]).is_err());
        assert!(parse(&["--width", "0", "-d", "in", "-o", "out"]).is_err());
    }

    #[test]
    fn test_cli_overrides_config() {
        let cli = Cli::try_parse_from([
            "batchresize", "--height", "50", "-d", "in", "-o", "out", "--ext", "png", "-q", "70", "-t", "3",
            "--filter", "nearest",
        ])
        .unwrap();
        let config = load_config(&cli).unwrap();

        assert_eq!(config.processing.extension, "png");
        assert_eq!(config.processing.quality, 70);
        assert_eq!(config.processing.threads, Some(3));
        assert_eq!(config.processing.filter, FilterType::Nearest);
    }

    #[test]
    fn test_progress_bar_visibility() {
        let parse = |extra: &[&str]| {
            let base = ["batchresize", "--width", "5", "-d", "in", "-o", "out"];
            Cli::try_parse_from(base.iter().chain(extra.iter()).copied()).unwrap()
        };

        assert!(shows_progress(&parse(&[])));
        assert!(!shows_progress(&parse(&["--no-progress"])));
        assert!(!shows_progress(&parse(&["--json"])));
        assert!(!shows_progress(&parse(&["-v"])));
    }

    #[test]
    fn test_zero_threads_rejected() {
        let cli = Cli::try_parse_from(["batchresize", "--width", "5", "-d", "in", "-o", "out", "-t", "0"]).unwrap();
        assert!(load_config(&cli).is_err());
    }
}
