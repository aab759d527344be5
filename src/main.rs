//! listing-dash - rental listings dashboard
//!
//! Loads a listings CSV once and renders the charts of one menu section (or
//! all of them) to image files, printing the section text to stdout.
//!
//! Exit codes:
//!   0 - Every requested chart rendered
//!   1 - The dataset failed to load, or at least one chart failed

use anyhow::{Context, Result};
use clap::Parser;
use listing_dash::data::Dataset;
use listing_dash::runtime;
use listing_dash::sections::{Section, DASHBOARD_TITLE};
use listing_dash::{OutputFormat, RenderOptions};
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser, Debug)]
#[command(name = "listing-dash", version)]
#[command(about = "Render the rental listings dashboard from a CSV file", long_about = None)]
struct Args {
    /// Listings CSV file
    #[arg(value_name = "DATA", required_unless_present = "list")]
    data: Option<PathBuf>,

    /// Section to render
    #[arg(value_enum, default_value = "overview", conflicts_with = "all")]
    section: Section,

    /// Render every section in menu order
    #[arg(long)]
    all: bool,

    /// Directory the chart files are written to
    #[arg(short, long, default_value = "charts", value_name = "DIR")]
    out_dir: PathBuf,

    /// Chart image format (overrides the options file)
    #[arg(short, long, value_enum)]
    format: Option<OutputFormat>,

    /// Chart width in pixels (overrides the options file)
    #[arg(long, value_name = "PX")]
    width: Option<u32>,

    /// Chart height in pixels (overrides the options file)
    #[arg(long, value_name = "PX")]
    height: Option<u32>,

    /// JSON render options file, e.g. {"width": 1024, "height": 768, "type": "svg"}
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Print the menu and exit
    #[arg(long)]
    list: bool,

    /// Enable debug logging
    #[arg(short, long, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log errors
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args);
    debug!("Arguments: {:?}", args);

    if args.list {
        print_menu();
        return Ok(());
    }

    let options = load_options(&args)?;

    let data_path = args
        .data
        .as_deref()
        .context("No dataset given")?;
    let data = Dataset::load(data_path).context("Failed to load dataset")?;

    let sections: Vec<Section> = if args.all {
        Section::ALL.to_vec()
    } else {
        vec![args.section]
    };

    let mut failures = 0;
    for section in sections {
        failures += render_section(section, &data, &options, &args.out_dir)?;
    }

    if failures > 0 {
        error!("{} chart(s) failed", failures);
        std::process::exit(1);
    }

    Ok(())
}

/// Initialize logging based on verbosity settings. `RUST_LOG` takes precedence.
fn init_logging(args: &Args) {
    let level = if args.verbose {
        "debug"
    } else if args.quiet {
        "error"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .finish();

    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("Warning: failed to set tracing subscriber");
    }
}

fn print_menu() {
    println!("{}", DASHBOARD_TITLE);
    for (i, section) in Section::ALL.iter().enumerate() {
        println!("  {}. {:<14} {}", i + 1, section.slug(), section.title());
    }
}

/// Options file first, then command-line overrides
fn load_options(args: &Args) -> Result<RenderOptions> {
    let mut options = match &args.config {
        Some(path) => RenderOptions::from_file(path)?,
        None => RenderOptions::default(),
    };
    if let Some(format) = args.format {
        options.format = format;
    }
    if let Some(width) = args.width {
        options.width = width;
    }
    if let Some(height) = args.height {
        options.height = height;
    }
    debug!("Render options: {:?}", options);
    Ok(options)
}

/// Print a section's text and write its charts. Returns the number of charts that failed.
fn render_section(
    section: Section,
    data: &Dataset,
    options: &RenderOptions,
    out_dir: &Path,
) -> Result<usize> {
    info!("Rendering section '{}'", section.title());
    println!("== {} ==", section.title());
    for line in section.text() {
        println!("{}", line);
    }

    let figures = section.figures(data);
    if figures.is_empty() {
        return Ok(0);
    }

    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create output directory {}", out_dir.display()))?;

    let mut failures = 0;
    for (idx, figure) in figures.into_iter().enumerate() {
        let result = figure.map_err(anyhow::Error::from).and_then(|figure| {
            let path = runtime::chart_path(
                out_dir,
                section.slug(),
                idx + 1,
                &figure.spec.title,
                options.format.extension(),
            );
            runtime::write_figure(&figure, options, &path)?;
            Ok(path)
        });

        match result {
            Ok(path) => println!("{}", path.display()),
            Err(e) => {
                failures += 1;
                error!("Chart {} of '{}' failed: {:#}", idx + 1, section.title(), e);
                eprintln!("Error: chart {} of '{}': {:#}", idx + 1, section.title(), e);
            }
        }
    }

    Ok(failures)
}
