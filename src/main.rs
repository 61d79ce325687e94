use clap::{Parser, Subcommand};
use comic_site::{config, output, site, watch};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "comic-site")]
#[command(about = "Static site generator for a daily comic")]
#[command(long_about = "\
Static site generator for a daily comic

A YAML date index maps publication dates to comic folders. Each folder holds
a markdown file of alternating image and caption lines, plus the images.

Content structure:

  comics/
  ├── dates.yaml                   # 2024-01-01: first-visit
  ├── first-visit/
  │   ├── comic.md                 # # Title, then image/caption line pairs
  │   ├── 01.png
  │   └── 02.png
  └── ghost-story/
      ├── comic.md
      └── panels/01.png            # Subfolders are copied too

comic.md:

  # The Visit
  ![The door](01.png)
  \"Who's there?\"                   # Quoted caption = speech
  ![An empty hall](02.png)
  Nobody answered.                 # Anything else = narration

Output: one <date>.html per comic, style.css, copied images under comics/,
and index.html redirecting to the latest date.

Run 'comic-site gen-config' to generate a documented config.toml.")]
#[command(version)]
struct Cli {
    /// Path to config.toml (missing file = defaults)
    #[arg(long, default_value = "config.toml", global = true)]
    config: PathBuf,

    /// Date index file (overrides config)
    #[arg(long, global = true)]
    dates: Option<PathBuf>,

    /// Comics directory (overrides config)
    #[arg(long, global = true)]
    comics: Option<PathBuf>,

    /// Output directory (overrides config)
    #[arg(long, global = true)]
    output: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build the site: one page per date plus the index
    Build,
    /// Parse every comic and report problems without writing anything
    Check,
    /// Print the parsed date index and comics as JSON
    Scan,
    /// Build, then rebuild whenever the sources change
    Watch,
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose)?;

    match &cli.command {
        Command::Build => {
            let report = site::build_site(&resolve_config(&cli)?)?;
            output::print_build_output(&report);
        }
        Command::Check => {
            let manifest = site::scan(&resolve_config(&cli)?)?;
            output::print_check_output(&manifest);
            if manifest.comics.iter().any(|entry| entry.comic.is_none()) {
                std::process::exit(1);
            }
        }
        Command::Scan => {
            let manifest = site::scan(&resolve_config(&cli)?)?;
            println!("{}", serde_json::to_string_pretty(&manifest)?);
        }
        Command::Watch => {
            let site_config = resolve_config(&cli)?;
            let report = site::build_site(&site_config)?;
            output::print_build_output(&report);

            let watcher = watch::Watcher::new(&site_config)?;
            watcher.run(|changed| {
                tracing::info!(files = changed.len(), "change detected, rebuilding");
                match site::build_site(&site_config) {
                    Ok(report) => output::print_build_output(&report),
                    Err(e) => tracing::error!("build failed: {e}"),
                }
            });
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// `RUST_LOG` wins; otherwise `info`, or `debug` with `--verbose`.
fn init_logging(verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(default))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| format!("initialize tracing subscriber: {e}"))?;
    Ok(())
}

/// Load `config.toml`, then apply path overrides from the command line.
fn resolve_config(cli: &Cli) -> Result<config::SiteConfig, config::ConfigError> {
    let mut site_config = config::load_config(&cli.config)?;
    if let Some(dates) = &cli.dates {
        site_config.dates_file = dates.clone();
    }
    if let Some(comics) = &cli.comics {
        site_config.comics_dir = comics.clone();
    }
    if let Some(output) = &cli.output {
        site_config.output_dir = output.clone();
    }
    site_config.validate()?;
    Ok(site_config)
}
