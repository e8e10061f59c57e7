use clap::{Parser, Subcommand};
use mysgen::{config, output, site::SiteAssembler};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

fn version_string() -> &'static str {
    let on_tag = env!("MYSGEN_ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("MYSGEN_GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once at startup
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "mysgen")]
#[command(about = "Static site generator for a markdown blog with photo galleries")]
#[command(long_about = "\
Static site generator for a markdown blog with photo galleries

A site is a config.json next to a content tree and a theme:

  config.json                      # Site config (merged over stock defaults)
  content/
  ├── posts/
  │   ├── hike.md                  # Post → output/posts/hike/index.html
  │   └── report.md                # `Data: true` → data/report/ copied alongside
  ├── pages/
  │   ├── home.md                  # `Type: home` → output/index.html
  │   └── about.md                 # `Type: page` → output/about/index.html
  ├── images/
  │   └── hike/                    # Gallery of a post with `Image: true`
  └── data/
      └── report/                  # Files attached to a data post or page
  theme/
  └── templates/                   # article.html plus one template per page type

Only posts with `Status: published` are written. Pages see the published
posts, newest first, as `articles`.

Logging goes to stderr; set RUST_LOG (e.g. RUST_LOG=mysgen=debug) for more.

Run 'mysgen gen-config' to print the stock config.json.")]
#[command(version = version_string())]
struct Cli {
    /// Site config file; relative paths inside it resolve against its directory
    #[arg(long, default_value = config::CONFIG_FILE, global = true)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build the site into the configured output directory
    Build,
    /// Load templates and parse all content without writing anything
    Check,
    /// Print the stock config.json with every option set to its default
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("mysgen=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Build => {
            let mut site = SiteAssembler::from_config_file(&cli.config)?;
            println!("==> Building {}", cli.config.display());
            let summary = site.build()?;
            output::print_build_summary(&summary);
            println!("==> Build complete: {}", summary.output.display());
        }
        Command::Check => {
            let mut site = SiteAssembler::from_config_file(&cli.config)?;
            println!("==> Checking {}", cli.config.display());
            site.check()?;
            output::print_inventory(&site);
            println!("==> Content is valid");
        }
        Command::GenConfig => {
            println!("{}", config::stock_config_json()?);
        }
    }

    Ok(())
}
