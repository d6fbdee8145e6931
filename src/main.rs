use clap::{Parser, Subcommand};
use quire::{config, engine::Engine, output, serve};
use std::fs::File;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

/// Verbosity and log destination, shared by every command.
#[derive(clap::Args, Clone)]
struct LogArgs {
    /// Only report errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Report warnings and errors (the default)
    #[arg(long, global = true)]
    warnings: bool,

    /// Also report progress
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Report everything, including per-page detail
    #[arg(long, global = true)]
    debug: bool,

    /// Write log output to FILE instead of the terminal
    #[arg(short, long, value_name = "FILE", global = true)]
    log: Option<PathBuf>,
}

impl LogArgs {
    /// Level picked by flags, most verbose wins. `None` defers to `RUST_LOG`.
    fn level(&self) -> Option<&'static str> {
        if self.debug {
            Some("debug")
        } else if self.verbose {
            Some("info")
        } else if self.warnings {
            Some("warn")
        } else if self.quiet {
            Some("error")
        } else {
            None
        }
    }
}

/// Preview server options for `build`.
#[derive(clap::Args, Clone)]
struct ServeArgs {
    /// Serve the output directory after building
    #[arg(long)]
    server: bool,

    /// Address the preview server listens on
    #[arg(long, default_value = "127.0.0.1")]
    address: String,

    /// Port the preview server listens on
    #[arg(long, default_value_t = 8000)]
    port: u16,
}

fn version_string() -> &'static str {
    let on_tag = env!("ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once at startup
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "quire")]
#[command(about = "Static site generator for hand-written sites")]
#[command(long_about = "\
Static site generator for hand-written sites

Pages are plain files with optional YAML front matter. Directories become
categories, categories nest under the page whose slug they name, and every
page is rendered through a Jinja-style template.

Site structure:

  site/
  ├── config.toml          # Site config (optional)
  ├── content/
  │   ├── index.md         # Root page
  │   ├── blog.md          # Root page, slug \"blog\"
  │   └── blog/
  │       └── hello.md     # Child of blog → /blog/hello.html
  ├── templates/
  │   └── default.html     # Used unless a page names another template
  └── media/               # Copied verbatim into the output root

Run 'quire gen-config' to generate a documented config.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Site root (the directory holding config.toml)
    #[arg(long, default_value = ".", global = true)]
    source: PathBuf,

    #[command(flatten)]
    log: LogArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Rebuild the whole site into the output directory
    Build(ServeArgs),
    /// Load pages and report orphans without writing anything
    Check,
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(&cli.log)?;

    match cli.command {
        Command::Build(serve_args) => {
            let engine = Engine::from_root(&cli.source)?;
            let output_dir = engine.config().output_dir.clone();

            println!("==> Building {}", cli.source.display());
            let report = engine.build()?;
            output::print_build_report(&report, &cli.source, &output_dir);

            if serve_args.server {
                println!(
                    "==> Serving {} at http://{}:{}",
                    output_dir.display(),
                    serve_args.address,
                    serve_args.port
                );
                serve::run(&serve_args.address, serve_args.port, &output_dir)?;
            }
        }
        Command::Check => {
            let engine = Engine::from_root(&cli.source)?;
            println!("==> Checking {}", cli.source.display());
            let report = engine.check()?;
            output::print_check_report(&report, &cli.source);
            if !report.orphans.is_empty() {
                return Err(format!("{} orphaned page(s)", report.orphans.len()).into());
            }
            println!("==> Content is valid");
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Install the global `tracing` subscriber.
///
/// Lines are `LEVEL message fields`, without timestamps or targets.
fn init_logging(args: &LogArgs) -> Result<(), Box<dyn std::error::Error>> {
    let filter = match args.level() {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .without_time()
        .with_target(false);

    match &args.log {
        Some(path) => builder
            .with_writer(Mutex::new(File::create(path)?))
            .with_ansi(false)
            .init(),
        None => builder.init(),
    }
    Ok(())
}
