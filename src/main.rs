use clap::{Parser, Subcommand};
use imgwash::imaging::Quality;
use imgwash::{compare, config, naming, output, wash};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "imgwash")]
#[command(about = "Wash images into fresh, metadata-free derivatives")]
#[command(long_about = "\
Wash images into fresh, metadata-free derivatives

Each derivative is decoded, randomly cropped by a few pixels, nudged in
brightness and contrast, resized to a fixed width, and re-encoded as JPEG.
Nothing embedded in the source (EXIF, ICC, comments) survives.

  source/                      washed/
  ├── boiler.png       ──→     ├── boiler-cleaning_k3x9.jpg
  └── window.jpg               ├── insulation_0pq2.jpg
                               ├── ...
                               └── manifest.json   # source, keyword, ALT text

Compare any two images to see what changed:

  imgwash compare original.jpg washed/boiler-cleaning_k3x9.jpg --diff-out diff.jpg

Run 'imgwash gen-config' to generate a documented imgwash.toml.")]
#[command(version)]
struct Cli {
    /// Config file (missing file = stock defaults)
    #[arg(long, default_value = config::CONFIG_FILENAME, global = true)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Args)]
struct WashArgs {
    /// Directory holding the source images
    #[arg(long, default_value = "source")]
    source: PathBuf,

    /// Directory to write derivatives and manifest.json into
    #[arg(long, default_value = "washed")]
    output: PathBuf,

    /// Comma-separated keywords, cycled across outputs
    #[arg(long)]
    keywords: Option<String>,

    /// Number of derivatives to produce
    #[arg(long)]
    count: Option<usize>,
}

#[derive(Subcommand)]
enum Command {
    /// Produce washed derivatives from a source directory
    Wash(WashArgs),
    /// Compare two images and show what differs
    Compare {
        /// Reference image
        a: PathBuf,
        /// Image compared against the reference
        b: PathBuf,
        /// Save the rendered difference as JPEG
        #[arg(long)]
        diff_out: Option<PathBuf>,
        /// Print the report as JSON (difference image as a data URI)
        #[arg(long)]
        json: bool,
    },
    /// Print a stock imgwash.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Command::Wash(args) => {
            let mut wash_config = config::load_config(&cli.config)?;
            if let Some(keywords) = &args.keywords {
                wash_config.batch.keywords = naming::parse_keywords(keywords);
            }
            if let Some(count) = args.count {
                wash_config.batch.count = count;
            }
            init_thread_pool(&wash_config.processing);

            let (tx, rx) = std::sync::mpsc::channel();
            let printer = std::thread::spawn(move || {
                for event in rx {
                    output::print_wash_event(&event);
                }
            });
            let result = wash::wash(&args.source, &args.output, &wash_config, Some(tx));
            printer
                .join()
                .map_err(|_| "progress printer panicked")?;
            let result = result?;
            output::print_wash_summary(&result, &args.output.join(wash::MANIFEST_FILENAME));
        }
        Command::Compare {
            a,
            b,
            diff_out,
            json,
        } => {
            let wash_config = config::load_config(&cli.config)?;
            let quality = Quality::new(wash_config.transform.quality);
            let comparison = compare::compare_files(&a, &b, quality)?;
            if let Some(path) = &diff_out {
                std::fs::write(path, &comparison.diff_jpeg)?;
            }
            let report = comparison.report();
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                output::print_comparison(&report, diff_out.as_deref());
            }
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Initialize the rayon thread pool based on processing config.
///
/// Caps at the number of available CPU cores; the user can constrain down, not up.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
