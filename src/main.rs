use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use kmeanslab::elbow::{elbow_curve, knee};
use kmeanslab::labels::MappingStrategy;
use kmeanslab::pages::unsupervised::{DEFAULT_CSV, INTRO};
use kmeanslab::pages::{synthetic_session, MushroomPage, PerformancePage};
use kmeanslab::plot::ScatterPlot;
use kmeanslab::KMeans;
use log::LevelFilter;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "kmeanslab")]
#[command(about = "K-means clustering walkthrough: performance metrics and mushroom edibility", long_about = None)]
#[command(version)]
struct Cli {
    /// Increase verbosity level (can be repeated: -v, -vv, -vvv)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count, global = true)]
    verbosity: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Cluster synthetic blobs and report WCSS and silhouette score
    Performance {
        /// Number of synthetic samples
        #[arg(long, default_value_t = 300)]
        samples: usize,

        /// Number of clusters
        #[arg(short = 'k', long, default_value_t = 3)]
        clusters: usize,

        /// Random seed for the data and the model
        #[arg(long, env = "KMEANSLAB_SEED", default_value_t = 42)]
        seed: u64,

        /// Write the scatter plot to this SVG file
        #[arg(long)]
        plot: Option<PathBuf>,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Cluster the mushroom dataset into edible and poisonous groups
    Mushroom {
        /// Mushroom CSV file
        #[arg(long, env = "KMEANSLAB_CSV", default_value = DEFAULT_CSV)]
        csv: PathBuf,

        /// CSV field delimiter
        #[arg(long, default_value = ",", value_parser = parse_delimiter)]
        delimiter: u8,

        /// Name clusters after their most common true class
        #[arg(long)]
        majority_vote: bool,

        /// Estimate the silhouette score on this many random rows
        #[arg(long)]
        silhouette_sample: Option<usize>,

        /// Random seed for the model
        #[arg(long, env = "KMEANSLAB_SEED", default_value_t = 0)]
        seed: u64,

        /// Write the scatter plot to this SVG file
        #[arg(long)]
        plot: Option<PathBuf>,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print WCSS for k = 1..=max-k on synthetic blobs
    Elbow {
        /// Number of synthetic samples
        #[arg(long, default_value_t = 300)]
        samples: usize,

        /// Number of blobs to generate
        #[arg(long, default_value_t = 3)]
        centers: usize,

        /// Largest k to try
        #[arg(long, default_value_t = 8)]
        max_k: usize,

        /// Random seed for the data and the model
        #[arg(long, env = "KMEANSLAB_SEED", default_value_t = 42)]
        seed: u64,

        /// Print the curve as JSON
        #[arg(long)]
        json: bool,
    },
}

fn parse_delimiter(s: &str) -> std::result::Result<u8, String> {
    match s.as_bytes() {
        [b] if b.is_ascii() => Ok(*b),
        _ => Err(format!("delimiter must be a single ASCII character, got {s:?}")),
    }
}

fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn save_plot(plot: &ScatterPlot, path: &Path) -> Result<()> {
    plot.save(path)
        .with_context(|| format!("Failed to write plot to {}", path.display()))
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbosity);

    match cli.command {
        Commands::Performance {
            samples,
            clusters,
            seed,
            plot,
            json,
        } => {
            let session = synthetic_session(samples, clusters, seed)
                .context("Failed to generate synthetic data")?;
            let report = PerformancePage::new(clusters)
                .seed(seed)
                .run(session.features.view(), session.targets.view())
                .context("Performance page failed")?;

            if let Some(path) = plot {
                save_plot(&report.plot, &path)?;
            }
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print!("{report}");
            }
        }

        Commands::Mushroom {
            csv,
            delimiter,
            majority_vote,
            silhouette_sample,
            seed,
            plot,
            json,
        } => {
            let mut page = MushroomPage::new(&csv).seed(seed).delimiter(delimiter);
            if majority_vote {
                page = page.mapping(MappingStrategy::MajorityVote);
            }
            if let Some(size) = silhouette_sample {
                page = page.silhouette_sample(size);
            }

            let report = page
                .run()
                .with_context(|| format!("Failed to cluster {}", csv.display()))?;

            if let Some(path) = plot {
                save_plot(&report.plot, &path)?;
            }
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("{INTRO}\n");
                print!("{report}");
            }
        }

        Commands::Elbow {
            samples,
            centers,
            max_k,
            seed,
            json,
        } => {
            let session = synthetic_session(samples, centers, seed)
                .context("Failed to generate synthetic data")?;
            let template = KMeans::new(1).random_state(seed);
            let curve = elbow_curve(session.features.view(), 1..=max_k, &template)
                .context("Elbow curve failed")?;

            if json {
                println!("{}", serde_json::to_string_pretty(&curve)?);
            } else {
                println!("{:>4}  {:>14}", "k", "WCSS");
                for point in &curve {
                    println!("{:>4}  {:>14.4}", point.k, point.wcss);
                }
                if let Some(k) = knee(&curve) {
                    println!("Suggested k: {k}");
                }
            }
        }
    }

    Ok(())
}
