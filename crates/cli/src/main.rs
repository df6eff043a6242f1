//! lucsample CLI - Land-use/land-cover sampling tools

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use lucsample_algorithms::accuracy::{
    run_sample_accuracy, InterpretationType, SampleAccuracyFiles, SampleAccuracyParams,
};
use lucsample_algorithms::collect_earth::{run_collect_earth_to_vector, CollectEarthParams};
use lucsample_core::CRS;

// ─── CLI structure ──────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "lucsample")]
#[command(author, version, about = "Land-use/land-cover sampling tools", long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a Collect Earth CSV export to square plot polygons
    CollectEarthToVector {
        /// Collect Earth CSV file
        input: PathBuf,
        /// Output GeoJSON file
        output: PathBuf,
        /// Output projection (projected CRS only), e.g. EPSG:32630
        #[arg(short, long)]
        projection: String,
        /// Side of the square plot, in output CRS units
        #[arg(short = 's', long, default_value = "10")]
        plot_size: f64,
    },
    /// Accuracy of interpreted samples against a forest / non-forest raster
    SampleAccuracy {
        /// Interpreted plot polygons (GeoJSON)
        vector: PathBuf,
        /// Classification raster (GeoTIFF)
        raster: PathBuf,
        /// Output text file for the confusion matrix
        output: PathBuf,
        /// Field holding the interpreted label (forest / non-forest)
        #[arg(short, long)]
        field: String,
        /// Prefix of the statistic field added to the layer (<prefix>_MEAN)
        #[arg(short, long, default_value = "")]
        prefix: String,
        /// Plots with a mean below this value are predicted forest
        #[arg(short, long, default_value = "0.7")]
        threshold: f64,
        /// Raster band (1-based)
        #[arg(short, long, default_value = "1")]
        band: usize,
        /// Interpretation type
        #[arg(short, long, default_value = "FOREST_NONFOREST")]
        interpretation: String,
        /// Write the updated layer here instead of back to the input
        #[arg(short, long)]
        layer_output: Option<PathBuf>,
    },
}

// ─── Helpers ────────────────────────────────────────────────────────────

fn setup_logging(verbose: bool) -> Result<()> {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to install log subscriber")
}

fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

fn done(name: &str, path: &Path, elapsed: std::time::Duration) {
    println!("{} saved to: {}", name, path.display());
    println!("  Processing time: {:.2?}", elapsed);
}

fn parse_crs(s: &str) -> Result<CRS> {
    s.parse()
        .with_context(|| format!("Invalid projection: {}", s))
}

// ─── Main ───────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose)?;

    match cli.command {
        Commands::CollectEarthToVector {
            input,
            output,
            projection,
            plot_size,
        } => {
            let params = CollectEarthParams {
                output_crs: parse_crs(&projection)?,
                plot_size,
            };

            let pb = spinner("Converting Collect Earth plots...");
            let start = Instant::now();
            let count = run_collect_earth_to_vector(&input, &output, &params)
                .with_context(|| format!("Failed to convert {}", input.display()));
            pb.finish_and_clear();
            let count = count?;

            info!("Plots: {}", count);
            done("Plot layer", &output, start.elapsed());
        }

        Commands::SampleAccuracy {
            vector,
            raster,
            output,
            field,
            prefix,
            threshold,
            band,
            interpretation,
            layer_output,
        } => {
            if band == 0 {
                anyhow::bail!("Raster bands are numbered from 1");
            }
            let interpretation_type: InterpretationType = interpretation
                .parse()
                .context("Invalid interpretation type")?;
            let params = SampleAccuracyParams {
                interpreted_field: field,
                interpretation_type,
                statistic_prefix: prefix,
                forest_class_threshold: threshold,
            };
            let files = SampleAccuracyFiles {
                vector,
                raster,
                band,
                report: output,
                layer_output,
            };

            let pb = spinner("Evaluating sample accuracy...");
            let start = Instant::now();
            let matrix = run_sample_accuracy(&files, &params)
                .context("Failed to evaluate sample accuracy");
            pb.finish_and_clear();
            let matrix = matrix?;

            println!("{}", matrix);
            done("Confusion matrix", &files.report, start.elapsed());
            let layer_path = files.layer_output.as_ref().unwrap_or(&files.vector);
            println!(
                "  Field {} written to: {}",
                params.statistic_field(),
                layer_path.display()
            );
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn sample_accuracy_defaults() {
        let cli = Cli::try_parse_from([
            "lucsample",
            "sample-accuracy",
            "plots.geojson",
            "forest.tif",
            "accuracy.txt",
            "--field",
            "LULC",
        ])
        .unwrap();
        match cli.command {
            Commands::SampleAccuracy {
                threshold,
                band,
                prefix,
                layer_output,
                ..
            } => {
                assert_eq!(threshold, 0.7);
                assert_eq!(band, 1);
                assert_eq!(prefix, "");
                assert!(layer_output.is_none());
            }
            _ => panic!("expected sample-accuracy"),
        }
    }

    #[test]
    fn collect_earth_requires_projection() {
        assert!(Cli::try_parse_from([
            "lucsample",
            "collect-earth-to-vector",
            "ce.csv",
            "plots.geojson"
        ])
        .is_err());
        assert!(parse_crs("EPSG:32630").is_ok());
        assert!(parse_crs("not a crs").is_err());
    }
}
