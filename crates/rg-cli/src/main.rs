//! ReverbGen Signature Tool
//!
//! Usage:
//!   rg generate --presets 5 --variations 100   - Synthetic signature corpus
//!   rg reduce corpus.json                      - Cull a corpus per preset
//!   rg match query.json library.json           - Closest preset pair
//!   rg reciprocals directions.json             - Most opposing scan directions
//!   rg weight 48.0                             - Distance weighting curves
//!
//! Set RUST_LOG=debug for pipeline stage counts.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use serde::de::DeserializeOwned;

use rg_signature::generators::SignatureGenerator;
use rg_signature::{
    Direction, ReductionConfig, Signature, distance_weight, match_signature, reciprocals,
    reduce_signatures_report, reverse_distance_weight,
};

#[derive(Parser)]
#[command(name = "rg", about = "ReverbGen signature tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a synthetic signature corpus
    Generate {
        /// Number of presets
        #[arg(short, long, default_value_t = 5)]
        presets: usize,
        /// Signatures per preset, baseline included
        #[arg(short, long, default_value_t = 100)]
        variations: usize,
        /// RNG seed (random when omitted)
        #[arg(short, long)]
        seed: Option<u64>,
        /// Per-bin jitter of derived signatures
        #[arg(short, long, default_value_t = rg_signature::generators::DEFAULT_JITTER)]
        jitter: f32,
        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Reduce a signature corpus
    Reduce {
        /// JSON array of signatures
        input: PathBuf,
        /// Dedup threshold
        #[arg(short, long)]
        threshold: Option<f32>,
        /// Maximum signatures per preset
        #[arg(short, long)]
        cap: Option<usize>,
        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Match a signature against a library
    Match {
        /// JSON signature
        query: PathBuf,
        /// JSON array of library signatures
        library: PathBuf,
        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Find the most opposing direction for each scan direction
    Reciprocals {
        /// JSON array of directions
        input: PathBuf,
        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print distance weights
    Weight {
        /// Distance in world units
        distance: f32,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Generate {
            presets,
            variations,
            seed,
            jitter,
            output,
        } => generate(presets, variations, seed, jitter, output.as_deref()),
        Commands::Reduce {
            input,
            threshold,
            cap,
            output,
        } => reduce(&input, threshold, cap, output.as_deref()),
        Commands::Match {
            query,
            library,
            output,
        } => match_query(&query, &library, output.as_deref()),
        Commands::Reciprocals { input, output } => find_reciprocals(&input, output.as_deref()),
        Commands::Weight { distance } => {
            println!("distance_weight:         {:.6}", distance_weight(distance));
            println!("reverse_distance_weight: {:.6}", reverse_distance_weight(distance));
            Ok(())
        }
    }
}

fn generate(
    presets: usize,
    variations: usize,
    seed: Option<u64>,
    jitter: f32,
    output: Option<&Path>,
) -> Result<()> {
    let signatures = SignatureGenerator::new(seed)
        .with_jitter(jitter)
        .corpus(presets, variations);
    log::info!("Generated {} signatures for {} presets", signatures.len(), presets);
    write_json(&signatures, output)
}

fn reduce(
    input: &Path,
    threshold: Option<f32>,
    cap: Option<usize>,
    output: Option<&Path>,
) -> Result<()> {
    let signatures: Vec<Signature> = read_json(input)?;

    let mut config = ReductionConfig::default();
    if let Some(threshold) = threshold {
        config = config.with_min_viable_difference(threshold);
    }
    if let Some(cap) = cap {
        config = config.with_max_signatures_per_preset(cap);
    }

    let (reduced, report) =
        reduce_signatures_report(&signatures, &config).context("Signature reduction failed")?;
    log::info!(
        "Reduced {} -> {} signatures ({} after dedup, {} of {} presets capped)",
        report.input,
        report.output,
        report.after_dedup,
        report.capped_presets,
        report.presets
    );
    write_json(&reduced, output)
}

fn match_query(query: &Path, library: &Path, output: Option<&Path>) -> Result<()> {
    let query: Signature = read_json(query)?;
    let library: Vec<Signature> = read_json(library)?;

    let pair = match_signature(&query, &library).context("Signature matching failed")?;
    log::info!("Matched preset {} (ratio {:.3})", pair.primary, pair.ratio);
    write_json(&pair, output)
}

fn find_reciprocals(input: &Path, output: Option<&Path>) -> Result<()> {
    let directions: Vec<Direction> = read_json(input)?;
    let recips = reciprocals(&directions).context("Reciprocal lookup failed")?;
    write_json(&recips, output)
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("Failed to parse {}", path.display()))
}

fn write_json<T: Serialize + ?Sized>(value: &T, output: Option<&Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    match output {
        Some(path) => fs::write(path, json)
            .with_context(|| format!("Failed to write {}", path.display())),
        None => {
            let mut stdout = io::stdout().lock();
            writeln!(stdout, "{json}").context("Failed to write to stdout")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use rg_signature::PresetPair;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_reduce_overrides() {
        let cli = Cli::parse_from(["rg", "reduce", "corpus.json", "--cap", "3"]);
        match cli.command {
            Commands::Reduce { input, threshold, cap, output } => {
                assert_eq!(input, PathBuf::from("corpus.json"));
                assert_eq!(threshold, None);
                assert_eq!(cap, Some(3));
                assert!(output.is_none());
            }
            _ => panic!("expected reduce command"),
        }
    }

    #[test]
    fn test_generate_then_reduce_files() {
        let dir = tempfile::tempdir().unwrap();
        let corpus_path = dir.path().join("corpus.json");
        let reduced_path = dir.path().join("reduced.json");

        generate(3, 20, Some(42), 0.05, Some(&corpus_path)).unwrap();
        reduce(&corpus_path, None, Some(2), Some(&reduced_path)).unwrap();

        let corpus: Vec<Signature> = read_json(&corpus_path).unwrap();
        let reduced: Vec<Signature> = read_json(&reduced_path).unwrap();
        assert_eq!(corpus.len(), 60);
        assert!(!reduced.is_empty());
        assert!(reduced.len() <= 6);
    }

    #[test]
    fn test_match_query_files() {
        let dir = tempfile::tempdir().unwrap();
        let library_path = dir.path().join("library.json");
        let query_path = dir.path().join("query.json");
        let pair_path = dir.path().join("pair.json");

        generate(4, 1, Some(7), 0.05, Some(&library_path)).unwrap();
        let library: Vec<Signature> = read_json(&library_path).unwrap();
        write_json(&library[2], Some(&query_path)).unwrap();

        match_query(&query_path, &library_path, Some(&pair_path)).unwrap();
        let pair: PresetPair = read_json(&pair_path).unwrap();
        assert_eq!(pair.primary, 2);
        assert_ne!(pair.secondary, Some(2));
    }

    #[test]
    fn test_match_query_empty_library() {
        let dir = tempfile::tempdir().unwrap();
        let library_path = dir.path().join("library.json");
        let query_path = dir.path().join("query.json");

        generate(1, 1, Some(7), 0.05, Some(&query_path)).unwrap();
        let query: Vec<Signature> = read_json(&query_path).unwrap();
        write_json(&query[0], Some(&query_path)).unwrap();
        write_json::<[Signature]>(&[], Some(&library_path)).unwrap();

        let err = match_query(&query_path, &library_path, None).unwrap_err();
        assert!(err.to_string().contains("Signature matching failed"));
    }

    #[test]
    fn test_reciprocals_files() {
        let dir = tempfile::tempdir().unwrap();
        let input_path = dir.path().join("directions.json");
        let output_path = dir.path().join("reciprocals.json");

        let directions = vec![
            Direction::new(1.0, 0.0, 0.0),
            Direction::new(0.0, 1.0, 0.0),
            Direction::new(-1.0, 0.0, 0.0),
            Direction::new(0.0, -1.0, 0.0),
        ];
        write_json(&directions, Some(&input_path)).unwrap();

        find_reciprocals(&input_path, Some(&output_path)).unwrap();
        let recips: Vec<Direction> = read_json(&output_path).unwrap();
        assert_eq!(recips, vec![directions[2], directions[3], directions[0], directions[1]]);
    }

    #[test]
    fn test_parse_weight() {
        let cli = Cli::parse_from(["rg", "weight", "16"]);
        match cli.command {
            Commands::Weight { distance } => assert_eq!(distance, 16.0),
            _ => panic!("expected weight command"),
        }
    }

    #[test]
    fn test_read_json_missing_file() {
        let err = read_json::<Vec<Direction>>(Path::new("/nonexistent/directions.json"))
            .unwrap_err();
        assert!(err.to_string().contains("Failed to read"));
    }
}
