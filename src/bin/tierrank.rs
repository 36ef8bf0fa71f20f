use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::{
    cmp::Ordering,
    fs,
    io::{self, BufRead, Write},
    path::PathBuf,
};
use tierrank::{
    command::{self, Command},
    IndividualTieredRanking, Oracle, RankingConfig, TierBands, Verdict,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Apply a ranking script line by line and print each reply.
    Run {
        /// Number of tiers; tier 0 ranks highest.
        #[arg(long, default_value_t = 3)]
        tiers: usize,
        /// Upper end of the score range.
        #[arg(long, default_value_t = 10.0)]
        scale: f64,
        /// How items are compared while inserting.
        #[arg(long, value_enum, default_value = "ascending")]
        order: Order,
        /// Upper score threshold of each band, ascending, one per tier.
        #[arg(long, value_delimiter = ',')]
        thresholds: Option<Vec<f64>>,
        /// Only recompute scores on `normalize`.
        #[arg(long)]
        deferred: bool,
        /// Report failing lines and continue instead of stopping.
        #[arg(long)]
        keep_going: bool,
        /// Script file. Read from stdin when omitted.
        script: Option<PathBuf>,
    },
}

#[derive(clap::ValueEnum, Clone, Copy)]
enum Order {
    /// Smaller first; numeric when both items are numbers, lexical otherwise.
    Ascending,
    /// Larger first.
    Descending,
    /// Ask on the terminal for every comparison.
    Ask,
}

struct CliOracle {
    order: Order,
}

fn natural(a: &str, b: &str) -> Option<Ordering> {
    match (a.parse::<f64>(), b.parse::<f64>()) {
        (Ok(x), Ok(y)) => x.partial_cmp(&y),
        _ => Some(a.cmp(b)),
    }
}

fn ask(candidate: &str, representative: &str) -> Verdict {
    let stdin = io::stdin();
    loop {
        eprint!("rank higher? [1] {candidate}  [2] {representative}  [t]ie  [s]kip: ");
        let _ = io::stderr().flush();
        let mut answer = String::new();
        match stdin.lock().read_line(&mut answer) {
            Ok(0) | Err(_) => return Verdict::Undecidable,
            Ok(_) => {}
        }
        match answer.trim() {
            "1" => return Verdict::CandidatePreferred,
            "2" => return Verdict::RepresentativePreferred,
            "t" => return Verdict::Tie,
            "s" => return Verdict::Undecidable,
            _ => continue,
        }
    }
}

impl Oracle<String> for CliOracle {
    fn compare(&mut self, candidate: &String, representative: &String) -> Verdict {
        match self.order {
            Order::Ascending => Verdict::from_ordering(natural(candidate, representative)),
            Order::Descending => {
                Verdict::from_ordering(natural(candidate, representative)).reverse()
            }
            Order::Ask => ask(candidate, representative),
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Cmd::Run {
            tiers,
            scale,
            order,
            thresholds,
            deferred,
            keep_going,
            script,
        } => {
            let config = RankingConfig {
                tiers,
                scale,
                deferred_normalization: deferred,
            };
            let bands = match thresholds {
                Some(thresholds) => {
                    anyhow::ensure!(
                        thresholds.len() == tiers,
                        "expected {tiers} thresholds, got {}",
                        thresholds.len()
                    );
                    TierBands::with_thresholds(&thresholds, scale)
                        .context("invalid tier thresholds")?
                }
                None => TierBands::even(tiers),
            };
            run(config, bands, order, keep_going, script)
        }
    }
}

fn run(
    config: RankingConfig,
    bands: TierBands,
    order: Order,
    keep_going: bool,
    script: Option<PathBuf>,
) -> Result<()> {
    if matches!(order, Order::Ask) {
        anyhow::ensure!(
            script.is_some(),
            "--order ask reads answers from stdin, so the script must come from a file"
        );
    }
    let mut ranking = IndividualTieredRanking::with_normalizer(config, CliOracle { order }, bands)
        .context("invalid ranking configuration")?;

    let source = match &script {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("failed to read script {}", path.display()))?,
        None => io::read_to_string(io::stdin()).context("failed to read script from stdin")?,
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    for (idx, line) in source.lines().enumerate() {
        let lineno = idx + 1;
        let outcome = match Command::parse(line) {
            Ok(Some(cmd)) => command::apply(&mut ranking, cmd)
                .map(Some)
                .map_err(anyhow::Error::from),
            Ok(None) => Ok(None),
            Err(err) => Err(anyhow::Error::from(err)),
        };
        match outcome {
            Ok(Some(reply)) => writeln!(out, "{reply}")?,
            Ok(None) => {}
            Err(err) if keep_going => {
                tracing::warn!(line = lineno, error = %err, "Script command failed.");
                writeln!(out, "(error) line {lineno}: {err}")?;
            }
            Err(err) => return Err(err.context(format!("script line {lineno}"))),
        }
    }
    Ok(())
}
