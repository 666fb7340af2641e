use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;

use cooccur::input::load_transactions;
use cooccur::{analyze, CandidateStrategy, MiningConfig};

#[derive(Debug, Clone, Copy, ValueEnum)]
#[value(rename_all = "lowercase")]
enum OutputFormat {
    Text,
    Json,
}

/// Environment variables follow the pattern `COOCCUR_*` and are overridden by CLI flags.
#[derive(Parser, Debug)]
#[command(name = "cooccur")]
#[command(about = "Mine frequent itemsets and association rules from a transaction file")]
#[command(version)]
struct Args {
    /// Transaction file, one comma-separated transaction per line
    path: PathBuf,

    /// Minimum support count
    #[arg(short = 's', long, default_value_t = 2, env = "COOCCUR_MIN_SUPPORT")]
    min_support: usize,

    /// Minimum support as a fraction of transactions (overrides --min-support)
    #[arg(long, env = "COOCCUR_MIN_SUPPORT_RATIO")]
    min_support_ratio: Option<f64>,

    /// Minimum rule confidence in [0, 1]
    #[arg(short = 'c', long, default_value_t = 0.5, env = "COOCCUR_MIN_CONFIDENCE")]
    min_confidence: f64,

    /// Number of rules in the top-by-lift view
    #[arg(short = 'k', long, default_value_t = 10, env = "COOCCUR_TOP_K")]
    top_k: usize,

    /// Largest itemset size to mine
    #[arg(long, env = "COOCCUR_MAX_LEN")]
    max_len: Option<usize>,

    /// Candidate generation strategy
    #[arg(long, value_enum, default_value_t = CandidateStrategy::Universe, env = "COOCCUR_STRATEGY")]
    strategy: CandidateStrategy,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text, env = "COOCCUR_FORMAT")]
    format: OutputFormat,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

impl Args {
    fn mining_config(&self) -> MiningConfig {
        let mut config = MiningConfig::new(self.min_support, self.min_confidence)
            .with_top_k(self.top_k)
            .with_strategy(self.strategy);
        if let Some(ratio) = self.min_support_ratio {
            config = config.with_min_support_ratio(ratio);
        }
        if let Some(max_len) = self.max_len {
            config = config.with_max_len(max_len);
        }
        config
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

/// Writes nothing to `out` unless the whole pipeline succeeds.
fn run(args: &Args, out: &mut impl Write) -> cooccur::Result<()> {
    let config = args.mining_config();
    config.validate()?;
    info!(?config, path = %args.path.display(), "cooccur v{} starting", env!("CARGO_PKG_VERSION"));

    let transactions = load_transactions(&args.path)?;
    let report = analyze(&transactions, &config)?;

    match args.format {
        OutputFormat::Text => write!(out, "{}", report)?,
        OutputFormat::Json => writeln!(out, "{}", report.to_json()?)?,
    }
    out.flush()?;
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    match run(&args, &mut std::io::stdout().lock()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {}", err);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cooccur::MiningError;

    fn args(extra: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("cooccur").chain(extra.iter().copied())).unwrap()
    }

    fn basket_file() -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "A,B").unwrap();
        writeln!(file, "A,B,C").unwrap();
        writeln!(file, "A").unwrap();
        writeln!(file, "B,C").unwrap();
        file
    }

    #[test]
    fn invalid_confidence_fails_before_reading_input() {
        let args = args(&["/definitely/not/here.csv", "--min-confidence", "1.5"]);
        let mut out = Vec::new();

        let err = run(&args, &mut out).unwrap_err();
        assert!(matches!(
            err,
            MiningError::InvalidThreshold { name: "min_confidence", .. }
        ));
        assert!(err.to_string().contains("min_confidence"));
        assert!(out.is_empty());
    }

    #[test]
    fn zero_support_count_fails() {
        let file = basket_file();
        let args = args(&[file.path().to_str().unwrap(), "--min-support", "0"]);
        let mut out = Vec::new();

        assert!(matches!(
            run(&args, &mut out),
            Err(MiningError::InvalidThreshold { .. })
        ));
        assert!(out.is_empty());
    }

    #[test]
    fn missing_file_fails_without_output() {
        let args = args(&["/definitely/not/here.csv"]);
        let mut out = Vec::new();

        assert!(matches!(run(&args, &mut out), Err(MiningError::Io(_))));
        assert!(out.is_empty());
    }

    #[test]
    fn file_without_items_fails_without_output() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, ",,").unwrap();
        let args = args(&[file.path().to_str().unwrap()]);
        let mut out = Vec::new();

        assert!(matches!(
            run(&args, &mut out),
            Err(MiningError::EmptyDataset)
        ));
        assert!(out.is_empty());
    }

    #[test]
    fn text_and_json_output() {
        let file = basket_file();
        let path = file.path().to_str().unwrap();

        let mut out = Vec::new();
        run(&args(&[path]), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("{C} -> {B}"));

        let mut out = Vec::new();
        run(&args(&[path, "--format", "json"]), &mut out).unwrap();
        let json: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(json["num_transactions"], 4);
    }
}
