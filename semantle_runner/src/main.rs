use std::{fs::File, io::BufWriter, path::PathBuf, time::Duration};

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use log::info;
use semantle_rs::{
    Backoff, LanguageProfile, Oracle, Provider, Selector, Solver,
};
use semantle_sources::{corpus, HttpScoreService, Milog, Wikipedia};

#[derive(Parser, Debug)]
#[command(name = "semantle")]
#[command(about = "Solve a Semantle puzzle by walking related words")]
struct Args {
    /// Word to start from; otherwise a random word from the corpus
    seed: Option<String>,

    /// Game variant: hebrew or english
    #[arg(short, long, env = "SEMANTLE_LANGUAGE", default_value = "hebrew")]
    language: String,

    /// Word list, one word per line [default: wordlist_<code>.txt]
    #[arg(long, env = "SEMANTLE_CORPUS", value_name = "FILE")]
    corpus: Option<PathBuf>,

    /// Show the best guesses every N tried words (0: only at the end)
    #[arg(long, value_name = "N", default_value_t = 15)]
    report_every: usize,

    /// Clear the relation caches every N tried words (0: never)
    #[arg(long, value_name = "N", default_value_t = 200)]
    flush_every: usize,

    /// Milliseconds to wait between guesses
    #[arg(long, value_name = "MS", default_value_t = 100)]
    round_delay_ms: u64,

    /// Rate-limited attempts per word before giving up on it (0: never give up)
    #[arg(long, value_name = "N", default_value_t = 10)]
    max_rate_limit_attempts: u32,

    /// Stop trying a word after it fails transiently N times (0: never)
    #[arg(long, value_name = "N", default_value_t = 0)]
    retire_after: u32,

    /// Seed for random choices, for reproducible runs
    #[arg(long, value_name = "SEED")]
    rng_seed: Option<u64>,

    /// Write every recorded guess to this file as JSON when the run ends
    #[arg(long, value_name = "FILE")]
    history_json: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let profile = LanguageProfile::by_name(&args.language)
        .ok_or_else(|| anyhow!("unknown language \"{}\"", args.language))?;
    info!("playing the {} game", profile);

    let service = HttpScoreService::new(&profile).context("failed to create oracle client")?;
    let backoff = match args.max_rate_limit_attempts {
        0 => Backoff::new().max_attempts(None),
        n => Backoff::new().max_attempts(Some(n)),
    };
    let oracle = Oracle::new(Box::new(service), &profile).backoff(backoff);

    let corpus_path = args
        .corpus
        .clone()
        .unwrap_or_else(|| corpus::default_path(&profile));
    let mut selector = Selector::new(&profile)
        .vocabulary(corpus::load(&corpus_path, &profile))
        .add_provider(Provider::new(
            "wiki",
            Box::new(Wikipedia::new(&profile).context("failed to create encyclopedia client")?),
            &profile,
        ));
    if let Some(milog) = Milog::new(&profile).context("failed to create dictionary client")? {
        selector = selector.add_provider(Provider::new("milog", Box::new(milog), &profile));
    }
    if let Some(seed) = &args.seed {
        selector = selector.seed_word(profile.canonicalize(seed.trim()));
    }
    if let Some(rng_seed) = args.rng_seed {
        selector = selector.rng_seed(rng_seed);
    }

    let mut solver = Solver::new(oracle, selector, &profile)
        .report_every(args.report_every)
        .flush_every(Some(args.flush_every))
        .round_delay(Duration::from_millis(args.round_delay_ms))
        .transient_limit(Some(args.retire_after).filter(|&n| n > 0));

    let result = solver.run();

    if let Some(path) = &args.history_json {
        let file = File::create(path)
            .with_context(|| format!("failed to create {}", path.display()))?;
        serde_json::to_writer_pretty(BufWriter::new(file), &**solver.ledger())
            .context("failed to write guess history")?;
        info!("wrote {} guesses to {}", solver.ledger().len(), path.display());
    }

    let solution = result.context("no solution found")?;
    info!("solved: {} in {} rounds", solution.word, solution.rounds);
    Ok(())
}
