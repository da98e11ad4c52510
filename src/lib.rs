#![doc = include_str!("../README.md")]

use thiserror::Error;

pub mod language;
pub use language::LanguageProfile;

pub mod ledger;
pub use ledger::{Guess, GuessId, Ledger};

pub mod oracle;
pub use oracle::{Backoff, Oracle};

pub mod expansion;
pub use expansion::{Provider, RelationSource, Relations};

pub mod selector;
pub use selector::Selector;

pub mod solver;
pub use solver::Solver;

pub mod report;
pub use report::{ConsoleReporter, Reporter};

pub mod words;

#[cfg(test)]
pub(crate) mod mock;

/// A specialized result type for fallible `semantle_rs` operations.
pub type Result<T> = std::result::Result<T, SolverError>;

/// The errors that stop a solving run.
#[derive(Debug, Error)]
pub enum SolverError {
    /// Every candidate source came up empty: ranked expansion, the seed word,
    /// the fallback vocabulary and the unlimited last-ditch pass.
    #[error("search exhausted after {tried} tried words")]
    SearchExhausted { tried: usize },

    #[error("guess ledger rejected a guess")]
    Ledger {
        #[from]
        kind: LedgerError,
    },

    #[error("general IO error")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LedgerError {
    /// The word has already been recorded in this run.
    #[error("the word \"{0}\" has already been guessed")]
    DuplicateWord(String),

    /// The origin does not refer to a guess recorded before this one.
    #[error("origin #{0} does not refer to an earlier guess")]
    UnknownOrigin(usize),
}

/// Failures of a single oracle submission.
///
/// All of these are transient: the word stays eligible for a later round.
#[derive(Debug, Error)]
pub enum OracleError {
    #[error("could not reach the oracle: {0}")]
    Transport(String),

    #[error("oracle answered with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed oracle reply: {0}")]
    Malformed(String),

    #[error("still rate limited on \"{word}\" after {attempts} attempts")]
    RateLimitExhausted { word: String, attempts: u32 },
}

/// Failures of a relation lookup.
///
/// Providers log these and treat the word as having no relations.
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("relation source answered with status {0}")]
    Status(u16),

    #[error("relation source returned an unusable document: {0}")]
    Malformed(String),

    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}
