//! The record of every guess made during a run.

use std::{
    cmp::Ordering,
    collections::{HashMap, HashSet},
    fmt::Display,
    ops::Deref,
};

use itertools::Itertools;
use serde::Serialize;

use crate::LedgerError;

/// The position of a guess in its [`Ledger`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct GuessId(pub(crate) usize);

impl GuessId {
    pub fn index(&self) -> usize {
        self.0
    }
}

impl Display for GuessId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0 + 1)
    }
}

/// What the oracle said about a recognized word.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Score {
    /// Closeness to the secret word. Higher is closer.
    pub similarity: f64,

    /// The oracle's secondary metric, where it reports one: the word's rank
    /// among the thousand nearest neighbours of the secret.
    pub rank: Option<u32>,
}

impl Score {
    pub fn new(similarity: f64, rank: Option<u32>) -> Self {
        Score { similarity, rank }
    }
}

/// Where a guessed word came from.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    /// The configured seed word.
    Seed,

    /// A draw from the fallback vocabulary.
    Random,

    /// An expansion of an earlier guess by the named provider.
    Related(String),
}

impl Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Source::Seed => write!(f, "seed"),
            Source::Random => write!(f, "random"),
            Source::Related(tag) => write!(f, "{}", tag),
        }
    }
}

/// One recorded guess.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Guess {
    pub(crate) word: String,
    pub(crate) score: Option<Score>,
    pub(crate) origin: Option<GuessId>,
    pub(crate) source: Source,
    pub(crate) number: usize,
}

impl Guess {
    pub fn word(&self) -> &str {
        &self.word
    }

    /// The score, or [`None`] if the oracle did not recognize the word.
    pub fn score(&self) -> Option<Score> {
        self.score
    }

    pub fn similarity(&self) -> Option<f64> {
        self.score.map(|s| s.similarity)
    }

    pub fn rank(&self) -> Option<u32> {
        self.score.and_then(|s| s.rank)
    }

    /// The earlier guess whose expansion produced this one.
    pub fn origin(&self) -> Option<GuessId> {
        self.origin
    }

    pub fn source(&self) -> &Source {
        &self.source
    }

    /// The 1-based sequence number of this guess.
    pub fn number(&self) -> usize {
        self.number
    }

    pub fn is_unknown(&self) -> bool {
        self.score.is_none()
    }

    /// Orders guesses best-first: scored before unscored, higher similarity
    /// first, earlier guesses first among equals.
    fn rank_cmp(&self, other: &Guess) -> Ordering {
        match (self.similarity(), other.similarity()) {
            (Some(a), Some(b)) => b.total_cmp(&a),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
        .then(self.number.cmp(&other.number))
    }
}

/// Every word submitted to or otherwise consumed by a run.
///
/// The set only ever grows. A word in it is never submitted again and never
/// offered as a candidate.
#[derive(Clone, Debug, Default)]
pub struct TriedSet {
    inner: HashSet<String>,
}

impl TriedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a word, returning true if it was not already present.
    pub fn insert(&mut self, word: impl Into<String>) -> bool {
        self.inner.insert(word.into())
    }

    pub fn contains(&self, word: &str) -> bool {
        self.inner.contains(word)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

/// An append-only arena of guesses.
///
/// Guesses refer to their origin by [`GuessId`], so provenance chains are
/// walked by index rather than by reference.
///
/// # Examples
///
/// ```rust
/// use semantle_rs::ledger::{Ledger, Score, Source};
///
/// let mut ledger = Ledger::new();
/// let war = ledger.record("war", Some(Score::new(0.9, None)), None, Source::Seed)?;
/// let _ = ledger.record("conflict", Some(Score::new(0.95, None)), Some(war), Source::Related("wiki".into()))?;
///
/// let best: Vec<_> = ledger.top_k(1).into_iter().map(|g| g.word()).collect();
/// assert_eq!(best, ["conflict"]);
///
/// // words are unique for the whole run
/// assert!(ledger.record("war", None, None, Source::Random).is_err());
/// #
/// # Ok::<_, semantle_rs::LedgerError>(())
/// ```
#[derive(Clone, Debug, Default)]
pub struct Ledger {
    guesses: Vec<Guess>,
    by_word: HashMap<String, GuessId>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a guess.
    ///
    /// Fails if the word has been recorded before or if `origin` does not
    /// refer to a guess already in the ledger.
    pub fn record(
        &mut self,
        word: impl Into<String>,
        score: Option<Score>,
        origin: Option<GuessId>,
        source: Source,
    ) -> Result<GuessId, LedgerError> {
        let word = word.into();
        if self.by_word.contains_key(&word) {
            return Err(LedgerError::DuplicateWord(word));
        }
        if let Some(GuessId(i)) = origin {
            if i >= self.guesses.len() {
                return Err(LedgerError::UnknownOrigin(i));
            }
        }

        let id = GuessId(self.guesses.len());
        self.by_word.insert(word.clone(), id);
        self.guesses.push(Guess {
            word,
            score,
            origin,
            source,
            number: id.0 + 1,
        });
        Ok(id)
    }

    pub fn get(&self, id: GuessId) -> Option<&Guess> {
        self.guesses.get(id.0)
    }

    /// Finds the guess made with `word`, if any.
    pub fn find(&self, word: &str) -> Option<GuessId> {
        self.by_word.get(word).copied()
    }

    /// Iterates over guesses in the order they were made, with their ids.
    pub fn entries(&self) -> impl Iterator<Item = (GuessId, &Guess)> {
        self.guesses.iter().enumerate().map(|(i, g)| (GuessId(i), g))
    }

    /// Returns the `n` best guesses, best first.
    ///
    /// Guesses the oracle did not recognize rank after every scored guess.
    /// Among equal similarities the earlier guess comes first.
    pub fn top_k(&self, n: usize) -> Vec<&Guess> {
        self.ranked().take(n).map(|(_, g)| g).collect()
    }

    /// Like [`top_k()`](Self::top_k()), but yields ids alongside guesses and
    /// covers the whole ledger.
    pub fn ranked(&self) -> impl Iterator<Item = (GuessId, &Guess)> {
        self.entries().sorted_by(|(_, a), (_, b)| a.rank_cmp(b))
    }

    /// Reconstructs the chain of guesses that led to `id`, root first.
    ///
    /// Every guess appears at most once, so a malformed origin cycle ends the
    /// walk instead of looping.
    pub fn path_of(&self, id: GuessId) -> Vec<&Guess> {
        let mut visited = HashSet::new();
        let mut path = Vec::new();
        let mut next = Some(id);

        while let Some(current) = next {
            if !visited.insert(current) {
                break;
            }
            match self.get(current) {
                Some(guess) => {
                    path.push(guess);
                    next = guess.origin;
                }
                None => break,
            }
        }

        path.reverse();
        path
    }

    /// Counts guesses the oracle did not recognize.
    pub fn num_unknown(&self) -> usize {
        self.guesses.iter().filter(|g| g.is_unknown()).count()
    }
}

impl Deref for Ledger {
    type Target = [Guess];

    fn deref(&self) -> &Self::Target {
        &self.guesses
    }
}
