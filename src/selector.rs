//! Choosing the next word to submit.

use std::fmt::Display;

use log::{debug, info};
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};

use crate::{
    expansion::{CacheStats, Provider},
    ledger::{GuessId, Ledger, Source, TriedSet},
    LanguageProfile, Result, SolverError,
};

/// How many of the best guesses are expanded per round, at first.
pub const DEFAULT_WIDTH: usize = 70;

/// How many candidates a provider keeps per expanded word.
pub const DEFAULT_QUOTA: usize = 30;

/// A word the selector wants submitted next, with its provenance.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Candidate {
    pub word: String,
    pub origin: Option<GuessId>,
    pub source: Source,
}

impl Display for Candidate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.word, self.source)
    }
}

/// The search strategy.
///
/// Each round the selector walks the ledger from the best guess down,
/// asking its providers in priority order for related words. The first
/// provider to offer an untried word for the best-ranked guess wins, and one
/// of its offers is picked at random. When no ranked guess yields anything
/// the selector falls back, in order, to the seed word, a random draw from
/// the fallback vocabulary, and a final pass over the whole ledger with no
/// quota at all. Only when that comes up empty too is the search over.
///
/// Every fruitless ranked pass widens the search by one guess.
pub struct Selector {
    width: usize,
    quota: usize,
    providers: Vec<Provider>,
    vocabulary: Vec<String>,
    seed: Option<String>,
    rng: StdRng,
}

impl std::fmt::Debug for Selector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Selector")
            .field("width", &self.width)
            .field("quota", &self.quota)
            .field("providers", &self.providers)
            .field("vocabulary", &self.vocabulary.len())
            .field("seed", &self.seed)
            .finish()
    }
}

impl Selector {
    /// Creates a selector with no providers, no seed word and the profile's
    /// built-in fallback vocabulary.
    pub fn new(profile: &LanguageProfile) -> Self {
        Selector {
            width: DEFAULT_WIDTH,
            quota: DEFAULT_QUOTA,
            providers: Vec::new(),
            vocabulary: profile
                .fallback_words()
                .iter()
                .map(|s| s.to_string())
                .collect(),
            seed: None,
            rng: StdRng::from_entropy(),
        }
    }

    /// Adds a provider after all those added before it.
    pub fn add_provider(self, provider: Provider) -> Self {
        let mut providers = self.providers;
        providers.push(provider);
        Selector { providers, ..self }
    }

    pub fn seed_word(self, seed: impl Into<String>) -> Self {
        Selector {
            seed: Some(seed.into()),
            ..self
        }
    }

    /// Replaces the fallback vocabulary.
    pub fn vocabulary(self, vocabulary: Vec<String>) -> Self {
        Selector { vocabulary, ..self }
    }

    pub fn initial_width(self, width: usize) -> Self {
        Selector { width, ..self }
    }

    pub fn quota(self, quota: usize) -> Self {
        Selector { quota, ..self }
    }

    /// Makes random choices reproducible.
    pub fn rng_seed(self, seed: u64) -> Self {
        Selector {
            rng: StdRng::seed_from_u64(seed),
            ..self
        }
    }

    /// The current search width.
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn providers(&self) -> &[Provider] {
        &self.providers
    }

    /// Chooses the next word to submit.
    ///
    /// Returns [`SolverError::SearchExhausted`] when no source of candidates
    /// has anything left to offer.
    pub fn next(&mut self, ledger: &Ledger, tried: &TriedSet) -> Result<Candidate> {
        let ranked: Vec<_> = ledger
            .ranked()
            .take(self.width)
            .map(|(id, g)| (id, g.word().to_string()))
            .collect();

        if let Some(candidate) = self.expand_ranked(&ranked, self.quota, tried) {
            return Ok(candidate);
        }

        if let Some(seed) = self.seed.as_ref().filter(|s| !tried.contains(s)) {
            return Ok(Candidate {
                word: seed.clone(),
                origin: None,
                source: Source::Seed,
            });
        }

        self.width += 1;
        debug!("nothing within the top guesses, widening to {}", self.width);

        let available: Vec<_> = self
            .vocabulary
            .iter()
            .filter(|w| !tried.contains(w))
            .collect();
        if let Some(word) = available.choose(&mut self.rng) {
            return Ok(Candidate {
                word: word.to_string(),
                origin: None,
                source: Source::Random,
            });
        }

        info!(
            "fallback vocabulary exhausted, expanding all {} guesses without a quota",
            ledger.len()
        );
        let everything: Vec<_> = ledger
            .ranked()
            .map(|(id, g)| (id, g.word().to_string()))
            .collect();
        self.expand_ranked(&everything, usize::MAX, tried)
            .ok_or(SolverError::SearchExhausted { tried: tried.len() })
    }

    fn expand_ranked(
        &mut self,
        ranked: &[(GuessId, String)],
        quota: usize,
        tried: &TriedSet,
    ) -> Option<Candidate> {
        for (id, word) in ranked {
            for provider in self.providers.iter_mut() {
                let available: Vec<_> = provider
                    .expand(word, quota, tried)
                    .into_iter()
                    .filter(|w| !tried.contains(w))
                    .collect();

                if let Some(choice) = available.choose(&mut self.rng) {
                    return Some(Candidate {
                        word: choice.clone(),
                        origin: Some(*id),
                        source: Source::Related(provider.tag().to_string()),
                    });
                }
            }
        }
        None
    }

    /// Clears every provider's caches, returning their sizes beforehand.
    pub fn clear_caches(&mut self) -> Vec<(String, CacheStats)> {
        self.providers
            .iter_mut()
            .map(|p| (p.tag().to_string(), p.clear()))
            .collect()
    }
}
