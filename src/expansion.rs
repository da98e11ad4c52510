//! Lexical expansion: turning a guessed word into related candidates.
//!
//! A [`RelationSource`] knows how to fetch whatever document describes a word
//! and pull phrases out of it. A [`Provider`] wraps one source with the
//! candidate contract shared by every source: tokenizing, canonicalizing and
//! filtering those phrases, memoizing the result per word, and remembering
//! which words produced nothing at all.

use std::{
    collections::{HashMap, HashSet},
    fmt::Display,
};

use log::{debug, warn};

use crate::{ledger::TriedSet, LanguageProfile, LookupError};

/// Raw phrases a source found for a word, strongest signal first.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Relations {
    /// Explicit references, such as link targets.
    pub primary: Vec<String>,

    /// Weaker, noisier text, consulted only when the primary phrases do not
    /// fill the quota.
    pub secondary: Vec<String>,
}

impl Relations {
    pub fn new(primary: Vec<String>, secondary: Vec<String>) -> Self {
        Relations { primary, secondary }
    }

    pub fn is_empty(&self) -> bool {
        self.primary.is_empty() && self.secondary.is_empty()
    }
}

/// An external source of related words.
///
/// Implementations perform one lookup per call and do no caching of their
/// own; [`Provider`] takes care of that.
pub trait RelationSource {
    fn lookup(&mut self, word: &str) -> Result<Relations, LookupError>;
}

/// Sizes of a provider's caches at the moment they were cleared.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Words with a cached candidate list.
    pub words: usize,

    /// Candidates across all cached lists.
    pub candidates: usize,

    /// Words known to have no candidates.
    pub exhausted: usize,
}

impl Display for CacheStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} words / {} candidates, {} exhausted",
            self.words, self.candidates, self.exhausted
        )
    }
}

#[derive(Clone, Debug)]
struct Entry {
    words: Vec<String>,
    limit: usize,
}

impl Entry {
    /// Whether this entry can answer a request for `limit` candidates.
    fn covers(&self, limit: usize) -> bool {
        limit <= self.limit || self.words.len() < self.limit
    }
}

/// A memoizing, negatively caching wrapper around a [`RelationSource`].
pub struct Provider {
    tag: String,
    source: Box<dyn RelationSource>,
    profile: LanguageProfile,
    cache: HashMap<String, Entry>,
    exhausted: HashSet<String>,
    lookups: usize,
}

impl std::fmt::Debug for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Provider")
            .field("tag", &self.tag)
            .field("cached", &self.cache.len())
            .field("exhausted", &self.exhausted.len())
            .field("lookups", &self.lookups)
            .finish()
    }
}

impl Provider {
    /// Wraps `source`. The `tag` names the provider in guess provenance.
    pub fn new(
        tag: impl Into<String>,
        source: Box<dyn RelationSource>,
        profile: &LanguageProfile,
    ) -> Self {
        Provider {
            tag: tag.into(),
            source,
            profile: profile.clone(),
            cache: HashMap::new(),
            exhausted: HashSet::new(),
            lookups: 0,
        }
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// The number of lookups sent to the underlying source so far.
    pub fn lookups(&self) -> usize {
        self.lookups
    }

    /// Returns true if `word` is known to have no candidates.
    pub fn is_exhausted(&self, word: &str) -> bool {
        self.exhausted.contains(word)
    }

    /// Returns up to `limit` candidates related to `word`, best first.
    ///
    /// The first call for a word asks the source; later calls are answered
    /// from the cache, unless they want more candidates than a truncated
    /// cached list holds. A word whose lookup produced no candidates, or
    /// failed, is never looked up again until [`clear()`](Self::clear()).
    ///
    /// Candidates never include `word` itself, words shorter than two
    /// characters, words outside the profile's script, or words that were
    /// already tried when the lookup happened. Callers should still check
    /// cached candidates against the current tried set.
    pub fn expand(&mut self, word: &str, limit: usize, tried: &TriedSet) -> Vec<String> {
        if self.exhausted.contains(word) {
            return Vec::new();
        }

        if let Some(entry) = self.cache.get(word) {
            if entry.covers(limit) {
                return entry.words.iter().take(limit).cloned().collect();
            }
        }

        self.lookups += 1;
        let words = match self.source.lookup(word) {
            Ok(relations) => candidates(&self.profile, word, &relations, limit, tried),
            Err(e) => {
                warn!("{} lookup for \"{}\" failed: {}", self.tag, word, e);
                Vec::new()
            }
        };
        debug!("{} found {} candidates for \"{}\"", self.tag, words.len(), word);

        if words.is_empty() {
            self.exhausted.insert(word.to_string());
        }
        self.cache.insert(
            word.to_string(),
            Entry {
                words: words.clone(),
                limit,
            },
        );
        words
    }

    /// Forgets everything cached, returning how much there was.
    pub fn clear(&mut self) -> CacheStats {
        let stats = CacheStats {
            words: self.cache.len(),
            candidates: self.cache.values().map(|e| e.words.len()).sum(),
            exhausted: self.exhausted.len(),
        };
        self.cache.clear();
        self.exhausted.clear();
        stats
    }
}

/// Applies the candidate contract to raw relations.
///
/// Primary phrases are used first; secondary phrases only fill whatever
/// quota remains.
pub fn candidates(
    profile: &LanguageProfile,
    base: &str,
    relations: &Relations,
    limit: usize,
    tried: &TriedSet,
) -> Vec<String> {
    let base = profile.canonicalize(base);
    let mut seen = HashSet::new();

    relations
        .primary
        .iter()
        .chain(relations.secondary.iter())
        .flat_map(|phrase| profile.tokens(phrase))
        .filter(|w| *w != base && profile.accepts(w) && !tried.contains(w))
        .filter(|w| seen.insert(w.clone()))
        .take(limit)
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::mock::MockSource;

    fn strings(words: &[&str]) -> Vec<String> {
        words.iter().map(|s| s.to_string()).collect()
    }

    fn provider(source: MockSource) -> Provider {
        Provider::new("wiki", Box::new(source), &LanguageProfile::english())
    }

    #[test]
    fn second_expand_is_cached() {
        let source = MockSource::new().related("war", &["conflict", "battle"]);
        let lookups = source.lookups();
        let mut provider = provider(source);
        let tried = TriedSet::new();

        let first = provider.expand("war", 30, &tried);
        let second = provider.expand("war", 30, &tried);
        assert_eq!(first, ["conflict", "battle"]);
        assert_eq!(first, second);
        assert_eq!(lookups.get(), 1);
        assert_eq!(provider.lookups(), 1);
    }

    #[test]
    fn empty_words_are_never_looked_up_again() {
        let source = MockSource::new();
        let lookups = source.lookups();
        let mut provider = provider(source);
        let tried = TriedSet::new();

        for _ in 0..3 {
            assert!(provider.expand("zzyzx", 30, &tried).is_empty());
        }
        assert_eq!(lookups.get(), 1);
        assert!(provider.is_exhausted("zzyzx"));

        // an unlimited request does not bypass the negative cache either
        assert!(provider.expand("zzyzx", usize::MAX, &tried).is_empty());
        assert_eq!(lookups.get(), 1);
    }

    #[test]
    fn failed_lookups_count_as_empty() {
        let source = MockSource::new().failing("war");
        let lookups = source.lookups();
        let mut provider = provider(source);
        let tried = TriedSet::new();

        assert!(provider.expand("war", 30, &tried).is_empty());
        assert!(provider.expand("war", 30, &tried).is_empty());
        assert_eq!(lookups.get(), 1);
    }

    #[test]
    fn clear_forgets_everything() {
        let source = MockSource::new().related("war", &["conflict"]);
        let lookups = source.lookups();
        let mut provider = provider(source);
        let tried = TriedSet::new();

        provider.expand("war", 30, &tried);
        provider.expand("peace", 30, &tried);
        let stats = provider.clear();
        assert_eq!(
            stats,
            CacheStats {
                words: 2,
                candidates: 1,
                exhausted: 1
            }
        );

        provider.expand("war", 30, &tried);
        provider.expand("peace", 30, &tried);
        assert_eq!(lookups.get(), 4);
    }

    #[test]
    fn larger_quota_refetches_truncated_entries() {
        let source = MockSource::new()
            .related("war", &["conflict", "battle", "army"])
            .related("peace", &["treaty"]);
        let lookups = source.lookups();
        let mut provider = provider(source);
        let tried = TriedSet::new();

        assert_eq!(provider.expand("war", 2, &tried), ["conflict", "battle"]);
        assert_eq!(provider.expand("war", 1, &tried), ["conflict"]);
        assert_eq!(lookups.get(), 1);
        assert_eq!(
            provider.expand("war", usize::MAX, &tried),
            ["conflict", "battle", "army"]
        );
        assert_eq!(lookups.get(), 2);

        // a short list was never truncated, so it answers any quota
        provider.expand("peace", 2, &tried);
        provider.expand("peace", usize::MAX, &tried);
        assert_eq!(lookups.get(), 3);
    }

    #[test]
    fn secondary_words_fill_the_quota_and_refetch() {
        let source = MockSource::new()
            .relations(
                "war",
                Relations::new(strings(&["conflict"]), strings(&["army navy", "treaty"])),
            )
            .relations(
                "peace",
                Relations::new(strings(&["treaty", "accord"]), strings(&["calm"])),
            );
        let lookups = source.lookups();
        let mut provider = provider(source);
        let tried = TriedSet::new();

        assert_eq!(provider.expand("peace", 2, &tried), ["treaty", "accord"]);

        assert_eq!(provider.expand("war", 2, &tried), ["conflict", "army"]);
        assert_eq!(provider.expand("war", 2, &tried), ["conflict", "army"]);
        assert_eq!(lookups.get(), 2);

        // the entry was full at a quota of 2, so it may have been cut short
        assert_eq!(
            provider.expand("war", 10, &tried),
            ["conflict", "army", "navy", "treaty"]
        );
        assert_eq!(lookups.get(), 3);

        assert_eq!(provider.expand("war", usize::MAX, &tried).len(), 4);
        assert_eq!(lookups.get(), 3);
    }

    #[test]
    fn candidates_follow_the_contract() {
        let english = LanguageProfile::english();
        let mut tried = TriedSet::new();
        tried.insert("battle");

        let relations = Relations::new(
            strings(&["War", "battle", "a", "Conflict|conflicts", "conflict"]),
            Vec::new(),
        );
        assert_eq!(
            candidates(&english, "war", &relations, 30, &tried),
            ["conflict", "conflicts"]
        );
    }

    #[test]
    fn candidates_respect_script() {
        let hebrew = LanguageProfile::hebrew();
        let relations = Relations::new(strings(&["שלום peace", "מִלְחָמָה"]), Vec::new());
        assert_eq!(
            candidates(&hebrew, "צבא", &relations, 30, &TriedSet::new()),
            ["שלום", "מלחמה"]
        );
    }

    #[test]
    fn secondary_only_fills_the_quota() {
        let english = LanguageProfile::english();
        let relations = Relations::new(
            strings(&["conflict", "battle"]),
            strings(&["army navy", "treaty"]),
        );
        let tried = TriedSet::new();

        assert_eq!(
            candidates(&english, "war", &relations, 2, &tried),
            ["conflict", "battle"]
        );
        assert_eq!(
            candidates(&english, "war", &relations, 3, &tried),
            ["conflict", "battle", "army"]
        );
        assert_eq!(candidates(&english, "war", &relations, 10, &tried).len(), 5);
    }
}
