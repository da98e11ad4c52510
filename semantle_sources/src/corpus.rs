//! Loading the fallback vocabulary.
//!
//! A corpus file holds one word per line. Its words are canonicalized and
//! filtered with the profile, then merged with the profile's built-in
//! words, so a missing or unreadable file still leaves a usable vocabulary.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use itertools::Itertools;
use log::{info, warn};
use semantle_rs::LanguageProfile;

/// Where the corpus for a profile is looked for when no path is given.
///
/// ```rust
/// use semantle_rs::LanguageProfile;
/// use semantle_sources::corpus::default_path;
///
/// assert_eq!(default_path(&LanguageProfile::hebrew()).to_str(), Some("wordlist_he.txt"));
/// ```
pub fn default_path(profile: &LanguageProfile) -> PathBuf {
    let code = match profile.name() {
        "hebrew" => "he",
        "english" => "en",
        other => other,
    };
    PathBuf::from(format!("wordlist_{}.txt", code))
}

/// Reads the words of a corpus file.
pub fn read(path: &Path, profile: &LanguageProfile) -> io::Result<Vec<String>> {
    Ok(parse(&fs::read_to_string(path)?, profile))
}

/// The acceptable canonical words of a corpus, one per line, without
/// repeats.
pub fn parse(text: &str, profile: &LanguageProfile) -> Vec<String> {
    text.lines()
        .map(|line| profile.canonicalize(line.trim()))
        .filter(|word| profile.accepts(word))
        .unique()
        .collect()
}

/// The corpus at `path` merged with the profile's built-in words.
///
/// Failing to read the file is logged and otherwise ignored.
pub fn load(path: &Path, profile: &LanguageProfile) -> Vec<String> {
    let words = match read(path, profile) {
        Ok(words) => {
            info!("loaded {} words from {}", words.len(), path.display());
            words
        }
        Err(e) => {
            warn!("could not read {}: {}", path.display(), e);
            Vec::new()
        }
    };

    let vocabulary: Vec<_> = words
        .into_iter()
        .chain(profile.fallback_words().iter().map(|w| w.to_string()))
        .unique()
        .collect();
    info!("vocabulary has {} words", vocabulary.len());
    vocabulary
}
