//! Language profiles.
//!
//! Everything that differs between game variants lives in a single
//! [`LanguageProfile`] value: which script a candidate must be written in, how
//! raw text is canonicalized, which endpoints the sources talk to and which
//! words make up the fallback vocabulary. A profile is built once at the
//! start of a run and handed to every component that needs it.

use std::fmt::Display;

use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

use crate::{oracle::Terminal, words};

/// Characters that separate words inside a raw phrase.
///
/// Link markup (`[[target|label]]`), templates and punctuation all fall in
/// here, as does the Hebrew maqaf.
const SEPARATORS: &[char] = &[
    '\u{05BE}', '(', ')', '#', '|', ':', '[', ']', '{', '}', '<', '>', '.', ',', ';', '!', '?',
    '+', '-', '=', '_', '"', '\'',
];

/// A writing system that candidate words may be required to belong to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Script {
    /// The Hebrew block, `U+0590..=U+05FF`.
    Hebrew,

    /// Lowercase and uppercase ASCII letters.
    Latin,
}

impl Script {
    /// Returns true if `c` belongs to this script.
    pub fn contains(self, c: char) -> bool {
        match self {
            Script::Hebrew => ('\u{0590}'..='\u{05FF}').contains(&c),
            Script::Latin => c.is_ascii_alphabetic(),
        }
    }

    /// A regular expression matching one maximal run of this script.
    pub fn token_pattern(self) -> &'static str {
        match self {
            Script::Hebrew => r"[\x{0590}-\x{05FF}]+",
            Script::Latin => r"[A-Za-z]+",
        }
    }
}

/// Everything language-specific about one game variant.
///
/// # Examples
///
/// ```rust
/// use semantle_rs::LanguageProfile;
///
/// let english = LanguageProfile::english();
/// assert_eq!(english.canonicalize("Café"), "cafe");
/// assert!(english.accepts("war"));
/// assert!(!english.accepts("a"));
/// ```
#[derive(Clone, Debug)]
pub struct LanguageProfile {
    name: &'static str,
    script: Script,
    enforce_script: bool,
    lowercase: bool,
    oracle_url: String,
    not_found_marker: String,
    terminal: Terminal,
    encyclopedia_api: String,
    body_scan: bool,
    dictionary_url: Option<String>,
    fallback: &'static [&'static str],
}

impl LanguageProfile {
    /// The Hebrew game: Hebrew-only candidates, body scanning of encyclopedia
    /// pages and a dictionary source.
    pub fn hebrew() -> Self {
        LanguageProfile {
            name: "hebrew",
            script: Script::Hebrew,
            enforce_script: true,
            lowercase: false,
            oracle_url: "https://semantle.ishefi.com/api/distance?word={word}".to_string(),
            not_found_marker: "Word not found".to_string(),
            terminal: Terminal::Rank(1000),
            encyclopedia_api: "https://he.wikipedia.org/w/api.php".to_string(),
            body_scan: true,
            dictionary_url: Some("https://milog.co.il/{word}".to_string()),
            fallback: words::HEBREW,
        }
    }

    /// The English game: lowercased candidates and link-only expansion.
    pub fn english() -> Self {
        LanguageProfile {
            name: "english",
            script: Script::Latin,
            enforce_script: false,
            lowercase: true,
            oracle_url: "https://server.semantle.com/similarity/{word}/heel/en".to_string(),
            not_found_marker: "Word not found".to_string(),
            terminal: Terminal::Rank(1000),
            encyclopedia_api: "https://en.wikipedia.org/w/api.php".to_string(),
            body_scan: false,
            dictionary_url: None,
            fallback: words::ENGLISH,
        }
    }

    /// Looks a built-in profile up by name.
    pub fn by_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "hebrew" | "he" => Some(Self::hebrew()),
            "english" | "en" => Some(Self::english()),
            _ => None,
        }
    }

    /// Points the profile at a different oracle.
    ///
    /// The template must contain a `{word}` placeholder.
    pub fn oracle_url(self, template: impl Into<String>) -> Self {
        Self {
            oracle_url: template.into(),
            ..self
        }
    }

    /// Replaces the rule deciding when a score is an exact match.
    pub fn terminal(self, terminal: Terminal) -> Self {
        Self { terminal, ..self }
    }

    /// Replaces the fallback vocabulary.
    pub fn fallback(self, fallback: &'static [&'static str]) -> Self {
        Self { fallback, ..self }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn script(&self) -> Script {
        self.script
    }

    pub fn oracle_template(&self) -> &str {
        &self.oracle_url
    }

    pub fn not_found_marker(&self) -> &str {
        &self.not_found_marker
    }

    pub fn terminal_rule(&self) -> Terminal {
        self.terminal
    }

    pub fn encyclopedia_api(&self) -> &str {
        &self.encyclopedia_api
    }

    /// Whether encyclopedia pages are scanned beyond their explicit links.
    pub fn body_scan(&self) -> bool {
        self.body_scan
    }

    /// The dictionary page template, if this language has a dictionary source.
    pub fn dictionary_template(&self) -> Option<&str> {
        self.dictionary_url.as_deref()
    }

    pub fn fallback_words(&self) -> &'static [&'static str] {
        self.fallback
    }

    /// Strips combining marks (vowel points, accents) and, for caseless
    /// comparison, lowercases.
    pub fn canonicalize(&self, raw: &str) -> String {
        let stripped: String = raw.nfd().filter(|&c| !is_combining_mark(c)).collect();
        if self.lowercase {
            stripped.to_lowercase()
        } else {
            stripped
        }
    }

    /// Returns true if a canonical word is acceptable as a candidate.
    ///
    /// Words shorter than two characters never are; with script enforcement
    /// every character must belong to the profile's script.
    pub fn accepts(&self, word: &str) -> bool {
        if word.chars().count() < 2 {
            return false;
        }
        !self.enforce_script || word.chars().all(|c| self.script.contains(c))
    }

    /// Splits a raw phrase into canonical words, in order.
    ///
    /// ```rust
    /// use semantle_rs::LanguageProfile;
    ///
    /// let english = LanguageProfile::english();
    /// let tokens: Vec<_> = english.tokens("Peace treaty|Treaties (law)").collect();
    /// assert_eq!(tokens, ["peace", "treaty", "treaties", "law"]);
    /// ```
    pub fn tokens<'a>(&'a self, phrase: &'a str) -> impl Iterator<Item = String> + 'a {
        phrase
            .split(|c: char| c.is_whitespace() || SEPARATORS.contains(&c))
            .filter(|s| !s.is_empty())
            .map(move |s| self.canonicalize(s))
            .filter(|s| !s.is_empty())
    }
}

impl Display for LanguageProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}
