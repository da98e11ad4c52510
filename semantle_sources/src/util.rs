//! Text extraction shared by the sources.

use lazy_static::lazy_static;
use regex::Regex;
use semantle_rs::language::Script;

lazy_static! {
    /// A wikitext link, capturing everything between the brackets.
    pub static ref LINK: Regex = Regex::new(r"\[\[([^\]]+)\]\]").unwrap();

    /// An opening or closing `div` tag, capturing the slash and attributes.
    pub static ref DIV_TAG: Regex = Regex::new(r"(?i)<(/?)div\b([^>]*)>").unwrap();

    /// A class attribute that lists `sr_e`.
    pub static ref RELATED_CLASS: Regex =
        Regex::new(r#"\bclass\s*=\s*"(?:[^"]*\s)?sr_e(?:\s[^"]*)?""#).unwrap();

    /// Any HTML tag.
    pub static ref TAG: Regex = Regex::new(r"<[^>]*>").unwrap();

    /// A run of word characters.
    pub static ref WORD: Regex = Regex::new(r"\w+").unwrap();

    static ref HEBREW_RUN: Regex = Regex::new(Script::Hebrew.token_pattern()).unwrap();
    static ref LATIN_RUN: Regex = Regex::new(Script::Latin.token_pattern()).unwrap();
}

/// The targets of every wikitext link in `text`, in order of appearance.
///
/// ```rust
/// use semantle_sources::util::links;
///
/// let links: Vec<_> = links("A [[treaty]] ends a [[War (conflict)|war]].").collect();
/// assert_eq!(links, ["treaty", "War (conflict)|war"]);
/// ```
pub fn links(text: &str) -> impl Iterator<Item = &str> {
    LINK.captures_iter(text)
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str())
}

/// Every maximal run of `script` characters in `text`.
pub fn script_runs(script: Script, text: &str) -> impl Iterator<Item = &str> {
    let pattern: &Regex = match script {
        Script::Hebrew => &HEBREW_RUN,
        Script::Latin => &LATIN_RUN,
    };
    pattern.find_iter(text).map(|m| m.as_str())
}

/// The inner HTML of every related-word entry of a Milog page.
///
/// Entries may hold nested `div`s, so closing tags are matched by depth. An
/// entry left open at the end of the page runs to the end.
pub fn related_blocks(html: &str) -> Vec<&str> {
    let mut blocks = Vec::new();
    let mut open: Option<(usize, usize)> = None;
    let mut depth = 0_usize;

    for tag in DIV_TAG.captures_iter(html) {
        let whole = match tag.get(0) {
            Some(whole) => whole,
            None => continue,
        };
        let attributes = &tag[2];

        if !tag[1].is_empty() {
            depth = depth.saturating_sub(1);
            if let Some((start, level)) = open {
                if depth == level {
                    blocks.push(&html[start..whole.start()]);
                    open = None;
                }
            }
        } else if !attributes.trim_end().ends_with('/') {
            if open.is_none() && RELATED_CLASS.is_match(attributes) {
                open = Some((whole.end(), depth));
            }
            depth += 1;
        }
    }

    if let Some((start, _)) = open {
        blocks.push(&html[start..]);
    }
    blocks
}

/// The words inside every related-word entry of a Milog page.
pub fn related_entries(html: &str) -> Vec<String> {
    related_blocks(html)
        .into_iter()
        .flat_map(|inner| {
            let text = TAG.replace_all(inner, " ");
            WORD.find_iter(&text)
                .map(|m| m.as_str().to_string())
                .collect::<Vec<_>>()
        })
        .collect()
}
