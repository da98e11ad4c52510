use log::debug;
use reqwest::blocking::Client;
use semantle_rs::{LanguageProfile, LookupError, RelationSource, Relations};

use crate::{
    http::{self, fetch_text},
    util,
};

/// Related words from a Milog dictionary page.
///
/// Milog lists related words in `sr_e` blocks. Every word found in them is a
/// primary phrase; there are no secondary phrases.
#[derive(Debug, Clone)]
pub struct Milog {
    client: Client,
    template: String,
}

impl Milog {
    /// A source reading from the profile's dictionary, if it has one.
    pub fn new(profile: &LanguageProfile) -> reqwest::Result<Option<Self>> {
        match profile.dictionary_template() {
            Some(template) => Ok(Some(Self::with_template(template)?)),
            None => Ok(None),
        }
    }

    /// A source reading from `template`, where `{word}` stands for the
    /// percent-encoded word.
    pub fn with_template(template: impl Into<String>) -> reqwest::Result<Self> {
        Ok(Milog {
            client: http::client()?,
            template: template.into(),
        })
    }

    fn url(&self, word: &str) -> String {
        self.template
            .replace("{word}", &urlencoding::encode(word))
    }
}

impl RelationSource for Milog {
    fn lookup(&mut self, word: &str) -> Result<Relations, LookupError> {
        let url = self.url(word);
        debug!("looking up \"{}\" at {}", word, url);
        let html = fetch_text(self.client.get(url))?;
        Ok(parse(&html))
    }
}

pub(crate) fn parse(html: &str) -> Relations {
    Relations::new(util::related_entries(html), Vec::new())
}
