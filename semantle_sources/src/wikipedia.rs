use log::debug;
use reqwest::blocking::Client;
use semantle_rs::{
    language::Script, LanguageProfile, LookupError, RelationSource, Relations,
};
use serde::Deserialize;

use crate::{
    http::{self, fetch_text},
    util,
};

#[derive(Debug, Deserialize)]
struct Reply {
    #[serde(default)]
    query: Option<Query>,
}

#[derive(Debug, Deserialize)]
struct Query {
    #[serde(default)]
    pages: Vec<Page>,
}

#[derive(Debug, Deserialize)]
struct Page {
    #[serde(default)]
    missing: bool,
    #[serde(default)]
    revisions: Vec<Revision>,
}

#[derive(Debug, Deserialize)]
struct Revision {
    #[serde(default)]
    content: String,
}

/// Related words from the links of an encyclopedia page.
///
/// The page titled exactly like the word is fetched through the MediaWiki
/// revisions API. Link targets become primary phrases. For profiles that
/// scan page bodies, every run of the profile's script anywhere in the
/// wikitext becomes a secondary phrase.
#[derive(Debug, Clone)]
pub struct Wikipedia {
    client: Client,
    api: String,
    body_scan: Option<Script>,
}

impl Wikipedia {
    /// A source reading from the profile's encyclopedia.
    pub fn new(profile: &LanguageProfile) -> reqwest::Result<Self> {
        Ok(Wikipedia {
            client: http::client()?,
            api: profile.encyclopedia_api().to_string(),
            body_scan: profile.body_scan().then(|| profile.script()),
        })
    }

    /// Points the source at a different MediaWiki API endpoint.
    pub fn api(self, api: impl Into<String>) -> Self {
        Wikipedia {
            api: api.into(),
            ..self
        }
    }
}

impl RelationSource for Wikipedia {
    fn lookup(&mut self, word: &str) -> Result<Relations, LookupError> {
        debug!("looking up \"{}\" at {}", word, self.api);
        let request = self.client.get(&self.api).query(&[
            ("action", "query"),
            ("titles", word),
            ("prop", "revisions"),
            ("rvprop", "content"),
            ("format", "json"),
            ("formatversion", "2"),
        ]);
        parse(&fetch_text(request)?, self.body_scan)
    }
}

/// Extracts relations from a revisions API reply.
///
/// A missing page, or one without revisions, has no relations.
pub(crate) fn parse(body: &str, body_scan: Option<Script>) -> Result<Relations, LookupError> {
    let reply: Reply =
        serde_json::from_str(body).map_err(|e| LookupError::Malformed(e.to_string()))?;

    let page = match reply.query.and_then(|q| q.pages.into_iter().next()) {
        Some(page) if !page.missing => page,
        _ => return Ok(Relations::default()),
    };
    let wikitext = match page.revisions.into_iter().next() {
        Some(revision) => revision.content,
        None => return Ok(Relations::default()),
    };

    let primary = util::links(&wikitext).map(str::to_string).collect();
    let secondary = match body_scan {
        Some(script) => util::script_runs(script, &wikitext)
            .map(str::to_string)
            .collect(),
        None => Vec::new(),
    };
    Ok(Relations::new(primary, secondary))
}
