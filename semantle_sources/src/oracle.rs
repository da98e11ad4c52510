use log::debug;
use reqwest::blocking::Client;
use semantle_rs::{
    oracle::{RawReply, ScoreService},
    LanguageProfile, OracleError,
};

use crate::http;

/// Sends guesses to a Semantle oracle over HTTP.
///
/// The profile's oracle URL is a template in which `{word}` is replaced by
/// the percent-encoded guess. Every reply that arrives is handed back as is,
/// whatever its status.
#[derive(Debug, Clone)]
pub struct HttpScoreService {
    client: Client,
    template: String,
}

impl HttpScoreService {
    /// A service for the profile's oracle.
    pub fn new(profile: &LanguageProfile) -> reqwest::Result<Self> {
        Ok(HttpScoreService {
            client: http::client()?,
            template: profile.oracle_template().to_string(),
        })
    }

    /// The URL a guess is sent to.
    pub fn url(&self, word: &str) -> String {
        self.template
            .replace("{word}", &urlencoding::encode(word))
    }
}

impl ScoreService for HttpScoreService {
    fn fetch(&mut self, word: &str) -> Result<RawReply, OracleError> {
        let url = self.url(word);
        debug!("submitting {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| OracleError::Transport(e.to_string()))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .map_err(|e| OracleError::Transport(e.to_string()))?;
        Ok(RawReply::new(status, body))
    }
}
