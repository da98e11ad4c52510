use std::time::Duration;

use reqwest::blocking::Client;
use semantle_rs::LookupError;

/// Identifies the solver to the services it talks to.
pub const USER_AGENT: &str = concat!(
    "semantle_rs/",
    env!("CARGO_PKG_VERSION"),
    " (https://github.com/cgm616/semantle_rs)"
);

/// How long any single request may take.
pub const TIMEOUT: Duration = Duration::from_secs(10);

/// Builds the HTTP client shared by every source.
pub fn client() -> reqwest::Result<Client> {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(TIMEOUT)
        .build()
}

pub(crate) fn transport(e: reqwest::Error) -> LookupError {
    LookupError::Other(Box::new(e))
}

/// Sends `request` and returns the body of a successful response.
pub(crate) fn fetch_text(request: reqwest::blocking::RequestBuilder) -> Result<String, LookupError> {
    let response = request.send().map_err(transport)?;
    let status = response.status();
    if !status.is_success() {
        return Err(LookupError::Status(status.as_u16()));
    }
    response.text().map_err(transport)
}
