//! Talking to the scoring oracle.
//!
//! The oracle is reached through a [`ScoreService`], which only moves bytes.
//! [`classify()`] turns a raw reply into one of four [`Response`]s, and
//! [`Oracle::submit()`] drives a single word to a final [`Outcome`], pausing
//! and retrying while the service reports rate limiting.

use std::{thread, time::Duration};

use log::{debug, warn};
use serde::Deserialize;

use crate::{ledger::Score, LanguageProfile, OracleError};

/// A raw reply from the oracle endpoint.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawReply {
    pub status: u16,
    pub body: String,
}

impl RawReply {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        RawReply {
            status,
            body: body.into(),
        }
    }
}

/// The transport to the oracle.
///
/// Implementations send exactly one request per call and report what came
/// back. They should only fail when no reply was received at all.
pub trait ScoreService {
    fn fetch(&mut self, word: &str) -> Result<RawReply, OracleError>;
}

/// Something that can block the current thread for a while.
pub trait Pause {
    fn pause(&mut self, duration: Duration);
}

/// Pauses by sleeping the current thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadSleep;

impl Pause for ThreadSleep {
    fn pause(&mut self, duration: Duration) {
        thread::sleep(duration)
    }
}

/// The rule deciding whether a score means the secret word was found.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Terminal {
    /// The oracle reports this secondary rank for the secret itself.
    Rank(u32),

    /// Any similarity at or above this value is an exact match.
    Similarity(f64),
}

impl Terminal {
    pub fn is_reached(&self, score: &Score) -> bool {
        match *self {
            Terminal::Rank(rank) => score.rank == Some(rank),
            Terminal::Similarity(similarity) => score.similarity >= similarity,
        }
    }
}

/// The four ways the oracle can answer a single request.
#[derive(Debug)]
pub enum Response {
    Score(Score),
    UnknownWord,
    RateLimited,
    Transient(OracleError),
}

/// The final result of submitting a word.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Outcome {
    Scored(Score),

    /// The oracle does not know the word.
    Unknown,
}

#[derive(Debug, Deserialize)]
struct Reading {
    similarity: Option<f64>,
    distance: Option<i64>,
    percentile: Option<i64>,
}

/// Deployments differ on whether the reading comes bare or wrapped in a
/// one-element array.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Shape {
    One(Reading),
    Many(Vec<Reading>),
}

/// Classifies a raw oracle reply.
///
/// # Examples
///
/// ```rust
/// use semantle_rs::oracle::{classify, RawReply, Response};
///
/// let bare = RawReply::new(200, r#"{"similarity": 41.5, "distance": 990}"#);
/// let wrapped = RawReply::new(200, r#"[{"similarity": 41.5, "distance": 990}]"#);
///
/// for reply in [bare, wrapped] {
///     match classify(&reply, "Word not found") {
///         Response::Score(score) => assert_eq!(score.rank, Some(990)),
///         other => panic!("unexpected {:?}", other),
///     }
/// }
///
/// let missing = RawReply::new(404, "Word not found");
/// assert!(matches!(classify(&missing, "Word not found"), Response::UnknownWord));
/// ```
pub fn classify(reply: &RawReply, not_found_marker: &str) -> Response {
    match reply.status {
        429 => Response::RateLimited,
        400 | 404 if reply.body.contains(not_found_marker) => Response::UnknownWord,
        200..=299 => parse_reading(&reply.body),
        status => Response::Transient(OracleError::Status {
            status,
            body: reply.body.chars().take(200).collect(),
        }),
    }
}

fn parse_reading(body: &str) -> Response {
    let shape = match serde_json::from_str::<Option<Shape>>(body) {
        Ok(Some(shape)) => shape,
        Ok(None) => return Response::UnknownWord,
        Err(e) => return Response::Transient(OracleError::Malformed(e.to_string())),
    };

    let reading = match shape {
        Shape::One(reading) => reading,
        Shape::Many(readings) => match readings.into_iter().next() {
            Some(reading) => reading,
            None => {
                return Response::Transient(OracleError::Malformed("empty reply array".into()))
            }
        },
    };

    match reading.similarity {
        Some(similarity) => {
            let rank = reading
                .distance
                .or(reading.percentile)
                .filter(|&r| r > 0)
                .and_then(|r| u32::try_from(r).ok());
            Response::Score(Score::new(similarity, rank))
        }
        None => Response::Transient(OracleError::Malformed("reply has no similarity".into())),
    }
}

/// How long to wait between attempts while the oracle is rate limiting.
///
/// Each wait is the previous one multiplied by [`factor`](Backoff::factor()).
/// By default the policy gives up after ten attempts and never waits longer
/// than a minute at a time; [`unbounded()`](Backoff::unbounded()) removes
/// both limits.
///
/// ```rust
/// use std::time::Duration;
/// use semantle_rs::Backoff;
///
/// let backoff = Backoff::unbounded().initial(Duration::from_secs(2));
/// assert_eq!(backoff.wait(0), Duration::from_secs(2));
/// assert_eq!(backoff.wait(2), Duration::from_millis(4500));
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Backoff {
    initial: Duration,
    factor: f64,
    max_attempts: Option<u32>,
    ceiling: Option<Duration>,
}

impl Default for Backoff {
    fn default() -> Self {
        Backoff {
            initial: Duration::from_secs(5),
            factor: 1.5,
            max_attempts: Some(10),
            ceiling: Some(Duration::from_secs(60)),
        }
    }
}

impl Backoff {
    pub fn new() -> Self {
        Self::default()
    }

    /// A policy that retries forever with ever-growing waits.
    pub fn unbounded() -> Self {
        Backoff {
            max_attempts: None,
            ceiling: None,
            ..Self::default()
        }
    }

    pub fn initial(self, initial: Duration) -> Self {
        Backoff { initial, ..self }
    }

    pub fn factor(self, factor: f64) -> Self {
        Backoff { factor, ..self }
    }

    /// Gives up after `attempts` rate-limited requests for the same word.
    pub fn max_attempts(self, max_attempts: Option<u32>) -> Self {
        Backoff {
            max_attempts,
            ..self
        }
    }

    /// Never waits longer than `ceiling` at a time.
    pub fn ceiling(self, ceiling: Option<Duration>) -> Self {
        Backoff { ceiling, ..self }
    }

    /// The wait after the `retry`-th consecutive rate limit, counting from 0.
    pub fn wait(&self, retry: u32) -> Duration {
        let exponent = i32::try_from(retry).unwrap_or(i32::MAX);
        let secs = self.initial.as_secs_f64() * self.factor.powi(exponent);
        let wait = Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX);
        match self.ceiling {
            Some(ceiling) => wait.min(ceiling),
            None => wait,
        }
    }

    fn allows(&self, attempts: u32) -> bool {
        self.max_attempts.map_or(true, |max| attempts < max)
    }
}

/// A client for the scoring oracle.
pub struct Oracle {
    service: Box<dyn ScoreService>,
    pause: Box<dyn Pause>,
    backoff: Backoff,
    not_found_marker: String,
}

impl std::fmt::Debug for Oracle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Oracle")
            .field("backoff", &self.backoff)
            .field("not_found_marker", &self.not_found_marker)
            .finish()
    }
}

impl Oracle {
    /// Creates a client speaking through `service`, with the default
    /// [`Backoff`] and real sleeps.
    pub fn new(service: Box<dyn ScoreService>, profile: &LanguageProfile) -> Self {
        Oracle {
            service,
            pause: Box::new(ThreadSleep),
            backoff: Backoff::default(),
            not_found_marker: profile.not_found_marker().to_string(),
        }
    }

    pub fn backoff(self, backoff: Backoff) -> Self {
        Oracle { backoff, ..self }
    }

    /// Replaces how the client waits out rate limits.
    pub fn pause_with(self, pause: Box<dyn Pause>) -> Self {
        Oracle { pause, ..self }
    }

    /// Submits one word and waits for a final answer.
    ///
    /// Rate limiting is absorbed here: the client pauses for the current
    /// backoff and asks again, until the oracle answers or the backoff policy
    /// runs out of attempts. Every error returned is transient.
    pub fn submit(&mut self, word: &str) -> Result<Outcome, OracleError> {
        let mut retry = 0;
        loop {
            let reply = self.service.fetch(word)?;
            match classify(&reply, &self.not_found_marker) {
                Response::Score(score) => {
                    debug!("{} scored {:.2}", word, score.similarity);
                    return Ok(Outcome::Scored(score));
                }
                Response::UnknownWord => return Ok(Outcome::Unknown),
                Response::Transient(e) => return Err(e),
                Response::RateLimited => {
                    if !self.backoff.allows(retry + 1) {
                        return Err(OracleError::RateLimitExhausted {
                            word: word.to_string(),
                            attempts: retry + 1,
                        });
                    }
                    let wait = self.backoff.wait(retry);
                    warn!("rate limited on \"{}\", waiting {:?}", word, wait);
                    self.pause.pause(wait);
                    retry += 1;
                }
            }
        }
    }
}
