use std::{
    cell::{Cell, RefCell},
    collections::{HashMap, VecDeque},
    rc::Rc,
    time::Duration,
};

use crate::{
    expansion::{RelationSource, Relations},
    oracle::{Pause, RawReply, ScoreService},
    LookupError, OracleError,
};

/// A score service that plays back scripted replies first, then answers from
/// a fixed table of similarities.
#[derive(Debug, Clone, Default)]
pub(crate) struct ScriptedService {
    replies: VecDeque<Result<RawReply, String>>,
    scores: HashMap<String, f64>,
    calls: Rc<RefCell<Vec<String>>>,
}

impl ScriptedService {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn reply(mut self, reply: RawReply) -> Self {
        self.replies.push_back(Ok(reply));
        self
    }

    pub(crate) fn fail(mut self, message: &str) -> Self {
        self.replies.push_back(Err(message.to_string()));
        self
    }

    pub(crate) fn score(mut self, word: &str, similarity: f64) -> Self {
        self.scores.insert(word.to_string(), similarity);
        self
    }

    /// The words asked about so far, in order.
    pub(crate) fn calls(&self) -> Rc<RefCell<Vec<String>>> {
        self.calls.clone()
    }
}

impl ScoreService for ScriptedService {
    fn fetch(&mut self, word: &str) -> Result<RawReply, OracleError> {
        self.calls.borrow_mut().push(word.to_string());

        if let Some(next) = self.replies.pop_front() {
            return next.map_err(OracleError::Transport);
        }

        Ok(match self.scores.get(word) {
            Some(similarity) => RawReply::new(200, format!(r#"{{"similarity": {}}}"#, similarity)),
            None => RawReply::new(404, "Word not found"),
        })
    }
}

/// A pause that records how long it was asked to wait instead of sleeping.
#[derive(Debug, Clone, Default)]
pub(crate) struct RecordingPause {
    log: Rc<RefCell<Vec<Duration>>>,
}

impl RecordingPause {
    pub(crate) fn waits(&self) -> Vec<Duration> {
        self.log.borrow().clone()
    }
}

impl Pause for RecordingPause {
    fn pause(&mut self, duration: Duration) {
        self.log.borrow_mut().push(duration)
    }
}

/// A relation source backed by a fixed table, counting its lookups.
#[derive(Debug, Clone, Default)]
pub(crate) struct MockSource {
    relations: HashMap<String, Relations>,
    failing: Vec<String>,
    lookups: Rc<Cell<usize>>,
}

impl MockSource {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn related(mut self, word: &str, related: &[&str]) -> Self {
        self.relations.insert(
            word.to_string(),
            Relations::new(related.iter().map(|s| s.to_string()).collect(), Vec::new()),
        );
        self
    }

    pub(crate) fn relations(mut self, word: &str, relations: Relations) -> Self {
        self.relations.insert(word.to_string(), relations);
        self
    }

    pub(crate) fn failing(mut self, word: &str) -> Self {
        self.failing.push(word.to_string());
        self
    }

    /// A shared handle on the number of lookups performed.
    pub(crate) fn lookups(&self) -> Rc<Cell<usize>> {
        self.lookups.clone()
    }
}

impl RelationSource for MockSource {
    fn lookup(&mut self, word: &str) -> Result<Relations, LookupError> {
        self.lookups.set(self.lookups.get() + 1);
        if self.failing.iter().any(|w| w == word) {
            return Err(LookupError::Status(500));
        }
        Ok(self.relations.get(word).cloned().unwrap_or_default())
    }
}
