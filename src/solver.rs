//! The run loop that plays a whole game.

use std::{collections::HashMap, time::Duration};

use log::{debug, info, warn};

use crate::{
    ledger::{GuessId, Ledger, TriedSet},
    oracle::{Outcome, Pause, Terminal, ThreadSleep},
    report::{ConsoleReporter, GuessLine, Quiet, Reporter, Snapshot, Summary},
    LanguageProfile, Oracle, Result, Selector,
};

/// A solver that plays one game against an oracle.
///
/// A solver owns everything a run needs: the ledger of guesses, the set of
/// tried words, the selector with its providers and caches, and the oracle
/// client. Create one per game with [`new()`](Solver::new()) and configure
/// it with the consuming builder methods.
///
/// Defaults:
/// 1. prints progress to standard output
/// 2. shows the best 15 guesses every 15 tried words
/// 3. clears provider caches every 200 tried words
/// 4. waits 100ms between rounds
/// 5. keeps retrying a word that fails transiently, however often it fails
///
/// # Examples
///
/// ```no_run
/// # use semantle_rs::{oracle::{RawReply, ScoreService}, OracleError};
/// # struct Http;
/// # impl ScoreService for Http {
/// #     fn fetch(&mut self, _: &str) -> Result<RawReply, OracleError> { todo!() }
/// # }
/// use semantle_rs::{LanguageProfile, Oracle, Selector, Solver};
///
/// let profile = LanguageProfile::english();
/// let oracle = Oracle::new(Box::new(Http), &profile);
/// let selector = Selector::new(&profile).seed_word("war");
///
/// let mut solver = Solver::new(oracle, selector, &profile).report_every(50);
/// let solution = solver.run()?;
/// println!("the word was {}", solution.word);
/// #
/// # Ok::<_, semantle_rs::SolverError>(())
/// ```
pub struct Solver {
    oracle: Oracle,
    selector: Selector,
    terminal: Terminal,
    reporter: Box<dyn Reporter>,
    pause: Box<dyn Pause>,
    report_every: usize,
    snapshot_size: usize,
    flush_every: Option<usize>,
    round_delay: Duration,
    transient_limit: Option<u32>,
    ledger: Ledger,
    tried: TriedSet,
    failures: HashMap<String, u32>,
    flushed_at: usize,
    rounds: usize,
    transient_failures: usize,
    retired: usize,
}

impl std::fmt::Debug for Solver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Solver")
            .field("oracle", &self.oracle)
            .field("selector", &self.selector)
            .field("terminal", &self.terminal)
            .field("guesses", &self.ledger.len())
            .field("tried", &self.tried.len())
            .field("rounds", &self.rounds)
            .finish()
    }
}

/// What a single round achieved.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Round {
    /// A guess was recorded.
    Recorded(GuessId),

    /// The recorded guess was the secret word.
    Solved(GuessId),

    /// The submission failed transiently and nothing was recorded.
    Failed,
}

/// The result of a successful run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Solution {
    pub word: String,
    pub id: GuessId,
    pub rounds: usize,
}

impl Solver {
    /// Creates a solver using the profile's terminal rule.
    pub fn new(oracle: Oracle, selector: Selector, profile: &LanguageProfile) -> Self {
        Solver {
            oracle,
            selector,
            terminal: profile.terminal_rule(),
            reporter: Box::new(ConsoleReporter),
            pause: Box::new(ThreadSleep),
            report_every: 15,
            snapshot_size: 15,
            flush_every: Some(200),
            round_delay: Duration::from_millis(100),
            transient_limit: None,
            ledger: Ledger::new(),
            tried: TriedSet::new(),
            failures: HashMap::new(),
            flushed_at: 0,
            rounds: 0,
            transient_failures: 0,
            retired: 0,
        }
    }

    pub fn reporter(self, reporter: Box<dyn Reporter>) -> Self {
        Solver { reporter, ..self }
    }

    /// Reports nothing.
    pub fn quiet(self) -> Self {
        self.reporter(Box::new(Quiet))
    }

    /// Shows a snapshot of the best guesses every `n` tried words; 0 shows
    /// one only when the secret is found.
    pub fn report_every(self, n: usize) -> Self {
        Solver {
            report_every: n,
            ..self
        }
    }

    /// How many guesses a snapshot shows.
    pub fn snapshot_size(self, n: usize) -> Self {
        Solver {
            snapshot_size: n,
            ..self
        }
    }

    /// Clears provider caches every `n` tried words, or never.
    pub fn flush_every(self, n: Option<usize>) -> Self {
        Solver {
            flush_every: n.filter(|&n| n > 0),
            ..self
        }
    }

    pub fn round_delay(self, delay: Duration) -> Self {
        Solver {
            round_delay: delay,
            ..self
        }
    }

    /// Replaces how the solver waits between rounds.
    pub fn pause_with(self, pause: Box<dyn Pause>) -> Self {
        Solver { pause, ..self }
    }

    /// Retires a word after `limit` transient failures, or never (the
    /// default). A retired word is never submitted again, even if it is the
    /// secret.
    pub fn transient_limit(self, limit: Option<u32>) -> Self {
        Solver {
            transient_limit: limit,
            ..self
        }
    }

    pub fn terminal(self, terminal: Terminal) -> Self {
        Solver { terminal, ..self }
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn tried(&self) -> &TriedSet {
        &self.tried
    }

    pub fn selector(&self) -> &Selector {
        &self.selector
    }

    /// Counters describing the run so far.
    pub fn summary(&self) -> Summary {
        Summary {
            rounds: self.rounds,
            guesses: self.ledger.len(),
            unknown: self.ledger.num_unknown(),
            transient_failures: self.transient_failures,
            retired: self.retired,
            tried: self.tried.len(),
            solution: self
                .ledger
                .iter()
                .find(|g| g.score().map_or(false, |s| self.terminal.is_reached(&s)))
                .map(|g| g.word().to_string()),
        }
    }

    /// Plays rounds until the secret is found or the search is exhausted.
    pub fn run(&mut self) -> Result<Solution> {
        info!("solving with width {}", self.selector.width());
        loop {
            match self.play_round() {
                Ok(Round::Solved(id)) => {
                    let summary = self.summary();
                    self.reporter.finished(&summary);
                    return Ok(Solution {
                        word: self.ledger[id.index()].word().to_string(),
                        id,
                        rounds: self.rounds,
                    });
                }
                Ok(_) => {}
                Err(e) => {
                    warn!("stopping: {}", e);
                    let summary = self.summary();
                    self.reporter.finished(&summary);
                    return Err(e);
                }
            }

            self.flush_if_due();
            if !self.round_delay.is_zero() {
                self.pause.pause(self.round_delay);
            }
        }
    }

    /// Chooses, submits and records one word.
    ///
    /// Only an exhausted search is an error; transient oracle failures are
    /// logged and reported as [`Round::Failed`].
    pub fn play_round(&mut self) -> Result<Round> {
        self.rounds += 1;
        let candidate = self.selector.next(&self.ledger, &self.tried)?;
        debug!("round {}: trying {}", self.rounds, candidate);

        let outcome = match self.oracle.submit(&candidate.word) {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!("submitting \"{}\" failed: {}", candidate.word, e);
                self.note_failure(&candidate.word);
                return Ok(Round::Failed);
            }
        };

        let score = match outcome {
            Outcome::Scored(score) => Some(score),
            Outcome::Unknown => None,
        };
        self.tried.insert(candidate.word.clone());
        let id = self
            .ledger
            .record(candidate.word, score, candidate.origin, candidate.source)?;

        let guess = &self.ledger[id.index()];
        self.reporter.guess(&GuessLine::new(guess, &self.ledger));

        let solved = score.map_or(false, |s| self.terminal.is_reached(&s));
        let tried = self.tried.len();
        if solved || (self.report_every > 0 && tried % self.report_every == 0) {
            let snapshot = Snapshot::new(&self.ledger, tried, self.snapshot_size);
            self.reporter.snapshot(&snapshot);
        }

        if solved {
            info!("found \"{}\" after {} rounds", guess.word(), self.rounds);
            let path: Vec<_> = self
                .ledger
                .path_of(id)
                .into_iter()
                .map(|g| GuessLine::new(g, &self.ledger))
                .collect();
            self.reporter.solved(&path);
            return Ok(Round::Solved(id));
        }

        Ok(Round::Recorded(id))
    }

    fn note_failure(&mut self, word: &str) {
        self.transient_failures += 1;
        let count = self.failures.entry(word.to_string()).or_insert(0);
        *count += 1;

        if let Some(limit) = self.transient_limit {
            if *count >= limit {
                warn!("giving up on \"{}\" after {} failures", word, count);
                self.tried.insert(word);
                self.retired += 1;
            }
        }
    }

    fn flush_if_due(&mut self) {
        let every = match self.flush_every {
            Some(every) => every,
            None => return,
        };

        let tried = self.tried.len();
        if tried >= self.flushed_at.saturating_add(every) {
            self.flushed_at = tried;
            for (tag, stats) in self.selector.clear_caches() {
                info!("cleared the {} cache: {}", tag, stats);
                self.reporter.flushed(&tag, &stats);
            }
        }
    }
}

#[cfg(test)]
mod test {
    use std::{cell::RefCell, rc::Rc};

    use super::*;
    use crate::{
        expansion::{CacheStats, Provider},
        ledger::Source,
        mock::{MockSource, RecordingPause, ScriptedService},
        SolverError,
    };

    #[derive(Debug, Clone, Default)]
    struct Recorder {
        events: Rc<RefCell<Vec<String>>>,
    }

    impl Recorder {
        fn events(&self) -> Vec<String> {
            self.events.borrow().clone()
        }

        fn push(&self, event: String) {
            self.events.borrow_mut().push(event);
        }
    }

    impl Reporter for Recorder {
        fn guess(&mut self, line: &GuessLine<'_>) {
            self.push(format!("guess {}", line.guess.word()));
        }

        fn snapshot(&mut self, snapshot: &Snapshot<'_>) {
            self.push(format!("snapshot {}", snapshot.tried));
        }

        fn solved(&mut self, path: &[GuessLine<'_>]) {
            let words: Vec<_> = path.iter().map(|l| l.guess.word()).collect();
            self.push(format!("solved {}", words.join(" -> ")));
        }

        fn flushed(&mut self, tag: &str, _stats: &CacheStats) {
            self.push(format!("flushed {}", tag));
        }
    }

    fn profile() -> LanguageProfile {
        LanguageProfile::english().terminal(Terminal::Similarity(1.0))
    }

    fn war_and_peace() -> ScriptedService {
        ScriptedService::new()
            .score("war", 0.9)
            .score("conflict", 0.95)
            .score("peace", 1.0)
    }

    fn wiki() -> MockSource {
        MockSource::new()
            .related("war", &["conflict"])
            .related("conflict", &["peace"])
    }

    fn solver(service: ScriptedService, source: MockSource, selector: Selector) -> Solver {
        let profile = profile();
        let oracle = Oracle::new(Box::new(service), &profile)
            .pause_with(Box::new(RecordingPause::default()));
        let selector = selector.add_provider(Provider::new("wiki", Box::new(source), &profile));
        Solver::new(oracle, selector, &profile)
            .quiet()
            .round_delay(Duration::ZERO)
    }

    fn selector() -> Selector {
        Selector::new(&profile()).vocabulary(Vec::new()).rng_seed(1)
    }

    #[test]
    fn war_conflict_peace() {
        let service = war_and_peace();
        let calls = service.calls();
        let recorder = Recorder::default();
        let mut solver = solver(service, wiki(), selector().seed_word("war"))
            .reporter(Box::new(recorder.clone()))
            .report_every(0);

        let solution = solver.run().unwrap();
        assert_eq!(solution.word, "peace");
        assert_eq!(solution.rounds, 3);
        assert_eq!(*calls.borrow(), ["war", "conflict", "peace"]);

        let path: Vec<_> = solver
            .ledger()
            .path_of(solution.id)
            .iter()
            .map(|g| g.word())
            .collect();
        assert_eq!(path, ["war", "conflict", "peace"]);

        assert_eq!(
            recorder.events(),
            [
                "guess war",
                "guess conflict",
                "guess peace",
                "snapshot 3",
                "solved war -> conflict -> peace"
            ]
        );

        let sources: Vec<_> = solver.ledger().iter().map(|g| g.source().clone()).collect();
        assert_eq!(
            sources,
            [
                Source::Seed,
                Source::Related("wiki".into()),
                Source::Related("wiki".into())
            ]
        );
        assert_eq!(solver.summary().solution.as_deref(), Some("peace"));
    }

    #[test]
    fn exhaustion_stops_the_run() {
        let service = ScriptedService::new();
        let calls = service.calls();
        let mut solver = solver(service, MockSource::new(), selector());

        match solver.run() {
            Err(SolverError::SearchExhausted { tried }) => assert_eq!(tried, 0),
            other => panic!("unexpected {:?}", other),
        }
        assert!(calls.borrow().is_empty());
        assert_eq!(solver.summary().rounds, 1);
    }

    #[test]
    fn exhaustion_after_expansion_dries_up() {
        let service = ScriptedService::new().score("war", 0.2);
        let source = MockSource::new();
        let lookups = source.lookups();
        let mut solver = solver(service, source, selector().seed_word("war"));

        assert!(matches!(
            solver.run(),
            Err(SolverError::SearchExhausted { tried: 1 })
        ));
        assert_eq!(solver.ledger().len(), 1);
        assert_eq!(lookups.get(), 1);
    }

    #[test]
    fn unknown_words_are_recorded_once() {
        let service = ScriptedService::new().score("war", 1.0);
        let calls = service.calls();
        let mut solver = solver(
            service,
            MockSource::new(),
            selector().seed_word("zzyzx").vocabulary(vec!["war".into()]),
        );

        let solution = solver.run().unwrap();
        assert_eq!(solution.word, "war");
        assert_eq!(*calls.borrow(), ["zzyzx", "war"]);

        let unknown = &solver.ledger()[0];
        assert_eq!(unknown.word(), "zzyzx");
        assert!(unknown.is_unknown());
        assert!(solver.tried().contains("zzyzx"));
        assert_eq!(solver.summary().unknown, 1);
    }

    #[test]
    fn words_that_keep_failing_can_still_win() {
        let service = ScriptedService::new()
            .fail("connection reset")
            .fail("connection reset")
            .fail("connection reset")
            .score("war", 1.0);
        let calls = service.calls();
        let mut solver = solver(service, MockSource::new(), selector().seed_word("war"));

        let solution = solver.run().unwrap();
        assert_eq!(solution.word, "war");
        assert_eq!(solution.rounds, 4);
        assert_eq!(*calls.borrow(), ["war"; 4]);

        let summary = solver.summary();
        assert_eq!(summary.transient_failures, 3);
        assert_eq!(summary.retired, 0);
    }

    #[test]
    fn huge_flush_intervals_never_fire() {
        let recorder = Recorder::default();
        let mut solver = solver(war_and_peace(), wiki(), selector().seed_word("war"))
            .reporter(Box::new(recorder.clone()))
            .flush_every(Some(usize::MAX - 1));
        solver.flushed_at = 5;

        solver.run().unwrap();
        assert!(!recorder.events().iter().any(|e| e.starts_with("flushed")));
    }

    #[test]
    fn transient_failures_leave_words_eligible() {
        let service = war_and_peace().fail("connection reset");
        let calls = service.calls();
        let mut solver = solver(service, wiki(), selector().seed_word("war"));

        assert_eq!(solver.play_round().unwrap(), Round::Failed);
        assert!(!solver.tried().contains("war"));
        assert!(solver.ledger().is_empty());

        assert!(matches!(solver.play_round().unwrap(), Round::Recorded(_)));
        assert_eq!(*calls.borrow(), ["war", "war"]);
        assert_eq!(solver.summary().transient_failures, 1);
    }

    #[test]
    fn persistent_failures_retire_words() {
        let service = ScriptedService::new().fail("reset").fail("reset");
        let mut solver =
            solver(service, MockSource::new(), selector().seed_word("war")).transient_limit(Some(2));

        assert!(matches!(
            solver.run(),
            Err(SolverError::SearchExhausted { tried: 1 })
        ));
        let summary = solver.summary();
        assert_eq!(summary.rounds, 3);
        assert_eq!(summary.transient_failures, 2);
        assert_eq!(summary.retired, 1);
        assert!(solver.ledger().is_empty());
    }

    #[test]
    fn snapshots_follow_the_interval() {
        let recorder = Recorder::default();
        let mut solver = solver(war_and_peace(), wiki(), selector().seed_word("war"))
            .reporter(Box::new(recorder.clone()))
            .report_every(2);

        solver.run().unwrap();
        let snapshots: Vec<_> = recorder
            .events()
            .into_iter()
            .filter(|e| e.starts_with("snapshot"))
            .collect();
        assert_eq!(snapshots, ["snapshot 2", "snapshot 3"]);
    }

    #[test]
    fn caches_are_flushed_periodically() {
        let recorder = Recorder::default();
        let source = wiki();
        let lookups = source.lookups();
        let mut solver = solver(war_and_peace(), source, selector().seed_word("war"))
            .reporter(Box::new(recorder.clone()))
            .flush_every(Some(1));

        solver.run().unwrap();
        let flushes = recorder
            .events()
            .iter()
            .filter(|e| e.starts_with("flushed"))
            .count();
        assert_eq!(flushes, 2);
        assert_eq!(lookups.get(), 2);
    }

    #[test]
    fn rounds_are_spaced_out() {
        let pause = RecordingPause::default();
        let mut solver = solver(war_and_peace(), wiki(), selector().seed_word("war"))
            .round_delay(Duration::from_millis(100))
            .pause_with(Box::new(pause.clone()));

        solver.run().unwrap();
        assert_eq!(pause.waits(), [Duration::from_millis(100); 2]);
    }
}
