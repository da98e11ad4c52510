//! Reporting on a run as it happens.

use std::fmt::Display;

#[cfg(feature = "fancy")]
use comfy_table::{presets, Cell, Color, Table};
#[cfg(feature = "fancy")]
use owo_colors::{AnsiColors, OwoColorize, Stream};
use serde::Serialize;

use crate::{
    expansion::CacheStats,
    ledger::{Guess, Ledger},
};

/// One guess with its origin word resolved, ready to print.
#[derive(Clone, Copy, Debug)]
pub struct GuessLine<'a> {
    pub guess: &'a Guess,
    pub origin: Option<&'a str>,
}

impl<'a> GuessLine<'a> {
    pub fn new(guess: &'a Guess, ledger: &'a Ledger) -> Self {
        GuessLine {
            guess,
            origin: guess
                .origin()
                .and_then(|id| ledger.get(id))
                .map(|g| g.word()),
        }
    }

    fn similarity(&self) -> String {
        match self.guess.similarity() {
            Some(s) => format!("{:.2}", s),
            None => "unknown".to_string(),
        }
    }

    fn rank(&self) -> String {
        self.guess
            .rank()
            .map_or_else(|| "-".to_string(), |r| r.to_string())
    }
}

impl<'a> Display for GuessLine<'a> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "#{:<4} {:20} Sim: {:>7} Rank: {:>4} Origin: {} ({})",
            self.guess.number(),
            self.guess.word(),
            self.similarity(),
            self.rank(),
            self.origin.unwrap_or(""),
            self.guess.source()
        )
    }
}

/// The best guesses so far.
#[derive(Clone, Debug)]
pub struct Snapshot<'a> {
    pub tried: usize,
    pub top: Vec<GuessLine<'a>>,
}

impl<'a> Snapshot<'a> {
    pub fn new(ledger: &'a Ledger, tried: usize, size: usize) -> Self {
        Snapshot {
            tried,
            top: ledger
                .top_k(size)
                .into_iter()
                .map(|g| GuessLine::new(g, ledger))
                .collect(),
        }
    }

    /// Prints the snapshot as a table.
    #[cfg(feature = "fancy")]
    pub fn print(&self) {
        let mut table = Table::new();
        if table.is_tty() {
            table.load_preset(presets::UTF8_FULL);
        } else {
            table.load_preset(presets::ASCII_FULL);
        }
        table.set_header(vec!["#", "word", "similarity", "rank", "origin", "source"]);
        for line in &self.top {
            let mut word = Cell::new(line.guess.word());
            if line.guess.is_unknown() {
                word = word.fg(Color::DarkGrey);
            }
            table.add_row(vec![
                Cell::new(line.guess.number()),
                word,
                Cell::new(line.similarity()),
                Cell::new(line.rank()),
                Cell::new(line.origin.unwrap_or("")),
                Cell::new(line.guess.source()),
            ]);
        }
        println!("{:=^75}", format!(" top {} after {} words ", self.top.len(), self.tried));
        println!("{}", table);
    }

    #[cfg(not(feature = "fancy"))]
    pub fn print(&self) {
        print!("{}", self);
    }
}

impl<'a> Display for Snapshot<'a> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.top.is_empty() {
            return writeln!(f, "No guesses made yet.");
        }
        writeln!(f, "{:=^75}", format!(" top {} after {} words ", self.top.len(), self.tried))?;
        for line in &self.top {
            writeln!(f, "{}", line)?;
        }
        writeln!(f, "{:=<75}", "")
    }
}

/// Counters describing a finished run.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    /// Rounds played, including rounds lost to transient failures.
    pub rounds: usize,

    /// Guesses recorded in the ledger.
    pub guesses: usize,

    /// Recorded guesses the oracle did not recognize.
    pub unknown: usize,

    /// Submissions that failed transiently.
    pub transient_failures: usize,

    /// Words given up on after failing transiently too often.
    pub retired: usize,

    /// Words tried or otherwise consumed.
    pub tried: usize,

    /// The secret word, if it was found.
    pub solution: Option<String>,
}

impl Display for Summary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.solution {
            Some(word) => writeln!(f, "Found \"{}\" in {} rounds", word, self.rounds)?,
            None => writeln!(f, "Gave up after {} rounds", self.rounds)?,
        }
        writeln!(
            f,
            "{} guesses recorded, {} of them unknown words",
            self.guesses, self.unknown
        )?;
        write!(
            f,
            "{} transient failures, {} words retired, {} words tried",
            self.transient_failures, self.retired, self.tried
        )
    }
}

/// Receives progress from a [`Solver`](crate::Solver).
///
/// Every method does nothing by default.
pub trait Reporter {
    /// A guess was recorded.
    fn guess(&mut self, _line: &GuessLine<'_>) {}

    /// A periodic or final view of the best guesses.
    fn snapshot(&mut self, _snapshot: &Snapshot<'_>) {}

    /// The secret was found; `path` leads from a root guess to it.
    fn solved(&mut self, _path: &[GuessLine<'_>]) {}

    /// A provider's caches were cleared.
    fn flushed(&mut self, _tag: &str, _stats: &CacheStats) {}

    /// The run is over.
    fn finished(&mut self, _summary: &Summary) {}
}

/// Ignores everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct Quiet;

impl Reporter for Quiet {}

/// Prints progress to standard output.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleReporter;

impl Reporter for ConsoleReporter {
    fn guess(&mut self, line: &GuessLine<'_>) {
        println!("{}", line);
    }

    fn snapshot(&mut self, snapshot: &Snapshot<'_>) {
        snapshot.print();
    }

    #[cfg(feature = "fancy")]
    fn solved(&mut self, path: &[GuessLine<'_>]) {
        println!(
            "{}",
            "FOUND THE ANSWER!".if_supports_color(Stream::Stdout, |text| text
                .color(AnsiColors::Green)
                .bold()
                .to_string())
        );
        println!("Path:");
        for line in path {
            println!("{}", line);
        }
    }

    #[cfg(not(feature = "fancy"))]
    fn solved(&mut self, path: &[GuessLine<'_>]) {
        println!("FOUND THE ANSWER!");
        println!("Path:");
        for line in path {
            println!("{}", line);
        }
    }

    fn flushed(&mut self, tag: &str, stats: &CacheStats) {
        println!("Flushed the {} cache - size before {}", tag, stats);
    }

    fn finished(&mut self, summary: &Summary) {
        println!("{}", summary);
    }
}
