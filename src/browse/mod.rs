// Interactive browsing: which article is open and how the user moves on.
//
// The selection is plain state owned by the session loop. Nothing here
// touches the terminal, so the transitions are tested directly.

pub mod session;

use rand::Rng;

use crate::corpus::{Corpus, TitleMatch};

/// A parsed line of user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Open the n-th recommendation (1-based, as displayed)
    Open(usize),
    Random,
    Title(String),
    List,
    Show,
    Help,
    Quit,
    Unknown(String),
}

pub fn parse_command(line: &str) -> Command {
    let line = line.trim();
    if line.is_empty() {
        return Command::Show;
    }
    if let Ok(n) = line.parse::<usize>() {
        return Command::Open(n);
    }

    let (head, rest) = match line.split_once(char::is_whitespace) {
        Some((head, rest)) => (head, rest.trim()),
        None => (line, ""),
    };

    match head.to_lowercase().as_str() {
        "r" | "random" => Command::Random,
        "l" | "list" => Command::List,
        "h" | "help" | "?" => Command::Help,
        "q" | "quit" | "exit" => Command::Quit,
        "t" | "title" if !rest.is_empty() => Command::Title(rest.to_string()),
        _ => Command::Unknown(line.to_string()),
    }
}

/// The currently open article.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    current: usize,
}

impl Selection {
    pub fn new(current: usize) -> Self {
        Self { current }
    }

    pub fn current(&self) -> usize {
        self.current
    }

    /// Open the `number`-th (1-based) entry of the displayed recommendations.
    /// Returns false and keeps the selection when there is no such entry.
    pub fn open_recommendation(&mut self, recommendations: &[(usize, f64)], number: usize) -> bool {
        match number
            .checked_sub(1)
            .and_then(|i| recommendations.get(i))
        {
            Some(&(idx, _)) => {
                self.current = idx;
                true
            }
            None => false,
        }
    }

    /// Jump to a uniformly random article (possibly the current one).
    pub fn pick_random<R: Rng>(&mut self, rng: &mut R, corpus_len: usize) {
        if corpus_len > 0 {
            self.current = rng.random_range(0..corpus_len);
        }
    }

    /// Open an article by title. Returns the match so the caller can report
    /// ambiguity or a miss; the selection only changes on `Found`.
    pub fn open_title(&mut self, corpus: &Corpus, query: &str) -> TitleMatch {
        let found = corpus.find_title(query);
        if let TitleMatch::Found(idx) = found {
            self.current = idx;
        }
        found
    }
}
