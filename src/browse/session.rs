// The interactive browse loop.
//
// Reads one command per line from stdin, updates the selection, and
// redraws through output::terminal. All reads go through one snapshot of
// the similarity index taken at session start.

use std::io::{self, BufRead, Write};

use anyhow::Result;
use colored::Colorize;
use tracing::debug;

use super::{parse_command, Command, Selection};
use crate::corpus::TitleMatch;
use crate::output::terminal;
use crate::similarity::SimilarityIndex;

/// Run the session until the user quits or stdin closes.
pub fn run(index: &SimilarityIndex, start: usize, k: usize) -> Result<()> {
    let snapshot = index.snapshot();
    let corpus = snapshot.corpus();
    let mut selection = Selection::new(start);
    let mut rng = rand::rng();
    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut redraw = true;

    terminal::display_help(k);

    loop {
        let recommendations = snapshot.top_similar(selection.current(), k)?;
        if redraw {
            terminal::display_article(corpus, selection.current(), &recommendations);
        }
        redraw = true;

        print!("\n{} ", ">".bold());
        io::stdout().flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            println!();
            break;
        }

        let command = parse_command(&line);
        debug!(?command, current = selection.current(), "Browse command");

        match command {
            Command::Open(n) => {
                if !selection.open_recommendation(&recommendations, n) {
                    println!(
                        "{}",
                        format!("No recommendation number {n}.").yellow()
                    );
                    redraw = false;
                }
            }
            Command::Random => selection.pick_random(&mut rng, corpus.len()),
            Command::Title(query) => match selection.open_title(corpus, &query) {
                TitleMatch::Found(_) => {}
                TitleMatch::Ambiguous(hits) => {
                    println!(
                        "{}",
                        format!("\"{query}\" matches {} articles:", hits.len()).yellow()
                    );
                    for idx in hits {
                        if let Some(doc) = corpus.get(idx) {
                            println!("  {}", doc.title);
                        }
                    }
                    redraw = false;
                }
                TitleMatch::NotFound => {
                    println!("{}", format!("No article titled \"{query}\".").yellow());
                    redraw = false;
                }
            },
            Command::List => {
                terminal::display_titles(corpus, false);
                redraw = false;
            }
            Command::Show => {}
            Command::Help => {
                terminal::display_help(k);
                redraw = false;
            }
            Command::Quit => break,
            Command::Unknown(text) => {
                println!("{}", format!("Unknown command: {text}").yellow());
                terminal::display_help(k);
                redraw = false;
            }
        }
    }

    Ok(())
}
