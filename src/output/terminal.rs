// Colored terminal output for articles, recommendations and title lists.
//
// main.rs and the browse session delegate all formatting here.

use colored::Colorize;

use crate::corpus::{Corpus, Document};

const PREVIEW_CHARS: usize = 100;

/// Display the current article followed by its recommendations.
pub fn display_article(corpus: &Corpus, index: usize, recommendations: &[(usize, f64)]) {
    let Some(doc) = corpus.get(index) else {
        return;
    };

    println!(
        "\n{}",
        format!("=== [{}] {} ===", index, doc.title).bold()
    );
    println!();

    match doc.body.as_deref() {
        Some(body) if !body.trim().is_empty() => println!("{body}"),
        Some(_) => println!("{}", "(this article is empty)".dimmed()),
        None => println!("{}", "(no article text)".dimmed()),
    }

    display_recommendations(corpus, recommendations);
}

/// Display a numbered list of recommendations with scores and previews.
pub fn display_recommendations(corpus: &Corpus, recommendations: &[(usize, f64)]) {
    println!("\n{}", "--- Recommended for you ---".bold());

    if recommendations.is_empty() {
        println!("  {}", "No other articles to compare against.".dimmed());
        return;
    }

    for (n, &(idx, score)) in recommendations.iter().enumerate() {
        let Some(doc) = corpus.get(idx) else {
            continue;
        };
        println!(
            "  {:>2}. {} {}",
            n + 1,
            doc.title.bold(),
            colorize_score(score)
        );
        let preview = super::body_preview(doc.body_text(), PREVIEW_CHARS);
        if !preview.is_empty() {
            println!("      {}", preview.dimmed());
        }
    }
}

/// Display a ranking as a plain table (used by `readnext similar`).
pub fn display_ranking(corpus: &Corpus, index: usize, ranking: &[(usize, f64)]) {
    let title = corpus.get(index).map(|d| d.title.as_str()).unwrap_or("?");
    println!(
        "\n{}",
        format!("=== Most similar to \"{title}\" ===").bold()
    );
    println!();
    println!(
        "  {:>4}  {:>6}  {:>7}  {}",
        "Rank".dimmed(),
        "Index".dimmed(),
        "Score".dimmed(),
        "Title".dimmed()
    );
    println!("  {}", "-".repeat(60).dimmed());

    for (n, &(idx, score)) in ranking.iter().enumerate() {
        let title = corpus.get(idx).map(|d| d.title.as_str()).unwrap_or("?");
        println!("  {:>4}. {:>6}  {:>7.4}  {}", n + 1, idx, score, title);
    }
    if ranking.is_empty() {
        println!("  {}", "No other articles to compare against.".dimmed());
    }
}

/// Display every title with its index.
///
/// With `preview`, each title is followed by the start of its text, so the
/// whole data set can be inspected without opening every article.
pub fn display_titles(corpus: &Corpus, preview: bool) {
    println!(
        "\n{}",
        format!("=== Articles ({}) ===", corpus.len()).bold()
    );
    for (i, doc) in corpus.iter().enumerate() {
        println!("  {:>4}  {}", i.to_string().dimmed(), doc.title);
        if !preview {
            continue;
        }
        println!("        {}", list_preview(doc).dimmed());
    }
}

/// Preview text shown under a title by `list --preview`.
fn list_preview(doc: &Document) -> String {
    match doc.body.as_deref() {
        None => "(no article text)".to_string(),
        Some(body) => match super::body_preview(body, PREVIEW_CHARS) {
            p if p.is_empty() => "(empty)".to_string(),
            p => p,
        },
    }
}

/// Display the browse session commands.
pub fn display_help(k: usize) {
    println!("\n{}", "Commands:".bold());
    if k > 0 {
        println!("  1-{k}          open that recommendation");
    }
    println!("  r            random article");
    println!("  t <title>    open by title (exact, or a unique part of it)");
    println!("  l            list all articles");
    println!("  <enter>      show the current article again");
    println!("  h            this help");
    println!("  q            quit");
}

/// Colorize a similarity score by strength.
fn colorize_score(score: f64) -> colored::ColoredString {
    let text = format!("({score:.2})");
    if score >= 0.5 {
        text.bright_green()
    } else if score >= 0.2 {
        text.bright_yellow()
    } else {
        text.dimmed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_preview() {
        let long = "word ".repeat(50);
        let preview = list_preview(&Document::new("t", long.as_str()));
        assert!(preview.ends_with("..."));
        assert_eq!(preview.chars().count(), PREVIEW_CHARS + 3);

        assert_eq!(list_preview(&Document::new("t", "a\nb")), "a b");
        assert_eq!(list_preview(&Document::new("t", "")), "(empty)");
        assert_eq!(list_preview(&Document::without_body("t")), "(no article text)");
    }
}
