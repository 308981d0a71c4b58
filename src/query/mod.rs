//! Interactive query console
//!
//! Reads search terms line by line and prints the best matching articles for
//! each one. An empty line or end of input ends the session.

use crate::index::{Article, ArticleIndexer};
use std::borrow::Cow;
use std::io::{self, BufRead, Write};

/// Prompt printed before every search term
pub const PROMPT: &str = "Enter a search term [or just hit <enter> to quit]: ";

/// Titles and URLs longer than this are shortened
const MAX_FIELD_WIDTH: usize = 70;

/// Sorts matches by occurrence count, highest first, then by article
pub fn rank_matches(mut matches: Vec<(Article, u32)>) -> Vec<(Article, u32)> {
    matches.sort_by(|(a, a_count), (b, b_count)| b_count.cmp(a_count).then_with(|| a.cmp(b)));
    matches
}

/// Shortens `text` to [`MAX_FIELD_WIDTH`] characters, ending in `...`
fn truncate(text: &str) -> Cow<'_, str> {
    if text.chars().count() <= MAX_FIELD_WIDTH {
        return Cow::Borrowed(text);
    }
    let kept: String = text.chars().take(MAX_FIELD_WIDTH - 3).collect();
    Cow::Owned(format!("{}...", kept))
}

fn plural(count: usize, word: &str) -> String {
    if count == 1 {
        word.to_string()
    } else {
        format!("{}s", word)
    }
}

/// Formats the answer to one search term
///
/// # Arguments
///
/// * `term` - The term as the user typed it (trimmed)
/// * `matches` - Ranked matches for the term
/// * `max_matches` - How many matches to list at most
pub fn format_matches(term: &str, matches: &[(Article, u32)], max_matches: usize) -> String {
    if matches.is_empty() {
        return format!("Ah, we didn't find the term \"{}\". Try again.\n", term);
    }

    let mut out = format!(
        "That term appears in {} {}.  ",
        matches.len(),
        plural(matches.len(), "article")
    );
    if matches.len() > max_matches {
        out.push_str(&format!("Here are the top {} of them:\n", max_matches));
    } else if matches.len() > 1 {
        out.push_str("Here they are:\n");
    } else {
        out.push_str("Here it is:\n");
    }

    for (position, (article, count)) in matches.iter().take(max_matches).enumerate() {
        out.push_str(&format!(
            "  {:>2}.) \"{}\" [appears {} {}].\n",
            position + 1,
            truncate(&article.title),
            count,
            plural(*count as usize, "time")
        ));
        out.push_str(&format!("       \"{}\"\n", truncate(&article.url)));
    }
    out
}

/// Runs the query loop until an empty line or end of input
///
/// Terms are trimmed; lookups are case-insensitive.
pub fn run_query_loop<R, W>(
    indexer: &ArticleIndexer,
    max_matches: usize,
    mut input: R,
    mut output: W,
) -> io::Result<()>
where
    R: BufRead,
    W: Write,
{
    let mut line = String::new();
    loop {
        output.write_all(PROMPT.as_bytes())?;
        output.flush()?;

        line.clear();
        if input.read_line(&mut line)? == 0 {
            break;
        }
        let term = line.trim();
        if term.is_empty() {
            break;
        }

        let matches = rank_matches(indexer.get_matching_articles(term));
        tracing::debug!("Query \"{}\" matched {} articles", term, matches.len());
        output.write_all(format_matches(term, &matches, max_matches).as_bytes())?;
    }
    writeln!(output)?;
    Ok(())
}
