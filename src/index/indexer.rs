use crate::index::{Article, InvertedIndex, TokenSet};
use parking_lot::Mutex;
use std::collections::HashMap;

/// The article currently standing for a title, and the tokens indexed for it
#[derive(Debug, Clone, PartialEq, Eq)]
struct TitleEntry {
    article: Article,
    tokens: TokenSet,
}

/// Shared inverted index plus the title registry used for story dedup
///
/// `update_index` may be called from any number of threads at once.
///
/// # Locking
///
/// Two locks are involved: the title registry lock and the index lock. The
/// registry lock is always taken first and the index lock is never held while
/// waiting for the registry lock, so the two can never deadlock.
///
/// On the insert path the index lock is taken before the registry lock is
/// released and the registry lock is dropped straight away. The index work
/// then runs outside the registry critical section, but no later update of
/// the same title can reach the index ahead of it, which keeps the registry
/// and the index in step.
#[derive(Debug, Default)]
pub struct ArticleIndexer {
    titles: Mutex<HashMap<String, TitleEntry>>,
    index: Mutex<InvertedIndex>,
}

impl ArticleIndexer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one fetched article to the index, merging duplicate stories
    ///
    /// - A title seen for the first time, or seen before from a different
    ///   server, becomes the registry entry for that title and all its tokens
    ///   are indexed under it.
    /// - A title already registered from the same server is a duplicate
    ///   story: only the tokens both bodies share are kept, and they are
    ///   attributed to whichever article has the smaller URL. The previous
    ///   representative's index entries are removed first.
    ///
    /// Empty token sets are ignored.
    pub fn update_index(&self, article: Article, tokens: TokenSet) {
        if tokens.is_empty() {
            tracing::trace!("Skipping {} with no tokens", article.url);
            return;
        }

        let mut titles = self.titles.lock();

        if let Some(entry) = titles.get_mut(&article.title) {
            if entry.article.same_story(&article) {
                let merged = entry.tokens.intersection(&tokens);
                let winner = if entry.article.url < article.url {
                    entry.article.clone()
                } else {
                    article
                };

                tracing::debug!(
                    "Merging duplicate story \"{}\": {} tokens kept, representative {}",
                    winner.title,
                    merged.len(),
                    winner.url
                );

                let mut index = self.index.lock();
                index.remove(&entry.article, &entry.tokens);
                index.add(&winner, &merged);
                *entry = TitleEntry {
                    article: winner,
                    tokens: merged,
                };
                return;
            }
        }

        titles.insert(
            article.title.clone(),
            TitleEntry {
                article: article.clone(),
                tokens: tokens.clone(),
            },
        );
        let mut index = self.index.lock();
        drop(titles);
        index.add(&article, &tokens);
    }

    /// Returns the `(article, occurrences)` pairs indexed under `term`
    ///
    /// The term is trimmed and lowercased. No ordering is imposed beyond
    /// article order; sorting by count is up to the caller.
    pub fn get_matching_articles(&self, term: &str) -> Vec<(Article, u32)> {
        let term = term.trim().to_lowercase();
        self.index.lock().matching_articles(&term)
    }

    /// Returns the registry entry for `title`, if any
    #[cfg(test)]
    fn title_entry(&self, title: &str) -> Option<TitleEntry> {
        self.titles.lock().get(title).cloned()
    }

    /// Number of distinct titles in the registry
    pub fn title_count(&self) -> usize {
        self.titles.lock().len()
    }

    /// Number of distinct tokens in the index
    pub fn token_count(&self) -> usize {
        self.index.lock().token_count()
    }

    /// Number of (token, article) entries in the index
    pub fn entry_count(&self) -> usize {
        self.index.lock().entry_count()
    }
}
