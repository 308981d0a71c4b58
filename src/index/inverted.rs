use crate::index::{Article, TokenSet};
use std::collections::{BTreeMap, HashMap};

/// Token → articles containing it, with per-article occurrence counts
///
/// Not synchronized on its own; [`ArticleIndexer`](crate::index::ArticleIndexer)
/// owns it behind a lock.
#[derive(Debug, Default)]
pub struct InvertedIndex {
    postings: HashMap<String, BTreeMap<Article, u32>>,
}

impl InvertedIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Indexes every token of `tokens` under `article`
    ///
    /// Adding the same article twice accumulates its counts.
    pub fn add(&mut self, article: &Article, tokens: &TokenSet) {
        for (token, count) in tokens.iter() {
            *self
                .postings
                .entry(token.to_string())
                .or_default()
                .entry(article.clone())
                .or_insert(0) += count;
        }
    }

    /// Removes `article` from the posting list of every token in `tokens`
    ///
    /// Tokens left without any article are dropped from the index.
    pub fn remove(&mut self, article: &Article, tokens: &TokenSet) {
        for token in tokens.tokens() {
            if let Some(articles) = self.postings.get_mut(token) {
                articles.remove(article);
                if articles.is_empty() {
                    self.postings.remove(token);
                }
            }
        }
    }

    /// Returns the `(article, count)` pairs indexed under `token`, in article order
    pub fn matching_articles(&self, token: &str) -> Vec<(Article, u32)> {
        self.postings
            .get(token)
            .map(|articles| {
                articles
                    .iter()
                    .map(|(article, count)| (article.clone(), *count))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Number of distinct tokens in the index
    pub fn token_count(&self) -> usize {
        self.postings.len()
    }

    /// Total number of (token, article) entries
    pub fn entry_count(&self) -> usize {
        self.postings.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.postings.is_empty()
    }
}
