use std::cmp::Ordering;
use std::collections::BTreeMap;

/// The sorted, duplicate-free tokens of one article
///
/// Each distinct token remembers how many times it occurred in the article
/// body; that number is the occurrence count the index reports for the
/// article.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenSet {
    // sorted by token, no duplicates
    entries: Vec<(String, u32)>,
}

impl TokenSet {
    /// Creates an empty token set
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a token set from raw tokens in any order, counting repeats
    ///
    /// Tokens are lowercased; empty tokens are dropped.
    ///
    /// # Example
    ///
    /// ```
    /// use news_aggregator::TokenSet;
    ///
    /// let tokens = TokenSet::from_tokens(["beta", "Alpha", "beta"]);
    /// assert_eq!(tokens.tokens().collect::<Vec<_>>(), vec!["alpha", "beta"]);
    /// assert_eq!(tokens.count("beta"), 2);
    /// ```
    pub fn from_tokens<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut counts: BTreeMap<String, u32> = BTreeMap::new();
        for token in tokens {
            let token = token.as_ref().trim();
            if token.is_empty() {
                continue;
            }
            *counts.entry(token.to_lowercase()).or_insert(0) += 1;
        }
        Self {
            entries: counts.into_iter().collect(),
        }
    }

    /// Number of distinct tokens
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over the distinct tokens in sorted order
    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(token, _)| token.as_str())
    }

    /// Iterates over `(token, occurrences)` in sorted order
    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.entries
            .iter()
            .map(|(token, count)| (token.as_str(), *count))
    }

    /// Occurrences of `token`, zero when absent
    pub fn count(&self, token: &str) -> u32 {
        self.entries
            .binary_search_by(|(t, _)| t.as_str().cmp(token))
            .map(|i| self.entries[i].1)
            .unwrap_or(0)
    }

    pub fn contains(&self, token: &str) -> bool {
        self.count(token) > 0
    }

    /// Sorted intersection of two token sets
    ///
    /// Walks both sorted sequences once. A token survives only if it appears
    /// in both sets; its count is the smaller of the two counts.
    pub fn intersection(&self, other: &TokenSet) -> TokenSet {
        let mut entries = Vec::with_capacity(self.len().min(other.len()));
        let (mut i, mut j) = (0, 0);

        while i < self.entries.len() && j < other.entries.len() {
            let (left, left_count) = &self.entries[i];
            let (right, right_count) = &other.entries[j];
            match left.cmp(right) {
                Ordering::Less => i += 1,
                Ordering::Greater => j += 1,
                Ordering::Equal => {
                    entries.push((left.clone(), (*left_count).min(*right_count)));
                    i += 1;
                    j += 1;
                }
            }
        }

        TokenSet { entries }
    }
}

impl<S: AsRef<str>> FromIterator<S> for TokenSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        TokenSet::from_tokens(iter)
    }
}
