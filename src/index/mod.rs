//! Article index module
//!
//! This module contains the data the crawl builds up:
//! - [`Article`]: a (title, url) pair discovered in a feed
//! - [`TokenSet`]: the sorted distinct tokens of one article, with counts
//! - [`InvertedIndex`]: token → articles
//! - [`ArticleIndexer`]: the thread-safe, dedup-aware owner of the index
//! - [`SeenUrls`]: the claim set that keeps an article from being fetched twice

mod article;
mod indexer;
mod inverted;
mod seen;
mod tokens;

pub use article::Article;
pub use indexer::ArticleIndexer;
pub use inverted::InvertedIndex;
pub use seen::SeenUrls;
pub use tokens::TokenSet;
