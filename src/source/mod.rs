// Source module: remote sensor feeds

pub mod fetcher;
pub mod traits;

pub use fetcher::FeedFetcher;
pub use traits::ReadingSource;
