pub mod error;
pub mod gdelt;
pub mod news;
pub mod reddit;
mod retry;
pub mod rss;
pub mod traits;
pub mod transcript;
pub mod youtube;

pub use error::AdapterError;
pub use gdelt::GdeltAdapter;
pub use news::NewsApiAdapter;
pub use reddit::RedditAdapter;
pub use rss::GoogleNewsRssAdapter;
pub use traits::SourceAdapter;
pub use transcript::TranscriptFetcher;
pub use youtube::{YoutubeSearchAdapter, YoutubeTrendingAdapter};
