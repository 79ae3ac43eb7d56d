pub mod config;
pub mod sanitize;
pub mod types;

pub use config::{AppConfig, LlmProvider};
pub use sanitize::{clean_url, strip_html};
pub use types::*;
