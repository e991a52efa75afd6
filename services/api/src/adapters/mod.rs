pub mod db;
pub mod forum_search;
pub mod news_search;
pub mod summary_llm;
pub mod web_search;

pub use db::DbAdapter;
pub use forum_search::RedditSearchAdapter;
pub use news_search::NewsApiAdapter;
pub use summary_llm::OpenAiSummaryAdapter;
pub use web_search::GoogleSearchAdapter;
