pub mod browser;
pub mod circle;
pub mod crawl;
pub mod delay;
pub mod dom;
pub mod error;
pub mod fetcher;
pub mod http;
pub mod logger;
pub mod source;
pub mod store;
pub mod sync;

// Exporting types for convenience
pub use browser::HtmlSession;
pub use circle::{Circle, CircleDetail};
pub use crawl::{Crawler, ListExtraction};
pub use dom::DomDriver;
pub use error::{Error, Result};
pub use fetcher::CancelToken;
pub use http::{HttpFetch, HttpResponse, ReqwestFetch};
pub use source::Source;
pub use store::CircleStore;
