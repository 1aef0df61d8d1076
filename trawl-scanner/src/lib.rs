pub mod crawler;
pub mod error;
pub mod filters;
pub mod navigation;
pub mod queue;
pub mod result;
pub mod utils;

pub use crawler::{CrossDomainCallback, Crawler, ProgressCallback, ResultCallback};
pub use error::ScanError;
pub use filters::{CycleDetector, Filter, FilterOptions, SimpleFilter};
pub use navigation::{Headers, Request, Response};
pub use queue::{Frontier, Strategy};
pub use result::CrawlResult;
