pub mod config;
pub mod error;
pub mod fetcher;
pub mod logging;
pub mod outcome;
pub mod resolver;
pub mod storage;
pub mod transfer;
pub mod url_model;

pub use error::{FetchError, MetadataError};
pub use fetcher::Fetcher;
pub use outcome::ResultDescriptor;
