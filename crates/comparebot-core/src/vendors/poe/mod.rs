//! Bot server protocol integration.
//!
//! Every compared bot is reached through the same endpoint family
//! (`{base_url}{bot}`), so one `PoeSource` usually serves as the default
//! source of a `CompareBot`.
mod adapter;
mod config;
mod options;
pub(crate) mod transport;

pub use adapter::PoeSource;
pub use config::PoeClientConfig;
pub use options::PoeRequestOptions;
