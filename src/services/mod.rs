//! Service layer

pub mod page;

pub use page::{CacheStatus, PageResolution, PageService};
