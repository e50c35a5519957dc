mod averages;
mod batch;
mod error;
mod merge;
mod service;

pub use averages::{apply_averages, attach_averages, fetch_averages};
pub use batch::fetch_items;
pub use error::{AggregationError, Envelope, ErrorDetail, ErrorOrigin};
pub use merge::{attach_ratings, merge_ratings, AttachMode};
pub use service::{CatalogRatingsService, UserContext};
