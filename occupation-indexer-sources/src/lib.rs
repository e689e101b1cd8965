//! # Occupation Indexer Sources
//!
//! HTTP clients for the two upstream datasets:
//!
//! 1. **Tabular**: bulk wage and employment archives, one spreadsheet per
//!    granularity and year
//! 2. **Competency**: per-occupation skills, knowledge, abilities,
//!    technologies, tasks and education from a JSON web service
//!
//! Both are exposed through collaborator traits and share an explicit retry
//! helper. A third client looks up individual wage time series.

pub mod competency;
pub mod config;
pub mod errors;
pub mod interfaces;
pub mod retry;
pub mod series;
pub mod tabular;

pub use competency::{OccupationSummary, OnetClient};
pub use config::{CompetencySourceConfig, SeriesSourceConfig, TabularSourceConfig};
pub use errors::SourceError;
pub use interfaces::{CompetencySource, TabularSource};
pub use retry::{retry_with_backoff, RetryPolicy};
pub use series::{BlsSeriesClient, SeriesDataType, SeriesId};
pub use tabular::BlsBulkClient;
