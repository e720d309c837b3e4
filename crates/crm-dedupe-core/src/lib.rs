pub mod analysis;
pub mod audit;
pub mod config;
pub mod engine;
pub mod error;
pub mod ingest;
pub mod model;
pub mod progress;
pub mod selection;
pub mod storage;

pub use analysis::duplicates::{scan, DuplicateScanner};
pub use config::AppConfig;
pub use engine::{DedupeEngine, ScanReport};
pub use error::Error;
pub use model::{ClientRecord, DuplicateGroup, DuplicateType};
pub use progress::{ScanReporter, SilentReporter};
pub use selection::{IdSource, PageStatus, SelectionStats, SelectionTracker};
