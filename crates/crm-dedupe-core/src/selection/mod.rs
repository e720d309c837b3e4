mod tracker;

pub use tracker::{PageStatus, SelectionStats, SelectionTracker};

use crate::Error;

/// Enumerates every item identifier in the full remote collection, not just
/// the loaded page. Paging, timeouts and retries are the implementor's
/// business.
pub trait IdSource {
    fn fetch_all_ids(&self) -> Result<Vec<String>, Error>;
}

impl<F> IdSource for F
where
    F: Fn() -> Result<Vec<String>, Error>,
{
    fn fetch_all_ids(&self) -> Result<Vec<String>, Error> {
        self()
    }
}
