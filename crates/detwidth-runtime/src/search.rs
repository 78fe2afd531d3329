//! Exact width search.
//!
//! An exponential probe brackets the answer, then a binary search narrows the
//! bracket. The result is the largest candidate whose query came back false,
//! which for a decision procedure answering "width < p" is the width itself.

use tracing::{debug, info};

use crate::errors::RuntimeError;
use crate::oracle::ThresholdOracle;

/// Result of an exact search.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SearchOutcome {
    /// The deterministic width.
    pub width: usize,
    /// Oracle calls issued.
    pub queries: usize,
}

/// Search `1..=max_candidate` for the width.
///
/// `oracle` must be monotone (false then true). Any oracle error aborts the
/// search immediately.
pub async fn exact_width<O>(oracle: &mut O, max_candidate: usize) -> Result<SearchOutcome, RuntimeError>
where
    O: ThresholdOracle + ?Sized,
{
    if max_candidate <= 1 {
        debug!(max_candidate, "single candidate, no queries needed");
        return Ok(SearchOutcome {
            width: 1,
            queries: 0,
        });
    }

    let mut queries = 0;
    let mut low = 1;
    let mut middle: usize = 2;
    let mut high;

    loop {
        queries += 1;
        if oracle.query(middle).await? {
            high = middle - 1;
            break;
        }
        low = middle;
        middle = middle.saturating_mul(2);
        if middle > max_candidate {
            high = max_candidate;
            break;
        }
    }
    debug!(low, high, queries, "exponential probe done");

    while low != high {
        middle = low + (high - low).div_ceil(2);
        queries += 1;
        if oracle.query(middle).await? {
            high = middle - 1;
        } else {
            low = middle;
        }
    }

    info!(width = low, queries, max_candidate, "exact width found");
    Ok(SearchOutcome {
        width: low,
        queries,
    })
}
