//! Exponential-backoff retry helper.
//!
//! Up to three attempts with the delay doubling from two seconds.
//! Currently no flow opts in; relay calls stay single-shot so their
//! failure behavior is unchanged.

use std::thread;
use std::time::Duration;

use tracing::warn;

const MAX_ATTEMPTS: u32 = 3;
const INITIAL_DELAY: Duration = Duration::from_secs(2);

/// Run `operation` up to three times, sleeping 2 s then 4 s between
/// attempts. Returns the first success or the last error.
pub fn with_backoff<T, E, F>(label: &str, mut operation: F) -> Result<T, E>
where
    E: std::fmt::Display,
    F: FnMut() -> Result<T, E>,
{
    let mut delay = INITIAL_DELAY;
    let mut attempt = 1;
    loop {
        match operation() {
            Ok(value) => return Ok(value),
            Err(e) if attempt < MAX_ATTEMPTS => {
                warn!(label, attempt, "Attempt failed, retrying in {delay:?}: {e}");
                thread::sleep(delay);
                delay *= 2;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}
