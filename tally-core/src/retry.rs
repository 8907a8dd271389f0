use std::fmt::Display;

use tracing::warn;

/// Re-invokes a fallible closure up to `max_attempts` times, returning
/// the first success or the last error once attempts are exhausted.
/// Each failed attempt is logged. At least one attempt is always made.
pub fn retry<T, E, F>(max_attempts: u32, mut f: F) -> Result<T, E>
where
    F: FnMut() -> Result<T, E>,
    E: Display,
{
    let max_attempts = max_attempts.max(1);
    let mut attempt = 0;
    loop {
        attempt += 1;
        match f() {
            Ok(val) => return Ok(val),
            Err(err) => {
                warn!("Attempt {}/{} failed: {}", attempt, max_attempts, err);
                if attempt == max_attempts {
                    return Err(err);
                }
            }
        }
    }
}
