use std::thread;
use std::time::Duration;

use log::info;

/// Blocking politeness pause between detail fetches. A courtesy toward the
/// scraped origin, not a correctness requirement.
pub fn pause(interval: Duration) {
    if interval.is_zero() {
        return;
    }
    info!("Waiting {}s before the next circle...", interval.as_secs());
    thread::sleep(interval);
}
