use std::sync::Arc;
use std::time::Duration;

use crate::models::handles::TimerId;

/// Callback a timer invokes on every period.
pub type TickCallback = Arc<dyn Fn(TimerId) + Send + Sync + 'static>;

/// Periodic timer provider (e.g. `setInterval`).
pub trait ClockTimer: Send {
    /// Start invoking `on_tick` every `interval` until cancelled.
    fn start(&mut self, interval: Duration, on_tick: TickCallback) -> TimerId;

    /// Stop the timer. Ticks already delivered may still be queued; the
    /// session discards them by id.
    fn cancel(&mut self, id: TimerId);
}
