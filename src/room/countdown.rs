use std::time::Duration;

use tokio::time::Instant;

/// Granularity at which the room actor polls an armed countdown, chosen small
/// so clients get smooth `timer:tick` updates.
pub const TICK_INTERVAL: Duration = Duration::from_millis(250);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CountdownKind {
    Discuss,
    Vote,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CountdownTick {
    pub kind: CountdownKind,
    pub secs_remaining: u64,
    pub expired: bool,
}

/// A room's single countdown. Each room actor owns exactly one `Countdown`,
/// which is how the at-most-one-active-timer-per-room invariant is held
/// structurally. The countdown never touches room state itself; the actor
/// feeds the ticks and the expiry back into the room as events.
#[derive(Default)]
pub struct Countdown {
    active: Option<Active>,
}

struct Active {
    kind: CountdownKind,
    ends_at: Instant,
}

impl Countdown {
    /// Arms the countdown, replacing any countdown already running.
    pub fn start(&mut self, kind: CountdownKind, duration: Duration) {
        self.stop();
        self.active = Some(Active {
            kind,
            ends_at: Instant::now() + duration,
        });
    }

    /// Idempotent, stopping a stopped countdown is a no-op.
    pub fn stop(&mut self) {
        self.active = None;
    }

    pub fn is_armed(&self) -> bool {
        self.active.is_some()
    }

    /// Observes the countdown once. Returns `None` when nothing is armed.
    /// `secs_remaining` is the ceiling of the remaining milliseconds, floored
    /// at zero. The expiry observation disarms the countdown, so `expired`
    /// can only ever be reported once per armed countdown.
    pub fn poll(&mut self) -> Option<CountdownTick> {
        let active = self.active.as_ref()?;
        let remaining_ms = active
            .ends_at
            .saturating_duration_since(Instant::now())
            .as_millis() as u64;
        let secs_remaining = remaining_ms.div_ceil(1000);
        let expired = remaining_ms == 0;
        let kind = active.kind;
        if expired {
            self.active = None;
        }
        Some(CountdownTick {
            kind,
            secs_remaining,
            expired,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::{advance, Duration};

    #[tokio::test(start_paused = true)]
    async fn poll_without_an_armed_countdown_returns_none() {
        let mut countdown = Countdown::default();

        assert_eq!(countdown.poll(), None);
        assert!(!countdown.is_armed());
    }

    #[tokio::test(start_paused = true)]
    async fn remaining_seconds_are_the_ceiling_of_remaining_millis() {
        let mut countdown = Countdown::default();
        countdown.start(CountdownKind::Discuss, Duration::from_secs(10));

        advance(Duration::from_millis(250)).await;

        let tick = countdown.poll().unwrap();
        assert_eq!(tick.secs_remaining, 10);
        assert!(!tick.expired);

        advance(Duration::from_millis(8850)).await;

        let tick = countdown.poll().unwrap();
        assert_eq!(tick.secs_remaining, 1);
        assert!(!tick.expired);
    }

    #[tokio::test(start_paused = true)]
    async fn expiry_is_observed_exactly_once() {
        let mut countdown = Countdown::default();
        countdown.start(CountdownKind::Vote, Duration::from_secs(5));

        advance(Duration::from_secs(6)).await;

        let tick = countdown.poll().unwrap();
        assert_eq!(tick.kind, CountdownKind::Vote);
        assert_eq!(tick.secs_remaining, 0);
        assert!(tick.expired);

        assert_eq!(countdown.poll(), None);
        assert!(!countdown.is_armed());
    }

    #[tokio::test(start_paused = true)]
    async fn start_replaces_a_running_countdown() {
        let mut countdown = Countdown::default();
        countdown.start(CountdownKind::Discuss, Duration::from_secs(90));

        advance(Duration::from_secs(30)).await;
        countdown.start(CountdownKind::Vote, Duration::from_secs(25));

        let tick = countdown.poll().unwrap();
        assert_eq!(tick.kind, CountdownKind::Vote);
        assert_eq!(tick.secs_remaining, 25);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_is_idempotent() {
        let mut countdown = Countdown::default();
        countdown.stop();

        countdown.start(CountdownKind::Discuss, Duration::from_secs(90));
        countdown.stop();
        countdown.stop();

        assert_eq!(countdown.poll(), None);
    }
}
