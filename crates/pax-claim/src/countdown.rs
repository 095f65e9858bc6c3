use std::time::Duration;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

/// Cooldown ticker with an explicit cancellation handle.
///
/// Publishes the remaining time once per second, strictly decreasing, then
/// publishes `None` exactly once when the target is reached and stops.
/// Dropping the handle cancels the ticker; no tick is published afterwards.
pub struct Countdown {
    remaining: watch::Receiver<Option<Duration>>,
    token: CancellationToken,
}

impl Countdown {
    /// Start ticking down from `total`, rounded up to whole seconds.
    /// Callers are expected to pass a nonzero duration; a zero `total`
    /// expires immediately.
    pub fn start(total: Duration) -> Self {
        let mut left = total.as_secs();
        if total.subsec_nanos() > 0 {
            left += 1;
        }
        let (tx, rx) = watch::channel(Some(Duration::from_secs(left)));
        let token = CancellationToken::new();
        let ticker = token.clone();
        tokio::spawn(async move {
            if left == 0 {
                let _ = tx.send(None);
                return;
            }
            let mut interval = tokio::time::interval(Duration::from_secs(1));
            // the first tick of an interval resolves immediately
            interval.tick().await;
            loop {
                tokio::select! {
                    _ = ticker.cancelled() => return,
                    _ = interval.tick() => {}
                }
                left -= 1;
                if left == 0 {
                    let _ = tx.send(None);
                    return;
                }
                if tx.send(Some(Duration::from_secs(left))).is_err() {
                    return;
                }
            }
        });
        Self {
            remaining: rx,
            token,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<Duration>> {
        self.remaining.clone()
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }
}

impl Drop for Countdown {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

/// `H:MM:SS` display of the remaining time.
pub fn format_countdown(remaining: Duration) -> String {
    let secs = remaining.as_secs();
    format!("{}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn counts_down_and_expires_once() {
        let countdown = Countdown::start(Duration::from_secs(3));
        let mut rx = countdown.subscribe();
        assert_eq!(*rx.borrow(), Some(Duration::from_secs(3)));

        let mut seen = Vec::new();
        while rx.changed().await.is_ok() {
            seen.push(*rx.borrow());
        }
        assert_eq!(
            seen,
            vec![
                Some(Duration::from_secs(2)),
                Some(Duration::from_secs(1)),
                None,
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_the_handle_stops_the_ticker() {
        let countdown = Countdown::start(Duration::from_secs(3600));
        let mut rx = countdown.subscribe();
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow(), Some(Duration::from_secs(3599)));

        drop(countdown);
        // the ticker shuts down without publishing anything further
        assert!(rx.changed().await.is_err());
        assert_eq!(*rx.borrow(), Some(Duration::from_secs(3599)));
    }

    #[tokio::test(start_paused = true)]
    async fn zero_duration_expires_immediately() {
        let countdown = Countdown::start(Duration::ZERO);
        let mut rx = countdown.subscribe();
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow(), None);
    }

    #[test]
    fn display_format() {
        assert_eq!(format_countdown(Duration::from_secs(0)), "0:00:00");
        assert_eq!(format_countdown(Duration::from_secs(61)), "0:01:01");
        assert_eq!(format_countdown(Duration::from_secs(3 * 3600 + 59)), "3:00:59");
        assert_eq!(format_countdown(Duration::from_secs(25 * 3600)), "25:00:00");
    }
}
