/*!

A bounded poller for awaiting eventually consistent state.

A wait fetches fresh state, tests it with a predicate and sleeps a fixed interval between
unsuccessful attempts. The deadline is fixed when the wait begins and is checked before every
fetch, so the predicate never sees state fetched after the deadline has passed.

There are three ways out of a wait:
- the predicate holds and the fetched state is returned,
- the deadline passes and [`PollError::Timeout`] is returned,
- the fetch itself fails and its error is returned, untouched, as [`PollError::Fetch`].

A failing fetch is never retried and never reported as a timeout. "The condition never became
true" and "the system under test could not be reached" remain distinguishable.

!*/

use crate::constants::DEFAULT_POLL_INTERVAL;
use log::{debug, trace};
use snafu::Snafu;
use std::cmp::min;
use std::future::Future;
use std::time::Duration;
use tokio::time::{sleep_until, Instant};
use tokio_util::sync::CancellationToken;

/// The error returned when a wait does not end with the predicate holding.
#[derive(Debug, Snafu)]
pub enum PollError<E>
where
    E: std::error::Error + 'static,
{
    /// The deadline passed before the predicate held.
    #[snafu(display("Timed out waiting for {}", description))]
    Timeout {
        description: String,
        elapsed: Duration,
    },

    /// The cancellation token given to the [`Poller`] was triggered.
    #[snafu(display("Cancelled while waiting for {}", description))]
    Cancelled { description: String },

    /// The fetch operation failed. `source` is the error exactly as the fetch returned it.
    #[snafu(display("{}", source))]
    Fetch { source: E },
}

impl<E> PollError<E>
where
    E: std::error::Error + 'static,
{
    pub fn is_timeout(&self) -> bool {
        matches!(self, PollError::Timeout { .. })
    }

    /// Returns the fetch error if this wait ended because the fetch failed.
    pub fn fetch_error(&self) -> Option<&E> {
        match self {
            PollError::Fetch { source } => Some(source),
            _ => None,
        }
    }

    pub fn into_fetch_error(self) -> Option<E> {
        match self {
            PollError::Fetch { source } => Some(source),
            _ => None,
        }
    }
}

/// Configuration for a bounded wait.
///
/// # Example
///
/// ```
///# use meshtest_model::Poller;
///# use std::time::Duration;
///# async fn no_run() {
/// let ready = Poller::new("the rollout", Duration::from_secs(30))
///     .interval(Duration::from_secs(2))
///     .wait(
///         || async { Ok::<_, std::io::Error>(3usize) },
///         |replicas| *replicas >= 3,
///     )
///     .await
///     .unwrap();
///# }
/// ```
#[derive(Debug, Clone)]
pub struct Poller {
    description: String,
    timeout: Duration,
    interval: Duration,
    cancel: Option<CancellationToken>,
}

impl Poller {
    /// Creates a `Poller` that gives up after `timeout`. The poll interval defaults to one second.
    /// `description` completes the timeout message, "Timed out waiting for <description>".
    pub fn new<S>(description: S, timeout: Duration) -> Self
    where
        S: Into<String>,
    {
        Self {
            description: description.into(),
            timeout,
            interval: DEFAULT_POLL_INTERVAL,
            cancel: None,
        }
    }

    /// The delay between unsuccessful attempts.
    pub fn interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Stop waiting with [`PollError::Cancelled`] once `token` is cancelled.
    pub fn cancel_on(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Calls `fetch` until `predicate` holds for the fetched state, then returns that state.
    pub async fn wait<T, E, F, Fut, P>(&self, mut fetch: F, predicate: P) -> Result<T, PollError<E>>
    where
        E: std::error::Error + 'static,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        P: Fn(&T) -> bool,
    {
        let start = Instant::now();
        let deadline = start
            .checked_add(self.timeout)
            .unwrap_or_else(far_future);
        let mut attempt: u32 = 0;

        loop {
            if self.is_cancelled() {
                debug!(
                    "Cancelled waiting for {} after {} attempt(s)",
                    self.description, attempt
                );
                return Err(PollError::Cancelled {
                    description: self.description.clone(),
                });
            }

            let now = Instant::now();
            if now >= deadline {
                let elapsed = now.duration_since(start);
                debug!(
                    "Timed out waiting for {} after {} attempt(s) in {:?}",
                    self.description, attempt, elapsed
                );
                return Err(PollError::Timeout {
                    description: self.description.clone(),
                    elapsed,
                });
            }

            attempt += 1;
            trace!("Attempt {} waiting for {}", attempt, self.description);
            let state = fetch()
                .await
                .map_err(|source| PollError::Fetch { source })?;
            if predicate(&state) {
                debug!(
                    "Done waiting for {} after {} attempt(s) in {:?}",
                    self.description,
                    attempt,
                    start.elapsed()
                );
                return Ok(state);
            }

            // Never sleep past the deadline.
            let wake = Instant::now()
                .checked_add(self.interval)
                .map(|next| min(next, deadline))
                .unwrap_or(deadline);
            match &self.cancel {
                Some(token) => {
                    tokio::select! {
                        _ = sleep_until(wake) => {}
                        _ = token.cancelled() => {}
                    }
                }
                None => sleep_until(wake).await,
            }
        }
    }

    fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .map(|token| token.is_cancelled())
            .unwrap_or_default()
    }
}

/// Waits until `predicate` holds for the state returned by `fetch`, polling every `interval`
/// until `timeout` has elapsed. See [`Poller::wait`].
pub async fn await_condition<T, E, F, Fut, P>(
    timeout: Duration,
    interval: Duration,
    description: &str,
    fetch: F,
    predicate: P,
) -> Result<T, PollError<E>>
where
    E: std::error::Error + 'static,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    P: Fn(&T) -> bool,
{
    Poller::new(description, timeout)
        .interval(interval)
        .wait(fetch, predicate)
        .await
}

/// Roughly 30 years from now, used when `timeout` cannot be added to the current instant.
fn far_future() -> Instant {
    Instant::now() + Duration::from_secs(86400 * 365 * 30)
}

// =^..^=   =^..^=   =^..^=   =^..^=   =^..^=   =^..^=   =^..^=   =^..^=   =^..^=   =^..^=   =^..^=
