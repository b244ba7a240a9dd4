use crate::utils::clock::Clock;
use log::debug;
use std::time::Duration;

/// When a poll loop gives up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollLimit {
    /// Fixed number of checks.
    Attempts(u32),
    /// Keep probing until this much time has elapsed.
    Budget(Duration),
}

#[derive(Debug, Clone)]
pub struct RetryConfig {
    pub limit: PollLimit,
    pub interval: Duration,
}

impl RetryConfig {
    pub fn attempts(max_attempts: u32, interval: Duration) -> Self {
        Self {
            limit: PollLimit::Attempts(max_attempts),
            interval,
        }
    }

    pub fn budget(budget: Duration, interval: Duration) -> Self {
        Self {
            limit: PollLimit::Budget(budget),
            interval,
        }
    }
}

/// Idle -> Searching -> Found | TimedOut
#[derive(Debug, Clone, PartialEq)]
pub enum PollState<T> {
    Idle,
    Searching { attempt: u32 },
    Found(T),
    TimedOut { attempts: u32 },
}

impl<T> PollState<T> {
    pub fn start(self) -> Self {
        match self {
            Self::Idle => Self::Searching { attempt: 1 },
            other => other,
        }
    }

    /// Feeds the outcome of the current attempt into the machine.
    pub fn record(self, outcome: Option<T>, exhausted: bool) -> Self {
        match self {
            Self::Searching { attempt } => match outcome {
                Some(value) => Self::Found(value),
                None if exhausted => Self::TimedOut { attempts: attempt },
                None => Self::Searching {
                    attempt: attempt + 1,
                },
            },
            other => other,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Found(_) | Self::TimedOut { .. })
    }

    pub fn found(self) -> Option<T> {
        match self {
            Self::Found(value) => Some(value),
            _ => None,
        }
    }
}

/// Runs `check` until it yields a value or `config.limit` is reached,
/// sleeping `config.interval` on `clock` between attempts.
///
/// A time budget is never overshot: the last wait is shortened so the final
/// check lands exactly on the budget.
pub async fn poll_until<C, T, F>(clock: &C, config: &RetryConfig, mut check: F) -> PollState<T>
where
    C: Clock,
    F: FnMut(u32) -> Option<T>,
{
    let started = clock.now();
    let mut state = PollState::Idle.start();

    loop {
        let attempt = match state {
            PollState::Searching { attempt } => attempt,
            terminal => return terminal,
        };

        let outcome = check(attempt);
        let elapsed = clock.now().saturating_sub(started);
        let exhausted = match config.limit {
            PollLimit::Attempts(max_attempts) => attempt >= max_attempts,
            PollLimit::Budget(budget) => elapsed >= budget,
        };
        state = state.record(outcome, exhausted);

        if let PollState::Searching { .. } = state {
            let wait = match config.limit {
                PollLimit::Attempts(_) => config.interval,
                PollLimit::Budget(budget) => config.interval.min(budget.saturating_sub(elapsed)),
            };
            debug!("Attempt {} found nothing, retrying in {:?}", attempt, wait);
            clock.sleep(wait).await;
        }
    }
}
