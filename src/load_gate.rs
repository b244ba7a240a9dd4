use crate::discovery::Discovery;
use crate::dom::Page;
use crate::error::{AppError, AppResult};
use crate::utils::clock::Clock;
use crate::utils::retry::{poll_until, PollState, RetryConfig};
use log::{info, warn};

/// Blocks page initialization until calendar toggles are discoverable.
pub struct LoadGate<'a, P: Page, C: Clock> {
    discovery: Discovery<'a, P, C>,
}

impl<'a, P: Page, C: Clock> LoadGate<'a, P, C> {
    pub fn new(discovery: Discovery<'a, P, C>) -> Self {
        Self { discovery }
    }

    /// Polls every `load_poll_interval` and returns the number of labeled
    /// toggles once there is at least one. Fails with [`AppError::Timeout`]
    /// once `load_timeout` has elapsed, never before.
    pub async fn await_ready(&self) -> AppResult<usize> {
        let config = self.discovery.config;
        let clock = self.discovery.clock;
        let collector = self.discovery.collector();
        let retry = RetryConfig::budget(config.load_timeout(), config.load_poll_interval());

        let started = clock.now();
        let state = poll_until(clock, &retry, |_| {
            let count = collector.collect_now().len();
            (count > 0).then_some(count)
        })
        .await;

        match state {
            PollState::Found(count) => {
                info!(
                    "Calendar list ready: {} toggles after {:?}",
                    count,
                    clock.now().saturating_sub(started)
                );
                Ok(count)
            }
            _ => {
                let page = self.discovery.page;
                let error = AppError::Timeout {
                    waited: clock.now().saturating_sub(started),
                    toggle_count: collector.raw_toggle_count(),
                    url: page.url(),
                    title: page.title(),
                };
                warn!("{}", error);
                Err(error)
            }
        }
    }
}
