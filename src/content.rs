//! Content-side entry points: page initialization and the two inbound
//! messages.

use crate::config::DiscoveryConfig;
use crate::discovery::Discovery;
use crate::dom::Page;
use crate::load_gate::LoadGate;
use crate::messages::{Request, Response};
use crate::models::{Group, Settings};
use crate::reconcile::{ApplySummary, GroupReconciler};
use crate::utils::clock::Clock;
use crate::utils::logging::log_error_with_context;
use log::{info, warn};

pub struct ContentScript<P: Page, C: Clock> {
    page: P,
    clock: C,
    config: DiscoveryConfig,
}

impl<P: Page, C: Clock> ContentScript<P, C> {
    pub fn new(page: P, clock: C, config: DiscoveryConfig) -> Self {
        Self {
            page,
            clock,
            config,
        }
    }

    pub fn page(&self) -> &P {
        &self.page
    }

    pub fn discovery(&self) -> Discovery<'_, P, C> {
        Discovery::new(&self.page, &self.clock, &self.config)
    }

    /// Waits for the calendar list. A timeout is logged and reported as
    /// `false`; it never stops the script from handling messages.
    pub async fn initialize(&self) -> bool {
        match LoadGate::new(self.discovery()).await_ready().await {
            Ok(count) => {
                info!("Content script ready with {} calendars", count);
                true
            }
            Err(e) => {
                log_error_with_context(&e, "Initialize");
                false
            }
        }
    }

    pub async fn handle(&self, request: Request) -> Response {
        match request {
            Request::ApplyGroup { group, settings } => self.apply_group(&group, &settings).await,
            Request::GetCurrentlySelected => Response::Selected {
                calendars: self.get_currently_selected().await,
            },
        }
    }

    pub async fn apply_group(&self, group: &Group, settings: &Settings) -> Response {
        if let Err(e) = group.validate() {
            warn!("Rejected group '{}': {}", group.name, e);
            return Response::failed(e.to_safe_string());
        }
        let summary = self.reconcile(group, settings).await;
        if summary.aborted {
            Response::failed("No calendars found on the page")
        } else {
            Response::ok()
        }
    }

    pub async fn reconcile(&self, group: &Group, settings: &Settings) -> ApplySummary {
        GroupReconciler::new(self.discovery())
            .apply(group, settings.disable_others)
            .await
    }

    /// Checked calendars among the rendered toggles; does not scroll.
    pub async fn get_currently_selected(&self) -> Vec<String> {
        self.discovery()
            .collector()
            .collect()
            .await
            .into_iter()
            .filter(|toggle| toggle.checked)
            .map(|toggle| toggle.label)
            .collect()
    }
}
