use crate::discovery::Discovery;
use crate::dom::Page;
use crate::models::{Group, ToggleHandle};
use crate::utils::clock::Clock;
use crate::utils::logging::log_apply_summary;
use log::{debug, warn};
use serde::Serialize;
use std::collections::HashSet;

/// What one `apply` pass did. Missed labels are reported here and in the
/// log, never raised as an error.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplySummary {
    pub group: String,
    pub target: usize,
    pub rendered: usize,
    /// Group members that were found, rendered or scrolled into view.
    pub processed: usize,
    pub activated: usize,
    pub enabled: Vec<String>,
    pub disabled: Vec<String>,
    pub missed: Vec<String>,
    /// No toggles were discoverable, nothing was attempted.
    pub aborted: bool,
}

impl ApplySummary {
    fn new(group: &Group) -> Self {
        Self {
            group: group.name.clone(),
            target: group.calendars.len(),
            ..Default::default()
        }
    }

    pub fn is_complete(&self) -> bool {
        !self.aborted && self.missed.is_empty()
    }
}

/// Toggles calendars so the checked set matches a group.
///
/// Rendered toggles are handled first in document order, then the group's
/// remaining labels are searched for by scrolling, in declared order. Every
/// activation is gated on the live checked state, so repeated runs against an
/// unchanged page do nothing.
pub struct GroupReconciler<'a, P: Page, C: Clock> {
    discovery: Discovery<'a, P, C>,
}

impl<'a, P: Page, C: Clock> GroupReconciler<'a, P, C> {
    pub fn new(discovery: Discovery<'a, P, C>) -> Self {
        Self { discovery }
    }

    pub async fn apply(&self, group: &Group, disable_others: bool) -> ApplySummary {
        let mut summary = ApplySummary::new(group);

        let toggles = self.discovery.collector().collect().await;
        if toggles.is_empty() {
            warn!("No calendar toggles found, group '{}' not applied", group.name);
            summary.aborted = true;
            summary.missed = group.calendars.clone();
            log_apply_summary(&summary);
            return summary;
        }
        summary.rendered = toggles.len();

        let mut processed: HashSet<String> = HashSet::new();
        for toggle in &toggles {
            let member = group.contains(&toggle.label);
            if member {
                if self.set_checked(&toggle.element, true) {
                    summary.activated += 1;
                    summary.enabled.push(toggle.label.clone());
                }
            } else if disable_others && self.set_checked(&toggle.element, false) {
                summary.activated += 1;
                summary.disabled.push(toggle.label.clone());
            }
            processed.insert(toggle.label.clone());
        }

        let unprocessed: Vec<&String> = group
            .calendars
            .iter()
            .filter(|label| !processed.contains(label.as_str()))
            .collect();
        if !unprocessed.is_empty() {
            debug!("{} group calendars not rendered, scrolling", unprocessed.len());
        }

        let scroller = self.discovery.scroller();
        for label in unprocessed {
            // Rows passed during the sweep get the same treatment as rendered ones.
            let visit = |toggle: &ToggleHandle<P::Element>| {
                if disable_others
                    && !group.contains(&toggle.label)
                    && self.set_checked(&toggle.element, false)
                {
                    summary.activated += 1;
                    summary.disabled.push(toggle.label.clone());
                }
            };
            let found = scroller.find_by_scrolling_with(label, visit).await;
            match found {
                Some(element) => {
                    if self.set_checked(&element, true) {
                        summary.activated += 1;
                        summary.enabled.push(label.clone());
                    }
                    processed.insert(label.clone());
                }
                None => summary.missed.push(label.clone()),
            }
        }

        summary.processed = group
            .calendars
            .iter()
            .filter(|label| processed.contains(label.as_str()))
            .count();
        log_apply_summary(&summary);
        summary
    }

    /// Activates `element` only if its live state differs from `checked`.
    fn set_checked(&self, element: &P::Element, checked: bool) -> bool {
        let page = self.discovery.page;
        if page.is_checked(element) == checked {
            return false;
        }
        page.activate(element);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DiscoveryConfig;
    use crate::dom::{ElementSpec, MemoryPage, NodeId};
    use crate::utils::clock::ManualClock;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn three_calendars() -> (MemoryPage, Vec<NodeId>) {
        let page = MemoryPage::new("https://calendar.google.com/calendar/r", "Google Calendar");
        let section = page.append(page.body(), ElementSpec::new("div").attr("aria-label", "My calendars"));
        let toggles = vec![
            page.append_toggle(section, "Cal1", true),
            page.append_toggle(section, "Cal2", false),
            page.append_toggle(section, "Cal3", true),
        ];
        (page, toggles)
    }

    #[tokio::test]
    async fn test_matching_state_needs_no_activation() {
        let (page, toggles) = three_calendars();
        let clock = ManualClock::new();
        let config = DiscoveryConfig::default();
        let group = Group::new("Mine", names(&["Cal1", "Cal3"])).unwrap();

        let summary = GroupReconciler::new(Discovery::new(&page, &clock, &config))
            .apply(&group, true)
            .await;

        assert_eq!(page.activation_count(), 0);
        assert!(page.is_checked(&toggles[0]));
        assert!(!page.is_checked(&toggles[1]));
        assert!(page.is_checked(&toggles[2]));
        assert_eq!(summary.processed, 2);
        assert!(summary.is_complete());
    }

    #[tokio::test]
    async fn test_switching_group_activates_each_mismatch() {
        let (page, toggles) = three_calendars();
        let clock = ManualClock::new();
        let config = DiscoveryConfig::default();
        let group = Group::new("Other", names(&["Cal2"])).unwrap();

        let summary = GroupReconciler::new(Discovery::new(&page, &clock, &config))
            .apply(&group, true)
            .await;

        assert_eq!(page.activations(), vec![toggles[0], toggles[1], toggles[2]]);
        assert!(!page.is_checked(&toggles[0]));
        assert!(page.is_checked(&toggles[1]));
        assert!(!page.is_checked(&toggles[2]));
        assert_eq!(summary.enabled, names(&["Cal2"]));
        assert_eq!(summary.disabled, names(&["Cal1", "Cal3"]));
    }

    #[tokio::test]
    async fn test_keep_others_never_unchecks() {
        let (page, toggles) = three_calendars();
        let clock = ManualClock::new();
        let config = DiscoveryConfig::default();
        let group = Group::new("Other", names(&["Cal2"])).unwrap();

        GroupReconciler::new(Discovery::new(&page, &clock, &config))
            .apply(&group, false)
            .await;

        assert_eq!(page.activations(), vec![toggles[1]]);
        assert!(page.is_checked(&toggles[0]));
        assert!(page.is_checked(&toggles[2]));
    }

    #[tokio::test]
    async fn test_empty_page_aborts() {
        let page = MemoryPage::new("https://calendar.google.com/calendar/r", "Google Calendar");
        let clock = ManualClock::new();
        let config = DiscoveryConfig::default();
        let group = Group::new("Mine", names(&["Cal1"])).unwrap();

        let summary = GroupReconciler::new(Discovery::new(&page, &clock, &config))
            .apply(&group, true)
            .await;

        assert!(summary.aborted);
        assert_eq!(summary.missed, names(&["Cal1"]));
        assert_eq!(page.activation_count(), 0);
    }
}
