//! Element discovery over an unstable host page.
//!
//! Leaf-first: [`label`] names a toggle, [`section`] finds the container,
//! [`collector`] pairs toggles with labels and state, [`scroll`] materializes
//! rows of the virtualized list. Every lookup re-queries the page; nothing
//! found here is cached across calls.

pub mod collector;
pub mod label;
pub mod scroll;
pub mod section;

pub use collector::CheckboxCollector;
pub use label::{LabelResolver, LabelSource};
pub use scroll::ScrollSearcher;
pub use section::{LocateStrategy, Section, SectionLocator};

use crate::config::DiscoveryConfig;
use crate::dom::Page;
use crate::utils::clock::Clock;

/// Shared page, clock and configuration for building discovery components.
pub struct Discovery<'a, P: Page, C: Clock> {
    pub page: &'a P,
    pub clock: &'a C,
    pub config: &'a DiscoveryConfig,
}

impl<'a, P: Page, C: Clock> Discovery<'a, P, C> {
    pub fn new(page: &'a P, clock: &'a C, config: &'a DiscoveryConfig) -> Self {
        Self {
            page,
            clock,
            config,
        }
    }

    pub fn labels(&self) -> LabelResolver<'a, P> {
        LabelResolver::new(self.page, self.config)
    }

    pub fn locator(&self) -> SectionLocator<'a, P, C> {
        SectionLocator::new(self.page, self.clock, self.config)
    }

    pub fn collector(&self) -> CheckboxCollector<'a, P, C> {
        CheckboxCollector::new(self.page, self.clock, self.config)
    }

    pub fn scroller(&self) -> ScrollSearcher<'a, P, C> {
        ScrollSearcher::new(self.page, self.clock, self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{ElementSpec, MemoryPage};
    use crate::utils::clock::ManualClock;

    #[test]
    fn test_components_share_page_state() {
        let page = MemoryPage::new("https://calendar.google.com/calendar/r", "Google Calendar");
        let clock = ManualClock::new();
        let config = DiscoveryConfig::default();
        let section = page.append(page.body(), ElementSpec::new("div").attr("aria-label", "My calendars"));
        let toggle = page.append_toggle(section, "Team", false);
        let discovery = Discovery::new(&page, &clock, &config);

        assert_eq!(discovery.labels().resolve(&toggle).as_deref(), Some("Team"));
        page.set_attribute(toggle, "aria-label", "Team (shared)");
        assert_eq!(discovery.labels().resolve(&toggle).as_deref(), Some("Team (shared)"));

        assert_eq!(discovery.locator().locate_once().map(|s| s.container), Some(section));
        page.remove(section);
        assert!(discovery.locator().locate_once().is_none());
        assert!(discovery.collector().collect_now().is_empty());
    }
}
