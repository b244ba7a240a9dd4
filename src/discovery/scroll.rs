use crate::config::DiscoveryConfig;
use crate::discovery::collector::CheckboxCollector;
use crate::dom::Page;
use crate::models::ToggleHandle;
use crate::utils::clock::Clock;
use log::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Sweep {
    Down,
    Up,
}

/// Finds toggles that the virtualized host list has not rendered yet by
/// scrolling its container stepwise, first down then back up, re-querying
/// after each settle delay.
///
/// Worst case is `2 * scroll_max_steps` waits per missing label.
pub struct ScrollSearcher<'a, P: Page, C: Clock> {
    page: &'a P,
    clock: &'a C,
    config: &'a DiscoveryConfig,
    collector: CheckboxCollector<'a, P, C>,
}

impl<'a, P: Page, C: Clock> ScrollSearcher<'a, P, C> {
    pub fn new(page: &'a P, clock: &'a C, config: &'a DiscoveryConfig) -> Self {
        Self {
            page,
            clock,
            config,
            collector: CheckboxCollector::new(page, clock, config),
        }
    }

    pub async fn find_by_scrolling(&self, label: &str) -> Option<P::Element> {
        self.find_by_scrolling_with(label, |_| {}).await
    }

    /// Like [`Self::find_by_scrolling`], handing every toggle rendered after
    /// each step to `visit` before the target is looked up.
    pub async fn find_by_scrolling_with<F>(&self, label: &str, mut visit: F) -> Option<P::Element>
    where
        F: FnMut(&ToggleHandle<P::Element>),
    {
        let Some(container) = self.scroll_container() else {
            debug!("No scroll container for '{}'", label);
            return None;
        };

        for sweep in [Sweep::Down, Sweep::Up] {
            if let Some(found) = self.sweep(&container, label, sweep, &mut visit).await {
                return Some(found);
            }
        }

        debug!("'{}' not found after scrolling both ways", label);
        None
    }

    async fn sweep<F>(
        &self,
        container: &P::Element,
        label: &str,
        sweep: Sweep,
        visit: &mut F,
    ) -> Option<P::Element>
    where
        F: FnMut(&ToggleHandle<P::Element>),
    {
        for step in 1..=self.config.scroll_max_steps {
            let top = self.page.scroll_top(container);
            let max = self.max_scroll(container);
            let next = match sweep {
                Sweep::Down if top >= max => break,
                Sweep::Up if top <= 0.0 => break,
                Sweep::Down => (top + self.config.scroll_step).min(max),
                Sweep::Up => (top - self.config.scroll_step).max(0.0),
            };

            self.page.set_scroll_top(container, next);
            self.clock.sleep(self.config.scroll_settle_delay()).await;

            let rendered = self.collector.collect_now();
            rendered.iter().for_each(|toggle| visit(toggle));
            if let Some(found) = rendered.into_iter().find(|toggle| toggle.label == label) {
                debug!("Found '{}' after {} steps scrolling {:?}", label, step, sweep);
                return Some(found.element);
            }
        }
        None
    }

    /// Direct lookup among the currently rendered toggles.
    pub fn lookup(&self, label: &str) -> Option<P::Element> {
        self.collector
            .collect_now()
            .into_iter()
            .find(|toggle| toggle.label == label)
            .map(|toggle| toggle.element)
    }

    /// The parent of a visible section heading, or the nearest scrollable
    /// ancestor from there.
    pub fn scroll_container(&self) -> Option<P::Element> {
        let heading = self
            .page
            .query_document(&self.config.heading)
            .into_iter()
            .filter(|heading| self.page.is_visible(heading))
            .find(|heading| {
                let text = self.page.text_content(heading);
                let text = text.trim();
                self.config.section_titles.iter().any(|title| title == text)
            })?;
        let parent = self.page.parent(&heading)?;

        let mut current = Some(parent.clone());
        while let Some(candidate) = current {
            if self.max_scroll(&candidate) > 0.0 {
                return Some(candidate);
            }
            current = self.page.parent(&candidate);
        }
        Some(parent)
    }

    fn max_scroll(&self, container: &P::Element) -> f64 {
        (self.page.scroll_height(container) - self.page.client_height(container)).max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{ElementSpec, MemoryPage, VirtualListSpec};
    use crate::utils::clock::ManualClock;

    fn sidebar(rows: usize) -> (MemoryPage, crate::dom::NodeId) {
        let page = MemoryPage::new("https://calendar.google.com/calendar/r", "Google Calendar");
        let container = page.append(page.body(), ElementSpec::new("div"));
        page.append(container, ElementSpec::new("h2").text("My calendars"));
        let mut spec = VirtualListSpec::new(40.0, 400.0).list_attr("aria-label", "My calendars");
        for i in 0..rows {
            spec = spec.row(&format!("Cal{}", i), false);
        }
        page.append_virtual_list(container, spec);
        (page, container)
    }

    #[tokio::test]
    async fn test_finds_row_below_viewport() {
        let (page, container) = sidebar(50);
        let clock = ManualClock::new();
        let config = DiscoveryConfig::default();
        let searcher = ScrollSearcher::new(&page, &clock, &config);

        assert!(searcher.lookup("Cal15").is_none());
        let found = searcher.find_by_scrolling("Cal15").await.unwrap();

        // Row 15 spans 600..640; the viewport reaches it at offset 400.
        assert_eq!(page.scroll_top(&container), 400.0);
        assert_eq!(clock.sleep_count(), 2);
        assert!(!page.is_checked(&found));
    }

    #[tokio::test]
    async fn test_visit_sees_rows_passed_on_the_way() {
        let (page, _) = sidebar(30);
        let clock = ManualClock::new();
        let config = DiscoveryConfig::default();
        let searcher = ScrollSearcher::new(&page, &clock, &config);

        let mut seen = Vec::new();
        let found = searcher
            .find_by_scrolling_with("Cal28", |toggle| seen.push(toggle.label.clone()))
            .await;

        assert!(found.is_some());
        assert!(seen.contains(&"Cal12".to_string()));
        assert!(seen.contains(&"Cal25".to_string()));
        assert!(!seen.contains(&"Cal0".to_string()));
    }

    #[tokio::test]
    async fn test_finds_row_above_after_down_sweep() {
        let (page, container) = sidebar(50);
        let clock = ManualClock::new();
        let config = DiscoveryConfig::default();
        page.set_scroll_top(&container, 1600.0);

        let searcher = ScrollSearcher::new(&page, &clock, &config);
        assert!(searcher.find_by_scrolling("Cal2").await.is_some());
        assert_eq!(page.scroll_top(&container), 0.0);
    }

    #[tokio::test]
    async fn test_missing_label_terminates_within_bounds() {
        let (page, container) = sidebar(200);
        let clock = ManualClock::new();
        let config = DiscoveryConfig::default();
        let searcher = ScrollSearcher::new(&page, &clock, &config);

        assert!(searcher.find_by_scrolling("Nope").await.is_none());
        assert_eq!(clock.sleep_count(), 20);
        assert_eq!(page.scroll_top(&container), 0.0);
    }

    #[tokio::test]
    async fn test_short_list_stops_at_bounds() {
        let (page, _) = sidebar(15);
        let clock = ManualClock::new();
        let config = DiscoveryConfig::default();
        let searcher = ScrollSearcher::new(&page, &clock, &config);

        // Max offset is 200: one step down, one step back up.
        assert!(searcher.find_by_scrolling("Nope").await.is_none());
        assert_eq!(clock.sleep_count(), 2);
    }

    #[tokio::test]
    async fn test_no_heading_fails_immediately() {
        let page = MemoryPage::new("https://calendar.google.com/calendar/r", "Google Calendar");
        let section = page.append(page.body(), ElementSpec::new("div").attr("aria-label", "My calendars"));
        page.append_toggle(section, "Cal1", false);
        let clock = ManualClock::new();
        let config = DiscoveryConfig::default();

        let searcher = ScrollSearcher::new(&page, &clock, &config);
        assert!(searcher.find_by_scrolling("Cal9").await.is_none());
        assert_eq!(clock.sleep_count(), 0);
    }

    #[test]
    fn test_hidden_heading_is_ignored() {
        let page = MemoryPage::new("https://calendar.google.com/calendar/r", "Google Calendar");
        let panel = page.append(page.body(), ElementSpec::new("div").hidden());
        page.append(panel, ElementSpec::new("h2").text("My calendars"));
        let clock = ManualClock::new();
        let config = DiscoveryConfig::default();

        assert!(ScrollSearcher::new(&page, &clock, &config).scroll_container().is_none());
    }

    #[test]
    fn test_container_climbs_to_scrollable_ancestor() {
        let page = MemoryPage::new("https://calendar.google.com/calendar/r", "Google Calendar");
        let pane = page.append(page.body(), ElementSpec::new("div").viewport(300.0, 900.0));
        let header = page.append(pane, ElementSpec::new("div"));
        page.append(header, ElementSpec::new("div").attr("role", "heading").text(" My calendars "));
        let clock = ManualClock::new();
        let config = DiscoveryConfig::default();

        assert_eq!(
            ScrollSearcher::new(&page, &clock, &config).scroll_container(),
            Some(pane)
        );
    }
}
