use crate::config::DiscoveryConfig;
use crate::discovery::label::LabelResolver;
use crate::discovery::section::SectionLocator;
use crate::dom::Page;
use crate::models::ToggleHandle;
use crate::utils::clock::Clock;
use crate::utils::logging::log_discovery;

/// Enumerates the toggles of the calendar section with their labels and
/// current state. A missing section or label is an expected condition: the
/// result is simply empty or shorter.
pub struct CheckboxCollector<'a, P: Page, C: Clock> {
    page: &'a P,
    config: &'a DiscoveryConfig,
    locator: SectionLocator<'a, P, C>,
    labels: LabelResolver<'a, P>,
}

impl<'a, P: Page, C: Clock> CheckboxCollector<'a, P, C> {
    pub fn new(page: &'a P, clock: &'a C, config: &'a DiscoveryConfig) -> Self {
        Self {
            page,
            config,
            locator: SectionLocator::new(page, clock, config),
            labels: LabelResolver::new(page, config),
        }
    }

    /// Locates the section (with retries) and collects its toggles.
    pub async fn collect(&self) -> Vec<ToggleHandle<P::Element>> {
        match self.locator.locate().await {
            Some(section) => self.collect_in(&section.container),
            None => Vec::new(),
        }
    }

    /// Single locate round, no waiting.
    pub fn collect_now(&self) -> Vec<ToggleHandle<P::Element>> {
        match self.locator.locate_once() {
            Some(section) => self.collect_in(&section.container),
            None => Vec::new(),
        }
    }

    pub fn collect_in(&self, container: &P::Element) -> Vec<ToggleHandle<P::Element>> {
        let toggles = self.page.query_all(container, &self.config.toggle);
        let total = toggles.len();
        let handles: Vec<_> = toggles
            .into_iter()
            .filter_map(|element| {
                let label = self.labels.resolve(&element)?;
                let checked = self.page.is_checked(&element);
                Some(ToggleHandle::new(element, label, checked))
            })
            .collect();
        log_discovery(total, handles.len());
        handles
    }

    /// Toggle count across the whole page, labeled or not.
    pub fn raw_toggle_count(&self) -> usize {
        self.page.query_document(&self.config.toggle).len()
    }
}
