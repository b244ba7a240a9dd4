use crate::config::DiscoveryConfig;
use crate::dom::Page;
use crate::utils::clock::Clock;
use crate::utils::retry::{poll_until, PollState, RetryConfig};
use log::debug;

/// Which rule located the section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocateStrategy {
    /// Index into `DiscoveryConfig::section_hints`.
    Hint(usize),
    AncestorHint,
    CommonParent,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Section<E> {
    pub container: E,
    pub strategy: LocateStrategy,
}

/// Finds the container holding the calendar toggles.
///
/// The host page's structure and language vary by locale and release, so the
/// search degrades from precise accessible-name hints, through ancestor
/// markers, to a purely structural "common parent" guess.
pub struct SectionLocator<'a, P: Page, C: Clock> {
    page: &'a P,
    clock: &'a C,
    config: &'a DiscoveryConfig,
}

impl<'a, P: Page, C: Clock> SectionLocator<'a, P, C> {
    pub fn new(page: &'a P, clock: &'a C, config: &'a DiscoveryConfig) -> Self {
        Self {
            page,
            clock,
            config,
        }
    }

    /// Runs up to `section_retry_rounds` rounds, `section_retry_delay` apart.
    pub async fn locate(&self) -> Option<Section<P::Element>> {
        let retry = RetryConfig::attempts(
            self.config.section_retry_rounds,
            self.config.section_retry_delay(),
        );
        match poll_until(self.clock, &retry, |_| self.locate_once()).await {
            PollState::Found(section) => Some(section),
            PollState::TimedOut { attempts } => {
                debug!("No calendar section after {} rounds", attempts);
                None
            }
            PollState::Idle | PollState::Searching { .. } => None,
        }
    }

    /// One round of the strategy chain, without waiting.
    pub fn locate_once(&self) -> Option<Section<P::Element>> {
        let section = self
            .by_hints()
            .or_else(|| self.by_ancestor_hint())
            .or_else(|| self.by_common_parent());
        if let Some(section) = &section {
            debug!("Calendar section located via {:?}", section.strategy);
        }
        section
    }

    fn by_hints(&self) -> Option<Section<P::Element>> {
        for (index, hint) in self.config.section_hints.iter().enumerate() {
            let container = self
                .page
                .query_document(hint)
                .into_iter()
                .find(|candidate| self.page.query_first(candidate, &self.config.toggle).is_some());
            if let Some(container) = container {
                return Some(Section {
                    container,
                    strategy: LocateStrategy::Hint(index),
                });
            }
        }
        None
    }

    fn by_ancestor_hint(&self) -> Option<Section<P::Element>> {
        self.page
            .query_document(&self.config.toggle)
            .iter()
            .find_map(|toggle| self.page.closest_ancestor(toggle, &self.config.ancestor_hint))
            .map(|container| Section {
                container,
                strategy: LocateStrategy::AncestorHint,
            })
    }

    fn by_common_parent(&self) -> Option<Section<P::Element>> {
        let toggles = self.page.query_document(&self.config.toggle);
        let first = toggles.first()?;
        let threshold = toggles.len() as f64 * self.config.common_parent_ratio;

        let mut current = self.page.parent(first);
        while let Some(candidate) = current {
            let count = self.page.query_all(&candidate, &self.config.toggle).len();
            if count as f64 >= threshold {
                return Some(Section {
                    container: candidate,
                    strategy: LocateStrategy::CommonParent,
                });
            }
            current = self.page.parent(&candidate);
        }
        None
    }
}
