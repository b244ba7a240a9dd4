use crate::config::DiscoveryConfig;
use crate::dom::Page;
use lazy_static::lazy_static;
use log::trace;
use regex::Regex;

lazy_static! {
    static ref CHECKBOX_WORD: Regex = Regex::new(r"(?i)checkbox").expect("static pattern");
}

/// Which step of the fallback chain produced a label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelSource {
    LabelledBy,
    AriaLabel,
    RowLabel,
    AncestorText,
    DataAttribute,
}

/// Derives a toggle's display name. The first strategy that yields a
/// non-empty name wins; `None` means the toggle cannot be matched against a
/// group and must be skipped.
pub struct LabelResolver<'a, P: Page> {
    page: &'a P,
    config: &'a DiscoveryConfig,
}

impl<'a, P: Page> LabelResolver<'a, P> {
    pub fn new(page: &'a P, config: &'a DiscoveryConfig) -> Self {
        Self { page, config }
    }

    pub fn resolve(&self, toggle: &P::Element) -> Option<String> {
        self.resolve_with_source(toggle).map(|(label, _)| label)
    }

    pub fn resolve_with_source(&self, toggle: &P::Element) -> Option<(String, LabelSource)> {
        let resolved = self
            .from_labelled_by(toggle)
            .map(|label| (label, LabelSource::LabelledBy))
            .or_else(|| self.from_aria_label(toggle).map(|label| (label, LabelSource::AriaLabel)))
            .or_else(|| self.from_row_label(toggle).map(|label| (label, LabelSource::RowLabel)))
            .or_else(|| {
                self.from_ancestor_text(toggle)
                    .map(|label| (label, LabelSource::AncestorText))
            })
            .or_else(|| {
                self.from_data_attributes(toggle)
                    .map(|label| (label, LabelSource::DataAttribute))
            });

        match &resolved {
            Some((label, source)) => trace!("Resolved label '{}' via {:?}", label, source),
            None => trace!("No label for toggle {:?}", toggle),
        }
        resolved
    }

    fn from_labelled_by(&self, toggle: &P::Element) -> Option<String> {
        let ids = self.page.attribute(toggle, "aria-labelledby")?;
        let text: Vec<String> = ids
            .split_whitespace()
            .filter_map(|id| self.page.element_by_id(id))
            .map(|element| self.page.text_content(&element).trim().to_string())
            .filter(|text| !text.is_empty())
            .collect();
        non_empty(text.join(" "))
    }

    fn from_aria_label(&self, toggle: &P::Element) -> Option<String> {
        self.page
            .attribute(toggle, "aria-label")
            .and_then(|label| non_empty(label.trim().to_string()))
    }

    fn from_row_label(&self, toggle: &P::Element) -> Option<String> {
        let row = self.page.closest_ancestor(toggle, &self.config.row_container)?;
        let label = self
            .page
            .query_all(&row, &self.config.label_like)
            .into_iter()
            .find(|candidate| !self.page.contains(toggle, candidate))?;

        let text = self
            .page
            .attribute(&label, "aria-label")
            .and_then(|name| non_empty(name.trim().to_string()))
            .unwrap_or_else(|| self.page.text_content(&label).trim().to_string());

        if text.eq_ignore_ascii_case("checkbox") {
            return None;
        }
        non_empty(text)
    }

    fn from_ancestor_text(&self, toggle: &P::Element) -> Option<String> {
        let mut current = self.page.parent(toggle);
        for _ in 0..self.config.label_ancestor_depth {
            let element = current?;
            let text = self.page.text_content(&element);
            let cleaned = CHECKBOX_WORD.replace_all(&text, "");
            let cleaned = cleaned.trim();
            if !cleaned.is_empty() && cleaned.chars().count() < self.config.label_max_chars {
                return Some(cleaned.to_string());
            }
            current = self.page.parent(&element);
        }
        None
    }

    fn from_data_attributes(&self, toggle: &P::Element) -> Option<String> {
        self.config
            .label_data_attributes
            .iter()
            .filter_map(|name| self.page.attribute(toggle, name))
            .find_map(|value| non_empty(value.trim().to_string()))
    }
}

fn non_empty(text: String) -> Option<String> {
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{ElementSpec, MemoryPage};

    fn page() -> MemoryPage {
        MemoryPage::new("https://calendar.google.com/calendar/r", "Google Calendar")
    }

    #[test]
    fn test_labelled_by_wins_over_aria_label() {
        let page = page();
        let config = DiscoveryConfig::default();
        let row = page.append(page.body(), ElementSpec::new("div"));
        let toggle = page.append(
            row,
            ElementSpec::checkbox("Direct name", false).attr("aria-labelledby", "cal-1"),
        );
        page.append(row, ElementSpec::new("span").attr("id", "cal-1").text("  Team  "));

        let resolver = LabelResolver::new(&page, &config);
        assert_eq!(
            resolver.resolve_with_source(&toggle),
            Some(("Team".to_string(), LabelSource::LabelledBy))
        );
    }

    #[test]
    fn test_dangling_labelled_by_falls_through() {
        let page = page();
        let config = DiscoveryConfig::default();
        let toggle = page.append(
            page.body(),
            ElementSpec::checkbox("Direct name", false).attr("aria-labelledby", "missing"),
        );
        let resolver = LabelResolver::new(&page, &config);
        assert_eq!(
            resolver.resolve_with_source(&toggle),
            Some(("Direct name".to_string(), LabelSource::AriaLabel))
        );
    }

    #[test]
    fn test_row_label_prefers_aria_label_of_label_element() {
        let page = page();
        let config = DiscoveryConfig::default();
        let row = page.append(page.body(), ElementSpec::new("li"));
        let toggle = page.append(row, ElementSpec::new("input").attr("type", "checkbox"));
        page.append(
            row,
            ElementSpec::new("span").attr("aria-label", "Holidays in Japan").text("Holidays"),
        );

        let resolver = LabelResolver::new(&page, &config);
        assert_eq!(
            resolver.resolve_with_source(&toggle),
            Some(("Holidays in Japan".to_string(), LabelSource::RowLabel))
        );
    }

    #[test]
    fn test_row_label_rejects_checkbox_artifact() {
        let page = page();
        let config = DiscoveryConfig::default();
        let outer = page.append(page.body(), ElementSpec::new("section"));
        let row = page.append(outer, ElementSpec::new("li"));
        let toggle = page.append(row, ElementSpec::new("input").attr("type", "checkbox"));
        page.append(row, ElementSpec::new("span").text("Checkbox"));
        page.append(outer, ElementSpec::new("p").text("Birthdays"));

        let resolver = LabelResolver::new(&page, &config);
        assert_eq!(
            resolver.resolve_with_source(&toggle),
            Some(("Birthdays".to_string(), LabelSource::AncestorText))
        );
    }

    #[test]
    fn test_ancestor_text_strips_checkbox_word_and_caps_length() {
        let page = page();
        let config = DiscoveryConfig::default();
        let long = "x".repeat(150);
        let outer = page.append(page.body(), ElementSpec::new("section").text(&long));
        let row = page.append(outer, ElementSpec::new("p").text("CHECKBOX Reading list checkbox"));
        let toggle = page.append(row, ElementSpec::new("input").attr("type", "checkbox"));

        let resolver = LabelResolver::new(&page, &config);
        assert_eq!(resolver.resolve(&toggle).as_deref(), Some("Reading list"));
    }

    #[test]
    fn test_ancestor_text_too_long_falls_to_data_attribute() {
        let page = page();
        let config = DiscoveryConfig::default();
        let long = "y".repeat(120);
        let outer = page.append(page.body(), ElementSpec::new("section").text(&long));
        let toggle = page.append(
            outer,
            ElementSpec::new("input")
                .attr("type", "checkbox")
                .attr("data-name", " Gym "),
        );

        let resolver = LabelResolver::new(&page, &config);
        assert_eq!(
            resolver.resolve_with_source(&toggle),
            Some(("Gym".to_string(), LabelSource::DataAttribute))
        );
    }

    #[test]
    fn test_unlabeled_toggle_resolves_to_none() {
        let page = page();
        let config = DiscoveryConfig::default();
        let row = page.append(page.body(), ElementSpec::new("section"));
        let toggle = page.append(row, ElementSpec::new("input").attr("type", "checkbox"));

        let resolver = LabelResolver::new(&page, &config);
        assert_eq!(resolver.resolve(&toggle), None);
    }
}
