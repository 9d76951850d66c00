//! Field locators for the EudraCT result markup.
//!
//! A locator finds one labelled value inside a single trial's element and
//! returns its text, or `None` when the markup it anchors on is missing.

use crate::constants::EUDRACT_LABEL_SELECTOR;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Selector};

static LABEL_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse(EUDRACT_LABEL_SELECTOR).expect("label selector is valid"));

pub trait FieldLocator: Send + Sync {
    fn locate(&self, trial: ElementRef<'_>, key: &str) -> Option<String>;
}

/// Anchors on a `span.label` whose text contains `key` and reads the
/// surrounding element's text with the label removed.
#[derive(Debug, Default, Clone, Copy)]
pub struct LabelLocator;

impl FieldLocator for LabelLocator {
    fn locate(&self, trial: ElementRef<'_>, key: &str) -> Option<String> {
        let label = trial
            .select(&LABEL_SELECTOR)
            .find(|span| element_text(*span).contains(key))?;
        let container = label.parent().and_then(ElementRef::wrap)?;
        Some(element_text(container).replace(key, "").trim().to_string())
    }
}

/// Anchors on a `span` carrying the CSS class `key`, climbs `ascend` element
/// levels and returns the text after the last colon of that container.
#[derive(Debug, Clone, Copy)]
pub struct TooltipLocator {
    ascend: usize,
}

impl TooltipLocator {
    pub fn new(ascend: usize) -> Self {
        Self { ascend }
    }
}

impl Default for TooltipLocator {
    fn default() -> Self {
        Self::new(2)
    }
}

impl FieldLocator for TooltipLocator {
    fn locate(&self, trial: ElementRef<'_>, key: &str) -> Option<String> {
        let marker = trial
            .descendants()
            .filter_map(ElementRef::wrap)
            .find(|el| el.value().name() == "span" && el.value().classes().any(|c| c == key))?;

        let mut container = marker;
        for _ in 0..self.ascend {
            container = container.parent().and_then(ElementRef::wrap)?;
        }

        let full_text = element_text(container);
        let segment = full_text.trim().rsplit(':').next()?.trim();
        if segment.is_empty() {
            None
        } else {
            Some(segment.to_string())
        }
    }
}

fn element_text(el: ElementRef<'_>) -> String {
    el.text().collect()
}
