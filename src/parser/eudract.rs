use crate::constants::{
    LABEL_EUDRACT_NUMBER, LABEL_FULL_TITLE, LABEL_GENDER, LABEL_MEDICAL_CONDITION,
    LABEL_POPULATION_AGE, LABEL_SPONSOR_NAME, LABEL_SPONSOR_PROTOCOL, START_DATE_FORMAT,
    START_DATE_TOOLTIP_CLASS,
};
use crate::parser::locator::{FieldLocator, LabelLocator, TooltipLocator};
use crate::types::EudractTrial;
use chrono::NaiveDate;
use scraper::ElementRef;
use tracing::{debug, warn};

/// Extracts one [`EudractTrial`] from a single `table.result` element.
///
/// Missing markup never fails extraction: the affected field is `None`. The
/// only rejection is a trial without an EudraCT number.
pub struct HtmlTrialExtractor {
    labels: Box<dyn FieldLocator>,
    tooltips: Box<dyn FieldLocator>,
}

impl Default for HtmlTrialExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl HtmlTrialExtractor {
    pub fn new() -> Self {
        Self::with_locators(Box::new(LabelLocator), Box::new(TooltipLocator::default()))
    }

    pub fn with_locators(labels: Box<dyn FieldLocator>, tooltips: Box<dyn FieldLocator>) -> Self {
        Self { labels, tooltips }
    }

    /// Text of the field labelled `label`, label removed and trimmed
    pub fn get_next_text(&self, trial: ElementRef<'_>, label: &str) -> Option<String> {
        self.labels.locate(trial, label)
    }

    pub fn get_start_date(&self, trial: ElementRef<'_>) -> Option<NaiveDate> {
        let raw = self.tooltips.locate(trial, START_DATE_TOOLTIP_CLASS)?;
        match NaiveDate::parse_from_str(&raw, START_DATE_FORMAT) {
            Ok(date) => Some(date),
            Err(e) => {
                debug!(start_date = %raw, error = %e, "Unparseable EudraCT start date");
                None
            }
        }
    }

    /// Returns `None` when the trial has to be skipped.
    pub fn extract(&self, trial: ElementRef<'_>) -> Option<EudractTrial> {
        let eudract_number = self
            .get_next_text(trial, LABEL_EUDRACT_NUMBER)
            .filter(|n| !n.is_empty());

        let Some(eudract_number) = eudract_number else {
            warn!("Skipping trial due to missing EudraCT Number");
            return None;
        };

        Some(EudractTrial {
            sponsor_protocol: self.get_next_text(trial, LABEL_SPONSOR_PROTOCOL),
            start_date: self.get_start_date(trial),
            sponsor_name: self.get_next_text(trial, LABEL_SPONSOR_NAME),
            full_title: self.get_next_text(trial, LABEL_FULL_TITLE),
            medical_condition: self.get_next_text(trial, LABEL_MEDICAL_CONDITION),
            population_age: self.get_next_text(trial, LABEL_POPULATION_AGE),
            gender: self.get_next_text(trial, LABEL_GENDER),
            eudract_number,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::{Html, Selector};

    fn with_trial<R>(html: &str, f: impl FnOnce(ElementRef<'_>) -> R) -> R {
        let doc = Html::parse_fragment(html);
        let sel = Selector::parse("table.result").unwrap();
        let trial = doc.select(&sel).next().unwrap();
        f(trial)
    }

    /// Locator that always answers with a fixed value
    struct Fixed(Option<&'static str>);

    impl FieldLocator for Fixed {
        fn locate(&self, _trial: ElementRef<'_>, _key: &str) -> Option<String> {
            self.0.map(str::to_string)
        }
    }

    #[test]
    fn test_start_date_parsed() {
        let html = r#"<table class="result"><tr><td><div><span class="startdatetip">i</span></div>Start Date*: 2020-05-01</td></tr></table>"#;
        let date = with_trial(html, |t| HtmlTrialExtractor::new().get_start_date(t));
        assert_eq!(date, NaiveDate::from_ymd_opt(2020, 5, 1));
    }

    #[test]
    fn test_start_date_without_date_segment() {
        let html = r#"<table class="result"><tr><td><div><span class="startdatetip">i</span></div>Start Date: pending</td></tr></table>"#;
        let date = with_trial(html, |t| HtmlTrialExtractor::new().get_start_date(t));
        assert_eq!(date, None);
    }

    #[test]
    fn test_swapped_locators() {
        let extractor = HtmlTrialExtractor::with_locators(
            Box::new(Fixed(Some("2004-000001-11"))),
            Box::new(Fixed(Some("2019-12-31"))),
        );
        let trial = with_trial(r#"<table class="result"></table>"#, |t| extractor.extract(t)).unwrap();
        assert_eq!(trial.eudract_number, "2004-000001-11");
        assert_eq!(trial.start_date, NaiveDate::from_ymd_opt(2019, 12, 31));
    }

    #[test]
    fn test_empty_eudract_number_rejected() {
        let extractor =
            HtmlTrialExtractor::with_locators(Box::new(Fixed(Some(""))), Box::new(Fixed(None)));
        let trial = with_trial(r#"<table class="result"></table>"#, |t| extractor.extract(t));
        assert!(trial.is_none());
    }
}
