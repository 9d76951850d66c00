use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One trial scraped from the EudraCT search results page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EudractTrial {
    pub eudract_number: String,
    pub sponsor_protocol: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub sponsor_name: Option<String>,
    pub full_title: Option<String>,
    pub medical_condition: Option<String>,
    pub population_age: Option<String>,
    pub gender: Option<String>,
}

/// One row of the ClinicalTrials.gov CSV export, normalized.
///
/// Text fields are `None` only when the column is missing from the export;
/// empty cells are kept as empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClinicalTrial {
    pub rank: Option<i64>,
    pub nct_number: Option<String>,
    pub title: Option<String>,
    pub acronym: Option<String>,
    pub status: Option<String>,
    pub study_results: Option<String>,
    pub conditions: Option<String>,
    pub interventions: Option<String>,
    pub outcome_measures: Option<String>,
    pub sponsor_collaborators: Option<String>,
    pub gender: Option<String>,
    pub age: Option<String>,
    pub phases: Option<String>,
    pub enrollment: Option<i64>,
    pub funded_bys: Option<String>,
    pub study_type: Option<String>,
    pub study_designs: Option<String>,
    pub other_ids: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub primary_completion_date: Option<NaiveDate>,
    pub completion_date: Option<NaiveDate>,
    pub first_posted: Option<NaiveDate>,
    pub results_first_posted: Option<NaiveDate>,
    pub last_update_posted: Option<NaiveDate>,
    pub locations: Option<String>,
    pub study_documents: Option<String>,
    pub url: Option<String>,
}

impl ClinicalTrial {
    /// Text fields by storage name, in column order
    pub fn text_fields(&self) -> [(&'static str, Option<&str>); 19] {
        [
            ("nct_number", self.nct_number.as_deref()),
            ("title", self.title.as_deref()),
            ("acronym", self.acronym.as_deref()),
            ("status", self.status.as_deref()),
            ("study_results", self.study_results.as_deref()),
            ("conditions", self.conditions.as_deref()),
            ("interventions", self.interventions.as_deref()),
            ("outcome_measures", self.outcome_measures.as_deref()),
            ("sponsor_collaborators", self.sponsor_collaborators.as_deref()),
            ("gender", self.gender.as_deref()),
            ("age", self.age.as_deref()),
            ("phases", self.phases.as_deref()),
            ("funded_bys", self.funded_bys.as_deref()),
            ("study_type", self.study_type.as_deref()),
            ("study_designs", self.study_designs.as_deref()),
            ("other_ids", self.other_ids.as_deref()),
            ("locations", self.locations.as_deref()),
            ("study_documents", self.study_documents.as_deref()),
            ("url", self.url.as_deref()),
        ]
    }

    pub fn multi_value(&self, field: MultiValueField) -> Option<&str> {
        match field {
            MultiValueField::SponsorCollaborators => self.sponsor_collaborators.as_deref(),
            MultiValueField::Conditions => self.conditions.as_deref(),
        }
    }
}

/// Pipe-delimited fields that can be aggregated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MultiValueField {
    SponsorCollaborators,
    Conditions,
}

impl MultiValueField {
    pub fn column(self) -> &'static str {
        match self {
            MultiValueField::SponsorCollaborators => "sponsor_collaborators",
            MultiValueField::Conditions => "conditions",
        }
    }

    /// Key used for the value in API responses
    pub fn value_key(self) -> &'static str {
        match self {
            MultiValueField::SponsorCollaborators => "sponsor",
            MultiValueField::Conditions => "condition",
        }
    }
}

/// Frequency of one distinct value of a multi-value field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregationRow {
    pub value: String,
    pub count: u64,
}
