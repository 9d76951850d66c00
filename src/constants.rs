/// Source names used in logs, metrics labels and error messages
pub const EUDRACT_SOURCE: &str = "eudract";
pub const CTGOV_SOURCE: &str = "clinicaltrials";

/// EudraCT search results page. Only the first page is scraped.
pub const EUDRACT_SEARCH_URL: &str = "https://www.clinicaltrialsregister.eu/ctr-search/search?query=";

/// ClinicalTrials.gov CSV export with all fields
pub const CTGOV_EXPORT_URL: &str = "https://clinicaltrials.gov/ct2/results/download_fields?down_count=10&down_flds=all&down_fmt=csv&flds=a&flds=b&flds=y";

// EudraCT result markup
pub const EUDRACT_RESULT_SELECTOR: &str = "table.result";
pub const EUDRACT_LABEL_SELECTOR: &str = "span.label";
pub const START_DATE_TOOLTIP_CLASS: &str = "startdatetip";
pub const START_DATE_FORMAT: &str = "%Y-%m-%d";

// EudraCT field labels, matched by substring against the label span text
pub const LABEL_EUDRACT_NUMBER: &str = "EudraCT Number:";
pub const LABEL_SPONSOR_PROTOCOL: &str = "Sponsor Protocol Number:";
pub const LABEL_SPONSOR_NAME: &str = "Sponsor Name:";
pub const LABEL_FULL_TITLE: &str = "Full Title:";
pub const LABEL_MEDICAL_CONDITION: &str = "Medical condition:";
pub const LABEL_POPULATION_AGE: &str = "Population Age:";
pub const LABEL_GENDER: &str = "Gender:";

/// Separator of multi-value text fields such as conditions and sponsors
pub const MULTI_VALUE_SEPARATOR: char = '|';

/// Maximum character lengths of the ClinicalTrials.gov text columns
pub const FIELD_MAX_LENGTHS: &[(&str, usize)] = &[
    ("nct_number", 50),
    ("acronym", 100),
    ("status", 50),
    ("gender", 20),
    ("age", 50),
    ("phases", 50),
    ("study_type", 50),
    ("other_ids", 50),
    ("title", 255),
    ("study_results", 255),
    ("conditions", 255),
    ("interventions", 255),
    ("outcome_measures", 255),
    ("sponsor_collaborators", 255),
    ("funded_bys", 255),
    ("study_designs", 255),
    ("locations", 255),
    ("study_documents", 255),
    ("url", 255),
];
