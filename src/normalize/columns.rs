//! Mapping from ClinicalTrials.gov CSV headers to [`ClinicalTrial`] fields.

use crate::normalize::dates::coerce_date;
use crate::types::ClinicalTrial;
use csv::StringRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Rank,
    NctNumber,
    Title,
    Acronym,
    Status,
    StudyResults,
    Conditions,
    Interventions,
    OutcomeMeasures,
    SponsorCollaborators,
    Gender,
    Age,
    Phases,
    Enrollment,
    FundedBys,
    StudyType,
    StudyDesigns,
    OtherIds,
    StartDate,
    PrimaryCompletionDate,
    CompletionDate,
    FirstPosted,
    ResultsFirstPosted,
    LastUpdatePosted,
    Locations,
    StudyDocuments,
    Url,
}

impl Column {
    pub const ALL: [Column; 27] = [
        Column::Rank,
        Column::NctNumber,
        Column::Title,
        Column::Acronym,
        Column::Status,
        Column::StudyResults,
        Column::Conditions,
        Column::Interventions,
        Column::OutcomeMeasures,
        Column::SponsorCollaborators,
        Column::Gender,
        Column::Age,
        Column::Phases,
        Column::Enrollment,
        Column::FundedBys,
        Column::StudyType,
        Column::StudyDesigns,
        Column::OtherIds,
        Column::StartDate,
        Column::PrimaryCompletionDate,
        Column::CompletionDate,
        Column::FirstPosted,
        Column::ResultsFirstPosted,
        Column::LastUpdatePosted,
        Column::Locations,
        Column::StudyDocuments,
        Column::Url,
    ];

    /// Exact, case-sensitive header in the export
    pub fn header(self) -> &'static str {
        match self {
            Column::Rank => "Rank",
            Column::NctNumber => "NCT Number",
            Column::Title => "Title",
            Column::Acronym => "Acronym",
            Column::Status => "Status",
            Column::StudyResults => "Study Results",
            Column::Conditions => "Conditions",
            Column::Interventions => "Interventions",
            Column::OutcomeMeasures => "Outcome Measures",
            Column::SponsorCollaborators => "Sponsor/Collaborators",
            Column::Gender => "Gender",
            Column::Age => "Age",
            Column::Phases => "Phases",
            Column::Enrollment => "Enrollment",
            Column::FundedBys => "Funded Bys",
            Column::StudyType => "Study Type",
            Column::StudyDesigns => "Study Designs",
            Column::OtherIds => "Other IDs",
            Column::StartDate => "Start Date",
            Column::PrimaryCompletionDate => "Primary Completion Date",
            Column::CompletionDate => "Completion Date",
            Column::FirstPosted => "First Posted",
            Column::ResultsFirstPosted => "Results First Posted",
            Column::LastUpdatePosted => "Last Update Posted",
            Column::Locations => "Locations",
            Column::StudyDocuments => "Study Documents",
            Column::Url => "URL",
        }
    }

    fn slot(self) -> usize {
        self as usize
    }
}

/// Position of every known column in one file's header row
#[derive(Debug, Clone)]
pub struct HeaderIndex {
    positions: [Option<usize>; 27],
}

impl HeaderIndex {
    pub fn from_headers(headers: &StringRecord) -> Self {
        let mut positions = [None; 27];
        for column in Column::ALL {
            positions[column.slot()] = headers.iter().position(|h| h == column.header());
        }
        Self { positions }
    }

    pub fn missing(&self) -> Vec<&'static str> {
        Column::ALL
            .iter()
            .filter(|c| self.positions[c.slot()].is_none())
            .map(|c| c.header())
            .collect()
    }

    fn cell<'r>(&self, row: &'r StringRecord, column: Column) -> Option<&'r str> {
        self.positions[column.slot()].and_then(|i| row.get(i))
    }

    fn text(&self, row: &StringRecord, column: Column) -> Option<String> {
        self.cell(row, column).map(str::to_string)
    }

    fn integer(&self, row: &StringRecord, column: Column) -> Option<i64> {
        self.cell(row, column).and_then(digits_only)
    }

    /// Map one CSV row onto a normalized trial
    pub fn map_row(&self, row: &StringRecord) -> ClinicalTrial {
        let date = |column| coerce_date(self.cell(row, column));
        ClinicalTrial {
            rank: self.integer(row, Column::Rank),
            nct_number: self.text(row, Column::NctNumber),
            title: self.text(row, Column::Title),
            acronym: self.text(row, Column::Acronym),
            status: self.text(row, Column::Status),
            study_results: self.text(row, Column::StudyResults),
            conditions: self.text(row, Column::Conditions),
            interventions: self.text(row, Column::Interventions),
            outcome_measures: self.text(row, Column::OutcomeMeasures),
            sponsor_collaborators: self.text(row, Column::SponsorCollaborators),
            gender: self.text(row, Column::Gender),
            age: self.text(row, Column::Age),
            phases: self.text(row, Column::Phases),
            enrollment: self.integer(row, Column::Enrollment),
            funded_bys: self.text(row, Column::FundedBys),
            study_type: self.text(row, Column::StudyType),
            study_designs: self.text(row, Column::StudyDesigns),
            other_ids: self.text(row, Column::OtherIds),
            start_date: date(Column::StartDate),
            primary_completion_date: date(Column::PrimaryCompletionDate),
            completion_date: date(Column::CompletionDate),
            first_posted: date(Column::FirstPosted),
            results_first_posted: date(Column::ResultsFirstPosted),
            last_update_posted: date(Column::LastUpdatePosted),
            locations: self.text(row, Column::Locations),
            study_documents: self.text(row, Column::StudyDocuments),
            url: self.text(row, Column::Url),
        }
    }
}

/// Integer value of a cell made only of ASCII digits; anything else is `None`
pub fn digits_only(cell: &str) -> Option<i64> {
    if cell.is_empty() || !cell.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    cell.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digits_only() {
        assert_eq!(digits_only("3"), Some(3));
        assert_eq!(digits_only("0042"), Some(42));
        assert_eq!(digits_only("N/A"), None);
        assert_eq!(digits_only("-5"), None);
        assert_eq!(digits_only("12a"), None);
        assert_eq!(digits_only(" 7"), None);
        assert_eq!(digits_only(""), None);
        assert_eq!(digits_only("99999999999999999999999"), None);
    }

    #[test]
    fn test_header_names_are_distinct() {
        let mut headers: Vec<_> = Column::ALL.iter().map(|c| c.header()).collect();
        headers.sort_unstable();
        headers.dedup();
        assert_eq!(headers.len(), Column::ALL.len());
    }

    #[test]
    fn test_missing_header_leaves_field_absent() {
        let headers = StringRecord::from(vec!["Rank", "nct number", "Title"]);
        let index = HeaderIndex::from_headers(&headers);
        let row = StringRecord::from(vec!["1", "NCT01", "Trial"]);
        let trial = index.map_row(&row);

        assert_eq!(trial.rank, Some(1));
        assert_eq!(trial.nct_number, None);
        assert_eq!(trial.title.as_deref(), Some("Trial"));
        assert!(index.missing().contains(&"NCT Number"));
    }

    #[test]
    fn test_short_row_leaves_trailing_fields_absent() {
        let headers = StringRecord::from(vec!["Rank", "Title", "URL"]);
        let index = HeaderIndex::from_headers(&headers);
        let trial = index.map_row(&StringRecord::from(vec!["2"]));
        assert_eq!(trial.rank, Some(2));
        assert_eq!(trial.title, None);
        assert_eq!(trial.url, None);
    }
}
