#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashMap;
use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use trials_scraper::app::ports::{HttpClientPort, HttpGetResult};

pub const EUDRACT_URL: &str = "https://registry.test/ctr-search/search?query=";
pub const CTGOV_URL: &str = "https://registry.test/download_fields?down_fmt=csv";

/// Serves canned responses by URL; unknown URLs fail like a refused connection
#[derive(Default)]
pub struct FakeHttp {
    pages: HashMap<String, (u16, Vec<u8>)>,
    calls: AtomicUsize,
}

impl FakeHttp {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, url: &str, status: u16, body: impl Into<Vec<u8>>) -> Self {
        self.pages.insert(url.to_string(), (status, body.into()));
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl HttpClientPort for FakeHttp {
    async fn get(&self, url: &str) -> Result<HttpGetResult, String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.pages.get(url) {
            Some((status, body)) => Ok(HttpGetResult {
                status: *status,
                bytes: body.clone(),
                content_type: "text/plain".to_string(),
            }),
            None => Err(format!("connection refused: {url}")),
        }
    }
}

#[derive(Clone, Default)]
pub struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl LogBuffer {
    pub fn lines(&self) -> Vec<String> {
        let bytes = self.0.lock().unwrap();
        String::from_utf8_lossy(&bytes)
            .lines()
            .map(str::to_string)
            .collect()
    }
}

/// Run `f` with a subscriber that records WARN and above, returning the log lines
pub fn capture_warnings<R>(f: impl FnOnce() -> R) -> (R, Vec<String>) {
    let buffer = LogBuffer::default();
    let writer = buffer.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::WARN)
        .finish();
    let out = tracing::subscriber::with_default(subscriber, f);
    (out, buffer.lines())
}

pub const CTGOV_HEADER: &str = "Rank,NCT Number,Title,Acronym,Status,Study Results,Conditions,Interventions,Outcome Measures,Sponsor/Collaborators,Gender,Age,Phases,Enrollment,Funded Bys,Study Type,Study Designs,Other IDs,Start Date,Primary Completion Date,Completion Date,First Posted,Results First Posted,Last Update Posted,Locations,Study Documents,URL";

pub const CTGOV_ROW_FULL: &str = r#"3,NCT04368728,Study to Describe the Safety of RNA Vaccine,,"Active, not recruiting",Has Results,Asthma|Diabetes,Biological: BNT162b2,Efficacy,Pfizer|BioNTech SE,All,"18 Years and older   (Adult, Older Adult)",Phase 2|Phase 3,43998,Industry,Interventional,Allocation: Randomized,C4591001,"April 29, 2020","November 14, 2020","February 8, 2024","April 30, 2020","December 15, 2020","March 1, 2024","Pfizer Investigational Site, New York, United States",,https://ClinicalTrials.gov/show/NCT04368728"#;

pub const CTGOV_ROW_SPARSE: &str = r#"N/A,NCT00000102,Second trial,ACR,Completed,No Results Available,Diabetes,,,National Cancer Institute (NCI),Female,18 Years and older,Phase 1,N/A,NIH,Observational,,,not-a-date,,,January 2020,,,,,https://ClinicalTrials.gov/show/NCT00000102"#;

pub fn ctgov_export(rows: &[&str]) -> String {
    let mut out = String::from(CTGOV_HEADER);
    for row in rows {
        out.push('\n');
        out.push_str(row);
    }
    out.push('\n');
    out
}

pub const EUDRACT_PAGE: &str = r##"<!DOCTYPE html>
<html><body>
<div class="results">
<table class="result">
  <tr>
    <td class="first"><span class="label">EudraCT Number:</span> 2004-000018-29</td>
    <td><span class="label">Sponsor Protocol Number:</span> CR002361</td>
    <td><span class="label">Start Date</span><a href="#"><span class="startdatetip">*</span></a>: 2004-09-15</td>
  </tr>
  <tr>
    <td colspan="3"><span class="label">Sponsor Name:</span> Janssen-Cilag International NV</td>
  </tr>
  <tr>
    <td colspan="3"><span class="label">Full Title:</span> A Randomized, Double-Blind Study of Risperidone</td>
  </tr>
  <tr>
    <td colspan="3"><span class="label">Medical condition:</span> Schizophrenia</td>
  </tr>
  <tr>
    <td><span class="label">Population Age:</span> Adults, Elderly</td>
    <td><span class="label">Gender:</span> Male, Female</td>
  </tr>
</table>
<table class="result">
  <tr>
    <td><span class="label">Sponsor Protocol Number:</span> NO-NUMBER</td>
  </tr>
</table>
<table class="result">
  <tr>
    <td class="first"><span class="label">EudraCT Number:</span> 2015-001234-56</td>
    <td><span class="label">Gender:</span> Female</td>
  </tr>
</table>
<table class="other">
  <tr><td><span class="label">EudraCT Number:</span> 1999-999999-99</td></tr>
</table>
</div>
</body></html>"##;
