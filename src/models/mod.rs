use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

const RENDER_SEPARATOR: &str = "------------------------------";

/// One property listing scraped from a results page.
///
/// Identity is the `url`; two records with the same url are the same
/// listing no matter how the other fields differ.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingRecord {
    #[serde(rename = "date")]
    pub date_added: NaiveDate,
    #[serde(rename = "loc")]
    pub location: String,
    #[serde(rename = "p")]
    pub price: i64,
    #[serde(rename = "t")]
    pub property_type: String,
    #[serde(rename = "T")]
    pub rooms_code: String,
    #[serde(rename = "st")]
    pub state: String,
    #[serde(rename = "UA")]
    pub useful_area: u32,
    #[serde(rename = "GA")]
    pub gross_area: u32,
    pub url: String,
    /// Set once detail-page enrichment exists; never true today.
    #[serde(skip)]
    pub complete_entry: bool,
    #[serde(skip)]
    pub id: Option<String>,
}

impl ListingRecord {
    /// Dedup key.
    pub fn key(&self) -> &str {
        &self.url
    }
}

/// Gross area falls back to useful area when the site leaves it out.
pub fn resolve_gross_area(gross_area: Option<u32>, useful_area: u32) -> u32 {
    gross_area.unwrap_or(useful_area)
}

impl fmt::Display for ListingRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}\t({}):\n{}\nLocation: {}\nArea: {}m2\nPrice: {}K\n{}",
            self.property_type,
            self.rooms_code,
            self.date_added,
            RENDER_SEPARATOR,
            self.location,
            self.useful_area,
            self.price / 1000,
            self.url
        )
    }
}

/// On-disk shape of a store file: `{"entries": [...]}`.
#[derive(Debug, Deserialize)]
pub struct EntriesFile {
    pub entries: Vec<ListingRecord>,
}

#[cfg(test)]
pub(crate) fn sample_record(url: &str) -> ListingRecord {
    ListingRecord {
        date_added: NaiveDate::from_ymd_opt(2016, 10, 13).unwrap(),
        location: "Sao Joao do Estoril, Cascais".to_string(),
        price: 695_000,
        property_type: "Moradia".to_string(),
        rooms_code: "T4".to_string(),
        state: "Usado".to_string(),
        useful_area: 180,
        gross_area: 220,
        url: url.to_string(),
        complete_entry: false,
        id: None,
    }
}
