use crate::error::{Result, ScoutError};
use crate::models::{resolve_gross_area, ListingRecord};
use crate::scrapers::query::CASA_SAPO_URL_ROOT;
use chrono::NaiveDate;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashMap;
use thiserror::Error;
use tracing::{debug, info};

/// Accented characters folded to their plain letter. Anything else outside
/// ASCII is replaced with `?`.
const DIACRITIC_TABLE: &[(char, char)] = &[
    ('ã', 'a'),
    ('ç', 'c'),
    ('õ', 'o'),
    ('à', 'a'),
    ('á', 'a'),
    ('â', 'a'),
    ('é', 'e'),
    ('í', 'i'),
    ('ó', 'o'),
    ('ú', 'u'),
];

const DETAIL_STATE: &str = "estado";
const DETAIL_USEFUL_AREA: &str = "area util";
const DETAIL_GROSS_AREA: &str = "area bruta";
const ABSENT_MARKER: &str = "-";

/// Why a single listing block could not be turned into a record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EntryFailure {
    #[error("missing element {0}")]
    MissingElement(&'static str),

    #[error("detail row without key and value")]
    IncompleteDetailRow,

    #[error("missing detail '{0}'")]
    MissingDetail(&'static str),

    #[error("invalid date '{0}'")]
    InvalidDate(String),

    #[error("invalid {field} '{value}'")]
    InvalidNumber { field: &'static str, value: String },

    #[error("title '{0}' is not '<type> <rooms>'")]
    InvalidTitle(String),

    #[error("listing link has no href")]
    MissingHref,
}

/// A block that was skipped, with its position on the page.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("entry {index}: {cause}")]
pub struct EntryError {
    pub index: usize,
    pub cause: EntryFailure,
}

/// Records and skipped blocks from one results page, both in page order.
#[derive(Debug, Default)]
pub struct ParsedPage {
    pub listings: Vec<ListingRecord>,
    pub errors: Vec<EntryError>,
}

/// Parser for casa.sapo.pt search result pages.
pub struct PageParser {
    block: Selector,
    date: Selector,
    location: Selector,
    info: Selector,
    info_row: Selector,
    info_cell: Selector,
    price: Selector,
    title: Selector,
    link: Selector,
}

impl PageParser {
    pub fn new() -> Result<Self> {
        Ok(Self {
            block: compile(r#"div[class="searchResultProperty"]"#)?,
            date: compile(r#"div[class="searchPropertyDate"]"#)?,
            location: compile(r#"p[class="searchPropertyLocation"]"#)?,
            info: compile(r#"div[class="searchPropertyInfo"]"#)?,
            info_row: compile("div")?,
            info_cell: compile("p")?,
            price: compile(r#"div[class="searchPropertyPrice"] span"#)?,
            title: compile(r#"p[class="searchPropertyTitle"] span"#)?,
            link: compile(r#"a[class="photoLayer"]"#)?,
        })
    }

    /// Extract every listing block on the page. A broken block is recorded
    /// in `errors` and never stops the blocks after it.
    pub fn parse_page(&self, raw: &[u8]) -> ParsedPage {
        // casa.sapo.pt serves UTF-8; a page in another charset would lose
        // the accented detail keys and every block would fail.
        let html = String::from_utf8_lossy(raw);
        let document = Html::parse_document(&html);

        let blocks: Vec<_> = document.select(&self.block).collect();
        debug!("Found {} listing blocks in HTML", blocks.len());

        let mut page = ParsedPage::default();
        for (index, block) in blocks.into_iter().enumerate() {
            match self.parse_block(block) {
                Ok(listing) => page.listings.push(listing),
                Err(cause) => {
                    debug!("Skipped block {}: {}", index, cause);
                    page.errors.push(EntryError { index, cause });
                }
            }
        }

        info!(
            "Parsed {} listings ({} skipped)",
            page.listings.len(),
            page.errors.len()
        );
        page
    }

    fn parse_block(&self, block: ElementRef) -> std::result::Result<ListingRecord, EntryFailure> {
        let date_text = self.first_text(block, &self.date, "searchPropertyDate")?;
        let date_added = parse_date_added(&date_text)?;

        let location_text = self.first_text(block, &self.location, "searchPropertyLocation")?;
        let location = fold_diacritics(location_text.trim());

        let details = self.details(block)?;
        let state = detail(&details, DETAIL_STATE)?.trim().to_string();
        let useful_area = parse_area(detail(&details, DETAIL_USEFUL_AREA)?, "useful area")?;
        let gross_raw = detail(&details, DETAIL_GROSS_AREA)?;
        let gross_area = if gross_raw.trim() == ABSENT_MARKER {
            None
        } else {
            Some(parse_area(gross_raw, "gross area")?)
        };

        let price_text = self.first_text(block, &self.price, "searchPropertyPrice")?;
        let price = parse_price(&price_text)?;

        let title = self.first_text(block, &self.title, "searchPropertyTitle")?;
        let (property_type, rooms_code) = split_title(&title)?;

        let link = block
            .select(&self.link)
            .next()
            .ok_or(EntryFailure::MissingElement("photoLayer"))?;
        let href = link.value().attr("href").ok_or(EntryFailure::MissingHref)?;
        let url = listing_url(href);

        Ok(ListingRecord {
            date_added,
            location,
            price,
            property_type,
            rooms_code,
            state,
            useful_area,
            gross_area: resolve_gross_area(gross_area, useful_area),
            url,
            complete_entry: false,
            id: None,
        })
    }

    fn first_text(
        &self,
        block: ElementRef,
        selector: &Selector,
        name: &'static str,
    ) -> std::result::Result<String, EntryFailure> {
        block
            .select(selector)
            .next()
            .map(element_text)
            .ok_or(EntryFailure::MissingElement(name))
    }

    /// Key/value rows of the info box. Keys are lower-cased and folded so
    /// "Área útil" becomes "area util".
    fn details(
        &self,
        block: ElementRef,
    ) -> std::result::Result<HashMap<String, String>, EntryFailure> {
        let info = block
            .select(&self.info)
            .next()
            .ok_or(EntryFailure::MissingElement("searchPropertyInfo"))?;

        let mut details = HashMap::new();
        for row in info.select(&self.info_row) {
            let mut cells = row.select(&self.info_cell);
            let (key, value) = match (cells.next(), cells.next()) {
                (Some(key), Some(value)) => (key, value),
                _ => return Err(EntryFailure::IncompleteDetailRow),
            };
            let key = fold_diacritics(&element_text(key).trim().to_lowercase());
            details.insert(key, element_text(value));
        }
        Ok(details)
    }
}

fn compile(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| ScoutError::Selector(format!("{}: {:?}", css, e)))
}

fn element_text(element: ElementRef) -> String {
    element.text().collect::<String>()
}

fn detail<'a>(
    details: &'a HashMap<String, String>,
    key: &'static str,
) -> std::result::Result<&'a str, EntryFailure> {
    details
        .get(key)
        .map(String::as_str)
        .ok_or(EntryFailure::MissingDetail(key))
}

/// Fold accented characters through the substitution table.
pub fn fold_diacritics(text: &str) -> String {
    text.chars()
        .map(|c| {
            if c.is_ascii() {
                return c;
            }
            DIACRITIC_TABLE
                .iter()
                .find(|(accented, _)| *accented == c)
                .map(|(_, plain)| *plain)
                .unwrap_or('?')
        })
        .collect()
}

/// "Adicionado em 13/10/2016" -> 2016-10-13
fn parse_date_added(text: &str) -> std::result::Result<NaiveDate, EntryFailure> {
    let invalid = || EntryFailure::InvalidDate(text.trim().to_string());

    let token = text.split_whitespace().last().ok_or_else(invalid)?;
    let parts: Vec<&str> = token.split('/').collect();
    let [day, month, year] = parts.as_slice() else {
        return Err(invalid());
    };

    let day: u32 = day.parse().map_err(|_| invalid())?;
    let month: u32 = month.parse().map_err(|_| invalid())?;
    let year: i32 = year.parse().map_err(|_| invalid())?;

    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(invalid)
}

/// Leading integer before the unit suffix: "130 m²" -> 130
fn parse_area(text: &str, field: &'static str) -> std::result::Result<u32, EntryFailure> {
    let number = text.split('m').next().unwrap_or_default().trim();
    number.parse().map_err(|_| EntryFailure::InvalidNumber {
        field,
        value: text.trim().to_string(),
    })
}

/// "695000€" -> 695000
fn parse_price(text: &str) -> std::result::Result<i64, EntryFailure> {
    let digits: String = text.chars().filter(|c| c.is_ascii_digit()).collect();
    digits.parse().map_err(|_| EntryFailure::InvalidNumber {
        field: "price",
        value: text.trim().to_string(),
    })
}

/// "Apartamento T3" -> ("Apartamento", "T3")
fn split_title(text: &str) -> std::result::Result<(String, String), EntryFailure> {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    match tokens.as_slice() {
        [property_type, rooms_code] => Ok((property_type.to_string(), rooms_code.to_string())),
        _ => Err(EntryFailure::InvalidTitle(text.trim().to_string())),
    }
}

fn listing_url(href: &str) -> String {
    let path = href.split('?').next().unwrap_or_default();
    format!("{}{}", CASA_SAPO_URL_ROOT, path)
}
