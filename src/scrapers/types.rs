use serde::{Deserialize, Serialize};

/// Highest room count the site filter knows (T6 and above).
pub const MAX_ROOM_CODE: u8 = 7;

/// Search parameters for one results page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchCriteria {
    /// Maximum price (EUR)
    pub max_price: u64,
    /// Minimum useful area in square meters
    pub min_area: u32,
    /// Minimum room count, inclusive
    pub min_rooms: u8,
    /// Maximum room count, inclusive
    pub max_rooms: u8,
    /// Results page, starting at 1
    pub page_number: u32,
}

impl SearchCriteria {
    /// Same criteria pointed at another results page
    pub fn with_page(&self, page_number: u32) -> Self {
        Self {
            page_number,
            ..self.clone()
        }
    }
}

impl Default for SearchCriteria {
    fn default() -> Self {
        Self {
            max_price: 720_000,
            min_area: 130,
            min_rooms: 3,
            max_rooms: MAX_ROOM_CODE,
            page_number: 1,
        }
    }
}
