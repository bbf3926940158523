use crate::error::{Result, ScoutError};
use crate::scrapers::types::{SearchCriteria, MAX_ROOM_CODE};

pub const CASA_SAPO_URL_ROOT: &str = "https://casa.sapo.pt";

/// "Most recent first" ordering on the results page.
const SORT_MOST_RECENT: u32 = 10;

/// Check the room range and page number before they reach the site.
pub fn validate_criteria(criteria: &SearchCriteria) -> Result<()> {
    if criteria.max_rooms > MAX_ROOM_CODE {
        return Err(ScoutError::InvalidCriteria {
            reason: format!(
                "max_rooms {} is above {}",
                criteria.max_rooms, MAX_ROOM_CODE
            ),
        });
    }
    if criteria.min_rooms > criteria.max_rooms {
        return Err(ScoutError::InvalidCriteria {
            reason: format!(
                "min_rooms {} is above max_rooms {}",
                criteria.min_rooms, criteria.max_rooms
            ),
        });
    }
    if criteria.page_number == 0 {
        return Err(ScoutError::InvalidCriteria {
            reason: "page_number starts at 1".to_string(),
        });
    }
    Ok(())
}

/// Build the search url for one results page.
pub fn build_query_url(criteria: &SearchCriteria) -> Result<String> {
    validate_criteria(criteria)?;

    let rooms = (criteria.min_rooms..=criteria.max_rooms)
        .map(|r| r.to_string())
        .collect::<Vec<_>>()
        .join(",");

    Ok(format!(
        "{}/Venda/Lisboa/?sa=11&gp={}&lau={}&mpr={}&or={}&pn={}",
        CASA_SAPO_URL_ROOT,
        criteria.max_price,
        criteria.min_area,
        rooms,
        SORT_MOST_RECENT,
        criteria.page_number
    ))
}
