//! Enrichment passes: independent row transforms that each own a fixed set
//! of derived columns.
//!
//! Every pass writes its owned columns onto every row (null when unresolved)
//! so the column union stays stable across rows whether or not a lookup
//! matched. Passes are pure with respect to the workspace, independent, and
//! runnable in any order; property-links merely benefits from county names a
//! prior property-tax run resolved.

use log::debug;
use url::Url;

use crate::{
    boe::BoeData,
    data::{Cell, Row},
    reference,
};

pub const COL_CARRIER: &str = "Carrier";
pub const COL_LATITUDE: &str = "Latitude";
pub const COL_LONGITUDE: &str = "Longitude";
pub const COL_TIMEZONE: &str = "Timezone";
pub const COL_COUNTY: &str = "County";
pub const COL_TAX_RATE: &str = "PropertyTaxRate";
pub const COL_ASSESSED_VALUE: &str = "AssessedValue";
pub const COL_TAX_DATA_YEAR: &str = "TaxDataYear";
pub const COL_SEARCH_URL: &str = "PropertySearchUrl";
pub const COL_ASSESSOR_URL: &str = "CountyAssessorUrl";

const NUMBER_COLUMNS: &[&str] = &[
    "CallerID",
    "CallerNumber",
    "Caller",
    "PhoneNumber",
    "Phone",
    "Number",
];
const STATE_COLUMNS: &[&str] = &["CallerState", "State", "Province"];
const CITY_COLUMNS: &[&str] = &["CallerCity", "City"];
const ADDRESS_COLUMNS: &[&str] = &["CallerAddress", "Address", "StreetAddress"];

const ADDRESS_PLACEHOLDERS: &[&str] = &["unknown", "n/a", "na", "none", "-"];

#[derive(Debug)]
pub struct EnrichmentResult {
    pub rows: Vec<Row>,
    pub added_columns: Vec<String>,
    pub enriched_count: usize,
    pub message: String,
}

/// First column (in candidate priority order) present on any row,
/// matched case-insensitively.
fn find_column(rows: &[Row], candidates: &[&str]) -> Option<String> {
    for candidate in candidates {
        for row in rows {
            if let Some(key) = row.keys().find(|k| k.eq_ignore_ascii_case(candidate)) {
                return Some(key.clone());
            }
        }
    }
    None
}

fn ensure_columns(rows: &mut [Row], columns: &[&str]) {
    for row in rows.iter_mut() {
        for column in columns {
            row.entry(column.to_string()).or_insert(Cell::Null);
        }
    }
}

fn state_of(row: &Row, state_col: Option<&str>) -> Option<String> {
    let col = state_col?;
    row.get(col)
        .and_then(Cell::as_str)
        .map(|s| s.trim().to_uppercase())
        .filter(|s| !s.is_empty())
}

/// Area-code carrier lookup. Fills the carrier column only where it is
/// absent, null, or still "Not Found"; already-resolved values are never
/// clobbered, so re-running is a no-op for them.
pub fn carrier(mut rows: Vec<Row>) -> EnrichmentResult {
    let number_col = find_column(&rows, NUMBER_COLUMNS);
    debug!("carrier pass using number column {number_col:?}");

    let mut matched = 0usize;
    let mut filled = 0usize;
    if let Some(number_col) = &number_col {
        for row in rows.iter_mut() {
            let resolvable = match row.get(COL_CARRIER) {
                None | Some(Cell::Null) => true,
                Some(Cell::Str(existing)) => existing == "Not Found",
                Some(_) => false,
            };
            if !resolvable {
                continue;
            }
            let digits = row
                .get(number_col)
                .map(|cell| cell.display())
                .unwrap_or_default()
                .chars()
                .filter(|c| c.is_ascii_digit())
                .collect::<String>();
            if digits.len() < 3 {
                continue;
            }
            let value = match reference::carrier_for_area_code(&digits[..3]) {
                Some(name) => {
                    matched += 1;
                    name
                }
                None => "Unknown Carrier",
            };
            row.insert(COL_CARRIER.to_string(), Cell::Str(value.to_string()));
            filled += 1;
        }
    }
    ensure_columns(&mut rows, &[COL_CARRIER]);

    let message = format!(
        "Carrier lookup filled {filled} row(s) ({matched} matched a known area code)"
    );
    EnrichmentResult {
        rows,
        added_columns: vec![COL_CARRIER.to_string()],
        enriched_count: matched,
        message,
    }
}

/// State-centroid geocoding. Latitude/Longitude are written on every row,
/// null when the state is unmatched.
pub fn geocode(mut rows: Vec<Row>) -> EnrichmentResult {
    let state_col = find_column(&rows, STATE_COLUMNS);
    debug!("geocode pass using state column {state_col:?}");

    let mut matched = 0usize;
    for row in rows.iter_mut() {
        let coords = state_of(row, state_col.as_deref())
            .and_then(|state| reference::coords_for_state(&state));
        let (lat, lon) = match coords {
            Some((lat, lon)) => {
                matched += 1;
                (Cell::Num(lat), Cell::Num(lon))
            }
            None => (Cell::Null, Cell::Null),
        };
        row.insert(COL_LATITUDE.to_string(), lat);
        row.insert(COL_LONGITUDE.to_string(), lon);
    }

    EnrichmentResult {
        message: format!("Geocoded {matched} of {} row(s) by state", rows.len()),
        rows,
        added_columns: vec![COL_LATITUDE.to_string(), COL_LONGITUDE.to_string()],
        enriched_count: matched,
    }
}

/// State to IANA timezone, same null-stability rule as geocoding.
pub fn timezone(mut rows: Vec<Row>) -> EnrichmentResult {
    let state_col = find_column(&rows, STATE_COLUMNS);
    let mut matched = 0usize;
    for row in rows.iter_mut() {
        let tz = state_of(row, state_col.as_deref())
            .and_then(|state| reference::timezone_for_state(&state));
        let cell = match tz {
            Some(tz) => {
                matched += 1;
                Cell::Str(tz.to_string())
            }
            None => Cell::Null,
        };
        row.insert(COL_TIMEZONE.to_string(), cell);
    }

    EnrichmentResult {
        message: format!("Resolved timezone for {matched} of {} row(s)", rows.len()),
        rows,
        added_columns: vec![COL_TIMEZONE.to_string()],
        enriched_count: matched,
    }
}

/// California property-tax enrichment from BOE reference data. Rows outside
/// CA get the same four columns, all null, for schema stability.
pub fn property_tax(mut rows: Vec<Row>, boe: &BoeData) -> EnrichmentResult {
    let state_col = find_column(&rows, STATE_COLUMNS);
    let city_col = find_column(&rows, CITY_COLUMNS);

    let mut matched = 0usize;
    for row in rows.iter_mut() {
        let mut county = Cell::Null;
        let mut rate = Cell::Null;
        let mut assessed = Cell::Null;
        let mut year = Cell::Null;

        let in_california = state_of(row, state_col.as_deref()).as_deref() == Some("CA");
        if in_california {
            let city = city_col
                .as_deref()
                .and_then(|col| row.get(col))
                .and_then(Cell::as_str)
                .map(|s| s.trim().to_uppercase());
            if let Some(valuation) = city.as_deref().and_then(|c| boe.county_for_city(c)) {
                matched += 1;
                county = Cell::Str(valuation.county.clone());
                if let Some(value) = valuation.assessed_value {
                    assessed = Cell::Num(value);
                }
                if let Some(roll_year) = &valuation.roll_year {
                    year = Cell::Str(roll_year.clone());
                }
                if let Some(county_rate) = boe.tax_rate_for_county(&valuation.county) {
                    rate = Cell::Num(county_rate);
                }
            }
        }

        row.insert(COL_COUNTY.to_string(), county);
        row.insert(COL_TAX_RATE.to_string(), rate);
        row.insert(COL_ASSESSED_VALUE.to_string(), assessed);
        row.insert(COL_TAX_DATA_YEAR.to_string(), year);
    }

    EnrichmentResult {
        message: format!(
            "Resolved property tax data for {matched} of {} row(s)",
            rows.len()
        ),
        rows,
        added_columns: vec![
            COL_COUNTY.to_string(),
            COL_TAX_RATE.to_string(),
            COL_ASSESSED_VALUE.to_string(),
            COL_TAX_DATA_YEAR.to_string(),
        ],
        enriched_count: matched,
    }
}

/// Deterministic property-lookup URLs: an address search link for any row
/// with a usable address, and a county assessor link for CA rows whose
/// county is already resolved.
pub fn property_links(mut rows: Vec<Row>) -> EnrichmentResult {
    let state_col = find_column(&rows, STATE_COLUMNS);
    let address_col = find_column(&rows, ADDRESS_COLUMNS);

    let mut linked = 0usize;
    for row in rows.iter_mut() {
        let mut search = Cell::Null;
        let mut assessor = Cell::Null;

        let address = address_col
            .as_deref()
            .and_then(|col| row.get(col))
            .and_then(Cell::as_str)
            .map(str::trim)
            .filter(|a| !a.is_empty() && !is_placeholder_address(a))
            .map(str::to_string);
        if let Some(address) = address {
            if let Some(url) = address_search_url(&address) {
                search = Cell::Str(url);
                linked += 1;
            }
        }

        if state_of(row, state_col.as_deref()).as_deref() == Some("CA") {
            let county = row
                .get(COL_COUNTY)
                .and_then(Cell::as_str)
                .map(|c| c.trim().to_uppercase());
            if let Some(url) =
                county.as_deref().and_then(reference::assessor_url_for_county)
            {
                assessor = Cell::Str(url.to_string());
            }
        }

        row.insert(COL_SEARCH_URL.to_string(), search);
        row.insert(COL_ASSESSOR_URL.to_string(), assessor);
    }

    EnrichmentResult {
        message: format!(
            "Built property links for {linked} of {} row(s)",
            rows.len()
        ),
        rows,
        added_columns: vec![COL_SEARCH_URL.to_string(), COL_ASSESSOR_URL.to_string()],
        enriched_count: linked,
    }
}

fn is_placeholder_address(address: &str) -> bool {
    let lowered = address.to_lowercase();
    ADDRESS_PLACEHOLDERS.iter().any(|p| *p == lowered)
}

fn address_search_url(address: &str) -> Option<String> {
    Url::parse_with_params(
        "https://www.google.com/search",
        &[("q", format!("{address} property records"))],
    )
    .ok()
    .map(|url| url.to_string())
}
