//! Fixed in-memory lookup tables used by enrichment passes.
//!
//! Exact-match lookups only; no invariants beyond that. The externally
//! fetched city/county reference lives in `boe`, not here.

/// North American area code to carrier assignment.
pub const AREA_CODE_CARRIERS: &[(&str, &str)] = &[
    ("201", "Verizon"),
    ("202", "Verizon"),
    ("203", "AT&T"),
    ("205", "AT&T"),
    ("206", "T-Mobile"),
    ("209", "AT&T"),
    ("212", "Verizon"),
    ("213", "AT&T"),
    ("214", "AT&T"),
    ("215", "Verizon"),
    ("216", "AT&T"),
    ("239", "Verizon"),
    ("248", "T-Mobile"),
    ("253", "T-Mobile"),
    ("267", "Verizon"),
    ("303", "CenturyLink"),
    ("305", "AT&T"),
    ("310", "T-Mobile"),
    ("312", "AT&T"),
    ("314", "Charter"),
    ("323", "AT&T"),
    ("330", "AT&T"),
    ("347", "Verizon"),
    ("404", "AT&T"),
    ("408", "AT&T"),
    ("410", "Verizon"),
    ("412", "Verizon"),
    ("415", "AT&T"),
    ("425", "T-Mobile"),
    ("442", "Frontier"),
    ("469", "AT&T"),
    ("480", "Cox"),
    ("503", "CenturyLink"),
    ("510", "AT&T"),
    ("512", "AT&T"),
    ("530", "Frontier"),
    ("555", "Reserved"),
    ("559", "AT&T"),
    ("602", "Cox"),
    ("608", "Charter"),
    ("612", "CenturyLink"),
    ("617", "Verizon"),
    ("619", "AT&T"),
    ("626", "Frontier"),
    ("650", "AT&T"),
    ("661", "Frontier"),
    ("702", "CenturyLink"),
    ("707", "AT&T"),
    ("713", "AT&T"),
    ("714", "AT&T"),
    ("716", "Verizon"),
    ("718", "Verizon"),
    ("719", "CenturyLink"),
    ("720", "CenturyLink"),
    ("747", "T-Mobile"),
    ("760", "Frontier"),
    ("773", "AT&T"),
    ("805", "Frontier"),
    ("818", "AT&T"),
    ("831", "AT&T"),
    ("845", "Verizon"),
    ("858", "AT&T"),
    ("909", "Frontier"),
    ("916", "AT&T"),
    ("917", "Verizon"),
    ("925", "AT&T"),
    ("949", "Cox"),
    ("951", "Frontier"),
    ("971", "CenturyLink"),
];

/// Geographic centroid per US state / district code.
pub const STATE_COORDS: &[(&str, f64, f64)] = &[
    ("AK", 61.370716, -152.404419),
    ("AL", 32.806671, -86.791130),
    ("AR", 34.969704, -92.373123),
    ("AZ", 33.729759, -111.431221),
    ("CA", 36.116203, -119.681564),
    ("CO", 39.059811, -105.311104),
    ("CT", 41.597782, -72.755371),
    ("DC", 38.897438, -77.026817),
    ("DE", 39.318523, -75.507141),
    ("FL", 27.766279, -81.686783),
    ("GA", 33.040619, -83.643074),
    ("HI", 21.094318, -157.498337),
    ("IA", 42.011539, -93.210526),
    ("ID", 44.240459, -114.478828),
    ("IL", 40.349457, -88.986137),
    ("IN", 39.849426, -86.258278),
    ("KS", 38.526600, -96.726486),
    ("KY", 37.668140, -84.670067),
    ("LA", 31.169546, -91.867805),
    ("MA", 42.230171, -71.530106),
    ("MD", 39.063946, -76.802101),
    ("ME", 44.693947, -69.381927),
    ("MI", 43.326618, -84.536095),
    ("MN", 45.694454, -93.900192),
    ("MO", 38.456085, -92.288368),
    ("MS", 32.741646, -89.678696),
    ("MT", 46.921925, -110.454353),
    ("NC", 35.630066, -79.806419),
    ("ND", 47.528912, -99.784012),
    ("NE", 41.125370, -98.268082),
    ("NH", 43.452492, -71.563896),
    ("NJ", 40.298904, -74.521011),
    ("NM", 34.840515, -106.248482),
    ("NV", 38.313515, -117.055374),
    ("NY", 42.165726, -74.948051),
    ("OH", 40.388783, -82.764915),
    ("OK", 35.565342, -96.928917),
    ("OR", 44.572021, -122.070938),
    ("PA", 40.590752, -77.209755),
    ("RI", 41.680893, -71.511780),
    ("SC", 33.856892, -80.945007),
    ("SD", 44.299782, -99.438828),
    ("TN", 35.747845, -86.692345),
    ("TX", 31.054487, -97.563461),
    ("UT", 40.150032, -111.862434),
    ("VA", 37.769337, -78.169968),
    ("VT", 44.045876, -72.710686),
    ("WA", 47.400902, -121.490494),
    ("WI", 44.268543, -89.616508),
    ("WV", 38.491226, -80.954453),
    ("WY", 42.755966, -107.302490),
];

/// Primary IANA timezone per US state / district code.
pub const STATE_TIMEZONES: &[(&str, &str)] = &[
    ("AK", "America/Anchorage"),
    ("AL", "America/Chicago"),
    ("AR", "America/Chicago"),
    ("AZ", "America/Phoenix"),
    ("CA", "America/Los_Angeles"),
    ("CO", "America/Denver"),
    ("CT", "America/New_York"),
    ("DC", "America/New_York"),
    ("DE", "America/New_York"),
    ("FL", "America/New_York"),
    ("GA", "America/New_York"),
    ("HI", "Pacific/Honolulu"),
    ("IA", "America/Chicago"),
    ("ID", "America/Boise"),
    ("IL", "America/Chicago"),
    ("IN", "America/Indiana/Indianapolis"),
    ("KS", "America/Chicago"),
    ("KY", "America/New_York"),
    ("LA", "America/Chicago"),
    ("MA", "America/New_York"),
    ("MD", "America/New_York"),
    ("ME", "America/New_York"),
    ("MI", "America/Detroit"),
    ("MN", "America/Chicago"),
    ("MO", "America/Chicago"),
    ("MS", "America/Chicago"),
    ("MT", "America/Denver"),
    ("NC", "America/New_York"),
    ("ND", "America/Chicago"),
    ("NE", "America/Chicago"),
    ("NH", "America/New_York"),
    ("NJ", "America/New_York"),
    ("NM", "America/Denver"),
    ("NV", "America/Los_Angeles"),
    ("NY", "America/New_York"),
    ("OH", "America/New_York"),
    ("OK", "America/Chicago"),
    ("OR", "America/Los_Angeles"),
    ("PA", "America/New_York"),
    ("RI", "America/New_York"),
    ("SC", "America/New_York"),
    ("SD", "America/Chicago"),
    ("TN", "America/Chicago"),
    ("TX", "America/Chicago"),
    ("UT", "America/Denver"),
    ("VA", "America/New_York"),
    ("VT", "America/New_York"),
    ("WA", "America/Los_Angeles"),
    ("WI", "America/Chicago"),
    ("WV", "America/New_York"),
    ("WY", "America/Denver"),
];

/// Assessor office URL per California county (uppercase county name key).
pub const CA_COUNTY_ASSESSORS: &[(&str, &str)] = &[
    ("ALAMEDA", "https://www.acassessor.org/"),
    ("CONTRA COSTA", "https://www.contracosta.ca.gov/191/Assessor"),
    ("FRESNO", "https://www.fresnocountyca.gov/Departments/Assessor"),
    ("KERN", "https://www.kcttc.co.kern.ca.us/assessor"),
    ("LOS ANGELES", "https://assessor.lacounty.gov/"),
    ("ORANGE", "https://www.ocassessor.gov/"),
    ("RIVERSIDE", "https://www.asrclkrec.com/"),
    ("SACRAMENTO", "https://assessor.saccounty.gov/"),
    ("SAN BERNARDINO", "https://arc.sbcounty.gov/assessor/"),
    ("SAN DIEGO", "https://www.sdarcc.gov/"),
    ("SAN FRANCISCO", "https://www.sfassessor.org/"),
    ("SAN JOAQUIN", "https://www.sjgov.org/department/assessor"),
    ("SANTA CLARA", "https://www.sccassessor.org/"),
    ("VENTURA", "https://assessor.countyofventura.org/"),
];

pub fn carrier_for_area_code(code: &str) -> Option<&'static str> {
    AREA_CODE_CARRIERS
        .iter()
        .find(|(area, _)| *area == code)
        .map(|(_, carrier)| *carrier)
}

pub fn coords_for_state(code: &str) -> Option<(f64, f64)> {
    STATE_COORDS
        .iter()
        .find(|(state, _, _)| *state == code)
        .map(|(_, lat, lon)| (*lat, *lon))
}

pub fn timezone_for_state(code: &str) -> Option<&'static str> {
    STATE_TIMEZONES
        .iter()
        .find(|(state, _)| *state == code)
        .map(|(_, tz)| *tz)
}

pub fn assessor_url_for_county(county_upper: &str) -> Option<&'static str> {
    CA_COUNTY_ASSESSORS
        .iter()
        .find(|(county, _)| *county == county_upper)
        .map(|(_, url)| *url)
}
