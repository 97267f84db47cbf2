//! Externally fetched California BOE reference data with a 24-hour cache.
//!
//! Two paginated fetches (latest-year city valuations, latest-year county tax
//! allocations) build two uppercase-keyed maps, keeping the first record seen
//! per key; records arrive newest fiscal year first. The result is held in
//! memory and snapshotted to disk so the TTL survives short-lived processes.
//!
//! When a refresh fails and a prior cache exists, the stale copy is served
//! and a warning logged; with no prior cache the fetch error propagates to
//! the one enrichment call that needed the data.

use std::{collections::HashMap, fs, path::PathBuf, time::Duration};

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::{config::BoeConfig, error::CoreError};

const CACHE_TTL_HOURS: i64 = 24;

pub const SNAPSHOT_FILE: &str = "boe_cache.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CityValuation {
    pub county: String,
    pub assessed_value: Option<f64>,
    pub roll_year: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoeData {
    /// Uppercased city name to its county valuation record.
    pub cities: HashMap<String, CityValuation>,
    /// Uppercased county name to property tax rate.
    pub county_tax_rates: HashMap<String, f64>,
    pub fetched_at: DateTime<Utc>,
}

impl BoeData {
    pub fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        now - self.fetched_at < chrono::Duration::hours(CACHE_TTL_HOURS)
    }

    /// County for an uppercased city name.
    pub fn county_for_city(&self, city_upper: &str) -> Option<&CityValuation> {
        self.cities.get(city_upper)
    }

    pub fn tax_rate_for_county(&self, county_upper: &str) -> Option<f64> {
        self.county_tax_rates.get(county_upper).copied()
    }
}

#[derive(Debug, Default)]
pub struct BoeCache {
    data: Option<BoeData>,
    snapshot_path: Option<PathBuf>,
}

impl BoeCache {
    pub fn new(snapshot_path: PathBuf) -> Self {
        BoeCache {
            data: None,
            snapshot_path: Some(snapshot_path),
        }
    }

    /// Test and offline seam: adopt pre-built data as the current cache.
    pub fn seed(&mut self, data: BoeData) {
        self.data = Some(data);
    }

    pub fn get(&mut self, config: &BoeConfig) -> Result<&BoeData> {
        let now = Utc::now();
        let fresh_in_memory = self.data.as_ref().map_or(false, |d| d.is_fresh(now));

        if !fresh_in_memory {
            if self.data.is_none() {
                self.data = self.load_snapshot();
            }
            let fresh_from_disk = self.data.as_ref().map_or(false, |d| d.is_fresh(now));
            if !fresh_from_disk {
                match fetch_remote(config) {
                    Ok(data) => {
                        self.write_snapshot(&data);
                        self.data = Some(data);
                    }
                    Err(err) => {
                        if self.data.is_some() {
                            // Documented choice: stale reference data beats
                            // failing the request when we have any at all.
                            warn!("BOE refresh failed ({err}); serving stale cache");
                        } else {
                            return Err(CoreError::ExternalFetch(err.to_string()).into());
                        }
                    }
                }
            }
        }

        self.data
            .as_ref()
            .ok_or_else(|| anyhow!("BOE cache unexpectedly empty"))
    }

    fn load_snapshot(&self) -> Option<BoeData> {
        let path = self.snapshot_path.as_ref()?;
        let raw = fs::read_to_string(path).ok()?;
        match serde_json::from_str::<BoeData>(&raw) {
            Ok(data) => Some(data),
            Err(err) => {
                warn!("Ignoring unreadable BOE snapshot {path:?}: {err}");
                None
            }
        }
    }

    fn write_snapshot(&self, data: &BoeData) {
        let Some(path) = self.snapshot_path.as_ref() else {
            return;
        };
        match serde_json::to_string_pretty(data) {
            Ok(serialized) => {
                if let Err(err) = fs::write(path, serialized) {
                    warn!("Failed to write BOE snapshot {path:?}: {err}");
                }
            }
            Err(err) => warn!("Failed to serialize BOE snapshot: {err}"),
        }
    }
}

#[derive(Debug, Deserialize)]
struct CityRecord {
    city: Option<String>,
    county: Option<String>,
    #[serde(alias = "assessed_value")]
    net_total: Option<String>,
    #[serde(alias = "roll_year")]
    fiscal_year: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CountyRecord {
    county: Option<String>,
    #[serde(alias = "rate")]
    tax_rate: Option<String>,
}

fn fetch_remote(config: &BoeConfig) -> Result<BoeData> {
    let client = reqwest::blocking::Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()
        .context("Building BOE HTTP client")?;

    let mut cities: HashMap<String, CityValuation> = HashMap::new();
    for record in fetch_pages::<CityRecord>(&client, &config.city_endpoint, config.page_size)? {
        let (Some(city), Some(county)) = (record.city, record.county) else {
            continue;
        };
        // Newest year arrives first; keep it.
        cities
            .entry(city.trim().to_uppercase())
            .or_insert_with(|| CityValuation {
                county: county.trim().to_uppercase(),
                assessed_value: record.net_total.and_then(|v| v.trim().parse::<f64>().ok()),
                roll_year: record.fiscal_year,
            });
    }

    let mut county_tax_rates: HashMap<String, f64> = HashMap::new();
    for record in fetch_pages::<CountyRecord>(&client, &config.county_endpoint, config.page_size)? {
        let (Some(county), Some(rate)) = (record.county, record.tax_rate) else {
            continue;
        };
        if let Ok(rate) = rate.trim().parse::<f64>() {
            county_tax_rates
                .entry(county.trim().to_uppercase())
                .or_insert(rate);
        }
    }

    info!(
        "Fetched BOE reference data: {} cities, {} county rates",
        cities.len(),
        county_tax_rates.len()
    );
    Ok(BoeData {
        cities,
        county_tax_rates,
        fetched_at: Utc::now(),
    })
}

fn fetch_pages<T: serde::de::DeserializeOwned>(
    client: &reqwest::blocking::Client,
    endpoint: &str,
    page_size: usize,
) -> Result<Vec<T>> {
    let mut records = Vec::new();
    let mut offset = 0usize;
    loop {
        let response = client
            .get(endpoint)
            .query(&[
                ("$limit", page_size.to_string()),
                ("$offset", offset.to_string()),
                ("$order", "fiscal_year DESC".to_string()),
            ])
            .send()
            .with_context(|| format!("Requesting {endpoint}"))?
            .error_for_status()
            .with_context(|| format!("Requesting {endpoint}"))?;
        let page: Vec<T> = response
            .json()
            .with_context(|| format!("Decoding response from {endpoint}"))?;
        let page_len = page.len();
        records.extend(page);
        if page_len < page_size {
            return Ok(records);
        }
        offset += page_size;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn sample_data(age_hours: i64) -> BoeData {
        let mut cities = HashMap::new();
        cities.insert(
            "FRESNO".to_string(),
            CityValuation {
                county: "FRESNO".to_string(),
                assessed_value: Some(1_000_000.0),
                roll_year: Some("2025".to_string()),
            },
        );
        let mut county_tax_rates = HashMap::new();
        county_tax_rates.insert("FRESNO".to_string(), 0.0125);
        BoeData {
            cities,
            county_tax_rates,
            fetched_at: Utc::now() - chrono::Duration::hours(age_hours),
        }
    }

    #[test]
    fn freshness_window_is_24_hours() {
        assert!(sample_data(1).is_fresh(Utc::now()));
        assert!(!sample_data(25).is_fresh(Utc::now()));
    }

    #[test]
    fn seeded_data_is_served_without_fetching() {
        let mut cache = BoeCache::default();
        cache.seed(sample_data(1));
        let config = crate::config::BoeConfig::default();
        let data = cache.get(&config).unwrap();
        assert_eq!(data.tax_rate_for_county("FRESNO"), Some(0.0125));
    }

    #[test]
    fn fresh_disk_snapshot_avoids_a_fetch() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(SNAPSHOT_FILE);
        fs::write(&path, serde_json::to_string(&sample_data(2)).unwrap()).unwrap();

        let mut cache = BoeCache::new(path);
        // Unroutable endpoint: passing means the snapshot was used.
        let config = crate::config::BoeConfig {
            city_endpoint: "http://127.0.0.1:1/cities.json".to_string(),
            county_endpoint: "http://127.0.0.1:1/counties.json".to_string(),
            timeout_secs: 1,
            page_size: 10,
        };
        let data = cache.get(&config).unwrap();
        assert!(data.county_for_city("FRESNO").is_some());
    }

    #[test]
    fn stale_snapshot_is_served_when_refresh_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(SNAPSHOT_FILE);
        fs::write(&path, serde_json::to_string(&sample_data(48)).unwrap()).unwrap();

        let mut cache = BoeCache::new(path);
        let config = crate::config::BoeConfig {
            city_endpoint: "http://127.0.0.1:1/cities.json".to_string(),
            county_endpoint: "http://127.0.0.1:1/counties.json".to_string(),
            timeout_secs: 1,
            page_size: 10,
        };
        let data = cache.get(&config).unwrap();
        assert_eq!(data.tax_rate_for_county("FRESNO"), Some(0.0125));
    }

    #[test]
    fn fetch_failure_with_no_cache_is_an_error() {
        let mut cache = BoeCache::default();
        let config = crate::config::BoeConfig {
            city_endpoint: "http://127.0.0.1:1/cities.json".to_string(),
            county_endpoint: "http://127.0.0.1:1/counties.json".to_string(),
            timeout_secs: 1,
            page_size: 10,
        };
        assert!(cache.get(&config).is_err());
    }
}
