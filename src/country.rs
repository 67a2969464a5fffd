// =====================================================================================
// File: src/country.rs
// Description: CountryResolver interface and memoizing cache (§4.B)
// Author: arkSong (arksong2018@gmail.com)
// =====================================================================================

use crate::config::CountryCacheConfig;
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing::{error, warn};

/// Reverse-geocodes coordinates into an ISO-3166 alpha-2 country code.
///
/// Implementations MUST NOT let a remote-lookup failure escape: on timeout
/// or parse failure they return `None` and the calling rule degrades
/// gracefully (§4.B, §7 degraded-operation conditions).
#[async_trait]
pub trait CountryResolver: Send + Sync {
    async fn resolve_country(&self, lat: &str, lon: &str) -> Option<String>;
}

/// A resolver that never resolves anything; useful as a default/fallback
/// when no real geocoding collaborator is wired in.
pub struct UnresolvedCountryResolver;

#[async_trait]
impl CountryResolver for UnresolvedCountryResolver {
    async fn resolve_country(&self, _lat: &str, _lon: &str) -> Option<String> {
        None
    }
}

#[derive(Deserialize)]
struct NominatimAddress {
    #[serde(rename = "country_code")]
    country_code: Option<String>,
}

#[derive(Deserialize)]
struct NominatimResponse {
    address: Option<NominatimAddress>,
}

/// Reverse-geocodes through a Nominatim-compatible HTTP endpoint. Degrades to
/// `None` on any transport, status, or parse failure rather than propagating
/// (§4.B: a resolver must never let a remote failure escape).
pub struct HttpCountryResolver {
    client: reqwest::Client,
    base_url: String,
}

impl HttpCountryResolver {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(5))
                .build()
                .unwrap_or_default(),
            base_url: base_url.into(),
        }
    }
}

impl Default for HttpCountryResolver {
    fn default() -> Self {
        Self::new("https://nominatim.openstreetmap.org")
    }
}

#[async_trait]
impl CountryResolver for HttpCountryResolver {
    async fn resolve_country(&self, lat: &str, lon: &str) -> Option<String> {
        let url = format!("{}/reverse?lat={lat}&lon={lon}&format=jsonv2", self.base_url);
        let response = match self.client.get(&url).send().await {
            Ok(resp) => resp,
            Err(e) => {
                warn!(lat, lon, error = %e, "country resolution request failed");
                return None;
            }
        };

        if !response.status().is_success() {
            warn!(lat, lon, status = %response.status(), "country resolution returned non-success status");
            return None;
        }

        match response.json::<NominatimResponse>().await {
            Ok(body) => body
                .address
                .and_then(|a| a.country_code)
                .map(|c| c.to_uppercase()),
            Err(e) => {
                error!(lat, lon, error = %e, "country resolution response failed to parse");
                None
            }
        }
    }
}

struct CacheEntry {
    country: Option<String>,
    inserted_at: Instant,
}

/// Per-process memoization layer in front of a [`CountryResolver`].
///
/// Keys on `"lat:lon"` exactly as received (the 6-decimal-precision strings
/// stored on a transaction), bounded by insertion-order eviction at
/// `max_entries` and a write-age TTL (§4.B).
pub struct CachingCountryResolver<R: CountryResolver> {
    inner: R,
    config: CountryCacheConfig,
    cache: Mutex<CacheState>,
}

#[derive(Default)]
struct CacheState {
    entries: HashMap<String, CacheEntry>,
    insertion_order: std::collections::VecDeque<String>,
}

impl<R: CountryResolver> CachingCountryResolver<R> {
    pub fn new(inner: R, config: CountryCacheConfig) -> Self {
        Self {
            inner,
            config,
            cache: Mutex::new(CacheState::default()),
        }
    }

    pub fn cache_len(&self) -> usize {
        self.cache.lock().unwrap().entries.len()
    }

    fn key(lat: &str, lon: &str) -> String {
        format!("{lat}:{lon}")
    }

    fn cached(&self, key: &str) -> Option<Option<String>> {
        let state = self.cache.lock().unwrap();
        state.entries.get(key).and_then(|e| {
            if e.inserted_at.elapsed() < self.config.write_age {
                Some(e.country.clone())
            } else {
                None
            }
        })
    }

    fn insert(&self, key: String, country: Option<String>) {
        let mut state = self.cache.lock().unwrap();
        if !state.entries.contains_key(&key) {
            state.insertion_order.push_back(key.clone());
        }
        state.entries.insert(
            key,
            CacheEntry {
                country,
                inserted_at: Instant::now(),
            },
        );
        while state.entries.len() > self.config.max_entries {
            if let Some(oldest) = state.insertion_order.pop_front() {
                state.entries.remove(&oldest);
            } else {
                break;
            }
        }
    }
}

#[async_trait]
impl<R: CountryResolver> CountryResolver for CachingCountryResolver<R> {
    async fn resolve_country(&self, lat: &str, lon: &str) -> Option<String> {
        let key = Self::key(lat, lon);
        if let Some(hit) = self.cached(&key) {
            return hit;
        }

        let timeout = self.config.timeout;
        let resolved = match tokio::time::timeout(timeout, self.inner.resolve_country(lat, lon)).await {
            Ok(country) => country,
            Err(_) => {
                warn!(lat, lon, "country resolution timed out, degrading to unresolved");
                None
            }
        };

        self.insert(key, resolved.clone());
        resolved
    }
}
