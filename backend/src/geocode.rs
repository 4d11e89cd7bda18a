use std::{
    num::NonZeroUsize,
    sync::Mutex,
    time::{Duration, Instant},
};

use lru::LruCache;

use crate::error::AppError;
use crate::models::{GeocodeRequest, GeocodeResponse};
use crate::provider::{GeocodeQuery, MapsProvider};

impl TryFrom<GeocodeRequest> for GeocodeQuery {
    type Error = AppError;

    fn try_from(req: GeocodeRequest) -> Result<Self, Self::Error> {
        let address = req.address.filter(|address| !address.trim().is_empty());
        match (address, req.lat, req.lng) {
            (Some(address), _, _) => Ok(GeocodeQuery::Address(address)),
            (None, Some(lat), Some(lng)) => Ok(GeocodeQuery::Location { lat, lng }),
            _ => Err(AppError::BadRequest(
                "Provide either 'address' or both 'lat' and 'lng'".to_string(),
            )),
        }
    }
}

/// Bounded geocoding cache whose entries expire after a fixed time to live.
pub struct GeocodeCache {
    entries: Mutex<LruCache<String, (Instant, GeocodeResponse)>>,
    ttl: Duration,
}

impl GeocodeCache {
    pub const DEFAULT_CAPACITY: usize = 1000;
    pub const DEFAULT_TTL: Duration = Duration::from_secs(3600);

    pub fn new(capacity: NonZeroUsize, ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
            ttl,
        }
    }

    pub fn get(&self, key: &str) -> Option<GeocodeResponse> {
        self.get_at(key, Instant::now())
    }

    pub fn insert(&self, key: String, value: GeocodeResponse) {
        self.insert_at(key, value, Instant::now());
    }

    fn get_at(&self, key: &str, now: Instant) -> Option<GeocodeResponse> {
        let mut entries = self.entries.lock().ok()?;
        let expired = match entries.get(key) {
            Some((stored_at, value)) if now.duration_since(*stored_at) < self.ttl => {
                return Some(value.clone());
            }
            Some(_) => true,
            None => false,
        };
        if expired {
            entries.pop(key);
        }
        None
    }

    fn insert_at(&self, key: String, value: GeocodeResponse, now: Instant) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.put(key, (now, value));
        }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|entries| entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for GeocodeCache {
    fn default() -> Self {
        Self::new(
            NonZeroUsize::new(Self::DEFAULT_CAPACITY).unwrap_or(NonZeroUsize::MIN),
            Self::DEFAULT_TTL,
        )
    }
}

/// Cached geocoding: answers from the cache when possible, otherwise asks the
/// provider and remembers successful results.
pub async fn geocode(
    provider: &dyn MapsProvider,
    cache: &GeocodeCache,
    query: GeocodeQuery,
) -> Result<GeocodeResponse, AppError> {
    let key = query.cache_key();
    if let Some(hit) = cache.get(&key) {
        tracing::debug!("geocode cache hit for {key}");
        return Ok(hit);
    }

    tracing::debug!("geocode cache miss for {key}");
    let result = provider.geocode(&query).await?;
    cache.insert(key, result.clone());
    Ok(result)
}
