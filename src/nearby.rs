//! Nearby-city selection
//!
//! Given a query coordinate, picks a spaced-out set of cities around it:
//! cities between the near-exclusion distance and the search radius are
//! annotated with a best-effort temperature, then accepted nearest-first as
//! long as they keep the minimum separation from every city already chosen.

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::dataset::CityTable;
use crate::error::WeatherWiseError;
use crate::geo;
use crate::models::{CityRecord, Coordinate, NearbyCity};

/// Source of live temperatures for arbitrary coordinates.
///
/// Absence is a normal outcome: implementations return `None` on any failure.
#[async_trait]
pub trait TemperatureLookup: Send + Sync {
    async fn temperature(&self, coordinate: Coordinate) -> Option<f64>;
}

#[async_trait]
impl<F> TemperatureLookup for F
where
    F: Fn(Coordinate) -> Option<f64> + Send + Sync,
{
    async fn temperature(&self, coordinate: Coordinate) -> Option<f64> {
        self(coordinate)
    }
}

/// Bounds for one nearby-city query
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SelectionParams {
    /// Farthest distance considered, inclusive
    pub radius_km: f64,
    /// Minimum distance between any two selected cities
    pub min_separation_km: f64,
    /// Cities at or closer than this are treated as the query city itself
    pub near_exclusion_km: f64,
    pub max_results: usize,
}

impl Default for SelectionParams {
    fn default() -> Self {
        Self {
            radius_km: 200.0,
            min_separation_km: 30.0,
            near_exclusion_km: 40.0,
            max_results: 6,
        }
    }
}

impl SelectionParams {
    pub fn validate(&self) -> crate::Result<()> {
        let bounds = [
            ("radius", self.radius_km),
            ("minimum separation", self.min_separation_km),
            ("near-exclusion", self.near_exclusion_km),
        ];
        for (name, value) in bounds {
            if !value.is_finite() || value < 0.0 {
                return Err(WeatherWiseError::validation(format!(
                    "{name} distance must be a non-negative number of km, got {value}"
                )));
            }
        }
        if self.near_exclusion_km >= self.radius_km {
            return Err(WeatherWiseError::validation(format!(
                "near-exclusion distance ({} km) must be smaller than the radius ({} km)",
                self.near_exclusion_km, self.radius_km
            )));
        }
        if self.max_results == 0 {
            return Err(WeatherWiseError::validation(
                "at least one nearby city must be requested",
            ));
        }
        Ok(())
    }
}

/// Cities whose distance from `query` lies in `(near_exclusion_km, radius_km]`,
/// sorted nearest first. Equal distances keep dataset order.
#[must_use]
pub fn filter_candidates(
    query: Coordinate,
    cities: &[CityRecord],
    params: &SelectionParams,
) -> Vec<NearbyCity> {
    let mut candidates: Vec<NearbyCity> = cities
        .iter()
        .filter_map(|city| {
            let distance = geo::distance_km(query, city.coordinate);
            (distance > params.near_exclusion_km && distance <= params.radius_km)
                .then(|| NearbyCity::new(city, distance))
        })
        .collect();
    // sort_by is stable
    candidates.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
    candidates
}

/// Greedy spaced selection over candidates sorted nearest first.
///
/// A candidate is accepted when it is at least `min_separation_km` from every
/// city accepted before it. Order-dependent and not globally optimal, but
/// deterministic for a given input order.
#[must_use]
pub fn select_spaced(
    candidates: Vec<NearbyCity>,
    min_separation_km: f64,
    max_results: usize,
) -> Vec<NearbyCity> {
    let mut selected: Vec<NearbyCity> = Vec::with_capacity(max_results.min(candidates.len()));
    let mut used: Vec<Coordinate> = Vec::with_capacity(selected.capacity());

    for candidate in candidates {
        if selected.len() >= max_results {
            break;
        }
        let spaced = geo::min_distance_km(candidate.coordinate, &used)
            .is_none_or(|closest| closest >= min_separation_km);
        if spaced {
            used.push(candidate.coordinate);
            selected.push(candidate);
        } else {
            debug!("Skipping {}: too close to an already selected city", candidate.name);
        }
    }
    selected
}

/// Selects spaced nearby cities and annotates them with live temperatures
pub struct NearbySelector<L> {
    table: Arc<CityTable>,
    lookup: L,
    params: SelectionParams,
    lookup_timeout: Duration,
    max_concurrent_lookups: usize,
}

impl<L: TemperatureLookup> NearbySelector<L> {
    #[must_use]
    pub fn new(table: Arc<CityTable>, lookup: L) -> Self {
        Self {
            table,
            lookup,
            params: SelectionParams::default(),
            lookup_timeout: Duration::from_secs(5),
            max_concurrent_lookups: 8,
        }
    }

    #[must_use]
    pub fn with_params(mut self, params: SelectionParams) -> Self {
        self.params = params;
        self
    }

    #[must_use]
    pub fn with_lookup_timeout(mut self, timeout: Duration) -> Self {
        self.lookup_timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_max_concurrent_lookups(mut self, limit: usize) -> Self {
        self.max_concurrent_lookups = limit.max(1);
        self
    }

    #[must_use]
    pub fn params(&self) -> &SelectionParams {
        &self.params
    }

    /// Spaced nearby cities around `query`, nearest first, using the
    /// configured parameters. Never fails: an empty table or no city in
    /// range gives an empty list.
    pub async fn select_nearby(&self, query: Coordinate) -> Vec<NearbyCity> {
        self.select_nearby_with(query, &self.params).await
    }

    /// Same as [`Self::select_nearby`] with per-call parameters
    #[tracing::instrument(name = "select_nearby", level = "debug", skip(self, params))]
    pub async fn select_nearby_with(
        &self,
        query: Coordinate,
        params: &SelectionParams,
    ) -> Vec<NearbyCity> {
        if self.table.is_empty() {
            debug!("City table is empty, no nearby cities");
            return Vec::new();
        }

        let candidates = filter_candidates(query, self.table.cities(), params);
        debug!(
            "{} of {} cities within ({}, {}] km",
            candidates.len(),
            self.table.len(),
            params.near_exclusion_km,
            params.radius_km
        );

        let candidates = self.annotate_temperatures(candidates).await;
        let selected = select_spaced(candidates, params.min_separation_km, params.max_results);

        info!(
            "Selected {} nearby cities around {}",
            selected.len(),
            query.format_coordinates()
        );
        selected
    }

    /// Look up temperatures concurrently; output keeps input order.
    async fn annotate_temperatures(&self, candidates: Vec<NearbyCity>) -> Vec<NearbyCity> {
        stream::iter(candidates)
            .map(|mut candidate| async move {
                candidate.temperature_celsius = self.lookup_with_timeout(&candidate).await;
                candidate
            })
            .buffered(self.max_concurrent_lookups)
            .collect()
            .await
    }

    async fn lookup_with_timeout(&self, candidate: &NearbyCity) -> Option<f64> {
        match tokio::time::timeout(
            self.lookup_timeout,
            self.lookup.temperature(candidate.coordinate),
        )
        .await
        {
            Ok(temperature) => {
                if temperature.is_none() {
                    debug!("No temperature available for {}", candidate.name);
                }
                temperature
            }
            Err(_) => {
                warn!(
                    "Temperature lookup for {} timed out after {:?}",
                    candidate.name, self.lookup_timeout
                );
                None
            }
        }
    }
}
