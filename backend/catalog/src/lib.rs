use std::{cmp::Ordering, fs, path::Path};

use anyhow::{Context, Error};
use reqwest::get;
use serde::{Deserialize, Serialize};

pub mod curation;
pub mod environment;
pub mod seo;
pub mod spots;

use spots::{Neighborhood, WorkSpot};

pub const CATALOG_PATH: &str = "data/spots.json";

const BUNDLED_CATALOG: &str = include_str!("../../../data/spots.json");

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct Catalog {
    pub spots: Vec<WorkSpot>,
}

/// Filters accepted by the home page listing.
#[derive(Debug, Default, Clone)]
pub struct SpotFilter {
    pub neighborhood: Option<Neighborhood>,
    pub query: Option<String>,
    pub high_speed_wifi: bool,
    pub open_late: bool,
}

/// A `slug-a-vs-slug-b` comparison after validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComparePair {
    pub left_slug: String,
    pub right_slug: String,
    pub canonical: String,
    pub requested: String,
}

impl ComparePair {
    pub fn parse(pair: &str) -> Option<Self> {
        let mut parts = pair.split("-vs-");
        let (first, second) = (parts.next()?, parts.next()?);

        if parts.next().is_some() {
            return None;
        }

        Self::ordered(first, second, pair.to_string())
    }

    /// Canonical pair for two slugs in any order.
    pub fn between(a: &str, b: &str) -> Option<Self> {
        Self::ordered(a, b, format!("{a}-vs-{b}"))
    }

    fn ordered(first: &str, second: &str, requested: String) -> Option<Self> {
        if first.is_empty() || second.is_empty() || first == second {
            return None;
        }

        let (left, right) = if first <= second {
            (first, second)
        } else {
            (second, first)
        };

        Some(Self {
            left_slug: left.to_string(),
            right_slug: right.to_string(),
            canonical: format!("{left}-vs-{right}"),
            requested,
        })
    }

    pub fn is_canonical(&self) -> bool {
        self.canonical == self.requested
    }
}

pub fn bundled() -> Result<Catalog, Error> {
    serde_json::from_str(BUNDLED_CATALOG).context("bundled catalog is malformed")
}

pub fn get_catalog(path: impl AsRef<Path>) -> Result<Catalog, Error> {
    let path = path.as_ref();
    let data = fs::read(path).with_context(|| format!("reading {}", path.display()))?;

    serde_json::from_slice(&data).with_context(|| format!("parsing {}", path.display()))
}

pub async fn get_catalog_remote(url: &str) -> Result<Catalog, Error> {
    let response = get(url).await?.error_for_status()?;
    let bytes = response.bytes().await?;

    Ok(serde_json::from_slice(&bytes)?)
}

pub fn write_catalog(path: impl AsRef<Path>, catalog: &Catalog) -> Result<(), Error> {
    let mut json = serde_json::to_string_pretty(catalog)?;
    json.push('\n');
    fs::write(path, json)?;

    Ok(())
}

fn by_wifi_desc(a: &&WorkSpot, b: &&WorkSpot) -> Ordering {
    b.logistics
        .wifi_speed_down
        .total_cmp(&a.logistics.wifi_speed_down)
}

fn by_noise_asc(a: &&WorkSpot, b: &&WorkSpot) -> Ordering {
    a.logistics.noise_level.total_cmp(&b.logistics.noise_level)
}

impl Catalog {
    pub fn len(&self) -> usize {
        self.spots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spots.is_empty()
    }

    pub fn by_slug(&self, slug: &str) -> Option<&WorkSpot> {
        self.spots.iter().find(|spot| spot.slug == slug)
    }

    /// Location lookup used by `/location/{neighborhood}/{slug}`.
    pub fn spot(&self, neighborhood: Neighborhood, slug: &str) -> Option<&WorkSpot> {
        self.by_slug(slug)
            .filter(|spot| spot.neighborhood == neighborhood)
    }

    /// Spots in a neighborhood, best rated first.
    pub fn by_neighborhood(&self, neighborhood: Neighborhood) -> Vec<&WorkSpot> {
        let mut spots: Vec<&WorkSpot> = self
            .spots
            .iter()
            .filter(|spot| spot.neighborhood == neighborhood)
            .collect();

        spots.sort_by(|a, b| b.seo.rating.total_cmp(&a.seo.rating));
        spots
    }

    pub fn best_wifi(&self, neighborhood: Neighborhood) -> Vec<&WorkSpot> {
        let mut spots: Vec<&WorkSpot> = self
            .spots
            .iter()
            .filter(|spot| spot.neighborhood == neighborhood)
            .collect();

        spots.sort_by(by_wifi_desc);
        spots
    }

    pub fn fastest_wifi(&self, min_mbps: f64) -> Vec<&WorkSpot> {
        let mut spots: Vec<&WorkSpot> = self
            .spots
            .iter()
            .filter(|spot| spot.logistics.wifi_speed_down >= min_mbps)
            .collect();

        spots.sort_by(by_wifi_desc);
        spots
    }

    pub fn quiet_zones(&self, neighborhood: Option<Neighborhood>, max_db: f64) -> Vec<&WorkSpot> {
        let mut spots: Vec<&WorkSpot> = self
            .spots
            .iter()
            .filter(|spot| neighborhood.is_none_or(|n| spot.neighborhood == n))
            .filter(|spot| spot.logistics.noise_level <= max_db)
            .collect();

        spots.sort_by(by_noise_asc);
        spots
    }

    pub fn weekend_friendly(&self) -> Vec<&WorkSpot> {
        let mut spots: Vec<&WorkSpot> = self
            .spots
            .iter()
            .filter(|spot| spot.weekend_friendly())
            .collect();

        spots.sort_by(by_wifi_desc);
        spots
    }

    /// Free parking or cheapest price range, libraries first.
    pub fn free_parking(&self) -> Vec<&WorkSpot> {
        let mut spots: Vec<&WorkSpot> = self
            .spots
            .iter()
            .filter(|spot| spot.has_free_parking() || spot.seo.price_range.trim() == "$")
            .collect();

        spots.sort_by(|a, b| {
            b.is_library()
                .cmp(&a.is_library())
                .then_with(|| by_wifi_desc(a, b))
        });
        spots
    }

    pub fn search(&self, filter: &SpotFilter) -> Vec<&WorkSpot> {
        let query = filter
            .query
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .map(str::to_lowercase);

        self.spots
            .iter()
            .filter(|spot| filter.neighborhood.is_none_or(|n| spot.neighborhood == n))
            .filter(|spot| match &query {
                Some(q) => {
                    spot.name.to_lowercase().contains(q)
                        || spot.neighborhood.slug().contains(q.as_str())
                        || spot.vibe.tags.iter().any(|t| t.to_lowercase().contains(q))
                        || spot.address.to_lowercase().contains(q)
                }
                None => true,
            })
            .filter(|spot| !filter.high_speed_wifi || spot.high_speed_wifi)
            .filter(|spot| !filter.open_late || spot.open_late)
            .collect()
    }

    /// Same neighborhood first, then closest download speed.
    pub fn compare_candidates(&self, spot: &WorkSpot, limit: usize) -> Vec<&WorkSpot> {
        let delta = |other: &WorkSpot| {
            (other.logistics.wifi_speed_down - spot.logistics.wifi_speed_down).abs()
        };

        let mut spots: Vec<&WorkSpot> = self
            .spots
            .iter()
            .filter(|other| other.slug != spot.slug)
            .collect();

        spots.sort_by(|a, b| {
            let away_a = a.neighborhood != spot.neighborhood;
            let away_b = b.neighborhood != spot.neighborhood;
            away_a
                .cmp(&away_b)
                .then_with(|| delta(*a).total_cmp(&delta(*b)))
        });
        spots.truncate(limit);
        spots
    }

    pub fn compare(&self, pair: &ComparePair) -> Option<(&WorkSpot, &WorkSpot)> {
        Some((self.by_slug(&pair.left_slug)?, self.by_slug(&pair.right_slug)?))
    }

    /// Every canonical pair, for the compare index.
    pub fn compare_pairs(&self) -> Vec<ComparePair> {
        let mut pairs = Vec::new();

        for (i, a) in self.spots.iter().enumerate() {
            for b in &self.spots[i + 1..] {
                pairs.extend(ComparePair::between(&a.slug, &b.slug));
            }
        }

        pairs
    }
}
