//! # Catalog Processing
//!
//! Normalizes `data/spots.json` before it is bundled into the server.
//!
//! ## Steps
//! 1. Load the catalog file.
//!
//! 2. Any spot without a slug gets one derived from its name.
//!
//! 3. Recompute the derived flags so they never drift from the raw data:
//! - `openLate` when any day closes after 9pm
//! - `highSpeedWifi` when download is at least 100 Mbps
//!
//! 4. Rebuild the display date `lastVerified` from `verifiedAt`.
//!
//! 5. Reject the file if two spots share a slug or a rating is outside 0-5.
//!
//! 6. Write the normalized catalog back, unless running in check mode.
//!
//! ## Notes
//! - Slugs are part of public URLs, so an existing slug is never rewritten.
//! - The server trusts the derived flags as-is and never recomputes them.
use std::{collections::HashSet, path::Path};

use anyhow::{Result, bail};

pub mod utils;

use catalog::{Catalog, get_catalog, write_catalog};
use utils::{display_date, slugify};

#[derive(Debug, Default, PartialEq, Eq)]
pub struct Report {
    pub spots: usize,
    pub new_slugs: usize,
    pub flag_updates: usize,
    pub date_updates: usize,
}

impl Report {
    pub fn changed(&self) -> bool {
        self.new_slugs + self.flag_updates + self.date_updates > 0
    }
}

pub fn normalize_catalog(path: impl AsRef<Path>, write: bool) -> Result<Report> {
    let path = path.as_ref();
    let mut catalog = get_catalog(path)?;

    println!("Loaded Spots: {}\n", catalog.len());

    let report = normalize(&mut catalog)?;

    if !report.changed() {
        println!("Catalog already normalized. Exiting.");
        return Ok(report);
    }

    println!("New Slugs: {}", report.new_slugs);
    println!("Flag Updates: {}", report.flag_updates);
    println!("Date Updates: {}\n", report.date_updates);

    if write {
        write_catalog(path, &catalog)?;
        println!("Wrote {}", path.display());
    } else {
        println!("Check mode, nothing written.");
    }

    Ok(report)
}

pub fn normalize(catalog: &mut Catalog) -> Result<Report> {
    let mut report = Report {
        spots: catalog.len(),
        ..Default::default()
    };
    let mut seen = HashSet::new();

    for spot in &mut catalog.spots {
        if spot.slug.trim().is_empty() {
            spot.slug = slugify(&spot.name);

            #[cfg(feature = "verbose")]
            println!("New slug! {}", spot.slug);

            report.new_slugs += 1;
        }

        if spot.slug.is_empty() {
            bail!("Spot {} has no usable name for a slug", spot.id);
        }

        if !seen.insert(spot.slug.clone()) {
            bail!("Duplicate slug: {}", spot.slug);
        }

        if !(0.0..=5.0).contains(&spot.seo.rating) {
            bail!("Rating out of range for {}: {}", spot.slug, spot.seo.rating);
        }

        let open_late = spot.computed_open_late();
        let high_speed_wifi = spot.computed_high_speed_wifi();

        if spot.open_late != open_late || spot.high_speed_wifi != high_speed_wifi {
            #[cfg(feature = "verbose")]
            println!("Flags changed! {}", spot.slug);

            spot.open_late = open_late;
            spot.high_speed_wifi = high_speed_wifi;
            report.flag_updates += 1;
        }

        match display_date(&spot.logistics.verified_at) {
            Some(date) if date != spot.logistics.last_verified => {
                spot.logistics.last_verified = date;
                report.date_updates += 1;
            }
            Some(_) => {}
            None => println!(
                "Unparseable verifiedAt for {}: {}",
                spot.slug, spot.logistics.verified_at
            ),
        }
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::tempdir;

    use super::*;

    #[test]
    fn test_bundled_catalog_is_normalized() {
        let mut catalog = catalog::bundled().unwrap();
        let report = normalize(&mut catalog).unwrap();

        assert_eq!(report.spots, catalog.len());
        assert!(!report.changed());
    }

    #[test]
    fn test_fills_slug_and_flags() {
        let mut catalog = catalog::bundled().unwrap();
        let spot = &mut catalog.spots[0];
        spot.slug = String::new();
        spot.name = "The Perch Tysons".to_string();
        spot.high_speed_wifi = !spot.high_speed_wifi;
        spot.logistics.last_verified = String::new();

        let report = normalize(&mut catalog).unwrap();

        assert_eq!(report.new_slugs, 1);
        assert_eq!(report.flag_updates, 1);
        assert_eq!(report.date_updates, 1);
        assert_eq!(catalog.spots[0].slug, "the-perch-tysons");
        assert_eq!(catalog.spots[0].logistics.last_verified, "Feb 26, 2026");
    }

    #[test]
    fn test_rejects_duplicate_slugs() {
        let mut catalog = catalog::bundled().unwrap();
        catalog.spots[1].slug = catalog.spots[0].slug.clone();

        assert!(normalize(&mut catalog).is_err());
    }

    #[test]
    fn test_rejects_bad_rating() {
        let mut catalog = catalog::bundled().unwrap();
        catalog.spots[0].seo.rating = 7.5;

        assert!(normalize(&mut catalog).is_err());
    }

    #[test]
    fn test_check_mode_leaves_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("spots.json");

        let mut catalog = catalog::bundled().unwrap();
        catalog.spots[0].open_late = !catalog.spots[0].open_late;
        write_catalog(&path, &catalog).unwrap();
        let before = fs::read_to_string(&path).unwrap();

        let report = normalize_catalog(&path, false).unwrap();
        assert_eq!(report.flag_updates, 1);
        assert_eq!(fs::read_to_string(&path).unwrap(), before);

        normalize_catalog(&path, true).unwrap();
        assert!(!normalize_catalog(&path, false).unwrap().changed());
    }
}
