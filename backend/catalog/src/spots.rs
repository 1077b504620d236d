//! # WorkSpot
//!
//! One physical remote-work location and its measured amenities.
//!
//! Records are read-only. They are loaded wholesale from `data/spots.json` and never mutated
//! by the server, so there is no identity beyond the `id`/`slug` pair.
use std::fmt;

use serde::{Deserialize, Serialize};

pub const HIGH_SPEED_MBPS: f64 = 100.0;
pub const OPEN_LATE_AFTER: &str = "21:00";

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Neighborhood {
    Arlington,
    Alexandria,
    Tysons,
    Reston,
}

impl Neighborhood {
    pub const ALL: [Neighborhood; 4] = [
        Neighborhood::Arlington,
        Neighborhood::Alexandria,
        Neighborhood::Tysons,
        Neighborhood::Reston,
    ];

    pub fn slug(&self) -> &'static str {
        match self {
            Neighborhood::Arlington => "arlington",
            Neighborhood::Alexandria => "alexandria",
            Neighborhood::Tysons => "tysons",
            Neighborhood::Reston => "reston",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Neighborhood::Arlington => "Arlington",
            Neighborhood::Alexandria => "Alexandria",
            Neighborhood::Tysons => "Tysons",
            Neighborhood::Reston => "Reston",
        }
    }

    pub fn from_slug(slug: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|n| n.slug() == slug)
    }
}

impl fmt::Display for Neighborhood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum VibePrimary {
    Focus,
    Social,
    Quiet,
    Lively,
}

impl VibePrimary {
    pub fn label(&self) -> &'static str {
        match self {
            VibePrimary::Focus => "Focus Zone",
            VibePrimary::Social => "Social / Loud",
            VibePrimary::Quiet => "Quiet / Library",
            VibePrimary::Lively => "Lively / Energetic",
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OutletDensity {
    Sparse,
    Moderate,
    Plenty,
}

impl OutletDensity {
    pub fn label(&self) -> &'static str {
        match self {
            OutletDensity::Sparse => "Sparse",
            OutletDensity::Moderate => "Moderate",
            OutletDensity::Plenty => "Plenty",
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum SeatingType {
    Desk,
    Couch,
    Bar,
    Communal,
    Outdoor,
    Stool,
    PrivateBooths,
}

impl SeatingType {
    pub fn label(&self) -> &'static str {
        match self {
            SeatingType::Desk => "Desks",
            SeatingType::Couch => "Couches",
            SeatingType::Bar => "Bar Seating",
            SeatingType::Communal => "Communal Tables",
            SeatingType::Outdoor => "Outdoor",
            SeatingType::Stool => "Stools",
            SeatingType::PrivateBooths => "Private Booths",
        }
    }
}

/// `open`/`close` are `HH:MM`, both `None` when closed that day.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct DayHours {
    pub day: String,
    pub open: Option<String>,
    pub close: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Logistics {
    pub wifi_speed_down: f64,
    pub wifi_speed_up: f64,
    pub outlet_density: OutletDensity,
    pub noise_level: f64,
    pub seating_type: Vec<SeatingType>,
    pub verified_at: String,
    #[serde(default)]
    pub last_verified: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Vibe {
    pub primary: VibePrimary,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secondary: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Seo {
    pub description: String,
    pub price_range: String,
    pub rating: f64,
    pub review_count: u32,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Images {
    pub hero: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gallery: Option<Vec<String>>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WorkSpot {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub slug: String,
    pub neighborhood: Neighborhood,

    pub address: String,
    #[serde(default)]
    pub google_maps_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,

    pub logistics: Logistics,
    pub vibe: Vibe,

    #[serde(default)]
    pub hours: Vec<DayHours>,
    #[serde(default)]
    pub open_late: bool,
    #[serde(default)]
    pub high_speed_wifi: bool,

    pub seo: Seo,
    pub images: Images,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub laptop_policy: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expert_tip: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deep_work_zone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parking_info: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parking_status: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weekend_friendly: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub power_player: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_zoom_pods: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_library: Option<bool>,
    #[serde(default, rename = "has5G", skip_serializing_if = "Option::is_none")]
    pub has_5g: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meeting_friendly: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zoom_score: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Coordinates>,
}

impl WorkSpot {
    pub fn path(&self) -> String {
        format!("/location/{}/{}", self.neighborhood.slug(), self.slug)
    }

    pub fn weekend_friendly(&self) -> bool {
        self.weekend_friendly.unwrap_or(false)
    }

    pub fn power_player(&self) -> bool {
        self.power_player.unwrap_or(false)
    }

    pub fn is_library(&self) -> bool {
        self.is_library.unwrap_or(false)
    }

    pub fn has_private_booths(&self) -> bool {
        self.has_zoom_pods.unwrap_or(false)
            || self
                .logistics
                .seating_type
                .contains(&SeatingType::PrivateBooths)
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.vibe.tags.iter().any(|t| t == tag)
    }

    pub fn has_free_parking(&self) -> bool {
        self.parking_status.as_deref() == Some("free-garage")
            || self
                .parking_info
                .as_deref()
                .is_some_and(|info| info.to_lowercase().contains("free"))
    }

    /// Whether any day closes after 9pm.
    pub fn computed_open_late(&self) -> bool {
        self.hours
            .iter()
            .filter_map(|h| h.close.as_deref())
            .any(|close| close > OPEN_LATE_AFTER)
    }

    pub fn computed_high_speed_wifi(&self) -> bool {
        self.logistics.wifi_speed_down >= HIGH_SPEED_MBPS
    }
}
