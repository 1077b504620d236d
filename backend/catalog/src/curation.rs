//! # Curation
//!
//! Editorial picks layered on top of the catalog: verified spots, featured placements,
//! partner eligibility, resident tips, laptop policies and free public spaces.
//!
//! Policy and free-space rows may name places outside the catalog. `slug` is set only when the
//! row has a location page.
use crate::spots::{Neighborhood, OutletDensity, WorkSpot};

pub const VERIFIED_SPOT_SLUGS: [&str; 11] = [
    "northside-social",
    "3den-tysons",
    "mishas-coffee-alexandria",
    "caboose-commons",
    "arlington-central-library",
    "reston-regional-library",
    "beatley-library-alexandria",
    "capital-one-hall",
    "the-perch-tysons",
    "compass-coffee-rosslyn",
    "three-whistles",
];

pub struct LaptopPolicy {
    pub name: &'static str,
    pub slug: Option<&'static str>,
    pub area: &'static str,
    pub policy: &'static str,
    pub weekend_policy: &'static str,
    pub wifi_quality: &'static str,
    pub tip: &'static str,
}

impl LaptopPolicy {
    pub fn weekend_friendly(&self) -> bool {
        self.weekend_policy.contains("No restrictions") || self.weekend_policy.contains("Open")
    }
}

pub const LAPTOP_POLICIES: [LaptopPolicy; 10] = [
    LaptopPolicy {
        name: "Northside Social",
        slug: Some("northside-social"),
        area: "Arlington (Clarendon)",
        policy: "Laptops welcome. Upstairs wine bar and downstairs cafe are both laptop-friendly all day",
        weekend_policy: "No restrictions",
        wifi_quality: "45 Mbps",
        tip: "Best at the communal table downstairs",
    },
    LaptopPolicy {
        name: "Blue Print Coffee",
        slug: None,
        area: "Arlington",
        policy: "Laptops welcome all day",
        weekend_policy: "No restrictions",
        wifi_quality: "150 Mbps",
        tip: "Dedicated work desks available",
    },
    LaptopPolicy {
        name: "Bean There Done That",
        slug: None,
        area: "Tysons",
        policy: "Laptops welcome until 5pm on weekdays",
        weekend_policy: "Limited, brunch crowd takes priority",
        wifi_quality: "95 Mbps",
        tip: "Arrive early on weekends",
    },
    LaptopPolicy {
        name: "3DEN Tysons",
        slug: Some("3den-tysons"),
        area: "Tysons Corner",
        policy: "Full access, this is a coworking space",
        weekend_policy: "Open 10am-6pm Sun, 9am-7pm Sat",
        wifi_quality: "200 Mbps (Fiber)",
        tip: "Day passes available ($35)",
    },
    LaptopPolicy {
        name: "Misha's Coffee",
        slug: Some("mishas-coffee-alexandria"),
        area: "Old Town Alexandria",
        policy: "Laptops welcome but seating is extremely limited",
        weekend_policy: "Very crowded, arrive before 9am",
        wifi_quality: "30 Mbps",
        tip: "Communal table has 2 outlets only",
    },
    LaptopPolicy {
        name: "The Wireless Cowork",
        slug: None,
        area: "Alexandria (King St)",
        policy: "Full coworking access, laptops welcome",
        weekend_policy: "Open 9am-6pm Sat, closed Sun",
        wifi_quality: "500 Mbps",
        tip: "Soundproof phone booths available",
    },
    LaptopPolicy {
        name: "Reston Roasters",
        slug: Some("reston-roasters"),
        area: "Reston",
        policy: "Laptops welcome all day",
        weekend_policy: "No restrictions",
        wifi_quality: "200 Mbps",
        tip: "Great morning focus sessions",
    },
    LaptopPolicy {
        name: "Arlington Public Library",
        slug: Some("arlington-central-library"),
        area: "Arlington",
        policy: "Laptops welcome, study rooms available",
        weekend_policy: "Open 12pm-6pm Sun, 10am-6pm Sat",
        wifi_quality: "100 Mbps",
        tip: "Free and library-quiet",
    },
    LaptopPolicy {
        name: "Compass Coffee",
        slug: Some("compass-coffee-rosslyn"),
        area: "Arlington",
        policy: "Laptops welcome",
        weekend_policy: "No restrictions",
        wifi_quality: "75 Mbps",
        tip: "Multiple locations in Arlington",
    },
    LaptopPolicy {
        name: "Tatte Bakery",
        slug: None,
        area: "Arlington",
        policy: "Laptops OK but discouraged during peak hours",
        weekend_policy: "Very crowded on weekends",
        wifi_quality: "50 Mbps",
        tip: "Go early morning for best seating",
    },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpaceKind {
    Library,
    Mall,
    CorporateLobby,
    CorporateCampus,
    GovernmentBuilding,
}

impl SpaceKind {
    pub fn label(&self) -> &'static str {
        match self {
            SpaceKind::Library => "Library",
            SpaceKind::Mall => "Mall",
            SpaceKind::CorporateLobby => "Corporate Lobby",
            SpaceKind::CorporateCampus => "Corporate Campus",
            SpaceKind::GovernmentBuilding => "Government Building",
        }
    }
}

pub struct FreeSpace {
    pub name: &'static str,
    pub slug: Option<&'static str>,
    pub address: &'static str,
    pub kind: SpaceKind,
    pub wifi: &'static str,
    pub parking: &'static str,
    pub hours: &'static str,
    pub tips: &'static str,
}

pub const FREE_SPACES: [FreeSpace; 7] = [
    FreeSpace {
        name: "Arlington Public Library - Central",
        slug: Some("arlington-central-library"),
        address: "1015 N Quincy St, Arlington, VA 22201",
        kind: SpaceKind::Library,
        wifi: "Free (100 Mbps)",
        parking: "Free garage",
        hours: "Mon-Thu 10am-8pm, Fri-Sat 10am-6pm, Sun 12pm-6pm",
        tips: "Study rooms available. Very quiet. Power outlets at most desks.",
    },
    FreeSpace {
        name: "Fairfax County Public Library - Main",
        slug: None,
        address: "10360 North St, Fairfax, VA 22030",
        kind: SpaceKind::Library,
        wifi: "Free (75 Mbps)",
        parking: "Free lot",
        hours: "Mon-Thu 10am-9pm, Fri-Sat 10am-6pm, Sun 1pm-5pm",
        tips: "Good study rooms. Decent coffee shop in lobby.",
    },
    FreeSpace {
        name: "Tysons Galleria Food Court (3rd Floor)",
        slug: Some("tysons-galleria-third-floor"),
        address: "2001 International Dr, McLean, VA 22102",
        kind: SpaceKind::Mall,
        wifi: "Free (limited)",
        parking: "Free garage",
        hours: "Daily 10am-9pm",
        tips: "Hidden gem near theater. Very quiet. Limited outlets.",
    },
    FreeSpace {
        name: "Amazon HQ2 Met Park Food Court",
        slug: None,
        address: "2100 Crystal Dr, Arlington, VA 22202",
        kind: SpaceKind::CorporateLobby,
        wifi: "Free Amazon Guest WiFi",
        parking: "Paid garage nearby",
        hours: "Food court 7am-9pm",
        tips: "Clean, modern, plenty of seating. May need to sign in at desk.",
    },
    FreeSpace {
        name: "Capital One Hall Public Spaces",
        slug: Some("capital-one-hall"),
        address: "1601 Spring Hill Rd, Tysons, VA 22102",
        kind: SpaceKind::CorporateCampus,
        wifi: "Free Guest WiFi",
        parking: "Free visitor parking",
        hours: "Building 7am-10pm",
        tips: "Beautiful modern spaces. Coffee shop inside. Very quiet weekdays.",
    },
    FreeSpace {
        name: "Alexandria City Hall",
        slug: None,
        address: "301 King St, Alexandria, VA 22314",
        kind: SpaceKind::GovernmentBuilding,
        wifi: "Free City WiFi",
        parking: "Paid street parking",
        hours: "Mon-Fri 8am-5pm",
        tips: "Surprisingly good for focused work. Quiet atmosphere.",
    },
    FreeSpace {
        name: "Reston Regional Library",
        slug: Some("reston-regional-library"),
        address: "11925 Lawyers Rd, Reston, VA 20190",
        kind: SpaceKind::Library,
        wifi: "Free (100 Mbps)",
        parking: "Free lot",
        hours: "Mon-Thu 10am-9pm, Fri-Sat 10am-6pm, Sun 1pm-5pm",
        tips: "Large quiet zones. Good meeting rooms. Modern facility.",
    },
];

pub struct ResidentTip {
    pub name: &'static str,
    pub handle: &'static str,
    pub text: &'static str,
}

pub fn is_verified(spot: &WorkSpot) -> bool {
    VERIFIED_SPOT_SLUGS.contains(&spot.slug.as_str())
}

pub fn featured_slug(neighborhood: Neighborhood) -> &'static str {
    match neighborhood {
        Neighborhood::Arlington => "northside-social",
        Neighborhood::Alexandria => "mishas-coffee-alexandria",
        Neighborhood::Tysons => "caboose-commons",
        Neighborhood::Reston => "reston-roasters",
    }
}

pub fn is_featured(spot: &WorkSpot) -> bool {
    featured_slug(spot.neighborhood) == spot.slug
}

pub fn shows_day_pass_partner(spot: &WorkSpot) -> bool {
    spot.has_tag("paid-lounge")
        || spot.has_tag("coworking")
        || spot.has_zoom_pods.unwrap_or(false)
        || spot.meeting_friendly.unwrap_or(false)
}

pub fn shows_outlet_affiliate(spot: &WorkSpot) -> bool {
    matches!(
        spot.logistics.outlet_density,
        OutletDensity::Sparse | OutletDensity::Moderate
    )
}

pub fn resident_tip(slug: &str) -> Option<ResidentTip> {
    let tip = match slug {
        "northside-social" => ResidentTip {
            name: "Alex R.",
            handle: "@nova-remote",
            text: "Downstairs is usually the move for stable work blocks on weekends.",
        },
        "caboose-commons" => ResidentTip {
            name: "Priya M.",
            handle: "@arlnomad",
            text: "Floor 3 stays much quieter for deep work than the ground level.",
        },
        "3den-tysons" => ResidentTip {
            name: "Marcus L.",
            handle: "@tysonsbuilder",
            text: "Best call quality spot in Tysons if you need back-to-back meetings.",
        },
        _ => return None,
    };

    Some(tip)
}
