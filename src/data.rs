use std::collections::BTreeSet;

use crate::geo::Coordinates;

#[derive(Debug, Clone, PartialEq)]
pub struct Stop {
    pub name: String,
    pub coordinates: Coordinates,
    pub buses: BTreeSet<String>,
}

impl Stop {
    pub fn new(name: &str, coordinates: Coordinates) -> Self {
        Self {
            name: name.to_owned(),
            coordinates,
            buses: BTreeSet::default(),
        }
    }

    pub fn is_served(&self) -> bool {
        !self.buses.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RouteKind {
    /// The listed stops already form a closed loop.
    Roundtrip,
    /// The bus runs to the last stop and back along the same stops.
    Linear,
}

impl RouteKind {
    pub fn from_roundtrip_flag(is_roundtrip: bool) -> Self {
        if is_roundtrip {
            RouteKind::Roundtrip
        } else {
            RouteKind::Linear
        }
    }

    /// Expands the listed stops into the full sequence a bus visits.
    ///
    /// A linear route `[A, B, C]` becomes `[A, B, C, B, A]`.
    pub fn traversal(&self, stops: &[String]) -> Vec<String> {
        match self {
            RouteKind::Roundtrip => stops.to_vec(),
            RouteKind::Linear => stops
                .iter()
                .chain(stops.iter().rev().skip(1))
                .cloned()
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Bus {
    pub name: String,
    pub kind: RouteKind,
    /// Full traversal, see [`RouteKind::traversal`].
    pub stops: Vec<String>,
    pub stops_on_route: usize,
    pub unique_stops: usize,
    pub route_length: u64,
    pub curvature: f64,
}
