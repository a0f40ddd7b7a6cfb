use std::collections::HashMap;

use itertools::Itertools;
use tracing::{debug, warn};

use crate::{
    data::{Bus, RouteKind, Stop},
    error::CatalogueError,
    geo::{compute_distance, Coordinates},
};

type StopId = usize;

/// Owns every stop and bus of the network together with the measured road
/// distances between stops.
///
/// Bus metrics are computed once, when the bus is added, against the
/// distances known at that moment.
#[derive(Debug, Default)]
pub struct Catalogue {
    stops: Vec<Stop>,
    buses: Vec<Bus>,
    stop_ids: HashMap<String, StopId>,
    bus_ids: HashMap<String, usize>,
    distances: HashMap<(StopId, StopId), u32>,
}

impl Catalogue {
    pub fn add_stop(&mut self, name: &str, coordinates: Coordinates) -> Result<(), CatalogueError> {
        if self.stop_ids.contains_key(name) {
            return Err(CatalogueError::DuplicateStop {
                stop: name.to_owned(),
            });
        }

        debug!(stop = name, lat = coordinates.lat, lng = coordinates.lng, "Adding stop");
        self.stop_ids.insert(name.to_owned(), self.stops.len());
        self.stops.push(Stop::new(name, coordinates));
        Ok(())
    }

    /// Adds a bus visiting `stops` in order; linear routes are expanded into
    /// a round trip before any metric is computed.
    pub fn add_route(
        &mut self,
        name: &str,
        stops: &[String],
        kind: RouteKind,
    ) -> Result<&Bus, CatalogueError> {
        if self.bus_ids.contains_key(name) {
            return Err(CatalogueError::DuplicateRoute {
                bus: name.to_owned(),
            });
        }

        let traversal = kind.traversal(stops);
        let ids = traversal
            .iter()
            .map(|stop| self.stop_id(stop))
            .collect::<Result<Vec<StopId>, CatalogueError>>()?;

        let route_length: u64 = ids
            .iter()
            .tuple_windows()
            .map(|(&from, &to)| u64::from(self.distance_by_id(from, to)))
            .sum();
        let geographic_length: f64 = ids
            .iter()
            .tuple_windows()
            .map(|(&from, &to)| {
                compute_distance(self.stops[from].coordinates, self.stops[to].coordinates)
            })
            .sum();

        let curvature = if geographic_length > 0.0 {
            route_length as f64 / geographic_length
        } else if route_length == 0 {
            1.0
        } else {
            return Err(CatalogueError::DegenerateGeometry {
                bus: name.to_owned(),
                road_length: route_length,
            });
        };

        for &id in ids.iter().unique() {
            self.stops[id].buses.insert(name.to_owned());
        }

        let bus = Bus {
            name: name.to_owned(),
            kind,
            stops_on_route: ids.len(),
            unique_stops: ids.iter().unique().count(),
            stops: traversal,
            route_length,
            curvature,
        };
        debug!(
            bus = name,
            stops = bus.stops_on_route,
            unique = bus.unique_stops,
            length = bus.route_length,
            curvature = bus.curvature,
            "Adding bus"
        );

        let index = self.buses.len();
        self.bus_ids.insert(name.to_owned(), index);
        self.buses.push(bus);
        Ok(&self.buses[index])
    }

    /// Stores the directed distance `from -> to`, replacing any previous
    /// value. Buses added earlier keep their metrics.
    pub fn set_distance(&mut self, from: &str, to: &str, meters: u32) -> Result<(), CatalogueError> {
        let key = (self.stop_id(from)?, self.stop_id(to)?);
        if meters == 0 {
            warn!(from, to, "Rejecting road distance of zero meters");
            return Err(CatalogueError::NonPositiveDistance {
                from: from.to_owned(),
                to: to.to_owned(),
            });
        }
        self.distances.insert(key, meters);
        Ok(())
    }

    /// Directed lookup, falling back to `to -> from` and then to zero.
    pub fn get_distance(&self, from: &str, to: &str) -> Result<u32, CatalogueError> {
        Ok(self.distance_by_id(self.stop_id(from)?, self.stop_id(to)?))
    }

    pub fn get_bus_data(&self, name: &str) -> Option<&Bus> {
        self.bus_ids.get(name).map(|&index| &self.buses[index])
    }

    pub fn get_stop_data(&self, name: &str) -> Option<&Stop> {
        self.stop_ids.get(name).map(|&id| &self.stops[id])
    }

    fn stop_id(&self, name: &str) -> Result<StopId, CatalogueError> {
        self.stop_ids
            .get(name)
            .copied()
            .ok_or_else(|| CatalogueError::UnknownStop {
                stop: name.to_owned(),
            })
    }

    fn distance_by_id(&self, from: StopId, to: StopId) -> u32 {
        self.distances
            .get(&(from, to))
            .or_else(|| self.distances.get(&(to, from)))
            .copied()
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    fn names(stops: &[&str]) -> Vec<String> {
        stops.iter().map(|stop| stop.to_string()).collect()
    }

    fn two_stop_catalogue() -> Catalogue {
        let mut catalogue = Catalogue::default();
        catalogue.add_stop("A", Coordinates::new(0.0, 0.0)).unwrap();
        catalogue.add_stop("B", Coordinates::new(0.0, 1.0)).unwrap();
        catalogue
    }

    #[test]
    fn test_distance_falls_back_to_reverse_direction() {
        let mut catalogue = two_stop_catalogue();
        catalogue.set_distance("A", "B", 1000).unwrap();

        assert_eq!(catalogue.get_distance("A", "B"), Ok(1000));
        assert_eq!(catalogue.get_distance("B", "A"), Ok(1000));
    }

    #[test]
    fn test_distance_is_directed_when_both_are_set() {
        let mut catalogue = two_stop_catalogue();
        catalogue.set_distance("A", "B", 1000).unwrap();
        catalogue.set_distance("B", "A", 1200).unwrap();

        assert_eq!(catalogue.get_distance("A", "B"), Ok(1000));
        assert_eq!(catalogue.get_distance("B", "A"), Ok(1200));
    }

    #[test]
    fn test_zero_distance_is_rejected() {
        let mut catalogue = two_stop_catalogue();
        catalogue.set_distance("B", "A", 500).unwrap();

        assert_eq!(
            catalogue.set_distance("A", "B", 0),
            Err(CatalogueError::NonPositiveDistance {
                from: "A".into(),
                to: "B".into()
            })
        );
        assert_eq!(catalogue.get_distance("A", "B"), Ok(500));
    }

    #[test]
    fn test_missing_distance_is_zero() {
        let catalogue = two_stop_catalogue();

        assert_eq!(catalogue.get_distance("A", "B"), Ok(0));
    }

    #[test]
    fn test_distance_with_unknown_stop() {
        let mut catalogue = two_stop_catalogue();

        assert_eq!(
            catalogue.get_distance("A", "Z"),
            Err(CatalogueError::UnknownStop { stop: "Z".into() })
        );
        assert_eq!(
            catalogue.set_distance("Z", "A", 10),
            Err(CatalogueError::UnknownStop { stop: "Z".into() })
        );
    }

    #[test]
    fn test_linear_route_metrics() {
        let mut catalogue = two_stop_catalogue();
        catalogue.set_distance("A", "B", 1000).unwrap();

        let bus = catalogue
            .add_route("1", &names(&["A", "B"]), RouteKind::Linear)
            .unwrap()
            .clone();

        let one_way = compute_distance(Coordinates::new(0.0, 0.0), Coordinates::new(0.0, 1.0));
        assert_eq!(bus.stops, names(&["A", "B", "A"]));
        assert_eq!(bus.stops_on_route, 3);
        assert_eq!(bus.unique_stops, 2);
        assert_eq!(bus.route_length, 2000);
        assert_relative_eq!(bus.curvature, 2000.0 / (2.0 * one_way));
        assert_eq!(catalogue.get_bus_data("1"), Some(&bus));
    }

    #[test]
    fn test_three_stop_linear_route_counts() {
        let mut catalogue = two_stop_catalogue();
        catalogue.add_stop("C", Coordinates::new(0.5, 1.0)).unwrap();

        let bus = catalogue
            .add_route("7", &names(&["A", "B", "C"]), RouteKind::Linear)
            .unwrap();

        assert_eq!(bus.stops, names(&["A", "B", "C", "B", "A"]));
        assert_eq!(bus.stops_on_route, 5);
        assert_eq!(bus.unique_stops, 3);
    }

    #[test]
    fn test_roundtrip_curvature_is_at_least_one() {
        let mut catalogue = Catalogue::default();
        catalogue.add_stop("A", Coordinates::new(55.611087, 37.20829)).unwrap();
        catalogue.add_stop("B", Coordinates::new(55.595884, 37.209755)).unwrap();
        catalogue.add_stop("C", Coordinates::new(55.632761, 37.333324)).unwrap();
        catalogue.set_distance("A", "B", 3900).unwrap();
        catalogue.set_distance("B", "C", 9900).unwrap();
        catalogue.set_distance("C", "A", 8000).unwrap();

        let bus = catalogue
            .add_route("256", &names(&["A", "B", "C", "A"]), RouteKind::Roundtrip)
            .unwrap();

        assert_eq!(bus.stops_on_route, 4);
        assert_eq!(bus.unique_stops, 3);
        assert_eq!(bus.route_length, 21800);
        assert!(bus.curvature >= 1.0);
    }

    #[test]
    fn test_route_registers_buses_on_stops() {
        let mut catalogue = two_stop_catalogue();
        catalogue.add_stop("Lonely", Coordinates::new(1.0, 1.0)).unwrap();
        catalogue.set_distance("A", "B", 1000).unwrap();
        catalogue
            .add_route("2", &names(&["A", "B"]), RouteKind::Linear)
            .unwrap();
        catalogue
            .add_route("1", &names(&["B", "A", "B"]), RouteKind::Roundtrip)
            .unwrap();

        let buses: Vec<&str> = catalogue
            .get_stop_data("B")
            .unwrap()
            .buses
            .iter()
            .map(String::as_str)
            .collect();
        assert_eq!(buses, vec!["1", "2"]);
        assert!(!catalogue.get_stop_data("Lonely").unwrap().is_served());
    }

    #[test]
    fn test_route_with_unknown_stop_is_rejected() {
        let mut catalogue = two_stop_catalogue();

        let result = catalogue.add_route("1", &names(&["A", "Z"]), RouteKind::Linear);

        assert_eq!(
            result.err(),
            Some(CatalogueError::UnknownStop { stop: "Z".into() })
        );
        assert!(catalogue.get_bus_data("1").is_none());
        assert!(catalogue.get_stop_data("A").unwrap().buses.is_empty());
    }

    #[test]
    fn test_duplicates_are_rejected() {
        let mut catalogue = two_stop_catalogue();
        catalogue
            .add_route("1", &names(&["A", "B"]), RouteKind::Linear)
            .unwrap();

        assert_eq!(
            catalogue.add_stop("A", Coordinates::new(5.0, 5.0)),
            Err(CatalogueError::DuplicateStop { stop: "A".into() })
        );
        assert_eq!(
            catalogue
                .add_route("1", &names(&["B"]), RouteKind::Roundtrip)
                .err(),
            Some(CatalogueError::DuplicateRoute { bus: "1".into() })
        );
        assert_eq!(
            catalogue.get_stop_data("A").unwrap().coordinates,
            Coordinates::new(0.0, 0.0)
        );
        assert_eq!(catalogue.get_bus_data("1").unwrap().stops_on_route, 3);
    }

    #[test]
    fn test_distance_added_later_does_not_change_bus() {
        let mut catalogue = two_stop_catalogue();
        catalogue
            .add_route("1", &names(&["A", "B"]), RouteKind::Linear)
            .unwrap();
        catalogue.set_distance("A", "B", 1000).unwrap();

        assert_eq!(catalogue.get_bus_data("1").unwrap().route_length, 0);
    }

    #[test]
    fn test_coincident_stops() {
        let mut catalogue = Catalogue::default();
        catalogue.add_stop("A", Coordinates::new(10.0, 10.0)).unwrap();
        catalogue.add_stop("B", Coordinates::new(10.0, 10.0)).unwrap();

        let bus = catalogue
            .add_route("quiet", &names(&["A", "B"]), RouteKind::Linear)
            .unwrap();
        assert_eq!(bus.curvature, 1.0);

        catalogue.set_distance("A", "B", 50).unwrap();
        assert_eq!(
            catalogue
                .add_route("loud", &names(&["A", "B"]), RouteKind::Linear)
                .err(),
            Some(CatalogueError::DegenerateGeometry {
                bus: "loud".into(),
                road_length: 100
            })
        );
    }

    #[test]
    fn test_unknown_names_are_not_found() {
        let catalogue = two_stop_catalogue();

        assert!(catalogue.get_stop_data("Z").is_none());
        assert!(catalogue.get_bus_data("Z").is_none());
    }
}
