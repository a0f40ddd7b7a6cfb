use itertools::{Itertools, MinMaxResult};

use crate::{geo::Coordinates, svg::Point};

const EPSILON: f64 = 1e-6;

fn is_zero(value: f64) -> bool {
    value.abs() < EPSILON
}

fn bounds(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    match values.minmax_by(f64::total_cmp) {
        MinMaxResult::NoElements => None,
        MinMaxResult::OneElement(value) => Some((value, value)),
        MinMaxResult::MinMax(min, max) => Some((min, max)),
    }
}

/// Linear fit of geographic coordinates into a padded canvas.
///
/// Both axes share one zoom so the map keeps its aspect ratio. Latitude is
/// inverted since canvas y grows downwards.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SphereProjector {
    padding: f64,
    min_lng: f64,
    max_lat: f64,
    zoom: f64,
}

impl SphereProjector {
    pub fn new(points: &[Coordinates], max_width: f64, max_height: f64, padding: f64) -> Self {
        let mut projector = Self {
            padding,
            min_lng: 0.0,
            max_lat: 0.0,
            zoom: 0.0,
        };

        let (Some((min_lng, max_lng)), Some((min_lat, max_lat))) = (
            bounds(points.iter().map(|point| point.lng)),
            bounds(points.iter().map(|point| point.lat)),
        ) else {
            return projector;
        };
        projector.min_lng = min_lng;
        projector.max_lat = max_lat;

        let width_zoom =
            (!is_zero(max_lng - min_lng)).then(|| (max_width - 2.0 * padding) / (max_lng - min_lng));
        let height_zoom =
            (!is_zero(max_lat - min_lat)).then(|| (max_height - 2.0 * padding) / (max_lat - min_lat));

        projector.zoom = match (width_zoom, height_zoom) {
            (Some(width_zoom), Some(height_zoom)) => width_zoom.min(height_zoom),
            (Some(zoom), None) | (None, Some(zoom)) => zoom,
            (None, None) => 0.0,
        };
        projector
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn project(&self, coordinates: Coordinates) -> Point {
        Point::new(
            (coordinates.lng - self.min_lng) * self.zoom + self.padding,
            (self.max_lat - coordinates.lat) * self.zoom + self.padding,
        )
    }
}
