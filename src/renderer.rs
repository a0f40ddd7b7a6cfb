use std::collections::{BTreeMap, BTreeSet};

use serde::Deserialize;
use tracing::debug;

use crate::{
    catalogue::Catalogue,
    data::{Bus, RouteKind, Stop},
    error::RenderError,
    projector::SphereProjector,
    svg::{Circle, Color, Document, Point, Polyline, StrokeLineCap, StrokeLineJoin, Styled, Text},
};

pub const FONT_FAMILY: &str = "Verdana";

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RenderSettings {
    pub width: f64,
    pub height: f64,
    pub padding: f64,
    pub line_width: f64,
    pub stop_radius: f64,
    pub bus_label_font_size: u32,
    pub bus_label_offset: Point,
    pub stop_label_font_size: u32,
    pub stop_label_offset: Point,
    pub underlayer_color: Color,
    pub underlayer_width: f64,
    pub color_palette: Vec<Color>,
}

impl RenderSettings {
    pub fn validate(&self) -> Result<(), RenderError> {
        if self.color_palette.is_empty() {
            return Err(RenderError::EmptyPalette);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
struct RouteEnds {
    first_stop: String,
    last_stop: String,
}

/// A bus ready to be drawn: every stop already projected.
struct RouteLayout<'a> {
    name: &'a str,
    points: Vec<Point>,
    first: Point,
    last: Option<Point>,
}

/// Draws the network as a schematic map.
///
/// The renderer only remembers names. Stops and buses are looked up in the
/// [`Catalogue`] handed to [`MapRenderer::render_map`].
#[derive(Debug, Default)]
pub struct MapRenderer {
    settings: Option<RenderSettings>,
    routes: BTreeMap<String, RouteEnds>,
    stops: BTreeSet<String>,
}

impl MapRenderer {
    pub fn set_settings(&mut self, settings: RenderSettings) -> Result<(), RenderError> {
        settings.validate()?;
        self.settings = Some(settings);
        Ok(())
    }

    pub fn set_route(&mut self, name: &str, first_stop: &str, last_stop: &str) {
        self.routes.insert(
            name.to_owned(),
            RouteEnds {
                first_stop: first_stop.to_owned(),
                last_stop: last_stop.to_owned(),
            },
        );
    }

    pub fn set_stop(&mut self, name: &str) {
        self.stops.insert(name.to_owned());
    }

    /// Renders lines, bus labels, stop markers and stop labels, in that
    /// order. Everything is resolved and projected before the first element
    /// is drawn, so a failure never leaves a half drawn map behind.
    pub fn render_map(&self, catalogue: &Catalogue) -> Result<Document, RenderError> {
        let settings = self.settings.as_ref().ok_or(RenderError::MissingSettings)?;

        let stops: Vec<&Stop> = self
            .stops
            .iter()
            .filter_map(|name| catalogue.get_stop_data(name))
            .filter(|stop| stop.is_served())
            .collect();
        let coordinates: Vec<_> = stops.iter().map(|stop| stop.coordinates).collect();
        let projector = SphereProjector::new(
            &coordinates,
            settings.width,
            settings.height,
            settings.padding,
        );

        let routes = self.layout_routes(catalogue, &projector)?;
        let stops: Vec<(&str, Point)> = stops
            .iter()
            .map(|stop| (stop.name.as_str(), projector.project(stop.coordinates)))
            .collect();
        debug!(routes = routes.len(), stops = stops.len(), "Rendering map");

        let mut document = Document::default();
        render_route_lines(settings, &routes, &mut document);
        render_route_labels(settings, &routes, &mut document);
        render_stop_markers(settings, &stops, &mut document);
        render_stop_labels(settings, &stops, &mut document);
        Ok(document)
    }

    fn layout_routes<'a>(
        &'a self,
        catalogue: &Catalogue,
        projector: &SphereProjector,
    ) -> Result<Vec<RouteLayout<'a>>, RenderError> {
        let mut layouts = Vec::with_capacity(self.routes.len());

        for (name, ends) in &self.routes {
            let Some(bus) = catalogue.get_bus_data(name).filter(|bus| !bus.stops.is_empty()) else {
                continue;
            };

            // Route ends come from `set_route` and may name stops this
            // catalogue never saw.
            let position = |stop: &str| -> Result<Point, RenderError> {
                catalogue
                    .get_stop_data(stop)
                    .map(|stop| projector.project(stop.coordinates))
                    .ok_or_else(|| RenderError::UnknownStop {
                        stop: stop.to_owned(),
                        bus: name.to_owned(),
                    })
            };

            let points = bus
                .stops
                .iter()
                .map(|stop| position(stop.as_str()))
                .collect::<Result<Vec<Point>, RenderError>>()?;
            let first = position(ends.first_stop.as_str())?;
            let last = if has_second_label(bus, ends) {
                Some(position(ends.last_stop.as_str())?)
            } else {
                None
            };

            layouts.push(RouteLayout {
                name,
                points,
                first,
                last,
            });
        }

        Ok(layouts)
    }
}

fn has_second_label(bus: &Bus, ends: &RouteEnds) -> bool {
    bus.kind == RouteKind::Linear && ends.first_stop != ends.last_stop
}

fn render_route_lines(settings: &RenderSettings, routes: &[RouteLayout], document: &mut Document) {
    for (route, color) in routes.iter().zip(settings.color_palette.iter().cycle()) {
        let mut line = Polyline::default()
            .fill(Color::None)
            .stroke(color.clone())
            .stroke_width(settings.line_width)
            .line_cap(StrokeLineCap::Round)
            .line_join(StrokeLineJoin::Round);
        line.extend(route.points.iter().copied());
        document.add(line);
    }
}

fn render_route_labels(settings: &RenderSettings, routes: &[RouteLayout], document: &mut Document) {
    for (route, color) in routes.iter().zip(settings.color_palette.iter().cycle()) {
        let label = Text::default()
            .offset(settings.bus_label_offset)
            .font_size(settings.bus_label_font_size)
            .font_family(FONT_FAMILY)
            .font_weight("bold")
            .data(route.name);
        let background = underlay(settings, label.clone());
        let foreground = label.fill(color.clone());

        for position in std::iter::once(route.first).chain(route.last) {
            document.add(background.clone().position(position));
            document.add(foreground.clone().position(position));
        }
    }
}

fn render_stop_markers(settings: &RenderSettings, stops: &[(&str, Point)], document: &mut Document) {
    for &(_, position) in stops {
        document.add(
            Circle::default()
                .center(position)
                .radius(settings.stop_radius)
                .fill("white"),
        );
    }
}

fn render_stop_labels(settings: &RenderSettings, stops: &[(&str, Point)], document: &mut Document) {
    for &(name, position) in stops {
        let label = Text::default()
            .position(position)
            .offset(settings.stop_label_offset)
            .font_size(settings.stop_label_font_size)
            .font_family(FONT_FAMILY)
            .data(name);

        document.add(underlay(settings, label.clone()));
        document.add(label.fill("black"));
    }
}

fn underlay(settings: &RenderSettings, text: Text) -> Text {
    text.fill(settings.underlayer_color.clone())
        .stroke(settings.underlayer_color.clone())
        .stroke_width(settings.underlayer_width)
        .line_cap(StrokeLineCap::Round)
        .line_join(StrokeLineJoin::Round)
}
