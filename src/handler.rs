use tracing::info;

use crate::{
    catalogue::Catalogue,
    data::{Bus, RouteKind, Stop},
    error::{CatalogueError, RenderError},
    geo::Coordinates,
    renderer::{MapRenderer, RenderSettings},
    svg::Document,
};

/// Single entry point keeping the catalogue and the map renderer in step.
#[derive(Debug, Default)]
pub struct RequestHandler {
    catalogue: Catalogue,
    renderer: MapRenderer,
}

impl RequestHandler {
    pub fn add_stop(&mut self, name: &str, coordinates: Coordinates) -> Result<(), CatalogueError> {
        self.catalogue.add_stop(name, coordinates)?;
        self.renderer.set_stop(name);
        Ok(())
    }

    pub fn add_route(
        &mut self,
        name: &str,
        stops: &[String],
        is_roundtrip: bool,
    ) -> Result<(), CatalogueError> {
        self.catalogue
            .add_route(name, stops, RouteKind::from_roundtrip_flag(is_roundtrip))?;

        if let (Some(first_stop), Some(last_stop)) = (stops.first(), stops.last()) {
            self.renderer.set_route(name, first_stop, last_stop);
        }
        Ok(())
    }

    pub fn set_distance(&mut self, from: &str, to: &str, meters: u32) -> Result<(), CatalogueError> {
        self.catalogue.set_distance(from, to, meters)
    }

    pub fn set_renderer_settings(&mut self, settings: RenderSettings) -> Result<(), RenderError> {
        info!(
            width = settings.width,
            height = settings.height,
            colors = settings.color_palette.len(),
            "Applying render settings"
        );
        self.renderer.set_settings(settings)
    }

    pub fn get_bus_data(&self, name: &str) -> Option<&Bus> {
        self.catalogue.get_bus_data(name)
    }

    pub fn get_stop_data(&self, name: &str) -> Option<&Stop> {
        self.catalogue.get_stop_data(name)
    }

    pub fn render_map(&self) -> Result<Document, RenderError> {
        self.renderer.render_map(&self.catalogue)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::{geo::compute_distance, svg::Color};

    fn settings() -> RenderSettings {
        RenderSettings {
            width: 200.0,
            height: 200.0,
            padding: 30.0,
            line_width: 14.0,
            stop_radius: 5.0,
            bus_label_font_size: 20,
            bus_label_offset: [7.0, 15.0].into(),
            stop_label_font_size: 20,
            stop_label_offset: [7.0, -3.0].into(),
            underlayer_color: Color::Rgba(255, 255, 255, 0.85),
            underlayer_width: 3.0,
            color_palette: vec!["green".into()],
        }
    }

    fn handler() -> RequestHandler {
        let mut handler = RequestHandler::default();
        handler.add_stop("A", Coordinates::new(0.0, 0.0)).unwrap();
        handler.add_stop("B", Coordinates::new(0.0, 1.0)).unwrap();
        handler.set_distance("A", "B", 1000).unwrap();
        handler
            .add_route("1", &["A".to_string(), "B".to_string()], false)
            .unwrap();
        handler
    }

    #[test]
    fn test_bus_statistics() {
        let handler = handler();

        let bus = handler.get_bus_data("1").unwrap();
        let one_way = compute_distance(Coordinates::new(0.0, 0.0), Coordinates::new(0.0, 1.0));
        assert_eq!(bus.stops_on_route, 3);
        assert_eq!(bus.unique_stops, 2);
        assert_eq!(bus.route_length, 2000);
        assert_relative_eq!(bus.curvature, 2000.0 / (2.0 * one_way));
    }

    #[test]
    fn test_unknown_stop_is_not_found() {
        let handler = handler();

        assert!(handler.get_stop_data("Z").is_none());
        assert!(handler.get_bus_data("Z").is_none());
    }

    #[test]
    fn test_failed_route_is_not_rendered() {
        let mut handler = handler();
        handler.set_renderer_settings(settings()).unwrap();
        let before = handler.render_map().unwrap();

        assert!(handler
            .add_route("2", &["A".to_string(), "Z".to_string()], false)
            .is_err());
        assert_eq!(handler.render_map().unwrap(), before);
    }

    #[test]
    fn test_render_map_draws_both_ends_of_linear_route() {
        let mut handler = handler();
        handler.set_renderer_settings(settings()).unwrap();

        let rendered = handler.render_map().unwrap().to_string();

        assert!(rendered.contains("<polyline points=\"30,30 170,30 30,30\""));
        assert_eq!(rendered.matches(">1</text>").count(), 4);
        assert!(rendered.contains("<circle cx=\"170\" cy=\"30\" r=\"5\" fill=\"white\"/>"));
    }
}
