//! Transit network catalogue with route statistics and a schematic SVG map
//! renderer, driven by a JSON request document.

pub mod catalogue;
pub mod data;
pub mod error;
pub mod geo;
pub mod handler;
pub mod projector;
pub mod renderer;
pub mod requests;
pub mod svg;
