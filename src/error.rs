use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CatalogueError {
    #[error("No such Stop {stop:?}")]
    UnknownStop { stop: String },

    #[error("Stop {stop:?} is already defined")]
    DuplicateStop { stop: String },

    #[error("Bus {bus:?} is already defined")]
    DuplicateRoute { bus: String },

    #[error("Road distance from {from:?} to {to:?} must be positive")]
    NonPositiveDistance { from: String, to: String },

    #[error("Bus {bus:?} has road length {road_length} over a zero geographic length")]
    DegenerateGeometry { bus: String, road_length: u64 },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RenderError {
    #[error("The color palette must contain at least one color")]
    EmptyPalette,

    #[error("Render settings were never set")]
    MissingSettings,

    #[error("No such Stop {stop:?} on Bus {bus:?}")]
    UnknownStop { stop: String, bus: String },
}

#[derive(Error, Debug)]
pub enum RequestError {
    #[error("Malformed request document: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Catalogue(#[from] CatalogueError),

    #[error(transparent)]
    Render(#[from] RenderError),
}
