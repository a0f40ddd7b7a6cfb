//! JSON request document: network definition, render settings and the
//! statistics queries answered against them.

use std::{
    collections::BTreeMap,
    io::{Read, Write},
};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{
    error::RequestError, geo::Coordinates, handler::RequestHandler, renderer::RenderSettings,
};

const NOT_FOUND: &str = "not found";

#[derive(Deserialize, Debug)]
#[serde(tag = "type")]
pub enum BaseRequest {
    Stop {
        name: String,
        latitude: f64,
        longitude: f64,
        #[serde(default)]
        road_distances: BTreeMap<String, u32>,
    },
    Bus {
        name: String,
        stops: Vec<String>,
        is_roundtrip: bool,
    },
}

#[derive(Deserialize, Debug)]
#[serde(tag = "type")]
pub enum StatRequest {
    Bus { id: i64, name: String },
    Stop { id: i64, name: String },
    Map { id: i64 },
}

#[derive(Deserialize, Debug, Default)]
pub struct RequestDocument {
    #[serde(default)]
    pub base_requests: Vec<BaseRequest>,
    #[serde(default)]
    pub render_settings: Option<RenderSettings>,
    #[serde(default)]
    pub stat_requests: Vec<StatRequest>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum StatResponse {
    Bus {
        curvature: f64,
        request_id: i64,
        route_length: u64,
        stop_count: usize,
        unique_stop_count: usize,
    },
    Stop {
        buses: Vec<String>,
        request_id: i64,
    },
    Map {
        map: String,
        request_id: i64,
    },
    NotFound {
        request_id: i64,
        error_message: String,
    },
}

impl StatResponse {
    fn not_found(request_id: i64) -> Self {
        StatResponse::NotFound {
            request_id,
            error_message: NOT_FOUND.to_owned(),
        }
    }
}

impl RequestDocument {
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, RequestError> {
        Ok(serde_json::from_reader(reader)?)
    }

    /// Builds the network: stops first, then road distances, then buses, so
    /// bus metrics see every distance given in the document.
    pub fn apply(&self, handler: &mut RequestHandler) -> Result<(), RequestError> {
        info!(requests = self.base_requests.len(), "Processing base requests");

        for request in &self.base_requests {
            if let BaseRequest::Stop {
                name,
                latitude,
                longitude,
                ..
            } = request
            {
                handler.add_stop(name, Coordinates::new(*latitude, *longitude))?;
            }
        }

        for request in &self.base_requests {
            if let BaseRequest::Stop {
                name,
                road_distances,
                ..
            } = request
            {
                for (to, &meters) in road_distances {
                    handler.set_distance(name, to, meters)?;
                }
            }
        }

        for request in &self.base_requests {
            if let BaseRequest::Bus {
                name,
                stops,
                is_roundtrip,
            } = request
            {
                handler.add_route(name, stops, *is_roundtrip)?;
            }
        }

        if let Some(settings) = &self.render_settings {
            handler.set_renderer_settings(settings.clone())?;
        }
        Ok(())
    }

    pub fn answer(&self, handler: &RequestHandler) -> Result<Vec<StatResponse>, RequestError> {
        info!(requests = self.stat_requests.len(), "Processing stat requests");

        self.stat_requests
            .iter()
            .map(|request| answer_one(handler, request))
            .collect()
    }
}

fn answer_one(handler: &RequestHandler, request: &StatRequest) -> Result<StatResponse, RequestError> {
    debug!(?request, "Answering");

    Ok(match request {
        StatRequest::Bus { id, name } => match handler.get_bus_data(name) {
            Some(bus) => StatResponse::Bus {
                curvature: bus.curvature,
                request_id: *id,
                route_length: bus.route_length,
                stop_count: bus.stops_on_route,
                unique_stop_count: bus.unique_stops,
            },
            None => StatResponse::not_found(*id),
        },
        StatRequest::Stop { id, name } => match handler.get_stop_data(name) {
            Some(stop) => StatResponse::Stop {
                buses: stop.buses.iter().cloned().collect(),
                request_id: *id,
            },
            None => StatResponse::not_found(*id),
        },
        StatRequest::Map { id } => {
            let mut map = handler.render_map()?.to_string();
            if map.ends_with('\n') {
                map.pop();
            }
            StatResponse::Map {
                map,
                request_id: *id,
            }
        }
    })
}

/// Reads a request document, builds the network and writes the answers as a
/// JSON array.
pub fn process<R: Read, W: Write>(input: R, mut output: W) -> Result<(), RequestError> {
    let document = RequestDocument::from_reader(input)?;
    let mut handler = RequestHandler::default();

    document.apply(&mut handler)?;
    let responses = document.answer(&handler)?;

    serde_json::to_writer_pretty(&mut output, &responses)?;
    writeln!(output)?;
    Ok(())
}
