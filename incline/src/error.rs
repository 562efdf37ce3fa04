use dem::DemError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum InclineError {
    #[error("invalid configuration: {0}")]
    Builder(String),

    #[error("unknown interpolation method {0:?}")]
    InvalidMethod(String),

    #[error("{rows}x{cols} window not supported by {method}")]
    WindowShape {
        method: &'static str,
        rows: usize,
        cols: usize,
    },

    #[error("coordinate ({lon}, {lat}) outside projection domain")]
    OutOfDomain { lon: f64, lat: f64 },

    #[error("non-finite incline")]
    NonFinite,

    #[error("{0}")]
    Dem(#[from] DemError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    GeoJson(#[from] geojson::Error),

    #[error("{0}")]
    Graph(String),
}
