mod client;

pub use client::{ModelClient, PredictRequest, PredictResponse, RemoteModelClient, parse_row};
