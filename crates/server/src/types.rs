use serde::{Deserialize, Serialize};

/// Service metadata returned by `GET /`.
#[derive(Serialize, Deserialize, Debug)]
pub struct ServiceInfo {
    pub title: String,
    pub description: String,
    pub version: String,
}
