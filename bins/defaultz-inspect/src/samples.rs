//! Built-in sample records to inspect.

use std::collections::BTreeMap;
use std::time::Duration;

use clap::ValueEnum;
use defaultz_api::{Record, Shape, Value};
use defaultz_engine::Registry;
use serde::Serialize;

use crate::InspectError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Sample {
    /// HTTP server settings with nested TLS and limits.
    Server,
    /// Background worker settings with queues and backoff.
    Worker,
}

impl Sample {
    pub fn shape(self) -> Shape {
        match self {
            Sample::Server => ServerConfig::describe(),
            Sample::Worker => WorkerConfig::describe(),
        }
    }

    /// Default instance after `registry` filled it, as JSON.
    pub fn apply(self, registry: &Registry) -> Result<serde_json::Value, InspectError> {
        match self {
            Sample::Server => applied::<ServerConfig>(registry),
            Sample::Worker => applied::<WorkerConfig>(registry),
        }
    }
}

fn applied<T: Value + Default + Serialize>(registry: &Registry) -> Result<serde_json::Value, InspectError> {
    let mut value = T::default();
    registry.apply_defaults(&mut value)?;
    Ok(serde_json::to_value(&value)?)
}

#[derive(Record, Serialize, Debug, Default)]
pub struct ServerConfig {
    #[tag(default = "0.0.0.0", jsonschema = "title=Host#default=127.0.0.1")]
    pub host: String,
    #[tag(default = "8080", jsonschema = "title=Port#default=9090")]
    pub port: u16,
    #[tag(default = "30s", jsonschema = "default=1m")]
    pub idle_timeout: Duration,
    #[tag(default = "GET HEAD", jsonschema = "default=GET")]
    pub methods: Vec<String>,
    pub limits: Limits,
    pub tls: Option<Tls>,
}

#[derive(Record, Serialize, Debug, Default)]
pub struct Limits {
    #[tag(default = "1048576")]
    pub max_body_bytes: u64,
    #[tag(default = "256")]
    pub max_connections: u32,
    #[tag(default = "read:5s write:10s")]
    pub deadlines: BTreeMap<String, String>,
}

#[derive(Record, Serialize, Debug, Default)]
pub struct Tls {
    #[tag(default = "/etc/ssl/cert.pem")]
    pub cert_path: String,
    #[tag(default = "/etc/ssl/key.pem")]
    pub key_path: String,
    #[tag(default = "true")]
    pub verify_peer: bool,
}

#[derive(Record, Serialize, Debug, Default)]
pub struct WorkerConfig {
    #[tag(default = "4", jsonschema = "default=8")]
    pub concurrency: usize,
    #[tag(default = "default:10 bulk:1")]
    pub queue_weights: BTreeMap<String, u32>,
    #[tag(default = "0.5")]
    pub jitter: f64,
    #[tag(default = "100ms 1s 10s")]
    pub backoff_steps: Vec<String>,
    #[tag(default = "1h")]
    pub max_runtime: Option<Duration>,
    pub retry: [Retry; 2],
}

#[derive(Record, Serialize, Debug, Default)]
pub struct Retry {
    #[tag(default = "3")]
    pub attempts: u8,
    #[tag(default = "false")]
    pub dead_letter: bool,
}
