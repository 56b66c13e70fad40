use std::env;
use std::net::SocketAddr;

use crate::fees::FeePolicy;

pub mod cors;
pub mod security;

pub use cors::create_cors_layer;
pub use security::apply_security_headers;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3001";
const DEFAULT_DATABASE_URL: &str = "postgres://localhost/carpark";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Which backing engine serves the ticket store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

impl StoreBackend {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "postgres" => Some(StoreBackend::Postgres),
            "memory" => Some(StoreBackend::Memory),
            _ => None,
        }
    }
}

pub struct Config {
    pub bind_addr: SocketAddr,
    pub database_url: String,
    pub database_max_connections: u32,
    pub store_backend: StoreBackend,
    pub fee_policy: FeePolicy,
}

impl Config {
    /// Read the deployment profile from the environment. Missing variables
    /// fall back to development defaults; present-but-invalid values are a
    /// deployment mistake and abort startup.
    pub fn from_env() -> Self {
        let bind_addr = env::var("BIND_ADDR")
            .unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string())
            .parse()
            .expect("BIND_ADDR must be a valid socket address");

        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string());

        let database_max_connections = match env::var("DATABASE_MAX_CONNECTIONS") {
            Ok(v) => v
                .parse()
                .expect("DATABASE_MAX_CONNECTIONS must be a positive integer"),
            Err(_) => DEFAULT_MAX_CONNECTIONS,
        };

        let store_backend = match env::var("TICKET_STORE") {
            Ok(name) => StoreBackend::from_name(&name)
                .expect("TICKET_STORE must be 'postgres' or 'memory'"),
            Err(_) => StoreBackend::Postgres,
        };

        let fee_policy = match env::var("FEE_POLICY") {
            Ok(name) => {
                FeePolicy::from_name(&name).expect("FEE_POLICY must be 'flat' or 'daily_capped'")
            }
            Err(_) => FeePolicy::Flat,
        };

        Self {
            bind_addr,
            database_url,
            database_max_connections,
            store_backend,
            fee_policy,
        }
    }
}
