use std::sync::Arc;

use sqlx::PgPool;

use clock::SystemClock;
use config::Config;
use models::PgMachineStore;
use services::{IfpaClient, MachineCache, OpdbClient, http_client};
use utils::TokenService;

pub mod clock;
pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod utils;

/// Machine cache backed by Postgres and the OPDB API.
pub type MachineService = MachineCache<PgMachineStore, OpdbClient>;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<Config>,
    pub tokens: Arc<TokenService>,
    pub machines: Arc<MachineService>,
    pub ifpa: Arc<IfpaClient>,
}

impl AppState {
    pub fn new(pool: PgPool, config: Config) -> Result<Self, reqwest::Error> {
        let client = http_client(config.http_timeout())?;

        let tokens = TokenService::from_config(&config);
        let machines = MachineCache::new(
            PgMachineStore::new(pool.clone()),
            OpdbClient::from_config(client.clone(), &config),
            Arc::new(SystemClock),
            config.machine_freshness(),
        );
        let ifpa = IfpaClient::from_config(client, &config);

        Ok(Self {
            pool,
            config: Arc::new(config),
            tokens: Arc::new(tokens),
            machines: Arc::new(machines),
            ifpa: Arc::new(ifpa),
        })
    }
}
