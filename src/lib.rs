#[macro_use]
extern crate rocket;
#[macro_use]
extern crate serde;

use std::sync::Arc;

use error::BackendError;
use rocket::fairing::AdHoc;
use rocket::http::Method;
use rocket::{Build, Rocket};
use rocket_cors::{AllowedHeaders, AllowedOrigins};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use crate::config::{Config, Storage};
use crate::error::ConfigurationError;
use crate::route::{mount_api, StoreState};
use crate::store::{MemoryStore, Store};

pub mod config;
pub mod data;
pub mod error;
pub mod resp;
pub mod route;
pub mod store;
pub mod util;

pub async fn create(log_level: Option<Level>) -> Result<Rocket<Build>, BackendError> {
    if let Some(l) = log_level {
        let subscriber = FmtSubscriber::builder().with_max_level(l).finish();

        if let Err(err) = tracing::subscriber::set_global_default(subscriber) {
            eprintln!("Unable to set global logger: {}", err);
        };
        if let Err(err) = tracing_log::LogTracer::init() {
            eprintln!("Unable to forward log records: {}", err);
        }
    }

    tracing::info!("Reading .env file...");
    if dotenv::dotenv().is_err() {
        tracing::warn!("Unable to load .env file.");
    }

    tracing::info!("Loading configuration...");
    let c = match Config::load() {
        Ok(c) => {
            tracing::info!("Configuration loaded.");
            c
        }
        Err(ConfigurationError::NotFound(_)) => {
            let c = Config::default();
            if c.save().is_err() {
                tracing::warn!("Unable to save generated configuration.");
            }
            c
        }
        Err(other) => {
            tracing::error!("Configuration error: {}", other);
            return Err(other.into());
        }
    };

    let store: Arc<dyn Store> = match c.storage {
        Storage::MongoDb => {
            tracing::info!("Connecting to MongoDB: {}", c.mongodb_uri);
            let db = store::mongo::connect(&c.mongodb_uri, &c.mongodb_db)
                .await
                .map_err(|err| {
                    tracing::error!("Unable to connect to MongoDB: {}", err);
                    err
                })?;
            tracing::info!("Using MongoDB database: {}", c.mongodb_db);
            Arc::new(db)
        }
        Storage::Memory => {
            tracing::warn!("Using in-memory storage, data won't survive a restart.");
            Arc::new(MemoryStore::new())
        }
    };

    build(store)
}

/// Assembles the server around an already opened store.
pub fn build(store: Arc<dyn Store>) -> Result<Rocket<Build>, BackendError> {
    tracing::info!("Starting HTTP server...");
    let mut r = rocket::build().manage::<StoreState>(store);

    tracing::info!("Setting up CORS...");
    let cors = rocket_cors::CorsOptions {
        allowed_origins: AllowedOrigins::All,
        allowed_methods: vec![Method::Get, Method::Put, Method::Post, Method::Delete]
            .into_iter()
            .map(From::from)
            .collect(),
        allowed_headers: AllowedHeaders::All,
        allow_credentials: true,
        ..Default::default()
    }
    .to_cors()?;

    r = r.attach(cors);
    r = r.attach(AdHoc::on_shutdown("Close data store", |rocket| {
        Box::pin(async move {
            if let Some(store) = rocket.state::<StoreState>() {
                if let Err(err) = store.close().await {
                    tracing::error!("Unable to close data store: {}", err);
                }
            }
        })
    }));
    r = mount_api(r);

    Ok(r)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rocket::local::asynchronous::Client;

    #[rocket::async_test]
    async fn only_the_store_is_managed() {
        let rocket = build(Arc::new(MemoryStore::new())).expect("invalid backend");
        let client = Client::tracked(rocket).await.expect("invalid backend");

        assert!(client.rocket().state::<StoreState>().is_some());
        assert!(client.rocket().state::<Config>().is_none());
    }
}
