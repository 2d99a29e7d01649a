//! Rental marketplace web service
//!
//! (c) Softlandia 2025

use rental_market_api::api;
use rental_market_api::core::services::{
    MyBookingService, MyItemService, MyRequestService, MyUserService,
};
use rental_market_api::infrastructure::database::DatabaseConnection;
use rental_market_api::infrastructure::repositories::{
    DbBookingRepository, DbCommentRepository, DbItemRepository, DbRequestRepository,
    DbUserRepository,
};

use anyhow::anyhow;
use axum::Router;
use axum::http::{HeaderValue, Method};
use di::{Injectable, ServiceCollection};
use di_axum::RouterServiceProviderExtensions;
use log::info;
use std::env;
use tokio::runtime::{Builder, Runtime};
use tower_http::cors::{Any, CorsLayer};

fn main() -> anyhow::Result<()> {
    // initialize tracing
    tracing_subscriber::fmt::init();

    let runtime: Runtime = Builder::new_multi_thread().enable_all().build()?;
    runtime.block_on(web_server_task())
}

async fn web_server_task() -> anyhow::Result<()> {
    let provider = ServiceCollection::new()
        .add(DatabaseConnection::singleton())
        .add(DbUserRepository::scoped())
        .add(DbItemRepository::scoped())
        .add(DbBookingRepository::scoped())
        .add(DbRequestRepository::scoped())
        .add(DbCommentRepository::scoped())
        .add(MyBookingService::scoped())
        .add(MyItemService::scoped())
        .add(MyUserService::scoped())
        .add(MyRequestService::scoped())
        .build_provider()
        .map_err(|e| anyhow!("failed to build service provider: {e}"))?;

    let connection = provider.get_required::<DatabaseConnection>();
    sqlx::migrate!().run(&**connection).await?;

    // build our application with a route
    let app = Router::new()
        .nest("/bookings", api::bookings::router())
        .nest("/items", api::items::router())
        .nest("/users", api::users::router())
        .nest("/requests", api::requests::router())
        .layer(
            CorsLayer::new()
                .allow_headers(Any)
                .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
                .allow_origin([
                    "http://localhost:3000".parse::<HeaderValue>().unwrap(),
                    "http://localhost:5173".parse::<HeaderValue>().unwrap(),
                ]),
        )
        .with_provider(provider);

    let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:9090".to_owned());
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    info!("Shutting down...");

    Ok(())
}
