use axum::{
    http::{
        header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    Server,
};

use sqlx::{migrate::MigrateDatabase, postgres::PgPoolOptions, Postgres};
use tower_http::cors::CorsLayer;
use tracing_subscriber::EnvFilter;

use std::{net::SocketAddr, sync::Arc};

use todo_api::{create_router, init_schema, AppState, Config};

// Entry point of the application
#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env();
    let db_url = config.database_url();

    // Check if the database exists, if not, create it
    if !Postgres::database_exists(&db_url).await.unwrap_or(false) {
        tracing::info!("creating database {}", config.postgres_db);
        if let Err(error) = Postgres::create_database(&db_url).await {
            tracing::error!("failed to create the database: {:?}", error);
            std::process::exit(1);
        }
    }

    // Connect to the database
    let pool = match PgPoolOptions::new().max_connections(10).connect(&db_url).await {
        Ok(pool) => {
            tracing::info!("connected to the database");
            pool
        }
        Err(err) => {
            tracing::error!("failed to connect to the database: {:?}", err);
            std::process::exit(1);
        }
    };

    // Create the 'users' and 'todos' tables if they don't exist
    if let Err(err) = init_schema(&pool).await {
        tracing::error!("failed to initialize the schema: {:?}", err);
        std::process::exit(1);
    }

    // Configure CORS settings for the application
    let cors_origin = match config.cors_origin.parse::<HeaderValue>() {
        Ok(origin) => origin,
        Err(err) => {
            tracing::error!("invalid CORS_ORIGIN {:?}: {:?}", config.cors_origin, err);
            std::process::exit(1);
        }
    };
    let cors = CorsLayer::new()
        .allow_origin(cors_origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_credentials(true)
        .allow_headers([AUTHORIZATION, ACCEPT, CONTENT_TYPE]);

    // Create an Arc-wrapped instance of the application state
    let app_state = Arc::new(AppState {
        db: pool.clone(),
        config,
    });

    // Create the Axum application with routes and middleware
    let app = create_router(app_state).layer(cors);

    // Specify the address and port to run the server on
    let addr = SocketAddr::from(([127, 0, 0, 1], 3000));
    tracing::info!("server listening on {}", addr);

    // Start the Axum server
    if let Err(err) = Server::bind(&addr).serve(app.into_make_service()).await {
        tracing::error!("server error: {:?}", err);
        std::process::exit(1);
    }
}
