use database::{seed::seed_from_file, DatabaseConnectionInfo, PgDatabase};
use geocoding::GeocodingClient;
use parking::Client;
use web::{config::Config, start_web_server, WebState};

#[tokio::main]
async fn main() {
    env_logger::init();

    let config = Config::from_env().expect("invalid configuration in env.");
    if config.admin_key.is_none() {
        log::warn!("ADMIN_ACCESS_KEY is not set, admin routes are closed");
    }

    // database
    let database_connection_info = DatabaseConnectionInfo::from_env()
        .expect("expected database connection info in env.");
    let database = PgDatabase::connect(database_connection_info)
        .await
        .expect("could not connect to database.");
    let parking_client = Client::new(database.clone());

    // seed
    if let Some(path) = &config.seed_csv {
        match seed_from_file(&parking_client, path).await {
            Ok(report) => log::debug!("seed report: {:?}", report),
            Err(why) => log::error!("could not seed from {}: {}", path.display(), why),
        }
    }

    // geocoding
    let geocoding_client = GeocodingClient::from_env();
    if geocoding_client.is_none() {
        log::warn!("GOOGLE_MAPS_API_KEY is not set, geocoding is unavailable");
    }

    // web server
    let state = WebState::new(parking_client, geocoding_client, &config);
    if let Err(why) = start_web_server(state, config.bind_address).await {
        log::error!("web server failed: {}", why);
    }

    database.close().await;
}
