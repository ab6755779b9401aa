use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use std::sync::Arc;
use std::time::Duration;

use taskplane::auth::TokenIssuer;
use taskplane::config::Config;
use taskplane::routes::{self, health};
use taskplane::state::AppState;
use taskplane::storage::{PgStorage, RevocationLedger, Storage};

// Expired ledger entries carry no information once the token itself would be
// rejected as expired; sweep them hourly to keep the table bounded.
const LEDGER_SWEEP_INTERVAL: Duration = Duration::from_secs(3600);

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init();
    lazy_static::initialize(&health::APP_START);

    let config = Config::from_env();

    let pool = sqlx::PgPool::connect(&config.database_url)
        .await
        .expect("Failed to connect to database");
    let storage: Arc<dyn Storage> = Arc::new(PgStorage::new(pool));

    let state = web::Data::new(AppState::new(
        Arc::clone(&storage),
        TokenIssuer::new(&config.jwt_secret),
    ));

    {
        let storage = Arc::clone(&storage);
        actix_web::rt::spawn(async move {
            let mut ticker = actix_web::rt::time::interval(LEDGER_SWEEP_INTERVAL);
            loop {
                ticker.tick().await;
                match storage.prune_expired(chrono::Utc::now()).await {
                    Ok(0) => {}
                    Ok(removed) => log::info!("pruned {} expired revoked tokens", removed),
                    Err(e) => log::warn!("revocation ledger sweep failed: {}", e),
                }
            }
        });
    }

    log::info!("Starting taskplane server at {}", config.server_url());

    let bind_addr = (config.server_host.clone(), config.server_port);
    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .app_data(routes::json_config())
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .wrap(Logger::default())
            .service(health::health)
            .service(health::ready)
            .service(web::scope("/api").configure(routes::config))
    })
    .bind(bind_addr)?
    .run()
    .await
}
