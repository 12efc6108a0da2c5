use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};

use cbt_server::{app_state::AppState, config::Config, handlers};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init();

    let config = Config::from_env();
    let host = config.web_server_host.clone();
    let port = config.web_server_port;

    let state = AppState::new(config)
        .await
        .map_err(|err| std::io::Error::other(err.to_string()))?;

    log::info!("starting cbt-server on {}:{}", host, port);

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(state.clone()))
            .wrap(Logger::default())
            .wrap(Cors::permissive())
            .service(handlers::health_check)
            .service(handlers::get_exam)
            .service(handlers::start_attempt)
            .service(handlers::record_answer)
            .service(handlers::submit_attempt)
    })
    .bind((host.as_str(), port))?
    .run()
    .await
}
