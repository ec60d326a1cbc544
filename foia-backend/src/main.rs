use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use dotenv::dotenv;
use std::sync::Arc;

mod agents;
mod ai;
mod config;
mod controllers;
mod db;
mod error;
mod models;
mod scheduler;

use agents::worker::WorkerPool;
use agents::AgentExecutor;
use ai::OpenAiGateway;
use config::Config;
use db::Database;
use scheduler::Scheduler;

pub struct AppState {
    pub db: Arc<Database>,
    pub config: Config,
    pub executor: Arc<AgentExecutor>,
    pub worker_pool: Arc<WorkerPool>,
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::init();

    let config = Config::from_env();
    let port = config.port;

    log::info!("Initializing database at {}", config.database_url);
    let db = Database::new(&config.database_url).expect("Failed to initialize database");
    let db = Arc::new(db);

    log::info!(
        "Initializing LLM gateway for {} at {}",
        config.llm_model,
        config.llm_endpoint
    );
    let gateway = OpenAiGateway::from_config(&config).expect("Failed to initialize LLM gateway");
    let executor = Arc::new(AgentExecutor::new(
        db.clone(),
        Arc::new(gateway),
        config.llm_model.clone(),
    ));

    log::info!("Starting {} agent worker(s)", config.worker_count);
    let worker_pool = Arc::new(WorkerPool::start(config.worker_count, executor.clone()));

    log::info!("Initializing scheduler");
    let scheduler = Arc::new(
        Scheduler::new(db.clone(), executor.clone(), &config)
            .expect("Failed to initialize scheduler"),
    );
    let scheduler_handle = Arc::clone(&scheduler);
    let (_scheduler_shutdown_tx, scheduler_shutdown_rx) = tokio::sync::oneshot::channel();
    tokio::spawn(async move {
        scheduler_handle.start(scheduler_shutdown_rx).await;
    });

    log::info!("Starting FOIA agent backend on port {}", port);

    let app_config = config.clone();
    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header()
            .max_age(3600);

        App::new()
            .app_data(web::Data::new(AppState {
                db: Arc::clone(&db),
                config: app_config.clone(),
                executor: Arc::clone(&executor),
                worker_pool: Arc::clone(&worker_pool),
            }))
            .wrap(Logger::default())
            .wrap(cors)
            .configure(controllers::health::config)
            // specific scopes must register before the /api/agents scope
            .configure(controllers::tasks::config)
            .configure(controllers::suggestions::config)
            .configure(controllers::agents::config)
    })
    .bind(("0.0.0.0", port))?
    .run()
    .await
}
