use std::{process, sync::Arc, time::Duration};

use jokeminute::{
    application::{
        error::AppError,
        health::HealthService,
        jokes::JokeService,
        repos::{JokesRepo, JokesSeedRepo},
        seed::{SeedOutcome, SeedService},
    },
    cache::{CacheConfig, JokeCache, build_backend},
    config,
    infra::{
        db::PostgresRepositories,
        error::InfraError,
        http::{self, HttpState},
        telemetry,
    },
};
use sqlx::PgPool;
use tracing::{Dispatch, Level, dispatcher, error, info, warn};
use tracing_subscriber::fmt as tracing_fmt;

const MIGRATION_RETRY: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt().with_max_level(Level::ERROR).finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli()
        .map_err(|err| AppError::unexpected(format!("failed to load configuration: {err}")))?;

    let command = cli_args
        .command
        .unwrap_or(config::Command::Serve(Box::<config::ServeArgs>::default()));

    telemetry::init(&settings.logging).map_err(AppError::from)?;

    match command {
        config::Command::Serve(_) => run_serve(settings).await,
        config::Command::Seed(args) => run_seed(settings, args).await,
    }
}

async fn run_serve(settings: config::Settings) -> Result<(), AppError> {
    let pool = init_pool(&settings)?;
    // Serve straight away; /health reports the store until migrations land.
    tokio::spawn(PostgresRepositories::migrate_until_ready(
        pool.clone(),
        MIGRATION_RETRY,
    ));
    let repositories = Arc::new(PostgresRepositories::new(pool));
    let cache = init_cache(&settings)?;

    let jokes_repo: Arc<dyn JokesRepo> = repositories.clone();
    let state = HttpState {
        jokes: Arc::new(JokeService::new(jokes_repo.clone(), cache.clone())),
        health: Arc::new(HealthService::new(jokes_repo, cache)),
    };

    serve_http(&settings, state).await
}

async fn run_seed(settings: config::Settings, args: config::SeedArgs) -> Result<(), AppError> {
    let pool = init_pool(&settings)?;
    PostgresRepositories::run_migrations(&pool)
        .await
        .map_err(|err| AppError::from(InfraError::migration(err.to_string())))?;
    let repositories = Arc::new(PostgresRepositories::new(pool));
    let cache = init_cache(&settings)?;

    let reader: Arc<dyn JokesRepo> = repositories.clone();
    let writer: Arc<dyn JokesSeedRepo> = repositories;
    let service = SeedService::new(reader, writer, cache);

    let outcome = service.run(args.force).await?;

    match outcome {
        SeedOutcome::Unchanged { count } => {
            info!(target = "jokeminute::seed", count, "Seed skipped");
        }
        SeedOutcome::Replaced { previous, inserted } => {
            info!(
                target = "jokeminute::seed",
                previous, inserted, "Seed completed"
            );
        }
    }
    Ok(())
}

fn init_pool(settings: &config::Settings) -> Result<PgPool, AppError> {
    let database_url = settings
        .database
        .url
        .as_ref()
        .ok_or_else(|| InfraError::configuration("database url is not configured"))
        .map_err(AppError::from)?;

    PostgresRepositories::connect_lazy(
        database_url,
        settings.database.max_connections.get(),
        settings.database.acquire_timeout,
    )
    .map_err(|err| AppError::from(InfraError::database(err.to_string())))
}

fn init_cache(settings: &config::Settings) -> Result<JokeCache, AppError> {
    let cache_config = CacheConfig::from(&settings.cache);
    let backend = build_backend(&cache_config)?;
    Ok(JokeCache::new(backend, &cache_config))
}

async fn serve_http(settings: &config::Settings, state: HttpState) -> Result<(), AppError> {
    let router = http::build_router(state);

    let listener = tokio::net::TcpListener::bind(settings.server.addr)
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;

    info!(
        target = "jokeminute::http",
        addr = %settings.server.addr,
        "Listening"
    );

    let grace = settings.server.graceful_shutdown;
    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal(grace))
        .await
        .map_err(|err| AppError::unexpected(format!("server error: {err}")))?;

    Ok(())
}

async fn shutdown_signal(grace: Duration) {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(
            target = "jokeminute::http",
            error = %err,
            "Failed to listen for shutdown signal"
        );
        std::future::pending::<()>().await;
    }

    info!(
        target = "jokeminute::http",
        grace_seconds = grace.as_secs(),
        "Shutdown requested; draining connections"
    );

    tokio::spawn(async move {
        tokio::time::sleep(grace).await;
        warn!(
            target = "jokeminute::http",
            "Graceful shutdown timed out; exiting"
        );
        process::exit(1);
    });
}
