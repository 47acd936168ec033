//! Candor service binary.
//!
//! Boots the full stack: configuration, database pool, drill catalog,
//! scoring workers, event subscriptions, the weekly report scheduler,
//! and the HTTP API.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use candor::adapters::http::{api_router, InsightsHandlers, SessionHandlers};
use candor::adapters::postgres::{
    PostgresEmailSendStore, PostgresExchangeLog, PostgresMembershipReader,
    PostgresProcessedEventStore, PostgresProgressRepository, PostgresScoreStore,
    PostgresSessionReader, PostgresSessionRepository,
};
use candor::adapters::{
    HttpScoringOracle, IdempotentHandler, InMemoryEventBus, OracleConfig, ResendConfig,
    ResendEmailSender, ScoringWorkerConfig, ScoringWorkerPool, TokioScoringQueue, WeeklyScheduler,
    WeeklySchedulerConfig,
};
use candor::application::{
    ContinueSessionHandler, ExchangeBudget, GetInsightStatusHandler, GetInsightsHandler,
    GetProgressHandler, ScoreResponseHandler, StartSessionHandler, SubmitResponseHandler,
    TeaserMailer, WeeklyReportMailer,
};
use candor::config::AppConfig;
use candor::domain::catalog::CriteriaRegistry;
use candor::domain::notification::EmailComposer;
use candor::domain::scoring::Grader;
use candor::ports::{
    EmailSendStore, EmailSender, EventPublisher, EventSubscriber, ExchangeLog, MembershipReader,
    ProcessedEventStore, ProgressRepository, ScoreStore, ScoringOracle, ScoringQueue,
    SessionReader, SessionRepository,
};

/// Jobs the scoring queue holds before refusing new ones.
const SCORING_QUEUE_CAPACITY: usize = 256;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load()?;
    config.validate()?;

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&config.server.log_level))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(environment = ?config.server.environment, "Starting candor");

    // Database
    let pool = config
        .database
        .pool_options()
        .connect(&config.database.url)
        .await?;
    if config.database.run_migrations {
        info!("Running database migrations");
        sqlx::migrate!().run(&pool).await?;
    }

    // Drill catalog
    let registry = match &config.catalog_path {
        Some(path) => {
            info!(%path, "Loading drill catalog");
            CriteriaRegistry::load_from_path(path)?
        }
        None => CriteriaRegistry::builtin(),
    };
    let registry = Arc::new(registry);

    // Persistence
    let sessions: Arc<dyn SessionRepository> =
        Arc::new(PostgresSessionRepository::new(pool.clone()));
    let session_reader: Arc<dyn SessionReader> = Arc::new(PostgresSessionReader::new(pool.clone()));
    let exchanges: Arc<dyn ExchangeLog> = Arc::new(PostgresExchangeLog::new(pool.clone()));
    let progress: Arc<dyn ProgressRepository> =
        Arc::new(PostgresProgressRepository::new(pool.clone()));
    let scores: Arc<dyn ScoreStore> = Arc::new(PostgresScoreStore::new(pool.clone()));
    let email_store: Arc<dyn EmailSendStore> = Arc::new(PostgresEmailSendStore::new(pool.clone()));
    let processed_events: Arc<dyn ProcessedEventStore> =
        Arc::new(PostgresProcessedEventStore::new(pool.clone()));
    let memberships: Arc<dyn MembershipReader> =
        Arc::new(PostgresMembershipReader::new(pool.clone()));

    // Event bus
    let event_bus = Arc::new(InMemoryEventBus::new());
    let event_publisher: Arc<dyn EventPublisher> = event_bus.clone();

    // Scoring oracle and queue
    let oracle: Arc<dyn ScoringOracle> = Arc::new(HttpScoringOracle::new(
        OracleConfig::new(config.oracle.api_key.clone())
            .with_base_url(config.oracle.base_url.clone())
            .with_timeout(config.oracle.timeout()),
    ));
    let (scoring_queue, scoring_rx) = TokioScoringQueue::bounded(SCORING_QUEUE_CAPACITY);
    let scoring_queue: Arc<dyn ScoringQueue> = Arc::new(scoring_queue);

    // Background tasks share one shutdown signal.
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    // Scoring workers
    let score_handler = Arc::new(ScoreResponseHandler::new(
        oracle.clone(),
        scores.clone(),
        progress.clone(),
        event_publisher.clone(),
        registry.clone(),
        Grader::new(config.scoring.penalty_per_violation),
        config.scoring.count_iterations,
    ));
    let worker_pool = ScoringWorkerPool::with_config(
        score_handler,
        ScoringWorkerConfig::default()
            .with_workers(config.oracle.workers)
            .with_max_attempts(config.oracle.max_attempts)
            .with_retry_backoff(config.oracle.retry_backoff()),
    );
    let worker_handles = worker_pool.spawn(scoring_rx, shutdown_rx.clone());

    // Notifications
    let email_sender: Arc<dyn EmailSender> = Arc::new(ResendEmailSender::new(
        ResendConfig::new(config.email.resend_api_key.clone()).with_from(
            config.email.from_name.clone(),
            config.email.from_email.clone(),
        ),
    ));
    let composer = EmailComposer::new(registry.as_ref().clone());

    let teaser_mailer = TeaserMailer::new(
        memberships.clone(),
        session_reader.clone(),
        scores.clone(),
        email_store.clone(),
        email_sender.clone(),
        event_publisher.clone(),
        composer.clone(),
        config.analysis.clone(),
    );
    event_bus.subscribe(
        "session.completed.v1",
        Arc::new(IdempotentHandler::new(teaser_mailer, processed_events)),
    );

    let scheduler_handle = if config.email.weekly_reports_enabled {
        let weekly_mailer = Arc::new(WeeklyReportMailer::new(
            memberships.clone(),
            session_reader.clone(),
            scores.clone(),
            email_store.clone(),
            email_sender.clone(),
            event_publisher.clone(),
            composer,
            config.analysis.clone(),
        ));
        let scheduler = WeeklyScheduler::with_config(
            weekly_mailer,
            WeeklySchedulerConfig::default()
                .with_check_interval(Duration::from_secs(config.email.check_interval_secs))
                .with_send_weekday(config.email.send_weekday()?),
        );
        let scheduler_rx = shutdown_rx.clone();
        Some(tokio::spawn(
            async move { scheduler.run(scheduler_rx).await },
        ))
    } else {
        info!("Weekly report scheduler disabled");
        None
    };

    // HTTP API
    let budget = Arc::new(ExchangeBudget::new(
        exchanges.clone(),
        memberships.clone(),
        config.plans.clone(),
    ));
    let start_handler = Arc::new(StartSessionHandler::new(
        sessions.clone(),
        exchanges.clone(),
        progress.clone(),
        budget.clone(),
        event_publisher.clone(),
        registry.clone(),
    ));
    let submit_handler = Arc::new(SubmitResponseHandler::new(
        sessions.clone(),
        exchanges.clone(),
        progress.clone(),
        budget,
        oracle.clone(),
        scoring_queue,
        registry.clone(),
    ));
    let continue_handler = Arc::new(ContinueSessionHandler::new(
        sessions,
        exchanges,
        progress.clone(),
        event_publisher,
        registry.clone(),
    ));
    let progress_handler = Arc::new(GetProgressHandler::new(progress, registry));
    let insights_handler = Arc::new(GetInsightsHandler::new(
        session_reader.clone(),
        scores.clone(),
        memberships.clone(),
        config.analysis.clone(),
    ));
    let status_handler = Arc::new(GetInsightStatusHandler::new(
        session_reader,
        scores,
        memberships,
        config.analysis.clone(),
    ));

    let app = api_router(
        SessionHandlers::new(
            start_handler,
            submit_handler,
            continue_handler,
            progress_handler,
        ),
        InsightsHandlers::new(insights_handler, status_handler),
    );

    let addr = config.server.socket_addr()?;
    info!(%addr, "HTTP server listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutdown signal received");
        })
        .await?;

    // The server is down; stop the background tasks and wait for them.
    let _ = shutdown_tx.send(true);
    for handle in worker_handles {
        let _ = handle.await;
    }
    if let Some(handle) = scheduler_handle {
        let _ = handle.await;
    }

    info!("Shutdown complete");
    Ok(())
}
