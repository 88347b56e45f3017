mod core;
mod features;
mod modules;
mod shared;

use crate::core::config::Config;
use crate::core::openapi::{ApiDoc, SwaggerInfoModifier};
use crate::core::{database, middleware};
use crate::features::admin::{routes as admin_routes, AdminService};
use crate::features::auth;
use crate::features::auth::routes as auth_routes;
use crate::features::bookings::{routes as bookings_routes, BookingService, ReminderProcessor};
use crate::features::catalog::{routes as catalog_routes, CatalogService};
use crate::features::jobs::{routes as jobs_routes, JobService};
use crate::features::notifications::{routes as notifications_routes, NotificationService};
use crate::features::payments::{routes as payments_routes, PaymentWebhookService};
use crate::features::profiles::{routes as profiles_routes, ProfileService};
use crate::features::ratings::{routes as ratings_routes, RatingService};
use crate::features::slots::{routes as slots_routes, SlotService};
use crate::modules::payments::{PaymentClient, PaymentGateway};
use axum::extract::DefaultBodyLimit;
use axum::{middleware::from_fn, Router};
use std::sync::Arc;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::Modify;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

fn main() -> anyhow::Result<()> {
    // Build Tokio runtime with configurable worker threads
    let worker_threads = std::env::var("TOKIO_WORKER_THREADS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|p| p.get())
                .unwrap_or(4)
        });

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(worker_threads)
        .max_blocking_threads(worker_threads * 4)
        .enable_all()
        .build()?;

    runtime.block_on(async_main(worker_threads))
}

async fn async_main(worker_threads: usize) -> anyhow::Result<()> {
    // Load .env file BEFORE initializing logger so RUST_LOG is available
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env().map_err(|e| anyhow::anyhow!(e))?;

    // Log system info
    let available_cpus = std::thread::available_parallelism()
        .map(|p| p.get())
        .unwrap_or(1);
    tracing::info!(
        "System info: available_cpus={}, tokio_worker_threads={}, pid={}",
        available_cpus,
        worker_threads,
        std::process::id()
    );

    tracing::info!("Configuration loaded successfully");

    // Create database connection pool
    let pool = database::create_pool(&config.database).await?;
    tracing::info!("Database connection pool created");

    // Run migrations automatically
    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .map_err(|e| anyhow::anyhow!("Migration failed: {}", e))?;
    tracing::info!("Database migrations completed successfully");

    // Initialize auth
    let jwks_client = Arc::new(auth::JwksClient::new(
        &config.auth.jwks_url,
        config.auth.jwks_cache_ttl,
    ));
    let jwt_validator = Arc::new(auth::JwtValidator::new(
        jwks_client,
        config.auth.issuer.clone(),
        config.auth.audience.clone(),
        config.auth.jwt_leeway,
    ));
    tracing::info!("Auth configuration initialized");

    // Initialize MinIO client for proof-of-work photos
    let minio_client = Arc::new(
        modules::storage::MinIOClient::new(config.minio.clone())
            .await
            .map_err(|e| anyhow::anyhow!("Failed to initialize MinIO client: {}", e))?,
    );
    // Ensure bucket exists (create if not)
    minio_client
        .ensure_bucket_exists()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to ensure MinIO bucket exists: {}", e))?;
    tracing::info!(
        "MinIO client initialized for bucket: {}",
        minio_client.bucket_name()
    );

    // Vendor adapters
    let sms_sender = modules::sms::build_sender(&config.sms);
    tracing::info!(
        "SMS delivery {}",
        if config.sms.enabled {
            "enabled"
        } else {
            "disabled, messages are logged only"
        }
    );
    let payment_gateway: Arc<dyn PaymentGateway> =
        Arc::new(PaymentClient::new(config.payments.clone()));
    tracing::info!("Payments client initialized");

    let service_area_offset = config.booking.service_area_offset();

    // Initialize Profile Service
    let profile_service = Arc::new(ProfileService::new(pool.clone()));
    tracing::info!("Profile service initialized");

    // Initialize Notification Service
    let notification_service = Arc::new(NotificationService::new(
        pool.clone(),
        sms_sender,
        Arc::clone(&profile_service),
        service_area_offset,
        config.payments.currency.clone(),
    ));
    tracing::info!("Notification service initialized");

    // Initialize Catalog and Slot Services
    let catalog_service = Arc::new(CatalogService::new(pool.clone()));
    let slot_service = Arc::new(SlotService::new(pool.clone()));
    tracing::info!("Catalog and slot services initialized");

    // Initialize Booking Service
    let booking_service = Arc::new(BookingService::new(
        pool.clone(),
        Arc::clone(&catalog_service),
        Arc::clone(&profile_service),
        Arc::clone(&notification_service),
        Arc::clone(&payment_gateway),
        Arc::clone(&minio_client),
        service_area_offset,
    ));
    tracing::info!("Booking service initialized");

    // Initialize Job Service
    let job_service = Arc::new(JobService::new(
        pool.clone(),
        Arc::clone(&profile_service),
        Arc::clone(&booking_service),
        Arc::clone(&notification_service),
        Arc::clone(&minio_client),
    ));
    tracing::info!("Job service initialized");

    // Initialize Rating Service
    let rating_service = Arc::new(RatingService::new(
        pool.clone(),
        Arc::clone(&profile_service),
    ));
    tracing::info!("Rating service initialized");

    // Initialize Payment Webhook Service
    let webhook_service = Arc::new(PaymentWebhookService::new(
        pool.clone(),
        config.payments.webhook_secret.clone(),
    ));
    tracing::info!("Payment webhook service initialized");

    // Initialize Admin Service
    let admin_service = Arc::new(AdminService::new(
        pool.clone(),
        Arc::clone(&booking_service),
        Arc::clone(&job_service),
        Arc::clone(&profile_service),
        Arc::clone(&notification_service),
        Arc::clone(&payment_gateway),
    ));
    tracing::info!("Admin service initialized");

    // Spawn booking reminder worker
    let reminder_processor = ReminderProcessor::new(
        pool.clone(),
        Arc::clone(&notification_service),
        &config.booking,
    );
    tokio::spawn(async move {
        reminder_processor.run().await;
    });
    tracing::info!("Reminder worker spawned");

    // Build application router with dynamic swagger config
    let swagger_modifier = SwaggerInfoModifier {
        title: config.swagger.title.clone(),
        version: config.swagger.version.clone(),
        description: config.swagger.description.clone(),
    };

    let mut openapi = ApiDoc::openapi();
    swagger_modifier.modify(&mut openapi);

    // Build swagger router
    let swagger = if let Some(credentials) = config.swagger.credentials() {
        tracing::info!("Swagger UI basic auth enabled");
        Router::new()
            .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi))
            .layer(from_fn(middleware::basic_auth_middleware(Arc::new(
                credentials,
            ))))
    } else {
        tracing::info!("Swagger UI basic auth disabled (no credentials configured)");
        Router::new().merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi))
    };

    // Protected routes (require JWT authentication)
    let protected_routes = Router::new()
        .merge(auth_routes::routes(Arc::clone(&profile_service)))
        .merge(profiles_routes::routes(Arc::clone(&profile_service)))
        .merge(bookings_routes::routes(Arc::clone(&booking_service)))
        .merge(jobs_routes::routes(Arc::clone(&job_service)))
        .merge(ratings_routes::routes(rating_service))
        .merge(catalog_routes::routes(Arc::clone(&catalog_service)))
        .merge(notifications_routes::routes(Arc::clone(
            &notification_service,
        )))
        .merge(catalog_routes::admin_routes(Arc::clone(&catalog_service)))
        .merge(slots_routes::admin_routes(Arc::clone(&slot_service)))
        .merge(admin_routes::routes(admin_service))
        .route_layer(axum::middleware::from_fn_with_state(
            jwt_validator.clone(),
            middleware::auth_middleware,
        ));

    // Simple health check endpoint (no auth required)
    async fn health_check() -> axum::http::StatusCode {
        axum::http::StatusCode::OK
    }
    let health_route = Router::new().route("/health", axum::routing::get(health_check));

    // Public routes (no auth required)
    let public_routes = Router::new()
        .merge(catalog_routes::public_routes(catalog_service))
        .merge(slots_routes::public_routes(slot_service))
        .merge(payments_routes::public_routes(webhook_service));

    let app = Router::new()
        .merge(swagger)
        .merge(protected_routes)
        .merge(public_routes)
        .merge(health_route)
        // Proof photos arrive as multipart bodies larger than axum's default limit
        .layer(DefaultBodyLimit::max(config.app.max_request_body_size))
        .layer(middleware::cors_layer(
            config.app.cors_allowed_origins.clone(),
        ))
        // Propagate X-Request-Id to response headers
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(middleware::MakeSpanWithRequestId)
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        // Generate X-Request-Id using UUID v7 (or use client-provided one)
        .layer(SetRequestIdLayer::x_request_id(middleware::MakeRequestUuid));

    // Start server
    let addr = config.app.server_address();
    let socket_addr: std::net::SocketAddr = addr
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid address: {}", e))?;

    // Use socket2 for TCP listener configuration
    let socket = socket2::Socket::new(
        socket2::Domain::for_address(socket_addr),
        socket2::Type::STREAM,
        Some(socket2::Protocol::TCP),
    )?;

    socket.set_reuse_address(true)?;
    #[cfg(unix)]
    socket.set_reuse_port(true)?;
    socket.set_nodelay(true)?;

    socket.set_recv_buffer_size(256 * 1024)?;
    socket.set_send_buffer_size(256 * 1024)?;

    #[cfg(target_os = "linux")]
    {
        let keepalive = socket2::TcpKeepalive::new()
            .with_time(std::time::Duration::from_secs(60))
            .with_interval(std::time::Duration::from_secs(10))
            .with_retries(3);
        socket.set_tcp_keepalive(&keepalive)?;
    }
    #[cfg(not(target_os = "linux"))]
    {
        let keepalive = socket2::TcpKeepalive::new().with_time(std::time::Duration::from_secs(60));
        socket.set_tcp_keepalive(&keepalive)?;
    }

    socket.set_nonblocking(true)?;
    socket.bind(&socket_addr.into())?;
    socket.listen(65535)?;

    let listener = tokio::net::TcpListener::from_std(socket.into())?;
    tracing::info!("Server listening on {}", format!("http://{}", addr));
    tracing::info!(
        "Swagger UI available at {}",
        format!("http://{}/swagger-ui/", addr)
    );

    axum::serve(listener, app).await?;

    Ok(())
}
