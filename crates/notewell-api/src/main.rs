//! notewell-api - HTTP API server for notewell

use std::net::SocketAddr;
use std::num::NonZeroU32;
use std::sync::Arc;

use axum::{
    extract::{FromRequestParts, Path, State},
    http::{header, request::Parts, HeaderValue, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use governor::{Quota, RateLimiter};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use notewell_core::{
    defaults, AuthPrincipal, CreateNoteRequest, LoginRequest, RegisterRequest, UpdateNoteRequest,
};
use notewell_db::Database;

// =============================================================================
// REQUEST ID (UUIDv7)
// =============================================================================

/// Generates time-ordered UUIDv7 request correlation IDs.
///
/// UUIDv7 embeds a Unix timestamp, so IDs sort chronologically — useful for
/// log correlation and debugging production incidents.
#[derive(Clone, Default)]
struct MakeRequestUuidV7;

impl MakeRequestId for MakeRequestUuidV7 {
    fn make_request_id<B>(&mut self, _request: &axum::http::Request<B>) -> Option<RequestId> {
        let id = Uuid::now_v7().to_string().parse().ok()?;
        Some(RequestId::new(id))
    }
}

// =============================================================================
// APPLICATION STATE
// =============================================================================

type GlobalRateLimiter = RateLimiter<
    governor::state::direct::NotKeyed,
    governor::state::InMemoryState,
    governor::clock::DefaultClock,
>;

/// Application state shared across handlers.
#[derive(Clone)]
struct AppState {
    db: Database,
    /// Global rate limiter (None if rate limiting is disabled).
    rate_limiter: Option<Arc<GlobalRateLimiter>>,
}

// =============================================================================
// CORS
// =============================================================================

/// Parse allowed CORS origins from the `ALLOWED_ORIGINS` environment
/// variable (comma-separated). Defaults to localhost development origins.
fn parse_allowed_origins() -> Vec<HeaderValue> {
    let origins_str = std::env::var("ALLOWED_ORIGINS")
        .unwrap_or_else(|_| "http://localhost:3000,http://localhost:5173".to_string());

    if origins_str.trim().is_empty() {
        return vec![
            HeaderValue::from_static("http://localhost:3000"),
            HeaderValue::from_static("http://localhost:5173"),
        ];
    }

    origins_str
        .split(',')
        .filter_map(|s| {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return None;
            }
            match trimmed.parse::<HeaderValue>() {
                Ok(v) => Some(v),
                Err(e) => {
                    tracing::warn!("Invalid CORS origin '{}': {}", trimmed, e);
                    None
                }
            }
        })
        .collect()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing with configurable output
    //
    // Environment variables:
    //   LOG_FORMAT  - "json" or "text" (default: "text")
    //   LOG_FILE    - path to log file (optional, enables file logging)
    //   LOG_ANSI    - "true"/"false" override ANSI colors (auto-detected by default)
    //   RUST_LOG    - standard env filter (default: "notewell_api=debug,tower_http=debug")
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let log_file = std::env::var("LOG_FILE").ok();
    let log_ansi = std::env::var("LOG_ANSI")
        .ok()
        .map(|v| v == "true" || v == "1");

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "notewell_api=debug,tower_http=debug".into());

    let registry = tracing_subscriber::registry().with(env_filter);

    // Optionally create a file appender with daily rotation
    let _file_guard = if let Some(ref path) = log_file {
        let file_dir = std::path::Path::new(path)
            .parent()
            .unwrap_or(std::path::Path::new("."));
        let file_name = std::path::Path::new(path)
            .file_name()
            .and_then(|f| f.to_str())
            .unwrap_or("notewell-api.log");
        let file_appender = tracing_appender::rolling::daily(file_dir, file_name);
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        if log_format == "json" {
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(non_blocking),
                )
                .init();
        } else {
            let mut layer = tracing_subscriber::fmt::layer().with_writer(non_blocking);
            if let Some(ansi) = log_ansi {
                layer = layer.with_ansi(ansi);
            } else {
                layer = layer.with_ansi(false); // no ANSI in files
            }
            registry.with(layer).init();
        }
        Some(guard)
    } else {
        // Console-only output
        if log_format == "json" {
            registry
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        } else {
            let mut layer = tracing_subscriber::fmt::layer();
            if let Some(ansi) = log_ansi {
                layer = layer.with_ansi(ansi);
            }
            registry.with(layer).init();
        }
        None
    };

    info!(
        log_format = %log_format,
        log_file = log_file.as_deref().unwrap_or("(stdout)"),
        "Logging initialized"
    );

    // Get configuration from environment
    let database_url = std::env::var("DATABASE_URL")
        .unwrap_or_else(|_| "postgres://localhost/notewell".to_string());
    let host = std::env::var("HOST").unwrap_or_else(|_| defaults::DEFAULT_HOST.to_string());
    let port: u16 = std::env::var("PORT")
        .unwrap_or_else(|_| defaults::DEFAULT_PORT.to_string())
        .parse()
        .unwrap_or(defaults::DEFAULT_PORT);

    // Rate limiting configuration
    // RATE_LIMIT_REQUESTS: requests per period (default: 100)
    // RATE_LIMIT_PERIOD_SECS: period in seconds (default: 60 = 1 minute)
    let rate_limit_requests: u64 = std::env::var("RATE_LIMIT_REQUESTS")
        .unwrap_or_else(|_| defaults::RATE_LIMIT_REQUESTS.to_string())
        .parse()
        .unwrap_or(defaults::RATE_LIMIT_REQUESTS);
    let rate_limit_period_secs: u64 = std::env::var("RATE_LIMIT_PERIOD_SECS")
        .unwrap_or_else(|_| defaults::RATE_LIMIT_PERIOD_SECS.to_string())
        .parse()
        .unwrap_or(defaults::RATE_LIMIT_PERIOD_SECS);
    let rate_limit_enabled: bool = std::env::var("RATE_LIMIT_ENABLED")
        .map(|v| v == "true" || v == "1")
        .unwrap_or(true);

    info!(
        "Rate limiting: {} ({} requests per {} seconds)",
        if rate_limit_enabled {
            "enabled"
        } else {
            "disabled"
        },
        rate_limit_requests,
        rate_limit_period_secs
    );

    // Connect to database
    info!("Connecting to database...");
    let db = Database::connect(&database_url).await?;
    info!("Database connected");

    // Run pending database migrations on startup
    info!("Running database migrations...");
    db.migrate().await?;
    info!("Database migrations complete");
    notewell_db::log_pool_metrics(db.pool());

    // Create rate limiter if enabled
    let rate_limiter = if rate_limit_enabled {
        let quota = Quota::with_period(std::time::Duration::from_secs(rate_limit_period_secs))
            .expect("Rate limit period must be non-zero")
            .allow_burst(
                NonZeroU32::new(rate_limit_requests as u32).expect("Rate limit must be non-zero"),
            );
        Some(Arc::new(RateLimiter::direct(quota)))
    } else {
        None
    };

    // Create app state
    let state = AppState { db, rate_limiter };

    // Build router
    let app = Router::new()
        // Health check
        .route("/health", get(health_check))
        // Account registration and login (unauthenticated)
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
        // Notes CRUD
        .route("/api/v1/notes", get(list_notes).post(create_note))
        .route(
            "/api/v1/notes/:id",
            get(get_note).put(update_note).delete(delete_note),
        )
        .route("/api/v1/notes/:id/archive", post(archive_note))
        // Version history
        .route(
            "/api/v1/notes/:note_id/versions",
            get(list_versions).delete(delete_versions),
        )
        .route(
            "/api/v1/notes/:note_id/versions/:version_id/restore",
            post(restore_version),
        )
        // Middleware
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7))
        .layer({
            let allowed_origins = parse_allowed_origins();

            CorsLayer::new()
                .allow_origin(AllowOrigin::list(allowed_origins))
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PUT,
                    Method::DELETE,
                    Method::OPTIONS,
                ])
                .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
                .allow_credentials(true)
                .max_age(std::time::Duration::from_secs(3600))
        })
        .layer(RequestBodyLimitLayer::new(defaults::REQUEST_BODY_LIMIT))
        .with_state(state);

    // Start server
    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// =============================================================================
// RATE LIMITING MIDDLEWARE
// =============================================================================

async fn rate_limit_middleware(
    State(state): State<AppState>,
    request: axum::extract::Request,
    next: axum::middleware::Next,
) -> Result<impl IntoResponse, (StatusCode, Json<serde_json::Value>)> {
    // If rate limiting is disabled, pass through
    if let Some(limiter) = &state.rate_limiter {
        if limiter.check().is_err() {
            tracing::warn!("Rate limit exceeded");
            return Err((
                StatusCode::TOO_MANY_REQUESTS,
                Json(serde_json::json!({
                    "error": "Too many requests. Please wait before retrying."
                })),
            ));
        }
    }
    Ok(next.run(request).await)
}

// =============================================================================
// HEALTH CHECK
// =============================================================================

async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

// =============================================================================
// AUTHENTICATION MIDDLEWARE
// =============================================================================

/// Extractor that resolves the Bearer token on a request, if any.
///
/// Unknown or expired tokens resolve to `None` rather than an error;
/// pair with [`RequireAuth`] on endpoints that must be authenticated.
#[derive(Debug, Clone)]
struct Auth {
    principal: Option<AuthPrincipal>,
}

#[axum::async_trait]
impl FromRequestParts<AppState> for Auth {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok());

        let principal = match auth_header {
            Some(header) if header.starts_with("Bearer ") => {
                let token = header.trim_start_matches("Bearer ").trim();
                state.db.tokens.validate(token).await?
            }
            _ => None,
        };

        Ok(Auth { principal })
    }
}

/// Extractor that requires a valid Bearer token.
#[derive(Debug, Clone)]
struct RequireAuth {
    principal: AuthPrincipal,
}

#[axum::async_trait]
impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth = Auth::from_request_parts(parts, state).await?;

        match auth.principal {
            Some(principal) => Ok(RequireAuth { principal }),
            None => Err(ApiError::Unauthorized(
                "Authentication required".to_string(),
            )),
        }
    }
}

// =============================================================================
// ACCOUNT HANDLERS
// =============================================================================

async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state.db.users.create(req).await?;

    info!(user_id = %user.id, "User registered");
    Ok((StatusCode::CREATED, Json(user)))
}

async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    // Unknown email and wrong password produce the same message, so the
    // response does not reveal which accounts exist.
    let user = state
        .db
        .users
        .verify_password(&req.email, &req.password)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Invalid email or password".to_string()))?;

    let token = state.db.tokens.issue(&user).await?;

    info!(user_id = %user.id, "User logged in");
    Ok(Json(serde_json::json!({
        "token": token,
        "token_type": "Bearer",
        "expires_in": defaults::TOKEN_TTL_SECS,
        "user": user,
    })))
}

async fn logout(
    State(state): State<AppState>,
    auth: RequireAuth,
) -> Result<impl IntoResponse, ApiError> {
    // Tokens are server-side state, so logout is a real revocation rather
    // than a client-side discard.
    let revoked = state
        .db
        .tokens
        .revoke_for_user(auth.principal.user_id)
        .await?;

    info!(user_id = %auth.principal.user_id, revoked, "User logged out");
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// NOTE HANDLERS
// =============================================================================

async fn list_notes(
    State(state): State<AppState>,
    auth: RequireAuth,
) -> Result<impl IntoResponse, ApiError> {
    let notes = state.db.notes.list_for_user(auth.principal.user_id).await?;
    Ok(Json(notes))
}

async fn create_note(
    State(state): State<AppState>,
    auth: RequireAuth,
    Json(req): Json<CreateNoteRequest>,
) -> Result<impl IntoResponse, ApiError> {
    // The token may outlive its account; surface that as a missing user
    // rather than a foreign-key error.
    state
        .db
        .users
        .fetch(auth.principal.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    let note = state.db.notes.insert(auth.principal.user_id, req).await?;

    info!(note_id = %note.id, user_id = %auth.principal.user_id, "Note created");
    Ok((StatusCode::CREATED, Json(note)))
}

async fn get_note(
    State(state): State<AppState>,
    auth: RequireAuth,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let note = state
        .db
        .notes
        .fetch_with_versions(id, auth.principal.user_id)
        .await?;
    Ok(Json(note))
}

async fn update_note(
    State(state): State<AppState>,
    auth: RequireAuth,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateNoteRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let update = state
        .db
        .notes
        .update(id, auth.principal.user_id, req)
        .await?;

    // History is best-effort: a snapshot failure never fails the update
    // that already committed.
    if let Err(e) = state.db.versions.snapshot_and_prune(&update.before).await {
        tracing::warn!(note_id = %id, error = %e, "Failed to snapshot note version");
    }

    Ok(Json(update.after))
}

async fn delete_note(
    State(state): State<AppState>,
    auth: RequireAuth,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state.db.notes.delete(id, auth.principal.user_id).await?;

    info!(note_id = %id, user_id = %auth.principal.user_id, "Note deleted");
    Ok(StatusCode::NO_CONTENT)
}

async fn archive_note(
    State(state): State<AppState>,
    auth: RequireAuth,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let note = state.db.notes.archive(id, auth.principal.user_id).await?;
    Ok(Json(note))
}

// =============================================================================
// VERSION HANDLERS
// =============================================================================

async fn list_versions(
    State(state): State<AppState>,
    _auth: RequireAuth,
    Path(note_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let versions = state.db.versions.list_for_note(note_id).await?;
    Ok(Json(versions))
}

async fn restore_version(
    State(state): State<AppState>,
    auth: RequireAuth,
    Path((_note_id, version_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, ApiError> {
    let note = state
        .db
        .versions
        .restore(version_id, auth.principal.user_id)
        .await?;

    info!(note_id = %note.id, version = note.version, "Note restored from version");
    Ok(Json(note))
}

async fn delete_versions(
    State(state): State<AppState>,
    _auth: RequireAuth,
    Path(note_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let deleted = state.db.versions.delete_all_for_note(note_id).await?;

    info!(note_id = %note_id, deleted, "Note version history cleared");
    Ok(Json(serde_json::json!({ "deleted": deleted })))
}

// =============================================================================
// ERROR HANDLING
// =============================================================================

#[derive(Debug)]
enum ApiError {
    Database(notewell_core::Error),
    Unauthorized(String),
    NotFound(String),
    BadRequest(String),
    Conflict(String),
}

impl From<notewell_core::Error> for ApiError {
    fn from(err: notewell_core::Error) -> Self {
        match &err {
            notewell_core::Error::NotFound(msg) => ApiError::NotFound(msg.clone()),
            notewell_core::Error::InvalidInput(msg) => ApiError::BadRequest(msg.clone()),
            notewell_core::Error::Unauthorized(msg) => ApiError::Unauthorized(msg.clone()),
            notewell_core::Error::Database(sqlx_err) => {
                let msg = sqlx_err.to_string();
                if msg.contains("duplicate key") || msg.contains("unique constraint") {
                    // Provide user-friendly error messages for known constraints
                    let friendly_msg = if msg.contains("app_user_username") {
                        "An account with this username already exists".to_string()
                    } else if msg.contains("app_user_email") {
                        "An account with this email already exists".to_string()
                    } else {
                        msg
                    };
                    return ApiError::Conflict(friendly_msg);
                }
                ApiError::Database(err)
            }
            _ => ApiError::Database(err),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            ApiError::Database(err) => {
                // Database failure details stay in the logs.
                tracing::error!(error = %err, "Request failed with internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
        };

        let body = Json(serde_json::json!({
            "error": message,
        }));

        (status, body).into_response()
    }
}
