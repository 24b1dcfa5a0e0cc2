use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, Method, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::Instrument;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use memo_core::domain::report::MemoReport;
use memo_core::error::MemoError;
use memo_core::memo::{MemoRequest, MemoService};
use memo_core::render::render;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = memo_core::config::Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer())
        .init();

    let service = match MemoService::from_settings(&settings) {
        Ok(service) => Some(Arc::new(service)),
        Err(e) => {
            let err = anyhow::Error::new(e);
            sentry_anyhow::capture_anyhow(&err);
            tracing::error!(error = %err, "memo service unavailable; starting API in degraded mode");
            None
        }
    };

    let app = app(AppState { service });

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(3000);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));

    tracing::info!(%addr, "api listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/healthz", get(healthz))
        .route(
            "/api/generate-memo",
            post(generate_memo)
                .options(preflight)
                .fallback(method_not_allowed),
        )
        .route(
            "/api/render-memo",
            post(render_memo)
                .options(preflight)
                .fallback(method_not_allowed),
        )
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

async fn healthz() -> &'static str {
    "ok"
}

#[derive(Clone)]
struct AppState {
    service: Option<Arc<MemoService>>,
}

async fn preflight() -> StatusCode {
    StatusCode::OK
}

async fn method_not_allowed() -> Response {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(ErrorBody {
            error: "Method not allowed".to_string(),
            details: None,
            suggestion: None,
        }),
    )
        .into_response()
}

#[derive(Debug, Serialize)]
struct MemoResponse {
    success: bool,
    data: MemoReport,
}

async fn generate_memo(
    State(state): State<AppState>,
    body: Result<Json<MemoRequest>, JsonRejection>,
) -> Result<Json<MemoResponse>, ApiError> {
    let Json(request) = body.map_err(|rejection| {
        ApiError(MemoError::validation(format!(
            "Invalid request body: {}",
            rejection.body_text()
        )))
    })?;

    let request_id = Uuid::new_v4();
    let span = tracing::info_span!("generate_memo", %request_id);

    async move {
        request.company_name()?;
        let Some(service) = &state.service else {
            return Err(ApiError(MemoError::Configuration(
                "API keys not configured".to_string(),
            )));
        };

        let report = service.generate(request).await?;
        Ok::<_, ApiError>(Json(MemoResponse {
            success: true,
            data: report,
        }))
    }
    .instrument(span)
    .await
}

async fn render_memo(body: Result<Json<MemoReport>, JsonRejection>) -> Result<Html<String>, ApiError> {
    let Json(report) = body.map_err(|rejection| {
        ApiError(MemoError::validation(format!(
            "Invalid report body: {}",
            rejection.body_text()
        )))
    })?;
    Ok(Html(render(&report).to_html()))
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    suggestion: Option<&'static str>,
}

#[derive(Debug)]
struct ApiError(MemoError);

impl From<MemoError> for ApiError {
    fn from(err: MemoError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let err = self.0;
        let suggestion = err.suggestion();
        let (status, error, details) = match &err {
            MemoError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone(), None),
            MemoError::Configuration(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone(), None),
            MemoError::NotFound { .. } => (
                StatusCode::NOT_FOUND,
                "Company not found in FMP database".to_string(),
                None,
            ),
            MemoError::Upstream { detail, .. } => (
                StatusCode::BAD_GATEWAY,
                "Failed to generate memo".to_string(),
                Some(detail.clone()),
            ),
            MemoError::DataIncomplete(_) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "Company data incomplete".to_string(),
                Some(err.to_string()),
            ),
        };

        if status.is_server_error() {
            let report = anyhow::anyhow!("{err}");
            sentry_anyhow::capture_anyhow(&report);
            tracing::error!(error = %err, %status, "memo request failed");
        } else {
            tracing::warn!(error = %err, %status, "memo request rejected");
        }

        (
            status,
            Json(ErrorBody {
                error,
                details,
                suggestion,
            }),
        )
            .into_response()
    }
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}

fn init_sentry(settings: &memo_core::config::Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}
