mod state;

pub use state::AppState;

use actix_cors::Cors;
use actix_web::{
    delete, dev::Server, error::BlockingError, get, http::StatusCode, post, web, App,
    HttpResponse, HttpServer, Responder,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::application::{IntakeSummary, PreprocessSummary};
use crate::domain::chart::{ChartData, ChartKind};
use crate::domain::cohort::CohortRequest;
use crate::domain::error::{AppError, Result};
use crate::domain::prediction::PredictionResults;
use crate::domain::report::{ReportRequest, RiskReport};

const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    model_loaded: bool,
    sessions: usize,
}

#[derive(Serialize)]
struct SessionCreated {
    session_id: Uuid,
}

#[derive(Deserialize)]
struct ChartQuery {
    column: Option<String>,
}

pub fn status_for(err: &AppError) -> StatusCode {
    match err {
        AppError::ValidationError(_) | AppError::ParseError(_) => StatusCode::BAD_REQUEST,
        AppError::NotFound(_) => StatusCode::NOT_FOUND,
        AppError::ModelError(_) => StatusCode::UNPROCESSABLE_ENTITY,
        AppError::ConfigurationError(_) | AppError::IoError(_) | AppError::Internal(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

fn error_response(err: AppError) -> HttpResponse {
    let status = status_for(&err);
    if status.is_server_error() {
        error!(error = %err, "Request failed");
    } else {
        warn!(error = %err, status = status.as_u16(), "Request rejected");
    }
    HttpResponse::build(status).body(err.to_string())
}

/// Unwrap the result of work moved off the worker thread
fn blocking<T>(result: std::result::Result<Result<T>, BlockingError>) -> Result<T> {
    result.map_err(|e| AppError::Internal(format!("Blocking task failed: {}", e)))?
}

fn json_response<T: Serialize>(result: Result<T>) -> HttpResponse {
    match result {
        Ok(body) => HttpResponse::Ok().json(body),
        Err(err) => error_response(err),
    }
}

#[get("/health")]
async fn health(data: web::Data<AppState>) -> impl Responder {
    json_response(data.sessions.len().map(|sessions| HealthResponse {
        status: "ok",
        model_loaded: data.prediction_use_case.has_model(),
        sessions,
    }))
}

#[post("/sessions")]
async fn create_session(data: web::Data<AppState>) -> impl Responder {
    json_response(
        data.sessions
            .create()
            .map(|session_id| SessionCreated { session_id }),
    )
}

#[delete("/sessions/{id}")]
async fn delete_session(data: web::Data<AppState>, path: web::Path<Uuid>) -> impl Responder {
    match data.sessions.remove(path.into_inner()) {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(err) => error_response(err),
    }
}

#[post("/sessions/{id}/dataset")]
async fn upload_dataset(
    data: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: web::Bytes,
) -> impl Responder {
    let id = path.into_inner();
    let state = data.clone();
    json_response(blocking(web::block(move || ingest_dataset(&state, id, &body)).await))
}

fn ingest_dataset(state: &AppState, id: Uuid, body: &[u8]) -> Result<IntakeSummary> {
    // Unknown sessions fail before any parsing work
    state.sessions.read(id, |_| ())?;
    let intake = state.intake_use_case.ingest(body)?;
    state
        .sessions
        .update(id, |session| session.set_raw(intake.table))?;
    info!(session_id = %id, "Dataset uploaded");
    Ok(intake.summary)
}

#[post("/sessions/{id}/preprocess")]
async fn preprocess(
    data: web::Data<AppState>,
    path: web::Path<Uuid>,
    req: web::Json<CohortRequest>,
) -> impl Responder {
    let id = path.into_inner();
    let state = data.clone();
    let req = req.into_inner();
    json_response(blocking(web::block(move || preprocess_dataset(&state, id, req)).await))
}

fn preprocess_dataset(state: &AppState, id: Uuid, req: CohortRequest) -> Result<PreprocessSummary> {
    let raw = state
        .sessions
        .read(id, |session| session.raw.clone())?
        .ok_or_else(|| AppError::ValidationError("upload a dataset first".to_string()))?;

    let outcome = state.preprocess_use_case.execute(&raw, req)?;
    state.sessions.update(id, |session| {
        session.set_encoded(outcome.encoded, outcome.cohort)
    })?;
    Ok(outcome.summary)
}

#[post("/sessions/{id}/predict")]
async fn predict(data: web::Data<AppState>, path: web::Path<Uuid>) -> impl Responder {
    json_response(run_prediction(&data, path.into_inner()))
}

fn run_prediction(state: &AppState, id: Uuid) -> Result<PredictionResults> {
    let encoded = state
        .sessions
        .read(id, |session| session.encoded.clone())?
        .ok_or_else(|| {
            AppError::ValidationError("upload and preprocess a dataset first".to_string())
        })?;

    let results = state.prediction_use_case.execute(&encoded)?;
    state
        .sessions
        .update(id, |session| session.set_predictions(results.clone()))?;
    Ok(results)
}

#[get("/sessions/{id}/charts/{kind}")]
async fn chart(
    data: web::Data<AppState>,
    path: web::Path<(Uuid, ChartKind)>,
    query: web::Query<ChartQuery>,
) -> impl Responder {
    let (id, kind) = path.into_inner();
    json_response(build_chart(&data, id, kind, query.column.as_deref()))
}

fn build_chart(state: &AppState, id: Uuid, kind: ChartKind, column: Option<&str>) -> Result<ChartData> {
    let results = state
        .sessions
        .read(id, |session| session.predictions.clone())?
        .ok_or_else(|| AppError::ValidationError("run a prediction first".to_string()))?;

    state
        .visualization_use_case
        .build(kind, column, &results, &state.prediction_use_case)
}

#[post("/sessions/{id}/report")]
async fn report(
    data: web::Data<AppState>,
    path: web::Path<Uuid>,
    req: web::Json<ReportRequest>,
) -> impl Responder {
    match generate_report(&data, path.into_inner(), &req) {
        Ok(generated) => HttpResponse::Ok()
            .content_type("text/plain; charset=utf-8")
            .body(generated.text),
        Err(err) => error_response(err),
    }
}

fn generate_report(state: &AppState, id: Uuid, req: &ReportRequest) -> Result<RiskReport> {
    let (cohort, results) = state.sessions.read(id, |session| {
        (session.cohort.clone(), session.predictions.clone())
    })?;
    let (Some(cohort), Some(results)) = (cohort, results) else {
        return Err(AppError::ValidationError(
            "run a prediction before generating a report".to_string(),
        ));
    };

    state.report_use_case.generate(req, &cohort, &results)
}

#[get("/encoding-table")]
async fn encoding_table(data: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(data.preprocess_use_case.encoding_table())
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .service(health)
            .service(create_session)
            .service(delete_session)
            .service(upload_dataset)
            .service(preprocess)
            .service(predict)
            .service(chart)
            .service(report)
            .service(encoding_table),
    );
}

/// Periodically drop sessions whose browser went away without deleting them.
/// Must be called from inside the tokio runtime.
fn spawn_session_sweeper(state: web::Data<AppState>) {
    let period = state.sessions.idle_ttl().min(SWEEP_INTERVAL);
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        loop {
            ticker.tick().await;
            if let Err(err) = state.sessions.evict_idle() {
                warn!(error = %err, "Session sweep failed");
            }
        }
    });
}

pub fn start_server(state: AppState) -> std::io::Result<Server> {
    let bind = (state.config.host.clone(), state.config.port);
    let payload_limit = state.config.max_upload_bytes;
    let state = web::Data::new(state);
    spawn_session_sweeper(state.clone());

    info!(host = %bind.0, port = bind.1, "Starting HTTP server");

    let server = HttpServer::new(move || {
        let cors = Cors::permissive(); // Local tool, any origin

        App::new()
            .wrap(cors)
            .app_data(state.clone())
            .app_data(web::PayloadConfig::new(payload_limit))
            .configure(configure)
    })
    .bind(bind)?
    .run();

    Ok(server)
}
