use actix_files::Files;
use actix_web::{http::StatusCode, middleware, web, App, HttpRequest, HttpResponse, HttpServer, ResponseError, Result};
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::config::AppConfig;
use crate::error::ScheduleError;
use crate::export::schedule_csv_string;
use crate::parser::TournamentInput;
use crate::schedule::{
    apply_manual_swap, detect_warnings, generate_outcome, Division, ScheduleWarning, ScheduledGame, SlotRef,
    TournamentSettings,
};
use crate::store::{DivisionSetup, NewTournament, StoreError, TournamentPatch, TournamentStore};

pub struct AppState {
    pub store: TournamentStore,
    pub admin_password: String,
}

impl AppState {
    pub fn new(admin_password: String) -> Self {
        AppState {
            store: TournamentStore::new(),
            admin_password,
        }
    }
}

#[derive(Serialize)]
struct MessageResponse {
    message: String,
}

fn message(status: StatusCode, text: impl Into<String>) -> HttpResponse {
    HttpResponse::build(status).json(MessageResponse { message: text.into() })
}

impl ResponseError for StoreError {
    fn status_code(&self) -> StatusCode {
        match self {
            StoreError::NotFound(_) => StatusCode::NOT_FOUND,
            StoreError::Poisoned => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        message(self.status_code(), self.to_string())
    }
}

fn schedule_error_response(error: &ScheduleError) -> HttpResponse {
    let status = match error {
        ScheduleError::UnknownMatch(_) => StatusCode::NOT_FOUND,
        _ => StatusCode::BAD_REQUEST,
    };
    message(status, error.to_string())
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponse {
    pub error: Option<String>,
    pub games: Vec<ScheduledGame>,
    pub warnings: Vec<ScheduleWarning>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateRequest {
    settings: TournamentSettings,
    #[serde(default)]
    divisions: Vec<Division>,
    games: Vec<ScheduledGame>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapRequest {
    settings: TournamentSettings,
    #[serde(default)]
    divisions: Vec<Division>,
    games: Vec<ScheduledGame>,
    match_id: String,
    target: SlotRef,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapResponse {
    pub games: Vec<ScheduledGame>,
    pub warnings: Vec<ScheduleWarning>,
}

#[derive(Serialize, Deserialize)]
pub struct WarningsResponse {
    pub warnings: Vec<ScheduleWarning>,
}

#[derive(Deserialize)]
pub struct SetupRequest {
    divisions: Vec<Division>,
}

// Schedule generation endpoint
async fn generate_schedule(body: web::Json<TournamentInput>) -> Result<HttpResponse> {
    let TournamentInput { settings, divisions } = body.into_inner();

    // The engine is CPU-bound; keep it off the worker thread
    let response = web::block(move || {
        let outcome = generate_outcome(&settings, &divisions);
        let warnings = if outcome.is_ok() {
            detect_warnings(&outcome.games, &settings, &divisions)
        } else {
            Vec::new()
        };
        GenerateResponse {
            error: outcome.error,
            games: outcome.games,
            warnings,
        }
    })
    .await?;

    match &response.error {
        Some(error) => warn!("Schedule generation failed: {}", error),
        None => info!(
            "Generated {} games with {} warnings",
            response.games.len(),
            response.warnings.len()
        ),
    }
    Ok(HttpResponse::Ok().json(response))
}

async fn validate_schedule(body: web::Json<ValidateRequest>) -> Result<HttpResponse> {
    let warnings = detect_warnings(&body.games, &body.settings, &body.divisions);
    Ok(HttpResponse::Ok().json(WarningsResponse { warnings }))
}

// Manual drag-and-drop swap endpoint
async fn swap_games(body: web::Json<SwapRequest>) -> Result<HttpResponse> {
    let SwapRequest {
        settings,
        divisions,
        games,
        match_id,
        target,
    } = body.into_inner();

    match apply_manual_swap(games, &match_id, &target) {
        Ok(games) => {
            let warnings = detect_warnings(&games, &settings, &divisions);
            Ok(HttpResponse::Ok().json(SwapResponse { games, warnings }))
        }
        Err(e) => Ok(schedule_error_response(&e)),
    }
}

async fn list_tournaments(state: web::Data<AppState>) -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(state.store.list()?))
}

async fn create_tournament(body: web::Json<NewTournament>, state: web::Data<AppState>) -> Result<HttpResponse> {
    let new = body.into_inner();
    if let Some(error) = &new.schedule.error {
        return Ok(message(
            StatusCode::BAD_REQUEST,
            format!("Cannot save a schedule that failed to generate: {}", error),
        ));
    }
    let tournament = state.store.create(new)?;
    Ok(HttpResponse::Created().json(tournament))
}

async fn get_tournament(id: web::Path<String>, state: web::Data<AppState>) -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(state.store.get(&id)?))
}

async fn update_tournament(
    id: web::Path<String>,
    body: web::Json<TournamentPatch>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(state.store.update(&id, body.into_inner())?))
}

// Schedule download for spreadsheets
async fn download_schedule_csv(id: web::Path<String>, state: web::Data<AppState>) -> Result<HttpResponse> {
    let tournament = state.store.get(&id)?;
    let csv = schedule_csv_string(&tournament.schedule)
        .map_err(|e| actix_web::error::ErrorInternalServerError(format!("Failed to export schedule: {}", e)))?;
    Ok(HttpResponse::Ok()
        .content_type("text/csv; charset=utf-8")
        .insert_header((
            "Content-Disposition",
            format!("attachment; filename=\"schedule-{}.csv\"", tournament.id),
        ))
        .body(csv))
}

// Admin-only delete
async fn delete_tournament(
    req: HttpRequest,
    id: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    // Check password from header
    let password = req
        .headers()
        .get("X-Admin-Password")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    if password != state.admin_password {
        return Ok(message(StatusCode::UNAUTHORIZED, "Unauthorized"));
    }

    if state.store.delete(&id)? {
        info!("Deleted tournament {}", id);
        Ok(message(StatusCode::OK, "Tournament deleted"))
    } else {
        Err(StoreError::NotFound(id.into_inner()).into())
    }
}

async fn get_latest_setup(state: web::Data<AppState>) -> Result<HttpResponse> {
    match state.store.latest_setup()? {
        Some(setup) => Ok(HttpResponse::Ok().json(setup)),
        None => Ok(message(StatusCode::NOT_FOUND, "No division setup saved yet")),
    }
}

async fn put_latest_setup(body: web::Json<SetupRequest>, state: web::Data<AppState>) -> Result<HttpResponse> {
    let setup: DivisionSetup = state.store.save_latest_setup(body.into_inner().divisions)?;
    Ok(HttpResponse::Ok().json(setup))
}

/// Registers every API route
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/api/schedule/generate", web::post().to(generate_schedule))
        .route("/api/schedule/validate", web::post().to(validate_schedule))
        .route("/api/schedule/swap", web::post().to(swap_games))
        .service(
            web::resource("/api/tournaments")
                .route(web::get().to(list_tournaments))
                .route(web::post().to(create_tournament)),
        )
        .service(
            web::resource("/api/tournaments/{id}")
                .route(web::get().to(get_tournament))
                .route(web::put().to(update_tournament))
                .route(web::delete().to(delete_tournament)),
        )
        .route("/api/tournaments/{id}/schedule.csv", web::get().to(download_schedule_csv))
        .service(
            web::resource("/api/divisions/latest")
                .route(web::get().to(get_latest_setup))
                .route(web::put().to(put_latest_setup)),
        );
}

pub async fn start_server(config: AppConfig) -> std::io::Result<()> {
    let app_state = web::Data::new(AppState::new(config.admin_password.clone()));
    let json_limit = config.json_limit_bytes;
    let static_dir = config.static_dir.clone();

    if let Some(dir) = &static_dir {
        info!("Serving front-end from {}", dir.display());
    }

    HttpServer::new(move || {
        let mut app = App::new()
            .app_data(app_state.clone())
            .app_data(web::JsonConfig::default().limit(json_limit))
            .wrap(middleware::Logger::default())
            .configure(configure);
        if let Some(dir) = &static_dir {
            app = app.service(Files::new("/", dir).index_file("index.html"));
        }
        app
    })
    .bind(config.bind_address())?
    .run()
    .await
}
