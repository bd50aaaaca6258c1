//! Single binary web server: HTML from templates/, static from /static, API via REST.
//! Run with: cargo run --bin web
//! Listens on 0.0.0.0:8080 by default. Configuration comes from the environment
//! (see `court_queue_web::config::ServerConfig::from_env`).
//!
//! Each browser gets its own board; the board id lives in a signed session cookie.

use actix_files::Files;
use actix_session::{storage::CookieSessionStore, Session, SessionMiddleware};
use actix_web::{
    cookie::Key,
    delete, get, post, put,
    web::{self, Data, Json, Path},
    App, HttpResponse, HttpServer, Responder,
};
use court_queue_web::{
    apply, config::ServerConfig, parse_group, storage::BoardStore, tick_with_advances, Board,
    BoardId, BoardView, Command, CourtError, CourtRef,
};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;
use std::time::{Duration, Instant};
use uuid::Uuid;

/// Per-board entry: board snapshot + last activity time (for auto-cleanup).
struct BoardEntry {
    board: Board,
    last_activity: Instant,
}

/// In-memory boards by id. Entries are dropped from memory after 12h inactivity; their
/// snapshots stay on disk.
type Boards = Data<RwLock<HashMap<BoardId, BoardEntry>>>;

/// Inactivity threshold: boards not accessed for this long are unloaded.
const INACTIVITY_TIMEOUT: Duration = Duration::from_secs(12 * 3600);

/// Session key holding this browser's board id.
const BOARD_ID_KEY: &str = "board_id";

/// Snapshot revisions, increasing across all boards for the life of the process.
static NEXT_REVISION: AtomicU64 = AtomicU64::new(1);

/// Revision for a snapshot. Take it while holding the boards write lock so revisions follow
/// the order in which changes were applied.
fn next_revision() -> u64 {
    NEXT_REVISION.fetch_add(1, Ordering::Relaxed)
}

#[derive(serde::Serialize)]
struct HealthResponse {
    ok: bool,
    service: &'static str,
}

/// Players as a list, as comma-separated text, or both.
#[derive(Deserialize)]
struct EnqueueBody {
    #[serde(default)]
    players: Vec<String>,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Deserialize)]
struct EditEntryBody {
    text: String,
}

#[derive(Deserialize)]
struct DurationBody {
    minutes: u32,
}

/// Path segment: court index or name (e.g. /api/board/courts/{court}/start)
#[derive(Deserialize)]
struct CourtPath {
    court: String,
}

/// Path segments: court and queue position (e.g. /api/board/courts/{court}/queue/{index})
#[derive(Deserialize)]
struct CourtQueuePath {
    court: String,
    index: usize,
}

fn lock_error() -> HttpResponse {
    HttpResponse::InternalServerError().body("lock error")
}

fn court_error(e: &CourtError) -> HttpResponse {
    HttpResponse::BadRequest().json(serde_json::json!({ "error": e.to_string(), "kind": e.kind() }))
}

/// Write a snapshot; failures are logged, the in-memory board stays authoritative.
/// A snapshot overtaken by a newer one for the same board is skipped.
async fn persist(store: &BoardStore, board: &Board, revision: u64) {
    match store.save(board, revision).await {
        Ok(true) => {}
        Ok(false) => log::debug!("Board {}: skipped stale snapshot r{}", board.id, revision),
        Err(e) => log::warn!("Could not save board {}: {}", board.id, e),
    }
}

/// Board id for this browser, loading or creating the board on first use.
async fn session_board(
    session: &Session,
    boards: &Boards,
    store: &BoardStore,
    config: &ServerConfig,
) -> Result<BoardId, HttpResponse> {
    let id = match session.get::<BoardId>(BOARD_ID_KEY) {
        Ok(Some(id)) => id,
        _ => {
            let id = Uuid::new_v4();
            if session.insert(BOARD_ID_KEY, id).is_err() {
                return Err(HttpResponse::InternalServerError().body("session error"));
            }
            id
        }
    };

    let loaded = boards.read().map_err(|_| lock_error())?.contains_key(&id);
    if !loaded {
        let board = store
            .load_or_default(id, &config.court_names, &config.board)
            .await;
        let mut g = boards.write().map_err(|_| lock_error())?;
        g.entry(id).or_insert_with(|| {
            log::info!("Board {} opened ({} courts)", id, board.courts.len());
            BoardEntry {
                board,
                last_activity: Instant::now(),
            }
        });
    }
    Ok(id)
}

/// Apply one command to this browser's board and respond with the new snapshot.
async fn run_command(
    session: Session,
    boards: Boards,
    store: Data<BoardStore>,
    config: Data<ServerConfig>,
    command: Command,
) -> HttpResponse {
    let id = match session_board(&session, &boards, &store, &config).await {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let (next, revision) = {
        let mut g = match boards.write() {
            Ok(guard) => guard,
            Err(_) => return lock_error(),
        };
        let entry = match g.get_mut(&id) {
            Some(e) => e,
            None => return HttpResponse::NotFound().json(serde_json::json!({ "error": "No board" })),
        };
        entry.last_activity = Instant::now();
        match apply(&entry.board, &command, &mut rand::thread_rng()) {
            Ok(next) => {
                entry.board = next;
                (entry.board.clone(), next_revision())
            }
            Err(e) => {
                log::debug!("Board {} rejected {:?}: {}", id, command, e);
                return court_error(&e);
            }
        }
    };
    log::debug!("Board {} applied {:?}", id, command);
    persist(&store, &next, revision).await;
    HttpResponse::Ok().json(BoardView::from_board(&next))
}

#[get("/api/health")]
async fn api_health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: "court-queue-web",
    })
}

/// Avoid 404 in browser tab: favicon not required for app logic.
#[get("/favicon.ico")]
async fn favicon() -> HttpResponse {
    HttpResponse::NoContent().finish()
}

/// This browser's board (created on first visit). Touching it refreshes last_activity.
#[get("/api/board")]
async fn api_get_board(
    session: Session,
    boards: Boards,
    store: Data<BoardStore>,
    config: Data<ServerConfig>,
) -> HttpResponse {
    let id = match session_board(&session, &boards, &store, &config).await {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let mut g = match boards.write() {
        Ok(guard) => guard,
        Err(_) => return lock_error(),
    };
    match g.get_mut(&id) {
        Some(entry) => {
            entry.last_activity = Instant::now();
            HttpResponse::Ok().json(BoardView::from_board(&entry.board))
        }
        None => HttpResponse::NotFound().json(serde_json::json!({ "error": "No board" })),
    }
}

/// Add a group to the back of a court's queue.
#[post("/api/board/courts/{court}/queue")]
async fn api_enqueue(
    session: Session,
    boards: Boards,
    store: Data<BoardStore>,
    config: Data<ServerConfig>,
    path: Path<CourtPath>,
    body: Json<EnqueueBody>,
) -> HttpResponse {
    let body = body.into_inner();
    let mut players = body.players;
    if let Some(text) = body.text {
        players.extend(parse_group(&text).players().iter().cloned());
    }
    let command = Command::Enqueue {
        court: CourtRef::parse(&path.court),
        players,
    };
    run_command(session, boards, store, config, command).await
}

/// Remove a queued group by position.
#[delete("/api/board/courts/{court}/queue/{index}")]
async fn api_remove_from_queue(
    session: Session,
    boards: Boards,
    store: Data<BoardStore>,
    config: Data<ServerConfig>,
    path: Path<CourtQueuePath>,
) -> HttpResponse {
    let command = Command::RemoveFromQueue {
        court: CourtRef::parse(&path.court),
        index: path.index,
    };
    run_command(session, boards, store, config, command).await
}

/// Replace a queued group with edited names (comma-separated), keeping its position.
#[put("/api/board/courts/{court}/queue/{index}")]
async fn api_edit_queue_entry(
    session: Session,
    boards: Boards,
    store: Data<BoardStore>,
    config: Data<ServerConfig>,
    path: Path<CourtQueuePath>,
    body: Json<EditEntryBody>,
) -> HttpResponse {
    let command = Command::ReplaceQueueEntry {
        court: CourtRef::parse(&path.court),
        index: path.index,
        text: body.into_inner().text,
    };
    run_command(session, boards, store, config, command).await
}

#[post("/api/board/courts/{court}/queue/shuffle")]
async fn api_shuffle_queue(
    session: Session,
    boards: Boards,
    store: Data<BoardStore>,
    config: Data<ServerConfig>,
    path: Path<CourtPath>,
) -> HttpResponse {
    let command = Command::ShuffleQueue {
        court: CourtRef::parse(&path.court),
    };
    run_command(session, boards, store, config, command).await
}

/// Start (taking the next group if the court is empty) or resume the timer.
#[post("/api/board/courts/{court}/start")]
async fn api_start(
    session: Session,
    boards: Boards,
    store: Data<BoardStore>,
    config: Data<ServerConfig>,
    path: Path<CourtPath>,
) -> HttpResponse {
    let command = Command::StartOrResume {
        court: CourtRef::parse(&path.court),
    };
    run_command(session, boards, store, config, command).await
}

#[post("/api/board/courts/{court}/pause")]
async fn api_pause(
    session: Session,
    boards: Boards,
    store: Data<BoardStore>,
    config: Data<ServerConfig>,
    path: Path<CourtPath>,
) -> HttpResponse {
    let command = Command::Pause {
        court: CourtRef::parse(&path.court),
    };
    run_command(session, boards, store, config, command).await
}

/// End the session early: next group comes on, timer stays stopped.
#[post("/api/board/courts/{court}/end")]
async fn api_end_session(
    session: Session,
    boards: Boards,
    store: Data<BoardStore>,
    config: Data<ServerConfig>,
    path: Path<CourtPath>,
) -> HttpResponse {
    let command = Command::EndSession {
        court: CourtRef::parse(&path.court),
    };
    run_command(session, boards, store, config, command).await
}

#[post("/api/board/courts/{court}/reset-timer")]
async fn api_reset_timer(
    session: Session,
    boards: Boards,
    store: Data<BoardStore>,
    config: Data<ServerConfig>,
    path: Path<CourtPath>,
) -> HttpResponse {
    let command = Command::ResetTimer {
        court: CourtRef::parse(&path.court),
    };
    run_command(session, boards, store, config, command).await
}

/// Rotate in the next group now and start its session.
#[post("/api/board/courts/{court}/next")]
async fn api_next_game(
    session: Session,
    boards: Boards,
    store: Data<BoardStore>,
    config: Data<ServerConfig>,
    path: Path<CourtPath>,
) -> HttpResponse {
    let command = Command::NextGame {
        court: CourtRef::parse(&path.court),
    };
    run_command(session, boards, store, config, command).await
}

#[post("/api/board/courts/{court}/clear")]
async fn api_clear_current(
    session: Session,
    boards: Boards,
    store: Data<BoardStore>,
    config: Data<ServerConfig>,
    path: Path<CourtPath>,
) -> HttpResponse {
    let command = Command::ClearCurrent {
        court: CourtRef::parse(&path.court),
    };
    run_command(session, boards, store, config, command).await
}

/// Session length for one court (minutes, clamped).
#[put("/api/board/courts/{court}/duration")]
async fn api_set_court_duration(
    session: Session,
    boards: Boards,
    store: Data<BoardStore>,
    config: Data<ServerConfig>,
    path: Path<CourtPath>,
    body: Json<DurationBody>,
) -> HttpResponse {
    let command = Command::SetCourtDuration {
        court: CourtRef::parse(&path.court),
        total_seconds: body.minutes.saturating_mul(60),
    };
    run_command(session, boards, store, config, command).await
}

/// Session length for all courts (minutes, clamped).
#[put("/api/board/duration")]
async fn api_reconfigure(
    session: Session,
    boards: Boards,
    store: Data<BoardStore>,
    config: Data<ServerConfig>,
    body: Json<DurationBody>,
) -> HttpResponse {
    let command = Command::Reconfigure {
        total_seconds: body.minutes.saturating_mul(60),
    };
    run_command(session, boards, store, config, command).await
}

/// Reset all courts: empty queues, nobody on court, full timers.
#[post("/api/board/reset")]
async fn api_reset_board(
    session: Session,
    boards: Boards,
    store: Data<BoardStore>,
    config: Data<ServerConfig>,
) -> HttpResponse {
    run_command(session, boards, store, config, Command::ResetBoard).await
}

fn session_key(config: &ServerConfig) -> Key {
    match config.session_key.as_deref().map(Key::try_from) {
        Some(Ok(key)) => key,
        _ => {
            log::warn!("SESSION_KEY not set (or shorter than 64 bytes); boards will not survive a restart of the server for existing browsers");
            Key::generate()
        }
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = ServerConfig::from_env();
    log::info!(
        "Starting server at http://{} ({} courts: {})",
        config.server_addr(),
        config.court_names.len(),
        config.court_names.join(", ")
    );
    log::info!(
        "Boards stored in {} ({} min sessions, {} per court, auto-start on expiry: {})",
        config.data_dir.display(),
        config.board.game_seconds / 60,
        config.board.players_per_court,
        config.board.auto_advance_auto_starts
    );

    let key = session_key(&config);
    let bind = (config.host.clone(), config.port);
    let store = Data::new(BoardStore::new(config.data_dir.clone()));
    let config = Data::new(config);
    let boards: Boards = Data::new(RwLock::new(HashMap::new()));

    // Clock: once per second, tick every board in one step
    let boards_tick = boards.clone();
    let store_tick = store.clone();
    actix_web::rt::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(1));
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        loop {
            interval.tick().await;
            let advanced: Vec<(Board, u64)> = {
                let mut g = match boards_tick.write() {
                    Ok(guard) => guard,
                    Err(_) => continue,
                };
                let mut advanced = Vec::new();
                for entry in g.values_mut() {
                    let (next, courts) = tick_with_advances(&entry.board);
                    entry.board = next;
                    if !courts.is_empty() {
                        for &i in &courts {
                            log::info!(
                                "Board {}: time up on {}",
                                entry.board.id,
                                entry.board.courts[i].name
                            );
                        }
                        advanced.push((entry.board.clone(), next_revision()));
                    }
                }
                advanced
            };
            for (board, revision) in &advanced {
                persist(&store_tick, board, *revision).await;
            }
        }
    });

    // Background task: every 30 minutes, unload boards inactive for 12+ hours
    let boards_cleanup = boards.clone();
    let store_cleanup = store.clone();
    actix_web::rt::spawn(async move {
        let mut interval = actix_web::rt::time::interval(Duration::from_secs(30 * 60));
        loop {
            interval.tick().await;
            let mut g = match boards_cleanup.write() {
                Ok(guard) => guard,
                Err(_) => continue,
            };
            let stale: Vec<BoardId> = g
                .iter()
                .filter(|(_, entry)| entry.last_activity.elapsed() >= INACTIVITY_TIMEOUT)
                .map(|(id, _)| *id)
                .collect();
            for id in &stale {
                g.remove(id);
                store_cleanup.forget(*id);
            }
            let removed = stale.len();
            if removed > 0 {
                log::info!("Unloaded {} inactive board(s) (no activity for 12h)", removed);
            }
        }
    });

    HttpServer::new(move || {
        App::new()
            .wrap(
                SessionMiddleware::builder(CookieSessionStore::default(), key.clone())
                    .cookie_name("court-queue".to_string())
                    .cookie_secure(false)
                    .build(),
            )
            .app_data(boards.clone())
            .app_data(store.clone())
            .app_data(config.clone())
            .route("/", web::get().to(serve_index_async))
            .service(api_health)
            .service(favicon)
            .service(api_get_board)
            .service(api_shuffle_queue)
            .service(api_enqueue)
            .service(api_remove_from_queue)
            .service(api_edit_queue_entry)
            .service(api_start)
            .service(api_pause)
            .service(api_end_session)
            .service(api_reset_timer)
            .service(api_next_game)
            .service(api_clear_current)
            .service(api_set_court_duration)
            .service(api_reconfigure)
            .service(api_reset_board)
            .service(Files::new("/static", "static"))
    })
    .bind(bind)?
    .run()
    .await
}

async fn serve_index_async() -> HttpResponse {
    let html = include_str!("../../templates/index.html");
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(html)
}
