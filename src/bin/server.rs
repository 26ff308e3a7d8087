use axum::{
    Json, Router,
    http::StatusCode,
    routing::{get, post},
};
use pallet_optimizer::packer::expand;
use pallet_optimizer::solver::Solver;
use pallet_optimizer::types::{Block, Placement, Rect, deserialize_u32_from_number};
use serde::{Deserialize, Serialize};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

#[derive(Deserialize, Serialize)]
struct SolveRequest {
    container: Rect,
    item: Rect,
    #[serde(
        default = "default_max_depth",
        deserialize_with = "deserialize_u32_from_number"
    )]
    max_depth: u32,
    #[serde(default = "default_true")]
    expand: bool,
}

fn default_max_depth() -> u32 {
    2
}

fn default_true() -> bool {
    true
}

#[derive(Serialize)]
struct SolveResponse {
    count: u64,
    blocks: Vec<Block>,
    placements: Vec<Placement>,
    utilization_percent: f64,
}

async fn solve(
    Json(req): Json<SolveRequest>,
) -> Result<Json<SolveResponse>, (StatusCode, String)> {
    tracing::info!(
        body = serde_json::to_string(&req).unwrap_or_default(),
        "POST /solve"
    );

    let solver = Solver::new(req.container, req.item, req.max_depth)
        .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;
    let solution = solver.solve();

    let placements = if req.expand {
        expand(&solution.blocks, solution.item)
            .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?
    } else {
        Vec::new()
    };

    let utilization_percent = solution.utilization_percent();
    Ok(Json(SolveResponse {
        count: solution.count,
        blocks: solution.blocks,
        placements,
        utilization_percent,
    }))
}

#[tokio::main]
async fn main() {
    let _sentry = std::env::var("SENTRY_DSN").ok().map(|dsn| {
        sentry::init((
            dsn,
            sentry::ClientOptions {
                release: sentry::release_name!(),
                ..Default::default()
            },
        ))
    });

    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open("development.log")
        .expect("failed to open development.log");

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_target(false)
        .with_ansi(false)
        .with_max_level(Level::INFO)
        .init();

    let port = std::env::var("PORT").unwrap_or_else(|_| "3001".to_string());
    let addr = format!("0.0.0.0:{port}");

    let app = Router::new()
        .route("/up", get(|| async { "ok" }))
        .route("/solve", post(solve))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        );

    let listener = tokio::net::TcpListener::bind(&addr).await.unwrap();
    eprintln!("Listening on {addr}");
    axum::serve(listener, app).await.unwrap();
}
