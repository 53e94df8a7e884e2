use crate::aggregate::{SortKey, build_results, join_tallies, percentage_split, top_n, total_votes};
use crate::errors::AppError;
use crate::models::{
    DesignPair, HoodieDetailResponse, HoodiePair, RankedEntry, ResultsResponse, ShopQuery, Side,
    VoteRequest,
};
use crate::state::AppState;
use crate::ui::render_index;
use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
    response::{Html, Redirect},
};
use serde_json::{Value, json};
use tracing::info;

const DEFAULT_SHOP_LIMIT: usize = 10;
const MAX_SHOP_LIMIT: usize = 100;

pub async fn index(State(state): State<AppState>) -> Html<String> {
    let entries = snapshot(&state).await;
    Html(render_index(&build_results(&entries)))
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn list_catalog(State(state): State<AppState>) -> Json<Vec<DesignPair>> {
    Json((*state.catalog.pairs().await).clone())
}

pub async fn list_hoodies(State(state): State<AppState>) -> Json<Vec<HoodiePair>> {
    let hoodies = snapshot(&state)
        .await
        .into_iter()
        .map(|entry| HoodiePair {
            pair: entry.pair,
            votes: entry.votes,
        })
        .collect();
    Json(hoodies)
}

pub async fn get_hoodie(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<HoodieDetailResponse>, AppError> {
    let pair = find_pair(&state, &id).await?;
    Ok(Json(detail(&state, pair).await))
}

pub async fn get_results(State(state): State<AppState>) -> Json<ResultsResponse> {
    let entries = snapshot(&state).await;
    Json(build_results(&entries))
}

pub async fn get_shop(
    State(state): State<AppState>,
    Query(query): Query<ShopQuery>,
) -> Json<Vec<HoodiePair>> {
    let limit = query.limit.unwrap_or(DEFAULT_SHOP_LIMIT).min(MAX_SHOP_LIMIT);
    let entries = snapshot(&state).await;
    let top = top_n(&entries, limit, SortKey::AiVotes)
        .into_iter()
        .map(|entry| HoodiePair {
            pair: entry.pair,
            votes: entry.votes,
        })
        .collect();
    Json(top)
}

pub async fn vote(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<VoteRequest>, JsonRejection>,
) -> Result<Json<HoodieDetailResponse>, AppError> {
    let Json(payload) = payload.map_err(|rejection| AppError::bad_request(rejection.body_text()))?;
    let side = payload.side.parse::<Side>().map_err(AppError::bad_request)?;
    let pair = cast_vote(&state, &id, side).await?;
    Ok(Json(detail(&state, pair).await))
}

pub async fn vote_form(
    State(state): State<AppState>,
    Path((id, side)): Path<(String, String)>,
) -> Result<Redirect, AppError> {
    let side = side.parse::<Side>().map_err(AppError::bad_request)?;
    cast_vote(&state, &id, side).await?;
    Ok(Redirect::to("/"))
}

async fn cast_vote(state: &AppState, id: &str, side: Side) -> Result<DesignPair, AppError> {
    let pair = find_pair(state, id).await?;
    if state.votes.get(id).await.is_none() {
        return Err(AppError::not_found(format!("no vote record for design {id}")));
    }
    if !state.votes.increment(id, side).await {
        return Err(AppError {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: "failed to record vote, please try again".to_string(),
        });
    }
    info!("recorded {side} vote for design {id}");
    Ok(pair)
}

async fn find_pair(state: &AppState, id: &str) -> Result<DesignPair, AppError> {
    state
        .catalog
        .find(id)
        .await
        .ok_or_else(|| AppError::not_found(format!("unknown design {id}")))
}

async fn detail(state: &AppState, pair: DesignPair) -> HoodieDetailResponse {
    let votes = state.votes.get(&pair.id).await.unwrap_or_default();
    let (pct_original, pct_ai) = percentage_split(&votes);
    HoodieDetailResponse {
        pair,
        votes,
        total: total_votes(&votes),
        pct_original,
        pct_ai,
    }
}

async fn snapshot(state: &AppState) -> Vec<RankedEntry> {
    let pairs = state.catalog.pairs().await;
    let tallies = state.votes.all().await;
    join_tallies(&pairs, &tallies)
}
