//! Endpoint handlers
//!
//! Every handler pins one snapshot for the whole request. The catalog is
//! refreshed first when the sources changed on disk; if that rebuild fails
//! the previous snapshot keeps serving.

use axum::{
  extract::{Path, Query as QueryString, State},
  http::StatusCode,
  response::Json,
};
use std::sync::Arc;
use tracing::{error, warn};
use uuid::Uuid;

use crate::catalog::{Catalog, Snapshot};
use crate::options::{self, OptionFilter};
use crate::search::{self, Query};
use crate::server::types::{
  ApiError, BaseResponse, CategoriesResponse, CodeParams, Empty, ModelsParams, ModelsResponse, ReloadResponse,
  SearchResponse, SnapshotInfo, StatusResponse, TextParams,
};

type ErrorResponse = (StatusCode, Json<BaseResponse<Empty>>);

async fn current_snapshot(catalog: &Arc<Catalog>) -> Arc<Snapshot> {
  let shared = Arc::clone(catalog);
  match tokio::task::spawn_blocking(move || shared.refresh_if_stale()).await {
    Ok(Ok(snapshot)) => snapshot,
    Ok(Err(e)) => {
      warn!("Refresh failed, serving previous snapshot: {e}");
      catalog.snapshot()
    }
    Err(e) => {
      warn!("Refresh task failed, serving previous snapshot: {e}");
      catalog.snapshot()
    }
  }
}

fn snapshot_info(snapshot: &Snapshot) -> SnapshotInfo {
  SnapshotInfo { version: snapshot.version, built_at: snapshot.built_at, records: snapshot.table.len() }
}

fn run_search(snapshot: &Snapshot, query: &Query) -> Json<BaseResponse<SearchResponse>> {
  let outcome = search::search(&snapshot.table, query);
  let response = SearchResponse {
    status: outcome.status,
    count: outcome.rows.len(),
    rows: outcome.rows,
    snapshot_version: snapshot.version,
  };
  Json(BaseResponse::success(response, Uuid::new_v4()))
}

/// GET /status - Health check with the snapshot currently served
pub async fn status(State(catalog): State<Arc<Catalog>>) -> Json<BaseResponse<StatusResponse>> {
  let snapshot = current_snapshot(&catalog).await;
  let config = catalog.config();
  let response = StatusResponse {
    status: "healthy".to_string(),
    version: env!("CARGO_PKG_VERSION").to_string(),
    snapshot: snapshot_info(&snapshot),
    primary: config.primary.display().to_string(),
    recommendations: config.recommendations.display().to_string(),
  };
  Json(BaseResponse::success(response, Uuid::new_v4()))
}

/// GET /categories - Category selector entries
pub async fn categories(State(catalog): State<Arc<Catalog>>) -> Json<BaseResponse<CategoriesResponse>> {
  let snapshot = current_snapshot(&catalog).await;
  let categories = options::category_choices(&snapshot.table);
  Json(BaseResponse::success(CategoriesResponse { categories }, Uuid::new_v4()))
}

/// GET /models?category=&keyword= - Model picker options
pub async fn models(
  State(catalog): State<Arc<Catalog>>,
  QueryString(params): QueryString<ModelsParams>,
) -> Json<BaseResponse<ModelsResponse>> {
  let snapshot = current_snapshot(&catalog).await;
  let category = options::resolve_category(&snapshot.table, params.category.as_deref());
  let filter = OptionFilter { category, keyword: params.keyword };
  let found = options::build_model_options(&snapshot.table, &filter);
  let response = ModelsResponse { status: options::options_status(&found), options: found };
  Json(BaseResponse::success(response, Uuid::new_v4()))
}

/// GET /parts/code/{code}?contains=bool
pub async fn by_code(
  State(catalog): State<Arc<Catalog>>,
  Path(code): Path<String>,
  QueryString(params): QueryString<CodeParams>,
) -> Json<BaseResponse<SearchResponse>> {
  let snapshot = current_snapshot(&catalog).await;
  let query = if params.contains { Query::CodeContains(code) } else { Query::ExactCode(code) };
  run_search(&snapshot, &query)
}

/// GET /parts/search?q=
pub async fn by_text(
  State(catalog): State<Arc<Catalog>>,
  QueryString(params): QueryString<TextParams>,
) -> Json<BaseResponse<SearchResponse>> {
  let snapshot = current_snapshot(&catalog).await;
  run_search(&snapshot, &Query::Text(params.q))
}

/// GET /parts/model/{model}
pub async fn by_model(
  State(catalog): State<Arc<Catalog>>,
  Path(model): Path<String>,
) -> Json<BaseResponse<SearchResponse>> {
  let snapshot = current_snapshot(&catalog).await;
  run_search(&snapshot, &Query::Model(model))
}

/// POST /reload - Rebuild the table from the sources unconditionally
pub async fn reload(
  State(catalog): State<Arc<Catalog>>,
) -> Result<Json<BaseResponse<ReloadResponse>>, ErrorResponse> {
  let transaction_id = Uuid::new_v4();
  let shared = Arc::clone(&catalog);

  let rebuilt = tokio::task::spawn_blocking(move || shared.reload()).await.map_err(|e| {
    error!("Reload task failed: {e}");
    let error = ApiError::new("reload_failed", &format!("Reload task failed: {e}"));
    (StatusCode::INTERNAL_SERVER_ERROR, Json(BaseResponse::<Empty>::error(vec![error], transaction_id)))
  })?;

  match rebuilt {
    Ok(snapshot) => {
      Ok(Json(BaseResponse::success(ReloadResponse { snapshot: snapshot_info(&snapshot) }, transaction_id)))
    }
    Err(e) => {
      warn!("Reload failed, keeping snapshot {}: {e}", catalog.snapshot().version);
      let error = ApiError::new("reload_failed", &e.to_string());
      Err((StatusCode::UNPROCESSABLE_ENTITY, Json(BaseResponse::<Empty>::error(vec![error], transaction_id))))
    }
  }
}
