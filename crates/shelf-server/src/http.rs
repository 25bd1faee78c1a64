//! HTTP endpoint handlers

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use shelf_core::{
    all_tags, available_years, build_timeline, export_csv, export_template, import_csv,
    layout_graph, normalize_status, parse_date_text, sort_books, ActiveFilter, Book, BookPatch,
    Collection, DateRange, FilterSet, GraphLayout, ImportReport, NewBook, SortColumn,
    SortDirection, SortState, StoreError, TimelineGroup, UserMetadata,
};

use crate::AppState;

pub type ApiResult<T> = Result<T, (StatusCode, String)>;

fn store_error(err: StoreError) -> (StatusCode, String) {
    let status = match &err {
        StoreError::UserNotFound(_)
        | StoreError::BookNotFound(_)
        | StoreError::CollectionNotFound(_)
        | StoreError::NotInCollection { .. } => StatusCode::NOT_FOUND,
        StoreError::AlreadyInCollection { .. } => StatusCode::CONFLICT,
        StoreError::Validation(_) => StatusCode::BAD_REQUEST,
        StoreError::Io(_) | StoreError::Serialization(_) => {
            tracing::error!("Store failure: {}", err);
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    (status, err.to_string())
}

fn bad_request(message: impl Into<String>) -> (StatusCode, String) {
    (StatusCode::BAD_REQUEST, message.into())
}

/// Liveness probe
pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

// ===== Users =====

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub icon: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub icon: String,
}

pub async fn list_users(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<UserMetadata>>> {
    state.store.list_users().await.map(Json).map_err(store_error)
}

/// Create a user; an existing user is returned as-is
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateUserRequest>,
) -> ApiResult<(StatusCode, Json<UserMetadata>)> {
    let user = state
        .store
        .create_user(&request.username, request.icon)
        .await
        .map_err(store_error)?;
    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn get_user(
    State(state): State<Arc<AppState>>,
    Path(user): Path<String>,
) -> ApiResult<Json<UserMetadata>> {
    let document = state.store.get_user(&user).await.map_err(store_error)?;
    Ok(Json(document.metadata))
}

pub async fn update_user(
    State(state): State<Arc<AppState>>,
    Path(user): Path<String>,
    Json(request): Json<UpdateUserRequest>,
) -> ApiResult<Json<UserMetadata>> {
    state
        .store
        .update_user_icon(&user, &request.icon)
        .await
        .map(Json)
        .map_err(store_error)
}

// ===== Books =====

pub async fn list_books(
    State(state): State<Arc<AppState>>,
    Path(user): Path<String>,
) -> ApiResult<Json<Vec<Book>>> {
    state.store.list_books(&user).await.map(Json).map_err(store_error)
}

pub async fn create_book(
    State(state): State<Arc<AppState>>,
    Path(user): Path<String>,
    Json(book): Json<NewBook>,
) -> ApiResult<(StatusCode, Json<Book>)> {
    let book = state.store.create_book(&user, book).await.map_err(store_error)?;
    tracing::info!(user = %user, book = %book.id, "Added book");
    Ok((StatusCode::CREATED, Json(book)))
}

pub async fn update_book(
    State(state): State<Arc<AppState>>,
    Path((user, id)): Path<(String, String)>,
    Json(patch): Json<BookPatch>,
) -> ApiResult<Json<Book>> {
    state
        .store
        .update_book(&user, &id, patch)
        .await
        .map(Json)
        .map_err(store_error)
}

pub async fn delete_book(
    State(state): State<Arc<AppState>>,
    Path((user, id)): Path<(String, String)>,
) -> ApiResult<StatusCode> {
    state.store.delete_book(&user, &id).await.map_err(store_error)?;
    Ok(StatusCode::NO_CONTENT)
}

// ===== Collections =====

#[derive(Debug, Deserialize)]
pub struct CollectionRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddBookRequest {
    pub book_id: String,
}

pub async fn list_collections(
    State(state): State<Arc<AppState>>,
    Path(user): Path<String>,
) -> ApiResult<Json<Vec<Collection>>> {
    state.store.list_collections(&user).await.map(Json).map_err(store_error)
}

pub async fn create_collection(
    State(state): State<Arc<AppState>>,
    Path(user): Path<String>,
    Json(request): Json<CollectionRequest>,
) -> ApiResult<(StatusCode, Json<Collection>)> {
    let collection = state
        .store
        .create_collection(&user, &request.name)
        .await
        .map_err(store_error)?;
    Ok((StatusCode::CREATED, Json(collection)))
}

pub async fn rename_collection(
    State(state): State<Arc<AppState>>,
    Path((user, id)): Path<(String, String)>,
    Json(request): Json<CollectionRequest>,
) -> ApiResult<Json<Collection>> {
    state
        .store
        .rename_collection(&user, &id, &request.name)
        .await
        .map(Json)
        .map_err(store_error)
}

pub async fn delete_collection(
    State(state): State<Arc<AppState>>,
    Path((user, id)): Path<(String, String)>,
) -> ApiResult<StatusCode> {
    state.store.delete_collection(&user, &id).await.map_err(store_error)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn collection_books(
    State(state): State<Arc<AppState>>,
    Path((user, id)): Path<(String, String)>,
) -> ApiResult<Json<Vec<Book>>> {
    state
        .store
        .collection_books(&user, &id)
        .await
        .map(Json)
        .map_err(store_error)
}

pub async fn add_collection_book(
    State(state): State<Arc<AppState>>,
    Path((user, id)): Path<(String, String)>,
    Json(request): Json<AddBookRequest>,
) -> ApiResult<Json<Collection>> {
    state
        .store
        .add_book_to_collection(&user, &id, &request.book_id)
        .await
        .map(Json)
        .map_err(store_error)
}

pub async fn remove_collection_book(
    State(state): State<Arc<AppState>>,
    Path((user, id, book_id)): Path<(String, String, String)>,
) -> ApiResult<Json<Collection>> {
    state
        .store
        .remove_book_from_collection(&user, &id, &book_id)
        .await
        .map(Json)
        .map_err(store_error)
}

// ===== Views =====

/// Filter and sort parameters shared by the table and graph views
#[derive(Debug, Default, Deserialize)]
pub struct ViewQuery {
    pub year: Option<i32>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub status: Option<String>,
    pub tag: Option<String>,
    pub title: Option<String>,
    pub author: Option<String>,
    pub q: Option<String>,
    pub sort: Option<SortColumn>,
    pub dir: Option<SortDirection>,
}

impl ViewQuery {
    /// Build the filter set; a year together with a range is rejected
    pub fn filters(&self) -> ApiResult<FilterSet> {
        let from = parse_bound("from", self.from.as_deref())?;
        let to = parse_bound("to", self.to.as_deref())?;

        let mut filters = FilterSet::new();
        match (self.year, from.is_some() || to.is_some()) {
            (Some(_), true) => return Err(bad_request("Use either year or from/to, not both")),
            (Some(year), false) => {
                filters.set_year(year);
            }
            (None, true) => {
                filters.set_date_range(DateRange::from_dates(from, to));
            }
            (None, false) => {}
        }

        if let Some(status) = self.status.as_deref().filter(|s| !s.trim().is_empty()) {
            let status = normalize_status(status).ok_or_else(|| bad_request(format!("Unknown status: {}", status)))?;
            filters.set_status(status);
        }
        if let Some(tag) = &self.tag {
            filters.set_tag(tag);
        }
        if let Some(title) = &self.title {
            filters.set_title(title);
        }
        if let Some(author) = &self.author {
            filters.set_author(author);
        }
        if let Some(q) = &self.q {
            filters.set_search(q);
        }
        Ok(filters)
    }

    /// Requested sort; a column without a direction starts descending
    pub fn sort_state(&self) -> SortState {
        let default = SortState::default();
        SortState::new(
            self.sort.unwrap_or(default.column),
            self.dir.unwrap_or(SortDirection::Desc),
        )
    }
}

fn parse_bound(name: &str, value: Option<&str>) -> ApiResult<Option<NaiveDate>> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(text) => parse_date_text(text)
            .map(|instant| Some(instant.date_naive()))
            .ok_or_else(|| bad_request(format!("Invalid {} date: {}", name, text))),
    }
}

/// Table view: filtered, sorted rows plus what the filter controls need
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableResponse {
    pub books: Vec<Book>,
    pub total: usize,
    pub filters: Vec<ActiveFilter>,
    pub sort: SortState,
    pub years: Vec<i32>,
    pub tags: Vec<String>,
}

pub async fn get_timeline(
    State(state): State<Arc<AppState>>,
    Path(user): Path<String>,
) -> ApiResult<Json<Vec<TimelineGroup>>> {
    let books = state.store.list_books(&user).await.map_err(store_error)?;
    Ok(Json(build_timeline(&books, state.clock.as_ref())))
}

pub async fn get_table(
    State(state): State<Arc<AppState>>,
    Path(user): Path<String>,
    Query(query): Query<ViewQuery>,
) -> ApiResult<Json<TableResponse>> {
    let filters = query.filters()?;
    let sort = query.sort_state();
    let books = state.store.list_books(&user).await.map_err(store_error)?;
    let now = state.clock.now();

    let visible = filters.apply(&books, now);
    let rows: Vec<Book> = sort_books(&visible, sort).into_iter().cloned().collect();
    Ok(Json(TableResponse {
        total: books.len(),
        filters: filters.active(),
        sort,
        years: available_years(&books, now),
        tags: all_tags(&books),
        books: rows,
    }))
}

/// Graph of the table rows in table order; `null` when no row has a start date
pub async fn get_graph(
    State(state): State<Arc<AppState>>,
    Path(user): Path<String>,
    Query(query): Query<ViewQuery>,
) -> ApiResult<Json<Option<GraphLayout>>> {
    let filters = query.filters()?;
    let books = state.store.list_books(&user).await.map_err(store_error)?;
    let now = state.clock.now();

    let visible = filters.apply(&books, now);
    let sorted = sort_books(&visible, query.sort_state());
    Ok(Json(layout_graph(&sorted, now, &state.graph)))
}

// ===== CSV =====

#[derive(Debug, Default, Deserialize)]
pub struct ExportQuery {
    #[serde(default)]
    pub template: bool,
}

pub async fn export_books(
    State(state): State<Arc<AppState>>,
    Path(user): Path<String>,
    Query(query): Query<ExportQuery>,
) -> ApiResult<impl IntoResponse> {
    let text = if query.template {
        export_template()
    } else {
        let books = state.store.list_books(&user).await.map_err(store_error)?;
        export_csv(&books)
    }
    .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

    let filename = if query.template { "books-template.csv" } else { "books.csv" };
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        text,
    ))
}

/// Import a raw CSV body. Row problems come back in the report; only a
/// structurally invalid file is a 400.
pub async fn import_books(
    State(state): State<Arc<AppState>>,
    Path(user): Path<String>,
    body: String,
) -> ApiResult<Json<ImportReport>> {
    let existing = state.store.list_books(&user).await.map_err(store_error)?;
    let store = &state.store;
    let report = import_csv(&body, &existing, move |book| {
        let user = user.clone();
        async move { store.create_book(&user, book).await }
    })
    .await
    .map_err(|e| bad_request(e.to_string()))?;
    Ok(Json(report))
}
