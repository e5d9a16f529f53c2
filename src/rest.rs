//! REST API layer using Axum.
//!
//! Thin handlers over the core engines: each one validates its payload,
//! re-checks authorization against the target board, applies the mutation
//! through the ordering/cascade engines, and appends an activity entry.
//! Shared state carries the store, the notification hook and a per-board
//! lock map serializing ordering/cascade writers.

use axum::{
    extract::{Path, State},
    http::{header, Request, StatusCode},
    middleware::{self, Next},
    response::Response,
    routing::{delete, get, patch, post, put},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::activity;
use crate::auth::{create_jwt, hash_password, validate_jwt, verify_password};
use crate::authz::{self, Requester};
use crate::cascade::{self, require_board, require_card, require_column, require_comment};
use crate::error::{ApiError, ApiResult};
use crate::invitations;
use crate::models::{
    Activity, ActivityKind, Board, BoardCategory, Card, Column, Comment, InvitationStatus, User,
};
use crate::notify::Notifier;
use crate::ordering;
use crate::storage::Store;

/// Shared app state for REST handlers (Arc-wrapped for concurrency)
pub struct AppState {
    pub store: Store,
    notifier: Arc<dyn Notifier>,
    // One async mutex per board; ordering and cascade writers take it so
    // sibling sequences see one writer at a time
    board_locks: Mutex<HashMap<Uuid, Arc<Mutex<()>>>>,
}

impl AppState {
    async fn board_lock(&self, board_id: &Uuid) -> Arc<Mutex<()>> {
        let mut locks = self.board_locks.lock().await;
        locks.entry(*board_id).or_default().clone()
    }

    async fn drop_board_lock(&self, board_id: &Uuid) {
        let mut locks = self.board_locks.lock().await;
        locks.remove(board_id);
    }
}

// --- Request DTOs (wire format mirrors the JS client: camelCase) ---

#[derive(Deserialize)]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBoardRequest {
    pub title: String,
    pub description: String,
    pub category: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBoardRequest {
    pub board_id: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateColumnRequest {
    pub title: String,
    pub board_id: String,
}

#[derive(Deserialize)]
pub struct UpdateColumnRequest {
    pub title: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveColumnRequest {
    // i64 so a negative position surfaces as InvalidArgument, not a 422
    pub target_order: i64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCardRequest {
    pub title: String,
    pub description: Option<String>,
    pub column_id: String,
    pub board_id: String,
    pub due_date: Option<DateTime<Utc>>,
    pub labels: Option<Vec<String>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCardRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    // An absent dueDate clears the deadline; title/description/labels left
    // out stay unchanged
    pub due_date: Option<DateTime<Utc>>,
    pub labels: Option<Vec<String>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveCardRequest {
    pub target_column_id: String,
    pub target_order: i64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignCardRequest {
    pub assignee_id: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommentRequest {
    pub text: String,
    pub card_id: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendInviteRequest {
    pub to_user_id: String,
    pub board_id: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceTokenRequest {
    // Absent token unregisters the device
    pub device_token: Option<String>,
}

// --- Response DTOs ---

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub message: String,
    pub token: String,
}

/// Outward projection of a user; the password hash never leaves the store.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub avatar: Option<String>,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            avatar: user.avatar.clone(),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileView {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub avatar: Option<String>,
    pub role: Option<String>,
    pub boards: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize)]
pub struct ProfileResponse {
    pub message: String,
    pub user: ProfileView,
}

#[derive(Serialize)]
pub struct BoardsResponse {
    pub message: String,
    pub boards: Vec<Board>,
}

#[derive(Serialize)]
pub struct BoardResponse {
    pub message: String,
    pub board: Board,
}

#[derive(Serialize)]
pub struct CollaboratorsResponse {
    pub message: String,
    pub collaborators: Vec<UserSummary>,
}

#[derive(Serialize)]
pub struct ColumnsResponse {
    pub message: String,
    pub columns: Vec<Column>,
}

/// Column with its cards populated in order.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnDetail {
    pub id: Uuid,
    pub title: String,
    pub board: Uuid,
    pub order: u32,
    pub cards: Vec<Card>,
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize)]
pub struct ColumnResponse {
    pub message: String,
    pub column: ColumnDetail,
}

/// Card with assignees populated.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CardDetail {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub column: Uuid,
    pub board: Uuid,
    pub order: u32,
    pub assigned_to: Vec<UserSummary>,
    pub due_date: Option<DateTime<Utc>>,
    pub labels: Vec<String>,
    pub comments: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize)]
pub struct CardResponse {
    pub message: String,
    pub card: CardDetail,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentView {
    pub id: Uuid,
    pub text: String,
    pub author: Option<UserSummary>,
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize)]
pub struct CommentsResponse {
    pub message: String,
    pub comments: Vec<CommentView>,
}

#[derive(Serialize)]
pub struct ActivitiesResponse {
    pub message: String,
    pub activities: Vec<Activity>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardSummary {
    pub id: Uuid,
    pub title: String,
    pub category: BoardCategory,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvitationView {
    pub id: Uuid,
    pub status: InvitationStatus,
    pub from: Option<UserSummary>,
    pub board: Option<BoardSummary>,
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize)]
pub struct InvitationsResponse {
    pub message: String,
    pub invitations: Vec<InvitationView>,
}

// --- Helpers ---

fn parse_id(value: &str, what: &str) -> ApiResult<Uuid> {
    Uuid::parse_str(value).map_err(|_| ApiError::InvalidArgument(format!("invalid {what} id")))
}

fn parse_order(value: i64) -> ApiResult<usize> {
    usize::try_from(value)
        .map_err(|_| ApiError::InvalidArgument("invalid target order".to_string()))
}

fn parse_category(value: &str) -> ApiResult<BoardCategory> {
    BoardCategory::from_str(value)
        .map_err(|_| ApiError::InvalidArgument(format!("invalid board category '{value}'")))
}

fn require_user(store: &Store, id: &Uuid) -> ApiResult<User> {
    store
        .user(id)?
        .ok_or_else(|| ApiError::NotFound("user not found".to_string()))
}

fn card_detail(store: &Store, card: Card) -> ApiResult<CardDetail> {
    let mut assigned = Vec::new();
    for user_id in &card.assigned_to {
        if let Some(user) = store.user(user_id)? {
            assigned.push(UserSummary::from(&user));
        }
    }
    Ok(CardDetail {
        id: card.id,
        title: card.title,
        description: card.description,
        column: card.column,
        board: card.board,
        order: card.order,
        assigned_to: assigned,
        due_date: card.due_date,
        labels: card.labels,
        comments: card.comments,
        created_at: card.created_at,
    })
}

// --- Middleware ---

async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    mut req: Request<axum::body::Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| ApiError::Unauthorized("not authorized".to_string()))?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| ApiError::Unauthorized("not authorized".to_string()))?;

    let claims = validate_jwt(token)
        .map_err(|_| ApiError::Unauthorized("session expired".to_string()))?;

    let user = require_user(&state.store, &claims.sub)?;
    req.extensions_mut().insert(Requester {
        id: user.id,
        name: user.name,
        email: user.email,
    });
    Ok(next.run(req).await)
}

/// Create the Axum router over the given store and notification hook.
pub fn create_router(store: Store, notifier: Arc<dyn Notifier>) -> Router {
    let state = Arc::new(AppState {
        store,
        notifier,
        board_locks: Mutex::new(HashMap::new()),
    });

    let authed = Router::new()
        .route("/users/profile", get(profile_handler))
        .route("/users/device-token", patch(device_token_handler))
        .route("/users/logout", delete(logout_handler))
        .route("/boards/get-all", get(get_all_boards_handler))
        .route("/boards/category/:category", get(get_category_boards_handler))
        .route("/boards/collaborators/:board_id", get(get_collaborators_handler))
        .route("/boards/create-board", post(create_board_handler))
        .route("/boards/update-board", put(update_board_handler))
        .route(
            "/boards/:board_id",
            get(get_board_handler).delete(delete_board_handler),
        )
        .route("/columns/get-all/:board_id", get(get_all_columns_handler))
        .route("/columns/create-column", post(create_column_handler))
        .route("/columns/update-column/:column_id", put(update_column_handler))
        .route("/columns/move-column/:column_id", patch(move_column_handler))
        .route(
            "/columns/:column_id",
            get(get_column_handler).delete(delete_column_handler),
        )
        .route("/cards/create-card", post(create_card_handler))
        .route("/cards/update-card/:card_id", put(update_card_handler))
        .route("/cards/move-card/:card_id", patch(move_card_handler))
        .route("/cards/add-assignee/:card_id", patch(assign_card_handler))
        .route(
            "/cards/:card_id",
            get(get_card_handler).delete(delete_card_handler),
        )
        .route("/comments/create-comment", post(create_comment_handler))
        .route(
            "/comments/:id",
            get(get_comments_handler).delete(delete_comment_handler),
        )
        .route("/activities", get(recent_activities_handler))
        .route("/activities/:board_id", get(board_activities_handler))
        .route("/invitations", get(get_invitations_handler))
        .route("/invitations/send", post(send_invite_handler))
        .route("/invitations/:invitation_id/accept", post(accept_invitation_handler))
        .route("/invitations/:invitation_id/reject", post(reject_invitation_handler))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    let api = Router::new()
        .route("/users/signup", post(signup_handler))
        .route("/users/login", post(login_handler))
        .merge(authed);

    Router::new()
        .route("/health", get(health_handler))
        .nest("/api", api)
        .with_state(state)
}

// --- Users ---

async fn signup_handler(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<SignupRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    if !payload.email.contains('@') {
        return Err(ApiError::InvalidArgument("email not valid".to_string()));
    }
    if payload.password.len() <= 8 {
        return Err(ApiError::InvalidArgument(
            "password must be at least 8 characters".to_string(),
        ));
    }
    if payload.name.len() < 3 {
        return Err(ApiError::InvalidArgument(
            "name must be more than 3 characters".to_string(),
        ));
    }

    let user = User {
        id: Uuid::now_v7(),
        name: payload.name,
        email: payload.email,
        password_hash: hash_password(&payload.password)?,
        boards: vec![],
        avatar: None,
        role: None,
        invitations: vec![],
        device_token: None,
        created_at: Utc::now(),
    };
    state.store.create_user(&user)?;

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: format!("{} registered!", user.name),
        }),
    ))
}

async fn login_handler(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let user = state
        .store
        .user_by_email(&payload.email)?
        .ok_or_else(|| ApiError::NotFound("user not found".to_string()))?;

    if !verify_password(&payload.password, &user.password_hash)? {
        return Err(ApiError::Unauthorized("password not valid".to_string()));
    }

    let token = create_jwt(&user.id)?;
    Ok(Json(LoginResponse {
        message: "login successful".to_string(),
        token,
    }))
}

async fn profile_handler(
    State(state): State<Arc<AppState>>,
    Extension(requester): Extension<Requester>,
) -> Result<Json<ProfileResponse>, ApiError> {
    let user = require_user(&state.store, &requester.id)?;
    Ok(Json(ProfileResponse {
        message: "user found!".to_string(),
        user: ProfileView {
            id: user.id,
            name: user.name,
            email: user.email,
            avatar: user.avatar,
            role: user.role,
            boards: user.boards,
            created_at: user.created_at,
        },
    }))
}

/// Register (or clear) the push target used by the invitation hook.
async fn device_token_handler(
    State(state): State<Arc<AppState>>,
    Extension(requester): Extension<Requester>,
    Json(payload): Json<DeviceTokenRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let mut user = require_user(&state.store, &requester.id)?;
    user.device_token = payload.device_token;
    state.store.update_user(&user)?;
    Ok(Json(MessageResponse {
        message: "device token updated".to_string(),
    }))
}

async fn logout_handler() -> Json<MessageResponse> {
    Json(MessageResponse {
        message: "please remove the token from client storage".to_string(),
    })
}

// --- Boards ---

async fn get_all_boards_handler(
    State(state): State<Arc<AppState>>,
    Extension(requester): Extension<Requester>,
) -> Result<Json<BoardsResponse>, ApiError> {
    let user = require_user(&state.store, &requester.id)?;
    let mut boards = Vec::new();
    for board_id in &user.boards {
        if let Some(board) = state.store.board(board_id)? {
            boards.push(board);
        }
    }
    Ok(Json(BoardsResponse {
        message: "boards retrieved!".to_string(),
        boards,
    }))
}

async fn get_board_handler(
    State(state): State<Arc<AppState>>,
    Extension(requester): Extension<Requester>,
    Path(board_id): Path<String>,
) -> Result<Json<BoardResponse>, ApiError> {
    let board_id = parse_id(&board_id, "board")?;
    let board = require_board(&state.store, &board_id)?;
    authz::ensure_member(&board, &requester.id)?;

    Ok(Json(BoardResponse {
        message: "board retrieved!".to_string(),
        board,
    }))
}

async fn get_category_boards_handler(
    State(state): State<Arc<AppState>>,
    Extension(requester): Extension<Requester>,
    Path(category): Path<String>,
) -> Result<Json<BoardsResponse>, ApiError> {
    let category = parse_category(&category)?;
    let user = require_user(&state.store, &requester.id)?;
    let mut boards = Vec::new();
    for board_id in &user.boards {
        if let Some(board) = state.store.board(board_id)? {
            if board.category == category {
                boards.push(board);
            }
        }
    }
    Ok(Json(BoardsResponse {
        message: "boards retrieved!".to_string(),
        boards,
    }))
}

async fn get_collaborators_handler(
    State(state): State<Arc<AppState>>,
    Extension(requester): Extension<Requester>,
    Path(board_id): Path<String>,
) -> Result<Json<CollaboratorsResponse>, ApiError> {
    let board_id = parse_id(&board_id, "board")?;
    let board = require_board(&state.store, &board_id)?;
    authz::ensure_member(&board, &requester.id)?;

    let mut collaborators = Vec::new();
    for user_id in &board.collaborators {
        if let Some(user) = state.store.user(user_id)? {
            collaborators.push(UserSummary::from(&user));
        }
    }
    Ok(Json(CollaboratorsResponse {
        message: "collaborators retrieved!".to_string(),
        collaborators,
    }))
}

async fn create_board_handler(
    State(state): State<Arc<AppState>>,
    Extension(requester): Extension<Requester>,
    Json(payload): Json<CreateBoardRequest>,
) -> Result<(StatusCode, Json<BoardResponse>), ApiError> {
    if payload.title.trim().is_empty() {
        return Err(ApiError::InvalidArgument("board title is required".to_string()));
    }
    if payload.description.trim().is_empty() {
        return Err(ApiError::InvalidArgument(
            "board description is required".to_string(),
        ));
    }
    let category = match payload.category.as_deref() {
        Some(value) => parse_category(value)?,
        None => BoardCategory::Other,
    };

    let mut user = require_user(&state.store, &requester.id)?;

    let board = Board {
        id: Uuid::now_v7(),
        title: payload.title,
        description: payload.description,
        category,
        owner: requester.id,
        // The owner auto-joins as collaborator
        collaborators: vec![requester.id],
        columns: vec![],
        created_at: Utc::now(),
    };
    state.store.create_board(&board)?;

    user.boards.push(board.id);
    state.store.update_user(&user)?;

    activity::record(
        &state.store,
        Activity::new(
            ActivityKind::BoardCreated,
            requester.id,
            board.id,
            format!("{} created the board \"{}\".", requester.name, board.title),
        ),
    )?;

    Ok((
        StatusCode::CREATED,
        Json(BoardResponse {
            message: format!("{} board created", board.title),
            board,
        }),
    ))
}

async fn update_board_handler(
    State(state): State<Arc<AppState>>,
    Extension(requester): Extension<Requester>,
    Json(payload): Json<UpdateBoardRequest>,
) -> Result<Json<BoardResponse>, ApiError> {
    let board_id = parse_id(&payload.board_id, "board")?;
    let mut board = require_board(&state.store, &board_id)?;
    authz::ensure_owner(&board, &requester.id)?;

    if let Some(title) = payload.title {
        if title.trim().is_empty() {
            return Err(ApiError::InvalidArgument("board title is required".to_string()));
        }
        board.title = title;
    }
    if let Some(description) = payload.description {
        board.description = description;
    }
    if let Some(category) = payload.category.as_deref() {
        board.category = parse_category(category)?;
    }
    state.store.update_board(&board)?;

    activity::record(
        &state.store,
        Activity::new(
            ActivityKind::BoardUpdated,
            requester.id,
            board.id,
            format!("{} updated the board \"{}\".", requester.name, board.title),
        ),
    )?;

    Ok(Json(BoardResponse {
        message: "board updated!".to_string(),
        board,
    }))
}

async fn delete_board_handler(
    State(state): State<Arc<AppState>>,
    Extension(requester): Extension<Requester>,
    Path(board_id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let board_id = parse_id(&board_id, "board")?;
    let board = require_board(&state.store, &board_id)?;
    authz::ensure_owner(&board, &requester.id)?;

    let lock = state.board_lock(&board_id).await;
    let _guard = lock.lock().await;
    cascade::delete_board(&state.store, &board)?;
    drop(_guard);
    state.drop_board_lock(&board_id).await;

    activity::record(
        &state.store,
        Activity::new(
            ActivityKind::BoardDeleted,
            requester.id,
            board.id,
            format!("{} deleted the board \"{}\".", requester.name, board.title),
        ),
    )?;

    Ok(Json(MessageResponse {
        message: format!("{} board deleted successfully.", board.title),
    }))
}

// --- Columns ---

async fn get_all_columns_handler(
    State(state): State<Arc<AppState>>,
    Extension(requester): Extension<Requester>,
    Path(board_id): Path<String>,
) -> Result<Json<ColumnsResponse>, ApiError> {
    let board_id = parse_id(&board_id, "board")?;
    let board = require_board(&state.store, &board_id)?;
    authz::ensure_member(&board, &requester.id)?;

    let columns = state.store.columns_in_board(&board.id)?;
    Ok(Json(ColumnsResponse {
        message: "columns fetched!".to_string(),
        columns,
    }))
}

async fn get_column_handler(
    State(state): State<Arc<AppState>>,
    Extension(requester): Extension<Requester>,
    Path(column_id): Path<String>,
) -> Result<Json<ColumnResponse>, ApiError> {
    let column_id = parse_id(&column_id, "column")?;
    let column = require_column(&state.store, &column_id)?;
    let board = require_board(&state.store, &column.board)?;
    authz::ensure_member(&board, &requester.id)?;

    let cards = state.store.cards_in_column(&column.id)?;
    Ok(Json(ColumnResponse {
        message: "column retrieved!".to_string(),
        column: ColumnDetail {
            id: column.id,
            title: column.title,
            board: column.board,
            order: column.order,
            cards,
            created_at: column.created_at,
        },
    }))
}

async fn create_column_handler(
    State(state): State<Arc<AppState>>,
    Extension(requester): Extension<Requester>,
    Json(payload): Json<CreateColumnRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    if payload.title.trim().is_empty() {
        return Err(ApiError::InvalidArgument("column title is required".to_string()));
    }
    let board_id = parse_id(&payload.board_id, "board")?;
    let board = require_board(&state.store, &board_id)?;
    // Deliberately looser than other board mutations: collaborators may add columns
    authz::ensure_member(&board, &requester.id)?;

    let lock = state.board_lock(&board_id).await;
    let _guard = lock.lock().await;

    let mut board = require_board(&state.store, &board_id)?;
    let column = Column {
        id: Uuid::now_v7(),
        title: payload.title,
        board: board.id,
        order: ordering::next_column_order(&state.store, &board.id)?,
        cards: vec![],
        created_at: Utc::now(),
    };
    state.store.create_column(&column)?;
    board.columns.push(column.id);
    state.store.update_board(&board)?;

    let mut entry = Activity::new(
        ActivityKind::ColumnCreated,
        requester.id,
        board.id,
        format!("{} created the column \"{}\".", requester.name, column.title),
    );
    entry.column = Some(column.id);
    activity::record(&state.store, entry)?;

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: format!("{} column created", column.title),
        }),
    ))
}

async fn update_column_handler(
    State(state): State<Arc<AppState>>,
    Extension(requester): Extension<Requester>,
    Path(column_id): Path<String>,
    Json(payload): Json<UpdateColumnRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    if payload.title.trim().is_empty() {
        return Err(ApiError::InvalidArgument("column title is required".to_string()));
    }
    let column_id = parse_id(&column_id, "column")?;
    let mut column = require_column(&state.store, &column_id)?;
    let board = require_board(&state.store, &column.board)?;
    authz::ensure_owner(&board, &requester.id)?;

    column.title = payload.title;
    state.store.update_column(&column)?;

    let mut entry = Activity::new(
        ActivityKind::ColumnUpdated,
        requester.id,
        board.id,
        format!("{} renamed the column to \"{}\".", requester.name, column.title),
    );
    entry.column = Some(column.id);
    activity::record(&state.store, entry)?;

    Ok(Json(MessageResponse {
        message: "column updated!".to_string(),
    }))
}

async fn move_column_handler(
    State(state): State<Arc<AppState>>,
    Extension(requester): Extension<Requester>,
    Path(column_id): Path<String>,
    Json(payload): Json<MoveColumnRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let column_id = parse_id(&column_id, "column")?;
    let target = parse_order(payload.target_order)?;
    let column = require_column(&state.store, &column_id)?;
    let board = require_board(&state.store, &column.board)?;
    authz::ensure_member(&board, &requester.id)?;

    let lock = state.board_lock(&board.id).await;
    let _guard = lock.lock().await;
    let column = ordering::move_column(&state.store, &column_id, target)?;

    let mut entry = Activity::new(
        ActivityKind::ColumnUpdated,
        requester.id,
        board.id,
        format!("{} moved the column \"{}\".", requester.name, column.title),
    );
    entry.column = Some(column.id);
    activity::record(&state.store, entry)?;

    Ok(Json(MessageResponse {
        message: "column moved!".to_string(),
    }))
}

async fn delete_column_handler(
    State(state): State<Arc<AppState>>,
    Extension(requester): Extension<Requester>,
    Path(column_id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let column_id = parse_id(&column_id, "column")?;
    let column = require_column(&state.store, &column_id)?;
    let board = require_board(&state.store, &column.board)?;
    authz::ensure_owner(&board, &requester.id)?;

    let lock = state.board_lock(&board.id).await;
    let _guard = lock.lock().await;
    cascade::delete_column(&state.store, &column)?;

    let mut entry = Activity::new(
        ActivityKind::ColumnDeleted,
        requester.id,
        board.id,
        format!("{} deleted the column \"{}\".", requester.name, column.title),
    );
    entry.column = Some(column.id);
    activity::record(&state.store, entry)?;

    Ok(Json(MessageResponse {
        message: format!("{} column deleted successfully.", column.title),
    }))
}

// --- Cards ---

async fn get_card_handler(
    State(state): State<Arc<AppState>>,
    Extension(requester): Extension<Requester>,
    Path(card_id): Path<String>,
) -> Result<Json<CardResponse>, ApiError> {
    let card_id = parse_id(&card_id, "card")?;
    let card = require_card(&state.store, &card_id)?;
    let board = require_board(&state.store, &card.board)?;
    authz::ensure_member(&board, &requester.id)?;

    Ok(Json(CardResponse {
        message: "card retrieved!".to_string(),
        card: card_detail(&state.store, card)?,
    }))
}

async fn create_card_handler(
    State(state): State<Arc<AppState>>,
    Extension(requester): Extension<Requester>,
    Json(payload): Json<CreateCardRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    if payload.title.trim().is_empty() {
        return Err(ApiError::InvalidArgument("card title is required".to_string()));
    }
    let board_id = parse_id(&payload.board_id, "board")?;
    let column_id = parse_id(&payload.column_id, "column")?;
    let board = require_board(&state.store, &board_id)?;
    let column = require_column(&state.store, &column_id)?;
    if column.board != board.id {
        return Err(ApiError::InvalidArgument(
            "column does not belong to this board".to_string(),
        ));
    }
    authz::ensure_member(&board, &requester.id)?;

    let lock = state.board_lock(&board_id).await;
    let _guard = lock.lock().await;

    let mut column = require_column(&state.store, &column_id)?;
    let card = Card {
        id: Uuid::now_v7(),
        title: payload.title,
        description: payload.description.unwrap_or_default(),
        column: column.id,
        board: board.id,
        order: ordering::next_card_order(&state.store, &column.id)?,
        // The creator starts out assigned
        assigned_to: vec![requester.id],
        due_date: payload.due_date,
        labels: payload.labels.unwrap_or_default(),
        comments: vec![],
        created_at: Utc::now(),
    };
    state.store.create_card(&card)?;
    column.cards.push(card.id);
    state.store.update_column(&column)?;

    let mut entry = Activity::new(
        ActivityKind::CardCreated,
        requester.id,
        board.id,
        format!("{} created the card \"{}\".", requester.name, card.title),
    );
    entry.column = Some(column.id);
    entry.card = Some(card.id);
    activity::record(&state.store, entry)?;

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: format!("{} card created!", card.title),
        }),
    ))
}

async fn update_card_handler(
    State(state): State<Arc<AppState>>,
    Extension(requester): Extension<Requester>,
    Path(card_id): Path<String>,
    Json(payload): Json<UpdateCardRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let card_id = parse_id(&card_id, "card")?;
    let mut card = require_card(&state.store, &card_id)?;
    let board = require_board(&state.store, &card.board)?;
    authz::ensure_member(&board, &requester.id)?;

    if let Some(title) = payload.title {
        if title.trim().is_empty() {
            return Err(ApiError::InvalidArgument("card title is required".to_string()));
        }
        card.title = title;
    }
    if let Some(description) = payload.description {
        card.description = description;
    }
    if let Some(labels) = payload.labels {
        card.labels = labels;
    }
    // Absent dueDate clears any existing deadline
    card.due_date = payload.due_date;
    state.store.update_card(&card)?;

    let mut entry = Activity::new(
        ActivityKind::CardUpdated,
        requester.id,
        board.id,
        format!("{} updated the card \"{}\".", requester.name, card.title),
    );
    entry.column = Some(card.column);
    entry.card = Some(card.id);
    activity::record(&state.store, entry)?;

    Ok(Json(MessageResponse {
        message: "card updated!".to_string(),
    }))
}

async fn move_card_handler(
    State(state): State<Arc<AppState>>,
    Extension(requester): Extension<Requester>,
    Path(card_id): Path<String>,
    Json(payload): Json<MoveCardRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let card_id = parse_id(&card_id, "card")?;
    let target_column_id = parse_id(&payload.target_column_id, "target column")?;
    let target = parse_order(payload.target_order)?;

    let card = require_card(&state.store, &card_id)?;
    let board = require_board(&state.store, &card.board)?;
    authz::ensure_member(&board, &requester.id)?;

    let lock = state.board_lock(&board.id).await;
    let _guard = lock.lock().await;
    let result = ordering::move_card(&state.store, &card_id, &target_column_id, target)?;

    let description = if result.crossed_columns {
        format!(
            "{} moved card \"{}\" to \"{}\".",
            requester.name, result.card.title, result.column_title
        )
    } else {
        format!(
            "{} reordered card \"{}\" in column \"{}\".",
            requester.name, result.card.title, result.column_title
        )
    };
    let mut entry = Activity::new(ActivityKind::CardMoved, requester.id, board.id, description);
    entry.column = Some(target_column_id);
    entry.card = Some(card_id);
    activity::record(&state.store, entry)?;

    Ok(Json(MessageResponse {
        message: "card moved!".to_string(),
    }))
}

async fn assign_card_handler(
    State(state): State<Arc<AppState>>,
    Extension(requester): Extension<Requester>,
    Path(card_id): Path<String>,
    Json(payload): Json<AssignCardRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let card_id = parse_id(&card_id, "card")?;
    let assignee_id = parse_id(&payload.assignee_id, "assignee")?;

    let mut card = require_card(&state.store, &card_id)?;
    let board = require_board(&state.store, &card.board)?;
    authz::ensure_member(&board, &requester.id)?;

    if card.assigned_to.contains(&assignee_id) {
        return Err(ApiError::Conflict(
            "assignee has already been added to this card".to_string(),
        ));
    }
    if !authz::is_member(&board, &assignee_id) {
        return Err(ApiError::InvalidArgument(
            "assignee not related to this board".to_string(),
        ));
    }
    let assignee = require_user(&state.store, &assignee_id)?;

    card.assigned_to.push(assignee_id);
    state.store.update_card(&card)?;

    let mut entry = Activity::new(
        ActivityKind::CardUpdated,
        requester.id,
        board.id,
        format!(
            "{} assigned {} to \"{}\".",
            requester.name, assignee.name, card.title
        ),
    );
    entry.column = Some(card.column);
    entry.card = Some(card.id);
    activity::record(&state.store, entry)?;

    Ok(Json(MessageResponse {
        message: "assignee added to card!".to_string(),
    }))
}

async fn delete_card_handler(
    State(state): State<Arc<AppState>>,
    Extension(requester): Extension<Requester>,
    Path(card_id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let card_id = parse_id(&card_id, "card")?;
    let card = require_card(&state.store, &card_id)?;
    let board = require_board(&state.store, &card.board)?;
    authz::ensure_owner(&board, &requester.id)?;

    let lock = state.board_lock(&board.id).await;
    let _guard = lock.lock().await;
    cascade::delete_card(&state.store, &card)?;

    let mut entry = Activity::new(
        ActivityKind::CardDeleted,
        requester.id,
        board.id,
        format!("{} deleted the card \"{}\".", requester.name, card.title),
    );
    entry.column = Some(card.column);
    activity::record(&state.store, entry)?;

    Ok(Json(MessageResponse {
        message: format!("{} card deleted successfully.", card.title),
    }))
}

// --- Comments ---

async fn get_comments_handler(
    State(state): State<Arc<AppState>>,
    Extension(requester): Extension<Requester>,
    Path(card_id): Path<String>,
) -> Result<Json<CommentsResponse>, ApiError> {
    let card_id = parse_id(&card_id, "card")?;
    let card = require_card(&state.store, &card_id)?;
    let board = require_board(&state.store, &card.board)?;
    authz::ensure_member(&board, &requester.id)?;

    let mut comments = Vec::new();
    for comment_id in &card.comments {
        if let Some(comment) = state.store.comment(comment_id)? {
            let author = state.store.user(&comment.author)?;
            comments.push(CommentView {
                id: comment.id,
                text: comment.text,
                author: author.as_ref().map(UserSummary::from),
                created_at: comment.created_at,
            });
        }
    }
    Ok(Json(CommentsResponse {
        message: "comments retrieved!".to_string(),
        comments,
    }))
}

async fn create_comment_handler(
    State(state): State<Arc<AppState>>,
    Extension(requester): Extension<Requester>,
    Json(payload): Json<CreateCommentRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    if payload.text.trim().is_empty() {
        return Err(ApiError::InvalidArgument("comment text is required".to_string()));
    }
    let card_id = parse_id(&payload.card_id, "card")?;
    let mut card = require_card(&state.store, &card_id)?;
    let board = require_board(&state.store, &card.board)?;
    authz::ensure_member(&board, &requester.id)?;

    let comment = Comment {
        id: Uuid::now_v7(),
        card: card.id,
        author: requester.id,
        text: payload.text,
        created_at: Utc::now(),
    };
    state.store.create_comment(&comment)?;
    card.comments.push(comment.id);
    state.store.update_card(&card)?;

    let mut entry = Activity::new(
        ActivityKind::CommentAdded,
        requester.id,
        board.id,
        format!("{} commented on \"{}\".", requester.name, card.title),
    );
    entry.card = Some(card.id);
    entry.comment = Some(comment.id);
    activity::record(&state.store, entry)?;

    Ok(Json(MessageResponse {
        message: "comment created!".to_string(),
    }))
}

async fn delete_comment_handler(
    State(state): State<Arc<AppState>>,
    Extension(requester): Extension<Requester>,
    Path(comment_id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let comment_id = parse_id(&comment_id, "comment")?;
    let comment = require_comment(&state.store, &comment_id)?;
    authz::ensure_comment_author(&comment, &requester.id)?;

    cascade::delete_comment(&state.store, &comment)?;

    if let Some(card) = state.store.card(&comment.card)? {
        let mut entry = Activity::new(
            ActivityKind::CommentDeleted,
            requester.id,
            card.board,
            format!("{} deleted a comment on \"{}\".", requester.name, card.title),
        );
        entry.card = Some(card.id);
        activity::record(&state.store, entry)?;
    }

    Ok(Json(MessageResponse {
        message: "comment deleted!".to_string(),
    }))
}

// --- Activities ---

async fn recent_activities_handler(
    State(state): State<Arc<AppState>>,
    Extension(requester): Extension<Requester>,
) -> Result<Json<ActivitiesResponse>, ApiError> {
    let user = require_user(&state.store, &requester.id)?;
    let activities = activity::recent_for_user(&state.store, &user)?;
    Ok(Json(ActivitiesResponse {
        message: "activities retrieved!".to_string(),
        activities,
    }))
}

async fn board_activities_handler(
    State(state): State<Arc<AppState>>,
    Extension(requester): Extension<Requester>,
    Path(board_id): Path<String>,
) -> Result<Json<ActivitiesResponse>, ApiError> {
    let board_id = parse_id(&board_id, "board")?;
    let board = require_board(&state.store, &board_id)?;
    // The full per-board feed is owner-only
    authz::ensure_owner(&board, &requester.id)?;

    let activities = activity::for_board(&state.store, &board.id)?;
    Ok(Json(ActivitiesResponse {
        message: "activities retrieved!".to_string(),
        activities,
    }))
}

// --- Invitations ---

async fn get_invitations_handler(
    State(state): State<Arc<AppState>>,
    Extension(requester): Extension<Requester>,
) -> Result<Json<InvitationsResponse>, ApiError> {
    let invitations = invitations::list_for_user(&state.store, &requester.id)?;
    let mut views = Vec::new();
    for invitation in invitations {
        let from = state.store.user(&invitation.from)?;
        let board = state.store.board(&invitation.board)?;
        views.push(InvitationView {
            id: invitation.id,
            status: invitation.status,
            from: from.as_ref().map(UserSummary::from),
            board: board.map(|b| BoardSummary {
                id: b.id,
                title: b.title,
                category: b.category,
            }),
            created_at: invitation.created_at,
        });
    }
    Ok(Json(InvitationsResponse {
        message: "invitations retrieved!".to_string(),
        invitations: views,
    }))
}

async fn send_invite_handler(
    State(state): State<Arc<AppState>>,
    Extension(requester): Extension<Requester>,
    Json(payload): Json<SendInviteRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    let to_user_id = parse_id(&payload.to_user_id, "user")?;
    let board_id = parse_id(&payload.board_id, "board")?;

    let (_invitation, recipient) =
        invitations::send(&state.store, &requester, &to_user_id, &board_id)?;

    // Fire-and-forget; delivery failure never rolls back the invitation
    if let Some(token) = recipient.device_token {
        let board = require_board(&state.store, &board_id)?;
        let notifier = state.notifier.clone();
        let title = "Board invitation".to_string();
        let body = format!("{} invited you to \"{}\"", requester.name, board.title);
        tokio::spawn(async move {
            notifier.notify(&token, &title, &body).await;
        });
    }

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: "invitation sent".to_string(),
        }),
    ))
}

async fn accept_invitation_handler(
    State(state): State<Arc<AppState>>,
    Extension(requester): Extension<Requester>,
    Path(invitation_id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let invitation_id = parse_id(&invitation_id, "invitation")?;
    invitations::accept(&state.store, &requester.id, &invitation_id)?;
    Ok(Json(MessageResponse {
        message: "invitation accepted successfully".to_string(),
    }))
}

async fn reject_invitation_handler(
    State(state): State<Arc<AppState>>,
    Extension(requester): Extension<Requester>,
    Path(invitation_id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let invitation_id = parse_id(&invitation_id, "invitation")?;
    invitations::reject(&state.store, &requester.id, &invitation_id)?;
    Ok(Json(MessageResponse {
        message: "invitation rejected".to_string(),
    }))
}

/// Health check handler
async fn health_handler() -> Json<MessageResponse> {
    Json(MessageResponse {
        message: "taskboard API healthy".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::NoopNotifier;
    use axum::body::Body;
    use serde_json::{json, Value};
    use std::fs;
    use tower::ServiceExt; // For .oneshot() testing

    fn test_router(name: &str) -> (Router, Store) {
        let temp_dir = std::env::temp_dir().join(name);
        let _ = fs::remove_dir_all(&temp_dir);
        let store = Store::open(temp_dir.to_str().unwrap()).expect("store for REST test");
        let router = create_router(store.clone(), Arc::new(NoopNotifier));
        (router, store)
    }

    /// Insert a user directly and mint a token for them, skipping the
    /// signup/login round trips.
    fn seeded_user(store: &Store, name: &str, email: &str) -> (User, String) {
        let user = User {
            id: Uuid::now_v7(),
            name: name.to_string(),
            email: email.to_string(),
            password_hash: "x".to_string(),
            boards: vec![],
            avatar: None,
            role: None,
            invitations: vec![],
            device_token: None,
            created_at: Utc::now(),
        };
        store.create_user(&user).unwrap();
        let token = create_jwt(&user.id).unwrap();
        (user, token)
    }

    async fn request(
        router: &Router,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = axum::http::Request::builder().uri(uri).method(method);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {token}"));
        }
        let body = match body {
            Some(value) => {
                builder = builder.header("content-type", "application/json");
                Body::from(value.to_string())
            }
            None => Body::empty(),
        };
        let response = router
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .expect("request");
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    #[tokio::test]
    async fn health_is_open() {
        let (router, _) = test_router("taskboard_test_rest_health");
        let (status, body) = request(&router, "GET", "/health", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "taskboard API healthy");
    }

    #[tokio::test]
    async fn missing_token_is_unauthorized() {
        let (router, _) = test_router("taskboard_test_rest_noauth");
        let (status, body) = request(&router, "GET", "/api/boards/get-all", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["code"], "unauthorized");
    }

    #[tokio::test]
    async fn signup_then_login_issues_a_token() {
        let (router, _) = test_router("taskboard_test_rest_signup");

        let (status, _) = request(
            &router,
            "POST",
            "/api/users/signup",
            None,
            Some(json!({"name": "Ada", "email": "ada@example.com", "password": "longenough1"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        // Too-short password fails validation before any store access
        let (status, body) = request(
            &router,
            "POST",
            "/api/users/signup",
            None,
            Some(json!({"name": "Bob", "email": "bob@example.com", "password": "short"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "invalid_argument");

        let (status, body) = request(
            &router,
            "POST",
            "/api/users/login",
            None,
            Some(json!({"email": "ada@example.com", "password": "longenough1"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["token"].as_str().is_some());
    }

    #[tokio::test]
    async fn board_lifecycle_over_http() {
        let (router, store) = test_router("taskboard_test_rest_board_flow");
        let (_user, token) = seeded_user(&store, "Ada", "ada-flow@example.com");

        let (status, body) = request(
            &router,
            "POST",
            "/api/boards/create-board",
            Some(&token),
            Some(json!({"title": "Launch", "description": "plan", "category": "work"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let board_id = body["board"]["id"].as_str().unwrap().to_string();

        let (status, body) = request(
            &router,
            "POST",
            "/api/columns/create-column",
            Some(&token),
            Some(json!({"title": "Todo", "boardId": board_id})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["message"], "Todo column created");

        let (status, body) = request(
            &router,
            "GET",
            &format!("/api/columns/get-all/{board_id}"),
            Some(&token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let column_id = body["columns"][0]["id"].as_str().unwrap().to_string();

        let (status, _) = request(
            &router,
            "POST",
            "/api/cards/create-card",
            Some(&token),
            Some(json!({
                "title": "Write announcement",
                "columnId": column_id,
                "boardId": board_id,
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        // The board feed recorded each step
        let (status, body) = request(
            &router,
            "GET",
            &format!("/api/activities/{board_id}"),
            Some(&token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["activities"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn negative_target_order_is_rejected() {
        let (router, store) = test_router("taskboard_test_rest_bad_order");
        let (_user, token) = seeded_user(&store, "Ada", "ada-order@example.com");

        let (_, body) = request(
            &router,
            "POST",
            "/api/boards/create-board",
            Some(&token),
            Some(json!({"title": "B", "description": "d"})),
        )
        .await;
        let board_id = body["board"]["id"].as_str().unwrap().to_string();

        request(
            &router,
            "POST",
            "/api/columns/create-column",
            Some(&token),
            Some(json!({"title": "Todo", "boardId": board_id})),
        )
        .await;
        let (_, body) = request(
            &router,
            "GET",
            &format!("/api/columns/get-all/{board_id}"),
            Some(&token),
            None,
        )
        .await;
        let column_id = body["columns"][0]["id"].as_str().unwrap().to_string();

        let (status, body) = request(
            &router,
            "PATCH",
            &format!("/api/columns/move-column/{column_id}"),
            Some(&token),
            Some(json!({"targetOrder": -1})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "invalid_argument");
    }

    #[tokio::test]
    async fn collaborator_cannot_delete_the_board() {
        let (router, store) = test_router("taskboard_test_rest_guard");
        let (_owner, owner_token) = seeded_user(&store, "Owner", "owner-guard@example.com");
        let (collab, collab_token) = seeded_user(&store, "Collab", "collab-guard@example.com");

        let (_, body) = request(
            &router,
            "POST",
            "/api/boards/create-board",
            Some(&owner_token),
            Some(json!({"title": "B", "description": "d"})),
        )
        .await;
        let board_id = body["board"]["id"].as_str().unwrap().to_string();

        // Bring the second user on via the invitation workflow
        let (status, _) = request(
            &router,
            "POST",
            "/api/invitations/send",
            Some(&owner_token),
            Some(json!({"toUserId": collab.id.to_string(), "boardId": board_id})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let (_, body) = request(&router, "GET", "/api/invitations", Some(&collab_token), None).await;
        let invitation_id = body["invitations"][0]["id"].as_str().unwrap().to_string();
        let (status, _) = request(
            &router,
            "POST",
            &format!("/api/invitations/{invitation_id}/accept"),
            Some(&collab_token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        // Member rights: the collaborator can add a column
        let (status, _) = request(
            &router,
            "POST",
            "/api/columns/create-column",
            Some(&collab_token),
            Some(json!({"title": "Theirs", "boardId": board_id})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        // But not destroy the board
        let (status, body) = request(
            &router,
            "DELETE",
            &format!("/api/boards/{board_id}"),
            Some(&collab_token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["code"], "unauthorized");

        // The owner can
        let (status, _) = request(
            &router,
            "DELETE",
            &format!("/api/boards/{board_id}"),
            Some(&owner_token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(store
            .board(&Uuid::parse_str(&board_id).unwrap())
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn assignment_requires_a_collaborator_and_rejects_duplicates() {
        let (router, store) = test_router("taskboard_test_rest_assign");
        let (owner, owner_token) = seeded_user(&store, "Owner", "owner-assign@example.com");
        let (outsider, _) = seeded_user(&store, "Outsider", "outsider-assign@example.com");

        let (_, body) = request(
            &router,
            "POST",
            "/api/boards/create-board",
            Some(&owner_token),
            Some(json!({"title": "B", "description": "d"})),
        )
        .await;
        let board_id = body["board"]["id"].as_str().unwrap().to_string();
        request(
            &router,
            "POST",
            "/api/columns/create-column",
            Some(&owner_token),
            Some(json!({"title": "Todo", "boardId": board_id})),
        )
        .await;
        let (_, body) = request(
            &router,
            "GET",
            &format!("/api/columns/get-all/{board_id}"),
            Some(&owner_token),
            None,
        )
        .await;
        let column_id = body["columns"][0]["id"].as_str().unwrap().to_string();
        request(
            &router,
            "POST",
            "/api/cards/create-card",
            Some(&owner_token),
            Some(json!({"title": "Task", "columnId": column_id, "boardId": board_id})),
        )
        .await;
        let (_, body) = request(
            &router,
            "GET",
            &format!("/api/columns/{column_id}"),
            Some(&owner_token),
            None,
        )
        .await;
        let card_id = body["column"]["cards"][0]["id"].as_str().unwrap().to_string();

        // Not a collaborator of the board
        let (status, body) = request(
            &router,
            "PATCH",
            &format!("/api/cards/add-assignee/{card_id}"),
            Some(&owner_token),
            Some(json!({"assigneeId": outsider.id.to_string()})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "invalid_argument");

        // The creator is auto-assigned, so assigning them again is a duplicate
        let (status, body) = request(
            &router,
            "PATCH",
            &format!("/api/cards/add-assignee/{card_id}"),
            Some(&owner_token),
            Some(json!({"assigneeId": owner.id.to_string()})),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["code"], "conflict");
    }

    #[tokio::test]
    async fn malformed_ids_are_invalid_arguments() {
        let (router, store) = test_router("taskboard_test_rest_bad_id");
        let (_user, token) = seeded_user(&store, "Ada", "ada-badid@example.com");

        let (status, body) =
            request(&router, "GET", "/api/boards/not-a-uuid", Some(&token), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "invalid_argument");
    }
}
