use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    // Boards the user owns or collaborates on
    pub boards: Vec<Uuid>,
    pub avatar: Option<String>,
    pub role: Option<String>,
    pub invitations: Vec<Uuid>,
    // Push target for the notification hook; absent until the client registers one
    pub device_token: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BoardCategory {
    Personal,
    Work,
    Education,
    Marketing,
    Development,
    Other,
}

impl FromStr for BoardCategory {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "personal" => Ok(Self::Personal),
            "work" => Ok(Self::Work),
            "education" => Ok(Self::Education),
            "marketing" => Ok(Self::Marketing),
            "development" => Ok(Self::Development),
            "other" => Ok(Self::Other),
            _ => Err(()),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Board {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub category: BoardCategory,
    pub owner: Uuid,
    // The owner is inserted here at creation, so membership checks are a
    // single contains() over this list
    pub collaborators: Vec<Uuid>,
    // Column ids ascending by order; must match the columns whose `board`
    // field is this id
    pub columns: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    pub id: Uuid,
    pub title: String,
    // Immutable after creation
    pub board: Uuid,
    // Dense 0..N-1 within the board's column set
    pub order: u32,
    pub cards: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub column: Uuid,
    // Denormalized owner board; always equals the owning column's board
    pub board: Uuid,
    // Dense 0..N-1 within the column's card set
    pub order: u32,
    pub assigned_to: Vec<Uuid>,
    pub due_date: Option<DateTime<Utc>>,
    pub labels: Vec<String>,
    // Insertion order
    pub comments: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: Uuid,
    pub card: Uuid,
    pub author: Uuid,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActivityKind {
    BoardCreated,
    BoardUpdated,
    BoardDeleted,
    ColumnCreated,
    ColumnUpdated,
    ColumnDeleted,
    CardCreated,
    CardUpdated,
    CardMoved,
    CardDeleted,
    CommentAdded,
    CommentDeleted,
}

/// Append-only feed entry; never updated once written.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    pub id: Uuid,
    pub kind: ActivityKind,
    pub user: Uuid,
    pub board: Uuid,
    pub column: Option<Uuid>,
    pub card: Option<Uuid>,
    pub comment: Option<Uuid>,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

impl Activity {
    pub fn new(kind: ActivityKind, user: Uuid, board: Uuid, description: impl Into<String>) -> Self {
        Self {
            id: Uuid::now_v7(),
            kind,
            user,
            board,
            column: None,
            card: None,
            comment: None,
            description: description.into(),
            created_at: Utc::now(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum InvitationStatus {
    Pending,
    Accepted,
    Rejected,
}

impl fmt::Display for InvitationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Accepted => write!(f, "accepted"),
            Self::Rejected => write!(f, "rejected"),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Invitation {
    pub id: Uuid,
    pub from: Uuid,
    pub to: Uuid,
    pub board: Uuid,
    pub status: InvitationStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct AuthPayload {
    pub sub: Uuid, // user id
    pub exp: usize,
}
