//! Entity store over Sled.
//!
//! One tree per entity kind, values Serde-serialized JSON keyed by the
//! entity's id bytes (v7 ids, so key order is creation order). Single-key
//! writes are atomic; there are no multi-document transactions, so
//! cross-entity consistency is the cascade engine's job, not the store's.
//! Field-filtered finds are full-tree scans; every collection here is
//! human-scale (tens of entries), never millions.

use serde::de::DeserializeOwned;
use serde::Serialize;
use sled::{Db, Tree};
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::models::{
    Activity, Board, Card, Column, Comment, Invitation, InvitationStatus, User,
};

#[allow(dead_code)] // db kept for future ops like flush/close on Sled
#[derive(Clone)] // Clone for sharing across handlers (Sled internals cheap to clone)
pub struct Store {
    db: Db,
    users: Tree,
    // Secondary index: normalized email -> user id bytes (unique email)
    user_emails: Tree,
    boards: Tree,
    columns: Tree,
    cards: Tree,
    comments: Tree,
    activities: Tree,
    invitations: Tree,
}

fn encode<T: Serialize>(value: &T) -> ApiResult<Vec<u8>> {
    Ok(serde_json::to_vec(value)?)
}

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> ApiResult<T> {
    Ok(serde_json::from_slice(bytes)?)
}

/// Emails are matched case-insensitively and ignore surrounding whitespace.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

impl Store {
    /// Open or create the Sled database at the given path and its entity trees.
    pub fn open(path: &str) -> ApiResult<Self> {
        let db = sled::open(path)?;
        let users = db.open_tree("users")?;
        let user_emails = db.open_tree("user_emails")?;
        let boards = db.open_tree("boards")?;
        let columns = db.open_tree("columns")?;
        let cards = db.open_tree("cards")?;
        let comments = db.open_tree("comments")?;
        let activities = db.open_tree("activities")?;
        let invitations = db.open_tree("invitations")?;
        Ok(Self {
            db,
            users,
            user_emails,
            boards,
            columns,
            cards,
            comments,
            activities,
            invitations,
        })
    }

    fn put<T: Serialize>(tree: &Tree, id: &Uuid, value: &T) -> ApiResult<()> {
        tree.insert(id.as_bytes(), encode(value)?)?;
        Ok(())
    }

    fn fetch<T: DeserializeOwned>(tree: &Tree, id: &Uuid) -> ApiResult<Option<T>> {
        match tree.get(id.as_bytes())? {
            Some(bytes) => Ok(Some(decode(&bytes)?)),
            None => Ok(None),
        }
    }

    fn scan<T: DeserializeOwned>(tree: &Tree) -> ApiResult<Vec<T>> {
        let mut out = Vec::new();
        for item in tree.iter() {
            let (_, bytes) = item?;
            out.push(decode(&bytes)?);
        }
        Ok(out)
    }

    // --- Users ---

    /// Insert a new user; the email must not already be registered.
    pub fn create_user(&self, user: &User) -> ApiResult<()> {
        let email = normalize_email(&user.email);
        if self.user_emails.get(email.as_bytes())?.is_some() {
            return Err(ApiError::Conflict("email already exists".to_string()));
        }
        Self::put(&self.users, &user.id, user)?;
        self.user_emails
            .insert(email.as_bytes(), user.id.as_bytes().to_vec())?;
        Ok(())
    }

    pub fn user(&self, id: &Uuid) -> ApiResult<Option<User>> {
        Self::fetch(&self.users, id)
    }

    pub fn user_by_email(&self, email: &str) -> ApiResult<Option<User>> {
        let email = normalize_email(email);
        match self.user_emails.get(email.as_bytes())? {
            Some(id_bytes) => {
                let id = Uuid::from_slice(id_bytes.as_ref())
                    .map_err(|e| ApiError::Internal(e.to_string()))?;
                self.user(&id)
            }
            None => Ok(None),
        }
    }

    /// Write back a modified user record. The email is immutable, so the
    /// secondary index never needs touching here.
    pub fn update_user(&self, user: &User) -> ApiResult<()> {
        Self::put(&self.users, &user.id, user)
    }

    /// All users whose `boards` set contains the given board id.
    pub fn users_with_board(&self, board_id: &Uuid) -> ApiResult<Vec<User>> {
        let users: Vec<User> = Self::scan(&self.users)?;
        Ok(users
            .into_iter()
            .filter(|u| u.boards.contains(board_id))
            .collect())
    }

    // --- Boards ---

    pub fn create_board(&self, board: &Board) -> ApiResult<()> {
        Self::put(&self.boards, &board.id, board)
    }

    pub fn board(&self, id: &Uuid) -> ApiResult<Option<Board>> {
        Self::fetch(&self.boards, id)
    }

    pub fn update_board(&self, board: &Board) -> ApiResult<()> {
        Self::put(&self.boards, &board.id, board)
    }

    pub fn remove_board(&self, id: &Uuid) -> ApiResult<()> {
        self.boards.remove(id.as_bytes())?;
        Ok(())
    }

    // --- Columns ---

    pub fn create_column(&self, column: &Column) -> ApiResult<()> {
        Self::put(&self.columns, &column.id, column)
    }

    pub fn column(&self, id: &Uuid) -> ApiResult<Option<Column>> {
        Self::fetch(&self.columns, id)
    }

    pub fn update_column(&self, column: &Column) -> ApiResult<()> {
        Self::put(&self.columns, &column.id, column)
    }

    pub fn remove_column(&self, id: &Uuid) -> ApiResult<()> {
        self.columns.remove(id.as_bytes())?;
        Ok(())
    }

    /// Columns whose `board` field equals the given id, ascending by order.
    pub fn columns_in_board(&self, board_id: &Uuid) -> ApiResult<Vec<Column>> {
        let mut columns: Vec<Column> = Self::scan(&self.columns)?
            .into_iter()
            .filter(|c: &Column| c.board == *board_id)
            .collect();
        columns.sort_by_key(|c| c.order);
        Ok(columns)
    }

    // --- Cards ---

    pub fn create_card(&self, card: &Card) -> ApiResult<()> {
        Self::put(&self.cards, &card.id, card)
    }

    pub fn card(&self, id: &Uuid) -> ApiResult<Option<Card>> {
        Self::fetch(&self.cards, id)
    }

    pub fn update_card(&self, card: &Card) -> ApiResult<()> {
        Self::put(&self.cards, &card.id, card)
    }

    pub fn remove_card(&self, id: &Uuid) -> ApiResult<()> {
        self.cards.remove(id.as_bytes())?;
        Ok(())
    }

    /// Cards whose `column` field equals the given id, ascending by order.
    pub fn cards_in_column(&self, column_id: &Uuid) -> ApiResult<Vec<Card>> {
        let mut cards: Vec<Card> = Self::scan(&self.cards)?
            .into_iter()
            .filter(|c: &Card| c.column == *column_id)
            .collect();
        cards.sort_by_key(|c| c.order);
        Ok(cards)
    }

    // --- Comments ---

    pub fn create_comment(&self, comment: &Comment) -> ApiResult<()> {
        Self::put(&self.comments, &comment.id, comment)
    }

    pub fn comment(&self, id: &Uuid) -> ApiResult<Option<Comment>> {
        Self::fetch(&self.comments, id)
    }

    pub fn remove_comment(&self, id: &Uuid) -> ApiResult<()> {
        self.comments.remove(id.as_bytes())?;
        Ok(())
    }

    pub fn comments_for_card(&self, card_id: &Uuid) -> ApiResult<Vec<Comment>> {
        let comments: Vec<Comment> = Self::scan(&self.comments)?;
        Ok(comments
            .into_iter()
            .filter(|c| c.card == *card_id)
            .collect())
    }

    // --- Activities ---

    pub fn append_activity(&self, activity: &Activity) -> ApiResult<()> {
        Self::put(&self.activities, &activity.id, activity)
    }

    pub fn activities(&self) -> ApiResult<Vec<Activity>> {
        Self::scan(&self.activities)
    }

    pub fn activities_for_board(&self, board_id: &Uuid) -> ApiResult<Vec<Activity>> {
        let activities: Vec<Activity> = Self::scan(&self.activities)?;
        Ok(activities
            .into_iter()
            .filter(|a| a.board == *board_id)
            .collect())
    }

    // --- Invitations ---

    pub fn create_invitation(&self, invitation: &Invitation) -> ApiResult<()> {
        Self::put(&self.invitations, &invitation.id, invitation)
    }

    pub fn invitation(&self, id: &Uuid) -> ApiResult<Option<Invitation>> {
        Self::fetch(&self.invitations, id)
    }

    pub fn update_invitation(&self, invitation: &Invitation) -> ApiResult<()> {
        Self::put(&self.invitations, &invitation.id, invitation)
    }

    pub fn remove_invitation(&self, id: &Uuid) -> ApiResult<()> {
        self.invitations.remove(id.as_bytes())?;
        Ok(())
    }

    /// The pending invitation for a (recipient, board) pair, if one exists.
    /// At most one can be pending at a time.
    pub fn pending_invitation(&self, to: &Uuid, board: &Uuid) -> ApiResult<Option<Invitation>> {
        let invitations: Vec<Invitation> = Self::scan(&self.invitations)?;
        Ok(invitations.into_iter().find(|i| {
            i.to == *to && i.board == *board && i.status == InvitationStatus::Pending
        }))
    }

    pub fn invitations_to_user(&self, to: &Uuid) -> ApiResult<Vec<Invitation>> {
        let invitations: Vec<Invitation> = Self::scan(&self.invitations)?;
        Ok(invitations.into_iter().filter(|i| i.to == *to).collect())
    }

    pub fn invitations_for_board(&self, board_id: &Uuid) -> ApiResult<Vec<Invitation>> {
        let invitations: Vec<Invitation> = Self::scan(&self.invitations)?;
        Ok(invitations
            .into_iter()
            .filter(|i| i.board == *board_id)
            .collect())
    }
}
