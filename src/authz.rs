//! Authorization guard: owner / collaborator / none decisions.
//!
//! The owner is inserted into `collaborators` at board creation, so
//! membership is a plain contains() check; destructive operations (board
//! update/delete, column rename/delete, card delete) stay owner-only.
//! Every check fails closed.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::models::{Board, Comment};

/// Authenticated requester identity, injected by the auth middleware.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Requester {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

pub fn is_owner(board: &Board, user_id: &Uuid) -> bool {
    board.owner == *user_id
}

pub fn is_member(board: &Board, user_id: &Uuid) -> bool {
    board.owner == *user_id || board.collaborators.contains(user_id)
}

/// Board update/delete, column rename/delete, card delete, board activity feed.
pub fn ensure_owner(board: &Board, user_id: &Uuid) -> ApiResult<()> {
    if is_owner(board, user_id) {
        return Ok(());
    }
    Err(ApiError::Unauthorized(
        "you do not have ownership of this board".to_string(),
    ))
}

/// Reads, column/card creation and movement, comments, invitation sending.
pub fn ensure_member(board: &Board, user_id: &Uuid) -> ApiResult<()> {
    if is_member(board, user_id) {
        return Ok(());
    }
    Err(ApiError::Unauthorized(
        "you are not a collaborator on this board".to_string(),
    ))
}

/// Only the author may delete their comment.
pub fn ensure_comment_author(comment: &Comment, user_id: &Uuid) -> ApiResult<()> {
    if comment.author == *user_id {
        return Ok(());
    }
    Err(ApiError::Unauthorized(
        "you are not the author of this comment".to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BoardCategory;
    use chrono::Utc;

    fn board_with(owner: Uuid, collaborator: Uuid) -> Board {
        Board {
            id: Uuid::now_v7(),
            title: "b".to_string(),
            description: "d".to_string(),
            category: BoardCategory::Other,
            owner,
            collaborators: vec![owner, collaborator],
            columns: vec![],
            created_at: Utc::now(),
        }
    }

    #[test]
    fn owner_passes_both_checks() {
        let owner = Uuid::now_v7();
        let board = board_with(owner, Uuid::now_v7());
        assert!(ensure_owner(&board, &owner).is_ok());
        assert!(ensure_member(&board, &owner).is_ok());
    }

    #[test]
    fn collaborator_is_member_but_not_owner() {
        let collaborator = Uuid::now_v7();
        let board = board_with(Uuid::now_v7(), collaborator);
        assert!(ensure_member(&board, &collaborator).is_ok());
        assert!(matches!(
            ensure_owner(&board, &collaborator),
            Err(ApiError::Unauthorized(_))
        ));
    }

    #[test]
    fn stranger_is_denied() {
        let board = board_with(Uuid::now_v7(), Uuid::now_v7());
        let stranger = Uuid::now_v7();
        assert!(matches!(
            ensure_member(&board, &stranger),
            Err(ApiError::Unauthorized(_))
        ));
        assert!(matches!(
            ensure_owner(&board, &stranger),
            Err(ApiError::Unauthorized(_))
        ));
    }

    #[test]
    fn comment_author_check() {
        let author = Uuid::now_v7();
        let comment = Comment {
            id: Uuid::now_v7(),
            card: Uuid::now_v7(),
            author,
            text: "hi".to_string(),
            created_at: Utc::now(),
        };
        assert!(ensure_comment_author(&comment, &author).is_ok());
        assert!(matches!(
            ensure_comment_author(&comment, &Uuid::now_v7()),
            Err(ApiError::Unauthorized(_))
        ));
    }
}
