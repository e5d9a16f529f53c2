//! Cascade engine: explicit deletion tree Board -> Column -> Card -> Comment.
//!
//! Invoked directly by the deletion operations rather than hidden in
//! storage hooks, so each level is independently testable. Children are
//! removed before their parent's record, and back-references are pruned so
//! no surviving entity points at a deleted id. Activities are exempt: the
//! feed is an audit trail and survives every cascade.
//!
//! Steps are not atomic across entities; a failure mid-sequence leaves a
//! partially-cascaded subtree (documented limitation of the single-document
//! store — see DESIGN.md).

use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::models::{Board, Card, Column, Comment, Invitation};
use crate::ordering;
use crate::storage::Store;

/// Delete a board and everything under it: comments, cards, columns, the
/// board id in every user's `boards` set, and any invitation still pointing
/// at the board.
pub fn delete_board(store: &Store, board: &Board) -> ApiResult<()> {
    for column in store.columns_in_board(&board.id)? {
        delete_column_subtree(store, &column)?;
    }

    for mut user in store.users_with_board(&board.id)? {
        user.boards.retain(|id| id != &board.id);
        store.update_user(&user)?;
    }

    // A pending invite to a deleted board could otherwise still be accepted
    for invitation in store.invitations_for_board(&board.id)? {
        remove_invitation_record(store, &invitation)?;
    }

    store.remove_board(&board.id)
}

/// Delete a column, its cards and their comments, prune it from the board's
/// column sequence and renumber the survivors.
pub fn delete_column(store: &Store, column: &Column) -> ApiResult<()> {
    delete_column_subtree(store, column)?;

    if let Some(mut board) = store.board(&column.board)? {
        board.columns.retain(|id| id != &column.id);
        store.update_board(&board)?;
        ordering::renumber_columns(store, &board.columns)?;
    }
    Ok(())
}

/// Delete a card and its comments, prune it from its column's card sequence
/// and renumber the survivors.
pub fn delete_card(store: &Store, card: &Card) -> ApiResult<()> {
    delete_card_subtree(store, card)?;

    if let Some(mut column) = store.column(&card.column)? {
        column.cards.retain(|id| id != &card.id);
        store.update_column(&column)?;
        ordering::renumber_cards(store, &column.cards)?;
    }
    Ok(())
}

/// Delete a comment and prune it from its card's comment sequence.
pub fn delete_comment(store: &Store, comment: &Comment) -> ApiResult<()> {
    if let Some(mut card) = store.card(&comment.card)? {
        card.comments.retain(|id| id != &comment.id);
        store.update_card(&card)?;
    }
    store.remove_comment(&comment.id)
}

/// Remove an invitation record and its id from the recipient's list.
pub fn remove_invitation_record(store: &Store, invitation: &Invitation) -> ApiResult<()> {
    if let Some(mut user) = store.user(&invitation.to)? {
        user.invitations.retain(|id| id != &invitation.id);
        store.update_user(&user)?;
    }
    store.remove_invitation(&invitation.id)
}

// Cards and comments of the column, then the column record. Does not touch
// the owning board; board-level callers handle their own sequence.
fn delete_column_subtree(store: &Store, column: &Column) -> ApiResult<()> {
    for card in store.cards_in_column(&column.id)? {
        delete_card_subtree(store, &card)?;
    }
    store.remove_column(&column.id)
}

fn delete_card_subtree(store: &Store, card: &Card) -> ApiResult<()> {
    for comment in store.comments_for_card(&card.id)? {
        store.remove_comment(&comment.id)?;
    }
    store.remove_card(&card.id)
}

/// Load-or-NotFound helpers used by the deletion handlers so a missing id
/// reports NotFound and triggers no cascade at all.
pub fn require_board(store: &Store, id: &Uuid) -> ApiResult<Board> {
    store
        .board(id)?
        .ok_or_else(|| ApiError::NotFound("board not found".to_string()))
}

pub fn require_column(store: &Store, id: &Uuid) -> ApiResult<Column> {
    store
        .column(id)?
        .ok_or_else(|| ApiError::NotFound("column not found".to_string()))
}

pub fn require_card(store: &Store, id: &Uuid) -> ApiResult<Card> {
    store
        .card(id)?
        .ok_or_else(|| ApiError::NotFound("card not found".to_string()))
}

pub fn require_comment(store: &Store, id: &Uuid) -> ApiResult<Comment> {
    store
        .comment(id)?
        .ok_or_else(|| ApiError::NotFound("comment not found".to_string()))
}
