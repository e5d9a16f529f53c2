//! Ordering engine for the two nested sibling sets: columns within a board
//! and cards within a column.
//!
//! Every sibling set keeps a dense, zero-based `order`. Mutations work on
//! the parent's ordered id sequence fetched once per operation: remove the
//! entity, insert at the clamped target index (beyond-end degrades to
//! append), write the sequence back, then renumber every member to its new
//! index in a single pass. Renumbering is O(N) over the sibling count;
//! boards hold tens of columns and cards, not millions.
//!
//! Callers serialize these operations per board (see the lock map in the
//! REST state); without that, concurrent writers race last-writer-wins on
//! the final renumber pass.

use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::models::{Card, Column};
use crate::storage::Store;

/// Position for a newly appended column: one past the current highest
/// order in the board, 0 for the first.
pub fn next_column_order(store: &Store, board_id: &Uuid) -> ApiResult<u32> {
    let columns = store.columns_in_board(board_id)?;
    Ok(columns.iter().map(|c| c.order + 1).max().unwrap_or(0))
}

/// Position for a newly appended card: one past the current highest order
/// in the column, 0 for the first.
pub fn next_card_order(store: &Store, column_id: &Uuid) -> ApiResult<u32> {
    let cards = store.cards_in_column(column_id)?;
    Ok(cards.iter().map(|c| c.order + 1).max().unwrap_or(0))
}

/// Re-assign every column of the board its index in the board's `columns`
/// sequence. Untouched members are not rewritten.
pub fn renumber_columns(store: &Store, board_columns: &[Uuid]) -> ApiResult<()> {
    for (idx, column_id) in board_columns.iter().enumerate() {
        if let Some(mut column) = store.column(column_id)? {
            if column.order != idx as u32 {
                column.order = idx as u32;
                store.update_column(&column)?;
            }
        }
    }
    Ok(())
}

/// Re-assign every card of the column its index in the column's `cards`
/// sequence.
pub fn renumber_cards(store: &Store, column_cards: &[Uuid]) -> ApiResult<()> {
    for (idx, card_id) in column_cards.iter().enumerate() {
        if let Some(mut card) = store.card(card_id)? {
            if card.order != idx as u32 {
                card.order = idx as u32;
                store.update_card(&card)?;
            }
        }
    }
    Ok(())
}

/// Reorder a column within its board's column sequence. A target beyond the
/// end appends; moving to the current position is an idempotent no-op that
/// still renumbers.
pub fn move_column(store: &Store, column_id: &Uuid, target: usize) -> ApiResult<Column> {
    let column = store
        .column(column_id)?
        .ok_or_else(|| ApiError::NotFound("column not found".to_string()))?;
    let mut board = store
        .board(&column.board)?
        .ok_or_else(|| ApiError::NotFound("board not found".to_string()))?;

    board.columns.retain(|id| id != column_id);
    let idx = target.min(board.columns.len());
    board.columns.insert(idx, *column_id);
    store.update_board(&board)?;
    renumber_columns(store, &board.columns)?;

    store
        .column(column_id)?
        .ok_or_else(|| ApiError::NotFound("column not found".to_string()))
}

#[derive(Debug)]
pub struct CardMove {
    pub card: Card,
    /// True when the card changed columns, false for a same-column reorder.
    pub crossed_columns: bool,
    pub column_title: String,
}

/// Move a card to `target_column_id` at `target`, or reorder it in place
/// when the target column is its current one. The target column must belong
/// to the card's board; cards never move across boards.
pub fn move_card(
    store: &Store,
    card_id: &Uuid,
    target_column_id: &Uuid,
    target: usize,
) -> ApiResult<CardMove> {
    let mut card = store
        .card(card_id)?
        .ok_or_else(|| ApiError::NotFound("card not found".to_string()))?;
    let mut target_column = store
        .column(target_column_id)?
        .ok_or_else(|| ApiError::NotFound("target column not found".to_string()))?;

    if target_column.board != card.board {
        return Err(ApiError::InvalidArgument(
            "target column belongs to a different board".to_string(),
        ));
    }

    let source_column_id = card.column;
    let crossed_columns = source_column_id != *target_column_id;

    if crossed_columns {
        // Both renumberings must run: source closes the gap, target absorbs
        // the insert, and the card's own column/order follow its new home.
        let mut source_column = store
            .column(&source_column_id)?
            .ok_or_else(|| ApiError::NotFound("column not found".to_string()))?;
        source_column.cards.retain(|id| id != card_id);
        store.update_column(&source_column)?;
        renumber_cards(store, &source_column.cards)?;

        let idx = target.min(target_column.cards.len());
        target_column.cards.insert(idx, *card_id);
        store.update_column(&target_column)?;

        card.column = *target_column_id;
        store.update_card(&card)?;
        renumber_cards(store, &target_column.cards)?;
    } else {
        target_column.cards.retain(|id| id != card_id);
        let idx = target.min(target_column.cards.len());
        target_column.cards.insert(idx, *card_id);
        store.update_column(&target_column)?;
        renumber_cards(store, &target_column.cards)?;
    }

    let card = store
        .card(card_id)?
        .ok_or_else(|| ApiError::NotFound("card not found".to_string()))?;
    Ok(CardMove {
        card,
        crossed_columns,
        column_title: target_column.title,
    })
}
