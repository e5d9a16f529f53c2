//! Activity recorder: one immutable feed entry per observable mutation.

use uuid::Uuid;

use crate::error::ApiResult;
use crate::models::{Activity, User};
use crate::storage::Store;

/// How many entries the cross-board recent feed returns.
pub const RECENT_LIMIT: usize = 5;

pub fn record(store: &Store, activity: Activity) -> ApiResult<()> {
    store.append_activity(&activity)
}

/// The most recent activities across every board the user belongs to,
/// newest first, capped at [`RECENT_LIMIT`].
pub fn recent_for_user(store: &Store, user: &User) -> ApiResult<Vec<Activity>> {
    let mut activities: Vec<Activity> = store
        .activities()?
        .into_iter()
        .filter(|a| user.boards.contains(&a.board))
        .collect();
    activities.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    activities.truncate(RECENT_LIMIT);
    Ok(activities)
}

/// Every activity scoped to one board, oldest first. The caller enforces
/// that the requester owns the board.
pub fn for_board(store: &Store, board_id: &Uuid) -> ApiResult<Vec<Activity>> {
    let mut activities = store.activities_for_board(board_id)?;
    activities.sort_by(|a, b| a.created_at.cmp(&b.created_at));
    Ok(activities)
}
