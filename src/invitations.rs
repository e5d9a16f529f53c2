//! Invitation workflow: pending -> accepted | rejected, terminal once
//! resolved. Accepting is the only path that adds a collaborator to a board.

use chrono::Utc;
use uuid::Uuid;

use crate::authz::{self, Requester};
use crate::error::{ApiError, ApiResult};
use crate::models::{Invitation, InvitationStatus, User};
use crate::storage::Store;

/// Create a pending invitation. The requester must belong to the board, the
/// recipient must exist and must not already be a collaborator (the owner
/// counts, so self-invites from the owner fall out of the same check), and
/// no other pending invitation may exist for the same (recipient, board).
///
/// Returns the invitation and the recipient so the caller can fire the
/// notification hook.
pub fn send(
    store: &Store,
    requester: &Requester,
    to_user_id: &Uuid,
    board_id: &Uuid,
) -> ApiResult<(Invitation, User)> {
    let board = store
        .board(board_id)?
        .ok_or_else(|| ApiError::NotFound("board not found".to_string()))?;
    authz::ensure_member(&board, &requester.id)?;

    let mut to_user = store
        .user(to_user_id)?
        .ok_or_else(|| ApiError::NotFound("user not found".to_string()))?;

    if authz::is_member(&board, to_user_id) {
        return Err(ApiError::Conflict(
            "user is already a collaborator on this board".to_string(),
        ));
    }

    if store.pending_invitation(to_user_id, board_id)?.is_some() {
        return Err(ApiError::Conflict(
            "an invitation is already pending for this user".to_string(),
        ));
    }

    let invitation = Invitation {
        id: Uuid::now_v7(),
        from: requester.id,
        to: *to_user_id,
        board: *board_id,
        status: InvitationStatus::Pending,
        created_at: Utc::now(),
    };
    store.create_invitation(&invitation)?;

    to_user.invitations.push(invitation.id);
    store.update_user(&to_user)?;

    Ok((invitation, to_user))
}

/// Accept a pending invitation: add the recipient to the board's
/// collaborators and the board to the recipient's boards, then mark
/// accepted. Only the recipient may accept; a resolved invitation cannot be
/// responded to again.
pub fn accept(store: &Store, requester_id: &Uuid, invitation_id: &Uuid) -> ApiResult<Invitation> {
    let mut invitation = require_pending_for(store, requester_id, invitation_id)?;

    let mut board = store
        .board(&invitation.board)?
        .ok_or_else(|| ApiError::NotFound("board not found".to_string()))?;
    if !board.collaborators.contains(requester_id) {
        board.collaborators.push(*requester_id);
        store.update_board(&board)?;
    }

    let mut user = store
        .user(requester_id)?
        .ok_or_else(|| ApiError::NotFound("user not found".to_string()))?;
    if !user.boards.contains(&invitation.board) {
        user.boards.push(invitation.board);
        store.update_user(&user)?;
    }

    invitation.status = InvitationStatus::Accepted;
    store.update_invitation(&invitation)?;
    Ok(invitation)
}

/// Reject a pending invitation. No side effect beyond the status change.
pub fn reject(store: &Store, requester_id: &Uuid, invitation_id: &Uuid) -> ApiResult<Invitation> {
    let mut invitation = require_pending_for(store, requester_id, invitation_id)?;
    invitation.status = InvitationStatus::Rejected;
    store.update_invitation(&invitation)?;
    Ok(invitation)
}

pub fn list_for_user(store: &Store, user_id: &Uuid) -> ApiResult<Vec<Invitation>> {
    store.invitations_to_user(user_id)
}

fn require_pending_for(
    store: &Store,
    requester_id: &Uuid,
    invitation_id: &Uuid,
) -> ApiResult<Invitation> {
    let invitation = store
        .invitation(invitation_id)?
        .ok_or_else(|| ApiError::NotFound("invitation not found".to_string()))?;

    if invitation.to != *requester_id {
        return Err(ApiError::Unauthorized(
            "this invitation is not addressed to you".to_string(),
        ));
    }
    if invitation.status != InvitationStatus::Pending {
        return Err(ApiError::InvalidState(
            "invitation already responded to".to_string(),
        ));
    }
    Ok(invitation)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Board, BoardCategory};
    use std::fs;

    fn test_store(name: &str) -> Store {
        let temp_dir = std::env::temp_dir().join(name);
        let _ = fs::remove_dir_all(&temp_dir);
        Store::open(temp_dir.to_str().unwrap()).expect("failed to open store")
    }

    fn make_user(store: &Store, name: &str, email: &str) -> User {
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
        user
    }

    fn make_board(store: &Store, owner: &mut User) -> Board {
        let board = Board {
            id: Uuid::now_v7(),
            title: "b".to_string(),
            description: "d".to_string(),
            category: BoardCategory::Other,
            owner: owner.id,
            collaborators: vec![owner.id],
            columns: vec![],
            created_at: Utc::now(),
        };
        store.create_board(&board).unwrap();
        owner.boards.push(board.id);
        store.update_user(owner).unwrap();
        board
    }

    fn requester(user: &User) -> Requester {
        Requester {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
        }
    }

    #[test]
    fn accept_adds_collaborator_exactly_once() {
        let store = test_store("taskboard_test_invite_accept");
        let mut owner = make_user(&store, "Owner", "owner-accept@example.com");
        let invitee = make_user(&store, "Invitee", "invitee-accept@example.com");
        let board = make_board(&store, &mut owner);

        let (invitation, _) = send(&store, &requester(&owner), &invitee.id, &board.id).unwrap();
        let accepted = accept(&store, &invitee.id, &invitation.id).unwrap();
        assert_eq!(accepted.status, InvitationStatus::Accepted);

        let board = store.board(&board.id).unwrap().unwrap();
        assert_eq!(
            board.collaborators.iter().filter(|id| **id == invitee.id).count(),
            1
        );
        let invitee = store.user(&invitee.id).unwrap().unwrap();
        assert!(invitee.boards.contains(&board.id));

        // Double-accept is terminal
        let err = accept(&store, &invitee.id, &invitation.id).unwrap_err();
        assert!(matches!(err, ApiError::InvalidState(_)));
    }

    #[test]
    fn inviting_existing_collaborator_conflicts_without_a_record() {
        let store = test_store("taskboard_test_invite_collab");
        let mut owner = make_user(&store, "Owner", "owner-collab@example.com");
        let invitee = make_user(&store, "Invitee", "invitee-collab@example.com");
        let board = make_board(&store, &mut owner);

        let (invitation, _) = send(&store, &requester(&owner), &invitee.id, &board.id).unwrap();
        accept(&store, &invitee.id, &invitation.id).unwrap();

        let err = send(&store, &requester(&owner), &invitee.id, &board.id).unwrap_err();
        assert!(matches!(err, ApiError::Conflict(_)));
        // Only the original invitation exists
        assert_eq!(store.invitations_to_user(&invitee.id).unwrap().len(), 1);
    }

    #[test]
    fn inviting_the_owner_conflicts() {
        let store = test_store("taskboard_test_invite_owner");
        let mut owner = make_user(&store, "Owner", "owner-self@example.com");
        let board = make_board(&store, &mut owner);

        let err = send(&store, &requester(&owner), &owner.id, &board.id).unwrap_err();
        assert!(matches!(err, ApiError::Conflict(_)));
    }

    #[test]
    fn duplicate_pending_invitation_conflicts() {
        let store = test_store("taskboard_test_invite_dup");
        let mut owner = make_user(&store, "Owner", "owner-dup@example.com");
        let collaborator = make_user(&store, "Collab", "collab-dup@example.com");
        let invitee = make_user(&store, "Invitee", "invitee-dup@example.com");
        let mut board = make_board(&store, &mut owner);

        // A second member, to prove the (to, board) pair is what is unique,
        // not the sender
        board.collaborators.push(collaborator.id);
        store.update_board(&board).unwrap();

        send(&store, &requester(&owner), &invitee.id, &board.id).unwrap();
        let err = send(&store, &requester(&collaborator), &invitee.id, &board.id).unwrap_err();
        assert!(matches!(err, ApiError::Conflict(_)));
    }

    #[test]
    fn only_the_recipient_may_respond() {
        let store = test_store("taskboard_test_invite_wrong_user");
        let mut owner = make_user(&store, "Owner", "owner-wrong@example.com");
        let invitee = make_user(&store, "Invitee", "invitee-wrong@example.com");
        let stranger = make_user(&store, "Stranger", "stranger-wrong@example.com");
        let board = make_board(&store, &mut owner);

        let (invitation, _) = send(&store, &requester(&owner), &invitee.id, &board.id).unwrap();
        let err = accept(&store, &stranger.id, &invitation.id).unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized(_)));
    }

    #[test]
    fn reject_is_terminal_and_side_effect_free() {
        let store = test_store("taskboard_test_invite_reject");
        let mut owner = make_user(&store, "Owner", "owner-reject@example.com");
        let invitee = make_user(&store, "Invitee", "invitee-reject@example.com");
        let board = make_board(&store, &mut owner);

        let (invitation, _) = send(&store, &requester(&owner), &invitee.id, &board.id).unwrap();
        let rejected = reject(&store, &invitee.id, &invitation.id).unwrap();
        assert_eq!(rejected.status, InvitationStatus::Rejected);

        let board = store.board(&board.id).unwrap().unwrap();
        assert!(!board.collaborators.contains(&invitee.id));

        let err = reject(&store, &invitee.id, &invitation.id).unwrap_err();
        assert!(matches!(err, ApiError::InvalidState(_)));

        // A rejected invitation no longer blocks a fresh one
        assert!(send(&store, &requester(&owner), &invitee.id, &board.id).is_ok());
    }

    #[test]
    fn non_member_cannot_invite() {
        let store = test_store("taskboard_test_invite_outsider");
        let mut owner = make_user(&store, "Owner", "owner-outsider@example.com");
        let outsider = make_user(&store, "Outsider", "outsider@example.com");
        let invitee = make_user(&store, "Invitee", "invitee-outsider@example.com");
        let board = make_board(&store, &mut owner);

        let err = send(&store, &requester(&outsider), &invitee.id, &board.id).unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized(_)));
    }
}
