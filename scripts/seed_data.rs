//! Seed script for the taskboard backend
//!
//! Populates the store with a demo user and a small board so the server has
//! something to show right away:
//! - owner demo@taskboard.dev (password "demo-password")
//! - one board with Todo / Doing / Done columns and a handful of cards
//! Run: cargo run --bin seed_data

use chrono::Utc;
use uuid::Uuid;

use taskboard::activity;
use taskboard::auth::hash_password;
use taskboard::models::{
    Activity, ActivityKind, Board, BoardCategory, Card, Column, Comment, User,
};
use taskboard::ordering;
use taskboard::storage::Store;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let data_path =
        std::env::var("TASKBOARD_DATA").unwrap_or_else(|_| "taskboard_data".to_string());
    let store = Store::open(&data_path)?;

    if store.user_by_email("demo@taskboard.dev")?.is_some() {
        println!("Demo user already present, nothing to do.");
        return Ok(());
    }

    let mut owner = User {
        id: Uuid::now_v7(),
        name: "Demo User".to_string(),
        email: "demo@taskboard.dev".to_string(),
        password_hash: hash_password("demo-password")?,
        boards: vec![],
        avatar: None,
        role: None,
        invitations: vec![],
        device_token: None,
        created_at: Utc::now(),
    };
    store.create_user(&owner)?;

    let mut board = Board {
        id: Uuid::now_v7(),
        title: "Getting started".to_string(),
        description: "A demo board seeded at install time".to_string(),
        category: BoardCategory::Personal,
        owner: owner.id,
        collaborators: vec![owner.id],
        columns: vec![],
        created_at: Utc::now(),
    };
    store.create_board(&board)?;
    owner.boards.push(board.id);
    store.update_user(&owner)?;

    let card_titles = [
        ("Todo", vec!["Invite your team", "Create your first card"]),
        ("Doing", vec!["Explore the demo board"]),
        ("Done", vec!["Sign up"]),
    ];

    let mut first_card = None;
    for (column_title, cards) in card_titles {
        let mut column = Column {
            id: Uuid::now_v7(),
            title: column_title.to_string(),
            board: board.id,
            order: ordering::next_column_order(&store, &board.id)?,
            cards: vec![],
            created_at: Utc::now(),
        };
        store.create_column(&column)?;
        board.columns.push(column.id);
        store.update_board(&board)?;

        for card_title in cards {
            let card = Card {
                id: Uuid::now_v7(),
                title: card_title.to_string(),
                description: String::new(),
                column: column.id,
                board: board.id,
                order: ordering::next_card_order(&store, &column.id)?,
                assigned_to: vec![owner.id],
                due_date: None,
                labels: vec!["demo".to_string()],
                comments: vec![],
                created_at: Utc::now(),
            };
            store.create_card(&card)?;
            column.cards.push(card.id);
            store.update_column(&column)?;
            first_card.get_or_insert(card);
        }
    }

    if let Some(mut card) = first_card {
        let comment = Comment {
            id: Uuid::now_v7(),
            card: card.id,
            author: owner.id,
            text: "Welcome aboard!".to_string(),
            created_at: Utc::now(),
        };
        store.create_comment(&comment)?;
        card.comments.push(comment.id);
        store.update_card(&card)?;
    }

    activity::record(
        &store,
        Activity::new(
            ActivityKind::BoardCreated,
            owner.id,
            board.id,
            format!("{} created the board \"{}\".", owner.name, board.title),
        ),
    )?;

    println!("Seeded demo board '{}' for demo@taskboard.dev", board.title);
    Ok(())
}
