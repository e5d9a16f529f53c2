//! taskboard: multi-tenant kanban-board backend in Rust
//!
//! Users own boards, boards hold ordered columns, columns hold ordered
//! cards; cards carry comments, assignees, labels and due dates. Mutations
//! flow auth guard -> ordering/cascade engine -> entity store, and every
//! observable change lands in the activity feed. Collaboration is gated by
//! an invitation workflow.
//!
//! This lib exposes the entity store and the core engines; the REST layer
//! in `rest` is the outermost shell.

pub mod activity;
pub mod auth;
pub mod authz;
pub mod cascade;
pub mod error;
pub mod invitations;
pub mod models;
pub mod notify;
// Ordering engine: dense 0..N-1 positions for columns-in-board and
// cards-in-column
pub mod ordering;
// REST API module: Axum router and handlers over the core
pub mod rest;
pub mod storage;
