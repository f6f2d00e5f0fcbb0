/// API route handlers
///
/// This module contains all route handlers organized by resource:
///
/// - `health`: Health check endpoint
/// - `lists`: Task list CRUD and sharing
/// - `tasks`: Task CRUD, completion toggle, and filtered listing
/// - `categories`: Category CRUD and visibility
/// - `feed`: Home-view calendar feed

pub mod categories;
pub mod feed;
pub mod health;
pub mod lists;
pub mod tasks;
