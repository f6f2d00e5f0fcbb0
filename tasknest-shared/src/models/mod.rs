/// Database models for TaskNest
///
/// This module contains all database models and their CRUD operations.
///
/// # Models
///
/// - `user`: User accounts (provisioned by the identity service)
/// - `task_list`: Task lists with ownership and share grants
/// - `category`: User-owned labels optionally attached to tasks
/// - `task`: Tasks within a list, with assignees, priority, and deadline

pub mod category;
pub mod task;
pub mod task_list;
pub mod user;
