/// Authentication and authorization utilities
///
/// - `session`: validation of session tokens minted by the identity service
/// - `middleware`: request auth context and bearer-token extraction
/// - `access`: the access policy for task lists, tasks, and categories

pub mod access;
pub mod middleware;
pub mod session;
