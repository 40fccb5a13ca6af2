/// API route handlers
///
/// - `health`: Health check endpoint
/// - `auth`: Registration, login and token verification
/// - `tasks`: The caller's own tasks
/// - `admin`: User and task administration

pub mod admin;
pub mod auth;
pub mod health;
pub mod tasks;
