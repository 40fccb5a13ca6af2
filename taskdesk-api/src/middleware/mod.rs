/// Middleware for the API server
///
/// - `auth`: session token gateway and admin gate
/// - `security`: security response headers

pub mod auth;
pub mod security;
