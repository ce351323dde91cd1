/// Router Module Index
///
/// Routing split by access level. Each protected module is wrapped by its own
/// gate layer in `create_router`, so a route's protection follows from the
/// module it is declared in.

/// Routes accessible to everyone, including the login surfaces.
pub mod public;

/// Routes guarded by `require_user`.
pub mod user;

/// Routes guarded by `require_admin`, nested under `/admin`.
pub mod admin;
