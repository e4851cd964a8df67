/// Domain services
///
/// The services sit between the HTTP layer and the models. They own the
/// business rules (credential policy, creation atomicity, delete
/// permissions) and return domain errors the API layer maps to responses.
///
/// - [`auth`]: registration, login, token verification and refresh
/// - [`todos`]: board operations and per-user statistics

pub mod auth;
pub mod todos;
