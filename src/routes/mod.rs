/// Router Module Index
///
/// Splits the HTTP surface by access level. The split is what the auth gate attaches
/// to: everything in `authenticated` sits behind `auth_middleware`, so a guarded
/// endpoint cannot be exposed by forgetting an extractor.

/// Routes open to anonymous callers. Handlers may still look at `MaybeUser`, and
/// `POST /news/{id}/` requires an `AuthUser` of its own.
pub mod public;

/// Routes behind the login gate. Anonymous callers are redirected to the login page.
pub mod authenticated;
