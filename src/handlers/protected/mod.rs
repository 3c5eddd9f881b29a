// handlers/protected - routes that sit behind jwt_auth_middleware.
// Handlers read the caller as `Extension<AuthUser>` and scope every store
// call by that id.

pub mod foods;
pub mod profile;
