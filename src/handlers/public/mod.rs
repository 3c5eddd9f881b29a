// handlers/public - no authentication required.
// Token acquisition lives here; handlers must validate every input themselves.

pub mod auth;
