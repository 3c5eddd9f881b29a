// handlers/mod.rs - two security tiers
//
// public:    no authentication (/auth/*, /profile/logout)
// protected: bearer JWT required (/foods, /profile)

pub mod protected;
pub mod public;

use axum::extract::FromRequest;
use std::collections::BTreeMap;

use crate::error::ApiError;

/// `axum::Json` with rejections reported through [`ApiError`].
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// Collects the names of required fields that failed their check into one
/// validation error.
#[derive(Debug, Default)]
pub(crate) struct RequiredFields {
    missing: BTreeMap<String, String>,
}

impl RequiredFields {
    pub(crate) fn check(&mut self, field: &str, present: bool) {
        if !present {
            self.missing
                .insert(field.to_string(), "This field is required".to_string());
        }
    }

    pub(crate) fn finish(self, message: &str) -> Result<(), ApiError> {
        if self.missing.is_empty() {
            Ok(())
        } else {
            Err(ApiError::validation_error(message, self.missing))
        }
    }
}

/// Present and non-blank. Used for credentials, where surrounding
/// whitespace is never meaningful.
pub(crate) fn is_filled(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.trim().is_empty())
}

/// Present and non-empty. Whitespace-only strings still count.
pub(crate) fn is_truthy(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.is_empty())
}
