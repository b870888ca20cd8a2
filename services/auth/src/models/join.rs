//! Registration request payload

use serde::Deserialize;

/// Body of `POST /join`
///
/// Missing fields default to empty values so that they are reported by
/// validation with their field message instead of failing deserialization.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct JoinRequest {
    pub email: String,
    pub name: String,
    pub password1: String,
    pub password2: String,
    pub terms_accepted: bool,
}
