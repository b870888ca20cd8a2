//! Authentication service models

pub mod join;
pub mod user;

pub use join::JoinRequest;
pub use user::{LoginRequest, NewUser, TokenResponse, User, UserResponse};
