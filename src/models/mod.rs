pub mod appointment;
pub mod auth;
pub mod enums;
pub mod user;

pub use appointment::Appointment;
pub use auth::{LoginRequest, LoginResponse};
pub use enums::{ChartKind, InvalidCode, Rating};
pub use user::User;

/// A backend collection only ever used for its length.
pub type Records = Vec<serde_json::Value>;
