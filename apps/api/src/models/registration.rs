use serde::{Deserialize, Serialize};

/// Payload posted by the sign-up form to announce a new registration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Registration {
    pub email: String,
    pub name: String,
    pub city: String,
}
