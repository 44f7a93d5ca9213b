use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// The envelope every webhook answer uses. Notification senders only care that they got a 200;
/// the body exists for humans poking the endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonResponse {
    pub success: bool,
    pub message: String,
}

impl JsonResponse {
    pub fn success<S: Display>(message: S) -> Self {
        Self { success: true, message: message.to_string() }
    }
}
