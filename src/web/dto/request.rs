//! Request DTOs for the HTTP API.

use serde::Deserialize;
use utoipa::ToSchema;

/// Move request body.
#[derive(Debug, Deserialize, ToSchema)]
pub struct MoveRequest {
    /// New logical path.
    pub path: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_move_request_deserialize() {
        let req: MoveRequest = serde_json::from_str(r#"{"path": "/archive"}"#).unwrap();
        assert_eq!(req.path, "/archive");
    }

    #[test]
    fn test_move_request_missing_path() {
        assert!(serde_json::from_str::<MoveRequest>("{}").is_err());
    }
}
