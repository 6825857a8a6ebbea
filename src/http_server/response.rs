//! # Response Formatting
//!
//! Response bodies for catalog endpoints that do not return walks directly.

use serde::Serialize;

/// Count-only response
#[derive(Debug, Clone, Serialize)]
pub struct CountResponse {
    pub count: u64,
}

impl CountResponse {
    pub fn new(count: u64) -> Self {
        Self { count }
    }
}

/// Bulk rename response
#[derive(Debug, Clone, Serialize)]
pub struct RenameResponse {
    pub message: String,
    pub modified: u64,
}

impl RenameResponse {
    pub fn new(modified: u64) -> Self {
        Self {
            message: format!("{} walk(s) renamed", modified),
            modified,
        }
    }
}

/// Delete response
#[derive(Debug, Clone, Serialize)]
pub struct DeleteResponse {
    pub message: String,
    pub deleted: String,
}

impl DeleteResponse {
    pub fn new(id: impl ToString) -> Self {
        let deleted = id.to_string();
        Self {
            message: format!("walk {} deleted", deleted),
            deleted,
        }
    }
}

/// Health check response
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
}

impl HealthResponse {
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            service: env!("CARGO_PKG_NAME").to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rename_response_serialization() {
        let json = serde_json::to_value(RenameResponse::new(3)).unwrap();
        assert_eq!(json["modified"], 3);
        assert_eq!(json["message"], "3 walk(s) renamed");
    }

    #[test]
    fn test_delete_response_carries_id() {
        let json = serde_json::to_value(DeleteResponse::new("65a1f0c2e4b0a1b2c3d4e5f6")).unwrap();
        assert_eq!(json["deleted"], "65a1f0c2e4b0a1b2c3d4e5f6");
    }

    #[test]
    fn test_health_response() {
        let json = serde_json::to_value(HealthResponse::ok()).unwrap();
        assert_eq!(json["status"], "ok");
        assert_eq!(json["service"], "walkdb");
    }
}
