pub mod bookingdtos;
pub mod communitydtos;
pub mod userdtos;
pub mod walletdtos;

use serde::{Deserialize, Serialize};
use validator::Validate;

pub use userdtos::*;

pub const DEFAULT_PAGE_SIZE: u32 = 20;

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub message: String,
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn success(message: &str, data: T) -> Self {
        Self {
            success: true,
            message: message.to_string(),
            data,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PaginatedResponse<T> {
    pub success: bool,
    pub data: Vec<T>,
    pub page: u32,
    pub limit: u32,
    pub total: Option<i64>,
}

impl<T> PaginatedResponse<T> {
    pub fn new(data: Vec<T>, query: &RequestQueryDto, total: Option<i64>) -> Self {
        Self {
            success: true,
            data,
            page: query.page(),
            limit: query.limit(),
            total,
        }
    }
}

#[derive(Debug, Default, Clone, Serialize, Deserialize, Validate)]
pub struct RequestQueryDto {
    #[validate(range(min = 1))]
    pub page: Option<u32>,
    #[validate(range(min = 1, max = 100))]
    pub limit: Option<u32>,
}

impl RequestQueryDto {
    pub fn page(&self) -> u32 {
        self.page.unwrap_or(1).max(1)
    }

    pub fn limit(&self) -> u32 {
        self.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, 100)
    }

    /// (limit, offset) ready to bind.
    pub fn bounds(&self) -> (i64, i64) {
        let limit = self.limit();
        (limit as i64, crate::db::db::page_offset(self.page(), limit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_defaults() {
        let q = RequestQueryDto::default();
        assert_eq!(q.bounds(), (20, 0));

        let q = RequestQueryDto { page: Some(3), limit: Some(10) };
        assert_eq!(q.bounds(), (10, 20));
        assert!(q.validate().is_ok());

        let q = RequestQueryDto { page: Some(0), limit: Some(500) };
        assert!(q.validate().is_err());
    }

    #[test]
    fn envelope_shape() {
        let value = serde_json::to_value(ApiResponse::success("ok", 5)).unwrap();
        assert_eq!(value["success"], true);
        assert_eq!(value["data"], 5);
    }
}
