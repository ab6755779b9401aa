//!
//! # Response Envelope
//!
//! Every successful API response uses the same JSON shape:
//!
//! ```json
//! {"success": true, "message": "...", "data": ..., "meta": {...}}
//! ```
//!
//! `data` and `meta` are omitted when not applicable. Error responses carry
//! the counterpart envelope produced by [`crate::error::AppError`].

use actix_web::HttpResponse;
use serde::Serialize;

/// Pagination metadata attached to list responses.
#[derive(Debug, Clone, Serialize)]
pub struct PageMeta {
    pub page: u32,
    pub per_page: u32,
    pub total_pages: u32,
    pub total_items: u64,
}

impl PageMeta {
    pub fn new(page: u32, per_page: u32, total_items: u64) -> Self {
        let total_pages = if total_items == 0 {
            0
        } else {
            ((total_items + per_page as u64 - 1) / per_page as u64) as u32
        };
        Self {
            page,
            per_page,
            total_pages,
            total_items,
        }
    }
}

#[derive(Debug, Serialize)]
struct Envelope<T: Serialize> {
    success: bool,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    meta: Option<PageMeta>,
}

/// 200 OK with a message only.
pub fn ok_message(message: &str) -> HttpResponse {
    HttpResponse::Ok().json(Envelope::<()> {
        success: true,
        message: message.to_string(),
        data: None,
        meta: None,
    })
}

/// 200 OK with a data payload.
pub fn ok<T: Serialize>(message: &str, data: T) -> HttpResponse {
    HttpResponse::Ok().json(Envelope {
        success: true,
        message: message.to_string(),
        data: Some(data),
        meta: None,
    })
}

/// 200 OK for a paginated listing.
pub fn ok_paginated<T: Serialize>(message: &str, data: T, meta: PageMeta) -> HttpResponse {
    HttpResponse::Ok().json(Envelope {
        success: true,
        message: message.to_string(),
        data: Some(data),
        meta: Some(meta),
    })
}

/// 201 Created with the new resource as payload.
pub fn created<T: Serialize>(message: &str, data: T) -> HttpResponse {
    HttpResponse::Created().json(Envelope {
        success: true,
        message: message.to_string(),
        data: Some(data),
        meta: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::MessageBody;

    fn json_of(resp: HttpResponse) -> serde_json::Value {
        let bytes = resp.into_body().try_into_bytes().unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_ok_message_omits_data_and_meta() {
        let body = json_of(ok_message("Logout successful"));
        assert_eq!(body["success"], true);
        assert_eq!(body["message"], "Logout successful");
        assert!(body.get("data").is_none());
        assert!(body.get("meta").is_none());
    }

    #[test]
    fn test_paginated_meta() {
        let meta = PageMeta::new(2, 10, 45);
        assert_eq!(meta.total_pages, 5);

        let body = json_of(ok_paginated("Projects retrieved", vec![1, 2, 3], meta));
        assert_eq!(body["meta"]["page"], 2);
        assert_eq!(body["meta"]["total_pages"], 5);
        assert_eq!(body["data"], serde_json::json!([1, 2, 3]));
    }

    #[test]
    fn test_empty_page_meta() {
        let meta = PageMeta::new(1, 10, 0);
        assert_eq!(meta.total_pages, 0);
        assert_eq!(meta.total_items, 0);
    }
}
