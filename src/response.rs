use serde::Serialize;

/// Success envelope used by the user endpoints.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub status: &'static str,
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<PaginationMeta>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            status: "success",
            data,
            meta: None,
        }
    }

    pub fn with_meta(data: T, meta: PaginationMeta) -> Self {
        Self {
            status: "success",
            data,
            meta: Some(meta),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PaginationMeta {
    pub page: i64,
    pub size: i64,
    pub total: i64,
    pub total_pages: i64,
}

impl PaginationMeta {
    pub fn new(page: i64, size: i64, total: i64) -> Self {
        let total_pages = if size > 0 { (total + size - 1) / size } else { 0 };
        Self {
            page,
            size,
            total,
            total_pages,
        }
    }
}

/// Plain `{ "message": ... }` body used by the auth and role endpoints.
#[derive(Debug, Serialize)]
pub struct Message {
    pub message: &'static str,
}
