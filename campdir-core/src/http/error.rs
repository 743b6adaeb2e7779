use bytes::Bytes;
use http_body_util::Full;
use serde_json::json;
use thiserror::Error;

pub type ApiResult<T> = Result<T, ApiError>;

/// Request-level failure carrying its HTTP status. The router renders
/// every variant as the `{"success":false,"error":...}` envelope, which
/// is the whole of error normalization.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Server Error")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn status(&self) -> u16 {
        match self {
            ApiError::BadRequest(_) => 400,
            ApiError::Unauthorized(_) => 401,
            ApiError::Forbidden(_) => 403,
            ApiError::NotFound(_) => 404,
            ApiError::Internal(_) => 500,
        }
    }

    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::NotFound(format!("{} with id {} not found", resource, id))
    }

    pub fn into_hyper_response(self) -> anyhow::Result<hyper::Response<Full<Bytes>>> {
        if let ApiError::Internal(err) = &self {
            log::error!("internal error: {:?}", err);
        }
        let body = json!({
            "success": false,
            "error": self.to_string(),
        });
        let response = hyper::Response::builder()
            .status(self.status())
            .header("Content-Type", "application/json")
            .body(Full::new(Bytes::from(body.to_string())))?;
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ApiError::BadRequest("x".into()).status(), 400);
        assert_eq!(ApiError::Unauthorized("x".into()).status(), 401);
        assert_eq!(ApiError::Forbidden("x".into()).status(), 403);
        assert_eq!(ApiError::not_found("Bootcamp", "b1").status(), 404);
        assert_eq!(ApiError::Internal(anyhow::anyhow!("boom")).status(), 500);
    }

    #[test]
    fn test_internal_error_is_opaque() {
        let err = ApiError::Internal(anyhow::anyhow!("connection refused"));
        assert_eq!(err.to_string(), "Server Error");
    }

    #[test]
    fn test_not_found_message() {
        let err = ApiError::not_found("Bootcamp", "b1");
        assert_eq!(err.to_string(), "Bootcamp with id b1 not found");
    }
}
