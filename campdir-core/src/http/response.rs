use crate::query::{ListResult, Pagination};
use anyhow::Result;
use bytes::Bytes;
use http_body_util::Full;
use serde_json::json;

/// Response of an outbound request made through [`crate::HttpIO`].
#[derive(Clone, Debug, Default)]
pub struct Response<Body: Default + Clone> {
    pub status: reqwest::StatusCode,
    pub headers: reqwest::header::HeaderMap,
    pub body: Body,
}

impl Response<Bytes> {
    pub async fn from_reqwest(resp: reqwest::Response) -> Result<Self> {
        let status = resp.status();
        let headers = resp.headers().to_owned();
        let body = resp.bytes().await?;
        Ok(Response {
            status,
            headers,
            body,
        })
    }

    pub fn empty() -> Self {
        Response {
            status: reqwest::StatusCode::OK,
            headers: reqwest::header::HeaderMap::default(),
            body: Bytes::new(),
        }
    }
}

/// Successful API payload, rendered as the
/// `{"success":true, "count"?, "pagination"?, "data"}` envelope.
#[derive(Debug)]
pub struct ApiOutput {
    pub status: u16,
    pub count: Option<usize>,
    pub pagination: Option<Pagination>,
    pub data: serde_json::Value,
}

impl ApiOutput {
    pub fn ok(data: serde_json::Value) -> Self {
        Self {
            status: 200,
            count: None,
            pagination: None,
            data,
        }
    }

    pub fn created(data: serde_json::Value) -> Self {
        Self {
            status: 201,
            ..Self::ok(data)
        }
    }

    pub fn list(result: ListResult) -> Self {
        Self {
            status: 200,
            count: Some(result.count),
            pagination: Some(result.pagination),
            data: serde_json::Value::Array(result.items),
        }
    }

    /// Child listings report a count but no pagination envelope.
    pub fn counted(items: Vec<serde_json::Value>) -> Self {
        Self {
            status: 200,
            count: Some(items.len()),
            pagination: None,
            data: serde_json::Value::Array(items),
        }
    }

    pub fn into_hyper_response(self) -> Result<hyper::Response<Full<Bytes>>> {
        let mut body = json!({
            "success": true,
            "data": self.data,
        });
        if let Some(count) = self.count {
            body["count"] = json!(count);
        }
        if let Some(pagination) = self.pagination {
            body["pagination"] = serde_json::to_value(pagination)?;
        }
        let response = hyper::Response::builder()
            .status(self.status)
            .header("Content-Type", "application/json")
            .body(Full::new(Bytes::from(body.to_string())))?;
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_json(resp: hyper::Response<Full<Bytes>>) -> serde_json::Value {
        let bytes = resp
            .into_body()
            .frame()
            .await
            .unwrap()
            .unwrap()
            .into_data()
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_ok_envelope() {
        let resp = ApiOutput::ok(json!({"id": "b1"}))
            .into_hyper_response()
            .unwrap();
        assert_eq!(resp.status(), 200);
        let body = body_json(resp).await;
        assert_eq!(body, json!({"success": true, "data": {"id": "b1"}}));
    }

    #[tokio::test]
    async fn test_counted_envelope() {
        let resp = ApiOutput::counted(vec![json!({"id": "c1"})])
            .into_hyper_response()
            .unwrap();
        let body = body_json(resp).await;
        assert_eq!(body["count"], 1);
        assert_eq!(body["success"], true);
        assert!(body.get("pagination").is_none());
    }

    #[tokio::test]
    async fn test_response_empty() {
        let response: Response<Bytes> = Response::empty();
        assert_eq!(response.status, reqwest::StatusCode::OK);
        assert!(response.headers.is_empty());
        assert!(response.body.is_empty());
    }
}
