use campdir_core::http::response::Response;
use campdir_core::HttpIO;
use hyper::body::Bytes;
use reqwest::{Client, Request};

#[derive(Default, Clone)]
pub struct NativeHttp {
    client: Client,
}

#[async_trait::async_trait]
impl HttpIO for NativeHttp {
    async fn execute(&self, request: Request) -> anyhow::Result<Response<Bytes>> {
        log::info!(
            "{} {} {:?}",
            request.method(),
            request.url(),
            request.version()
        );
        log::debug!("request: {:?}", request);
        let response = self.client.execute(request).await?;
        log::debug!("response: {:?}", response);

        Ok(Response::from_reqwest(response).await?)
    }
}

#[cfg(test)]
mod tests {
    use reqwest::Method;
    use tokio;

    use super::*;

    fn start_mock_server() -> httpmock::MockServer {
        httpmock::MockServer::start()
    }

    #[tokio::test]
    async fn test_native_http_get_request() {
        let server = start_mock_server();

        let mock = server.mock(|when, then| {
            when.method(httpmock::Method::GET).path("/ping");
            then.status(200).body("pong");
        });

        let native_http = NativeHttp::default();
        let request_url = format!("http://localhost:{}/ping", server.port());
        let request = Request::new(Method::GET, request_url.parse().unwrap());

        let result = native_http.execute(request).await;

        assert!(result.is_ok());
        let response = result.unwrap();
        assert_eq!(response.status, reqwest::StatusCode::OK);
        assert_eq!(response.body, Bytes::from("pong"));

        mock.assert();
    }
}
