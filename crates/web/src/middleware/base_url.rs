use std::sync::Arc;

use axum::{
    extract::Request,
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

/// Public address of this server as seen by the client, honouring the
/// `x-forwarded-*` headers of a reverse proxy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseUrl {
    proto: String,
    host: String,
    prefix: String,
}

impl BaseUrl {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let header = |name: &str| {
            headers
                .get(name)
                .and_then(|value| value.to_str().ok())
                .map(str::to_owned)
        };

        Self {
            proto: header("x-forwarded-proto").unwrap_or_else(|| "http".to_owned()),
            host: header("x-forwarded-host")
                .or_else(|| header("host"))
                .unwrap_or_else(|| "localhost".to_owned()),
            prefix: header("x-forwarded-prefix")
                .map(|prefix| prefix.trim_end_matches('/').to_owned())
                .unwrap_or_default(),
        }
    }

    pub fn full_url<S: Into<String>>(&self, path: S) -> String {
        format!("{}://{}{}{}", self.proto, self.host, self.prefix, path.into())
    }
}

pub async fn base_url_middleware(mut req: Request, next: Next) -> Response {
    let base_url = BaseUrl::from_headers(req.headers());
    req.extensions_mut().insert(Arc::new(base_url));
    next.run(req).await
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    #[test]
    fn plain_host() {
        let mut headers = HeaderMap::new();
        headers.insert("host", HeaderValue::from_static("moto.example.sg"));

        assert_eq!(
            BaseUrl::from_headers(&headers).full_url("/api/v1/carparks"),
            "http://moto.example.sg/api/v1/carparks"
        );
    }

    #[test]
    fn forwarded_headers_win() {
        let mut headers = HeaderMap::new();
        headers.insert("host", HeaderValue::from_static("10.0.0.4:8080"));
        headers.insert("x-forwarded-proto", HeaderValue::from_static("https"));
        headers.insert("x-forwarded-host", HeaderValue::from_static("moto.example.sg"));
        headers.insert("x-forwarded-prefix", HeaderValue::from_static("/parking/"));

        assert_eq!(
            BaseUrl::from_headers(&headers).full_url("/api/ping"),
            "https://moto.example.sg/parking/api/ping"
        );
    }
}
