use std::sync::Arc;

use bytes::Bytes;
use http_body_util::Full;
use hyper::header::{HeaderValue, ALLOW, CONTENT_TYPE};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response, StatusCode};
use serde_json::json;
use tracing::{debug, error};
use uuid::Uuid;

use crate::compiler::ConfigCompiler;
use crate::logging::{log_request, RequestLog};
use crate::store::ResourceStore;
use super::Error;

pub const TRAEFIK_CONFIG_PATH: &str = "/api/v1/traefik-config";

const REQUEST_ID_HEADER: &str = "x-request-id";

pub struct RequestHandler {
    compiler: Arc<ConfigCompiler>,
    store: Arc<dyn ResourceStore>,
}

impl RequestHandler {
    pub fn new(compiler: Arc<ConfigCompiler>, store: Arc<dyn ResourceStore>) -> Self {
        Self { compiler, store }
    }

    pub async fn handle_request<B>(
        &self,
        req: Request<B>,
    ) -> Result<Response<Full<Bytes>>, std::convert::Infallible> {
        let mut log = RequestLog::new(Uuid::new_v4().to_string());
        log.with_request(&req);

        let mut response = if req.uri().path() != TRAEFIK_CONFIG_PATH {
            json_error(StatusCode::NOT_FOUND, "not found")
        } else if req.method() != Method::GET {
            let mut response = json_error(StatusCode::METHOD_NOT_ALLOWED, "method not allowed");
            response.headers_mut().insert(ALLOW, HeaderValue::from_static("GET"));
            response
        } else {
            match self.render_config().await {
                Ok(body) => json_response(StatusCode::OK, body),
                Err(e) => {
                    error!(request_id = %log.request_id, error = %e, "동적 설정 생성 실패");
                    log.with_error(&e);
                    json_error(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string())
                }
            }
        };

        if let Ok(value) = HeaderValue::from_str(&log.request_id) {
            response.headers_mut().insert(REQUEST_ID_HEADER, value);
        }

        log.with_response(response.status());
        log_request(&log);
        Ok(response)
    }

    async fn render_config(&self) -> Result<String, Error> {
        let config = self.compiler.compile(self.store.as_ref()).await?;
        let body = config.to_json()?;
        debug!(bytes = body.len(), "동적 설정 직렬화 완료");
        Ok(body)
    }

    pub async fn handle_connection<I>(&self, io: I) -> Result<(), hyper::Error>
    where
        I: hyper::rt::Read + hyper::rt::Write + Send + Unpin + 'static,
    {
        http1::Builder::new()
            .serve_connection(io, service_fn(|req| self.handle_request(req)))
            .await
    }
}

fn json_response(status: StatusCode, body: String) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(Bytes::from(body)));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    response
}

fn json_error(status: StatusCode, message: &str) -> Response<Full<Bytes>> {
    json_response(status, json!({ "error": message }).to_string())
}
