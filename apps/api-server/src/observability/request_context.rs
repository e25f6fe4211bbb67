//! Request context middleware - request IDs and remote addresses.

use actix_web::{
    Error, HttpMessage, HttpRequest,
    dev::{Payload, Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
    http::header::{HeaderName, HeaderValue},
};
use std::future::{Future, Ready, ready};
use std::pin::Pin;
use tracing::Instrument;
use uuid::Uuid;

use crate::middleware::error::AppError;

/// Header name for request ID.
pub static REQUEST_ID_HEADER: &str = "X-Request-ID";

/// Who sent a request and how to correlate its log lines.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub request_id: String,
    pub remote_addr: String,
}

impl RequestContext {
    /// The context stored by [`RequestContextMiddleware`], or a fresh one
    /// when the middleware is not installed.
    pub fn of(req: &HttpRequest) -> Self {
        if let Some(ctx) = req.extensions().get::<RequestContext>() {
            return ctx.clone();
        }
        Self {
            request_id: Uuid::new_v4().to_string(),
            remote_addr: req
                .connection_info()
                .realip_remote_addr()
                .unwrap_or("unknown")
                .to_string(),
        }
    }

    /// Log `err` against this request and hand it back for the response.
    pub fn fail(&self, err: AppError) -> AppError {
        if err.is_server_error() {
            tracing::error!(
                remote_addr = %self.remote_addr,
                request_id = %self.request_id,
                "{}",
                err
            );
        } else {
            tracing::warn!(
                remote_addr = %self.remote_addr,
                request_id = %self.request_id,
                "{}",
                err
            );
        }
        err
    }
}

/// Middleware that attaches a [`RequestContext`] to every request.
/// The request ID is echoed in the response headers and recorded on a span.
pub struct RequestContextMiddleware;

impl<S, B> Transform<S, ServiceRequest> for RequestContextMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = RequestContextService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequestContextService { service }))
    }
}

pub struct RequestContextService<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for RequestContextService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        // Keep an ID assigned upstream (client or load balancer)
        let request_id = req
            .headers()
            .get(REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(String::from)
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        let remote_addr = req
            .connection_info()
            .realip_remote_addr()
            .unwrap_or("unknown")
            .to_string();

        let span = tracing::info_span!(
            "request",
            request_id = %request_id,
            remote_addr = %remote_addr,
        );

        req.extensions_mut().insert(RequestContext {
            request_id: request_id.clone(),
            remote_addr,
        });

        let fut = span.in_scope(|| self.service.call(req));

        Box::pin(
            async move {
                let mut res = fut.await?;

                res.headers_mut().insert(
                    HeaderName::from_static("x-request-id"),
                    HeaderValue::from_str(&request_id)
                        .unwrap_or_else(|_| HeaderValue::from_static("unknown")),
                );

                Ok(res)
            }
            .instrument(span),
        )
    }
}

/// Extractor to get the request context in handlers.
impl actix_web::FromRequest for RequestContext {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(Ok(RequestContext::of(req)))
    }
}

#[cfg(test)]
mod tests {
    use actix_web::{App, HttpResponse, test, web};

    use super::*;

    async fn echo(ctx: RequestContext) -> HttpResponse {
        HttpResponse::Ok().body(ctx.request_id)
    }

    #[actix_web::test]
    async fn generates_and_echoes_request_id() {
        let app = test::init_service(
            App::new()
                .wrap(RequestContextMiddleware)
                .route("/", web::get().to(echo)),
        )
        .await;

        let resp = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;
        let header = resp
            .headers()
            .get("x-request-id")
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        let body = test::read_body(resp).await;

        assert_eq!(body, header.as_bytes());
        assert!(Uuid::parse_str(&header).is_ok());
    }

    #[actix_web::test]
    async fn keeps_upstream_request_id() {
        let app = test::init_service(
            App::new()
                .wrap(RequestContextMiddleware)
                .route("/", web::get().to(echo)),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/")
            .insert_header((REQUEST_ID_HEADER, "abc-123"))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.headers().get("x-request-id").unwrap(), "abc-123");
        assert_eq!(test::read_body(resp).await, "abc-123");
    }
}
