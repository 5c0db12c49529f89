//! Rate limiting middleware.

use std::future::{Future, Ready, ready};
use std::pin::Pin;
use std::rc::Rc;
use std::sync::Arc;

use actix_web::{
    Error, HttpResponse,
    body::EitherBody,
    dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
};

use quill_core::ports::RateLimiter;
use quill_shared::ErrorResponse;

/// Rate limiting middleware factory. Without a limiter every request passes.
///
/// Clients are keyed by socket peer address. Forwarding headers are only
/// honored once `trust_proxy` is set, since any client can send them.
pub struct RateLimitMiddleware {
    limiter: Option<Arc<dyn RateLimiter>>,
    trust_proxy: bool,
}

impl RateLimitMiddleware {
    pub fn new(limiter: Option<Arc<dyn RateLimiter>>) -> Self {
        Self {
            limiter,
            trust_proxy: false,
        }
    }

    pub fn trust_proxy(mut self, trust_proxy: bool) -> Self {
        self.trust_proxy = trust_proxy;
        self
    }
}

fn client_key(req: &ServiceRequest, trust_proxy: bool) -> String {
    if trust_proxy {
        if let Some(addr) = req.connection_info().realip_remote_addr() {
            return addr.to_string();
        }
    }
    req.peer_addr()
        .map(|addr| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

impl<S, B> Transform<S, ServiceRequest> for RateLimitMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = RateLimitMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RateLimitMiddlewareService {
            service: Rc::new(service),
            limiter: self.limiter.clone(),
            trust_proxy: self.trust_proxy,
        }))
    }
}

pub struct RateLimitMiddlewareService<S> {
    service: Rc<S>,
    limiter: Option<Arc<dyn RateLimiter>>,
    trust_proxy: bool,
}

impl<S, B> Service<ServiceRequest> for RateLimitMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();
        let Some(limiter) = self.limiter.clone() else {
            return Box::pin(async move { Ok(service.call(req).await?.map_into_left_body()) });
        };

        let key = client_key(&req, self.trust_proxy);

        Box::pin(async move {
            match limiter.check(&key).await {
                Ok(result) if !result.allowed => {
                    let retry_after = result.retry_after.as_secs().max(1);
                    tracing::warn!(client = %key, retry_after, "Rate limit exceeded");

                    let error = ErrorResponse::new(429, "Too Many Requests").with_detail(format!(
                        "Rate limit exceeded. Try again in {retry_after} seconds."
                    ));
                    let response = HttpResponse::TooManyRequests()
                        .insert_header(("Retry-After", retry_after.to_string()))
                        .json(error);

                    let (http_req, _payload) = req.into_parts();
                    Ok(ServiceResponse::new(http_req, response).map_into_right_body())
                }
                Ok(_) => Ok(service.call(req).await?.map_into_left_body()),
                Err(e) => {
                    tracing::error!(error = %e, "Rate limiter error, failing open");
                    Ok(service.call(req).await?.map_into_left_body())
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use actix_web::test::TestRequest;

    use super::*;

    fn forwarded_request() -> ServiceRequest {
        TestRequest::default()
            .peer_addr("10.0.0.7:40000".parse().unwrap())
            .insert_header(("X-Forwarded-For", "203.0.113.9"))
            .to_srv_request()
    }

    #[test]
    fn test_key_ignores_forwarding_headers_by_default() {
        assert_eq!(client_key(&forwarded_request(), false), "10.0.0.7");
    }

    #[test]
    fn test_key_uses_forwarded_address_behind_trusted_proxy() {
        assert_eq!(client_key(&forwarded_request(), true), "203.0.113.9");
    }

    #[test]
    fn test_key_without_peer_address() {
        let req = TestRequest::default().to_srv_request();
        assert_eq!(client_key(&req, false), "unknown");
    }
}
