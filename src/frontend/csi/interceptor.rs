//! Request instrumentation
//!
//! Every inbound CSI call passes through [`RequestInterceptor`], either
//! directly or via the [`RequestInterceptorLayer`] tower middleware. The
//! interceptor tags the call with a fresh correlation id, logs the method,
//! request and outcome, and hands back exactly what the handler returned.

use std::fmt::{Debug, Display};
use std::future::Future;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures::future::BoxFuture;
use tower::{Layer, Service};

use crate::context::{CallContext, ContextSource};
use crate::logging::RequestLogger;

// =============================================================================
// Interceptor
// =============================================================================

/// Logging pass-through wrapped around every CSI handler
#[derive(Clone)]
pub struct RequestInterceptor {
    logger: Arc<dyn RequestLogger>,
}

impl RequestInterceptor {
    pub fn new(logger: Arc<dyn RequestLogger>) -> Self {
        Self { logger }
    }

    /// Run `handler` for one call.
    ///
    /// The handler receives a context derived from `ctx` carrying a new
    /// request id and the CSI source tag; deadline and cancellation are
    /// inherited. The handler's result is returned untouched.
    pub async fn intercept<Req, Resp, E, F, Fut>(
        &self,
        ctx: &CallContext,
        method: &str,
        request: Req,
        handler: F,
    ) -> Result<Resp, E>
    where
        Req: Debug,
        Resp: Debug,
        E: Display,
        F: FnOnce(CallContext, Req) -> Fut,
        Fut: Future<Output = Result<Resp, E>>,
    {
        let ctx = ctx.derive_for_request(self.logger.new_request_id(), ContextSource::Csi);
        self.logger.debug(&ctx, format_args!("GRPC call: {}", method));
        self.logger.debug(&ctx, format_args!("GRPC request: {:?}", request));

        let result = handler(ctx.clone(), request).await;

        match &result {
            Ok(response) => self
                .logger
                .debug(&ctx, format_args!("GRPC response: {:?}", response)),
            Err(e) => self.logger.error(&ctx, format_args!("GRPC error: {}", e)),
        }

        result
    }
}

// =============================================================================
// Tower Middleware
// =============================================================================

/// A single CSI call as seen by tower services
#[derive(Debug, Clone)]
pub struct RpcCall<Req> {
    /// Fully-qualified gRPC method, e.g. `/csi.v1.Node/NodeGetCapabilities`
    pub method: String,
    pub context: CallContext,
    pub request: Req,
}

impl<Req> RpcCall<Req> {
    pub fn new(method: impl Into<String>, context: CallContext, request: Req) -> Self {
        Self {
            method: method.into(),
            context,
            request,
        }
    }
}

/// Tower layer applying [`RequestInterceptor`] to every call
#[derive(Clone)]
pub struct RequestInterceptorLayer {
    interceptor: RequestInterceptor,
}

impl RequestInterceptorLayer {
    pub fn new(interceptor: RequestInterceptor) -> Self {
        Self { interceptor }
    }
}

impl<S> Layer<S> for RequestInterceptorLayer {
    type Service = InterceptedService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        InterceptedService {
            inner,
            interceptor: self.interceptor.clone(),
        }
    }
}

/// Service produced by [`RequestInterceptorLayer`]
#[derive(Clone)]
pub struct InterceptedService<S> {
    inner: S,
    interceptor: RequestInterceptor,
}

impl<S, Req> Service<RpcCall<Req>> for InterceptedService<S>
where
    S: Service<RpcCall<Req>> + Clone + Send + 'static,
    S::Future: Send,
    S::Response: Debug + Send,
    S::Error: Display + Send,
    Req: Debug + Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = BoxFuture<'static, Result<S::Response, S::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, call: RpcCall<Req>) -> Self::Future {
        // the clone is not ready; keep the driven instance for this call
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);
        let interceptor = self.interceptor.clone();

        Box::pin(async move {
            let RpcCall {
                method,
                context,
                request,
            } = call;

            interceptor
                .intercept(&context, &method, request, |ctx, request| {
                    inner.call(RpcCall::new(method.clone(), ctx, request))
                })
                .await
        })
    }
}
