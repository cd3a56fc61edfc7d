pub mod client;
pub mod interceptor;
pub mod navigator;
pub mod request;

pub use client::ApiGatewayClient;
pub use interceptor::{
    normalize_path, ApiPrefix, BearerAuth, InterceptorChain, RequestInterceptor,
    ResponseInterceptor, SessionExpiry,
};
pub use navigator::{Navigator, RecordingNavigator, TerminalNavigator};
pub use request::{GatewayRequest, GatewayResponse};
