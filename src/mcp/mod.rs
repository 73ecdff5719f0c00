pub mod session;
pub mod sse;
pub mod transport;
pub mod transport_http;
pub mod transport_sse;
pub mod types;

pub use session::McpSession;
pub use transport::McpTransport;
