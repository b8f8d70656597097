mod http_gateway;
mod offline_gateway;
mod probe;

pub use http_gateway::HttpGateway;
pub use offline_gateway::OfflineGateway;
pub use probe::{HttpConnectivityProbe, OfflineProbe};
