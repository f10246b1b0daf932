pub mod config;
pub mod error;
pub mod infra;
pub mod routes;
pub mod shared;
pub mod tunnel;

pub use config::Config;
pub use error::{AppError, DaemonError, TunnelError};
pub use tunnel::{
    execute_request, ProxyRequest, ProxyResponse, TunnelClient, TunnelOptions, TunnelResponse,
    TunnelService, TunnelServiceExt,
};
