pub mod exchange;
pub mod executor;
pub mod handshake;
pub mod parser;
pub mod response_builder;
pub mod service;
pub mod types;
pub mod writer;

pub use exchange::{Event, ExchangeState};
pub use executor::{run_exchange, TunnelOptions};
pub use parser::parse_response;
pub use response_builder::build_response;
pub use service::{execute_request, TunnelClient, TunnelFuture, TunnelService, TunnelServiceExt};
pub use types::*;
