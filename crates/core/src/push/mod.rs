//! Push of single local records into EXT

mod gateway;

pub use gateway::PushGateway;
