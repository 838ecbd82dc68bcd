mod envelope;
pub mod gateway;
pub mod health;

pub use gateway::HttpAttendanceGateway;
pub use health::HttpHealthProbe;
