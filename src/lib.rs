// ABOUTME: Library root for the image-to-3D conversion orchestrator
// ABOUTME: Re-exports the client, poll loop, orchestrator and persistence gateways

pub mod config;
pub mod error;
pub mod orchestrator;
pub mod persistence;
pub mod poll;
pub mod remote;

pub use config::Config;
pub use error::ConversionError;
pub use orchestrator::{ConversionOutcome, Orchestrator};
pub use persistence::{LoggingGateway, PersistenceGateway, PostgresGateway};
pub use poll::{PollLoop, TerminalStatus};
pub use remote::{ConversionRequest, JobHandle, JobState, JobStatus, RemoteClient, RemoteJobClient};
