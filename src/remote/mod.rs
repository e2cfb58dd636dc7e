// ABOUTME: Remote generation service module
// ABOUTME: Client trait, reqwest implementation and wire models

pub mod client;
pub mod models;

pub use client::{RemoteClient, RemoteJobClient};
pub use models::{ConversionRequest, JobHandle, JobState, JobStatus, MESH_FORMAT};
