//! Backend client implementation
//!
//! This module contains the EduPulse backend client and its endpoint groups.

mod client;
pub(crate) mod common;
pub mod diet;
pub mod lfa;
pub mod teacher;

pub use client::{DownloadedFile, EduPulseClient, HealthStatus};
pub use common::UserAgent;
pub use diet::DietApi;
pub use lfa::LfaApi;
pub use teacher::TeacherApi;
