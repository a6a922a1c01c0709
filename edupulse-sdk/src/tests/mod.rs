//! Unit tests for the EduPulse SDK
//!
//! This module contains tests for various components of the SDK.

pub mod config_tests;
pub mod session_tests;
