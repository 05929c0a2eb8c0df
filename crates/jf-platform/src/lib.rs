//! JobForge Platform
//!
//! Core platform providing:
//! - Job lifecycle management (draft/published/closed/expired)
//! - Application lifecycle with status history and cascades
//! - Company rating aggregation over reviews
//! - Saved jobs and notifications
//! - Bearer-token authentication for job seekers and employers

pub mod domain;
pub mod repository;
pub mod service;
pub mod api;
pub mod error;

pub use domain::*;
pub use error::BoardError;
