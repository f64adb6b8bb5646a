//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository and validation calls into use-case level APIs.
//! - Keep CLI callers decoupled from storage and delivery details.

pub mod feedback_service;
pub mod project_service;
