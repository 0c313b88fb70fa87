//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate validation, id generation and persistence into catalog
//!   use-case APIs.
//! - Keep presentation layers decoupled from storage details.

pub mod catalog_service;
