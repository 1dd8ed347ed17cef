//! Domain layer containing the mapping model and the rules around it.
//!
//! This module is independent of infrastructure concerns. It defines the persisted
//! [`entities::Record`], the storage contract ([`repositories::MappingStore`]), the
//! pure access-control decision ([`access`]) and the bot verification contract
//! ([`verification::BotVerifier`]).
//!
//! # Architecture
//!
//! - [`entities`] - Core data structures
//! - [`repositories`] - Data access trait definitions
//! - [`access`] - Access Guard for password-protected mappings
//! - [`verification`] - Bot verification collaborator contract

pub mod access;
pub mod entities;
pub mod repositories;
pub mod verification;
