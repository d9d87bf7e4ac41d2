//! pocket-translate — offline-capable translation orchestration.
//!
//! The crate is organised around one event loop
//! ([`orchestrator::TranslationOrchestrator`]) and the collaborators it
//! routes requests through:
//!
//! - [`translate`] — the live translation API client behind the
//!   [`translate::Translator`] trait;
//! - [`cache`] — persistent translation cache with a 7-day TTL, consulted
//!   when offline mode is on;
//! - [`history`] — capped, newest-first record of completed translations;
//! - [`speech`] — dictation input and spoken output controllers behind
//!   platform capability traits;
//! - [`connectivity`] — online/offline signal shared by everything above;
//! - [`storage`] — the key-value persistence layer backing cache, history
//!   and settings flags;
//! - [`config`] — on-disk settings and well-known file locations;
//! - [`languages`] — the static catalog of supported languages;
//! - [`clock`] — injectable time source so expiry logic is testable.

pub mod cache;
pub mod clock;
pub mod config;
pub mod connectivity;
pub mod history;
pub mod languages;
pub mod orchestrator;
pub mod speech;
pub mod storage;
pub mod translate;
