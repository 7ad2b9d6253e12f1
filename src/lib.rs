//! Client-side authoring protocol for the course platform's REST backend:
//! objective link synchronisation and the multi-step quiz wizard, over a
//! small cached JSON client.

pub mod cache;
pub mod client;
pub mod config;
pub mod document;
pub mod error;
pub mod link_sync;
pub mod models;
pub mod objectives;
pub mod outline;
pub mod services;
pub mod validate;
pub mod wizard;

pub use client::{ApiClient, ApiRequest, HttpTransport, Transport};
pub use config::Config;
pub use error::{ApiError, AuthoringError, SubmitStage, ValidationError};
pub use wizard::{Action, QuizWizard, Step};
