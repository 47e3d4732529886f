//! aidoc - WhatsApp AI-doctor webhook bot.
//!
//! Receives provider webhook POSTs, classifies the message, answers greetings
//! and history requests directly, and forwards symptom text to Gemini for a
//! diagnosis-style reply, persisting each successful consultation to SQLite.

pub mod classifier;
pub mod config;
pub mod gemini;
pub mod handler;
pub mod server;
pub mod store;
pub mod twiml;

pub use classifier::{Classifier, Intent};
pub use config::Config;
pub use gemini::{Diagnoser, GeminiClient, UpstreamError};
pub use handler::{App, IncomingMessage, Reply};
pub use store::{Consultation, ConsultationStore, StorageError};
