//! Per-message orchestration: classify, act, reply.

use std::sync::Arc;
use tracing::{error, info};

use crate::classifier::{Classifier, Intent};
use crate::gemini::Diagnoser;
use crate::store::{Consultation, ConsultationStore};

/// One inbound webhook message. Lives for the duration of a single request.
#[derive(Debug, Clone)]
pub struct IncomingMessage {
    pub sender_id: String,
    pub body: String,
}

/// The outbound reply, constructed per request.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub body: String,
}

pub const GREETING_REPLY: &str = "👋 Hi! Describe your symptoms (e.g. 'headache and fever')";
pub const FALLBACK_REPLY: &str = "Please describe your symptoms (e.g., 'headache and fever').";
pub const NO_HISTORY_REPLY: &str = "No history found for this number.";
pub const HISTORY_UNAVAILABLE_REPLY: &str =
    "⚠️ Could not retrieve history due to a database error.";
pub const DIAGNOSIS_UNAVAILABLE_REPLY: &str =
    "⚠️ AI diagnosis currently unavailable. Please try again later or consult a doctor.";
pub const SAVE_FAILED_REPLY: &str =
    "⚠️ System error - your symptoms were not saved. Please try again.";

/// Max chars of diagnosis text shown per history entry.
const HISTORY_SNIPPET_LENGTH: usize = 120;

/// Everything a request needs, passed explicitly instead of process globals.
pub struct App {
    pub classifier: Classifier,
    pub store: ConsultationStore,
    pub diagnoser: Arc<dyn Diagnoser>,
    pub history_limit: usize,
}

impl App {
    pub fn new(
        store: ConsultationStore,
        diagnoser: Arc<dyn Diagnoser>,
        history_limit: usize,
    ) -> Self {
        Self {
            classifier: Classifier::new(),
            store,
            diagnoser,
            history_limit,
        }
    }
}

/// Handle one inbound message and produce exactly one reply.
/// Upstream and storage failures are converted to static fallback text here;
/// nothing propagates to the webhook layer.
pub async fn handle_message(app: &App, msg: &IncomingMessage) -> Reply {
    let preview: String = msg.body.chars().take(100).collect();
    let intent = app.classifier.classify(&msg.body);
    info!("Message from {}: \"{preview}\" → {intent:?}", msg.sender_id);

    let body = match intent {
        Intent::Greeting => GREETING_REPLY.to_string(),
        Intent::History => history_reply(app, &msg.sender_id),
        Intent::Symptom => symptom_reply(app, msg).await,
        Intent::Fallback => FALLBACK_REPLY.to_string(),
    };

    Reply { body }
}

fn history_reply(app: &App, sender_id: &str) -> String {
    match app.store.recent(sender_id, app.history_limit) {
        Ok(records) if records.is_empty() => NO_HISTORY_REPLY.to_string(),
        Ok(records) => format_history(&records),
        Err(e) => {
            error!("History retrieval failed for {sender_id}: {e}");
            HISTORY_UNAVAILABLE_REPLY.to_string()
        }
    }
}

fn format_history(records: &[Consultation]) -> String {
    let mut out = String::from("📜 Your History:");
    for c in records {
        let snippet: String = c.diagnosis_text.chars().take(HISTORY_SNIPPET_LENGTH).collect();
        let ellipsis = if c.diagnosis_text.chars().count() > HISTORY_SNIPPET_LENGTH {
            "..."
        } else {
            ""
        };
        out.push_str(&format!(
            "\n• [{}] Symptoms: {} → Diagnosis: {}{}",
            c.created_at, c.input_text, snippet, ellipsis
        ));
    }
    out
}

async fn symptom_reply(app: &App, msg: &IncomingMessage) -> String {
    let diagnosis = match app.diagnoser.diagnose(&msg.body).await {
        Ok(text) => text,
        Err(e) => {
            error!("Diagnosis failed for {}: {e}", msg.sender_id);
            return DIAGNOSIS_UNAVAILABLE_REPLY.to_string();
        }
    };

    if let Err(e) = app.store.save(&msg.sender_id, &msg.body, &diagnosis) {
        error!("Failed to save consultation for {}: {e}", msg.sender_id);
        return SAVE_FAILED_REPLY.to_string();
    }

    format!(
        "AI Doctor Report:\n\n\
         Symptoms: {}\n\
         Diagnosis: ⚠️ Disclaimer: I am an AI and cannot provide medical advice. \
         Consult a doctor for health concerns.\n\n\
         {}\n\n\
         Remember to consult a healthcare professional for diagnosis and treatment.",
        msg.body, diagnosis
    )
}
