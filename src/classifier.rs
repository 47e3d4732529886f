//! Message intent classification via keyword matching.

use regex::Regex;

/// What an inbound message is asking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Greeting,
    History,
    Symptom,
    Fallback,
}

/// Classifies message text into an [`Intent`] using compiled keyword patterns.
///
/// Precedence: greeting > history > symptom. Everything else (including
/// empty input) falls through to `Fallback`.
pub struct Classifier {
    greeting_patterns: Vec<Regex>,
    history_patterns: Vec<Regex>,
    symptom_patterns: Vec<Regex>,
}

impl Classifier {
    pub fn new() -> Self {
        Self {
            greeting_patterns: compile(&[
                r"(?i)\bhello\b",
                r"(?i)^\s*(hi|hey)\b",
                r"(?i)\bgood\s+(morning|afternoon|evening)\b",
            ]),
            history_patterns: compile(&[r"(?i)\bhistory\b"]),
            symptom_patterns: compile(&[
                r"(?i)\b(fever|headache|migraine|cough|cold|flu)\b",
                r"(?i)\b(pain|ache|aching|hurts?|sore|cramps?)\b",
                r"(?i)\b(nausea|nauseous|vomit(ing)?|diarrhea|dizzy|dizziness)\b",
                r"(?i)\b(rash|itch(y|ing)?|swelling|swollen|fatigue|tired)\b",
                r"(?i)\b(chills?|sweats?|breathless|short(ness)? of breath)\b",
                r"(?i)\b(symptoms?|sick|ill|unwell)\b",
            ]),
        }
    }

    /// Always returns a label; never errors.
    pub fn classify(&self, text: &str) -> Intent {
        if self.greeting_patterns.iter().any(|p| p.is_match(text)) {
            return Intent::Greeting;
        }
        if self.history_patterns.iter().any(|p| p.is_match(text)) {
            return Intent::History;
        }
        if self.symptom_patterns.iter().any(|p| p.is_match(text)) {
            return Intent::Symptom;
        }
        Intent::Fallback
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new()
    }
}

fn compile(patterns: &[&str]) -> Vec<Regex> {
    patterns.iter().map(|p| Regex::new(p).unwrap()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_greeting() {
        let c = Classifier::new();
        assert_eq!(c.classify("hello"), Intent::Greeting);
        assert_eq!(c.classify("Hello there"), Intent::Greeting);
        assert_eq!(c.classify("hi"), Intent::Greeting);
        assert_eq!(c.classify("good morning"), Intent::Greeting);
    }

    #[test]
    fn test_greeting_is_case_insensitive() {
        let c = Classifier::new();
        assert_eq!(c.classify("HELLO"), Intent::Greeting);
        assert_eq!(c.classify("HeLLo doctor"), Intent::Greeting);
    }

    #[test]
    fn test_history() {
        let c = Classifier::new();
        assert_eq!(c.classify("history"), Intent::History);
        assert_eq!(c.classify("show me my History please"), Intent::History);
    }

    #[test]
    fn test_symptom() {
        let c = Classifier::new();
        assert_eq!(c.classify("fever and headache"), Intent::Symptom);
        assert_eq!(c.classify("I have a bad cough"), Intent::Symptom);
        assert_eq!(c.classify("my stomach hurts"), Intent::Symptom);
        assert_eq!(c.classify("feeling dizzy since yesterday"), Intent::Symptom);
    }

    #[test]
    fn test_greeting_wins_over_symptom() {
        let c = Classifier::new();
        assert_eq!(c.classify("hello, I have a fever"), Intent::Greeting);
    }

    #[test]
    fn test_history_wins_over_symptom() {
        let c = Classifier::new();
        assert_eq!(c.classify("history of my fever reports"), Intent::History);
    }

    #[test]
    fn test_fallback() {
        let c = Classifier::new();
        assert_eq!(c.classify("what is the weather"), Intent::Fallback);
        assert_eq!(c.classify(""), Intent::Fallback);
        assert_eq!(c.classify("   "), Intent::Fallback);
        assert_eq!(c.classify("42"), Intent::Fallback);
    }

    #[test]
    fn test_hi_does_not_match_inside_words() {
        let c = Classifier::new();
        // "hi" only counts at the start of the message
        assert_eq!(c.classify("this thing"), Intent::Fallback);
    }
}
