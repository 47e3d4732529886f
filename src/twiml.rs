//! TwiML reply envelope.
//!
//! Twilio expects the webhook response body to be an XML `<Response>`
//! wrapping the outbound message. Reply text is entity-escaped so user and
//! model content cannot break the markup.

/// Escape a string for safe inclusion in XML content.
fn xml_escape(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '&' => result.push_str("&amp;"),
            '"' => result.push_str("&quot;"),
            _ => result.push(c),
        }
    }
    result
}

/// Wrap reply text in a TwiML message envelope.
pub fn message_response(body: &str) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?><Response><Message>{}</Message></Response>",
        xml_escape(body)
    )
}
