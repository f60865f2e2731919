//! Canned replies used when no inference backend is configured or reachable.

use chrono::Local;

pub const GREETING_REPLY: &str = "Hello! How can I help you today?";
pub const WELL_BEING_REPLY: &str = "I'm doing great, thank you for asking! How can I assist you?";
pub const FAREWELL_REPLY: &str = "Goodbye! Have a great day!";
pub const HELP_REPLY: &str =
    "I'm here to help! You can ask me questions, and I'll do my best to assist you.";
pub const GENERIC_REPLY: &str = "That's interesting! Can you tell me more about that?";

enum Reply {
    Fixed(&'static str),
    CurrentTime,
    CurrentDate,
}

struct Rule {
    keywords: &'static [&'static str],
    reply: Reply,
}

// Order matters: the first rule with a matching keyword wins.
const RULES: &[Rule] = &[
    Rule { keywords: &["hello", "hi", "hey"], reply: Reply::Fixed(GREETING_REPLY) },
    Rule { keywords: &["how are you"], reply: Reply::Fixed(WELL_BEING_REPLY) },
    Rule { keywords: &["bye", "goodbye"], reply: Reply::Fixed(FAREWELL_REPLY) },
    Rule { keywords: &["help"], reply: Reply::Fixed(HELP_REPLY) },
    Rule { keywords: &["time"], reply: Reply::CurrentTime },
    Rule { keywords: &["date"], reply: Reply::CurrentDate },
];

impl Reply {
    fn render(&self) -> String {
        match self {
            Reply::Fixed(text) => (*text).to_string(),
            Reply::CurrentTime => format!("The current time is {}", Local::now().format("%-I:%M:%S %p")),
            Reply::CurrentDate => format!("Today's date is {}", Local::now().format("%-m/%-d/%Y")),
        }
    }
}

/// Maps raw user text to a canned reply by plain substring matching.
pub fn respond(user_text: &str) -> String {
    let message = user_text.trim().to_lowercase();
    RULES.iter()
        .find(|rule| rule.keywords.iter().any(|k| message.contains(k)))
        .map(|rule| rule.reply.render())
        .unwrap_or_else(|| GENERIC_REPLY.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn greeting_is_case_insensitive() {
        for input in ["hello", "HELLO there", "  Why, HeLLo!  ", "say hello to the team"] {
            assert_eq!(respond(input), GREETING_REPLY, "input: {input}");
        }
    }

    #[test]
    fn greeting_wins_over_later_rules() {
        assert_eq!(respond("hey, how are you?"), GREETING_REPLY);
        assert_eq!(respond("hello and goodbye"), GREETING_REPLY);
    }

    #[test]
    fn keywords_match_inside_words() {
        // "this" contains "hi"
        assert_eq!(respond("what is this"), GREETING_REPLY);
    }

    #[test]
    fn each_rule_is_reachable() {
        assert_eq!(respond("How are you doing"), WELL_BEING_REPLY);
        assert_eq!(respond("bye now"), FAREWELL_REPLY);
        assert_eq!(respond("I need assistance, HELP"), HELP_REPLY);
        assert!(respond("what time is it").starts_with("The current time is "));
        assert!(respond("today's date?").starts_with("Today's date is "));
    }

    #[test]
    fn unmatched_text_gets_generic_reply() {
        assert_eq!(respond("tell me about rust"), GENERIC_REPLY);
        assert_eq!(respond(""), GENERIC_REPLY);
    }
}
