//! Command dispatcher
//!
//! Matches incoming text against the fixed command set and produces canned
//! replies. Commands match case-insensitively, with or without the `!`
//! prefix; anything else is ignored (except the "thanks" easter egg, which
//! matches as a substring).

use chrono::Local;
use rand::seq::SliceRandom;

pub struct CommandDispatcher {
    bot_name: String,
}

impl CommandDispatcher {
    pub fn new(bot_name: &str) -> Self {
        Self {
            bot_name: bot_name.to_string(),
        }
    }

    /// Replies for one message; empty when nothing matched
    pub fn dispatch(&self, sender_name: &str, text: &str) -> Vec<String> {
        let lower = text.trim().to_lowercase();
        let mut replies = Vec::new();

        match lower.as_str() {
            "!ping" | "ping" => replies.push(self.ping()),
            "!hello" | "hello" | "hi" => replies.push(self.greeting(sender_name)),
            "!time" | "time" => replies.push(self.time()),
            "!help" | "help" => replies.push(self.help()),
            _ => {}
        }

        if lower.contains("thank") {
            replies.push(self.thanks());
        }

        replies
    }

    fn ping(&self) -> String {
        format!("🏓 Pong! {} is online!", self.bot_name)
    }

    fn greeting(&self, sender_name: &str) -> String {
        let options = [
            format!(
                "👋 Hello {}! I'm {}, your chat assistant!",
                sender_name, self.bot_name
            ),
            format!("Hey {}! 👋 How can I help you today?", sender_name),
            format!(
                "Hi there {}! 🤖 {} at your service!",
                sender_name, self.bot_name
            ),
        ];
        pick(&options)
    }

    fn time(&self) -> String {
        let now = Local::now();
        format!(
            "🕐 Current time: {}",
            now.format("%A, %B %e, %Y %I:%M:%S %p")
        )
    }

    fn help(&self) -> String {
        format!(
            "🤖 *{name} Commands*\n\n\
             ━━━━━━━━━━━━━━━━\n\n\
             • *!ping* - Check if bot is online\n\
             • *!hello* - Get a friendly greeting\n\
             • *!time* - Check current time\n\
             • *!help* - Show this menu\n\n\
             ━━━━━━━━━━━━━━━━\n\
             ✨ More features coming soon!",
            name = self.bot_name
        )
    }

    fn thanks(&self) -> String {
        let options = [
            "You're welcome! 😊".to_string(),
            "Happy to help! 🤗".to_string(),
            "Anytime! 👍".to_string(),
            "My pleasure! 🎉".to_string(),
        ];
        pick(&options)
    }

    /// The full command list, as shown on the dashboard
    pub fn command_list() -> &'static [(&'static str, &'static str)] {
        &[
            ("!ping", "Check if bot is online"),
            ("!hello", "Get a friendly greeting"),
            ("!time", "Check current time"),
            ("!help", "Show all commands"),
        ]
    }
}

fn pick(options: &[String]) -> String {
    options
        .choose(&mut rand::thread_rng())
        .cloned()
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dispatcher() -> CommandDispatcher {
        CommandDispatcher::new("Casper")
    }

    #[test]
    fn ping_replies_pong() {
        let replies = dispatcher().dispatch("Sam", "!ping");
        assert_eq!(replies.len(), 1);
        assert!(replies[0].contains("Pong"));
        assert!(replies[0].contains("Casper"));
    }

    #[test]
    fn bare_and_prefixed_forms_match() {
        let d = dispatcher();
        assert_eq!(d.dispatch("Sam", "ping").len(), 1);
        assert_eq!(d.dispatch("Sam", "!ping").len(), 1);
        assert_eq!(d.dispatch("Sam", "hi").len(), 1);
    }

    #[test]
    fn matching_is_case_insensitive() {
        let d = dispatcher();
        assert_eq!(d.dispatch("Sam", "!PING").len(), 1);
        assert_eq!(d.dispatch("Sam", "Hello").len(), 1);
        assert_eq!(d.dispatch("Sam", "  !help  ").len(), 1);
    }

    #[test]
    fn greeting_addresses_sender() {
        let replies = dispatcher().dispatch("Sam", "hello");
        assert_eq!(replies.len(), 1);
        assert!(replies[0].contains("Sam"));
    }

    #[test]
    fn help_lists_every_command() {
        let replies = dispatcher().dispatch("Sam", "!help");
        assert_eq!(replies.len(), 1);
        for (cmd, _) in CommandDispatcher::command_list() {
            assert!(replies[0].contains(cmd), "help is missing {}", cmd);
        }
    }

    #[test]
    fn time_reply_has_prefix() {
        let replies = dispatcher().dispatch("Sam", "time");
        assert_eq!(replies.len(), 1);
        assert!(replies[0].starts_with("🕐 Current time:"));
    }

    #[test]
    fn thanks_matches_as_substring() {
        let d = dispatcher();
        assert_eq!(d.dispatch("Sam", "thank you so much").len(), 1);
        assert_eq!(d.dispatch("Sam", "ok thanks!").len(), 1);
    }

    #[test]
    fn unknown_text_gets_no_reply() {
        let d = dispatcher();
        assert!(d.dispatch("Sam", "what's the weather").is_empty());
        assert!(d.dispatch("Sam", "").is_empty());
        assert!(d.dispatch("Sam", "pingpong").is_empty());
    }
}
