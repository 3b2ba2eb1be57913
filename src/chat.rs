//! Chat front end
//!
//! Turns chat messages such as `!wq search oscar wilde` into replies. A
//! message that does not start with the command prefix is not addressed to
//! the bot and gets no reply at all.

use crate::cache::Quote;
use crate::error::SearchError;
use crate::lookup::{LookupOutcome, QuoteSearch};
use rand::seq::SliceRandom;
use tracing::{debug, error};

pub const NO_QUOTES_REPLY: &str = "*No quotes found for this person/topic.*";
pub const NOT_FOUND_REPLY: &str = "*Person/Topic could not be found. Try another search term.*";

/// A message addressed to the bot
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatCommand {
    /// `<prefix> info`
    Info,
    /// `<prefix> help`
    Help,
    /// `<prefix> search <subject...>`; holds the whole message, which is
    /// also the lookup query
    Search(String),
    /// Anything else carrying the prefix
    Unrecognized,
}

impl ChatCommand {
    /// Parse a message, or `None` when it does not start with `prefix`
    ///
    /// A message that starts with the prefix but runs on without a space
    /// (`!wqfoo`) is still addressed to the bot and is unrecognized.
    pub fn parse(prefix: &str, message: &str) -> Option<Self> {
        let message = message.trim_start();
        if !message.starts_with(prefix) {
            return None;
        }

        let mut tokens = message.split_whitespace();
        if tokens.next() != Some(prefix) {
            return Some(ChatCommand::Unrecognized);
        }

        let command = match (tokens.next(), tokens.next()) {
            (Some("info"), None) => ChatCommand::Info,
            (Some("help"), None) => ChatCommand::Help,
            (Some("search"), _) => ChatCommand::Search(message.trim().to_string()),
            _ => ChatCommand::Unrecognized,
        };
        Some(command)
    }
}

/// Chooses the quote to reply with
pub trait QuotePicker: Send + Sync + std::fmt::Debug {
    fn pick<'a>(&self, quotes: &'a [Quote]) -> Option<&'a Quote>;
}

/// Uniform random choice
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomPicker;

impl QuotePicker for RandomPicker {
    fn pick<'a>(&self, quotes: &'a [Quote]) -> Option<&'a Quote> {
        quotes.choose(&mut rand::thread_rng())
    }
}

/// Always the first quote in document order
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstPicker;

impl QuotePicker for FirstPicker {
    fn pick<'a>(&self, quotes: &'a [Quote]) -> Option<&'a Quote> {
        quotes.first()
    }
}

/// Wrap a quote the way replies show it
pub fn format_quote(quote: &str) -> String {
    format!("```\" {} \"```", quote)
}

/// Quote bot: command parsing plus a lookup service
#[derive(Debug)]
pub struct ChatBot {
    search: QuoteSearch,
    prefix: String,
    picker: Box<dyn QuotePicker>,
}

impl ChatBot {
    pub fn new(search: QuoteSearch, prefix: impl Into<String>) -> Self {
        Self {
            search,
            prefix: prefix.into(),
            picker: Box::new(RandomPicker),
        }
    }

    /// Replace the quote picker
    pub fn with_picker(mut self, picker: impl QuotePicker + 'static) -> Self {
        self.picker = Box::new(picker);
        self
    }

    pub fn search(&self) -> &QuoteSearch {
        &self.search
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Reply to a message, or `None` if it is not addressed to the bot
    pub async fn respond(&self, message: &str) -> Option<String> {
        let command = ChatCommand::parse(&self.prefix, message)?;
        debug!("Handling {:?}", command);

        let reply = match command {
            ChatCommand::Info => self.info_text(),
            ChatCommand::Help => self.help_text(),
            ChatCommand::Unrecognized => self.unrecognized_text(),
            ChatCommand::Search(query) => self.search_reply(&query).await,
        };
        Some(reply)
    }

    async fn search_reply(&self, query: &str) -> String {
        match self.search.lookup(query).await {
            Ok(LookupOutcome::Found { quotes, .. }) => match self.picker.pick(&quotes) {
                Some(quote) => format_quote(quote),
                None => NO_QUOTES_REPLY.to_string(),
            },
            Ok(LookupOutcome::NotFound) => NOT_FOUND_REPLY.to_string(),
            Err(SearchError::InvalidQuery(reason)) => {
                debug!("Rejected query: {}", reason);
                format!(
                    "*Name a person or topic to search for, e.g.* `{} search oscar wilde`",
                    self.prefix
                )
            }
            Err(e) => {
                error!("Lookup failed: {}", e);
                NOT_FOUND_REPLY.to_string()
            }
        }
    }

    pub fn info_text(&self) -> String {
        format!(
            "**Unofficial WikiQuote Bot**\n\
             A tool for retrieving quotes from the WikiQuote website. \
             This bot is not affiliated with the WikiQuote team.\n\
             Use `{} help` to list commands.",
            self.prefix
        )
    }

    pub fn help_text(&self) -> String {
        format!(
            "**Commands**\n\
             \t`{p} info` - displays info about this bot\n\
             \t`{p} help` - display commands\n\
             \t`{p} search [full name/topic]` - retrieve a random quote from the specified source",
            p = self.prefix
        )
    }

    pub fn unrecognized_text(&self) -> String {
        format!(
            "*Unrecognized command. Use  *`{} help` *to view a list of valid commands.*",
            self.prefix
        )
    }
}
