//! Dialogue controller
//!
//! This module implements the per-user reservation state machine. Each
//! inbound message is classified by pattern (not by state alone), advances
//! the user's draft at most one stage, and produces a [`Reply`] for the
//! transport to send. States run strictly forward:
//!
//! ```text
//! START -> HAVE_ROUTE -> HAVE_MODE -> HAVE_TIME -> completed (auto-reset)
//! ```
//!
//! On completion the draft leaves the session store before anything is
//! persisted, so a failed insert can never leave a stuck terminal draft.

use crate::error::Result;
use crate::matching::{MatchEngine, MatchStrategy};
use crate::repository::{MemoryRepository, ReservationRepository};
use crate::reservation::{parse_time, NewReservation, ReservationDraft, RideMode, RouteLeg};
use crate::session::DraftStore;
use crate::types::UserId;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// One quick-choice button: a label and the literal text sent when tapped
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuickReply {
    pub label: String,
    pub text: String,
}

/// Reply produced for the outbound channel
///
/// Quick replies are only attached on the mode and payment steps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reply {
    pub text: String,
    pub quick_replies: Vec<QuickReply>,
}

impl Reply {
    /// Plain-text reply
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            quick_replies: Vec::new(),
        }
    }

    fn with_quick_replies(text: impl Into<String>, quick_replies: Vec<QuickReply>) -> Self {
        Self {
            text: text.into(),
            quick_replies,
        }
    }
}

/// Trigger tokens the controller classifies input against
///
/// All dialogue triggers live here so the controller itself is
/// language-independent. The defaults are English verbs around the `到`
/// route separator; [`Vocabulary::zh_tw`] is a full Traditional Chinese
/// preset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vocabulary {
    /// Exact phrase that asks for the latest reservation and match status
    pub query_phrase: String,
    /// Token splitting origin from destination in route input
    pub route_separator: String,
    /// Exact phrase choosing a pooled ride
    pub pooled_choice: String,
    /// Exact phrase choosing a solo ride
    pub solo_choice: String,
    /// Prefix verb introducing the reservation time
    pub time_verb: String,
    /// Prefix verb introducing the payment method
    pub payment_verb: String,
    /// Button labels for the mode step (pooled, solo)
    pub mode_labels: (String, String),
    /// Button labels for the payment step; each maps to `payment_verb label`
    pub payment_labels: Vec<String>,
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self {
            query_phrase: "query my reservations".to_string(),
            route_separator: "到".to_string(),
            pooled_choice: "choose pooled".to_string(),
            solo_choice: "choose solo".to_string(),
            time_verb: "reserve".to_string(),
            payment_verb: "pay".to_string(),
            mode_labels: ("Pool this ride".to_string(), "Ride solo".to_string()),
            payment_labels: vec![
                "LINE Pay".to_string(),
                "cash".to_string(),
                "EasyCard".to_string(),
            ],
        }
    }
}

impl Vocabulary {
    /// Traditional Chinese phrasing (Taiwan)
    pub fn zh_tw() -> Self {
        Self {
            query_phrase: "查詢我的預約".to_string(),
            route_separator: "到".to_string(),
            pooled_choice: "我選擇共乘".to_string(),
            solo_choice: "我不共乘".to_string(),
            time_verb: "我預約".to_string(),
            payment_verb: "我使用".to_string(),
            mode_labels: ("我要共乘".to_string(), "我要自己搭".to_string()),
            payment_labels: vec![
                "LINE Pay".to_string(),
                "現金".to_string(),
                "悠遊卡".to_string(),
            ],
        }
    }
}

/// Controller configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BotConfig {
    /// Use the geographic classifier for matching; when false, candidates
    /// must match origin and time exactly
    #[serde(default = "default_geographic_matching")]
    pub geographic_matching: bool,

    /// Base URL for the route-preview link in the confirmation reply
    #[serde(default = "default_route_preview_base")]
    pub route_preview_base: String,
}

fn default_geographic_matching() -> bool {
    true
}

fn default_route_preview_base() -> String {
    "https://www.google.com/maps/dir".to_string()
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            geographic_matching: default_geographic_matching(),
            route_preview_base: default_route_preview_base(),
        }
    }
}

/// Classified inbound message
#[derive(Debug)]
enum Input<'a> {
    Query,
    Route,
    Mode(RideMode),
    Time(&'a str),
    Payment(&'a str),
    Other,
}

/// The dialogue controller
///
/// Owns the draft store and the matching engine; the repository is shared
/// with whatever else persists reservations. One instance serves all users;
/// turns for different users run concurrently, turns for the same user
/// serialize on the draft slot.
///
/// # Examples
///
/// ```
/// use ridepool::{RideBot, UserId};
///
/// #[tokio::main]
/// async fn main() -> ridepool::Result<()> {
///     let bot = RideBot::builder().build();
///     let user = UserId::from("U1");
///
///     let reply = bot.handle_message(&user, "台北車站 到 松山機場").await?;
///     assert!(reply.text.contains("台北車站"));
///     assert_eq!(reply.quick_replies.len(), 2);
///     Ok(())
/// }
/// ```
pub struct RideBot {
    repository: Arc<dyn ReservationRepository>,
    drafts: DraftStore,
    engine: MatchEngine,
    vocabulary: Vocabulary,
    config: BotConfig,
}

impl RideBot {
    /// Create a new bot builder
    pub fn builder() -> RideBotBuilder {
        RideBotBuilder::new()
    }

    /// Handle one inbound message and produce the reply to send
    ///
    /// Malformed input, unknown locations, insert failures, and matching
    /// failures all resolve into a reply; an `Err` here means the turn
    /// itself could not run (for example the status query could not read
    /// the repository).
    pub async fn handle_message(&self, user_id: &UserId, text: &str) -> Result<Reply> {
        let text = text.trim();
        info!(user_id = %user_id, message_length = text.len(), "Processing message");

        let input = self.classify(text);
        debug!(user_id = %user_id, input = ?input, "Message classified");

        match input {
            Input::Query => self.query_status(user_id).await,
            Input::Route => Ok(self.advance_route(user_id, text).await),
            Input::Mode(mode) => Ok(self.advance_mode(user_id, mode).await),
            Input::Time(rest) => Ok(self.advance_time(user_id, rest).await),
            Input::Payment(rest) => Ok(self.complete(user_id, rest).await),
            Input::Other => Ok(Reply::text(self.format_hint())),
        }
    }

    /// Classify input by pattern
    ///
    /// The route pattern is checked first but yields to the time and payment
    /// verbs, so a payment message that happens to contain the separator is
    /// not mistaken for a route.
    fn classify<'a>(&self, text: &'a str) -> Input<'a> {
        let v = &self.vocabulary;

        if text == v.query_phrase {
            return Input::Query;
        }
        if text.contains(&v.route_separator)
            && !text.contains(&v.time_verb)
            && !text.contains(&v.payment_verb)
        {
            return Input::Route;
        }
        if text == v.pooled_choice {
            return Input::Mode(RideMode::Pooled);
        }
        if text == v.solo_choice {
            return Input::Mode(RideMode::Solo);
        }
        if let Some(rest) = text.strip_prefix(&v.time_verb) {
            return Input::Time(rest.trim());
        }
        if let Some(rest) = text.strip_prefix(&v.payment_verb) {
            return Input::Payment(rest.trim());
        }
        Input::Other
    }

    /// Route input: create or restart the draft
    async fn advance_route(&self, user_id: &UserId, text: &str) -> Reply {
        let route = match RouteLeg::parse(text, &self.vocabulary.route_separator) {
            Ok(route) => route,
            Err(_) => return Reply::text(self.route_prompt()),
        };

        if route.origin_coord.is_unknown() {
            debug!(user_id = %user_id, origin = %route.origin, "Origin not in place table");
        }

        let reply = Reply::with_quick_replies(
            format!(
                "🚕 You're going from {} to {}\nWould you like to pool this ride?",
                route.origin, route.destination
            ),
            vec![
                QuickReply {
                    label: self.vocabulary.mode_labels.0.clone(),
                    text: self.vocabulary.pooled_choice.clone(),
                },
                QuickReply {
                    label: self.vocabulary.mode_labels.1.clone(),
                    text: self.vocabulary.solo_choice.clone(),
                },
            ],
        );

        let mut guard = self.drafts.lock_user(user_id).await;
        guard.upsert(ReservationDraft::with_route(route));
        reply
    }

    /// Mode choice: requires an existing draft; a repeated choice just
    /// updates the mode in place
    async fn advance_mode(&self, user_id: &UserId, mode: RideMode) -> Reply {
        let mut guard = self.drafts.lock_user(user_id).await;
        match guard.take() {
            Some(ReservationDraft::Route { route })
            | Some(ReservationDraft::Mode { route, .. }) => {
                guard.upsert(ReservationDraft::Mode { route, mode });
                Reply::text(format!(
                    "Please enter your reservation time, e.g. {} 15:30",
                    self.vocabulary.time_verb
                ))
            }
            Some(ReservationDraft::Time { route, time, .. }) => {
                guard.upsert(ReservationDraft::Time { route, mode, time });
                Reply::text(format!(
                    "Mode updated. Pay with {} METHOD to finish.",
                    self.vocabulary.payment_verb
                ))
            }
            None => Reply::text(self.route_prompt()),
        }
    }

    /// Time input: requires a draft with the mode chosen
    async fn advance_time(&self, user_id: &UserId, time_text: &str) -> Reply {
        let mut guard = self.drafts.lock_user(user_id).await;
        match guard.take() {
            Some(ReservationDraft::Mode { route, mode })
            | Some(ReservationDraft::Time { route, mode, .. }) => match parse_time(time_text) {
                Ok(time) => {
                    let reply = Reply::with_quick_replies(
                        format!("🕐 Your reservation time is {}\nHow would you like to pay?", time),
                        self.payment_quick_replies(),
                    );
                    guard.upsert(ReservationDraft::Time { route, mode, time });
                    reply
                }
                Err(_) => {
                    guard.upsert(ReservationDraft::Mode { route, mode });
                    Reply::text(format!(
                        "Please give the time as HH:MM, e.g. {} 15:30",
                        self.vocabulary.time_verb
                    ))
                }
            },
            other => {
                if let Some(draft) = other {
                    guard.upsert(draft);
                }
                Reply::text(format!(
                    "Please set your route and send {} or {} first",
                    self.vocabulary.pooled_choice, self.vocabulary.solo_choice
                ))
            }
        }
    }

    /// Payment input: completes the draft, persists, matches, resets
    ///
    /// The draft is taken out of the store (and the per-user lock released)
    /// before the insert, so the session can never be left stuck on a
    /// persistence failure.
    async fn complete(&self, user_id: &UserId, payment_text: &str) -> Reply {
        let taken = {
            let mut guard = self.drafts.lock_user(user_id).await;
            match guard.take() {
                Some(ReservationDraft::Time { route, mode, time }) => Some((route, mode, time)),
                other => {
                    if let Some(draft) = other {
                        guard.upsert(draft);
                    }
                    None
                }
            }
        };

        let Some((route, mode, time)) = taken else {
            return Reply::text("Please set your reservation time first".to_string());
        };

        let reservation = NewReservation {
            user_id: user_id.clone(),
            route,
            mode,
            time,
            payment: payment_text.to_string(),
        };

        let record = match self.repository.insert(reservation.clone()).await {
            Ok(id) => reservation.into_record(id),
            Err(e) => {
                warn!(user_id = %user_id, error = %e, "Reservation insert failed");
                return Reply::text(format!(
                    "⚠️ Something went wrong saving your reservation. Please start again with ORIGIN {} DESTINATION",
                    self.vocabulary.route_separator
                ));
            }
        };

        let matched = self.engine.find_match(&record).await;

        let mut reply = format!(
            "🎉 Reservation complete!\n🛫 From: {}\n🛬 To: {}\n🚘 Mode: {}\n🕐 Time: {}\n💳 Payment: {}",
            record.route.origin, record.route.destination, record.mode, record.time, record.payment
        );
        if matched.is_some() {
            reply.push_str("\n🚨 Found a rideshare partner! You're on the same run as another rider!");
        }
        reply.push_str(&format!(
            "\n\n📍 Route preview:\n{}",
            self.route_preview_url(&record.route)
        ));
        reply.push_str(&format!(
            "\n\n👉 To reserve again, send ORIGIN {} DESTINATION",
            self.vocabulary.route_separator
        ));

        Reply::text(reply)
    }

    /// Status query: latest record plus a fresh match attempt
    async fn query_status(&self, user_id: &UserId) -> Result<Reply> {
        let records = self.repository.scan_by_user(user_id).await?;

        let Some(latest) = records.last() else {
            return Ok(Reply::text("You have no reservations yet."));
        };

        let matched = self.engine.find_match(latest).await;

        Ok(Reply::text(format!(
            "📋 Your latest reservation:\n🛫 From: {}\n🛬 To: {}\n🚘 Mode: {}\n🕐 Time: {}\n💳 Payment: {}\n👥 Match status: {}",
            latest.route.origin,
            latest.route.destination,
            latest.mode,
            latest.time,
            latest.payment,
            if matched.is_some() {
                "✅ Rideshare partner found!"
            } else {
                "⏳ No partner yet"
            }
        )))
    }

    fn payment_quick_replies(&self) -> Vec<QuickReply> {
        self.vocabulary
            .payment_labels
            .iter()
            .map(|label| QuickReply {
                label: label.clone(),
                text: format!("{} {}", self.vocabulary.payment_verb, label),
            })
            .collect()
    }

    fn route_preview_url(&self, route: &RouteLeg) -> String {
        format!(
            "{}/{}/{}",
            self.config.route_preview_base, route.origin, route.destination
        )
    }

    fn route_prompt(&self) -> String {
        format!(
            "Please use the format: ORIGIN {} DESTINATION",
            self.vocabulary.route_separator
        )
    }

    fn format_hint(&self) -> String {
        format!(
            "Please send a message in the format: ORIGIN {} DESTINATION",
            self.vocabulary.route_separator
        )
    }
}

/// Builder for [`RideBot`]
pub struct RideBotBuilder {
    repository: Option<Arc<dyn ReservationRepository>>,
    vocabulary: Vocabulary,
    config: BotConfig,
}

impl RideBotBuilder {
    pub fn new() -> Self {
        Self {
            repository: None,
            vocabulary: Vocabulary::default(),
            config: BotConfig::default(),
        }
    }

    /// Use a specific repository (defaults to [`MemoryRepository`])
    pub fn repository(mut self, repository: Arc<dyn ReservationRepository>) -> Self {
        self.repository = Some(repository);
        self
    }

    pub fn vocabulary(mut self, vocabulary: Vocabulary) -> Self {
        self.vocabulary = vocabulary;
        self
    }

    pub fn config(mut self, config: BotConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> RideBot {
        let repository = self
            .repository
            .unwrap_or_else(|| Arc::new(MemoryRepository::new()));

        let strategy = if self.config.geographic_matching {
            MatchStrategy::Classifier
        } else {
            MatchStrategy::ExactOriginTime
        };

        RideBot {
            engine: MatchEngine::new(repository.clone(), strategy),
            repository,
            drafts: DraftStore::new(),
            vocabulary: self.vocabulary,
            config: self.config,
        }
    }
}

impl Default for RideBotBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bot_config_default() {
        let config = BotConfig::default();
        assert!(config.geographic_matching);
        assert_eq!(config.route_preview_base, "https://www.google.com/maps/dir");
    }

    #[test]
    fn test_bot_config_deserializes_with_defaults() {
        let config: BotConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, BotConfig::default());

        let config: BotConfig =
            serde_json::from_str(r#"{"geographic_matching": false}"#).unwrap();
        assert!(!config.geographic_matching);
    }

    #[test]
    fn test_vocabulary_presets_differ_only_in_phrasing() {
        let default = Vocabulary::default();
        let zh = Vocabulary::zh_tw();
        assert_eq!(default.route_separator, zh.route_separator);
        assert_ne!(default.time_verb, zh.time_verb);
        assert_eq!(zh.query_phrase, "查詢我的預約");
    }

    #[tokio::test]
    async fn test_classify_route_yields_to_verbs() {
        let bot = RideBot::builder().build();
        assert!(matches!(bot.classify("A 到 B"), Input::Route));
        // Contains the separator but is a payment message
        assert!(matches!(bot.classify("pay 悠遊卡到站"), Input::Payment(_)));
        // Contains the separator but is a time message
        assert!(matches!(bot.classify("reserve 15:30 到"), Input::Time(_)));
    }

    #[tokio::test]
    async fn test_classify_exact_phrases() {
        let bot = RideBot::builder().build();
        assert!(matches!(bot.classify("query my reservations"), Input::Query));
        assert!(matches!(
            bot.classify("choose pooled"),
            Input::Mode(RideMode::Pooled)
        ));
        assert!(matches!(
            bot.classify("choose solo"),
            Input::Mode(RideMode::Solo)
        ));
        assert!(matches!(bot.classify("hello there"), Input::Other));
    }

    #[tokio::test]
    async fn test_classify_verb_remainders_are_trimmed() {
        let bot = RideBot::builder().build();
        match bot.classify("reserve   15:30") {
            Input::Time(rest) => assert_eq!(rest, "15:30"),
            other => panic!("unexpected classification: {:?}", other),
        }
        match bot.classify("pay cash") {
            Input::Payment(rest) => assert_eq!(rest, "cash"),
            other => panic!("unexpected classification: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_zh_vocabulary_classification() {
        let bot = RideBot::builder().vocabulary(Vocabulary::zh_tw()).build();
        assert!(matches!(bot.classify("查詢我的預約"), Input::Query));
        assert!(matches!(
            bot.classify("我選擇共乘"),
            Input::Mode(RideMode::Pooled)
        ));
        match bot.classify("我使用 現金") {
            Input::Payment(rest) => assert_eq!(rest, "現金"),
            other => panic!("unexpected classification: {:?}", other),
        }
        // A time message containing 到 must not be read as a route
        assert!(matches!(bot.classify("我預約 15:30 到了"), Input::Time(_)));
    }

    #[tokio::test]
    async fn test_payment_quick_replies_map_to_literal_text() {
        let bot = RideBot::builder().build();
        let buttons = bot.payment_quick_replies();
        assert_eq!(buttons.len(), 3);
        assert_eq!(buttons[1].label, "cash");
        assert_eq!(buttons[1].text, "pay cash");
    }
}
