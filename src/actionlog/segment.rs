//! Action-log data model.
//!
//! Entries store structured segments rather than rendered text. Localization
//! keys, card ids and dice values are kept as data and only turned into
//! strings by the renderer, so the same stored entry can be shown in any
//! locale.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::player::PlayerId;
use crate::core::rng::DiceRoll;

/// One formatted log line for one accepted command.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionLogEntry {
    /// Deterministic id: `"{sequence}-{index}"`.
    pub id: String,
    /// Timestamp of the command.
    pub timestamp: u64,
    /// Seat that issued the command.
    pub actor_id: PlayerId,
    /// Game-defined entry kind, used as fallback text.
    pub kind: String,
    /// Structured content.
    pub segments: Vec<ActionLogSegment>,
}

/// Structured piece of a log entry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ActionLogSegment {
    /// Literal text.
    Text {
        /// The text.
        text: String,
    },
    /// Localized message.
    I18n(I18nSegment),
    /// Card reference.
    Card(CardSegment),
    /// Dice faces in roll order.
    DiceResult {
        /// Face values.
        dice: DiceRoll,
    },
    /// Number with a tooltip explaining how it was computed.
    Breakdown(BreakdownSegment),
}

impl ActionLogSegment {
    /// Literal text segment.
    pub fn text(text: impl Into<String>) -> Self {
        ActionLogSegment::Text { text: text.into() }
    }

    /// Dice segment.
    pub fn dice(dice: impl IntoIterator<Item = u8>) -> Self {
        ActionLogSegment::DiceResult {
            dice: dice.into_iter().collect(),
        }
    }

    /// Card segment without preview text.
    pub fn card(card_id: impl Into<String>) -> Self {
        ActionLogSegment::Card(CardSegment::new(card_id))
    }
}

impl From<I18nSegment> for ActionLogSegment {
    fn from(segment: I18nSegment) -> Self {
        ActionLogSegment::I18n(segment)
    }
}

impl From<CardSegment> for ActionLogSegment {
    fn from(segment: CardSegment) -> Self {
        ActionLogSegment::Card(segment)
    }
}

impl From<BreakdownSegment> for ActionLogSegment {
    fn from(segment: BreakdownSegment) -> Self {
        ActionLogSegment::Breakdown(segment)
    }
}

/// Message parameter value.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LogParam {
    /// Integer parameter.
    Number(i64),
    /// String parameter.
    Text(String),
}

impl fmt::Display for LogParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogParam::Number(n) => write!(f, "{n}"),
            LogParam::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for LogParam {
    fn from(n: i64) -> Self {
        LogParam::Number(n)
    }
}

impl From<i32> for LogParam {
    fn from(n: i32) -> Self {
        LogParam::Number(i64::from(n))
    }
}

impl From<u32> for LogParam {
    fn from(n: u32) -> Self {
        LogParam::Number(i64::from(n))
    }
}

impl From<&str> for LogParam {
    fn from(s: &str) -> Self {
        LogParam::Text(s.to_string())
    }
}

impl From<String> for LogParam {
    fn from(s: String) -> Self {
        LogParam::Text(s)
    }
}

impl From<PlayerId> for LogParam {
    fn from(player: PlayerId) -> Self {
        LogParam::Text(player.to_string())
    }
}

/// Localized message segment.
///
/// ```
/// use tabletop_engine::actionlog::I18nSegment;
/// use tabletop_engine::core::PlayerId;
///
/// let segment = I18nSegment::new("duel", "log.playCard")
///     .param("playerId", PlayerId::new(0))
///     .param("cardName", "card.strike")
///     .translate_param("cardName");
///
/// assert_eq!(segment.param_i18n_keys, vec!["cardName".to_string()]);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct I18nSegment {
    /// Message namespace.
    pub ns: String,
    /// Message key.
    pub key: String,
    /// Interpolation parameters.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub params: BTreeMap<String, LogParam>,
    /// Params whose value is itself a key in `ns`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub param_i18n_keys: Vec<String>,
}

impl I18nSegment {
    /// Create a message segment.
    pub fn new(ns: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            ns: ns.into(),
            key: key.into(),
            params: BTreeMap::new(),
            param_i18n_keys: Vec::new(),
        }
    }

    /// Set a parameter (builder pattern).
    #[must_use]
    pub fn param(mut self, name: impl Into<String>, value: impl Into<LogParam>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    /// Resolve a parameter's value as a key before interpolation (builder pattern).
    #[must_use]
    pub fn translate_param(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        if !self.param_i18n_keys.contains(&name) {
            self.param_i18n_keys.push(name);
        }
        self
    }
}

/// Card reference segment.
///
/// `preview_text` is a localization key resolved by the renderer, never
/// display text.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardSegment {
    /// Card id.
    pub card_id: String,
    /// Key of the card's display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preview_text: Option<String>,
    /// Namespace of `preview_text`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preview_text_ns: Option<String>,
}

impl CardSegment {
    /// Create a card segment.
    pub fn new(card_id: impl Into<String>) -> Self {
        Self {
            card_id: card_id.into(),
            preview_text: None,
            preview_text_ns: None,
        }
    }

    /// Attach a localized preview name (builder pattern).
    #[must_use]
    pub fn with_preview(mut self, ns: impl Into<String>, key: impl Into<String>) -> Self {
        self.preview_text_ns = Some(ns.into());
        self.preview_text = Some(key.into());
        self
    }
}

/// Colour hint for a breakdown line.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Tone {
    /// Base values.
    #[default]
    Neutral,
    /// Increases.
    Positive,
    /// Decreases.
    Negative,
}

impl Tone {
    /// Positive for values above zero, negative otherwise.
    #[must_use]
    pub fn of_delta(value: i64) -> Self {
        if value > 0 {
            Tone::Positive
        } else {
            Tone::Negative
        }
    }
}

/// One line of a breakdown tooltip.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BreakdownLine {
    /// Label text or key.
    pub label: String,
    /// Whether `label` is a localization key.
    pub label_is_i18n: bool,
    /// Namespace of `label`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label_ns: Option<String>,
    /// Contribution.
    pub value: i64,
    /// Colour hint.
    pub tone: Tone,
}

/// Number plus the lines that produced it.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BreakdownSegment {
    /// Rendered value.
    pub display_text: String,
    /// Tooltip lines.
    pub lines: Vec<BreakdownLine>,
}
