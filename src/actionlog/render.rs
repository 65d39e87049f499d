//! Rendering stored log entries into display text.
//!
//! Rendering never touches stored entries. Player-id parameters are swapped
//! for display labels and keys are resolved through a `Localizer`, both on
//! copies, so the same entry re-renders identically and switching locale
//! only changes the output text.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use super::segment::{ActionLogEntry, ActionLogSegment, LogParam};

/// Resolves `ns:key` message templates.
pub trait Localizer {
    /// Render a message, or `None` when the key is unknown.
    fn translate(&self, ns: &str, key: &str, params: &BTreeMap<String, String>) -> Option<String>;
}

/// In-memory message table for one locale.
///
/// Templates use `{{name}}` placeholders. Unknown placeholders are left as
/// written.
///
/// ```
/// use std::collections::BTreeMap;
/// use tabletop_engine::actionlog::{Localizer, MessageCatalog};
///
/// let catalog = MessageCatalog::new("en").with("duel", "log.hit", "{{name}} hits for {{amount}}");
/// let params = BTreeMap::from([
///     ("name".to_string(), "P0".to_string()),
///     ("amount".to_string(), "3".to_string()),
/// ]);
///
/// assert_eq!(catalog.translate("duel", "log.hit", &params).unwrap(), "P0 hits for 3");
/// assert!(catalog.translate("duel", "log.miss", &params).is_none());
/// ```
#[derive(Clone, Debug, Default)]
pub struct MessageCatalog {
    locale: String,
    messages: HashMap<String, String>,
}

impl MessageCatalog {
    /// Create an empty catalog.
    pub fn new(locale: impl Into<String>) -> Self {
        Self {
            locale: locale.into(),
            messages: HashMap::new(),
        }
    }

    /// Add a template (builder pattern).
    #[must_use]
    pub fn with(mut self, ns: &str, key: &str, template: impl Into<String>) -> Self {
        self.insert(ns, key, template);
        self
    }

    /// Add or replace a template.
    pub fn insert(&mut self, ns: &str, key: &str, template: impl Into<String>) {
        self.messages.insert(format!("{ns}:{key}"), template.into());
    }

    /// Locale tag.
    #[must_use]
    pub fn locale(&self) -> &str {
        &self.locale
    }

    /// Number of templates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// True if the catalog holds no templates.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

impl Localizer for MessageCatalog {
    fn translate(&self, ns: &str, key: &str, params: &BTreeMap<String, String>) -> Option<String> {
        self.messages
            .get(&format!("{ns}:{key}"))
            .map(|template| interpolate(template, params))
    }
}

fn interpolate(template: &str, params: &BTreeMap<String, String>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find("}}") {
            Some(end) => {
                let name = after[..end].trim();
                match params.get(name) {
                    Some(value) => out.push_str(value),
                    None => out.push_str(&rest[start..start + 2 + end + 2]),
                }
                rest = &after[end + 2..];
            }
            None => {
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

/// Render one segment.
pub fn render_segment(segment: &ActionLogSegment, localizer: &dyn Localizer) -> String {
    match segment {
        ActionLogSegment::Text { text } => text.clone(),
        ActionLogSegment::I18n(i18n) => {
            let mut params: BTreeMap<String, String> = i18n
                .params
                .iter()
                .map(|(k, v)| (k.clone(), v.to_string()))
                .collect();
            for name in &i18n.param_i18n_keys {
                if let Some(raw) = params.get(name).filter(|raw| !raw.is_empty()) {
                    let resolved = localizer
                        .translate(&i18n.ns, raw, &BTreeMap::new())
                        .unwrap_or_else(|| raw.clone());
                    params.insert(name.clone(), resolved);
                }
            }
            localizer
                .translate(&i18n.ns, &i18n.key, &params)
                .unwrap_or_else(|| i18n.key.clone())
        }
        ActionLogSegment::Breakdown(breakdown) => breakdown.display_text.clone(),
        ActionLogSegment::Card(card) => match (&card.preview_text_ns, &card.preview_text) {
            (Some(ns), Some(key)) => localizer
                .translate(ns, key, &BTreeMap::new())
                .unwrap_or_else(|| key.clone()),
            (None, Some(text)) => text.clone(),
            _ => card.card_id.clone(),
        },
        ActionLogSegment::DiceResult { dice } => dice
            .iter()
            .map(u8::to_string)
            .collect::<Vec<_>>()
            .join(", "),
    }
}

/// Render segments, joining non-blank parts with a single space.
pub fn render_segments(segments: &[ActionLogSegment], localizer: &dyn Localizer) -> String {
    segments
        .iter()
        .map(|s| render_segment(s, localizer))
        .filter(|text| !text.trim().is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Whether a parameter name carries a player id.
#[must_use]
pub fn is_player_param(name: &str) -> bool {
    name == "playerId" || name.ends_with("PlayerId")
}

/// Copy of `segments` with player-id parameters replaced by display labels.
pub fn resolve_player_params(
    segments: &[ActionLogSegment],
    player_label: &dyn Fn(&str) -> String,
) -> Vec<ActionLogSegment> {
    segments
        .iter()
        .map(|segment| match segment {
            ActionLogSegment::I18n(i18n) if i18n.params.keys().any(|k| is_player_param(k)) => {
                let mut resolved = i18n.clone();
                for (name, value) in resolved.params.iter_mut() {
                    if is_player_param(name) {
                        *value = LogParam::Text(player_label(&value.to_string()));
                    }
                }
                ActionLogSegment::I18n(resolved)
            }
            other => other.clone(),
        })
        .collect()
}

/// One display row.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionLogRow {
    /// Entry id.
    pub id: String,
    /// Formatted time.
    pub time_label: String,
    /// Actor display label.
    pub player_label: String,
    /// Rendered text, or the entry kind when nothing renders.
    pub text: String,
    /// Segments with player labels resolved, for rich rendering.
    pub segments: Vec<ActionLogSegment>,
}

/// Options for `build_rows`.
pub struct RowOptions<'a> {
    /// Sort newest entries first.
    pub newest_first: bool,
    /// Timestamp formatter.
    pub format_time: &'a dyn Fn(u64) -> String,
    /// Player display label.
    pub player_label: &'a dyn Fn(&str) -> String,
}

impl Default for RowOptions<'static> {
    fn default() -> Self {
        Self {
            newest_first: true,
            format_time: &clock_label,
            player_label: &seat_label,
        }
    }
}

/// `HH:MM:SS` (UTC) for a millisecond timestamp.
#[must_use]
pub fn clock_label(timestamp: u64) -> String {
    let seconds = timestamp / 1000;
    format!(
        "{:02}:{:02}:{:02}",
        (seconds / 3600) % 24,
        (seconds / 60) % 60,
        seconds % 60
    )
}

/// `P{id}`.
#[must_use]
pub fn seat_label(player: &str) -> String {
    format!("P{player}")
}

/// Build display rows from stored entries.
///
/// Sorting is stable, so entries of the same command keep their order.
pub fn build_rows(
    entries: &[ActionLogEntry],
    localizer: &dyn Localizer,
    options: &RowOptions<'_>,
) -> Vec<ActionLogRow> {
    let mut sorted: Vec<&ActionLogEntry> = entries.iter().collect();
    if options.newest_first {
        sorted.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    } else {
        sorted.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
    }

    sorted
        .into_iter()
        .map(|entry| {
            let segments = resolve_player_params(&entry.segments, options.player_label);
            let text = render_segments(&segments, localizer);
            ActionLogRow {
                id: entry.id.clone(),
                time_label: (options.format_time)(entry.timestamp),
                player_label: (options.player_label)(&entry.actor_id.to_string()),
                text: if text.is_empty() { entry.kind.clone() } else { text },
                segments,
            }
        })
        .collect()
}
