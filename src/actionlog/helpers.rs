//! Reusable building blocks for game formatters.
//!
//! Games describe damage as data (source ids, amounts, modifiers, consumed
//! shields) and implement `DamageSourceResolver` once; the helpers here
//! turn that into breakdown and annotation segments.
//!
//! Totals for an entry are computed from the command's own events, never
//! from cumulative counters in state.

use serde::Deserialize;
use serde_json::Value;

use super::segment::{
    ActionLogSegment, BreakdownLine, BreakdownSegment, I18nSegment, Tone,
};
use crate::core::event::GameEvent;

/// Default key for the base line of a modifier breakdown.
pub const BASE_DAMAGE_KEY: &str = "actionLog.damageSource.original";

/// Default key for the "from" prefix of a source annotation.
pub const DAMAGE_FROM_KEY: &str = "actionLog.damageFrom";

/// Displayable label for a damage source.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceLabel {
    /// Text or localization key.
    pub label: String,
    /// Whether `label` is a key.
    pub is_i18n: bool,
    /// Namespace of `label` when it is a key.
    pub ns: Option<String>,
}

impl SourceLabel {
    /// Plain-text label.
    pub fn text(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            is_i18n: false,
            ns: None,
        }
    }

    /// Localized label.
    pub fn key(ns: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            label: key.into(),
            is_i18n: true,
            ns: Some(ns.into()),
        }
    }
}

/// Maps game-specific source ids (abilities, reasons) to labels.
pub trait DamageSourceResolver {
    /// Label for `source_id`, or `None` if unknown.
    fn resolve(&self, source_id: &str) -> Option<SourceLabel>;
}

impl<F> DamageSourceResolver for F
where
    F: Fn(&str) -> Option<SourceLabel>,
{
    fn resolve(&self, source_id: &str) -> Option<SourceLabel> {
        self(source_id)
    }
}

/// Flat modifier applied to a damage value.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DamageModifier {
    /// Modifier kind.
    #[serde(rename = "type", default)]
    pub modifier_type: String,
    /// Signed contribution.
    pub value: i64,
    /// Source id.
    #[serde(default)]
    pub source_id: String,
    /// Display name (text, or a key when it contains a dot).
    #[serde(default)]
    pub source_name: Option<String>,
}

/// Shield that absorbed part of a hit.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShieldConsumed {
    /// Shield id.
    pub id: String,
    /// Damage absorbed.
    pub absorbed: i64,
    /// Display name (text, or a key when it contains a dot).
    #[serde(default)]
    pub name: Option<String>,
}

/// One step of a damage pipeline.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BreakdownStep {
    /// Value of this step.
    pub value: i64,
    /// Source id.
    #[serde(default)]
    pub source_id: String,
    /// Display name.
    #[serde(default)]
    pub source_name: Option<String>,
    /// Whether `source_name` is a key.
    #[serde(default)]
    pub source_name_is_i18n: Option<bool>,
}

/// Full damage pipeline: base value plus ordered steps.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct DamageBreakdown {
    /// Base value.
    pub base: BreakdownStep,
    /// Adjustments in application order.
    #[serde(default)]
    pub steps: Vec<BreakdownStep>,
}

/// Standard fields of a damage event payload. All optional.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DamageLogPayload {
    /// Final damage.
    pub damage: Option<i64>,
    /// Source entity (rendered as a card segment when possible).
    pub source_entity_id: Option<String>,
    /// Source ability.
    pub source_ability_id: Option<String>,
    /// Source reason (e.g. "curse").
    pub reason: Option<String>,
    /// Full pipeline, preferred over `modifiers`.
    pub breakdown: Option<DamageBreakdown>,
    /// Flat modifiers.
    pub modifiers: Vec<DamageModifier>,
    /// Shields that absorbed damage.
    pub shields_consumed: Vec<ShieldConsumed>,
}

impl DamageLogPayload {
    /// Read the standard fields from an event payload.
    pub fn from_event(event: &GameEvent) -> Result<Self, serde_json::Error> {
        event.parse_payload()
    }

    /// Ability id, else reason.
    #[must_use]
    pub fn source_id(&self) -> Option<&str> {
        self.source_ability_id
            .as_deref()
            .or(self.reason.as_deref())
    }
}

/// Overrides for `build_damage_breakdown`.
#[derive(Clone, Debug, Default)]
pub struct BreakdownOptions {
    /// Replaces the default base-line label in modifier breakdowns.
    pub base_label: Option<SourceLabel>,
}

fn looks_like_key(name: Option<&str>) -> bool {
    name.is_some_and(|n| n.contains('.'))
}

/// Build a breakdown segment for a damage value.
///
/// Lines, in order:
/// - pipeline base and steps, or base + flat modifiers, or just the source
/// - one negative line per consumed shield
///
/// `display_text` is the final damage.
pub fn build_damage_breakdown(
    damage: i64,
    payload: &DamageLogPayload,
    resolver: &dyn DamageSourceResolver,
    fallback_ns: Option<&str>,
    options: &BreakdownOptions,
) -> ActionLogSegment {
    let mut lines = Vec::new();
    let source = payload.source_id().and_then(|id| resolver.resolve(id));
    let fallback_ns = fallback_ns.map(str::to_string);

    if let Some(breakdown) = &payload.breakdown {
        let base = &breakdown.base;
        let mut label = base
            .source_name
            .clone()
            .unwrap_or_else(|| base.source_id.clone());
        let mut label_is_i18n = base.source_name_is_i18n.unwrap_or(false);
        let mut label_ns = None;
        if let (false, Some(source)) = (label_is_i18n, &source) {
            label = source.label.clone();
            label_is_i18n = source.is_i18n;
            label_ns = source.ns.clone();
        }
        lines.push(BreakdownLine {
            label,
            label_is_i18n,
            label_ns,
            value: base.value,
            tone: Tone::Neutral,
        });
        for step in &breakdown.steps {
            let is_i18n = step.source_name_is_i18n.unwrap_or(false);
            lines.push(BreakdownLine {
                label: step
                    .source_name
                    .clone()
                    .unwrap_or_else(|| step.source_id.clone()),
                label_is_i18n: is_i18n,
                label_ns: if is_i18n { fallback_ns.clone() } else { None },
                value: step.value,
                tone: Tone::of_delta(step.value),
            });
        }
    } else if !payload.modifiers.is_empty() {
        let total: i64 = payload.modifiers.iter().map(|m| m.value).sum();
        let base = match &options.base_label {
            Some(custom) => BreakdownLine {
                label: custom.label.clone(),
                label_is_i18n: custom.is_i18n,
                label_ns: custom.ns.clone(),
                value: damage - total,
                tone: Tone::Neutral,
            },
            None => BreakdownLine {
                label: BASE_DAMAGE_KEY.to_string(),
                label_is_i18n: true,
                label_ns: fallback_ns.clone(),
                value: damage - total,
                tone: Tone::Neutral,
            },
        };
        lines.push(base);
        for modifier in &payload.modifiers {
            let is_i18n = looks_like_key(modifier.source_name.as_deref());
            let label = modifier
                .source_name
                .clone()
                .filter(|n| !n.is_empty())
                .or_else(|| Some(modifier.source_id.clone()).filter(|s| !s.is_empty()))
                .unwrap_or_else(|| modifier.modifier_type.clone());
            lines.push(BreakdownLine {
                label,
                label_is_i18n: is_i18n,
                label_ns: if is_i18n { fallback_ns.clone() } else { None },
                value: modifier.value,
                tone: Tone::of_delta(modifier.value),
            });
        }
    } else if let Some(source) = &source {
        lines.push(BreakdownLine {
            label: source.label.clone(),
            label_is_i18n: source.is_i18n,
            label_ns: source.ns.clone(),
            value: damage,
            tone: Tone::Neutral,
        });
    }

    for shield in &payload.shields_consumed {
        lines.push(BreakdownLine {
            label: shield.name.clone().unwrap_or_else(|| shield.id.clone()),
            label_is_i18n: looks_like_key(shield.name.as_deref()),
            label_ns: fallback_ns.clone(),
            value: -shield.absorbed,
            tone: Tone::Negative,
        });
    }

    BreakdownSegment {
        display_text: damage.to_string(),
        lines,
    }
    .into()
}

/// "from <source>" annotation segments.
///
/// Prefers a card segment for the source entity; otherwise resolves the
/// ability or reason. Returns nothing when the source is unknown.
pub fn damage_source_annotation(
    payload: &DamageLogPayload,
    resolver: &dyn DamageSourceResolver,
    ns: &str,
    prefix_key: &str,
    card_segment: Option<&dyn Fn(&str) -> Option<ActionLogSegment>>,
) -> Vec<ActionLogSegment> {
    let prefix = || ActionLogSegment::from(I18nSegment::new(ns, prefix_key));

    if let (Some(entity), Some(build_card)) = (&payload.source_entity_id, card_segment) {
        if let Some(card) = build_card(entity) {
            return vec![prefix(), card];
        }
    }

    let Some(source) = payload.source_id().and_then(|id| resolver.resolve(id)) else {
        return Vec::new();
    };
    let label: ActionLogSegment = if source.is_i18n {
        I18nSegment::new(source.ns.as_deref().unwrap_or(ns), source.label).into()
    } else {
        ActionLogSegment::text(source.label)
    };
    vec![prefix(), label]
}

fn matches_id(value: Option<&Value>, id: &str) -> bool {
    match value {
        Some(Value::String(s)) => s == id,
        Some(Value::Number(n)) => n.to_string() == id,
        _ => false,
    }
}

/// Sum of `DAMAGE_DEALT` to `target_id` (`actualDamage`, else `amount`).
#[must_use]
pub fn total_damage_to(events: &[GameEvent], target_id: &str) -> i64 {
    events
        .iter()
        .filter(|e| e.is("DAMAGE_DEALT") && matches_id(e.field("targetId"), target_id))
        .map(|e| {
            e.field("actualDamage")
                .or_else(|| e.field("amount"))
                .and_then(Value::as_i64)
                .unwrap_or(0)
        })
        .sum()
}

/// Sum of `HEAL_APPLIED` amounts to `target_id`.
#[must_use]
pub fn total_healing_to(events: &[GameEvent], target_id: &str) -> i64 {
    events
        .iter()
        .filter(|e| e.is("HEAL_APPLIED") && matches_id(e.field("targetId"), target_id))
        .map(|e| e.int_field("amount", 0))
        .sum()
}

/// Sum of `delta_field` over `event_type` events for `player_id`.
#[must_use]
pub fn total_resource_change(
    events: &[GameEvent],
    event_type: &str,
    player_id: &str,
    delta_field: &str,
) -> i64 {
    events
        .iter()
        .filter(|e| e.is(event_type) && matches_id(e.field("playerId"), player_id))
        .map(|e| e.int_field(delta_field, 0))
        .sum()
}
