//! Structured action log.
//!
//! ## Pipeline
//!
//! 1. A game's `ActionLogFormatter` turns each accepted command (plus its
//!    events and the resulting state) into `ActionLogEntry` values built from
//!    typed segments.
//! 2. The match keeps them in an append-only `ActionLog`.
//! 3. Clients render entries with a `Localizer`, resolving player labels and
//!    message keys at display time.

pub mod segment;
pub mod formatter;
pub mod render;
pub mod helpers;

pub use segment::{
    ActionLogEntry, ActionLogSegment, BreakdownLine, BreakdownSegment, CardSegment, I18nSegment,
    LogParam, Tone,
};
pub use formatter::{ActionLog, ActionLogFormatter, FormatContext};
pub use render::{
    build_rows, render_segment, render_segments, resolve_player_params, ActionLogRow, Localizer,
    MessageCatalog, RowOptions,
};
pub use helpers::{
    build_damage_breakdown, damage_source_annotation, total_damage_to, total_healing_to,
    total_resource_change, BreakdownOptions, DamageLogPayload, DamageSourceResolver, SourceLabel,
    DAMAGE_FROM_KEY,
};
