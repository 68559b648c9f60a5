//! Plan normalization.
//!
//! Turns whatever the plan generator (or a user) produced into a
//! [`WeeklyPlan`]. Input is tried as structured JSON first; text that does
//! not decode into a `{"weekly_plan": [...]}` document is reconstructed
//! line by line. Days that share a label are merged and days without
//! exercises are dropped. Only a plan with no usable days is an error.

use serde_json::{Map, Value};
use thiserror::Error;
use tracing::debug;

use super::model::{
    DEFAULT_EXERCISE_NAME, DEFAULT_REPS, DEFAULT_SETS, DayEntry, ExerciseEntry, PlanInput,
    WeeklyPlan,
};

const WEEKDAYS: [&str; 7] = [
    "monday",
    "tuesday",
    "wednesday",
    "thursday",
    "friday",
    "saturday",
    "sunday",
];

/// The input held no day with at least one exercise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("invalid plan format")]
pub struct NormalizationError;

/// A normalized plan together with the goal label its routines are filed
/// under.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedPlan {
    pub plan: WeeklyPlan,
    pub goal_label: String,
}

/// Normalize raw plan content. Routines are filed under the trimmed
/// `fallback_goal_label`.
pub fn normalize(
    input: PlanInput,
    fallback_goal_label: &str,
) -> Result<NormalizedPlan, NormalizationError> {
    let days = match input {
        PlanInput::Structured(value) => structured_days(&value).unwrap_or_else(|| {
            debug!("structured plan has no weekly_plan array");
            Vec::new()
        }),
        PlanInput::Text(raw) => {
            let cleaned = clean_text(&raw);
            let decoded = serde_json::from_str::<Value>(&cleaned).ok();
            match decoded.as_ref().and_then(structured_days) {
                Some(days) => days,
                None => {
                    debug!("plan text is not a structured plan, reconstructing from lines");
                    parse_text(&cleaned)
                }
            }
        }
    };

    let grouped = group_days(days);
    if grouped.is_empty() {
        return Err(NormalizationError);
    }

    Ok(NormalizedPlan {
        plan: WeeklyPlan {
            weekly_plan: grouped,
        },
        goal_label: fallback_goal_label.trim().to_string(),
    })
}

/// Strip Markdown code fences and straighten curly quotes.
pub fn clean_text(raw: &str) -> String {
    raw.replace("```json", "")
        .replace("```", "")
        .replace(['\u{201C}', '\u{201D}'], "\"")
        .replace(['\u{2018}', '\u{2019}'], "'")
        .trim()
        .to_string()
}

// ---------------------------------------------------------------------------
// Structured path
// ---------------------------------------------------------------------------

/// Coerce a `{"weekly_plan": [...]}` document. `None` if the shape is wrong.
fn structured_days(value: &Value) -> Option<Vec<DayEntry>> {
    let entries = value.as_object()?.get("weekly_plan")?.as_array()?;
    let days = entries
        .iter()
        .enumerate()
        .filter_map(|(index, entry)| {
            let day = coerce_day(index, entry);
            if day.is_none() {
                debug!(index, "skipping non-object weekly_plan entry");
            }
            day
        })
        .collect();
    Some(days)
}

fn coerce_day(index: usize, value: &Value) -> Option<DayEntry> {
    let obj = value.as_object()?;
    let day = text_field(obj, "day").unwrap_or_else(|| format!("Day {}", index + 1));
    let focus = text_field(obj, "focus").unwrap_or_else(|| day.clone());
    let exercises = obj
        .get("exercises")
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(coerce_exercise).collect())
        .unwrap_or_default();

    Some(DayEntry {
        day,
        focus,
        exercises,
        warmup: text_field(obj, "warmup"),
        cooldown: text_field(obj, "cooldown"),
    })
}

fn coerce_exercise(value: &Value) -> Option<ExerciseEntry> {
    match value {
        Value::Object(obj) => Some(ExerciseEntry {
            name: text_field(obj, "name").unwrap_or_else(|| DEFAULT_EXERCISE_NAME.to_string()),
            sets: obj.get("sets").and_then(coerce_sets).unwrap_or(DEFAULT_SETS),
            reps: obj
                .get("reps")
                .and_then(coerce_reps)
                .unwrap_or_else(|| DEFAULT_REPS.to_string()),
            category: text_field(obj, "category"),
            warmup: text_field(obj, "warmup"),
            cooldown: text_field(obj, "cooldown"),
        }),
        // Some models list bare exercise names.
        Value::String(name) if !name.trim().is_empty() => {
            Some(ExerciseEntry::new(name.trim(), DEFAULT_SETS, DEFAULT_REPS))
        }
        _ => None,
    }
}

/// Positive integer set count from a number or numeric string.
fn coerce_sets(value: &Value) -> Option<u32> {
    let n = match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0 && *f > 0.0).map(|f| f as u64)),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    }?;
    if n == 0 {
        return None;
    }
    u32::try_from(n).ok()
}

fn coerce_reps(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()).filter(|s| !s.is_empty()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn text_field(obj: &Map<String, Value>, key: &str) -> Option<String> {
    obj.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

// ---------------------------------------------------------------------------
// Text path
// ---------------------------------------------------------------------------

/// What a single line of plan text contributes.
#[derive(Debug, Clone, PartialEq)]
enum LineKind<'a> {
    Day { day: &'a str, focus: &'a str },
    Warmup(&'a str),
    Cooldown(&'a str),
    Exercise(ExerciseEntry),
    Ignored,
}

/// Scanner state. Lines before the first day have nowhere to go.
enum ScanState {
    NoActiveDay,
    AccumulatingDay(DayEntry),
}

/// Rebuild days from free text.
fn parse_text(text: &str) -> Vec<DayEntry> {
    let mut days = Vec::new();
    let mut state = ScanState::NoActiveDay;

    for line in text.lines() {
        state = match (state, classify_line(line)) {
            (state, LineKind::Day { day, focus }) => {
                // A bare header followed directly by another header is discarded.
                if let ScanState::AccumulatingDay(open) = state {
                    if has_content(&open) {
                        days.push(open);
                    }
                }
                ScanState::AccumulatingDay(DayEntry::new(day, focus))
            }
            (ScanState::AccumulatingDay(mut open), LineKind::Warmup(note)) => {
                open.warmup = Some(note.to_string());
                ScanState::AccumulatingDay(open)
            }
            (ScanState::AccumulatingDay(mut open), LineKind::Cooldown(note)) => {
                open.cooldown = Some(note.to_string());
                ScanState::AccumulatingDay(open)
            }
            (ScanState::AccumulatingDay(mut open), LineKind::Exercise(exercise)) => {
                open.exercises.push(exercise);
                ScanState::AccumulatingDay(open)
            }
            (state, _) => state,
        };
    }

    if let ScanState::AccumulatingDay(open) = state {
        days.push(open);
    }
    days
}

fn has_content(day: &DayEntry) -> bool {
    !day.exercises.is_empty() || day.warmup.is_some() || day.cooldown.is_some()
}

/// Classify one line. Day lines win over notes, notes over exercises.
fn classify_line(raw: &str) -> LineKind<'_> {
    let line = raw.trim();
    if line.is_empty() {
        return LineKind::Ignored;
    }
    if is_day_line(line) {
        return LineKind::Day {
            day: day_label(line),
            focus: line,
        };
    }
    match note_kind(line) {
        Some(Note::Warmup) => return note_value(line).map_or(LineKind::Ignored, LineKind::Warmup),
        Some(Note::Cooldown) => {
            return note_value(line).map_or(LineKind::Ignored, LineKind::Cooldown);
        }
        None => {}
    }
    parse_exercise_line(line).map_or(LineKind::Ignored, LineKind::Exercise)
}

fn is_day_line(line: &str) -> bool {
    let lower = line.to_lowercase();
    WEEKDAYS.iter().any(|day| lower.contains(day))
}

/// Text before the first en-dash.
fn day_label(line: &str) -> &str {
    let label = line.split('–').next().unwrap_or(line).trim();
    if label.is_empty() { line } else { label }
}

enum Note {
    Warmup,
    Cooldown,
}

/// Matches "warmup", "warm-up" and "warm up" (and the cooldown spellings).
fn note_kind(line: &str) -> Option<Note> {
    let squashed: String = line
        .to_lowercase()
        .chars()
        .filter(|c| *c != '-' && !c.is_whitespace())
        .collect();
    if squashed.contains("warmup") {
        Some(Note::Warmup)
    } else if squashed.contains("cooldown") {
        Some(Note::Cooldown)
    } else {
        None
    }
}

/// Text after the last colon, if any remains.
fn note_value(line: &str) -> Option<&str> {
    let value = line.rsplit(':').next().unwrap_or(line).trim();
    (!value.is_empty()).then_some(value)
}

fn parse_exercise_line(line: &str) -> Option<ExerciseEntry> {
    if !line.contains(['•', '-']) {
        return None;
    }
    let body = line
        .trim_start_matches(|c: char| c == '•' || c == '-' || c == '*' || c.is_whitespace())
        .trim_end();
    if body.is_empty() {
        return None;
    }

    let (name, sets, reps) = match body.split_once('(') {
        Some((before, after)) => {
            let inner = after.split_once(')').map_or(after, |(inner, _)| inner);
            let (sets, reps) = parse_prescription(inner.trim());
            (before.trim(), sets, reps)
        }
        None => (body, DEFAULT_SETS, DEFAULT_REPS.to_string()),
    };
    let name = if name.is_empty() {
        DEFAULT_EXERCISE_NAME
    } else {
        name
    };
    Some(ExerciseEntry::new(name, sets, reps))
}

/// `"4 x 6-8"` gives four sets of "6-8"; anything else is a rep scheme.
///
/// The set count is the number directly before the first `x` that follows
/// a number, so words like "max" in the prescription do not split it.
fn parse_prescription(inner: &str) -> (u32, String) {
    for (at, marker) in inner.match_indices(['x', 'X', '×']) {
        let Some(sets) = inner[..at].split_whitespace().last() else {
            continue;
        };
        let reps = inner[at + marker.len()..].trim();
        match sets.parse::<u32>() {
            Ok(sets) if sets > 0 && !reps.is_empty() => return (sets, reps.to_string()),
            _ => {}
        }
    }
    if inner.is_empty() {
        (DEFAULT_SETS, DEFAULT_REPS.to_string())
    } else {
        (DEFAULT_SETS, inner.to_string())
    }
}

// ---------------------------------------------------------------------------
// Grouping
// ---------------------------------------------------------------------------

/// Merge same-label days in first-seen order and drop empty ones.
///
/// Each exercise is stamped with its source day's focus, warmup and
/// cooldown unless it already carries them. A merged day keeps its first
/// part's focus. Grouping a grouped plan changes nothing.
fn group_days(days: Vec<DayEntry>) -> Vec<DayEntry> {
    let mut groups: Vec<DayEntry> = Vec::new();

    for entry in days {
        let exercises: Vec<ExerciseEntry> = entry
            .exercises
            .into_iter()
            .map(|mut exercise| {
                exercise.category.get_or_insert_with(|| entry.focus.clone());
                if let Some(warmup) = &entry.warmup {
                    exercise.warmup.get_or_insert_with(|| warmup.clone());
                }
                if let Some(cooldown) = &entry.cooldown {
                    exercise.cooldown.get_or_insert_with(|| cooldown.clone());
                }
                exercise
            })
            .collect();

        match groups.iter_mut().find(|group| group.day == entry.day) {
            Some(group) => {
                group.exercises.extend(exercises);
                // A day-level note survives a merge only if every part agrees.
                if group.warmup != entry.warmup {
                    group.warmup = None;
                }
                if group.cooldown != entry.cooldown {
                    group.cooldown = None;
                }
            }
            None => groups.push(DayEntry {
                day: entry.day,
                focus: entry.focus,
                exercises,
                warmup: entry.warmup,
                cooldown: entry.cooldown,
            }),
        }
    }

    groups.retain(|group| {
        if group.exercises.is_empty() {
            debug!(day = %group.day, "dropping day with no exercises");
        }
        !group.exercises.is_empty()
    });
    groups
}
