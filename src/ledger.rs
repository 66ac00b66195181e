use crate::models::{DayLedger, Document, Entry};
use chrono::{Local, NaiveDate};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Local calendar date as `YYYY-MM-DD`.
pub fn today_key() -> String {
    date_key(Local::now().date_naive())
}

pub fn date_key(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Canonical key for a date given in a URL. `today` is accepted as an alias.
pub fn resolve_date_key(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.eq_ignore_ascii_case("today") {
        return Some(today_key());
    }
    NaiveDate::parse_from_str(raw, DATE_FORMAT).ok().map(date_key)
}

/// Get-or-create: returns the ledger for `key`, inserting an empty one first
/// if the date has none yet. Mutates `doc`; the caller saves it.
pub fn ensure_day<'a>(doc: &'a mut Document, key: &str) -> &'a mut DayLedger {
    doc.days.entry(key.to_string()).or_default()
}

/// Appends an entry stamped at `now_ms`. Timestamps are unique within a day
/// so they can name an entry, and increase unless a stored entry already sits
/// at `i64::MAX`.
pub fn add_entry(
    doc: &mut Document,
    key: &str,
    now_ms: i64,
    note: &str,
    macros: [f64; 4],
) -> Entry {
    let day = ensure_day(doc, key);
    let timestamp = next_timestamp(&day.entries, now_ms);

    let [cals, p, c, f] = macros;
    let entry = Entry {
        timestamp,
        note: note.trim().to_string(),
        cals,
        p,
        c,
        f,
    };
    day.entries.push(entry.clone());
    entry
}

fn next_timestamp(entries: &[Entry], now_ms: i64) -> i64 {
    let taken = |ts: i64| entries.iter().any(|entry| entry.timestamp == ts);
    let candidate = match entries.last() {
        Some(last) if last.timestamp >= now_ms => last.timestamp.saturating_add(1),
        _ => now_ms,
    };
    if !taken(candidate) {
        return candidate;
    }

    // the top of the range is used, or a loaded file is out of order
    let mut ts = now_ms;
    while taken(ts) {
        ts = ts.wrapping_add(1);
    }
    ts
}

/// Removes the entry with `timestamp` from `key`. Returns whether one was removed.
pub fn remove_entry(doc: &mut Document, key: &str, timestamp: i64) -> bool {
    let Some(day) = doc.days.get_mut(key) else {
        return false;
    };
    match day.entries.iter().position(|entry| entry.timestamp == timestamp) {
        Some(index) => {
            day.entries.remove(index);
            true
        }
        None => false,
    }
}

/// Resets the day to an empty ledger. The date key stays in the document.
pub fn clear_day(doc: &mut Document, key: &str) {
    *ensure_day(doc, key) = DayLedger::default();
}

/// Weight and water are kept exactly as typed.
pub fn set_metrics(doc: &mut Document, key: &str, weight: &str, water: &str) {
    let day = ensure_day(doc, key);
    day.weight = weight.to_string();
    day.water = water.to_string();
}

pub fn find_entry<'a>(doc: &'a Document, key: &str, timestamp: i64) -> Option<&'a Entry> {
    doc.days
        .get(key)?
        .entries
        .iter()
        .find(|entry| entry.timestamp == timestamp)
}
