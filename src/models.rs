use crate::format::lenient;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// The whole persisted state. Every field falls back to its default when
/// missing, so a loaded document is always complete.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Document {
    #[serde(deserialize_with = "lenient::or_default")]
    pub days: BTreeMap<String, DayLedger>,
    #[serde(deserialize_with = "lenient::or_default")]
    pub goals: GoalSet,
    #[serde(deserialize_with = "lenient::or_default")]
    pub colors: MacroColors,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct DayLedger {
    #[serde(deserialize_with = "lenient::or_default")]
    pub entries: Vec<Entry>,
    #[serde(deserialize_with = "lenient::text")]
    pub weight: String,
    #[serde(deserialize_with = "lenient::text")]
    pub water: String,
}

/// One logged food item. Stored in insertion order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    /// Milliseconds since the Unix epoch. Unique within its day.
    #[serde(rename = "ts", default, deserialize_with = "lenient::timestamp")]
    pub timestamp: i64,
    #[serde(default, deserialize_with = "lenient::text")]
    pub note: String,
    #[serde(default, deserialize_with = "lenient::number", serialize_with = "lenient::compact")]
    pub cals: f64,
    #[serde(default, deserialize_with = "lenient::number", serialize_with = "lenient::compact")]
    pub p: f64,
    #[serde(default, deserialize_with = "lenient::number", serialize_with = "lenient::compact")]
    pub c: f64,
    #[serde(default, deserialize_with = "lenient::number", serialize_with = "lenient::compact")]
    pub f: f64,
}

/// Daily targets. Zero means the target is unset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct GoalSet {
    #[serde(deserialize_with = "lenient::whole")]
    pub cals: u32,
    #[serde(deserialize_with = "lenient::whole")]
    pub p: u32,
    #[serde(deserialize_with = "lenient::whole")]
    pub c: u32,
    #[serde(deserialize_with = "lenient::whole")]
    pub f: u32,
}

impl GoalSet {
    pub fn get(&self, which: Macro) -> u32 {
        match which {
            Macro::Cals => self.cals,
            Macro::Protein => self.p,
            Macro::Carbs => self.c,
            Macro::Fat => self.f,
        }
    }

    /// A calorie target plus at least one macro target.
    pub fn is_configured(&self) -> bool {
        self.cals > 0 && (self.p > 0 || self.c > 0 || self.f > 0)
    }
}

/// Colors for the four macros. A missing, `null` or blank color falls back
/// to its palette value on load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "StoredColors")]
pub struct MacroColors {
    pub cal: String,
    pub p: String,
    pub c: String,
    pub f: String,
}

impl Default for MacroColors {
    fn default() -> Self {
        Self {
            cal: "#8b95ff".to_string(),
            p: "#ff4b4b".to_string(),
            c: "#c49a6c".to_string(),
            f: "#2aff62".to_string(),
        }
    }
}

#[derive(Deserialize)]
struct StoredColors {
    #[serde(default, deserialize_with = "lenient::optional_text")]
    cal: Option<String>,
    #[serde(default, deserialize_with = "lenient::optional_text")]
    p: Option<String>,
    #[serde(default, deserialize_with = "lenient::optional_text")]
    c: Option<String>,
    #[serde(default, deserialize_with = "lenient::optional_text")]
    f: Option<String>,
}

impl From<StoredColors> for MacroColors {
    fn from(stored: StoredColors) -> Self {
        let palette = MacroColors::default();
        Self {
            cal: stored.cal.unwrap_or(palette.cal),
            p: stored.p.unwrap_or(palette.p),
            c: stored.c.unwrap_or(palette.c),
            f: stored.f.unwrap_or(palette.f),
        }
    }
}

impl MacroColors {
    pub fn get(&self, which: Macro) -> &str {
        match which {
            Macro::Cals => &self.cal,
            Macro::Protein => &self.p,
            Macro::Carbs => &self.c,
            Macro::Fat => &self.f,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Macro {
    Cals,
    Protein,
    Carbs,
    Fat,
}

impl Macro {
    pub const ALL: [Macro; 4] = [Macro::Cals, Macro::Protein, Macro::Carbs, Macro::Fat];

    pub fn label(self) -> &'static str {
        match self {
            Macro::Cals => "Calories",
            Macro::Protein => "Protein",
            Macro::Carbs => "Carbs",
            Macro::Fat => "Fat",
        }
    }

    pub fn unit(self) -> &'static str {
        match self {
            Macro::Cals => "kcal",
            _ => "g",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    /// Anything other than `light` is the dark theme.
    pub fn parse(raw: &str) -> Self {
        if raw.trim() == "light" {
            Theme::Light
        } else {
            Theme::Dark
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Dark => "dark",
            Theme::Light => "light",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Totals {
    pub cals: f64,
    pub p: f64,
    pub c: f64,
    pub f: f64,
}

impl Totals {
    pub fn get(&self, which: Macro) -> f64 {
        match which {
            Macro::Cals => self.cals,
            Macro::Protein => self.p,
            Macro::Carbs => self.c,
            Macro::Fat => self.f,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MacroProgress {
    pub total: f64,
    pub goal: u32,
    pub ratio: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Progress {
    pub goals_configured: bool,
    pub cals: MacroProgress,
    pub p: MacroProgress,
    pub c: MacroProgress,
    pub f: MacroProgress,
}

impl Progress {
    pub fn get(&self, which: Macro) -> &MacroProgress {
        match which {
            Macro::Cals => &self.cals,
            Macro::Protein => &self.p,
            Macro::Carbs => &self.c,
            Macro::Fat => &self.f,
        }
    }
}

/// A day as the UI shows it: newest entries first, with totals and progress.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayView {
    pub date: String,
    pub entries: Vec<Entry>,
    pub weight: String,
    pub water: String,
    pub totals: Totals,
    pub progress: Progress,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryDay {
    pub date: String,
    pub entry_count: usize,
    pub totals: Totals,
    pub weight: String,
    pub water: String,
}

#[derive(Debug, Deserialize)]
pub struct NewEntryRequest {
    #[serde(default, deserialize_with = "lenient::text")]
    pub note: String,
    #[serde(default, deserialize_with = "lenient::number")]
    pub cals: f64,
    #[serde(default, deserialize_with = "lenient::number")]
    pub p: f64,
    #[serde(default, deserialize_with = "lenient::number")]
    pub c: f64,
    #[serde(default, deserialize_with = "lenient::number")]
    pub f: f64,
}

#[derive(Debug, Deserialize)]
pub struct MetricsRequest {
    #[serde(default, deserialize_with = "lenient::text")]
    pub weight: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub water: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct ColorsUpdate {
    pub cal: Option<String>,
    pub p: Option<String>,
    pub c: Option<String>,
    pub f: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ThemeBody {
    pub theme: String,
}

#[derive(Debug, Deserialize)]
pub struct ConfirmAnswer {
    pub accept: bool,
}

#[derive(Debug, Serialize)]
pub struct PendingConfirmation {
    pub id: u64,
    pub title: String,
    pub body: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Applied,
    Declined,
    Expired,
}

#[derive(Debug, Serialize)]
pub struct ConfirmOutcome {
    pub outcome: Outcome,
    pub day: Option<DayView>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let doc: Document = serde_json::from_str(r#"{"days":{"2026-01-05":{}}}"#).unwrap();
        assert_eq!(doc.goals, GoalSet::default());
        assert_eq!(doc.colors, MacroColors::default());
        let day = &doc.days["2026-01-05"];
        assert!(day.entries.is_empty());
        assert_eq!(day.weight, "");
        assert_eq!(day.water, "");
    }

    #[test]
    fn numeric_text_in_stored_entries_is_normalized() {
        let doc: Document = serde_json::from_str(
            r#"{"days":{"2026-01-05":{"entries":[{"ts":1,"note":"oats","cals":"1,200","p":null,"c":"x"}],"weight":81.5}},
                "goals":{"cals":1999.6,"p":"150","c":-4}}"#,
        )
        .unwrap();
        let day = &doc.days["2026-01-05"];
        assert_eq!(day.entries[0].cals, 1200.0);
        assert_eq!(day.entries[0].p, 0.0);
        assert_eq!(day.entries[0].c, 0.0);
        assert_eq!(day.entries[0].f, 0.0);
        assert_eq!(day.weight, "81.5");
        assert_eq!(doc.goals, GoalSet { cals: 2000, p: 150, c: 0, f: 0 });
    }

    fn stored_day(doc: &Document) -> &DayLedger {
        doc.days.get("2026-01-05").expect("day survives the load")
    }

    #[test]
    fn timestamp_as_text_or_float_keeps_the_document() {
        let doc: Document = serde_json::from_str(
            r#"{"days":{"2026-01-05":{"entries":[{"ts":"5","cals":10},{"ts":1700000000000.0,"cals":20},{"ts":null}]}},
                "goals":{"cals":2000}}"#,
        )
        .unwrap();
        let entries = &stored_day(&doc).entries;
        assert_eq!(entries[0].timestamp, 5);
        assert_eq!(entries[1].timestamp, 1_700_000_000_000);
        assert_eq!(entries[2].timestamp, 0);
        assert_eq!(doc.goals.cals, 2000);
    }

    #[test]
    fn null_or_blank_color_falls_back_per_field() {
        let doc: Document = serde_json::from_str(
            r##"{"days":{"2026-01-05":{}},"goals":{"cals":2000},"colors":{"p":null,"c":"","f":"#010203"}}"##,
        )
        .unwrap();
        assert_eq!(doc.days.len(), 1);
        assert_eq!(doc.goals.cals, 2000);
        assert_eq!(doc.colors.cal, "#8b95ff");
        assert_eq!(doc.colors.p, "#ff4b4b");
        assert_eq!(doc.colors.c, "#c49a6c");
        assert_eq!(doc.colors.f, "#010203");
    }

    #[test]
    fn null_sections_read_as_defaults() {
        let doc: Document = serde_json::from_str(
            r#"{"days":{"2026-01-05":{"entries":null,"weight":"80"}},"goals":null,"colors":null}"#,
        )
        .unwrap();
        assert_eq!(stored_day(&doc).weight, "80");
        assert!(stored_day(&doc).entries.is_empty());
        assert_eq!(doc.goals, GoalSet::default());
        assert_eq!(doc.colors, MacroColors::default());

        let doc: Document = serde_json::from_str(r#"{"days":null,"goals":{"cals":2000}}"#).unwrap();
        assert!(doc.days.is_empty());
        assert_eq!(doc.goals.cals, 2000);
    }

    #[test]
    fn integral_entry_values_serialize_without_fraction() {
        let entry = Entry {
            timestamp: 1_700_000_000_000,
            note: "rice".to_string(),
            cals: 500.0,
            p: 30.5,
            c: 50.0,
            f: 10.0,
        };
        let json = serde_json::to_string(&entry).unwrap();
        assert_eq!(
            json,
            r#"{"ts":1700000000000,"note":"rice","cals":500,"p":30.5,"c":50,"f":10}"#
        );
    }

    #[test]
    fn goals_configured_needs_calories_and_one_macro() {
        assert!(!GoalSet::default().is_configured());
        assert!(!GoalSet { cals: 2000, ..Default::default() }.is_configured());
        assert!(!GoalSet { p: 150, c: 200, f: 70, cals: 0 }.is_configured());
        assert!(GoalSet { cals: 2000, f: 70, ..Default::default() }.is_configured());
    }

    #[test]
    fn theme_parse_falls_back_to_dark() {
        assert_eq!(Theme::parse("light"), Theme::Light);
        assert_eq!(Theme::parse("dark"), Theme::Dark);
        assert_eq!(Theme::parse("solarized"), Theme::Dark);
        assert_eq!(Theme::Dark.toggled(), Theme::Light);
    }
}
