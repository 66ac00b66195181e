use crate::confirm::ConfirmRequest;
use crate::format::format_number;
use crate::models::{DayView, GoalSet, HistoryDay, Macro, MacroColors, MacroProgress, Theme};
use chrono::{Local, TimeZone};
use std::fmt::Write;

/// Theme and macro colors every page is painted with.
pub struct PageContext<'a> {
    pub theme: Theme,
    pub colors: &'a MacroColors,
}

impl<'a> PageContext<'a> {
    pub fn new(theme: Theme, colors: &'a MacroColors) -> Self {
        Self { theme, colors }
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Tab {
    Today,
    History,
    Goals,
    Other,
}

pub fn render_day(ctx: &PageContext<'_>, view: &DayView, is_today: bool) -> String {
    let date = escape_html(&view.date);
    let mut body = String::new();

    let heading = if is_today { "Today".to_string() } else { date.clone() };
    let _ = write!(body, r#"<h1>{heading}</h1><p class="subtitle">{date}</p>"#);

    body.push_str(r#"<section class="card">"#);
    if !view.progress.goals_configured {
        body.push_str(r#"<p class="hint">Set a calorie goal and at least one macro goal to see progress. <a href="/goals">Goals</a></p>"#);
    }
    for which in Macro::ALL {
        body.push_str(&progress_bar(which, view.progress.get(which)));
    }
    body.push_str("</section>");

    let _ = write!(
        body,
        r#"<section class="card"><h2>Add food</h2>
<form method="post" action="/days/{date}/entries" class="grid">
  <input name="note" placeholder="Note" autocomplete="off" />
  <input name="cals" placeholder="kcal" inputmode="decimal" />
  <input name="p" placeholder="Protein g" inputmode="decimal" />
  <input name="c" placeholder="Carbs g" inputmode="decimal" />
  <input name="f" placeholder="Fat g" inputmode="decimal" />
  <button type="submit">Add</button>
</form></section>"#
    );

    body.push_str(r#"<section class="card"><h2>Entries</h2>"#);
    if view.entries.is_empty() {
        body.push_str(r#"<p class="hint">Nothing logged yet.</p>"#);
    } else {
        body.push_str(r#"<ul class="entries">"#);
        for entry in &view.entries {
            let note = if entry.note.is_empty() {
                "Food".to_string()
            } else {
                escape_html(&entry.note)
            };
            let _ = write!(
                body,
                r#"<li><div><strong>{note}</strong> <span class="muted">{time}</span><br />
<span class="cal">{cals} kcal</span> · <span class="p">P {p}</span> · <span class="c">C {c}</span> · <span class="f">F {f}</span></div>
<form method="post" action="/days/{date}/entries/{ts}/delete"><button class="ghost" type="submit">Delete</button></form></li>"#,
                time = entry_time(entry.timestamp),
                cals = format_number(entry.cals),
                p = format_number(entry.p),
                c = format_number(entry.c),
                f = format_number(entry.f),
                ts = entry.timestamp,
            );
        }
        body.push_str("</ul>");
    }
    body.push_str("</section>");

    let _ = write!(
        body,
        r#"<section class="card"><h2>Body</h2>
<form method="post" action="/days/{date}/metrics" class="grid">
  <input name="weight" placeholder="Weight" value="{weight}" inputmode="decimal" />
  <input name="water" placeholder="Water" value="{water}" inputmode="decimal" />
  <button type="submit">Save</button>
</form>
<form method="post" action="/days/{date}/clear"><button class="danger" type="submit">Clear day</button></form>
</section>"#,
        weight = escape_html(&view.weight),
        water = escape_html(&view.water),
    );

    let tab = if is_today { Tab::Today } else { Tab::Other };
    let back = if is_today { "/".to_string() } else { format!("/days/{date}") };
    layout(ctx, &view.date, tab, &back, &body)
}

pub fn render_history(ctx: &PageContext<'_>, days: &[HistoryDay]) -> String {
    let mut body = String::from(r#"<h1>History</h1><section class="card">"#);

    if days.is_empty() {
        body.push_str(r#"<p class="hint">No days logged yet.</p>"#);
    } else {
        body.push_str(r#"<ul class="entries">"#);
        for day in days {
            let date = escape_html(&day.date);
            let _ = write!(
                body,
                r#"<li><div><a href="/days/{date}"><strong>{date}</strong></a> <span class="muted">{count} entries</span><br />
<span class="cal">{cals} kcal</span> · <span class="p">P {p}</span> · <span class="c">C {c}</span> · <span class="f">F {f}</span>{metrics}</div></li>"#,
                count = day.entry_count,
                cals = format_number(day.totals.cals),
                p = format_number(day.totals.p),
                c = format_number(day.totals.c),
                f = format_number(day.totals.f),
                metrics = metrics_line(&day.weight, &day.water),
            );
        }
        body.push_str("</ul>");
    }
    body.push_str("</section>");

    layout(ctx, "History", Tab::History, "/history", &body)
}

pub fn render_goals(ctx: &PageContext<'_>, goals: &GoalSet) -> String {
    let mut body = String::from(
        r#"<h1>Goals</h1><section class="card"><form method="post" action="/goals" class="grid">"#,
    );
    for (name, which) in [("cals", Macro::Cals), ("p", Macro::Protein), ("c", Macro::Carbs), ("f", Macro::Fat)] {
        let value = goals.get(which);
        let shown = if value == 0 { String::new() } else { value.to_string() };
        let _ = write!(
            body,
            r#"<label>{label} ({unit})<input name="{name}" value="{shown}" inputmode="numeric" /></label>"#,
            label = which.label(),
            unit = which.unit(),
        );
    }
    body.push_str(r#"<button type="submit">Save goals</button></form></section>"#);

    body.push_str(r#"<section class="card"><h2>Colors</h2><form method="post" action="/colors" class="grid">"#);
    for (name, which) in [("cal", Macro::Cals), ("p", Macro::Protein), ("c", Macro::Carbs), ("f", Macro::Fat)] {
        let _ = write!(
            body,
            r#"<label>{label}<input type="color" name="{name}" value="{color}" /></label>"#,
            label = which.label(),
            color = escape_html(ctx.colors.get(which)),
        );
    }
    body.push_str(r#"<button type="submit">Save colors</button></form></section>"#);

    layout(ctx, "Goals", Tab::Goals, "/goals", &body)
}

pub fn render_confirm(ctx: &PageContext<'_>, request: &ConfirmRequest, cancel_to: &str) -> String {
    let body = format!(
        r#"<section class="card modal"><h2>{title}</h2><p>{text}</p>
<div class="actions">
  <form method="post" action="/confirm/{id}"><input type="hidden" name="accept" value="false" /><button class="ghost" type="submit">Cancel</button></form>
  <form method="post" action="/confirm/{id}"><input type="hidden" name="accept" value="true" /><button class="danger" type="submit">OK</button></form>
</div></section>"#,
        title = escape_html(&request.title),
        text = escape_html(&request.body),
        id = request.id,
    );
    layout(ctx, &request.title, Tab::Other, cancel_to, &body)
}

fn progress_bar(which: Macro, progress: &MacroProgress) -> String {
    let class = match which {
        Macro::Cals => "cal",
        Macro::Protein => "p",
        Macro::Carbs => "c",
        Macro::Fat => "f",
    };
    let goal = if progress.goal == 0 {
        String::new()
    } else {
        format!(" / {}", progress.goal)
    };
    format!(
        r#"<div class="bar"><div class="bar-label"><span>{label}</span><span>{total}{goal} {unit}</span></div>
<div class="track"><div class="fill {class}" style="width: {width:.1}%"></div></div></div>"#,
        label = which.label(),
        total = format_number(progress.total),
        unit = which.unit(),
        width = progress.ratio * 100.0,
    )
}

fn metrics_line(weight: &str, water: &str) -> String {
    let mut parts = Vec::new();
    if !weight.trim().is_empty() {
        parts.push(format!("Weight {}", escape_html(weight)));
    }
    if !water.trim().is_empty() {
        parts.push(format!("Water {}", escape_html(water)));
    }
    if parts.is_empty() {
        String::new()
    } else {
        format!(r#"<br /><span class="muted">{}</span>"#, parts.join(" · "))
    }
}

fn entry_time(timestamp: i64) -> String {
    Local
        .timestamp_millis_opt(timestamp)
        .single()
        .map(|at| at.format("%H:%M").to_string())
        .unwrap_or_default()
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

fn layout(ctx: &PageContext<'_>, title: &str, tab: Tab, back: &str, body: &str) -> String {
    let active = |which: Tab| if tab == which { "active" } else { "" };
    // body goes in last so user text is never scanned for placeholders
    LAYOUT_HTML
        .replace("{{THEME}}", ctx.theme.as_str())
        .replace("{{THEME_COLOR}}", match ctx.theme {
            Theme::Dark => "#07080b",
            Theme::Light => "#f6f7fb",
        })
        .replace("{{CAL}}", &escape_html(&ctx.colors.cal))
        .replace("{{P}}", &escape_html(&ctx.colors.p))
        .replace("{{C}}", &escape_html(&ctx.colors.c))
        .replace("{{F}}", &escape_html(&ctx.colors.f))
        .replace("{{TAB_TODAY}}", active(Tab::Today))
        .replace("{{TAB_HISTORY}}", active(Tab::History))
        .replace("{{TAB_GOALS}}", active(Tab::Goals))
        .replace("{{BACK}}", &escape_html(back))
        .replace("{{TITLE}}", &escape_html(title))
        .replace("{{BODY}}", body)
}

const LAYOUT_HTML: &str = r#"<!DOCTYPE html>
<html lang="en" data-theme="{{THEME}}">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0, maximum-scale=1.0" />
  <meta name="theme-color" content="{{THEME_COLOR}}" />
  <title>{{TITLE}} · Macros</title>
  <style>
    :root {
      --cal: {{CAL}};
      --p: {{P}};
      --c: {{C}};
      --f: {{F}};
    }

    [data-theme="dark"] {
      --bg: #07080b;
      --card: #12141a;
      --ink: #eef0f6;
      --muted: #8a8f9c;
      --line: #232733;
    }

    [data-theme="light"] {
      --bg: #f6f7fb;
      --card: #ffffff;
      --ink: #15171c;
      --muted: #6b7080;
      --line: #e2e4ec;
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      background: var(--bg);
      color: var(--ink);
      font-family: system-ui, -apple-system, "Segoe UI", sans-serif;
    }

    main {
      width: min(640px, 100%);
      margin: 0 auto;
      padding: 20px 16px 96px;
      display: grid;
      gap: 16px;
    }

    h1 {
      margin: 0;
      font-size: 1.8rem;
    }

    h2 {
      margin: 0 0 12px;
      font-size: 1.1rem;
    }

    a {
      color: inherit;
    }

    .subtitle,
    .muted,
    .hint {
      color: var(--muted);
    }

    .card {
      background: var(--card);
      border: 1px solid var(--line);
      border-radius: 18px;
      padding: 16px;
    }

    .grid {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(120px, 1fr));
      gap: 10px;
    }

    label {
      display: grid;
      gap: 6px;
      font-size: 0.85rem;
      color: var(--muted);
    }

    input {
      width: 100%;
      padding: 10px 12px;
      border-radius: 12px;
      border: 1px solid var(--line);
      background: var(--bg);
      color: var(--ink);
      font-size: 1rem;
    }

    input[type="color"] {
      padding: 2px;
      height: 42px;
    }

    button {
      padding: 10px 14px;
      border-radius: 12px;
      border: none;
      background: var(--cal);
      color: #07080b;
      font-weight: 600;
      font-size: 1rem;
      cursor: pointer;
    }

    button.ghost {
      background: transparent;
      color: var(--muted);
      border: 1px solid var(--line);
    }

    button.danger {
      background: #ff4b4b;
      color: #ffffff;
    }

    .bar {
      margin-bottom: 12px;
    }

    .bar-label {
      display: flex;
      justify-content: space-between;
      font-size: 0.9rem;
      margin-bottom: 6px;
    }

    .track {
      height: 10px;
      border-radius: 999px;
      background: var(--line);
      overflow: hidden;
    }

    .fill {
      height: 100%;
      border-radius: 999px;
      transition: width 300ms ease;
    }

    .fill.cal { background: var(--cal); }
    .fill.p { background: var(--p); }
    .fill.c { background: var(--c); }
    .fill.f { background: var(--f); }

    span.cal { color: var(--cal); }
    span.p { color: var(--p); }
    span.c { color: var(--c); }
    span.f { color: var(--f); }

    .entries {
      list-style: none;
      margin: 0;
      padding: 0;
      display: grid;
      gap: 10px;
    }

    .entries li {
      display: flex;
      justify-content: space-between;
      align-items: center;
      gap: 12px;
      padding-bottom: 10px;
      border-bottom: 1px solid var(--line);
    }

    .actions {
      display: flex;
      justify-content: flex-end;
      gap: 10px;
    }

    nav {
      position: fixed;
      bottom: 0;
      left: 0;
      right: 0;
      display: flex;
      justify-content: center;
      gap: 6px;
      padding: 10px;
      background: var(--card);
      border-top: 1px solid var(--line);
    }

    nav a,
    nav button {
      padding: 8px 14px;
      border-radius: 999px;
      text-decoration: none;
      color: var(--muted);
      background: transparent;
      font-size: 0.95rem;
    }

    nav a.active {
      color: var(--ink);
      background: var(--line);
    }

    nav form {
      margin: 0;
    }
  </style>
</head>
<body>
  <main>
{{BODY}}
  </main>
  <nav>
    <a class="{{TAB_TODAY}}" href="/">Today</a>
    <a class="{{TAB_HISTORY}}" href="/history">History</a>
    <a class="{{TAB_GOALS}}" href="/goals">Goals</a>
    <form method="post" action="/theme/toggle">
      <input type="hidden" name="back" value="{{BACK}}" />
      <button type="submit">Theme</button>
    </form>
  </nav>
</body>
</html>
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::confirm::DestructiveAction;
    use crate::models::{Document, GoalSet};
    use crate::stats::build_day_view;

    #[test]
    fn day_page_escapes_notes_and_draws_progress() {
        let mut doc = Document::default();
        doc.goals = GoalSet { cals: 2000, p: 150, c: 200, f: 70 };
        crate::ledger::add_entry(&mut doc, "2026-01-05", 1, "<b>fish & chips</b>", [1000.0, 75.0, 90.0, 40.0]);
        let view = build_day_view(&doc, "2026-01-05");
        let ctx = PageContext::new(Theme::Light, &doc.colors);

        let html = render_day(&ctx, &view, false);
        assert!(html.contains(r#"data-theme="light""#));
        assert!(html.contains("&lt;b&gt;fish &amp; chips&lt;/b&gt;"));
        assert!(!html.contains("<b>fish"));
        assert!(html.contains(r#"class="fill p" style="width: 50.0%""#));
        assert!(html.contains("1000 / 2000 kcal"));
        assert!(html.contains("/days/2026-01-05/entries/1/delete"));
        assert!(html.contains("--cal: #8b95ff;"));
    }

    #[test]
    fn day_page_hints_when_goals_are_unset() {
        let doc = Document::default();
        let view = build_day_view(&doc, "2026-01-05");
        let html = render_day(&PageContext::new(Theme::Dark, &doc.colors), &view, true);
        assert!(html.contains("Set a calorie goal"));
        assert!(html.contains("Nothing logged yet."));
        assert!(html.contains(r#"class="active" href="/""#));
    }

    #[test]
    fn confirm_page_offers_both_answers() {
        let colors = MacroColors::default();
        let request = ConfirmRequest {
            id: 9,
            title: "Clear day?".to_string(),
            body: "Remove everything?".to_string(),
            action: DestructiveAction::ClearDay {
                date: "2026-01-05".to_string(),
            },
        };
        let html = render_confirm(&PageContext::new(Theme::Dark, &colors), &request, "/days/2026-01-05");
        assert!(html.contains(r#"action="/confirm/9""#));
        assert!(html.contains(r#"name="accept" value="true""#));
        assert!(html.contains(r#"name="accept" value="false""#));
    }

    #[test]
    fn history_lists_metrics() {
        let colors = MacroColors::default();
        let days = vec![HistoryDay {
            date: "2026-01-05".to_string(),
            entry_count: 2,
            totals: Default::default(),
            weight: "80.1".to_string(),
            water: String::new(),
        }];
        let html = render_history(&PageContext::new(Theme::Dark, &colors), &days);
        assert!(html.contains("Weight 80.1"));
        assert!(!html.contains("Water"));
        assert!(html.contains("2 entries"));
    }
}
