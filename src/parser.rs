//! Heuristic task parser: splits free-text task descriptions into clauses
//! and maps each clause to a typed [`Action`] through a fixed keyword table.
//! Parsing is pure and deterministic; extraction never fails, it degrades.

use regex::Regex;
use std::sync::LazyLock;

use crate::extract;
use crate::types::Action;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Trigger {
    Open,
    Click,
    Type,
    Select,
    Wait,
    Login,
    Submit,
    PickDate,
}

/// Trigger phrases scanned linearly: kind order and phrase order are the
/// tie-break, so this must stay an ordered slice, not a map. Note that
/// "select" sits in the click list before the select kind is ever reached,
/// matching the observed dispatch.
const TRIGGERS: &[(Trigger, &[&str])] = &[
    (Trigger::Open, &["open", "go to", "visit", "navigate"]),
    (Trigger::Click, &["click", "press", "tap", "select"]),
    (Trigger::Type, &["type", "enter", "fill", "write"]),
    (Trigger::Select, &["select", "choose"]),
    (Trigger::Wait, &["wait", "pause", "sleep", "hold"]),
    (Trigger::Login, &["login", "log in", "sign in"]),
    (Trigger::Submit, &["submit", "send", "confirm"]),
    (Trigger::PickDate, &["date", "pick", "choose date", "select date"]),
];

/// Clause delimiters: commas and semicolons anywhere, periods only when
/// sentence-final (so emails and URLs survive), and the connective words.
static CLAUSE_SPLIT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)[,;]+|\.+(?:\s+|$)|\band\b|\bthen\b|\bafter\b").expect("valid regex")
});

/// Case-insensitive substring search over ASCII trigger phrases. Returns the
/// byte offset of the first occurrence.
fn find_phrase(haystack: &str, phrase: &str) -> Option<usize> {
    let h = haystack.as_bytes();
    let p = phrase.as_bytes();
    if p.is_empty() || p.len() > h.len() {
        return None;
    }
    (0..=h.len() - p.len()).find(|&i| h[i..i + p.len()].eq_ignore_ascii_case(p))
}

/// Determine the primary trigger of a clause. The first phrase found anywhere
/// in the clause, scanning kinds then phrases in declared order, wins. The
/// remainder is the original-case text after the matched phrase.
fn find_trigger(clause: &str) -> Option<(Trigger, &str)> {
    for (trigger, phrases) in TRIGGERS {
        for phrase in *phrases {
            if let Some(idx) = find_phrase(clause, phrase) {
                let remainder = clause[idx + phrase.len()..].trim();
                return Some((*trigger, remainder));
            }
        }
    }
    None
}

fn split_clauses(task_text: &str) -> Vec<&str> {
    CLAUSE_SPLIT
        .split(task_text)
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .collect()
}

/// Compile a free-text task into an ordered action plan.
///
/// A non-empty `base_url` seeds the plan with a leading navigation; clauses
/// that only restate "open the homepage" are dropped since that navigation
/// already covers them. Consecutive opens collapse, keeping the earliest.
pub fn parse(task_text: &str, base_url: &str) -> Vec<Action> {
    let mut plan = Vec::new();
    if !base_url.is_empty() {
        plan.push(Action::Open {
            url: base_url.to_string(),
        });
    }

    for clause in split_clauses(task_text) {
        match find_trigger(clause) {
            Some((Trigger::Open, _)) => {
                if let Some(url) = extract::url(clause) {
                    plan.push(Action::Open { url });
                }
            }
            Some((Trigger::Click, remainder)) => {
                let target = extract::label(remainder)
                    .or_else(|| extract::label(clause))
                    .unwrap_or_else(|| remainder.to_string());
                plan.push(Action::Click { target });
            }
            Some((Trigger::Type, remainder)) => {
                let value = extract::quoted(remainder)
                    .or_else(|| extract::email(remainder))
                    .or_else(|| extract::last_token(clause))
                    .unwrap_or_else(|| remainder.to_string());
                let target = extract::guess_target(clause, remainder);
                plan.push(Action::Type { target, value });
            }
            Some((Trigger::Select, remainder)) => {
                let option = extract::label(remainder).unwrap_or_else(|| remainder.to_string());
                let target = extract::guess_target(clause, remainder);
                plan.push(Action::Select { target, option });
            }
            Some((Trigger::PickDate, remainder)) => {
                let value = extract::date(clause);
                let target = extract::guess_target(clause, remainder);
                plan.push(Action::PickDate { target, value });
            }
            Some((Trigger::Wait, remainder)) => {
                let seconds = extract::first_number(remainder).unwrap_or(2);
                plan.push(Action::Wait { seconds });
            }
            Some((Trigger::Submit, _)) | Some((Trigger::Login, _)) => {
                plan.push(Action::Submit);
            }
            None => plan.push(fallback_action(clause)),
        }
    }

    collapse_opens(plan)
}

/// No trigger phrase matched: degrade rather than abort. An '@' means the
/// clause is probably an email to type; a short clause is probably a label
/// to click; anything else is text to type somewhere.
fn fallback_action(clause: &str) -> Action {
    if clause.contains('@') {
        return Action::Type {
            target: Some("email".to_string()),
            value: extract::email(clause).unwrap_or_else(|| clause.trim().to_string()),
        };
    }
    if clause.split_whitespace().count() <= 4 {
        Action::Click {
            target: clause.trim().to_string(),
        }
    } else {
        Action::Type {
            target: None,
            value: clause.trim().to_string(),
        }
    }
}

fn collapse_opens(plan: Vec<Action>) -> Vec<Action> {
    let mut cleaned: Vec<Action> = Vec::with_capacity(plan.len());
    for action in plan {
        if action.is_open() && cleaned.last().is_some_and(Action::is_open) {
            continue;
        }
        cleaned.push(action);
    }
    cleaned
}
