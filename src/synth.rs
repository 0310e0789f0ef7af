//! Program synthesis: compiles an action plan into a typed, ordered list of
//! steps interpreted by a fixed dispatcher. The persisted form is the pretty
//! JSON of the step list, so a saved program is both inspectable and directly
//! reloadable; no generated source text is ever executed.

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use tokio::time::Duration;

use crate::client::{BrowserClient, BrowserOptions};
use crate::locator;
use crate::types::{Action, WebbotError};

/// Fixed settle delays, in milliseconds, baked into synthesized steps to let
/// page state stabilize before the next step.
pub const SETTLE_OPEN_MS: u64 = 2000;
pub const SETTLE_CLICK_MS: u64 = 1000;
pub const SETTLE_TYPE_MS: u64 = 800;
pub const SETTLE_DATE_MS: u64 = 500;
const SETTLE_SELECT_MS: u64 = 500;
const SETTLE_SUBMIT_MS: u64 = 1000;

/// One executable step of a synthesized program.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum Step {
    Navigate {
        url: String,
        settle_ms: u64,
    },
    Click {
        descriptor: String,
        settle_ms: u64,
    },
    Input {
        descriptor: Option<String>,
        text: String,
        settle_ms: u64,
    },
    SelectOption {
        descriptor: Option<String>,
        option: String,
    },
    InputDate {
        descriptor: Option<String>,
        value: String,
        settle_ms: u64,
    },
    Sleep {
        seconds: u64,
    },
    SubmitForm {
        settle_ms: u64,
    },
    /// Diagnostic-only step; emits a warning and changes no page state.
    Note {
        message: String,
    },
}

/// A runnable automation program: an ordered step list plus its execution
/// routine. Produced by [`synthesize`], optionally persisted as JSON by the
/// learning cache, and interpreted against a browser session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Program {
    pub steps: Vec<Step>,
}

/// Compile a plan into a program. Pure: the same plan always yields the same
/// program.
pub fn synthesize(plan: &[Action]) -> Program {
    let steps = plan
        .iter()
        .map(|action| match action {
            Action::Open { url } => Step::Navigate {
                url: url.clone(),
                settle_ms: SETTLE_OPEN_MS,
            },
            Action::Click { target } => Step::Click {
                descriptor: target.clone(),
                settle_ms: SETTLE_CLICK_MS,
            },
            Action::Type { target, value } => Step::Input {
                descriptor: target.clone(),
                text: value.clone(),
                settle_ms: SETTLE_TYPE_MS,
            },
            Action::Select { target, option } => Step::SelectOption {
                descriptor: target.clone(),
                option: option.clone(),
            },
            Action::PickDate { target, value } => Step::InputDate {
                descriptor: target.clone(),
                value: value.clone().unwrap_or_default(),
                settle_ms: SETTLE_DATE_MS,
            },
            Action::Wait { seconds } => Step::Sleep { seconds: *seconds },
            Action::Submit => Step::SubmitForm {
                settle_ms: SETTLE_SUBMIT_MS,
            },
            Action::Unknown { text } => Step::Note {
                message: format!("unknown action for clause: {text}"),
            },
        })
        .collect();
    Program { steps }
}

impl Program {
    /// Serializes the program to its persisted/inspectable form.
    pub fn to_json(&self) -> Result<String, WebbotError> {
        serde_json::to_string_pretty(self).map_err(|e| WebbotError::OperationError(e.to_string()))
    }

    /// Loads a program from its persisted form, validating its shape.
    /// A program that does not decode, or decodes to zero steps, is rejected
    /// before any browser resource is touched.
    pub fn from_json(text: &str) -> Result<Self, WebbotError> {
        let program: Program = serde_json::from_str(text)
            .map_err(|e| WebbotError::ProgramShapeError(e.to_string()))?;
        if program.steps.is_empty() {
            return Err(WebbotError::ProgramShapeError(
                "program has no steps".to_string(),
            ));
        }
        Ok(program)
    }

    /// Human-readable numbered listing, for previews and logs only.
    pub fn listing(&self) -> String {
        let mut out = String::new();
        for (i, step) in self.steps.iter().enumerate() {
            let line = match step {
                Step::Navigate { url, .. } => format!("navigate to {url}"),
                Step::Click { descriptor, .. } => format!("click '{descriptor}'"),
                Step::Input {
                    descriptor, text, ..
                } => format!(
                    "type '{text}' into {}",
                    descriptor.as_deref().unwrap_or("<first input>")
                ),
                Step::SelectOption { descriptor, option } => format!(
                    "select '{option}' in {}",
                    descriptor.as_deref().unwrap_or("<any option list>")
                ),
                Step::InputDate {
                    descriptor, value, ..
                } => format!(
                    "enter date '{value}' into {}",
                    descriptor.as_deref().unwrap_or("<unspecified field>")
                ),
                Step::Sleep { seconds } => format!("wait {seconds}s"),
                Step::SubmitForm { .. } => "submit the first form".to_string(),
                Step::Note { message } => format!("note: {message}"),
            };
            out.push_str(&format!("{:>3}. {line}\n", i + 1));
        }
        out
    }

    /// Execute every step, in order, against an existing session.
    ///
    /// Best-effort: a failed step is logged and skipped, never aborting the
    /// run. The returned flag is not lowered by individual step failures; it
    /// reports that the step loop itself ran to completion.
    pub async fn run(&self, client: &mut BrowserClient) -> bool {
        for (i, step) in self.steps.iter().enumerate() {
            debug!("step {}/{}: {step:?}", i + 1, self.steps.len());
            step.run(client).await;
        }
        true
    }

    /// Standalone entry point: creates its own session, runs the step
    /// routine, and guarantees teardown on every exit path. Lets a saved
    /// program be re-run without going through the execution engine.
    pub async fn run_standalone(&self, headless: bool) -> bool {
        crate::engine::run_program(self, BrowserOptions::default().headless(headless)).await
    }
}

async fn settle(ms: u64) {
    tokio::time::sleep(Duration::from_millis(ms)).await;
}

impl Step {
    /// Perform one step. All failure paths are handled here: the worst
    /// outcome of a step is a warning line.
    async fn run(&self, client: &mut BrowserClient) {
        match self {
            Step::Navigate { url, settle_ms } => {
                if let Err(e) = client.navigate(url).await {
                    warn!("navigation to {url} failed: {e}");
                }
                settle(*settle_ms).await;
            }
            Step::Click {
                descriptor,
                settle_ms,
            } => match locator::find_fuzzy(client, descriptor).await {
                // The settle only applies after a click that landed; a failed
                // click changes no page state worth waiting for.
                Some(el) => match el.click().await {
                    Ok(()) => settle(*settle_ms).await,
                    Err(e) => warn!("click on '{descriptor}' failed: {e}"),
                },
                None => warn!("could not find element to click: {descriptor}"),
            },
            Step::Input {
                descriptor,
                text,
                settle_ms,
            } => {
                let target = match descriptor {
                    Some(d) => locator::find_fuzzy(client, d).await,
                    None => None,
                };
                match target {
                    Some(el) => {
                        if let Err(e) = el.clear().await {
                            warn!("clearing field failed: {e}");
                        }
                        if let Err(e) = el.send_keys(text).await {
                            warn!("typing failed: {e}");
                        }
                        settle(*settle_ms).await;
                    }
                    None => {
                        let label = descriptor.as_deref().unwrap_or("<none>");
                        warn!("could not find element to type into: {label}; trying first input");
                        match locator::first_input(client).await {
                            Some(el) => {
                                if let Err(e) = el.send_keys(text).await {
                                    warn!("typing into first input failed: {e}");
                                }
                            }
                            None => warn!("no input element on page; skipping type step"),
                        }
                    }
                }
            }
            Step::SelectOption { descriptor, option } => {
                let target = match descriptor {
                    Some(d) => locator::find_fuzzy(client, d).await,
                    None => None,
                };
                match target {
                    Some(el) => {
                        if el.select_by_label(option).await.is_err() {
                            // not a native select; clicking is the next best thing
                            if let Err(e) = el.click().await {
                                warn!("selecting '{option}' failed: {e}");
                            }
                            settle(SETTLE_SELECT_MS).await;
                        }
                    }
                    None => match locator::option_with_text(client, option).await {
                        Some(opt) => {
                            if let Err(e) = opt.click().await {
                                warn!("clicking option '{option}' failed: {e}");
                            }
                        }
                        None => warn!("could not find option matching '{option}'"),
                    },
                }
            }
            Step::InputDate {
                descriptor,
                value,
                settle_ms,
            } => match descriptor {
                Some(d) => match locator::find_fuzzy(client, d).await {
                    Some(el) => {
                        if let Err(e) = el.send_keys(value).await {
                            warn!("entering date '{value}' failed: {e}");
                        }
                        settle(*settle_ms).await;
                    }
                    None => warn!("could not find date field: {d}"),
                },
                None => warn!("date step has no target; skipping"),
            },
            Step::Sleep { seconds } => {
                tokio::time::sleep(Duration::from_secs(*seconds)).await;
            }
            Step::SubmitForm { settle_ms } => match locator::first_form(client).await {
                Some(form) => {
                    if let Err(e) = form.submit().await {
                        warn!("form submit failed: {e}");
                    }
                    settle(*settle_ms).await;
                }
                None => warn!("no form on page; skipping submit"),
            },
            Step::Note { message } => warn!("{message}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_plan() -> Vec<Action> {
        vec![
            Action::Open {
                url: "https://x.test".to_string(),
            },
            Action::Type {
                target: Some("email".to_string()),
                value: "hello@x.com".to_string(),
            },
            Action::Wait { seconds: 5 },
            Action::Submit,
        ]
    }

    #[test]
    fn synthesis_is_pure_and_ordered() {
        let plan = sample_plan();
        let a = synthesize(&plan);
        let b = synthesize(&plan);
        assert_eq!(a, b);
        assert_eq!(a.steps.len(), plan.len());
        assert_eq!(
            a.steps[0],
            Step::Navigate {
                url: "https://x.test".to_string(),
                settle_ms: SETTLE_OPEN_MS,
            }
        );
        assert_eq!(a.steps[2], Step::Sleep { seconds: 5 });
    }

    #[test]
    fn settle_delays_are_fixed_per_kind() {
        let program = synthesize(&[
            Action::Click {
                target: "Go".to_string(),
            },
            Action::PickDate {
                target: Some("date".to_string()),
                value: Some("21/08/2025".to_string()),
            },
        ]);
        assert_eq!(
            program.steps[0],
            Step::Click {
                descriptor: "Go".to_string(),
                settle_ms: SETTLE_CLICK_MS,
            }
        );
        assert_eq!(
            program.steps[1],
            Step::InputDate {
                descriptor: Some("date".to_string()),
                value: "21/08/2025".to_string(),
                settle_ms: SETTLE_DATE_MS,
            }
        );
    }

    #[test]
    fn unknown_action_becomes_diagnostic_note() {
        let program = synthesize(&[Action::Unknown {
            text: "do something odd".to_string(),
        }]);
        assert!(matches!(&program.steps[0], Step::Note { message } if message.contains("odd")));
    }

    #[test]
    fn persisted_form_reloads() {
        let program = synthesize(&sample_plan());
        let json = program.to_json().unwrap();
        let reloaded = Program::from_json(&json).unwrap();
        assert_eq!(program, reloaded);
    }

    #[test]
    fn malformed_text_is_a_shape_error() {
        let err = Program::from_json("not a program").unwrap_err();
        assert!(matches!(err, WebbotError::ProgramShapeError(_)));
    }

    #[test]
    fn empty_step_list_is_a_shape_error() {
        let err = Program::from_json(r#"{"steps": []}"#).unwrap_err();
        assert!(matches!(err, WebbotError::ProgramShapeError(_)));
    }

    #[test]
    fn listing_numbers_every_step() {
        let listing = synthesize(&sample_plan()).listing();
        assert_eq!(listing.lines().count(), 4);
        assert!(listing.contains("navigate to https://x.test"));
        assert!(listing.contains("wait 5s"));
    }
}
