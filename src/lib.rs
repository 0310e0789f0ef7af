pub mod cache;
pub mod client;
pub mod engine;
pub mod extract;
pub mod locator;
pub mod parser;
pub mod synth;
pub mod types;

pub use cache::LearningCache;
pub use client::{BrowserClient, BrowserOptions};
pub use synth::{Program, Step, synthesize};
pub use types::{Action, TaskRecord, WebbotError};

/// Compile a free-text task into a runnable program: parse the task into an
/// action plan, then synthesize the plan. Pure and deterministic.
pub fn compile(task_text: &str, base_url: &str) -> Program {
    synth::synthesize(&parser::parse(task_text, base_url))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synth::Step;

    #[test]
    fn compile_goes_from_task_text_to_runnable_steps() {
        let task = "type 'bob' into username, type 'hunter2' into password, sign in";
        let program = compile(task, "https://exams.test/login");

        assert_eq!(program.steps.len(), 4);
        assert!(matches!(&program.steps[0], Step::Navigate { url, .. }
            if url == "https://exams.test/login"));
        assert!(matches!(&program.steps[3], Step::SubmitForm { .. }));
        assert_eq!(program, compile(task, "https://exams.test/login"));

        // the persisted form reloads to the same program
        let reloaded = Program::from_json(&program.to_json().unwrap()).unwrap();
        assert_eq!(program, reloaded);
    }
}
