//! Execution engine: validates a program's shape, owns the browser session
//! for exactly one run, and guarantees teardown on every exit path.

use log::{error, info, warn};

use crate::client::{BrowserClient, BrowserOptions};
use crate::synth::Program;

/// Run a program against a fresh browser session.
///
/// Creates exactly one session, hands it to the program's step routine, and
/// tears it down unconditionally afterwards. A teardown failure is logged and
/// suppressed so it can never overwrite the run's own outcome. Session
/// creation failure is reported as a failed run.
pub async fn run_program(program: &Program, options: BrowserOptions) -> bool {
    let mut client = match BrowserClient::connect(options).await {
        Ok(client) => client,
        Err(e) => {
            error!("session creation failed: {e}");
            return false;
        }
    };

    let success = program.run(&mut client).await;

    if let Err(e) = client.shutdown().await {
        warn!("session teardown failed (suppressed): {e}");
    }

    if success {
        info!("run finished: success");
    } else {
        info!("run finished: failed");
    }
    success
}

/// Load a persisted program and run it.
///
/// Shape validation happens first: a program text that does not decode to a
/// non-empty step list returns `false` without a browser session ever being
/// created, so a malformed program costs no resources.
pub async fn run_program_text(text: &str, options: BrowserOptions) -> bool {
    let program = match Program::from_json(text) {
        Ok(program) => program,
        Err(e) => {
            error!("refusing to run malformed program: {e}");
            return false;
        }
    };
    run_program(&program, options).await
}

#[cfg(test)]
mod tests {
    use super::*;

    // Shape rejection happens before session creation, so these run without
    // any WebDriver server present.
    #[tokio::test]
    async fn malformed_program_text_fails_without_a_session() {
        assert!(!run_program_text("definitely not json", BrowserOptions::default()).await);
    }

    #[tokio::test]
    async fn empty_program_text_fails_without_a_session() {
        assert!(!run_program_text(r#"{"steps": []}"#, BrowserOptions::default()).await);
    }

    // A failed connect to an absent server also yields `false`, so the two
    // tests above cannot distinguish "rejected before connecting" from
    // "connected and failed". This one can: the listener would see the TCP
    // handshake if a session were ever attempted.
    #[tokio::test]
    async fn malformed_program_never_reaches_the_webdriver() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.set_nonblocking(true).unwrap();
        let addr = listener.local_addr().unwrap();
        let options = BrowserOptions::default().webdriver_url(&format!("http://{addr}"));

        assert!(!run_program_text("definitely not json", options).await);

        match listener.accept() {
            Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => {}
            Ok(_) => panic!("a browser session was opened for a malformed program"),
            Err(e) => panic!("unexpected listener error: {e}"),
        }
    }
}
