//! Feedback delivery channels used by the CLI.

use atlas_core::{Clipboard, FeedbackPayload, FeedbackTransport};
use reqwest::blocking::Client;
use reqwest::header::ACCEPT;
use std::io::Write;

/// Posts the payload as a JSON body.
///
/// Uses the blocking client's default request timeout.
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new() -> reqwest::Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("atlas-cli/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }
}

impl FeedbackTransport for HttpTransport {
    fn post(&self, endpoint: &str, payload: &FeedbackPayload) -> Result<(), String> {
        self.client
            .post(endpoint)
            .header(ACCEPT, "application/json")
            .json(payload)
            .send()
            .and_then(|response| response.error_for_status())
            .map(|_| ())
            .map_err(|err| err.to_string())
    }
}

/// Terminal stand-in for a clipboard: prints the message for the user to copy.
pub struct StdoutClipboard;

impl Clipboard for StdoutClipboard {
    fn copy(&self, text: &str) -> Result<(), String> {
        print_block(text).map_err(|err| err.to_string())
    }
}

fn print_block(text: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "----- copy the feedback below -----")?;
    writeln!(stdout, "{text}")?;
    writeln!(stdout, "-----------------------------------")?;
    stdout.flush()
}

#[cfg(test)]
mod tests {
    use super::HttpTransport;
    use atlas_core::{compose_feedback, FeedbackTransport};

    #[test]
    fn refused_connection_is_reported_not_panicked() {
        let transport = HttpTransport::new().expect("client");
        let payload = compose_feedback("It broke", &[]).expect("payload");
        let err = transport
            .post("http://127.0.0.1:9/feedback", &payload)
            .expect_err("nothing listens on the discard port");
        assert!(!err.is_empty());
    }
}
