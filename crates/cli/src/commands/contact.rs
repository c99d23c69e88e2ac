//! Contact form command.
//!
//! Drives a [`ContactForm`] from the terminal: prompts for any field not
//! given as a flag, posts the payload, and reports the outcome. On failure
//! the `mailto:` fallback link is printed so the message is never lost.
//!
//! # Usage
//!
//! ```bash
//! # Interactive
//! bl-cli contact
//!
//! # Scripted
//! bl-cli contact -n "Jane" -e jane@example.com -s "Billing" -p "Latency" -c "p99 is 4s"
//! ```

use std::io::{self, BufRead, Write};
use std::time::Duration;

use blacklake_core::{
    ContactForm, ContactRequest, ContactResponse, Field, FormError, SubmissionStatus, SubmitResult,
};
use chrono::Utc;
use clap::Args;
use thiserror::Error;

/// Errors that can occur while running the contact command.
#[derive(Debug, Error)]
pub enum ContactError {
    /// Reading from stdin or writing to stdout failed.
    #[error("Terminal I/O error: {0}")]
    Io(#[from] io::Error),

    /// The form refused to submit.
    #[error("Form error: {0}")]
    Form(#[from] FormError),

    /// The HTTP client could not be built.
    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),

    /// The submission ended in the error state.
    #[error("{0}")]
    NotSent(String),
}

/// Arguments for `bl-cli contact`.
#[derive(Debug, Args)]
pub struct ContactArgs {
    /// Contact endpoint URL
    #[arg(
        long,
        env = "CONTACT_ENDPOINT",
        default_value = "http://localhost:3000/api/contact"
    )]
    pub endpoint: String,

    /// Address used for the mailto fallback link
    #[arg(long, env = "CONTACT_TO_EMAIL", default_value = "hello@blacklake.dev")]
    pub to: String,

    /// Your name
    #[arg(short, long)]
    pub name: Option<String>,

    /// Your email address
    #[arg(short, long)]
    pub email: Option<String>,

    /// System in scope
    #[arg(short, long)]
    pub system: Option<String>,

    /// Primary constraint
    #[arg(short, long)]
    pub primary_constraint: Option<String>,

    /// Additional context
    #[arg(short, long)]
    pub context: Option<String>,

    /// Minimum time between mounting the form and posting it
    #[arg(long, default_value_t = 2_000)]
    pub dwell_ms: u64,
}

impl ContactArgs {
    fn preset(&self, field: Field) -> Option<&str> {
        match field {
            Field::Name => self.name.as_deref(),
            Field::Email => self.email.as_deref(),
            Field::SystemInScope => self.system.as_deref(),
            Field::PrimaryConstraint => self.primary_constraint.as_deref(),
            Field::Context => self.context.as_deref(),
        }
    }
}

/// Fill in and submit the contact form.
///
/// # Errors
///
/// Returns `ContactError::NotSent` with the form's error message if the
/// server rejected the submission or could not be reached.
pub async fn run(args: ContactArgs) -> Result<(), ContactError> {
    let mut form = ContactForm::mount(Utc::now().timestamp_millis());

    {
        let stdin = io::stdin();
        let mut input = stdin.lock();
        let mut output = io::stdout().lock();
        fill(&mut form, &args, &mut input, &mut output)?;
    }

    wait_for_dwell(&form, args.dwell_ms).await;

    let payload = form.begin_submit()?;
    tracing::info!(endpoint = %args.endpoint, "Submitting contact form");

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(20))
        .build()?;
    let result = post(&client, &args.endpoint, &payload).await;

    let mut output = io::stdout().lock();
    match form.finish(result)? {
        SubmissionStatus::Success => {
            writeln!(output, "Thanks. Your message is on its way.")?;
            Ok(())
        }
        SubmissionStatus::Error { message } => {
            let message = message.clone();
            writeln!(output, "{message}")?;
            writeln!(output, "Email us instead: {}", form.mailto_link(&args.to))?;
            Err(ContactError::NotSent(message))
        }
        status => Err(ContactError::NotSent(format!(
            "unexpected form state: {}",
            status.name()
        ))),
    }
}

/// Populate every field, prompting for those not passed as flags.
fn fill<R: BufRead, W: Write>(
    form: &mut ContactForm,
    args: &ContactArgs,
    input: &mut R,
    output: &mut W,
) -> io::Result<()> {
    for field in Field::ALL {
        let value = match args.preset(field) {
            Some(value) => value.to_string(),
            None => prompt(input, output, field)?,
        };
        form.set(field, value);
    }
    Ok(())
}

/// Ask for one field and read a single line.
fn prompt<R: BufRead, W: Write>(input: &mut R, output: &mut W, field: Field) -> io::Result<String> {
    if field.is_required() {
        write!(output, "{}: ", field.label())?;
    } else {
        write!(output, "{} (optional): ", field.label())?;
    }
    output.flush()?;

    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

/// Sleep until the form has been mounted for at least `dwell_ms`.
async fn wait_for_dwell(form: &ContactForm, dwell_ms: u64) {
    let elapsed = Utc::now().timestamp_millis() - form.mounted_at_ms();
    let elapsed = u64::try_from(elapsed).unwrap_or(0);
    if elapsed < dwell_ms {
        tokio::time::sleep(Duration::from_millis(dwell_ms - elapsed)).await;
    }
}

/// Post the payload and classify the outcome for the form controller.
async fn post(client: &reqwest::Client, endpoint: &str, payload: &ContactRequest) -> SubmitResult {
    let response = match client.post(endpoint).json(payload).send().await {
        Ok(response) => response,
        Err(e) => {
            tracing::warn!(error = %e, "Contact request failed");
            return SubmitResult::Network(e.to_string());
        }
    };

    let status = response.status();
    if status.is_success() {
        return SubmitResult::Ok;
    }

    let body = response.json::<ContactResponse>().await.ok();
    tracing::info!(status = status.as_u16(), "Contact request rejected");
    SubmitResult::Rejected {
        status: status.as_u16(),
        body,
    }
}
