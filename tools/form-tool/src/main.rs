//! Form reference administration tool.
//!
//! # Usage
//!
//! ```bash
//! # Build a new form reference and print it
//! cargo run -p form-tool -- new --form-url https://example.com/submit
//!
//! # Validate an existing form reference file
//! cargo run -p form-tool -- validate contact.json
//!
//! # Validate and publish a form reference under a key (uses REDIS_URL)
//! cargo run -p form-tool -- push --key contact contact.json
//! ```
//!
//! Exits 0 on success, exits 1 when validation fails.

use std::io::Read as _;
use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};

use formgate_relay::domain::types::{FormReference, MailgunCredsOverride, Redirects};
use formgate_relay::infra::redis::RedisStorage;
use formgate_relay::usecase::forms;

mod validate;

use validate::validate_form_reference;

#[derive(Parser)]
#[command(about = "Create, validate, and publish form references")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build a form reference from flags, validate it, and print its JSON.
    New {
        /// Absolute URL of the real submission endpoint
        #[arg(long)]
        form_url: String,

        /// Name of the field carrying the submitter's email address
        #[arg(long)]
        email_field_name: Option<String>,

        /// Redirect after the verification email is sent
        #[arg(long)]
        verify_redirect: Option<String>,

        /// Redirect after the form is relayed to its destination
        #[arg(long)]
        submit_redirect: Option<String>,

        /// From address override, "user@host" or "Name <user@host>"
        #[arg(long)]
        from_address: Option<String>,

        /// Subject override for the verification email
        #[arg(long)]
        subject: Option<String>,

        /// Plain-text body template; $LINK$ marks the redemption URL
        #[arg(long)]
        msg_text: Option<String>,

        /// HTML body template; $LINK$ marks the redemption URL
        #[arg(long)]
        msg_html: Option<String>,

        /// Mailgun API key override (stored with the form — see warning)
        #[arg(long)]
        mailgun_api_key: Option<String>,

        /// Mailgun API base URL override
        #[arg(long)]
        mailgun_api_base_url: Option<String>,
    },

    /// Validate a form reference JSON file ("-" reads stdin).
    Validate { file: PathBuf },

    /// Validate a form reference JSON file and write it into the forms
    /// partition under --key. Reads REDIS_URL from the environment.
    Push {
        #[arg(long)]
        key: String,
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let args = Args::parse();

    match args.command {
        Command::New {
            form_url,
            email_field_name,
            verify_redirect,
            submit_redirect,
            from_address,
            subject,
            msg_text,
            msg_html,
            mailgun_api_key,
            mailgun_api_base_url,
        } => {
            let redirects = match (verify_redirect, submit_redirect) {
                (None, None) => None,
                (verify, submit) => Some(Redirects { verify, submit }),
            };
            let mailgun_creds = match (mailgun_api_key, mailgun_api_base_url) {
                (None, None) => None,
                (api_key, api_base_url) => {
                    eprintln!(
                        "warning: credentials stored in a form reference are only as safe \
                         as the storage backend; prefer a separate deployment with its own \
                         process-level credentials"
                    );
                    Some(MailgunCredsOverride {
                        api_key,
                        api_base_url,
                    })
                }
            };
            let form = FormReference {
                form_url,
                email_field_name,
                redirects,
                mailgun_creds,
                from_address,
                subject,
                msg_text,
                msg_html,
            };
            check(&form)?;
            println!("{}", serde_json::to_string_pretty(&form)?);
        }

        Command::Validate { file } => {
            let form = load(&file)?;
            check(&form)?;
            println!("Form reference is valid.");
        }

        Command::Push { key, file } => {
            let form = load(&file)?;
            check(&form)?;

            let redis_url = std::env::var("REDIS_URL").context("REDIS_URL is not set")?;
            let pool = deadpool_redis::Config::from_url(&redis_url)
                .create_pool(Some(deadpool_redis::Runtime::Tokio1))
                .context("failed to create Redis pool")?;
            let storage = RedisStorage { pool };

            forms::push_form(&storage, &key, &form)
                .await
                .map_err(|e| anyhow::anyhow!("push failed: {e}"))?;
            println!("Pushed form reference under key {key:?}.");
        }
    }

    Ok(())
}

fn load(file: &PathBuf) -> Result<FormReference> {
    let contents = if file.to_str() == Some("-") {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("read stdin")?;
        buf
    } else {
        std::fs::read_to_string(file).with_context(|| format!("read {}", file.display()))?
    };
    serde_json::from_str(&contents).context("form reference is not valid JSON")
}

fn check(form: &FormReference) -> Result<()> {
    let errors = validate_form_reference(form);
    if errors.is_empty() {
        return Ok(());
    }
    for error in &errors {
        eprintln!("invalid form reference: {error}");
    }
    std::process::exit(1);
}
