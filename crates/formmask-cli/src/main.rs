// # formmask - console form
//
// Thin integration layer: builds an in-memory form with the CPF, phone, CEP
// and address fields, binds a FormController to it, and lets the user drive
// it from stdin. All masking and lookup logic lives in formmask-core.
//
// ## Configuration
//
// All configuration is done via environment variables:
//
// - `FORMMASK_LOOKUP_URL`: ViaCEP base URL (default: https://viacep.com.br)
// - `FORMMASK_LOOKUP_TIMEOUT_SECS`: Request timeout in seconds (default: none)
// - `FORMMASK_LOG_LEVEL`: trace, debug, info, warn, error (default: info)
//
// ## Commands
//
// ```text
// cep 01001000      type into a field (replaces its value, then masks it)
// blur cep          move focus away from a field
// show              print every field
// quit              close the form and wait for pending lookups
// ```

use anyhow::Result;
use formmask_core::config::{DEFAULT_VIACEP_BASE_URL, FieldIds, FormConfig, LookupConfig};
use formmask_core::{
    Form, FormController, FormEvent, FormField, LookupRegistry, LookupStatus, MemoryForm,
    MemoryFormHandle,
};
use std::env;
use std::process::ExitCode;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::{mpsc, oneshot};
use tracing::{Level, error, info};
use tracing_subscriber::FmtSubscriber;

/// Exit codes for different termination scenarios
#[derive(Debug, Clone, Copy)]
enum FormmaskExitCode {
    /// Clean shutdown (normal exit)
    CleanShutdown = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Runtime error (unexpected failure)
    RuntimeError = 2,
}

impl From<FormmaskExitCode> for ExitCode {
    fn from(code: FormmaskExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Application configuration
struct Config {
    lookup_url: String,
    lookup_timeout_secs: Option<u64>,
    log_level: String,
}

impl Config {
    /// Load configuration from environment variables
    fn from_env() -> Result<Self> {
        let lookup_timeout_secs = match env::var("FORMMASK_LOOKUP_TIMEOUT_SECS") {
            Ok(raw) => Some(raw.trim().parse().map_err(|_| {
                anyhow::anyhow!(
                    "FORMMASK_LOOKUP_TIMEOUT_SECS must be a whole number of seconds. Got: {}",
                    raw
                )
            })?),
            Err(_) => None,
        };

        Ok(Self {
            lookup_url: env::var("FORMMASK_LOOKUP_URL")
                .unwrap_or_else(|_| DEFAULT_VIACEP_BASE_URL.to_string()),
            lookup_timeout_secs,
            log_level: env::var("FORMMASK_LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        })
    }

    /// Validate the configuration
    fn validate(&self) -> Result<()> {
        if let Some(timeout) = self.lookup_timeout_secs
            && !(1..=300).contains(&timeout)
        {
            anyhow::bail!(
                "FORMMASK_LOOKUP_TIMEOUT_SECS must be between 1 and 300 seconds. Got: {}",
                timeout
            );
        }

        match self.log_level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => anyhow::bail!(
                "FORMMASK_LOG_LEVEL '{}' is not valid. \
                Valid levels: trace, debug, info, warn, error",
                self.log_level
            ),
        }

        self.form_config().validate()?;
        Ok(())
    }

    /// Form configuration with default field ids and the configured lookup
    fn form_config(&self) -> FormConfig {
        FormConfig {
            lookup: LookupConfig::ViaCep {
                base_url: self.lookup_url.clone(),
                timeout_secs: self.lookup_timeout_secs,
            },
            ..FormConfig::default()
        }
    }
}

fn main() -> ExitCode {
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return FormmaskExitCode::ConfigError.into();
        }
    };

    if let Err(e) = config.validate() {
        eprintln!("Configuration validation error: {}", e);
        return FormmaskExitCode::ConfigError.into();
    }

    let log_level = match config.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return FormmaskExitCode::ConfigError.into();
    }

    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return FormmaskExitCode::RuntimeError.into();
        }
    };

    let result = rt.block_on(async {
        if let Err(e) = run_form(config).await {
            error!("Form error: {}", e);
            FormmaskExitCode::RuntimeError
        } else {
            FormmaskExitCode::CleanShutdown
        }
    });

    result.into()
}

/// Build the form and drive it from stdin
async fn run_form(config: Config) -> Result<()> {
    let registry = LookupRegistry::new();

    #[cfg(feature = "viacep")]
    formmask_viacep::register(&registry);

    let form_config = config.form_config();
    let lookup = registry.create_lookup(&form_config.lookup)?;
    info!("Using {} lookup at {}", lookup.service_name(), config.lookup_url);

    let field_ids = form_config.fields.clone();
    let (form, handle) = MemoryForm::new(field_ids.all());
    let form = Arc::new(form);
    let (controller, events) =
        FormController::bind(form.clone(), Arc::from(lookup), form_config)?;

    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    let mut controller_task =
        tokio::spawn(async move { controller.run_with_shutdown(shutdown_rx).await });
    let presenter_task = tokio::spawn(present(events));

    println!("Fields: {}", field_ids.all().join(", "));
    println!("Commands: <field> <text> | blur <field> | show | quit");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut shutdown_tx = Some(shutdown_tx);

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                if !handle_command(line.trim(), &handle, form.as_ref(), &field_ids) {
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted, aborting pending lookups");
                if let Some(tx) = shutdown_tx.take() {
                    let _ = tx.send(());
                }
                break;
            }
        }
    }

    // Closing the form lets the controller finish pending lookups; Ctrl-C
    // still aborts them
    drop(handle);
    let finished = match shutdown_tx.take() {
        Some(tx) => tokio::select! {
            result = &mut controller_task => result,
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted, aborting pending lookups");
                let _ = tx.send(());
                (&mut controller_task).await
            }
        },
        None => controller_task.await,
    };
    finished??;
    presenter_task.await?;

    print_fields(form.as_ref(), &field_ids);
    Ok(())
}

/// Apply one console command
///
/// Returns `false` when the user asked to quit.
fn handle_command(
    line: &str,
    handle: &MemoryFormHandle,
    form: &MemoryForm,
    ids: &FieldIds,
) -> bool {
    let (command, rest) = line.split_once(' ').unwrap_or((line, ""));
    match command {
        "" => {}
        "quit" | "exit" => return false,
        "show" => print_fields(form, ids),
        "blur" => handle.blur(rest.trim()),
        field if ids.all().contains(&field) => handle.input(field, rest),
        other => eprintln!("Unknown field or command: {}", other),
    }
    true
}

fn print_fields(form: &MemoryForm, ids: &FieldIds) {
    for id in ids.all() {
        let value = form.field(id).map(|field| field.value()).unwrap_or_default();
        println!("  {:<10} {}", id, value);
    }
}

/// Presentation layer: turn form events into console output
async fn present(mut events: mpsc::Receiver<FormEvent>) {
    while let Some(event) = events.recv().await {
        match event {
            FormEvent::MaskApplied { field, value } => println!("{} = {}", field, value),
            FormEvent::LookupFinished { status, .. } => {
                if let Some(message) = status.alert() {
                    eprintln!("ALERT: {}", message);
                } else if let LookupStatus::Filled(address) = status {
                    println!(
                        "Address: {}, {} - {}/{}",
                        address.street, address.neighborhood, address.city, address.state
                    );
                }
            }
            FormEvent::Started { .. } | FormEvent::Stopped { .. } => {}
        }
    }
}
