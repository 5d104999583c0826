// SPDX-License-Identifier: MIT
// Copyright 2026 The Serena Care Authors

//! Serena Care command-line client
//!
//! Signs caregivers and doctors in to the Serena backend and exposes the
//! senior-scoped views (dispenser, prescriptions, symptoms, reports).

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use serena_care::{
    config::{Config, LogFormat},
    error::AppError,
    gate::GateOutcome,
    models::{NewSenior, PrescriptionDraft, SignInForm, SignUpForm, UserRole},
    schedule,
    session::AuthState,
    time_utils::{format_display, parse_timestamp},
    AppState,
};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "serena")]
#[command(about = "Serena Care - medication and symptom follow-up for seniors", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an account and log in
    Signup {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long, env = "SERENA_PASSWORD", hide_env_values = true)]
        password: String,
        /// caregiver or doctor
        #[arg(long, default_value = "caregiver")]
        role: UserRole,
    },

    /// Log in with e-mail and password
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "SERENA_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Forget the stored session
    Logout,

    /// Show the logged-in user
    Whoami,

    /// Seniors linked to the account
    #[command(subcommand)]
    Seniors(SeniorsCommand),

    /// Pill dispenser of the selected senior
    #[command(subcommand)]
    Dispenser(DispenserCommand),

    /// Prescriptions of the selected senior
    #[command(subcommand)]
    Prescriptions(PrescriptionsCommand),

    /// Symptoms reported for the selected senior, newest first
    Symptoms,

    /// Report for the selected senior
    #[command(subcommand)]
    Report(ReportCommand),
}

#[derive(Subcommand)]
enum SeniorsCommand {
    /// List seniors and mark the selected one
    List,
    /// Select the senior the other commands work on
    Select { id: String },
    /// Link an existing senior by ID
    Relate { id: String },
    /// Register a new senior
    Create {
        #[arg(long)]
        name: String,
        /// Birth date, dd/mm/yyyy
        #[arg(long)]
        birth_date: String,
        #[arg(long)]
        device_id: String,
    },
}

#[derive(Subcommand)]
enum DispenserCommand {
    /// Show the compartments
    Show,
    /// Put a medication in a compartment
    Set {
        /// Compartment position, 1-based
        position: usize,
        #[arg(long)]
        medication: String,
        #[arg(long, default_value = "1")]
        quantity: u32,
    },
    /// Empty a compartment
    Clear { position: usize },
    /// List the medication catalogue
    Medications,
}

#[derive(Subcommand)]
enum PrescriptionsCommand {
    /// List prescriptions
    List,
    /// Create a prescription (doctors only)
    Add(DraftArgs),
    /// Replace a prescription (doctors only)
    Edit {
        id: String,
        #[command(flatten)]
        draft: DraftArgs,
    },
    /// Delete a prescription (doctors only)
    Remove { id: String },
    /// Dose times for a prescription, or for a frequency and start time
    Times {
        id: Option<String>,
        #[arg(long)]
        frequency: Option<u32>,
        /// Start time, HH:MM
        #[arg(long)]
        start: Option<String>,
    },
}

#[derive(Subcommand)]
enum ReportCommand {
    /// Print the report summary
    Show,
    /// Write the report as an HTML file
    Export {
        #[arg(short, long, default_value = "report.html")]
        output: PathBuf,
    },
}

#[derive(Args)]
struct DraftArgs {
    #[arg(long)]
    medication: String,
    #[arg(long)]
    dosage: String,
    /// Hours between doses
    #[arg(long)]
    frequency: u32,
    /// Start, RFC 3339 or YYYY-MM-DD
    #[arg(long)]
    start: String,
    #[arg(long)]
    end: Option<String>,
    #[arg(long)]
    description: Option<String>,
}

impl DraftArgs {
    fn into_draft(self) -> anyhow::Result<PrescriptionDraft> {
        let start_date = parse_timestamp(&self.start)
            .with_context(|| format!("invalid start date {:?}", self.start))?;
        let end_date = match self.end.as_deref() {
            Some(raw) => Some(
                parse_timestamp(raw).with_context(|| format!("invalid end date {:?}", raw))?,
            ),
            None => None,
        };

        Ok(PrescriptionDraft {
            senior_id: String::new(),
            medication_id: self.medication,
            dosage: self.dosage,
            frequency: self.frequency,
            start_date,
            end_date,
            description: self.description,
        })
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            match e.downcast_ref::<AppError>() {
                Some(app) => {
                    tracing::debug!(error = %e, "Command failed");
                    eprintln!("error: {}", app.user_message());
                }
                None => eprintln!("error: {:#}", e),
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = Config::from_env().context("Failed to load configuration")?;
    init_logging(config.log_format, cli.verbose);
    tracing::debug!(api = %config.api_base_url, "Starting Serena Care client");

    let app = AppState::new(config)?;
    app.session.restore();

    match cli.command {
        Commands::Signup {
            name,
            email,
            password,
            role,
        } => {
            let form = SignUpForm {
                name,
                email,
                password,
                role,
            };
            let user = app.session.sign_up(&form).await?;
            println!("Welcome, {} ({}).", user.name, user.role);
        }

        Commands::Login { email, password } => {
            let user = app.session.sign_in(&SignInForm { email, password }).await?;
            println!("Logged in as {} ({}).", user.name, user.role);
        }

        Commands::Logout => {
            app.session.logout();
            println!("Logged out.");
        }

        Commands::Whoami => match app.session.state() {
            AuthState::Authenticated(user) => {
                println!("{} <{}> ({}), id {}", user.name, user.email, user.role, user.id)
            }
            _ => println!("Not logged in."),
        },

        Commands::Seniors(cmd) => seniors_command(&app, cmd).await?,
        Commands::Dispenser(cmd) => dispenser_command(&app, cmd).await?,
        Commands::Prescriptions(cmd) => prescriptions_command(&app, cmd).await?,

        Commands::Symptoms => {
            require_senior(&app).await?;
            let symptoms = app.symptoms_view().refresh().await?;
            if symptoms.is_empty() {
                println!("No symptoms reported.");
            }
            for s in symptoms {
                println!(
                    "{}  pain {:>2} ({})  {}",
                    format_display(s.created_at),
                    s.pain_level,
                    s.severity(),
                    s.description
                );
            }
        }

        Commands::Report(cmd) => {
            require_senior(&app).await?;
            let view = app.reports_view();
            let report = view.refresh().await?;
            match cmd {
                ReportCommand::Show => {
                    println!("Report: {}", report.senior_name.as_deref().unwrap_or("-"));
                    if let Some(summary) = &report.summary {
                        println!("{}", summary);
                    }
                    println!("Prescriptions: {}", report.prescriptions.len());
                    println!("Symptoms: {}", report.symptoms.len());
                    if let Some(avg) = report.average_pain() {
                        println!("Average pain: {:.1}", avg);
                    }
                }
                ReportCommand::Export { output } => {
                    let path = view.export_html(&output)?;
                    println!("Report written to {}", path.display());
                }
            }
        }
    }

    Ok(())
}

/// Fail unless a session was restored.
fn require_login(app: &AppState) -> anyhow::Result<()> {
    if !app.session.state().is_authenticated() {
        bail!("Not logged in. Run `serena login` first.");
    }
    Ok(())
}

/// Run the association gate; senior-scoped commands need it to pass.
async fn require_senior(app: &AppState) -> anyhow::Result<()> {
    require_login(app)?;
    match app.gate().check().await? {
        GateOutcome::Ready(_) => Ok(()),
        GateOutcome::NeedsAssociation => bail!(
            "No senior linked to this account. Run `serena seniors relate <id>` or `serena seniors create`."
        ),
    }
}

async fn seniors_command(app: &AppState, cmd: SeniorsCommand) -> anyhow::Result<()> {
    require_login(app)?;
    let mut gate = app.gate();

    match cmd {
        SeniorsCommand::List => match gate.check().await? {
            GateOutcome::Ready(seniors) => {
                let selected = app.session.seniors().selected().map(|s| s.id);
                for s in seniors {
                    let marker = if selected.as_deref() == Some(s.id.as_str()) { "*" } else { " " };
                    let age = s.age.map(|a| format!("{} years", a)).unwrap_or_default();
                    println!("{} {:>6}  {}  {}", marker, s.id, s.name, age);
                }
            }
            GateOutcome::NeedsAssociation => println!("No seniors linked yet."),
        },

        SeniorsCommand::Select { id } => {
            if let GateOutcome::NeedsAssociation = gate.check().await? {
                bail!("No seniors linked yet.");
            }
            let senior = app.session.select_senior(&id)?;
            println!("Selected {}.", senior.name);
        }

        SeniorsCommand::Relate { id } => {
            let senior = gate.relate(&id).await?;
            println!("Linked. Selected {}.", senior.name);
        }

        SeniorsCommand::Create {
            name,
            birth_date,
            device_id,
        } => {
            gate.choose_create();
            let senior = gate
                .create(&NewSenior {
                    name,
                    birth_date,
                    device_id,
                })
                .await?;
            println!("Registered. Selected {}.", senior.name);
        }
    }
    Ok(())
}

async fn dispenser_command(app: &AppState, cmd: DispenserCommand) -> anyhow::Result<()> {
    require_senior(app).await?;
    let view = app.dispenser_view();

    match cmd {
        DispenserCommand::Medications => {
            for m in view.medications().await? {
                println!("{:>6}  {}", m.id, m.name);
            }
        }
        DispenserCommand::Show => {
            let dispenser = view.refresh().await?;
            for slot in dispenser.slots() {
                if slot.is_empty() {
                    println!("{:>2}  (empty)", slot.position);
                } else {
                    println!("{:>2}  {} x{}", slot.position, slot.medication_name, slot.quantity);
                }
            }
        }
        DispenserCommand::Set {
            position,
            medication,
            quantity,
        } => {
            view.refresh().await?;
            let slot = view.save_slot(position, Some(&medication), quantity).await?;
            println!("{:>2}  {} x{}", slot.position, slot.medication_name, slot.quantity);
        }
        DispenserCommand::Clear { position } => {
            view.refresh().await?;
            view.save_slot(position, None, 0).await?;
            println!("Compartment {} cleared.", position);
        }
    }
    Ok(())
}

async fn prescriptions_command(app: &AppState, cmd: PrescriptionsCommand) -> anyhow::Result<()> {
    if let PrescriptionsCommand::Times {
        id: None,
        frequency,
        start,
    } = &cmd
    {
        let frequency = (*frequency).context("--frequency is required without a prescription ID")?;
        let start = schedule::parse_start_time(start.as_deref().unwrap_or("08:00"))?;
        let times = schedule::dosage_times(frequency, start)?;
        println!("{}", schedule::format_times(&times).join(", "));
        return Ok(());
    }

    require_senior(app).await?;
    let view = app.prescriptions_view();

    let list = match cmd {
        PrescriptionsCommand::List => view.refresh().await?,
        PrescriptionsCommand::Add(args) => view.create(args.into_draft()?).await?,
        PrescriptionsCommand::Edit { id, draft } => view.update(&id, draft.into_draft()?).await?,
        PrescriptionsCommand::Remove { id } => view.delete(&id).await?,
        PrescriptionsCommand::Times { id, .. } => {
            let id = id.unwrap_or_default();
            view.refresh().await?;
            let times = view.schedule(&id)?;
            println!("{}", schedule::format_times(&times).join(", "));
            return Ok(());
        }
    };

    if list.is_empty() {
        println!("No prescriptions.");
    }
    for p in list {
        let times = p
            .dosage_times()
            .map(|t| schedule::format_times(&t).join(", "))
            .unwrap_or_default();
        println!(
            "{:>6}  {}  {}  every {}h  [{}]",
            p.id,
            p.medication_label(),
            p.dosage,
            p.frequency,
            times
        );
    }
    Ok(())
}

/// Initialize logging to stderr, JSON or compact.
fn init_logging(format: LogFormat, verbose: bool) {
    let default = if verbose {
        "serena_care=debug,info"
    } else {
        "serena_care=info,warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(false)
                    .with_current_span(true)
                    .flatten_event(true)
                    .with_writer(std::io::stderr),
            )
            .init(),
        LogFormat::Pretty => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .compact()
                    .with_target(false)
                    .with_writer(std::io::stderr),
            )
            .init(),
    }
}
