//! `fieldops` — CLI client for the field-operations Odoo backend.
//!
//! Manages server contexts, authentication, and the day-to-day
//! operations: attendance, trips, audits, stock requests, catalog.
//! Think of it as `kubectl` for the field app's backend.

mod commands;
mod config;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::attendance::Who;
use commands::resource::ListFilters;
use fieldops_core::GeoPoint;

/// Field operations CLI tool.
#[derive(Parser, Debug)]
#[command(name = "fieldops", about = "Field operations CLI client")]
struct Cli {
    /// Path to client config file (default: ~/.fieldops/config.toml).
    #[arg(long = "config", global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Manage server contexts.
    #[command(name = "context")]
    Context {
        #[command(subcommand)]
        action: ContextAction,
    },

    /// Switch the current context.
    #[command(name = "use")]
    Use {
        #[command(subcommand)]
        what: UseWhat,
    },

    /// Login to the current context's server.
    Login {
        /// Login name.
        #[arg(long)]
        user: Option<String>,
        /// Password (not recommended — use interactive prompt).
        #[arg(long)]
        password: Option<String>,
    },

    /// Logout — clear the stored session and password.
    Logout,

    /// Get resource(s): products, categories, customers, users,
    /// employees, trips, locations, purposes, staff-locations, audits,
    /// stock-requests, wfh.
    Get {
        /// Resource type.
        resource: String,
        /// Optional record ID for a single get.
        id: Option<i64>,
        /// Text filter (name search where the resource supports it).
        #[arg(long)]
        search: Option<String>,
        /// Filter by day (YYYY-MM-DD), for trips.
        #[arg(long)]
        date: Option<String>,
        /// Filter by vehicle ID, for trips.
        #[arg(long)]
        vehicle: Option<i64>,
        /// Filter by company ID, for stock-requests.
        #[arg(long)]
        company: Option<i64>,
        /// Acting user ID, for wfh.
        #[arg(long)]
        user: Option<i64>,
        /// Limit results.
        #[arg(long)]
        limit: Option<u32>,
        /// Offset for pagination.
        #[arg(long)]
        offset: Option<u32>,
    },

    /// Create a resource from JSON: trips, audits, stock-requests.
    Create {
        /// Resource type.
        resource: String,
        /// JSON body.
        #[arg(long = "json")]
        json_body: Option<String>,
        /// Read JSON from file.
        #[arg(short = 'f', long = "file")]
        file: Option<String>,
    },

    /// Attendance operations.
    Attendance {
        #[command(subcommand)]
        action: AttendanceAction,
    },

    /// Trip operations.
    Trip {
        #[command(subcommand)]
        action: TripAction,
    },

    /// Audit operations.
    Audit {
        #[command(subcommand)]
        action: AuditAction,
    },

    /// Stock request operations.
    Stock {
        #[command(subcommand)]
        action: StockAction,
    },

    /// Locally saved form drafts.
    Draft {
        #[command(subcommand)]
        action: DraftAction,
    },

    /// Show version.
    Version,
}

#[derive(Subcommand, Debug)]
enum ContextAction {
    /// Create a new context.
    Create {
        /// Context name.
        name: String,
        /// Server URL.
        #[arg(long)]
        server: Option<String>,
        /// Database name.
        #[arg(long)]
        db: Option<String>,
    },
    /// List all contexts.
    List,
    /// Set properties on a context.
    Set {
        name: String,
        #[arg(long)]
        server: Option<String>,
        #[arg(long)]
        db: Option<String>,
    },
    /// Delete a context.
    Delete { name: String },
}

#[derive(Subcommand, Debug)]
enum UseWhat {
    /// Switch to a context.
    Context { name: String },
}

#[derive(clap::Args, Debug)]
struct WhoArgs {
    /// Employee record ID.
    #[arg(long)]
    employee: Option<i64>,
    /// Badge or PIN code.
    #[arg(long)]
    badge: Option<String>,
}

impl WhoArgs {
    fn who(&self) -> anyhow::Result<Who> {
        match (self.employee, &self.badge) {
            (Some(id), None) => Ok(Who::Employee(id)),
            (None, Some(code)) => Ok(Who::Badge(code.clone())),
            _ => anyhow::bail!("Provide exactly one of --employee or --badge."),
        }
    }
}

#[derive(Subcommand, Debug)]
enum AttendanceAction {
    /// Clock in.
    CheckIn {
        #[command(flatten)]
        who: WhoArgs,
        /// Device latitude; with --lon, enforces the workplace geofence.
        #[arg(long)]
        lat: Option<f64>,
        /// Device longitude.
        #[arg(long)]
        lon: Option<f64>,
        /// Photo file to attach.
        #[arg(long)]
        photo: Option<String>,
        /// Clock anyway when outside the geofence.
        #[arg(long)]
        force: bool,
    },
    /// Clock out.
    CheckOut {
        #[command(flatten)]
        who: WhoArgs,
        #[arg(long)]
        lat: Option<f64>,
        #[arg(long)]
        lon: Option<f64>,
        #[arg(long)]
        photo: Option<String>,
        /// Clock anyway when outside the geofence.
        #[arg(long)]
        force: bool,
    },
    /// Show today's attendance.
    Status {
        #[command(flatten)]
        who: WhoArgs,
    },
    /// Check a position against the workplace geofence.
    Verify {
        #[command(flatten)]
        who: WhoArgs,
        #[arg(long)]
        lat: f64,
        #[arg(long)]
        lon: f64,
    },
}

#[derive(Subcommand, Debug)]
enum TripAction {
    /// Cancel a trip.
    Cancel { id: i64 },
    /// Check a position against a named trip endpoint's geofence.
    Verify {
        /// Trip location name.
        #[arg(long)]
        location: String,
        #[arg(long)]
        lat: f64,
        #[arg(long)]
        lon: f64,
    },
    /// Report a user's live position.
    Locate {
        /// User ID.
        #[arg(long)]
        user: i64,
        #[arg(long)]
        lat: f64,
        #[arg(long)]
        lon: f64,
        /// Human-readable place name.
        #[arg(long, default_value = "")]
        name: String,
        /// Position accuracy in meters.
        #[arg(long)]
        accuracy: Option<f64>,
    },
}

#[derive(Subcommand, Debug)]
enum AuditAction {
    /// Move an audit to a new state.
    SetState { id: i64, state: String },
    /// Upload voucher files onto an audit.
    Attach {
        id: i64,
        /// Files to upload.
        files: Vec<String>,
    },
    /// List attachment metadata for an audit.
    Attachments { id: i64 },
}

#[derive(Subcommand, Debug)]
enum StockAction {
    /// Run a workflow action (action_approve, action_reject, ...).
    Action {
        id: i64,
        /// Workflow method name.
        action: String,
        /// Acting company ID.
        #[arg(long)]
        company: Option<i64>,
    },
    /// Patch editable fields on a request.
    Update {
        id: i64,
        #[arg(long)]
        note: Option<String>,
        #[arg(long)]
        urgency: Option<String>,
        #[arg(long = "rejection-reason")]
        rejection_reason: Option<String>,
        #[arg(long = "approval-note")]
        approval_note: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
enum DraftAction {
    /// List saved drafts.
    List,
    /// Print a draft as JSON.
    Show { name: String },
    /// Delete a draft.
    Discard { name: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();

    let config_path = cli
        .config
        .map(std::path::PathBuf::from)
        .unwrap_or_else(config::ClientConfig::default_path);

    match cli.command {
        Commands::Context { action } => match action {
            ContextAction::Create { name, server, db } => {
                commands::context::create(&name, server.as_deref(), db.as_deref(), &config_path)?;
            }
            ContextAction::List => {
                commands::context::list(&config_path)?;
            }
            ContextAction::Set { name, server, db } => {
                commands::context::set(&name, server.as_deref(), db.as_deref(), &config_path)?;
            }
            ContextAction::Delete { name } => {
                commands::context::delete(&name, &config_path)?;
            }
        },

        Commands::Use { what } => match what {
            UseWhat::Context { name } => {
                commands::context::use_context(&name, &config_path)?;
            }
        },

        Commands::Login { user, password } => {
            let username = user.unwrap_or_else(|| {
                eprint!("Login: ");
                let mut s = String::new();
                std::io::stdin().read_line(&mut s).unwrap_or_default();
                s.trim().to_string()
            });
            let password = password
                .unwrap_or_else(|| rpassword::prompt_password("Password: ").unwrap_or_default());
            commands::login::login(&username, &password, &config_path).await?;
        }

        Commands::Logout => {
            commands::login::logout(&config_path)?;
        }

        Commands::Get {
            resource,
            id,
            search,
            date,
            vehicle,
            company,
            user,
            limit,
            offset,
        } => {
            let filters = ListFilters {
                search,
                date,
                vehicle,
                company,
                user,
                limit,
                offset,
            };
            commands::resource::get(&resource, id, &filters, &config_path).await?;
        }

        Commands::Create {
            resource,
            json_body,
            file,
        } => {
            let body = if let Some(path) = file {
                std::fs::read_to_string(&path)?
            } else if let Some(json) = json_body {
                json
            } else {
                anyhow::bail!("Provide --json or -f <file>.");
            };
            commands::resource::create(&resource, &body, &config_path).await?;
        }

        Commands::Attendance { action } => match action {
            AttendanceAction::CheckIn {
                who,
                lat,
                lon,
                photo,
                force,
            } => {
                let position = point(lat, lon)?;
                commands::attendance::check_in(
                    &who.who()?,
                    position,
                    photo.as_deref(),
                    force,
                    &config_path,
                )
                .await?;
            }
            AttendanceAction::CheckOut {
                who,
                lat,
                lon,
                photo,
                force,
            } => {
                let position = point(lat, lon)?;
                commands::attendance::check_out(
                    &who.who()?,
                    position,
                    photo.as_deref(),
                    force,
                    &config_path,
                )
                .await?;
            }
            AttendanceAction::Status { who } => {
                commands::attendance::status(&who.who()?, &config_path).await?;
            }
            AttendanceAction::Verify { who, lat, lon } => {
                commands::attendance::verify(&who.who()?, GeoPoint::new(lat, lon), &config_path)
                    .await?;
            }
        },

        Commands::Trip { action } => match action {
            TripAction::Cancel { id } => {
                commands::trip::cancel(id, &config_path).await?;
            }
            TripAction::Verify { location, lat, lon } => {
                commands::trip::verify(&location, GeoPoint::new(lat, lon), &config_path).await?;
            }
            TripAction::Locate {
                user,
                lat,
                lon,
                name,
                accuracy,
            } => {
                commands::trip::locate(
                    user,
                    GeoPoint::new(lat, lon),
                    &name,
                    accuracy,
                    &config_path,
                )
                .await?;
            }
        },

        Commands::Audit { action } => match action {
            AuditAction::SetState { id, state } => {
                commands::audit::set_state(id, &state, &config_path).await?;
            }
            AuditAction::Attach { id, files } => {
                if files.is_empty() {
                    anyhow::bail!("Provide at least one file to attach.");
                }
                commands::audit::attach(id, &files, &config_path).await?;
            }
            AuditAction::Attachments { id } => {
                commands::audit::attachments(id, &config_path).await?;
            }
        },

        Commands::Stock { action } => match action {
            StockAction::Action {
                id,
                action,
                company,
            } => {
                commands::stock::action(id, &action, company, &config_path).await?;
            }
            StockAction::Update {
                id,
                note,
                urgency,
                rejection_reason,
                approval_note,
            } => {
                let patch = fieldops_stock::StockRequestPatch {
                    note,
                    urgency,
                    rejection_reason,
                    approval_note,
                    ..Default::default()
                };
                commands::stock::update(id, &patch, &config_path).await?;
            }
        },

        Commands::Draft { action } => match action {
            DraftAction::List => {
                commands::draft::list(&config_path)?;
            }
            DraftAction::Show { name } => {
                commands::draft::show(&name, &config_path)?;
            }
            DraftAction::Discard { name } => {
                commands::draft::discard(&name, &config_path)?;
            }
        },

        Commands::Version => {
            println!("fieldops cli v{}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}

/// Both-or-neither pairing of --lat/--lon.
fn point(lat: Option<f64>, lon: Option<f64>) -> anyhow::Result<Option<GeoPoint>> {
    match (lat, lon) {
        (Some(lat), Some(lon)) => Ok(Some(GeoPoint::new(lat, lon))),
        (None, None) => Ok(None),
        _ => anyhow::bail!("Provide both --lat and --lon, or neither."),
    }
}
