//! Subcommand definitions and dispatch.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use log::warn;
use navigaite_core::db::open_db;
use navigaite_core::{
    init_logging, CoreConfig, Dashboard, DashboardCache, DashboardService, NewTask, ProfileUpdate,
    RecommendationBatch, RecommendationItem, RecommendationService, TaskService, UserService,
};
use serde::Serialize;
use std::io::Read;
use std::path::PathBuf;

/// Student task planner backed by a local SQLite store.
#[derive(Parser, Debug)]
#[command(name = "navigaite", version, about, long_about = None)]
pub struct Cli {
    /// Opaque student identity
    #[arg(long, short, global = true, env = "NAVIGAITE_USER", default_value = "")]
    pub user: String,

    /// Database file (defaults to <data dir>/user_tasks.db)
    #[arg(long, global = true, env = "NAVIGAITE_DB_PATH")]
    pub db: Option<PathBuf>,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pub pretty: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show profile and full task list
    Dashboard,
    /// List tasks with resources
    Tasks,
    /// Add a manual task
    AddTask {
        #[arg(long)]
        title: String,
        #[arg(long)]
        note: Option<String>,
        #[arg(long)]
        due_date: Option<String>,
    },
    /// Mark a task done or not done
    ToggleTask {
        task_id: String,
        #[arg(long, action = clap::ArgAction::Set)]
        done: bool,
    },
    /// Acknowledge that recommendations are current
    ClearRecalc,
    /// Replace agent tasks with a JSON array read from a file or stdin
    SetRecommendations {
        /// JSON file; reads stdin when omitted
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// Update profile fields
    UpdateProfile(ProfileArgs),
}

#[derive(Args, Debug, Clone)]
pub struct ProfileArgs {
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    gpa: Option<f64>,
    #[arg(long)]
    sat: Option<i64>,
    #[arg(long)]
    major: Option<String>,
    #[arg(long)]
    financial_need: Option<String>,
    /// Repeat to set the full interest list
    #[arg(long = "interest")]
    interests: Vec<String>,
    /// Repeat to set the full extracurricular list
    #[arg(long = "extracurricular")]
    extracurriculars: Vec<String>,
}

impl From<ProfileArgs> for ProfileUpdate {
    fn from(args: ProfileArgs) -> Self {
        Self {
            name: args.name,
            gpa: args.gpa,
            sat: args.sat,
            intended_major: args.major,
            financial_need: args.financial_need,
            interests: (!args.interests.is_empty()).then_some(args.interests),
            extracurriculars: (!args.extracurriculars.is_empty()).then_some(args.extracurriculars),
        }
    }
}

#[derive(Serialize)]
struct ToggleResponse {
    updated: bool,
    dashboard: Dashboard,
}

#[derive(Serialize)]
struct ClearRecalcResponse {
    cleared: bool,
    dashboard: Dashboard,
}

#[derive(Serialize)]
struct RecommendationsResponse {
    #[serde(flatten)]
    batch: RecommendationBatch,
    dashboard: Dashboard,
}

impl Cli {
    pub fn run(self) -> Result<()> {
        let mut config = CoreConfig::from_env();
        if let Some(db) = self.db.clone() {
            config.db_path = db;
        }
        if let Err(err) = init_logging(&config.log_level, &config.log_dir) {
            eprintln!("warning: file logging disabled: {err}");
        }

        let mut conn = open_db(&config.db_path)
            .with_context(|| format!("opening {}", config.db_path.display()))?;
        let user = self.user.as_str();
        let mut cache = DashboardCache::new();

        match &self.command {
            Command::Dashboard => {
                let dashboard = DashboardService::new(&mut conn).get_dashboard(user)?;
                self.emit(&dashboard)
            }
            Command::Tasks => {
                let tasks = TaskService::new(&mut conn).list_tasks(user)?;
                self.emit(&tasks)
            }
            Command::AddTask {
                title,
                note,
                due_date,
            } => {
                let request = NewTask {
                    title: title.clone(),
                    note: note.clone(),
                    due_date: due_date.clone(),
                };
                let task = TaskService::new(&mut conn).add_task(user, &request)?;
                self.emit(&task)
            }
            Command::ToggleTask { task_id, done } => {
                let updated = TaskService::new(&mut conn).toggle_task(user, task_id, *done)?;
                if !updated {
                    warn!("event=toggle_task module=cli status=not_found");
                }
                let dashboard = cache.refresh(&mut conn, user)?.clone();
                self.emit(&ToggleResponse { updated, dashboard })
            }
            Command::ClearRecalc => {
                let cleared = RecommendationService::new(&mut conn).clear_needs_recalc(user)?;
                let dashboard = cache.refresh(&mut conn, user)?.clone();
                self.emit(&ClearRecalcResponse { cleared, dashboard })
            }
            Command::SetRecommendations { file } => {
                let items = read_recommendations(file.as_ref())?;
                let batch =
                    RecommendationService::new(&mut conn).set_recommendations(user, &items)?;
                let dashboard = cache.refresh(&mut conn, user)?.clone();
                self.emit(&RecommendationsResponse { batch, dashboard })
            }
            Command::UpdateProfile(args) => {
                let update = ProfileUpdate::from(args.clone());
                let profile = UserService::new(&mut conn).update_profile(user, &update)?;
                self.emit(&profile)
            }
        }
    }

    fn emit<T: Serialize>(&self, value: &T) -> Result<()> {
        let text = if self.pretty {
            serde_json::to_string_pretty(value)?
        } else {
            serde_json::to_string(value)?
        };
        println!("{text}");
        Ok(())
    }
}

fn read_recommendations(file: Option<&PathBuf>) -> Result<Vec<RecommendationItem>> {
    let raw = match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?,
        None => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("reading recommendations from stdin")?;
            buffer
        }
    };
    serde_json::from_str(&raw).context("recommendations must be a JSON array of items")
}
