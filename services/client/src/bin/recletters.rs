//! services/client/src/bin/recletters.rs
//!
//! `recletters`: a terminal front-end over the recommendation-letter backend.

use chrono::NaiveDateTime;
use clap::{Parser, Subcommand};
use client_lib::{config::Config, error::ClientError, state::AppState, sync::ListView};
use recletters_core::{
    authz::navigation_menu,
    domain::CurrentUser,
    mutation::{Mutation, NewRecommendationRequest, RequestChanges, WIRE_DATE_FORMAT},
    route::Route,
    transitions::StatusAction,
    RecommendationRequest,
};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "recletters", about = "Recommendation letter requests client")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show the signed-in user, their roles and menu.
    Whoami,
    /// Print the list a page shows, e.g. `/requests/pending`.
    List {
        #[arg(default_value = "/requests/pending")]
        path: String,
    },
    /// Create a request type (admin).
    CreateType {
        #[arg(long)]
        name: String,
    },
    /// Rename a request type (admin).
    EditType {
        #[arg(long)]
        id: i64,
        #[arg(long)]
        name: String,
    },
    /// Delete a request type (admin).
    DeleteType {
        #[arg(long)]
        id: i64,
    },
    /// Ask a professor for a recommendation.
    Request {
        #[arg(long)]
        professor_id: i64,
        #[arg(long)]
        kind: String,
        #[arg(long, default_value = "")]
        details: String,
        /// Due date, e.g. 2024-06-01T12:00:00.
        #[arg(long, value_parser = parse_date)]
        due: NaiveDateTime,
    },
    /// Change fields of one of your requests.
    EditRequest {
        #[arg(long)]
        id: i64,
        #[arg(long)]
        professor_id: Option<i64>,
        #[arg(long)]
        kind: Option<String>,
        #[arg(long)]
        details: Option<String>,
        #[arg(long, value_parser = parse_date)]
        due: Option<NaiveDateTime>,
    },
    /// Delete a request through the endpoint your role allows.
    DeleteRequest {
        #[arg(long)]
        id: i64,
    },
    /// Accept, deny or complete a request (professor).
    Transition {
        #[arg(long)]
        id: i64,
        #[arg(long)]
        action: StatusAction,
    },
    Logout,
}

fn parse_date(raw: &str) -> Result<NaiveDateTime, String> {
    NaiveDateTime::parse_from_str(raw, WIRE_DATE_FORMAT).map_err(|e| e.to_string())
}

#[tokio::main]
async fn main() -> Result<(), ClientError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let cli = Cli::parse();
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
    info!(backend = %config.backend_url, "Configuration loaded");

    // --- 2. Build the Shared AppState & Resolve the Session ---
    let app = AppState::build(config, Route::Home)?;
    let user = app.current_user().await?;

    // --- 3. Run the Command ---
    match cli.command {
        Commands::Whoami => print_user(&user),
        Commands::List { path } => {
            let view = ListView::mount(&app.store, Some(&user), Route::parse(&path)).await?;
            print_view(&view);
        }
        Commands::CreateType { name } => {
            let mutation = Mutation::CreateRequestType { request_type: name };
            app.mutations.mutate(Some(&user), &mutation).await?;
        }
        Commands::EditType { id, name } => {
            let mutation = Mutation::UpdateRequestType { id, request_type: name };
            app.mutations.mutate(Some(&user), &mutation).await?;
        }
        Commands::DeleteType { id } => {
            app.mutations.mutate(Some(&user), &Mutation::DeleteRequestType { id }).await?;
        }
        Commands::Request { professor_id, kind, details, due } => {
            let mutation = Mutation::CreateRecommendationRequest(NewRecommendationRequest {
                professor_id,
                recommendation_type: kind,
                details,
                due_date: due,
            });
            app.mutations.mutate(Some(&user), &mutation).await?;
        }
        Commands::EditRequest { id, professor_id, kind, details, due } => {
            let request = load_request(&app, &user, id).await?;
            let changes = RequestChanges {
                professor_id,
                recommendation_type: kind,
                details,
                due_date: due,
            };
            let mutation = Mutation::UpdateRecommendationRequest { request, changes };
            app.mutations.mutate(Some(&user), &mutation).await?;
        }
        Commands::DeleteRequest { id } => {
            let request = load_request(&app, &user, id).await?;
            let mutation = Mutation::DeleteRecommendationRequest(request);
            app.mutations.mutate(Some(&user), &mutation).await?;
        }
        Commands::Transition { id, action } => {
            let request = load_request(&app, &user, id).await?;
            let mutation = Mutation::TransitionStatus { request, action };
            app.mutations.mutate(Some(&user), &mutation).await?;
        }
        Commands::Logout => app.logout().await?,
    }

    Ok(())
}

/// Reads one request fresh from the backend.
async fn load_request(
    app: &AppState,
    user: &CurrentUser,
    id: i64,
) -> Result<RecommendationRequest, ClientError> {
    let view = ListView::mount(&app.store, Some(user), Route::RequestEdit(id)).await?;
    view.requests()
        .into_iter()
        .next()
        .ok_or_else(|| ClientError::Internal(format!("Recommendation request {} could not be loaded", id)))
}

fn print_user(user: &CurrentUser) {
    match &user.profile {
        Some(profile) if user.logged_in => {
            println!("{} <{}> (id {})", profile.full_name, profile.email, profile.id);
            let roles: Vec<&str> = user.roles.iter().map(String::as_str).collect();
            println!("roles: {}", roles.join(", "));
        }
        _ => println!("Not logged in"),
    }
    for item in navigation_menu(Some(user)) {
        println!("  {:<20} {}", item.label, item.route.path());
    }
}

fn print_view(view: &ListView) {
    println!("{} [{:?}]", view.key(), view.state());
    let affordances = view.affordances();

    for request in view.requests() {
        let actions: Vec<&str> = view.row_actions(&request).iter().map(StatusAction::as_str).collect();
        println!(
            "{:>5}  {:<12} {:<24} {:<20} -> {:<20} due {}{}",
            request.id,
            request.status.as_str(),
            request.recommendation_type,
            request.requester.full_name,
            request.professor.full_name,
            request.due_date.format("%Y-%m-%d"),
            if actions.is_empty() {
                String::new()
            } else {
                format!("  [{}]", actions.join("/"))
            },
        );
    }
    for request_type in view.request_types() {
        println!("{:>5}  {}", request_type.id, request_type.request_type);
    }
    for user in view.users() {
        let mut flags = Vec::new();
        if user.admin {
            flags.push("admin");
        }
        if user.professor {
            flags.push("professor");
        }
        if user.student {
            flags.push("student");
        }
        println!("{:>5}  {:<30} {:<30} {}", user.id, user.full_name, user.email, flags.join(","));
    }

    if affordances.show_edit || affordances.show_delete {
        println!(
            "controls: edit={} delete={}",
            affordances.show_edit, affordances.show_delete
        );
    }
}
