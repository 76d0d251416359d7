use std::{
    io::{self, BufRead, Write},
    path::PathBuf,
    sync::Arc,
};

use anyhow::{anyhow, bail, Result};
use clap::{Args, Parser, Subcommand};
use client_core::{
    views::{
        ActionError, Confirm, DetailController, FormController, FormMode, ListController,
        Navigator, ViewContext,
    },
    FormField, HttpUserService, Lifecycle, Notification, Route, UserService, UserStore,
};
use shared::domain::{User, UserId};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod config;

use config::load_settings;

#[derive(Parser, Debug)]
#[command(about = "List, view, create, edit and delete users of the demo users API")]
struct Cli {
    /// Settings file with `api_base_url` and `request_timeout_secs`.
    #[arg(long, global = true, default_value = "console.toml")]
    config: PathBuf,
    #[arg(long, global = true)]
    api_base_url: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    List,
    Show {
        id: i64,
    },
    Create {
        #[command(flatten)]
        fields: FieldArgs,
    },
    Edit {
        id: i64,
        #[command(flatten)]
        fields: FieldArgs,
    },
    Delete {
        id: i64,
        /// Skip the confirmation prompt.
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Args, Debug, Default)]
struct FieldArgs {
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    email: Option<String>,
    #[arg(long)]
    phone: Option<String>,
    #[arg(long)]
    website: Option<String>,
    #[arg(long)]
    company_name: Option<String>,
    #[arg(long)]
    catch_phrase: Option<String>,
    #[arg(long)]
    bs: Option<String>,
    #[arg(long)]
    street: Option<String>,
    #[arg(long)]
    suite: Option<String>,
    #[arg(long)]
    city: Option<String>,
    #[arg(long)]
    zipcode: Option<String>,
    #[arg(long)]
    lat: Option<String>,
    #[arg(long)]
    lng: Option<String>,
}

impl FieldArgs {
    fn assignments(&self) -> Vec<(FormField, &str)> {
        [
            (FormField::Name, &self.name),
            (FormField::Email, &self.email),
            (FormField::Phone, &self.phone),
            (FormField::Website, &self.website),
            (FormField::CompanyName, &self.company_name),
            (FormField::CompanyCatchPhrase, &self.catch_phrase),
            (FormField::CompanyBs, &self.bs),
            (FormField::AddressStreet, &self.street),
            (FormField::AddressSuite, &self.suite),
            (FormField::AddressCity, &self.city),
            (FormField::AddressZipcode, &self.zipcode),
            (FormField::AddressGeoLat, &self.lat),
            (FormField::AddressGeoLng, &self.lng),
        ]
        .into_iter()
        .filter_map(|(field, value)| value.as_deref().map(|value| (field, value)))
        .collect()
    }
}

struct StdinConfirm {
    assume_yes: bool,
}

impl Confirm for StdinConfirm {
    fn confirm(&self, prompt: &str) -> bool {
        if self.assume_yes {
            return true;
        }
        eprint!("{prompt} [y/N] ");
        let _ = io::stderr().flush();
        let mut answer = String::new();
        if io::stdin().lock().read_line(&mut answer).is_err() {
            return false;
        }
        matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
    }
}

struct ConsoleNavigator;

impl Navigator for ConsoleNavigator {
    fn navigate(&self, route: Route) {
        info!(route = %route, "navigate");
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();
    let cli = Cli::parse();

    let mut settings = load_settings(&cli.config)?;
    if let Some(api_base_url) = cli.api_base_url {
        settings.api_base_url = api_base_url;
    }
    let service: Arc<dyn UserService> = Arc::new(HttpUserService::new(&settings)?);
    let store = UserStore::new(service);

    let session = CancellationToken::new();
    {
        let session = session.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                session.cancel();
            }
        });
    }

    if let Err(err) = store.load(&session).await {
        warn!(error = %err, "initial user load failed");
    }

    let assume_yes = matches!(cli.command, Command::Delete { yes: true, .. });
    let ctx = ViewContext::new(
        store,
        Arc::new(StdinConfirm { assume_yes }),
        Arc::new(ConsoleNavigator),
    );
    let view = session.child_token();

    match cli.command {
        Command::List => run_list(ctx, view),
        Command::Show { id } => run_show(ctx, view, UserId(id)).await,
        Command::Create { fields } => run_form(ctx, view, FormMode::Create, &fields).await,
        Command::Edit { id, fields } => {
            run_form(ctx, view, FormMode::Edit(UserId(id)), &fields).await
        }
        Command::Delete { id, .. } => run_delete(ctx, view, UserId(id)).await,
    }
}

fn run_list(ctx: ViewContext, cancel: CancellationToken) -> Result<()> {
    let list = ListController::new(ctx, cancel);
    match list.lifecycle() {
        Lifecycle::Ready(users) => {
            for user in &users {
                println!(
                    "{:>4}  {:<28} {:<32} {}",
                    user.id, user.name, user.email, user.company.name
                );
            }
            let stats = list.store_state().stats();
            println!(
                "{} users, {} with a valid email",
                stats.total, stats.valid_emails
            );
            Ok(())
        }
        Lifecycle::Failed(message) => Err(anyhow!(message)),
        Lifecycle::Idle | Lifecycle::Loading => bail!("user list is not loaded"),
    }
}

async fn run_show(ctx: ViewContext, cancel: CancellationToken, id: UserId) -> Result<()> {
    let detail = DetailController::new(ctx, id, cancel);
    let user = detail.activate().await?;
    print_profile(&user);
    Ok(())
}

async fn run_form(
    ctx: ViewContext,
    cancel: CancellationToken,
    mode: FormMode,
    fields: &FieldArgs,
) -> Result<()> {
    let form = FormController::new(ctx, mode, cancel);
    if let Err(err) = form.activate().await {
        print_notification(form.view_state().notification.as_ref());
        if matches!(err, ActionError::Cancelled) {
            return Err(err.into());
        }
    }
    for (field, value) in fields.assignments() {
        form.set_field(field, value);
    }

    match form.submit().await {
        Ok(user) => {
            print_notification(form.view_state().notification.as_ref());
            print_profile(&user);
            Ok(())
        }
        Err(ActionError::Validation(errors)) => {
            for (field, message) in errors.iter() {
                eprintln!("  {field}: {message}");
            }
            Err(ActionError::Validation(errors).into())
        }
        Err(err) => {
            print_notification(form.view_state().notification.as_ref());
            Err(err.into())
        }
    }
}

async fn run_delete(ctx: ViewContext, cancel: CancellationToken, id: UserId) -> Result<()> {
    let list = ListController::new(ctx, cancel);
    let deleted = list.delete(id).await;
    print_notification(list.view_state().notification.as_ref());
    if !deleted? {
        println!("Delete cancelled");
    }
    Ok(())
}

fn print_notification(notification: Option<&Notification>) {
    if let Some(notification) = notification {
        println!("[{:?}] {}", notification.kind, notification.message);
    }
}

fn or_na(value: &str) -> &str {
    if value.trim().is_empty() {
        "N/A"
    } else {
        value
    }
}

fn print_profile(user: &User) {
    println!("#{} {}", user.id, or_na(&user.name));
    println!("  Email:        {}", or_na(&user.email));
    println!("  Phone:        {}", or_na(&user.phone));
    println!("  Website:      {}", or_na(&user.website));
    println!("  Company:      {}", or_na(&user.company.name));
    println!("  Catch phrase: {}", or_na(&user.company.catch_phrase));
    println!("  Business:     {}", or_na(&user.company.bs));
    println!(
        "  Address:      {}, {}, {} {}",
        or_na(&user.address.street),
        or_na(&user.address.suite),
        or_na(&user.address.city),
        or_na(&user.address.zipcode)
    );
    let geo = &user.address.geo;
    if geo.lat.is_empty() || geo.lng.is_empty() {
        println!("  Coordinates:  N/A");
    } else {
        println!("  Coordinates:  {}, {}", geo.lat, geo.lng);
    }
}
