mod render;

use std::io::{self, BufRead, Write};

use anyhow::{bail, Context};
use bookstore_client::{
    BookId, CatalogApi, DraftField, HttpCatalogClient, ListEvent, ListState, ListView, Overlay,
    DEFAULT_API_URL,
};
use bookstore_kernel::settings::TelemetrySettings;
use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "bookstore", version, about = "Browse and edit the bookstore catalog")]
struct Cli {
    /// Base URL of the catalog API
    #[arg(long, global = true, env = "BOOKSTORE_API_URL", default_value = DEFAULT_API_URL)]
    api_url: String,

    /// Log client activity to the terminal
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List every book, newest first
    List,
    /// Show one book
    Show { id: String },
    /// Add a new book
    Add(BookArgs),
    /// Change some fields of a book
    Edit {
        id: String,
        #[command(flatten)]
        fields: BookArgs,
    },
    /// Delete a book
    Delete {
        id: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Debug, Args)]
struct BookArgs {
    #[arg(long)]
    title: Option<String>,
    #[arg(long)]
    author: Option<String>,
    #[arg(long)]
    description: Option<String>,
    #[arg(long)]
    genre: Option<String>,
    #[arg(long)]
    price: Option<String>,
    #[arg(long)]
    isbn: Option<String>,
    #[arg(long)]
    stock: Option<String>,
    #[arg(long)]
    cover_image: Option<String>,
}

impl BookArgs {
    fn supplied(self) -> Vec<(DraftField, String)> {
        [
            (DraftField::Title, self.title),
            (DraftField::Author, self.author),
            (DraftField::Description, self.description),
            (DraftField::Genre, self.genre),
            (DraftField::Price, self.price),
            (DraftField::Isbn, self.isbn),
            (DraftField::Stock, self.stock),
            (DraftField::CoverImage, self.cover_image),
        ]
        .into_iter()
        .filter_map(|(field, value)| value.map(|value| (field, value)))
        .collect()
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let telemetry = TelemetrySettings {
        filter: if cli.verbose { "debug" } else { "warn" }.to_string(),
        ..TelemetrySettings::default()
    };
    bookstore_telemetry::init(&telemetry)?;

    let api = HttpCatalogClient::new(&cli.api_url).context("failed to create API client")?;
    tracing::debug!(api_url = %api.base_url(), "catalog client ready");

    match cli.command {
        Command::List => list(&api).await,
        Command::Show { id } => show(&api, &id).await,
        Command::Add(fields) => save(&api, None, fields).await,
        Command::Edit { id, fields } => save(&api, Some(&id), fields).await,
        Command::Delete { id, yes } => delete(&api, &id, yes).await,
    }
}

/// Load the list, failing when the server could not be reached.
async fn mounted(api: &dyn CatalogApi) -> anyhow::Result<ListView> {
    let mut view = ListView::new();
    view.dispatch(api, ListEvent::Mounted).await;
    if let ListState::Errored(_) = view.state() {
        bail!("{}", render::screen(&view.render()));
    }
    Ok(view)
}

/// Flush queued toasts; an error toast fails the command.
fn finish(view: &mut ListView) -> anyhow::Result<()> {
    let toasts = view.toasts_mut().drain();
    for toast in &toasts {
        println!("{}", render::toast(toast));
    }
    match toasts.iter().find(|toast| toast.kind == bookstore_client::ToastKind::Error) {
        Some(toast) => bail!("{}", toast.message),
        None => Ok(()),
    }
}

fn book_id(raw: &str) -> anyhow::Result<BookId> {
    match BookId::parse(raw) {
        Some(id) => Ok(id),
        None => bail!("Book not found"),
    }
}

async fn list(api: &dyn CatalogApi) -> anyhow::Result<()> {
    let view = mounted(api).await?;
    println!("{}", render::screen(&view.render()));
    Ok(())
}

async fn show(api: &dyn CatalogApi, id: &str) -> anyhow::Result<()> {
    let book = api.get_book(&book_id(id)?.to_string()).await?;
    println!("{}", render::details(&book));
    Ok(())
}

async fn save(api: &dyn CatalogApi, id: Option<&str>, fields: BookArgs) -> anyhow::Result<()> {
    let mut view = mounted(api).await?;
    let event = match id {
        Some(id) => ListEvent::EditRequested(book_id(id)?),
        None => ListEvent::AddRequested,
    };
    view.dispatch(api, event).await;
    finish(&mut view)?;

    match view.overlay_mut() {
        Overlay::Form { form, .. } => {
            for (field, value) in fields.supplied() {
                form.set(field, value);
            }
        }
        _ => bail!("form did not open"),
    }

    if view.submit_form(api).await.is_none() {
        let message = match view.overlay() {
            Overlay::Form { form, .. } => form.error().unwrap_or("Something went wrong"),
            _ => "Something went wrong",
        };
        bail!("{message}");
    }

    finish(&mut view)?;
    println!("{}", render::screen(&view.render()));
    Ok(())
}

async fn delete(api: &dyn CatalogApi, id: &str, yes: bool) -> anyhow::Result<()> {
    let mut view = mounted(api).await?;
    view.dispatch(api, ListEvent::DeleteRequested(book_id(id)?)).await;
    finish(&mut view)?;

    let confirmed = match view.overlay() {
        Overlay::ConfirmDelete { confirm, .. } => yes || prompt(&render::confirm(confirm))?,
        _ => bail!("confirmation did not open"),
    };
    if !confirmed {
        view.dispatch(api, ListEvent::CancelClicked).await;
        println!("Cancelled");
        return Ok(());
    }

    view.dispatch(api, ListEvent::ConfirmClicked).await;
    finish(&mut view)?;
    println!("{}", render::screen(&view.render()));
    Ok(())
}

fn prompt(question: &str) -> anyhow::Result<bool> {
    print!("{question} [y/N] ");
    io::stdout().flush()?;

    let mut answer = String::new();
    io::stdin()
        .lock()
        .read_line(&mut answer)
        .context("failed to read confirmation")?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes"))
}
