use anyhow::Context as _;
use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use lexitrack_common::{
    BookForm, BookStore, Database, DetailEditor, NoteEnhancer, PersistenceError, Persisted,
};
use lexitrack_enhance::{AiNoteEnhancer, EnhancerConfig};
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

mod shell;

#[derive(Debug, Parser)]
#[command(name = "lexitrack", about = "Track your reading: books, progress and notes")]
struct Cli {
    /// Database URL (sqlite://path/to/lexitrack.db)
    #[arg(long, env = "LEXITRACK_DATABASE_URL", default_value = "sqlite://lexitrack.db")]
    database_url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Show every book in the library, newest first
    List,

    /// Add a new book
    Add(AddCommand),

    /// Show one book in detail
    Show {
        id: String,
    },

    /// Record reading progress or replace the notes of a book
    Update(UpdateCommand),

    /// Ask the AI backend for discussion questions based on a book's notes
    Enhance(EnhanceCommand),

    /// Remove a book from the library
    Delete {
        id: String,
    },
}

#[derive(Debug, Args)]
struct AddCommand {
    #[arg(long)]
    title: String,

    #[arg(long)]
    author: String,

    /// Total number of pages, a positive whole number
    #[arg(long, allow_hyphen_values = true)]
    total_pages: String,
}

#[derive(Debug, Args)]
struct UpdateCommand {
    id: String,

    /// The page you are on, between 0 and the book's total pages
    #[arg(long, allow_hyphen_values = true)]
    page: Option<String>,

    /// Replacement notes for the book
    #[arg(long)]
    notes: Option<String>,
}

#[derive(Debug, Args)]
struct EnhanceCommand {
    id: String,

    /// Use these notes instead of the saved ones
    #[arg(long)]
    notes: Option<String>,

    /// Also save the notes given with --notes
    #[arg(long, requires = "notes")]
    save: bool,

    #[command(flatten)]
    ai: AiArgs,
}

#[derive(Debug, Args)]
struct AiArgs {
    /// Base URL of an OpenAI-compatible API
    #[arg(long, env = "LEXITRACK_AI_BASE_URL", default_value = "https://api.openai.com/v1")]
    ai_base_url: String,

    /// Model used to generate questions
    #[arg(long, env = "LEXITRACK_AI_MODEL", default_value = "gpt-4o-mini")]
    ai_model: String,

    /// API key sent as a bearer token
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    ai_api_key: Option<String>,
}

impl From<AiArgs> for EnhancerConfig {
    fn from(args: AiArgs) -> Self {
        EnhancerConfig {
            base_url: args.ai_base_url,
            model: args.ai_model,
            api_key: args.ai_api_key,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let db = Database::new(&cli.database_url).await?;
    let (mut store, load_warning) = BookStore::load(db).await;
    if let Some(e) = load_warning {
        report_persistence(&e);
    }

    let outcome = run(cli.command, &mut store).await;

    if let Err(e) = store.close().await {
        report_persistence(&e);
    }

    outcome
}

async fn run(command: Commands, store: &mut BookStore) -> anyhow::Result<()> {
    match command {
        Commands::List => {
            println!("{}", shell::library_view(store.list(), Utc::now()));
        }

        Commands::Add(add) => {
            let form = BookForm::new(add.title, add.author, add.total_pages);
            match form.validate() {
                Ok(new) => {
                    let book = warn_on_failure(store.create(new).await);
                    println!(
                        "{}",
                        shell::toast(
                            "Book Added!",
                            &format!("{} has been added to your library.", book.title)
                        )
                    );
                    println!("id: {}", book.id);
                }
                Err(errors) => {
                    for e in errors.0 {
                        eprintln!("{e}");
                    }
                }
            }
        }

        Commands::Show { id } => {
            let editor = open_editor(store, &id)?;
            println!("{}", shell::detail_view(&editor));
        }

        Commands::Update(update) => {
            let mut editor = open_editor(store, &update.id)?;
            if let Some(page) = update.page {
                editor.set_current_page_input(page);
            }
            if let Some(notes) = update.notes {
                editor.set_notes(notes);
            }

            save_edits(store, &mut editor).await;
        }

        Commands::Enhance(enhance) => {
            let mut editor = open_editor(store, &enhance.id)?;
            if let Some(notes) = enhance.notes {
                editor.set_notes(notes);
            }

            if !editor.can_enhance() {
                eprintln!(
                    "{}",
                    shell::toast("Cannot Enhance Notes", "Please write some notes first.")
                );
                return Ok(());
            }

            let enhancer = AiNoteEnhancer::new(enhance.ai.into())
                .context("Failed to configure the AI backend")?;
            enhance_notes(&mut editor, &enhancer).await;

            if enhance.save {
                save_edits(store, &mut editor).await;
            }
        }

        Commands::Delete { id } => match warn_on_failure(store.delete(&id).await) {
            Some(book) => println!(
                "{}",
                shell::toast(
                    "Book Deleted",
                    &format!("{} has been removed from your library.", book.title)
                )
            ),
            None => eprintln!("No book with id {id}"),
        },
    }

    Ok(())
}

fn open_editor(store: &BookStore, id: &str) -> anyhow::Result<DetailEditor> {
    let book = store
        .get(id)
        .with_context(|| format!("No book with id {id}"))?;

    Ok(DetailEditor::open(book.clone()))
}

async fn save_edits(store: &mut BookStore, editor: &mut DetailEditor) {
    match editor.save() {
        Ok(book) => {
            warn_on_failure(store.update(book.clone()).await);
            println!(
                "{}",
                shell::toast(
                    "Book Updated",
                    &format!("{} has been updated successfully.", book.title)
                )
            );
            editor.saved(book);
        }
        Err(e) => eprintln!("{}", shell::toast("Invalid Page Number", &e.to_string())),
    }
}

async fn enhance_notes(editor: &mut DetailEditor, enhancer: &dyn NoteEnhancer) {
    match editor.enhance(enhancer).await {
        Ok(Some(questions)) => {
            println!(
                "{}",
                shell::toast(
                    "Notes Enhanced!",
                    "AI has suggested some questions based on your notes."
                )
            );
            println!("{}", shell::suggestions_panel(questions));
        }
        Ok(None) => debug!("Enhancement already running, ignoring request"),
        Err(e) => {
            error!("Failed to enhance notes: {}", e);
            eprintln!(
                "{}",
                shell::toast(
                    "Error Enhancing Notes",
                    "Could not get AI suggestions. Please try again."
                )
            );
        }
    }
}

fn warn_on_failure<T>(persisted: Persisted<T>) -> T {
    if let Some(e) = &persisted.warning {
        report_persistence(e);
    }

    persisted.value
}

fn report_persistence(e: &PersistenceError) {
    eprintln!("{}", shell::toast("Error", &e.to_string()));
}
