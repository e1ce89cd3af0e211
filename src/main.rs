use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use log::error;

use recipe_parser::{ParserConfig, Recipe, RecipeError, Reconciler};

/// Obtain the recipe name from the budgetbytes.com URL, e.g.
/// `slow-cooker-mashed-potatoes`.
#[derive(Parser)]
#[command(name = "recipe-parser", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print a recipe, fetching it from the site if it is not stored
    Get {
        name: String,
        /// Skip the store and always parse the live page
        #[arg(long)]
        source: bool,
    },
    /// Fetch a recipe and store it; fails if it is already stored
    Create { name: String },
    /// Re-fetch a stored recipe from its recorded URL and replace it
    Update { id: String },
    /// Remove a stored recipe
    Delete { id: String },
    /// Print a recipe saved as JSON
    Show { path: PathBuf },
    /// Fetch a recipe and write it to `<dbpath>/<name>.json`
    Save {
        name: String,
        #[arg(long, default_value = "./database/")]
        dbpath: PathBuf,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    match run(cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{}", err);
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Command) -> Result<(), RecipeError> {
    match command {
        Command::Show { path } => print(&Recipe::from_json_file(path).await?),
        Command::Get { name, source: true } => {
            print(&reconciler()?.get_from_source(&name).await?)
        }
        Command::Get { name, source: false } => print(&reconciler()?.get(&name).await?),
        Command::Create { name } => print(&reconciler()?.create(&name).await?),
        Command::Update { id } => print(&reconciler()?.update(&id).await?),
        Command::Delete { id } => {
            if reconciler()?.delete(&id).await? {
                println!("Deleted recipe {id}");
            } else {
                println!("No recipe with id {id}");
            }
            Ok(())
        }
        Command::Save { name, dbpath } => {
            let reconciler = reconciler()?;
            let recipe = reconciler.get_from_source(&name).await?;
            let slug = reconciler.canonicalizer().slug(&recipe.url).unwrap_or(name.as_str());

            tokio::fs::create_dir_all(&dbpath).await?;
            let path = dbpath.join(slug);
            recipe.save_as(&path).await?;
            println!("Recipe saved to {}.json", path.display());
            Ok(())
        }
    }
}

fn reconciler() -> Result<Reconciler, RecipeError> {
    Reconciler::from_config(&ParserConfig::load()?)
}

fn print(recipe: &Recipe) -> Result<(), RecipeError> {
    println!("{}", recipe.to_json_pretty()?);
    Ok(())
}
