use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use rpg_builder::config::AppConfig;
use rpg_builder::core::character_gen::persistence::default_path;
use rpg_builder::core::character_gen::{Character, CharacterBuilder};

const USAGE: &str = "Usage: rpg-builder <command>

Commands:
  random [--save PATH] [--force]   Roll a random character, optionally saving it
  show PATH                        Load a saved character and print it";

enum Command {
    Random { save: Option<Option<PathBuf>>, force: bool },
    Show { path: PathBuf },
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Command, String> {
    match args.next().as_deref() {
        Some("random") => {
            let mut save = None;
            let mut force = false;
            let mut args = args.peekable();
            while let Some(arg) = args.next() {
                match arg.as_str() {
                    "--save" => {
                        let path = args.next_if(|a| !a.starts_with("--")).map(PathBuf::from);
                        save = Some(path);
                    }
                    "--force" => force = true,
                    other => return Err(format!("Unknown option for random: {other}")),
                }
            }
            Ok(Command::Random { save, force })
        }
        Some("show") => match args.next() {
            Some(path) => Ok(Command::Show { path: PathBuf::from(path) }),
            None => Err("show needs a PATH".to_string()),
        },
        Some(cmd) => Err(format!("Unknown command: {cmd}")),
        None => Err("No command given".to_string()),
    }
}

fn print_sheet(character: &Character) {
    println!("{character}");
    println!("Languages: {}", character.languages().join(", "));
    println!("Equipment: {}", character.equipment().join(", "));
    for (bucket, rules) in character.special_rules().buckets() {
        if !rules.is_empty() {
            println!("{bucket}: {}", rules.join(", "));
        }
    }
}

fn run(command: Command, builder: &CharacterBuilder, config: &AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Command::Random { save, force } => {
            let character = builder.random_character(&mut rand::thread_rng())?;
            print_sheet(&character);
            if let Some(path) = save {
                let path = path.unwrap_or_else(|| default_path(&config.save_dir(), &character));
                builder.save(&character, &path, force)?;
                println!("Saved to {}", path.display());
            }
        }
        Command::Show { path } => {
            let character = builder.load(&path)?;
            print_sheet(&character);
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    let _log_guard = rpg_builder::core::logging::init();
    log::info!("{} v{} starting", rpg_builder::NAME, rpg_builder::VERSION);

    let command = match parse_args(std::env::args().skip(1)) {
        Ok(command) => command,
        Err(e) => {
            eprintln!("{e}\n\n{USAGE}");
            return ExitCode::from(2);
        }
    };

    let config = AppConfig::load();
    let rules = match config.rules() {
        Ok(rules) => Arc::new(rules),
        Err(e) => {
            log::error!("Rule tables unusable: {e}");
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };
    let builder = CharacterBuilder::new(rules, config.generation.clone());

    if let Err(e) = run(command, &builder, &config) {
        eprintln!("Error: {e}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
