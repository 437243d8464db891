//! Register a user from the command line
//! Usage: cargo run --bin create_user -- <username> <email> [display name]

use fittrack::config::Config;
use fittrack::db::Database;
use fittrack::tools::users::register_user;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let (username, email) = match (args.first(), args.get(1)) {
        (Some(u), Some(e)) => (u, e),
        _ => {
            eprintln!("Usage: create_user <username> <email> [display name]");
            std::process::exit(2);
        }
    };
    let display_name = (args.len() > 2).then(|| args[2..].join(" "));

    let config = Config::from_env();
    if let Some(parent) = config.database_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    println!("Database path: {}", config.database_path.display());

    let database = Database::open_and_migrate(&config.database_path)?;
    let user = register_user(&database, username, email, display_name.as_deref())?;

    println!("User created:");
    println!("  ID: {}", user.id);
    println!("  Username: {}", user.username);
    println!("  Email: {}", user.email);
    if let Some(name) = &user.display_name {
        println!("  Display name: {}", name);
    }

    Ok(())
}
