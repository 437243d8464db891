//! Recompute stored goal progress for every user
//! Usage: cargo run --bin recalculate_goals -- [user_id]

use fittrack::analytics::goals::refresh_goal_progress;
use fittrack::config::Config;
use fittrack::db::Database;
use fittrack::models::User;
use fittrack::tools::today;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let only_user: Option<i64> = std::env::args().nth(1).map(|s| s.parse()).transpose()?;

    let config = Config::from_env();
    println!("Database: {}", config.database_path.display());

    let database = Database::open_and_migrate(&config.database_path)?;
    let today = today();

    database.with_conn(|conn| {
        let users = User::list(conn)?;
        for user in users.iter().filter(|u| only_user.map_or(true, |id| id == u.id)) {
            let report = refresh_goal_progress(conn, user.id, today)?;
            println!("\n{} (id {}): {} goals, {} completed", user.username, user.id, report.total, report.completed);
            for goal in &report.goals {
                println!(
                    "  [{}] {}: {:.2}/{:.2} {} ({:.2}%)",
                    goal.status.as_str(),
                    goal.title,
                    goal.current,
                    goal.target,
                    goal.unit,
                    goal.percentage
                );
            }
        }
        Ok(())
    })?;

    Ok(())
}
