use sea_orm::Database;
use sea_orm_migration::prelude::*;

/// Same default as the `tally` binary.
const DEFAULT_URL: &str = "sqlite:./tally.db?mode=rwc";

/// `TALLY_DATABASE__URL` (as read by `tally`), then `DATABASE_URL`.
fn database_url() -> String {
    ["TALLY_DATABASE__URL", "DATABASE_URL"]
        .into_iter()
        .find_map(|key| std::env::var(key).ok().filter(|url| !url.trim().is_empty()))
        .unwrap_or_else(|| DEFAULT_URL.to_string())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let action = std::env::args().nth(1).unwrap_or_else(|| "up".to_string());
    let url = database_url();
    let db = Database::connect(url.as_str()).await?;

    match action.as_str() {
        "up" => migration::Migrator::up(&db, None).await?,
        "down" => migration::Migrator::down(&db, Some(1)).await?,
        "fresh" => migration::Migrator::fresh(&db).await?,
        "status" => migration::Migrator::status(&db).await?,
        other => {
            eprintln!("unknown action '{other}'");
            eprintln!("usage: migration [up|down|fresh|status]");
            eprintln!("database: $TALLY_DATABASE__URL, $DATABASE_URL or {DEFAULT_URL}");
            std::process::exit(2);
        }
    }

    Ok(())
}
