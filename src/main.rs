use anyhow::{Context, Result};
use catch_character_bot::{
    bot,
    catalog::{load_characters, load_shop_items},
    cli::{Cli, Commands},
    config::Config,
    game::create_backup,
    logging,
    store::{Ledger, LedgerError},
    telegram::BotClient,
};
use chrono::Utc;
use tracing::info;

fn main() -> Result<()> {
    // A missing .env is fine; real deployments set the environment directly
    dotenvy::dotenv().ok();

    let cli = Cli::parse_args();
    let mut config = Config::from_env().context("Invalid configuration")?;
    if let Some(db_path) = cli.db_path {
        config.db_path = db_path;
    }

    match cli.command {
        Commands::Run => {
            logging::init(&config.log_path)?;
            let token = config.require_token()?;
            let client = BotClient::new(token).context("Failed to create HTTP client")?;

            let ledger = Ledger::open(&config.db_path)
                .with_context(|| format!("Failed to open database: {:?}", config.db_path))?;
            info!(path = %config.db_path.display(), "Database connected");

            bot::run(&client, &ledger, &config)?;
        }

        Commands::Backup { output_dir } => {
            let ledger = open_ledger(&config)?;
            let dir = output_dir.unwrap_or_else(|| config.backups_dir.clone());
            let path = create_backup(&ledger, &dir, Utc::now())?;
            println!("Backup created: {:?}", path);
        }

        Commands::Grant { user_id, amount } => {
            let ledger = open_ledger(&config)?;
            match ledger.add_coins(user_id, amount) {
                Ok(balance) => println!("User {} now has {} coins", user_id, balance),
                Err(LedgerError::WouldOverdraw { balance, .. }) => {
                    anyhow::bail!("User {} only has {} coins", user_id, balance)
                }
                Err(LedgerError::BalanceOverflow { balance, .. }) => {
                    anyhow::bail!(
                        "User {} already has {} coins; that would overflow",
                        user_id,
                        balance
                    )
                }
                Err(err) => return Err(err.into()),
            }
        }

        Commands::Inspect { user_id } => {
            let ledger = open_ledger(&config)?;
            let coins = ledger.get_coins(user_id)?;
            let owned = ledger.list_characters(user_id)?;

            println!("User {}: {} coins, {} characters\n", user_id, coins, owned.len());
            for ch in owned {
                println!("  {:<20} {:<12} {}", ch.char_name, ch.rarity, ch.char_id);
            }
        }

        Commands::Catalog => {
            let characters = load_characters(&config.characters_path)?;
            let total: f64 = characters.iter().map(|c| c.weight).sum();

            println!("Characters ({:?}):\n", config.characters_path);
            for ch in &characters {
                let odds = if total > 0.0 { ch.weight / total * 100.0 } else { 0.0 };
                println!("  {:<12} {:<20} {:<12} {:>6.2}%", ch.id, ch.name, ch.rarity, odds);
            }

            let items = load_shop_items(&config.shop_path)?;
            println!("\nShop items ({:?}):\n", config.shop_path);
            for it in &items {
                println!("  {:<12} {:<20} {:>8} coins", it.id, it.name, it.price);
            }
        }
    }

    Ok(())
}

fn open_ledger(config: &Config) -> Result<Ledger> {
    Ledger::open(&config.db_path)
        .with_context(|| format!("Failed to open database: {:?}", config.db_path))
}
