use bcrypt::hash;
use clap::Parser;
use color_eyre::eyre;
use serde_json::json;

#[derive(Parser)]
#[command(version)]
struct CliArg {
    /// Username the credential entry is for
    #[arg(short, long)]
    username: String,

    /// Password to hash
    #[arg(short, long)]
    password: String,

    /// bcrypt cost factor
    #[arg(short, long, default_value_t = bcrypt::DEFAULT_COST)]
    cost: u32,
}

fn main() -> Result<(), eyre::Error> {
    // Lets get pretty error reports
    color_eyre::install()?;

    // Pull in args for the user we are adding
    let arg = CliArg::parse();

    // Hash password
    let hash_str = hash(&arg.password, arg.cost)?;

    // Print an entry ready to drop into the USER_CREDS array
    let user_cred = json!({
        "username": arg.username,
        "hash": hash_str,
    });
    println!("{user_cred}");

    Ok(())
}
