use std::io::BufRead;

use anyhow::bail;
use anyhow::Context;
use auth::PasswordHasher;
use clap::Parser;

/// Print an Argon2id hash for an `[[accounts]]` configuration entry.
#[derive(Parser)]
#[command(name = "hash-password")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Password to hash. Read from the first line of stdin when omitted.
    password: Option<String>,
}

fn main() -> Result<(), anyhow::Error> {
    let cli = Cli::parse();

    let password = match cli.password {
        Some(password) => password,
        None => {
            let mut line = String::new();
            std::io::stdin()
                .lock()
                .read_line(&mut line)
                .context("Failed to read password from stdin")?;
            line.trim_end_matches(['\r', '\n']).to_string()
        }
    };

    if password.is_empty() {
        bail!("Password must not be empty");
    }

    let hash = PasswordHasher::new().hash(&password)?;
    println!("{}", hash);

    Ok(())
}
