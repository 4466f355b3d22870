//! Command line handling.
//!
//! Without arguments the terminal UI starts at `/`. `--route <path>` opens
//! another screen directly, the way a link from an email would. The other
//! flags run one flow without the UI and exit.

use std::io::{self, Write};

use anyhow::{anyhow, bail, Context, Result};
use tracing::info;

use gatehouse_core::auth::{bootstrap, BootstrapOutcome, SessionStore, ViewScope};
use gatehouse_core::config::Config;
use gatehouse_core::forms::{FormError, LoginForm};
use gatehouse_core::routes::Route;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Run { route: Route },
    Login,
    Whoami,
    SignOut,
    Help,
}

/// Parse `std::env::args()`, program name included.
pub fn parse_args(args: &[String]) -> Result<Command> {
    let mut rest = args.iter().skip(1).map(String::as_str);

    let command = match rest.next() {
        None => Command::Run { route: Route::Login },
        Some("--route") => {
            let path = rest
                .next()
                .ok_or_else(|| anyhow!("--route needs a path, e.g. /confirm/<token>"))?;
            Command::Run {
                route: parse_route(path)?,
            }
        }
        Some(arg) if arg.starts_with("--route=") => Command::Run {
            route: parse_route(&arg["--route=".len()..])?,
        },
        Some("--login") => Command::Login,
        Some("--whoami") => Command::Whoami,
        Some("--sign-out") => Command::SignOut,
        Some("--help") | Some("-h") => Command::Help,
        Some(other) => bail!("Unknown argument '{}' (try --help)", other),
    };

    if let Some(extra) = rest.next() {
        bail!("Unexpected argument '{}'", extra);
    }
    Ok(command)
}

fn parse_route(path: &str) -> Result<Route> {
    Route::parse(path).ok_or_else(|| anyhow!("Unknown route '{}'", path))
}

pub fn print_help() {
    println!("gatehouse {}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("Usage: gatehouse [OPTION]");
    println!();
    println!("  --route <path>   Open a screen directly, e.g. /confirm/<token>");
    println!("  --login          Log in from the command line");
    println!("  --whoami         Show who the saved session belongs to");
    println!("  --sign-out       Forget the saved session");
    println!("  --help           Show this message");
}

/// Run a non-interactive command.
pub async fn run(command: Command, config: &Config) -> Result<()> {
    match command {
        Command::Login => login(config).await,
        Command::Whoami => whoami(config).await,
        Command::SignOut => sign_out(config),
        Command::Run { .. } | Command::Help => Ok(()),
    }
}

async fn login(config: &Config) -> Result<()> {
    let api = config.api_client()?;
    let store = SessionStore::new(config.token_store()?);

    println!("\n=== Gatehouse Login ===\n");
    let email = prompt_email()?;
    let password = rpassword::prompt_password("Password: ").context("Failed to read password")?;

    println!("\nAuthenticating...");
    let form = LoginForm { email, password };
    match form.submit(&api, &store, &ViewScope::detached()).await {
        Ok(_) => {
            println!("Logged in as {}\n", store.session().display_label());
            Ok(())
        }
        Err(FormError::Invalid(errors)) => {
            for (field, message) in errors.iter() {
                eprintln!("{}: {}", field.label(), message);
            }
            bail!("Login not sent")
        }
        Err(e) => match e.notice() {
            Some(notice) => bail!("{}", notice.text),
            None => Err(e.into()),
        },
    }
}

fn prompt_email() -> Result<String> {
    print!("Email: ");
    io::stdout().flush()?;

    let mut email = String::new();
    io::stdin().read_line(&mut email).context("Failed to read email")?;
    Ok(email.trim().to_string())
}

async fn whoami(config: &Config) -> Result<()> {
    let api = config.api_client()?;
    let store = SessionStore::new(config.token_store()?);

    match bootstrap(&api, &store, config.bootstrap_policy()).await {
        BootstrapOutcome::Authenticated => {
            let session = store.session();
            println!("{} <{}>", session.display_label(), session.email);
        }
        BootstrapOutcome::Rejected(e) => println!("Not logged in: {}", e.user_message()),
        BootstrapOutcome::Anonymous
        | BootstrapOutcome::AlreadyRan
        | BootstrapOutcome::Superseded => println!("Not logged in"),
    }
    Ok(())
}

fn sign_out(config: &Config) -> Result<()> {
    let store = SessionStore::new(config.token_store()?);
    store.sign_out().context("Failed to remove the saved token")?;
    info!("Signed out from the command line");
    println!("Signed out");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        std::iter::once("gatehouse")
            .chain(list.iter().copied())
            .map(String::from)
            .collect()
    }

    #[test]
    fn test_no_args_runs_login_screen() {
        assert_eq!(parse_args(&args(&[])).unwrap(), Command::Run { route: Route::Login });
    }

    #[test]
    fn test_route_deep_link() {
        assert_eq!(
            parse_args(&args(&["--route", "/confirm/abc"])).unwrap(),
            Command::Run {
                route: Route::ConfirmAccount("abc".to_string())
            }
        );
        assert_eq!(
            parse_args(&args(&["--route=/forgot-password/xyz"])).unwrap(),
            Command::Run {
                route: Route::NewPassword("xyz".to_string())
            }
        );
    }

    #[test]
    fn test_bad_args() {
        assert!(parse_args(&args(&["--route"])).is_err());
        assert!(parse_args(&args(&["--route", "/nowhere"])).is_err());
        assert!(parse_args(&args(&["--frobnicate"])).is_err());
        assert!(parse_args(&args(&["--whoami", "extra"])).is_err());
    }

    #[test]
    fn test_commands() {
        assert_eq!(parse_args(&args(&["--login"])).unwrap(), Command::Login);
        assert_eq!(parse_args(&args(&["--whoami"])).unwrap(), Command::Whoami);
        assert_eq!(parse_args(&args(&["--sign-out"])).unwrap(), Command::SignOut);
        assert_eq!(parse_args(&args(&["-h"])).unwrap(), Command::Help);
    }
}
