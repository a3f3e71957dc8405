//! Session subcommands: login, logout, whoami, setup.

use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};
use botdeck_core::api::types::PanelUser;
use botdeck_core::config::Config;
use botdeck_core::session::{SessionManager, SessionPhase};

use super::session_manager;

pub async fn login(config: &Config, login: &str, password: Option<String>) -> Result<()> {
    let mut session = session_manager(config)?;
    if session.resolve().await == SessionPhase::Authenticated {
        anyhow::bail!("Already signed in. Run `botdeck logout` first.");
    }

    let password = match password {
        Some(p) => p,
        None => read_password()?,
    };
    session.login(login, &password).await?;
    print_signed_in(&session)
}

pub async fn setup(
    config: &Config,
    login: &str,
    password: Option<String>,
    display_name: Option<String>,
) -> Result<()> {
    let mut session = session_manager(config)?;
    if session.resolve().await == SessionPhase::Authenticated {
        anyhow::bail!("Already signed in. Run `botdeck logout` first.");
    }

    let password = match password {
        Some(p) => p,
        None => read_password()?,
    };
    session
        .register_owner(login, &password, display_name.as_deref().unwrap_or(""))
        .await?;
    println!("Owner account created.");
    print_signed_in(&session)
}

pub async fn logout(config: &Config) -> Result<()> {
    let mut session = session_manager(config)?;
    if !session.adopt_stored() {
        println!("Not signed in.");
        return Ok(());
    }

    // Server logout is best effort; local state is cleared regardless, so
    // a dead deployment cannot pin a session on this machine.
    session.logout().await;
    println!("Signed out.");
    Ok(())
}

pub async fn whoami(config: &Config) -> Result<()> {
    let mut session = session_manager(config)?;
    match session.resolve().await {
        SessionPhase::Authenticated => {
            let user = session.user().context("missing operator profile")?;
            print_user(user);
            Ok(())
        }
        _ => anyhow::bail!("Not signed in. Run `botdeck login` first."),
    }
}

fn print_signed_in(session: &SessionManager) -> Result<()> {
    let user = session.user().context("missing operator profile")?;
    println!(
        "Signed in as {} ({})",
        user.display_name,
        user.role.display_name()
    );
    Ok(())
}

fn print_user(user: &PanelUser) {
    println!("login:        {}", user.login);
    println!("display name: {}", user.display_name);
    println!("role:         {}", user.role.display_name());
}

fn read_password() -> Result<String> {
    eprint!("Password: ");
    io::stderr().flush().ok();
    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("read password from stdin")?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}
