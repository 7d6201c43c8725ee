//! Auth command handlers.

use std::io::{self, BufRead, IsTerminal, Write};

use anyhow::{Context, Result};
use toco_core::api::User;

use super::Ctx;

pub async fn register(ctx: &mut Ctx, email: &str, name: Option<&str>) -> Result<()> {
    let password = read_password("Password: ")?;

    let user = ctx
        .session
        .register(&ctx.api, email, &password, name)
        .await?;

    println!("Account created. Logged in as {}", user.email);
    Ok(())
}

pub async fn login(ctx: &mut Ctx, email: &str) -> Result<()> {
    let password = read_password("Password: ")?;

    let user = ctx.session.login(&ctx.api, email, &password).await?;

    println!("Logged in as {}", user.email);
    Ok(())
}

pub async fn logout(ctx: &mut Ctx) -> Result<()> {
    let had_session = ctx.session.logout(&ctx.api).await?;
    if had_session {
        println!("Logged out.");
    } else {
        println!("Not signed in.");
    }
    Ok(())
}

pub async fn whoami(ctx: &mut Ctx) -> Result<()> {
    ctx.session.restore(&ctx.api).await?;

    match ctx.session.user() {
        Some(user) => print_profile(user),
        None => println!("Not signed in."),
    }
    Ok(())
}

fn print_profile(user: &User) {
    println!("Email: {}", user.email);
    if let Some(name) = &user.name {
        println!("Name:  {name}");
    }
    println!("Since: {}", user.created_at.format("%Y-%m-%d"));
}

/// Reads one line from stdin, prompting on stderr when interactive.
fn read_password(prompt: &str) -> Result<String> {
    let stdin = io::stdin();
    if stdin.is_terminal() {
        eprint!("{prompt}");
        io::stderr().flush().ok();
    }

    let mut line = String::new();
    stdin
        .lock()
        .read_line(&mut line)
        .context("read password from stdin")?;

    let password = line.trim_end_matches(['\r', '\n']).to_string();
    if password.is_empty() {
        anyhow::bail!("Password cannot be empty");
    }
    Ok(password)
}
