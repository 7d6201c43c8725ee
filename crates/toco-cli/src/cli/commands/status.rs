//! Status command handler.

use anyhow::Result;
use toco_core::session::{SessionState, mask_token};

use super::Ctx;

pub async fn run(ctx: &mut Ctx) -> Result<()> {
    println!("Server:  {}", ctx.api.base_url());

    match ctx.api.health().await {
        Ok(health) => println!("Health:  {}", health.status),
        Err(err) => println!("Health:  unreachable ({err})"),
    }

    if matches!(ctx.session.state(), SessionState::Restoring { .. }) {
        if let Err(err) = ctx.session.restore(&ctx.api).await {
            println!("Session: stored token could not be validated ({err})");
            return Ok(());
        }
    }

    match ctx.session.state() {
        SessionState::Authenticated { token, user } => {
            println!("Session: {} ({})", user.email, mask_token(token));
        }
        _ => println!("Session: not signed in"),
    }
    Ok(())
}
