//! User account CLI commands.

use anyhow::Result;
use console::style;
use dialoguer::Password;

use chatter_types::user::PublicUser;

use crate::state::AppState;

/// Register a user from the terminal.
///
/// ```bash
/// # Hidden prompt with confirmation
/// chatter user add ada
///
/// # Script/automation mode
/// chatter user add ada --password hunter22
/// ```
pub async fn add_user(
    state: &AppState,
    username: &str,
    password: Option<String>,
    json: bool,
) -> Result<()> {
    let password = match password {
        Some(p) => p,
        None => Password::new()
            .with_prompt(format!("Password for {}", style(username).bold()))
            .with_confirmation("Confirm password", "Passwords do not match")
            .interact()?,
    };

    let user = state.auth_service.register(username, &password).await?;
    let public = PublicUser::from(user);

    if json {
        println!("{}", serde_json::to_string_pretty(&public)?);
    } else {
        println!(
            "  {} User '{}' created ({})",
            style("✓").green().bold(),
            style(&public.username).bold(),
            style(public.id).dim()
        );
    }

    Ok(())
}
