//! Session commands.
//!
//! The session is persisted in the state directory, so a login lasts until
//! `brim auth logout`.

use brimline_core::ProfilePatch;
use brimline_storefront::Storefront;
use secrecy::SecretString;

use super::CommandError;

#[allow(clippy::print_stdout)]
pub async fn login(
    storefront: &mut Storefront,
    email: &str,
    password: &SecretString,
) -> Result<(), CommandError> {
    if !storefront.auth.login(email, password).await {
        return Err(CommandError::Failed("Login failed".to_owned()));
    }
    whoami(storefront);
    Ok(())
}

#[allow(clippy::print_stdout)]
pub async fn register(
    storefront: &mut Storefront,
    name: &str,
    email: &str,
    password: &SecretString,
) -> Result<(), CommandError> {
    if !storefront.auth.register(name, email, password).await {
        return Err(CommandError::Failed("Registration failed".to_owned()));
    }
    whoami(storefront);
    Ok(())
}

#[allow(clippy::print_stdout)]
pub fn logout(storefront: &mut Storefront) {
    storefront.auth.logout();
    println!("Logged out.");
}

/// Update locally held profile details.
pub fn update_profile(storefront: &mut Storefront, patch: ProfilePatch) -> Result<(), CommandError> {
    if !storefront.auth.is_logged_in() {
        return Err(CommandError::Failed("Not logged in".to_owned()));
    }
    storefront.auth.update_profile(patch);
    whoami(storefront);
    Ok(())
}

#[allow(clippy::print_stdout)]
pub fn whoami(storefront: &Storefront) {
    match storefront.auth.user().filter(|_| storefront.auth.is_logged_in()) {
        Some(user) => {
            println!("{} <{}> ({})", user.name, user.email, user.role);
            if let Some(phone) = &user.phone {
                println!("  Phone:   {phone}");
            }
            if let Some(address) = &user.address {
                println!("  Address: {address}");
            }
        }
        None => println!("Not logged in."),
    }
}
