//! Session commands: register, login, logout, whoami.

use secrecy::SecretString;

use mercado_client::context::{LoginOutcome, StoreContext};
use mercado_client::error::Result;
use mercado_client::models::user::RegistrationForm;
use mercado_client::HttpBackend;

pub async fn register(
    ctx: &StoreContext<HttpBackend>,
    email: &str,
    name: &str,
    password: &str,
) -> Result<()> {
    let form = RegistrationForm {
        email: email.to_owned(),
        display_name: name.to_owned(),
        password: SecretString::from(password.to_owned()),
    };
    let outcome = ctx.register(form).await?;
    print_outcome(&outcome);
    Ok(())
}

pub async fn login(
    ctx: &StoreContext<HttpBackend>,
    email: &str,
    password: &str,
) -> Result<()> {
    let outcome = ctx.login(email, password).await?;
    print_outcome(&outcome);
    Ok(())
}

pub async fn logout(ctx: &StoreContext<HttpBackend>) -> Result<()> {
    ctx.logout().await;
    println!("Logged out.");
    Ok(())
}

pub fn whoami(ctx: &StoreContext<HttpBackend>) -> Result<()> {
    match ctx.session().current_session() {
        Some(session) => {
            println!("{} <{}>", session.display_name, session.email);
            println!("  user id: {}", session.user_id);
            println!("  email verified: {:?}", session.email_verified);
        }
        None => println!("Not logged in (guest mode)."),
    }
    Ok(())
}

fn print_outcome(outcome: &LoginOutcome) {
    println!("Logged in as {}.", outcome.session.display_name);

    let migration = &outcome.cart_migration;
    if migration.attempted() > 0 {
        println!(
            "Moved {} of {} cart item(s) to your account.",
            migration.migrated.len(),
            migration.attempted()
        );
        for failure in &migration.failures {
            println!(
                "  could not move {} (x{})",
                failure.item.product.name, failure.item.quantity
            );
        }
    }
}
