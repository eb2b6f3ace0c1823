//! Command-line client for the ActsFile auth server.
//!
//! Restores the stored session on start, then reads commands from stdin
//! until `quit` or end of input.

use actsfile::auth::{RegisterRequest, User};
use af_client::{
    auth_context::{AuthContext, AuthOutcome},
    auth_service::AuthService,
    commands::{Command, HELP_TEXT, parse_command},
    config::ClientConfig,
    diagnostics::NetworkDiagnosis,
};
use anyhow::Result;
use pico_args::Arguments;
use std::{
    io::{self, BufRead, Write},
    path::PathBuf,
};

const HELP: &str = "\
Command-line client for an ActsFile server

USAGE:
  af_client [OPTIONS]

OPTIONS:
  --server URL          Server URL  [default: http://127.0.0.1:3000]
  --session-file PATH   Where the session token is kept
                        [default: ~/.actsfile/session]

FLAGS:
  -h, --help            Print help information

ENVIRONMENT:
  ACTSFILE_SERVER, ACTSFILE_SESSION_FILE, ACTSFILE_REQUEST_TIMEOUT_SECS,
  ACTSFILE_VERIFY_TIMEOUT_SECS, ACTSFILE_PROBE_TIMEOUT_SECS, RUST_LOG
";

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let mut pargs = Arguments::from_env();

    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let server: Option<String> = pargs.opt_value_from_str("--server")?;
    let session_file: Option<PathBuf> = pargs.opt_value_from_str("--session-file")?;

    let mut config = ClientConfig::from_env(server);
    if let Some(path) = session_file {
        config.session_file = path;
    }

    run(config).await
}

async fn run(config: ClientConfig) -> Result<()> {
    println!("ActsFile client for {}", config.server_url);

    let context = AuthContext::new(AuthService::from_config(&config));
    context.initialize().await;

    match context.user() {
        Some(user) => println!("Welcome back, {}!", user.name),
        None => println!("Not logged in. Type 'help' to see available commands."),
    }

    let stdin = io::stdin();
    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut input = String::new();
        if stdin.lock().read_line(&mut input)? == 0 {
            break;
        }
        if input.trim().is_empty() {
            continue;
        }

        let command = match parse_command(&input) {
            Ok(command) => command,
            Err(e) => {
                println!("{}", e);
                continue;
            }
        };

        match command {
            Command::Login { email, password } => {
                let outcome = context.login_with_preflight(&email, &password).await;
                if outcome.success {
                    if let Some(user) = context.user() {
                        println!("Logged in as {} <{}>", user.name, user.email);
                    }
                } else {
                    report_failure(&outcome);
                }
            }
            Command::Register {
                email,
                password,
                name,
            } => {
                let agree_to_terms = confirm("Do you agree to the terms and conditions? [y/N] ")?;
                let outcome = context
                    .register(RegisterRequest {
                        name,
                        email,
                        password,
                        phone: None,
                        location: None,
                        agree_to_terms,
                    })
                    .await;
                report(&outcome, "Registration successful. Check your email to verify your account.");
            }
            Command::Logout => {
                context.logout();
                println!("Logged out");
            }
            Command::WhoAmI => match context.refresh().await {
                Some(user) => print_user(&user),
                None => println!("Not logged in"),
            },
            Command::UpdateProfile(update) => {
                let outcome = context.update_profile(update).await;
                report(&outcome, "Profile updated");
            }
            Command::ChangePassword { current, new } => {
                let outcome = context.change_password(&current, &new).await;
                report(&outcome, "Password updated");
            }
            Command::ResetPassword { email } => {
                let outcome = context.request_password_reset(&email).await;
                report(
                    &outcome,
                    "If an account exists for that email, a reset link is on its way.",
                );
            }
            Command::ConfirmReset {
                token,
                new_password,
            } => {
                let outcome = context.confirm_password_reset(&token, &new_password).await;
                report(&outcome, "Password reset. You can log in now.");
            }
            Command::VerifyEmail { token } => {
                let outcome = context.verify_email(&token).await;
                report(&outcome, "Email verified. You can log in now.");
            }
            Command::Diagnose => print_diagnosis(&context.diagnose().await),
            Command::Help => print!("{HELP_TEXT}"),
            Command::Quit => break,
        }
    }

    Ok(())
}

fn confirm(prompt: &str) -> Result<bool> {
    print!("{}", prompt);
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes"))
}

fn report(outcome: &AuthOutcome, success_message: &str) {
    if outcome.success {
        println!("{}", success_message);
    } else {
        report_failure(outcome);
    }
}

fn report_failure(outcome: &AuthOutcome) {
    println!(
        "Error: {}",
        outcome.error.as_deref().unwrap_or("Something went wrong")
    );
    if outcome.suggest_diagnostics {
        println!("Type 'diagnose' to check your connection.");
    }
}

fn print_user(user: &User) {
    println!("{} <{}>", user.name, user.email);
    println!("  id:       {}", user.id);
    println!("  joined:   {}", user.join_date.format("%Y-%m-%d"));
    println!("  verified: {}", user.is_verified);
    for (label, value) in [
        ("phone", &user.phone),
        ("location", &user.location),
        ("bio", &user.bio),
        ("avatar", &user.avatar),
    ] {
        if let Some(value) = value {
            println!("  {:<9} {}", format!("{}:", label), value);
        }
    }
    println!(
        "  privacy:  {:?}, notifications {}, newsletter {}",
        user.preferences.privacy, user.preferences.notifications, user.preferences.newsletter
    );
}

fn print_diagnosis(diagnosis: &NetworkDiagnosis) {
    println!(
        "Connectivity: {}",
        if diagnosis.connectivity { "ok" } else { "offline" }
    );
    println!(
        "API health:   {}",
        if diagnosis.api_health { "ok" } else { "unavailable" }
    );
    match (diagnosis.connection.rtt_ms, diagnosis.connection.effective_type) {
        (Some(rtt), Some(kind)) => println!("Round trip:   {} ms ({})", rtt, kind.as_str()),
        _ => println!("Round trip:   unknown"),
    }
    if let Some(error) = &diagnosis.endpoint.error {
        println!("Endpoint:     {}", error);
    }
    for advice in &diagnosis.recommendations {
        println!("  - {}", advice);
    }
}
