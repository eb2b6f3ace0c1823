use actsfile::auth::{PreferencesUpdate, ProfileUpdate, Visibility};
use std::fmt;

/// A line typed at the client prompt.
#[derive(Debug, Clone)]
pub enum Command {
    Login { email: String, password: String },
    Register { email: String, password: String, name: String },
    Logout,
    /// Show the current user
    WhoAmI,
    UpdateProfile(ProfileUpdate),
    ChangePassword { current: String, new: String },
    ResetPassword { email: String },
    ConfirmReset { token: String, new_password: String },
    VerifyEmail { token: String },
    Diagnose,
    Help,
    Quit,
}

/// Errors that can occur during command parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// A command was given too few arguments.
    MissingArguments { usage: &'static str },
    /// Unknown field for the `profile` command.
    UnknownProfileField(String),
    /// Value not accepted for a profile field.
    InvalidValue { field: &'static str, value: String },
    /// Unrecognized command.
    UnrecognizedCommand(String),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingArguments { usage } => write!(f, "Missing arguments. Usage: {}", usage),
            Self::UnknownProfileField(field) => write!(
                f,
                "Unknown profile field '{}'. Use name, phone, avatar, bio, location, privacy, notifications or newsletter",
                field
            ),
            Self::InvalidValue { field, value } => {
                write!(f, "Invalid value '{}' for {}", value, field)
            }
            Self::UnrecognizedCommand(cmd) => write!(
                f,
                "Unrecognized command '{}'. Type 'help' to see available commands",
                cmd
            ),
        }
    }
}

impl std::error::Error for ParseError {}

pub const HELP_TEXT: &str = "\
Commands:
  login EMAIL PASSWORD               Log in and store the session
  register EMAIL PASSWORD NAME...    Create an account
  verify-email TOKEN                 Confirm an email address
  whoami                             Show the current user
  profile FIELD VALUE...             Update name|phone|avatar|bio|location,
                                     privacy public|friends|private,
                                     notifications on|off, newsletter on|off
  passwd CURRENT NEW                 Change password
  reset EMAIL                        Request a password reset
  reset-confirm TOKEN NEW            Set a new password with a reset token
  diagnose                           Check the connection to the server
  logout                             Forget the stored session
  help                               Show this help
  quit                               Exit
";

/// Parse a command string into a [`Command`].
///
/// # Examples
///
/// ```
/// use af_client::commands::{Command, parse_command};
///
/// assert!(matches!(parse_command("logout"), Ok(Command::Logout)));
/// assert!(matches!(
///     parse_command("login a@b.com longenough"),
///     Ok(Command::Login { .. })
/// ));
/// ```
pub fn parse_command(input: &str) -> Result<Command, ParseError> {
    let trimmed = input.trim();

    // Try single-word commands first
    match trimmed {
        "logout" => return Ok(Command::Logout),
        "whoami" => return Ok(Command::WhoAmI),
        "diagnose" => return Ok(Command::Diagnose),
        "help" => return Ok(Command::Help),
        "quit" | "exit" => return Ok(Command::Quit),
        _ => {}
    }

    let parts: Vec<&str> = trimmed.split_ascii_whitespace().collect();
    match parts.first() {
        Some(&"login") => match (parts.get(1), parts.get(2)) {
            (Some(email), Some(password)) => Ok(Command::Login {
                email: email.to_string(),
                password: password.to_string(),
            }),
            _ => Err(ParseError::MissingArguments {
                usage: "login EMAIL PASSWORD",
            }),
        },
        Some(&"register") if parts.len() >= 4 => Ok(Command::Register {
            email: parts[1].to_string(),
            password: parts[2].to_string(),
            name: parts[3..].join(" "),
        }),
        Some(&"register") => Err(ParseError::MissingArguments {
            usage: "register EMAIL PASSWORD NAME...",
        }),
        Some(&"verify-email") => parts
            .get(1)
            .map(|token| Command::VerifyEmail {
                token: token.to_string(),
            })
            .ok_or(ParseError::MissingArguments {
                usage: "verify-email TOKEN",
            }),
        Some(&"profile") => parse_profile_command(&parts),
        Some(&"passwd") => match (parts.get(1), parts.get(2)) {
            (Some(current), Some(new)) => Ok(Command::ChangePassword {
                current: current.to_string(),
                new: new.to_string(),
            }),
            _ => Err(ParseError::MissingArguments {
                usage: "passwd CURRENT NEW",
            }),
        },
        Some(&"reset") => parts
            .get(1)
            .map(|email| Command::ResetPassword {
                email: email.to_string(),
            })
            .ok_or(ParseError::MissingArguments {
                usage: "reset EMAIL",
            }),
        Some(&"reset-confirm") => match (parts.get(1), parts.get(2)) {
            (Some(token), Some(new_password)) => Ok(Command::ConfirmReset {
                token: token.to_string(),
                new_password: new_password.to_string(),
            }),
            _ => Err(ParseError::MissingArguments {
                usage: "reset-confirm TOKEN NEW",
            }),
        },
        _ => Err(ParseError::UnrecognizedCommand(trimmed.to_string())),
    }
}

/// Parse "profile FIELD VALUE..." into a single-field update
fn parse_profile_command(parts: &[&str]) -> Result<Command, ParseError> {
    const USAGE: &str = "profile FIELD VALUE...";

    let field = parts.get(1).ok_or(ParseError::MissingArguments { usage: USAGE })?;
    if parts.len() < 3 {
        return Err(ParseError::MissingArguments { usage: USAGE });
    }
    let value = parts[2..].join(" ");

    let mut update = ProfileUpdate::default();
    match *field {
        "name" => update.name = Some(value),
        "phone" => update.phone = Some(value),
        "avatar" => update.avatar = Some(value),
        "bio" => update.bio = Some(value),
        "location" => update.location = Some(value),
        "privacy" => {
            let privacy = match value.as_str() {
                "public" => Visibility::Public,
                "friends" => Visibility::Friends,
                "private" => Visibility::Private,
                _ => {
                    return Err(ParseError::InvalidValue {
                        field: "privacy",
                        value,
                    });
                }
            };
            update.preferences = Some(PreferencesUpdate {
                privacy: Some(privacy),
                ..Default::default()
            });
        }
        "notifications" => {
            update.preferences = Some(PreferencesUpdate {
                notifications: Some(parse_switch("notifications", value)?),
                ..Default::default()
            });
        }
        "newsletter" => {
            update.preferences = Some(PreferencesUpdate {
                newsletter: Some(parse_switch("newsletter", value)?),
                ..Default::default()
            });
        }
        other => return Err(ParseError::UnknownProfileField(other.to_string())),
    }

    Ok(Command::UpdateProfile(update))
}

fn parse_switch(field: &'static str, value: String) -> Result<bool, ParseError> {
    match value.as_str() {
        "on" | "true" | "yes" => Ok(true),
        "off" | "false" | "no" => Ok(false),
        _ => Err(ParseError::InvalidValue { field, value }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // === Single-word command tests ===

    #[test]
    fn test_parse_single_words() {
        assert!(matches!(parse_command("logout"), Ok(Command::Logout)));
        assert!(matches!(parse_command("whoami"), Ok(Command::WhoAmI)));
        assert!(matches!(parse_command("diagnose"), Ok(Command::Diagnose)));
        assert!(matches!(parse_command("help"), Ok(Command::Help)));
        assert!(matches!(parse_command("exit"), Ok(Command::Quit)));
    }

    #[test]
    fn test_parse_with_surrounding_whitespace() {
        assert!(matches!(parse_command("  logout  "), Ok(Command::Logout)));
    }

    // === Multi-word command tests ===

    #[test]
    fn test_parse_login() {
        match parse_command("login a@b.com longenough") {
            Ok(Command::Login { email, password }) => {
                assert_eq!(email, "a@b.com");
                assert_eq!(password, "longenough");
            }
            other => panic!("Expected login, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_login_missing_password() {
        assert!(matches!(
            parse_command("login a@b.com"),
            Err(ParseError::MissingArguments { .. })
        ));
    }

    #[test]
    fn test_parse_register_joins_name() {
        match parse_command("register a@b.com longenough Ama Owusu") {
            Ok(Command::Register { name, .. }) => assert_eq!(name, "Ama Owusu"),
            other => panic!("Expected register, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_profile_bio() {
        match parse_command("profile bio Planting trees in Kigali") {
            Ok(Command::UpdateProfile(update)) => {
                assert_eq!(update.bio.as_deref(), Some("Planting trees in Kigali"));
                assert!(update.name.is_none());
            }
            other => panic!("Expected profile update, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_profile_privacy() {
        match parse_command("profile privacy friends") {
            Ok(Command::UpdateProfile(update)) => {
                let prefs = update.preferences.unwrap();
                assert_eq!(prefs.privacy, Some(Visibility::Friends));
                assert_eq!(prefs.newsletter, None);
            }
            other => panic!("Expected profile update, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_profile_bad_values() {
        assert!(matches!(
            parse_command("profile privacy everyone"),
            Err(ParseError::InvalidValue { field: "privacy", .. })
        ));
        assert!(matches!(
            parse_command("profile newsletter maybe"),
            Err(ParseError::InvalidValue { field: "newsletter", .. })
        ));
        assert!(matches!(
            parse_command("profile email x@y.com"),
            Err(ParseError::UnknownProfileField(_))
        ));
    }

    #[test]
    fn test_parse_reset_confirm() {
        assert!(matches!(
            parse_command("reset-confirm tok newpassword"),
            Ok(Command::ConfirmReset { .. })
        ));
        assert!(matches!(
            parse_command("reset-confirm tok"),
            Err(ParseError::MissingArguments { .. })
        ));
    }

    // === Error cases ===

    #[test]
    fn test_parse_unrecognized_command() {
        assert!(matches!(
            parse_command("fold"),
            Err(ParseError::UnrecognizedCommand(_))
        ));
        assert!(matches!(
            parse_command("   "),
            Err(ParseError::UnrecognizedCommand(_))
        ));
    }

    #[test]
    fn test_error_message_unrecognized_command() {
        let msg = ParseError::UnrecognizedCommand("xyz".to_string()).to_string();
        assert!(msg.contains("Unrecognized command"));
        assert!(msg.contains("xyz"));
        assert!(msg.contains("help"));
    }

    #[test]
    fn test_error_message_missing_arguments() {
        let msg = ParseError::MissingArguments {
            usage: "passwd CURRENT NEW",
        }
        .to_string();
        assert!(msg.contains("passwd CURRENT NEW"));
    }
}
