//! Operator command parsing and authorization

use predictor::ChatId;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum CommandError {
    #[error("Commande inconnue : /{0}")]
    Unknown(String),

    #[error("Usage : {0}")]
    Usage(&'static str),

    #[error("Nombre invalide : {0}")]
    InvalidNumber(String),
}

pub type Result<T> = std::result::Result<T, CommandError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RedirectArgs {
    Set { source: ChatId, destination: ChatId },
    List,
    Clear,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    Help,
    About,
    Dev,
    /// Show the cooldown, or set it in seconds
    Cooldown(Option<u64>),
    Redirect(RedirectArgs),
    /// Send the source feed's predictions to the issuing chat
    Redi,
    Reset,
    Announce(String),
    Pred,
}

const COOLDOWN_USAGE: &str = "/cooldown [secondes]";
const REDIRECT_USAGE: &str = "/redirect <source> <cible> | list | clear";
const ANNOUNCE_USAGE: &str = "/announce <message>";

fn parse_number<T: std::str::FromStr>(raw: &str) -> Result<T> {
    raw.parse()
        .map_err(|_| CommandError::InvalidNumber(raw.to_string()))
}

impl Command {
    /// Parse a slash command.
    ///
    /// `/cmd@other_bot` addressed to another bot yields `Ok(None)`.
    pub fn parse(text: &str, bot_username: Option<&str>) -> Result<Option<Command>> {
        let text = text.trim();
        let Some(body) = text.strip_prefix('/') else {
            return Ok(None);
        };

        let (head, rest) = match body.split_once(char::is_whitespace) {
            Some((head, rest)) => (head, rest.trim()),
            None => (body, ""),
        };

        let name = match head.split_once('@') {
            Some((name, addressee)) => {
                if let Some(me) = bot_username {
                    if !addressee.eq_ignore_ascii_case(me) {
                        return Ok(None);
                    }
                }
                name
            }
            None => head,
        };

        let args: Vec<&str> = rest.split_whitespace().collect();

        let command = match name.to_ascii_lowercase().as_str() {
            "start" => Command::Start,
            "help" => Command::Help,
            "about" => Command::About,
            "dev" => Command::Dev,
            "cooldown" => match args.as_slice() {
                [] => Command::Cooldown(None),
                [secs] => Command::Cooldown(Some(parse_number(secs)?)),
                _ => return Err(CommandError::Usage(COOLDOWN_USAGE)),
            },
            "redirect" => match args.as_slice() {
                [] => Command::Redirect(RedirectArgs::List),
                [word] if word.eq_ignore_ascii_case("list") => Command::Redirect(RedirectArgs::List),
                [word] if word.eq_ignore_ascii_case("clear") => Command::Redirect(RedirectArgs::Clear),
                [source, destination] => Command::Redirect(RedirectArgs::Set {
                    source: parse_number(source)?,
                    destination: parse_number(destination)?,
                }),
                _ => return Err(CommandError::Usage(REDIRECT_USAGE)),
            },
            "redi" => Command::Redi,
            "reset" => Command::Reset,
            "announce" => {
                if rest.is_empty() {
                    return Err(CommandError::Usage(ANNOUNCE_USAGE));
                }
                Command::Announce(rest.to_string())
            }
            "pred" => Command::Pred,
            other => return Err(CommandError::Unknown(other.to_string())),
        };

        Ok(Some(command))
    }

    /// Name as typed, for logs
    pub fn name(&self) -> &'static str {
        match self {
            Command::Start => "start",
            Command::Help => "help",
            Command::About => "about",
            Command::Dev => "dev",
            Command::Cooldown(_) => "cooldown",
            Command::Redirect(_) => "redirect",
            Command::Redi => "redi",
            Command::Reset => "reset",
            Command::Announce(_) => "announce",
            Command::Pred => "pred",
        }
    }
}

/// Decides who may run commands
#[derive(Debug, Clone, Copy)]
pub struct Authorizer {
    admin_id: i64,
    debug_mode: bool,
}

impl Authorizer {
    pub fn new(admin_id: i64, debug_mode: bool) -> Self {
        Self { admin_id, debug_mode }
    }

    /// Anonymous senders (channel posts) are only allowed in debug mode
    pub fn is_authorized(&self, user_id: Option<i64>) -> bool {
        if self.debug_mode {
            return true;
        }
        matches!(user_id, Some(id) if id != 0 && id == self.admin_id)
    }
}
