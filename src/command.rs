//! Interactive command interpreter: one prompt line in, one parsed
//! `Command` out, applied to the session for a `SessionEffect`.

use crate::query::{Category, PageDirection, SafeSearch, SetEdit, TimeRange, ValidationError};
use crate::results::sanitize_url;
use crate::session::{DisplayToggle, Session, SessionError};
use rand::Rng;
use std::str::FromStr;

/// A line the interpreter could not turn into a command. Reported and
/// forgotten; never mutates the session.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    #[error("'{verb}' takes {expected}, got {got}")]
    WrongArity {
        verb: &'static str,
        expected: &'static str,
        got: usize,
    },

    #[error("cannot mix plain names with +/- adjustments in one command")]
    MixedSetEdit,

    #[error("'{0}' is not a result index")]
    BadIndex(String),

    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

/// Which result an open/copy action targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionTarget {
    First,
    /// Zero-based.
    Index(usize),
    Random,
}

/// One parsed interactive instruction.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Engines(SetEdit<String>),
    Categories(SetEdit<Category>),
    Page(PageDirection),
    TimeRange(Option<TimeRange>),
    Site(Option<String>),
    SafeSearch(SafeSearch),
    Toggle(DisplayToggle),
    Inspect(usize),
    Open(ActionTarget),
    Copy(ActionTarget),
    Settings,
    Help,
    Exit,
    Query(String),
}

/// What the command loop must do after a command was applied.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEffect {
    /// The context changed in a way that calls for a fresh search.
    Requery,
    /// A paging move; the session fetches the adjacent page itself.
    Page(PageDirection),
    /// Re-render the current page (display flags changed).
    Redisplay,
    ShowSettings,
    /// Dump the full data of one result (zero-based, already validated).
    ShowRaw(usize),
    ShowHelp,
    OpenUrl(String),
    CopyText(String),
    Exit,
}

/// Parse one prompt line. `Ok(None)` means a blank line (no-op). Any
/// line not starting with a known verb is a fresh search query.
pub fn parse(line: &str) -> Result<Option<Command>, CommandError> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    let mut tokens = trimmed.split_whitespace();
    let verb = tokens.next().unwrap_or_default();
    let args: Vec<&str> = tokens.collect();

    let command = match verb {
        "e" => Command::Engines(parse_set_tokens(&args)?.into_owned()),
        "c" => Command::Categories(parse_set_tokens(&args)?.try_map(Category::from_str)?),
        "n" => no_args("n", &args, Command::Page(PageDirection::Next))?,
        "p" => no_args("p", &args, Command::Page(PageDirection::Previous))?,
        "f" => no_args("f", &args, Command::Page(PageDirection::First))?,
        "t" => Command::TimeRange(TimeRange::parse_token(one_arg("t", &args)?)?),
        "w" => {
            let arg = one_arg("w", &args)?;
            Command::Site(if arg == "none" { None } else { Some(arg.to_string()) })
        }
        "ss" => Command::SafeSearch(one_arg("ss", &args)?.parse()?),
        "x" => no_args("x", &args, Command::Toggle(DisplayToggle::Expand))?,
        "d" => no_args("d", &args, Command::Toggle(DisplayToggle::Debug))?,
        "a" => no_args("a", &args, Command::Toggle(DisplayToggle::Color))?,
        "j" => Command::Inspect(parse_index(one_arg("j", &args)?)?),
        "o" => Command::Open(parse_target("o", &args)?),
        "y" => Command::Copy(parse_target("y", &args)?),
        "l" => no_args("l", &args, Command::Open(ActionTarget::Random))?,
        "s" => no_args("s", &args, Command::Settings)?,
        "?" => no_args("?", &args, Command::Help)?,
        "q" | "quit" | "exit" => no_args("quit", &args, Command::Exit)?,
        _ if args.is_empty() && verb.chars().all(|c| c.is_ascii_digit()) => {
            Command::Open(ActionTarget::Index(parse_index(verb)?))
        }
        _ => Command::Query(trimmed.to_string()),
    };
    Ok(Some(command))
}

fn no_args(verb: &'static str, args: &[&str], command: Command) -> Result<Command, CommandError> {
    if args.is_empty() {
        Ok(command)
    } else {
        Err(CommandError::WrongArity {
            verb,
            expected: "no arguments",
            got: args.len(),
        })
    }
}

fn one_arg<'a>(verb: &'static str, args: &[&'a str]) -> Result<&'a str, CommandError> {
    match args {
        [arg] => Ok(arg),
        _ => Err(CommandError::WrongArity {
            verb,
            expected: "exactly one argument",
            got: args.len(),
        }),
    }
}

/// User-facing indices are 1-based.
fn parse_index(token: &str) -> Result<usize, CommandError> {
    token
        .parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .ok_or_else(|| CommandError::BadIndex(token.to_string()))
}

fn parse_target(verb: &'static str, args: &[&str]) -> Result<ActionTarget, CommandError> {
    match args {
        [] => Ok(ActionTarget::First),
        [token] => Ok(ActionTarget::Index(parse_index(token)?)),
        _ => Err(CommandError::WrongArity {
            verb,
            expected: "at most one argument",
            got: args.len(),
        }),
    }
}

/// Split raw set tokens into replace or add/remove form. Mixing a bare
/// name with a prefixed one in a single line is a syntax error.
fn parse_set_tokens<'a>(args: &[&'a str]) -> Result<SetEdit<&'a str>, CommandError> {
    let any_prefixed = args
        .iter()
        .any(|t| t.starts_with('+') || t.starts_with('-'));
    if !any_prefixed {
        return Ok(SetEdit::Replace(args.to_vec()));
    }

    let mut add = Vec::new();
    let mut remove = Vec::new();
    for token in args {
        if let Some(name) = token.strip_prefix('+') {
            add.push(name);
        } else if let Some(name) = token.strip_prefix('-') {
            remove.push(name);
        } else {
            return Err(CommandError::MixedSetEdit);
        }
    }
    Ok(SetEdit::Patch { add, remove })
}

impl<'a> SetEdit<&'a str> {
    fn into_owned(self) -> SetEdit<String> {
        match self {
            SetEdit::Replace(values) => {
                SetEdit::Replace(values.into_iter().map(str::to_string).collect())
            }
            SetEdit::Patch { add, remove } => SetEdit::Patch {
                add: add.into_iter().map(str::to_string).collect(),
                remove: remove.into_iter().map(str::to_string).collect(),
            },
        }
    }

    /// Parse every raw token before anything is applied, so a bad token
    /// rejects the whole edit.
    fn try_map<T, E>(self, mut parse: impl FnMut(&'a str) -> Result<T, E>) -> Result<SetEdit<T>, E> {
        Ok(match self {
            SetEdit::Replace(values) => {
                SetEdit::Replace(values.into_iter().map(&mut parse).collect::<Result<_, E>>()?)
            }
            SetEdit::Patch { add, remove } => SetEdit::Patch {
                add: add.into_iter().map(&mut parse).collect::<Result<_, E>>()?,
                remove: remove.into_iter().map(&mut parse).collect::<Result<_, E>>()?,
            },
        })
    }
}

/// Apply one command to the session. The requery policy lives here, per
/// variant, not inferred from which field changed: context edits return
/// `Requery`, display toggles return `Redisplay`, actions resolve their
/// target and return the external effect.
pub fn apply(
    session: &mut Session,
    command: Command,
    rng: &mut impl Rng,
) -> Result<SessionEffect, SessionError> {
    match command {
        Command::Engines(edit) => {
            let unknown = session.edit_engines(&edit)?;
            for name in unknown {
                tracing::warn!(engine = %name, "engine not in the instance roster, passing through");
            }
            Ok(SessionEffect::Requery)
        }
        Command::Categories(edit) => {
            session.edit_categories(&edit)?;
            Ok(SessionEffect::Requery)
        }
        Command::Page(direction) => Ok(SessionEffect::Page(direction)),
        Command::TimeRange(range) => {
            session.set_time_range(range)?;
            Ok(SessionEffect::Requery)
        }
        Command::Site(site) => {
            session.set_site(site)?;
            Ok(SessionEffect::Requery)
        }
        Command::SafeSearch(level) => {
            session.set_safe_search(level)?;
            Ok(SessionEffect::Requery)
        }
        Command::Query(text) => {
            session.set_query(&text)?;
            Ok(SessionEffect::Requery)
        }
        Command::Toggle(toggle) => {
            session.toggle(toggle);
            Ok(SessionEffect::Redisplay)
        }
        Command::Inspect(index) => {
            session.result_at(index)?;
            Ok(SessionEffect::ShowRaw(index))
        }
        Command::Open(target) => {
            let url = resolve_url(session, target, rng)?;
            Ok(SessionEffect::OpenUrl(url))
        }
        Command::Copy(target) => {
            let url = resolve_url(session, target, rng)?;
            Ok(SessionEffect::CopyText(url))
        }
        Command::Settings => Ok(SessionEffect::ShowSettings),
        Command::Help => Ok(SessionEffect::ShowHelp),
        Command::Exit => {
            session.close();
            Ok(SessionEffect::Exit)
        }
    }
}

fn resolve_url(
    session: &Session,
    target: ActionTarget,
    rng: &mut impl Rng,
) -> Result<String, SessionError> {
    let result = match target {
        ActionTarget::Index(index) => session.result_at(index)?,
        ActionTarget::First => &session.displayed_results()?[0],
        ActionTarget::Random => {
            let results = session.displayed_results()?;
            &results[rng.gen_range(0..results.len())]
        }
    };
    Ok(sanitize_url(&result.url))
}
