use crate::Registry;
use crate::input::parser::Command;
use crate::state::session::Session;
use madam_core::{EngineError, PageEvent};
use thiserror::Error;

pub type CommandResult = Result<Flow, CommandError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("unknown command: {0} (type `help` for commands)")]
    UnknownCommand(String),

    #[error("no card `{0}` on the walls")]
    NoSuchCard(String),

    #[error(transparent)]
    Engine(#[from] EngineError),
}

pub const HELP: &str = "\
Commands:
  order            step up to the counter
  close            step away again
  <number>         pick one of madame's choices
  <text>           answer when she asks you something
  cards            list the art on the walls
  card <n|id>      look at a card
  dismiss          put the card back
  status           what you carry and how it is going
  quit             leave the shop
Inside a conversation prefix commands with `/`, e.g. `/close`.";

pub fn process_command(cmd: Command, sess: &mut Session, registry: &Registry) -> CommandResult {
    match cmd {
        Command::Nothing => {}
        Command::Page(event) => sess.page.handle(event)?,
        Command::Card(arg) => {
            let id = resolve_card(&arg, sess)?;
            sess.page.handle(PageEvent::ClickCard { id })?;
        }
        Command::Cards => sess.notice(card_list(sess)),
        Command::Status => sess.notice(format!("{} | online: {}", sess.status_line(), registry.online_count())),
        Command::Help => sess.notice(HELP),
        Command::Quit => {
            sess.notice("Au revoir!");
            return Ok(Flow::Quit);
        }
        Command::Unknown(raw) => return Err(CommandError::UnknownCommand(raw)),
    }

    Ok(Flow::Continue)
}

/// `card 2` means the second card, anything else is taken as an id.
fn resolve_card(arg: &str, sess: &Session) -> Result<String, CommandError> {
    let cards = sess.page.gallery().cards();

    let card = match arg.parse::<usize>() {
        Ok(n) if n >= 1 => cards.get(n - 1),
        Ok(_) => None,
        Err(_) => cards.iter().find(|c| c.id == arg),
    };

    card.map(|c| c.id.clone()).ok_or_else(|| CommandError::NoSuchCard(arg.to_string()))
}

fn card_list(sess: &Session) -> String {
    let cards = sess.page.gallery().cards();
    if cards.is_empty() {
        return "The walls are bare.".to_string();
    }

    let mut out = String::from("On the walls:");
    for (i, card) in cards.iter().enumerate() {
        out.push_str(&format!("\n  {}) {} [{}]", i + 1, card.title, card.id));
    }
    out
}
