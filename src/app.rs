use crate::cli::Args;
use crate::commands::{Session, dispatcher::CommandDispatcher};
use crate::config::Config;
use crate::core::error::DchatError;
use crate::discussion::Role;
use crate::display;
use crate::input;
use crate::providers::ModelGateway;
use crate::store::RecordStore;

pub struct Application {
    pub args: Args,
    pub config: Config,
    pub gateway: Box<dyn ModelGateway>,
    pub dispatcher: CommandDispatcher,
}

impl Application {
    pub fn new(
        args: Args,
        config: Config,
        gateway: Box<dyn ModelGateway>,
        dispatcher: CommandDispatcher,
    ) -> Self {
        Self {
            args,
            config,
            gateway,
            dispatcher,
        }
    }

    /// The REPL: one input line at a time, to completion, until `!exit`
    /// or EOF.
    pub async fn run(&mut self) -> Result<(), DchatError> {
        let storage_dir = self
            .args
            .storage_dir
            .clone()
            .unwrap_or_else(|| self.config.discussions_dir());
        let store = RecordStore::open(storage_dir)?;

        let default_model = self
            .args
            .model
            .clone()
            .unwrap_or_else(|| self.config.model.clone());
        let mut session = Session::new(
            store,
            default_model,
            self.config.token_limit,
            self.config.auto_confirm,
        );

        let mut editor = input::create_editor(self.dispatcher.clone())?;
        display::welcome();

        loop {
            let Some(line) = input::read_input(&mut editor)? else {
                break;
            };
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            if let Some(rest) = line.strip_prefix('!') {
                let parts: Vec<&str> = rest.split_whitespace().collect();
                let Some((command, args)) = parts.split_first() else {
                    display::print_error(&DchatError::UnknownCommand(String::new()));
                    continue;
                };

                match self.dispatcher.execute(command, args, &mut session) {
                    Ok(Some(output)) => println!("{}", output),
                    Ok(None) => {}
                    Err(e) => display::print_error(&e),
                }

                if !session.should_continue {
                    break;
                }
                continue;
            }

            match chat_turn(self.gateway.as_ref(), &mut session, line).await {
                Ok(reply) => display::display_reply(&reply),
                Err(e) => display::print_error(&e),
            }
        }

        // Ctrl-D leaves the loop without !exit; persist the open discussion
        session.close_open()?;
        input::save_history(&mut editor)?;
        display::goodbye();
        Ok(())
    }
}

/// One chat turn: append the user message, persist, call the gateway,
/// append and persist the reply. On gateway failure the user message is
/// already on disk and no assistant message is appended.
pub async fn chat_turn(
    gateway: &dyn ModelGateway,
    session: &mut Session,
    text: &str,
) -> Result<String, DchatError> {
    session
        .open_discussion()?
        .add_message(Role::User, text);
    session.save_open()?;

    let (history, model) = {
        let discussion = session.open_discussion()?;
        (
            discussion.history_for_request(),
            discussion.model().to_string(),
        )
    };

    let reply = gateway.complete(&history, &model).await?;

    session
        .open_discussion()?
        .add_message(Role::Assistant, reply.clone());
    session.save_open()?;

    Ok(reply)
}
