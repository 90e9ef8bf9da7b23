use std::sync::Arc;

use super::{
    Session,
    handler::{
        CloseCommand, CopyCommand, DeleteAllCommand, DeleteCommand, ExitCommand, HelpCommand,
        HistoryCommand, InfoCommand, ModelCommand, NewCommand, OpenCommand, SearchCommand,
        SystemCommand, TitleCommand, TokenLimitCommand,
    },
    registry::CommandRegistry,
};
use crate::core::error::DchatError;

#[derive(Clone)]
pub struct CommandDispatcher {
    registry: Arc<CommandRegistry>,
}

impl CommandDispatcher {
    pub fn new(registry: Arc<CommandRegistry>) -> Self {
        Self { registry }
    }

    pub fn execute(
        &self,
        command: &str,
        args: &[&str],
        session: &mut Session,
    ) -> Result<Option<String>, DchatError> {
        self.registry.execute(command, args, session)
    }

    pub fn command_names(&self) -> Vec<String> {
        self.registry.command_names()
    }
}

pub fn create_command_registry() -> CommandDispatcher {
    let mut registry = CommandRegistry::new();

    registry.register("open", "o", OpenCommand);
    registry.register("new", "n", NewCommand);
    registry.register("close", "x", CloseCommand);
    registry.register("model", "m", ModelCommand);
    registry.register("title", "t", TitleCommand);
    registry.register("delete", "d", DeleteCommand);
    registry.register("delete_all", "da", DeleteAllCommand);
    registry.register("history", "h", HistoryCommand);
    registry.register("copy", "c", CopyCommand);
    registry.register("search", "f", SearchCommand);
    registry.register("info", "i", InfoCommand);
    registry.register("system", "sys", SystemCommand);
    registry.register("token_limit", "tl", TokenLimitCommand);
    registry.register("exit", "q", ExitCommand);
    registry.register("help", "?", HelpCommand);

    CommandDispatcher::new(Arc::new(registry))
}
