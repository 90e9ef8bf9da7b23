use std::collections::HashMap;
use std::sync::Arc;

use crate::commands::Session;
use crate::commands::handler::CommandHandler;
use crate::core::error::DchatError;

/// Exact-match lookup from command token to handler. Canonical names and
/// their short aliases share one handler instance.
pub struct CommandRegistry {
    handlers: HashMap<String, Arc<dyn CommandHandler>>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    pub fn register<C: CommandHandler + 'static>(&mut self, name: &str, alias: &str, command: C) {
        let handler: Arc<dyn CommandHandler> = Arc::new(command);
        self.handlers.insert(name.to_string(), Arc::clone(&handler));
        self.handlers.insert(alias.to_string(), handler);
    }

    pub fn execute(
        &self,
        name: &str,
        args: &[&str],
        session: &mut Session,
    ) -> Result<Option<String>, DchatError> {
        self.handlers
            .get(name)
            .ok_or_else(|| DchatError::UnknownCommand(name.to_string()))
            .and_then(|handler| handler.execute(session, args))
    }

    pub fn command_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.handlers.keys().cloned().collect();
        names.sort();
        names
    }
}
