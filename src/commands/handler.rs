use console::style;

use super::Session;
use crate::core::error::DchatError;
use crate::discussion::Discussion;
use crate::display;
use crate::utils::clipboard;

pub trait CommandHandler: Send + Sync {
    fn execute(&self, session: &mut Session, args: &[&str]) -> Result<Option<String>, DchatError>;
    fn help(&self) -> &'static str;
}

pub struct OpenCommand;
pub struct NewCommand;
pub struct CloseCommand;
pub struct ModelCommand;
pub struct TitleCommand;
pub struct DeleteCommand;
pub struct DeleteAllCommand;
pub struct HistoryCommand;
pub struct CopyCommand;
pub struct SearchCommand;
pub struct InfoCommand;
pub struct SystemCommand;
pub struct TokenLimitCommand;
pub struct ExitCommand;
pub struct HelpCommand;

impl CommandHandler for OpenCommand {
    fn execute(&self, session: &mut Session, args: &[&str]) -> Result<Option<String>, DchatError> {
        let summaries = session.store.list()?;

        if args.is_empty() {
            if summaries.is_empty() {
                return Ok(Some(
                    "No discussions yet. Start one with !new <title>.".to_string(),
                ));
            }
            display::display_listing(&summaries);
            return Ok(Some(
                "Open one with !open <id> or !open <code>.".to_string(),
            ));
        }

        let key = args[0];
        let summary = match key.parse::<usize>() {
            Ok(ordinal) => summaries.iter().find(|s| s.id == ordinal),
            Err(_) => summaries.iter().find(|s| s.code == key),
        }
        .ok_or_else(|| DchatError::NotFound(key.to_string()))?;

        let mut discussion = session.store.load(&summary.code)?;
        discussion.id = summary.id;

        session.close_open()?;
        let title = discussion.title().to_string();
        session.open = Some(discussion);
        Ok(Some(format!("Opened discussion: {}", title)))
    }

    fn help(&self) -> &'static str {
        "!open [id|code] (!o) - List discussions, or open one by ordinal or code"
    }
}

impl CommandHandler for NewCommand {
    fn execute(&self, session: &mut Session, args: &[&str]) -> Result<Option<String>, DchatError> {
        let title = args.join(" ");
        if title.is_empty() {
            return Err(DchatError::InvalidArgument(
                "Usage: !new <title>".to_string(),
            ));
        }

        session.close_open()?;

        let code = session.store.generate_code();
        let id = session.store.next_ordinal()?;
        let mut discussion = Discussion::new(
            code,
            id,
            title.clone(),
            session.default_model.clone(),
            session.default_token_limit,
        );
        session.store.save(&mut discussion)?;
        session.open = Some(discussion);
        Ok(Some(format!("Created discussion: {}", title)))
    }

    fn help(&self) -> &'static str {
        "!new <title> (!n) - Create and open a new discussion"
    }
}

impl CommandHandler for CloseCommand {
    fn execute(&self, session: &mut Session, _args: &[&str]) -> Result<Option<String>, DchatError> {
        session.open_discussion()?;
        session.close_open()?;
        Ok(Some("Discussion closed.".to_string()))
    }

    fn help(&self) -> &'static str {
        "!close (!x) - Save and close the current discussion"
    }
}

impl CommandHandler for ModelCommand {
    fn execute(&self, session: &mut Session, args: &[&str]) -> Result<Option<String>, DchatError> {
        let discussion = session.open_discussion()?;
        if args.is_empty() {
            return Ok(Some(format!("Current model: {}", discussion.model())));
        }
        discussion.set_model(args[0]);
        let model = discussion.model().to_string();
        session.save_open()?;
        Ok(Some(format!("Model changed to: {}", model)))
    }

    fn help(&self) -> &'static str {
        "!model [name] (!m) - Show or change the model for the current discussion"
    }
}

impl CommandHandler for TitleCommand {
    fn execute(&self, session: &mut Session, args: &[&str]) -> Result<Option<String>, DchatError> {
        let discussion = session.open_discussion()?;
        let title = args.join(" ");
        if title.is_empty() {
            return Err(DchatError::InvalidArgument(
                "Usage: !title <title>".to_string(),
            ));
        }
        discussion.set_title(&title);
        session.save_open()?;
        Ok(Some(format!("Title changed to: {}", title)))
    }

    fn help(&self) -> &'static str {
        "!title <title> (!t) - Rename the current discussion"
    }
}

impl CommandHandler for DeleteCommand {
    fn execute(&self, session: &mut Session, _args: &[&str]) -> Result<Option<String>, DchatError> {
        session.open_discussion()?;
        if !session.auto_confirm
            && !display::prompt_confirmation("Delete the current discussion? This cannot be undone.")
        {
            return Ok(Some("Deletion cancelled.".to_string()));
        }

        let Some(discussion) = session.open.take() else {
            return Err(DchatError::NoActiveDiscussion);
        };
        session.store.delete(&discussion.code)?;
        Ok(Some("Discussion deleted.".to_string()))
    }

    fn help(&self) -> &'static str {
        "!delete (!d) - Delete the current discussion"
    }
}

impl CommandHandler for DeleteAllCommand {
    fn execute(&self, session: &mut Session, _args: &[&str]) -> Result<Option<String>, DchatError> {
        if !session.auto_confirm
            && !display::prompt_confirmation("Delete all discussions? This cannot be undone.")
        {
            return Ok(Some("Deletion cancelled.".to_string()));
        }

        session.open = None;
        session.store.delete_all()?;
        Ok(Some("All discussions deleted.".to_string()))
    }

    fn help(&self) -> &'static str {
        "!delete_all (!da) - Delete every discussion"
    }
}

impl CommandHandler for HistoryCommand {
    fn execute(&self, session: &mut Session, _args: &[&str]) -> Result<Option<String>, DchatError> {
        let discussion = session.open_discussion()?;
        let history = discussion.history();
        if history.is_empty() {
            return Ok(Some("No messages yet.".to_string()));
        }
        display::display_history(&history);
        Ok(None)
    }

    fn help(&self) -> &'static str {
        "!history (!h) - Show the full history of the current discussion"
    }
}

impl CommandHandler for CopyCommand {
    fn execute(&self, session: &mut Session, _args: &[&str]) -> Result<Option<String>, DchatError> {
        let discussion = session.open_discussion()?;
        let Some(reply) = discussion.last_assistant_reply() else {
            return Ok(Some("No assistant reply to copy.".to_string()));
        };
        clipboard::copy_to_clipboard(reply)?;
        Ok(Some(
            "Last assistant reply copied to clipboard.".to_string(),
        ))
    }

    fn help(&self) -> &'static str {
        "!copy (!c) - Copy the last assistant reply to the clipboard"
    }
}

impl CommandHandler for SearchCommand {
    fn execute(&self, session: &mut Session, args: &[&str]) -> Result<Option<String>, DchatError> {
        let discussion = session.open_discussion()?;
        let needle = args.join(" ");
        if needle.is_empty() {
            return Err(DchatError::InvalidArgument(
                "Usage: !search <text>".to_string(),
            ));
        }
        let matches = discussion.search(&needle);
        if matches.is_empty() {
            return Ok(Some(format!("No messages matching \"{}\".", needle)));
        }
        display::display_history(&matches);
        Ok(None)
    }

    fn help(&self) -> &'static str {
        "!search <text> (!f) - Search the current discussion's history"
    }
}

impl CommandHandler for InfoCommand {
    fn execute(&self, session: &mut Session, _args: &[&str]) -> Result<Option<String>, DchatError> {
        let discussion = session.open_discussion()?;
        display::display_info(discussion);
        Ok(None)
    }

    fn help(&self) -> &'static str {
        "!info (!i) - Show details of the current discussion"
    }
}

impl CommandHandler for SystemCommand {
    fn execute(&self, session: &mut Session, args: &[&str]) -> Result<Option<String>, DchatError> {
        let discussion = session.open_discussion()?;
        let content = args.join(" ");
        if content.is_empty() {
            return Err(DchatError::InvalidArgument(
                "Usage: !system <text>".to_string(),
            ));
        }
        discussion.set_system_message(&content);
        session.save_open()?;
        Ok(Some(format!("System message set to: {}", content)))
    }

    fn help(&self) -> &'static str {
        "!system <text> (!sys) - Set the system message"
    }
}

impl CommandHandler for TokenLimitCommand {
    fn execute(&self, session: &mut Session, args: &[&str]) -> Result<Option<String>, DchatError> {
        session.open_discussion()?;
        if args.len() != 1 {
            return Err(DchatError::InvalidArgument(
                "Usage: !token_limit <limit>".to_string(),
            ));
        }
        let limit: i64 = args[0].parse().map_err(|_| {
            DchatError::InvalidArgument(format!("Token limit must be an integer, got '{}'", args[0]))
        })?;
        session.open_discussion()?.set_token_limit(limit)?;
        session.save_open()?;
        Ok(Some(format!("Token limit set to: {}", limit)))
    }

    fn help(&self) -> &'static str {
        "!token_limit <limit> (!tl) - Set the token limit for requests"
    }
}

impl CommandHandler for ExitCommand {
    fn execute(&self, session: &mut Session, _args: &[&str]) -> Result<Option<String>, DchatError> {
        session.close_open()?;
        session.should_continue = false;
        Ok(None)
    }

    fn help(&self) -> &'static str {
        "!exit (!q) - Save and exit"
    }
}

impl CommandHandler for HelpCommand {
    fn execute(
        &self,
        _session: &mut Session,
        _args: &[&str],
    ) -> Result<Option<String>, DchatError> {
        let title = style("Available commands").bold().underlined();
        let help_text = vec![
            title.to_string(),
            OpenCommand.help().to_string(),
            NewCommand.help().to_string(),
            CloseCommand.help().to_string(),
            ModelCommand.help().to_string(),
            TitleCommand.help().to_string(),
            DeleteCommand.help().to_string(),
            DeleteAllCommand.help().to_string(),
            HistoryCommand.help().to_string(),
            CopyCommand.help().to_string(),
            SearchCommand.help().to_string(),
            InfoCommand.help().to_string(),
            SystemCommand.help().to_string(),
            TokenLimitCommand.help().to_string(),
            ExitCommand.help().to_string(),
            HelpCommand.help().to_string(),
            String::new(),
            "Anything not starting with ! is sent to the model in the open discussion."
                .to_string(),
        ]
        .join("\n");

        Ok(Some(help_text))
    }

    fn help(&self) -> &'static str {
        "!help (!?) - Show this help"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::create_command_registry;
    use crate::commands::dispatcher::CommandDispatcher;
    use crate::discussion::{DEFAULT_MODEL, DEFAULT_TOKEN_LIMIT, Role};
    use crate::store::RecordStore;
    use tempfile::TempDir;

    fn test_session() -> (CommandDispatcher, Session, TempDir) {
        let dir = TempDir::new().unwrap();
        let store = RecordStore::open(dir.path()).unwrap();
        let session = Session::new(store, DEFAULT_MODEL.to_string(), DEFAULT_TOKEN_LIMIT, true);
        (create_command_registry(), session, dir)
    }

    #[test]
    fn discussion_scoped_commands_require_an_open_discussion() {
        let (dispatcher, mut session, _dir) = test_session();

        let scoped: &[(&str, &[&str])] = &[
            ("close", &[]),
            ("model", &["gpt-4o"]),
            ("title", &["renamed"]),
            ("delete", &[]),
            ("history", &[]),
            ("copy", &[]),
            ("search", &["hello"]),
            ("info", &[]),
            ("system", &["be brief"]),
            ("token_limit", &["2000"]),
        ];

        for (command, args) in scoped {
            let err = dispatcher.execute(command, args, &mut session).unwrap_err();
            assert!(
                matches!(err, DchatError::NoActiveDiscussion),
                "!{} should require an open discussion",
                command
            );
        }

        // nothing leaked into the store
        assert!(session.store.list().unwrap().is_empty());
    }

    #[test]
    fn unknown_command_is_reported() {
        let (dispatcher, mut session, _dir) = test_session();
        let err = dispatcher.execute("bogus", &[], &mut session).unwrap_err();
        assert!(matches!(err, DchatError::UnknownCommand(name) if name == "bogus"));
    }

    #[test]
    fn new_creates_opens_and_persists() {
        let (dispatcher, mut session, _dir) = test_session();

        dispatcher
            .execute("new", &["My", "Demo"], &mut session)
            .unwrap();

        let open = session.open.as_ref().unwrap();
        assert_eq!(open.title(), "My Demo");
        assert_eq!(open.model(), DEFAULT_MODEL);
        assert_eq!(open.token_limit(), DEFAULT_TOKEN_LIMIT);
        assert!(open.messages().is_empty());

        let summaries = session.store.list().unwrap();
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].title, "My Demo");
    }

    #[test]
    fn new_requires_a_title() {
        let (dispatcher, mut session, _dir) = test_session();
        let err = dispatcher.execute("new", &[], &mut session).unwrap_err();
        assert!(matches!(err, DchatError::InvalidArgument(_)));
        assert!(session.open.is_none());
    }

    #[test]
    fn new_while_open_saves_and_replaces_the_current_discussion() {
        let (dispatcher, mut session, _dir) = test_session();

        dispatcher.execute("new", &["first"], &mut session).unwrap();
        session
            .open_discussion()
            .unwrap()
            .add_message(Role::User, "remember me");
        let first_code = session.open.as_ref().unwrap().code.clone();

        dispatcher
            .execute("new", &["second"], &mut session)
            .unwrap();

        assert_eq!(session.open.as_ref().unwrap().title(), "second");
        assert_eq!(session.store.list().unwrap().len(), 2);

        let first = session.store.load(&first_code).unwrap();
        assert_eq!(first.messages().len(), 1);
        assert_eq!(first.messages()[0].content, "remember me");
    }

    #[test]
    fn open_resolves_ordinals_and_codes() {
        let (dispatcher, mut session, _dir) = test_session();

        dispatcher.execute("new", &["first"], &mut session).unwrap();
        let first_code = session.open.as_ref().unwrap().code.clone();
        dispatcher
            .execute("new", &["second"], &mut session)
            .unwrap();
        dispatcher.execute("close", &[], &mut session).unwrap();

        // ordinal 1 is the most recently modified record
        dispatcher.execute("open", &["1"], &mut session).unwrap();
        assert_eq!(session.open.as_ref().unwrap().title(), "second");

        dispatcher
            .execute("open", &[first_code.as_str()], &mut session)
            .unwrap();
        assert_eq!(session.open.as_ref().unwrap().title(), "first");
        assert_eq!(session.open.as_ref().unwrap().code, first_code);
    }

    #[test]
    fn open_unknown_target_is_not_found() {
        let (dispatcher, mut session, _dir) = test_session();
        let err = dispatcher
            .execute("open", &["NOSUCHCODE"], &mut session)
            .unwrap_err();
        assert!(matches!(err, DchatError::NotFound(_)));
        assert!(session.open.is_none());
    }

    #[test]
    fn close_saves_and_releases_the_slot() {
        let (dispatcher, mut session, _dir) = test_session();

        dispatcher.execute("new", &["demo"], &mut session).unwrap();
        session
            .open_discussion()
            .unwrap()
            .add_message(Role::User, "hello");
        let code = session.open.as_ref().unwrap().code.clone();

        dispatcher.execute("close", &[], &mut session).unwrap();
        assert!(session.open.is_none());

        let reloaded = session.store.load(&code).unwrap();
        assert_eq!(reloaded.messages().len(), 1);
    }

    #[test]
    fn delete_removes_the_record_and_closes() {
        let (dispatcher, mut session, _dir) = test_session();

        dispatcher.execute("new", &["doomed"], &mut session).unwrap();
        dispatcher.execute("delete", &[], &mut session).unwrap();

        assert!(session.open.is_none());
        assert!(session.store.list().unwrap().is_empty());
    }

    #[test]
    fn delete_all_works_in_either_state_and_closes_the_open_discussion() {
        let (dispatcher, mut session, _dir) = test_session();

        // empty store, nothing open
        dispatcher.execute("delete_all", &[], &mut session).unwrap();

        dispatcher.execute("new", &["a"], &mut session).unwrap();
        dispatcher.execute("new", &["b"], &mut session).unwrap();
        assert!(session.open.is_some());

        dispatcher.execute("delete_all", &[], &mut session).unwrap();
        assert!(session.open.is_none());
        assert!(session.store.list().unwrap().is_empty());
    }

    #[test]
    fn token_limit_rejects_bad_arguments_and_keeps_the_prior_value() {
        let (dispatcher, mut session, _dir) = test_session();
        dispatcher.execute("new", &["demo"], &mut session).unwrap();

        let err = dispatcher
            .execute("token_limit", &["abc"], &mut session)
            .unwrap_err();
        assert!(matches!(err, DchatError::InvalidArgument(_)));

        let err = dispatcher
            .execute("token_limit", &["-5"], &mut session)
            .unwrap_err();
        assert!(matches!(err, DchatError::InvalidArgument(_)));
        assert_eq!(
            session.open.as_ref().unwrap().token_limit(),
            DEFAULT_TOKEN_LIMIT
        );

        dispatcher
            .execute("token_limit", &["2000"], &mut session)
            .unwrap();
        assert_eq!(session.open.as_ref().unwrap().token_limit(), 2000);
    }

    #[test]
    fn aliases_resolve_to_the_same_handlers() {
        let (dispatcher, mut session, _dir) = test_session();

        dispatcher.execute("n", &["demo"], &mut session).unwrap();
        dispatcher.execute("tl", &["2048"], &mut session).unwrap();
        dispatcher.execute("sys", &["be", "kind"], &mut session).unwrap();

        let open = session.open.as_ref().unwrap();
        assert_eq!(open.title(), "demo");
        assert_eq!(open.token_limit(), 2048);
        assert_eq!(open.system_message(), Some("be kind"));

        dispatcher.execute("x", &[], &mut session).unwrap();
        assert!(session.open.is_none());
    }

    #[test]
    fn model_command_shows_then_changes() {
        let (dispatcher, mut session, _dir) = test_session();
        dispatcher.execute("new", &["demo"], &mut session).unwrap();

        let shown = dispatcher.execute("model", &[], &mut session).unwrap();
        assert!(shown.unwrap().contains(DEFAULT_MODEL));

        dispatcher
            .execute("model", &["gpt-4o"], &mut session)
            .unwrap();
        assert_eq!(session.open.as_ref().unwrap().model(), "gpt-4o");

        let code = session.open.as_ref().unwrap().code.clone();
        assert_eq!(session.store.load(&code).unwrap().model(), "gpt-4o");
    }

    #[test]
    fn exit_persists_the_open_discussion_and_stops_the_loop() {
        let (dispatcher, mut session, _dir) = test_session();

        dispatcher.execute("new", &["demo"], &mut session).unwrap();
        session
            .open_discussion()
            .unwrap()
            .add_message(Role::User, "goodbye");
        let code = session.open.as_ref().unwrap().code.clone();

        dispatcher.execute("exit", &[], &mut session).unwrap();
        assert!(!session.should_continue);
        assert_eq!(session.store.load(&code).unwrap().messages().len(), 1);
    }

    #[test]
    fn help_lists_every_command() {
        let (dispatcher, mut session, _dir) = test_session();
        let text = dispatcher
            .execute("help", &[], &mut session)
            .unwrap()
            .unwrap();
        for name in [
            "!open", "!new", "!close", "!model", "!title", "!delete", "!delete_all", "!history",
            "!copy", "!search", "!info", "!system", "!token_limit", "!exit", "!help",
        ] {
            assert!(text.contains(name), "help is missing {}", name);
        }
    }
}
