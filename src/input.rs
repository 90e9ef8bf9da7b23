use console::style;
use is_terminal::IsTerminal;
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::{Hinter, HistoryHinter};
use rustyline::history::FileHistory;
use rustyline::validate::Validator;
use rustyline::{CompletionType, Config, Context, EditMode, Editor, Helper};

use crate::commands::dispatcher::CommandDispatcher;
use crate::config;
use crate::core::error::DchatError;

/// Rustyline helper: completes command names after the `!` marker and
/// hints from input history. Everything else is free-form chat text.
pub struct ReplHelper {
    commands: Vec<String>,
    hinter: HistoryHinter,
}

impl ReplHelper {
    pub fn new(dispatcher: CommandDispatcher) -> Self {
        Self {
            commands: dispatcher.command_names(),
            hinter: HistoryHinter {},
        }
    }
}

impl Completer for ReplHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        if let Some(command_part) = line.strip_prefix('!') {
            let command_part = &command_part[..pos.saturating_sub(1).min(command_part.len())];
            let matches: Vec<Pair> = self
                .commands
                .iter()
                .filter(|cmd| cmd.starts_with(command_part))
                .map(|cmd| Pair {
                    display: cmd.to_string(),
                    replacement: cmd.to_string(),
                })
                .collect();
            // 1 is the position after '!'
            return Ok((1, matches));
        }

        Ok((pos, Vec::new()))
    }
}

impl Hinter for ReplHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, ctx: &Context<'_>) -> Option<String> {
        self.hinter.hint(line, pos, ctx)
    }
}

impl Highlighter for ReplHelper {}

impl Validator for ReplHelper {}

impl Helper for ReplHelper {}

/// Creates a configured rustyline editor
pub fn create_editor(
    dispatcher: CommandDispatcher,
) -> Result<Editor<ReplHelper, FileHistory>, DchatError> {
    let config = Config::builder()
        .history_ignore_space(true)
        .completion_type(CompletionType::List)
        .edit_mode(EditMode::Emacs)
        .build();

    let mut editor = Editor::with_config(config)
        .map_err(|e| DchatError::Input(format!("Failed to create line editor: {}", e)))?;

    editor.set_helper(Some(ReplHelper::new(dispatcher)));

    let _ = editor.load_history(&config::input_history_path());

    Ok(editor)
}

/// Reads a line of input; `None` means the user asked to leave (Ctrl-C or
/// Ctrl-D).
pub fn read_input(
    editor: &mut Editor<ReplHelper, FileHistory>,
) -> Result<Option<String>, DchatError> {
    let prompt = if std::io::stdout().is_terminal() {
        style(">>> ").bold().cyan().to_string()
    } else {
        ">>> ".to_string()
    };

    match editor.readline(&prompt) {
        Ok(line) => {
            // only command lines go to history
            if !line.trim().is_empty() && line.starts_with('!') {
                if let Err(e) = editor.add_history_entry(&line) {
                    return Err(DchatError::Input(format!(
                        "Failed to add history entry: {}",
                        e
                    )));
                }
            }
            Ok(Some(line))
        }
        Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => Ok(None),
        Err(err) => Err(DchatError::Input(format!("Input error: {}", err))),
    }
}

/// Saves the editor history
pub fn save_history(editor: &mut Editor<ReplHelper, FileHistory>) -> Result<(), DchatError> {
    let history_path = config::input_history_path();

    if let Some(parent) = history_path.parent() {
        if !parent.exists() {
            std::fs::create_dir_all(parent).map_err(|e| {
                DchatError::Input(format!("Failed to create history directory: {}", e))
            })?;
        }
    }

    editor
        .save_history(&history_path)
        .map_err(|e| DchatError::Input(format!("Failed to save history: {}", e)))
}
