use std::io;

use console::style;

use crate::core::error::DchatError;
use crate::discussion::{Discussion, Message, Role};
use crate::store::DiscussionSummary;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub fn welcome() {
    println!(
        "{}",
        style("Welcome to dchat. Type !help for commands.").bold().cyan()
    );
}

pub fn goodbye() {
    println!("{}", style("Goodbye!").bold().cyan());
}

pub fn print_error(err: &DchatError) {
    eprintln!("{} {}", style("Error:").bold().red(), err);
    if matches!(err, DchatError::UnknownCommand(_)) {
        eprintln!(
            "Type {} for a list of available commands.",
            style("!help").bold().yellow()
        );
    }
}

fn role_label(role: Role) -> console::StyledObject<&'static str> {
    match role {
        Role::User => style("User:").bold().yellow(),
        Role::Assistant => style("Assistant:").bold().blue(),
        Role::System => style("System:").bold().magenta(),
    }
}

/// Markdown-looking replies render through termimad, everything else
/// prints plain.
pub fn display_reply(reply: &str) {
    if looks_like_markdown(reply) {
        println!("{}", role_label(Role::Assistant));
        let skin = termimad::MadSkin::default();
        skin.print_text(reply);
    } else {
        println!("{} {}", role_label(Role::Assistant), reply);
    }
}

fn looks_like_markdown(text: &str) -> bool {
    text.contains("```") || text.contains('*') || text.contains('`') || text.contains('#')
}

pub fn display_history(messages: &[Message]) {
    for message in messages {
        println!("{} {}", role_label(message.role), message.content);
    }
}

pub fn display_listing(summaries: &[DiscussionSummary]) {
    let title_width = summaries
        .iter()
        .map(|s| s.title.chars().count())
        .max()
        .unwrap_or(0)
        .max("Title".len());

    let header = format!(
        "{:>3}  {:<10}  {:<title_width$}  {:<19}  {:<19}",
        "ID",
        "Code",
        "Title",
        "Created",
        "Modified",
        title_width = title_width
    );
    println!("{}", style(header).bold().cyan());

    for s in summaries {
        println!(
            "{:>3}  {:<10}  {:<title_width$}  {:<19}  {:<19}",
            s.id,
            s.code,
            s.title,
            s.created_at.format(TIMESTAMP_FORMAT).to_string(),
            s.modified_at.format(TIMESTAMP_FORMAT).to_string(),
            title_width = title_width
        );
    }
}

pub fn display_info(discussion: &Discussion) {
    let rows = [
        ("Code", discussion.code.clone()),
        ("ID", discussion.id.to_string()),
        ("Title", discussion.title().to_string()),
        ("Model", discussion.model().to_string()),
        ("Token limit", discussion.token_limit().to_string()),
        (
            "System message",
            discussion.system_message().unwrap_or("(none)").to_string(),
        ),
        ("Messages", discussion.messages().len().to_string()),
        ("Estimated tokens", discussion.estimated_tokens().to_string()),
        (
            "Created",
            discussion.created_at.format(TIMESTAMP_FORMAT).to_string(),
        ),
        (
            "Modified",
            discussion.modified_at.format(TIMESTAMP_FORMAT).to_string(),
        ),
    ];

    for (name, value) in rows {
        println!(
            "{} {}",
            style(format!("{:<16}", name)).bold().cyan(),
            value
        );
    }
}

/// y/N prompt on stdin for destructive commands.
pub fn prompt_confirmation(question: &str) -> bool {
    println!(
        "{} {}",
        style("?").bold().yellow(),
        style(format!("{} [y/N]", question)).bold().cyan()
    );
    let mut input = String::new();
    if io::stdin().read_line(&mut input).is_err() {
        return false;
    }
    input.trim().eq_ignore_ascii_case("y")
}
