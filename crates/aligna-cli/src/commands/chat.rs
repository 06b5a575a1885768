use std::borrow::Cow::{self, Borrowed, Owned};
use std::sync::Arc;

use anyhow::Result;
use colored::Colorize;
use rustyline::completion::{Completer, Pair};
use rustyline::highlight::Highlighter;
use rustyline::hint::{Hint, Hinter};
use rustyline::validate::Validator;
use rustyline::{Context, Editor, Helper};
use tokio::sync::{Mutex, mpsc};

use aligna_core::config::WidgetConfig;
use aligna_core::widget::{Transition, ViewEffect, WidgetState};
use aligna_core::{BotId, Message, Sender};
use aligna_interaction::{ChatWidget, HttpChatBackend, SendReport};

/// Slash commands and what they do to the widget.
const COMMANDS: [(&str, &str); 5] = [
    ("/clear", "start the conversation over"),
    ("/minimize", "collapse or expand the chat"),
    ("/close", "hide the chat"),
    ("/open", "show the chat"),
    ("/quit", "leave the session"),
];

/// Hint shown after a partly typed slash command.
///
/// Only the rest of the command name is accepted; the description is display only.
struct CommandHint {
    display: String,
    complete_up_to: usize,
}

impl Hint for CommandHint {
    fn display(&self) -> &str {
        &self.display
    }

    fn completion(&self) -> Option<&str> {
        if self.complete_up_to > 0 {
            Some(&self.display[..self.complete_up_to])
        } else {
            None
        }
    }
}

/// Slash-command completion, highlighting and hints for the chat prompt.
struct ChatHelper;

impl ChatHelper {
    fn matching<'a>(prefix: &'a str) -> impl Iterator<Item = (&'static str, &'static str)> + 'a {
        COMMANDS
            .into_iter()
            .filter(move |(name, _)| name.starts_with(prefix))
    }
}

impl Helper for ChatHelper {}

impl Completer for ChatHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let line = &line[..pos];
        if !line.starts_with('/') {
            return Ok((0, vec![]));
        }

        let candidates = Self::matching(line)
            .map(|(name, about)| Pair {
                display: format!("{:<10} {}", name, about),
                replacement: name.to_string(),
            })
            .collect();
        Ok((0, candidates))
    }
}

impl Highlighter for ChatHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        let known = COMMANDS.iter().any(|(name, _)| *name == line.trim_end());
        if known {
            Owned(line.bright_cyan().to_string())
        } else if line.starts_with('/') {
            Owned(line.yellow().to_string())
        } else {
            Borrowed(line)
        }
    }

    fn highlight_hint<'h>(&self, hint: &'h str) -> Cow<'h, str> {
        Owned(hint.bright_black().to_string())
    }

    fn highlight_char(&self, line: &str, _pos: usize, _forced: bool) -> bool {
        line.starts_with('/')
    }
}

impl Hinter for ChatHelper {
    type Hint = CommandHint;

    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<CommandHint> {
        command_hint(line, pos)
    }
}

impl Validator for ChatHelper {}

/// Hints the single slash command `line` can still become, with its purpose.
fn command_hint(line: &str, pos: usize) -> Option<CommandHint> {
    if pos < line.len() || !line.starts_with('/') || line.contains(' ') {
        return None;
    }

    let mut matches = ChatHelper::matching(line);
    let (name, about) = matches.next()?;
    if matches.next().is_some() {
        return None;
    }

    let rest = &name[line.len()..];
    Some(CommandHint {
        display: format!("{}  {}", rest, about),
        complete_up_to: rest.len(),
    })
}

/// Prints messages the terminal has not shown yet.
struct Renderer {
    printed: usize,
}

impl Renderer {
    fn new() -> Self {
        Self { printed: 0 }
    }

    fn apply(&mut self, transition: &Transition, state: &WidgetState) {
        for effect in transition.effects() {
            match effect {
                ViewEffect::ScrollToLatest => {
                    self.render_new(state);
                    if state.is_typing() {
                        println!("{}", "Bot is typing...".bright_black().italic());
                    }
                }
                ViewEffect::FocusInput => {
                    println!(
                        "{}",
                        "Press Enter to send • /minimize, /close, /clear, /quit".bright_black()
                    );
                }
            }
        }
    }

    fn render_all(&mut self, state: &WidgetState) {
        self.printed = 0;
        self.render_new(state);
    }

    fn render_new(&mut self, state: &WidgetState) {
        // A clear shrinks the list below what was printed: start over
        if state.messages().len() < self.printed {
            println!("{}", "── chat cleared ──".bright_black());
            self.printed = 0;
        }
        for message in &state.messages()[self.printed..] {
            render_message(message);
        }
        self.printed = state.messages().len();
    }
}

fn render_message(message: &Message) {
    let time = format!("[{}]", message.display_time()).bright_black();
    let author = match message.sender {
        Sender::User => message.sender.label().green().bold(),
        Sender::Bot => message.sender.label().bright_magenta().bold(),
    };
    println!("{} {}", time, author);
    for line in message.text.lines() {
        match message.sender {
            Sender::User => println!("  {}", line.green()),
            Sender::Bot => println!("  {}", line.bright_blue()),
        }
    }
}

/// Runs an interactive chat session against the configured backend.
///
/// Replies arrive on a background task, so slash commands keep working while
/// the bot is typing. Only new messages are refused until the reply lands.
pub async fn run(config: &WidgetConfig, bot_id: String) -> Result<()> {
    let backend = Arc::new(HttpChatBackend::from_config(config));
    let widget = ChatWidget::from_config(BotId::new(bot_id), backend, config);
    let renderer = Arc::new(Mutex::new(Renderer::new()));

    // Finished send cycles come back here to be rendered
    let (reply_tx, mut reply_rx) = mpsc::channel::<SendReport>(8);
    let reply_handler = {
        let widget = widget.clone();
        let renderer = Arc::clone(&renderer);
        tokio::spawn(async move {
            while let Some(report) = reply_rx.recv().await {
                let state = widget.snapshot().await;
                renderer.lock().await.apply(&report.transition, &state);
            }
        })
    };

    let mut rl = Editor::new()?;
    rl.set_helper(Some(ChatHelper));

    println!("{}", "=== Aligna AI ===".bright_magenta().bold());
    println!(
        "{}",
        format!("Always here to help • bot {}", widget.bot_id()).bright_black()
    );
    println!();

    let transition = widget.open().await;
    {
        let state = widget.snapshot().await;
        let mut renderer = renderer.lock().await;
        renderer.render_all(&state);
        renderer.apply(&transition, &state);
    }

    loop {
        let state = widget.snapshot().await;
        let prompt = match (state.is_open(), state.is_minimized()) {
            (false, _) => "(closed) ",
            (true, true) => "(minimized) ",
            (true, false) => ">> ",
        };

        let line = match rl.readline(prompt) {
            Ok(line) => line,
            Err(rustyline::error::ReadlineError::Interrupted) => {
                println!("{}", "CTRL-C detected. Type '/quit' to exit.".yellow());
                continue;
            }
            Err(rustyline::error::ReadlineError::Eof) => {
                println!("{}", "CTRL-D detected. Exiting...".bright_green());
                break;
            }
            Err(err) => {
                eprintln!("{}", format!("Error: {:?}", err).red());
                break;
            }
        };

        let trimmed = line.trim();
        if trimmed.starts_with('/') {
            let _ = rl.add_history_entry(trimmed);
            let transition = match trimmed {
                "/quit" | "/exit" => {
                    println!("{}", "Goodbye!".bright_green());
                    break;
                }
                "/open" => widget.open().await,
                "/close" => {
                    let transition = widget.close().await;
                    println!("{}", "Chat closed. Type '/open' to reopen.".bright_black());
                    transition
                }
                "/minimize" => {
                    let transition = widget.toggle_minimize().await;
                    if widget.snapshot().await.is_minimized() {
                        println!("{}", "Chat minimized.".bright_black());
                    }
                    transition
                }
                "/clear" => widget.clear().await,
                other => {
                    println!("{}", format!("Unknown command: {}", other).bright_black());
                    continue;
                }
            };
            let state = widget.snapshot().await;
            renderer.lock().await.apply(&transition, &state);
            continue;
        }

        let state = widget.snapshot().await;
        if !state.is_expanded() {
            println!(
                "{}",
                "The input is hidden. Use '/open' or '/minimize' to show it.".bright_black()
            );
            continue;
        }
        if state.is_typing() {
            println!(
                "{}",
                "Waiting for the bot to answer. Commands still work.".bright_black()
            );
            continue;
        }

        widget.set_draft(line.clone()).await;
        let Some((sent, handle)) = widget.spawn_send().await else {
            // Blank input: the send control is disabled
            continue;
        };
        let _ = rl.add_history_entry(&line);

        let state = widget.snapshot().await;
        renderer.lock().await.apply(&sent, &state);

        let tx = reply_tx.clone();
        tokio::spawn(async move {
            match handle.await {
                Ok(report) => {
                    let _ = tx.send(report).await;
                }
                Err(e) => eprintln!("{}", format!("Send task failed: {}", e).red()),
            }
        });
    }

    // A reply still in flight is abandoned with the session
    drop(reply_tx);
    reply_handler.abort();

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use aligna_core::widget::WidgetTexts;

    #[test]
    fn test_hint_completes_name_and_describes_command() {
        let hint = command_hint("/cle", 4).unwrap();
        assert_eq!(hint.completion(), Some("ar"));
        assert_eq!(hint.display(), "ar  start the conversation over");

        // A finished name only shows what it does
        let hint = command_hint("/quit", 5).unwrap();
        assert_eq!(hint.completion(), None);
        assert_eq!(hint.display(), "  leave the session");
    }

    #[test]
    fn test_no_hint_for_ambiguous_or_plain_input() {
        // "/c" could be /clear or /close
        assert!(command_hint("/c", 2).is_none());
        assert!(command_hint("hello", 5).is_none());
        assert!(command_hint("/cle", 2).is_none());
        assert!(command_hint("/nope", 5).is_none());
    }

    #[test]
    fn test_renderer_follows_reported_effects() {
        let mut state = WidgetState::new(WidgetTexts::default());
        let mut renderer = Renderer::new();
        renderer.render_all(&state);
        assert_eq!(renderer.printed, 1);

        state.set_draft("hi");
        let (_, sent) = state.begin_send().unwrap();
        renderer.apply(&sent, &state);
        assert_eq!(renderer.printed, 2);

        // No effect reported, nothing rendered
        renderer.apply(&Transition::none(), &state);
        let replied = state.complete_send(aligna_core::widget::ReplyOutcome::Failed);
        assert_eq!(renderer.printed, 2);
        renderer.apply(&replied, &state);
        assert_eq!(renderer.printed, 3);

        let cleared = state.clear();
        renderer.apply(&cleared, &state);
        assert_eq!(renderer.printed, 1);
    }
}
