// Line-oriented front end.
//
// Reads commands from stdin, forwards them to the studio event loop, and
// prints UI updates as they arrive. Deliberately minimal: the studio's
// value lives in the loop behind it, not in terminal rendering.

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::info;

use crate::protocol::{UiUpdate, UserCommand};
use crate::review::ReviewResult;
use crate::session::sections::SectionId;
use crate::session::timer::format_elapsed;

/// One row of the prompt picker: `(id, title, difficulty label)`.
pub type PromptIndexEntry = (String, String, &'static str);

// ---------------------------------------------------------------------------
// Command parsing
// ---------------------------------------------------------------------------

/// Parse one input line into a command. `None` means the line was handled
/// locally (blank, `help`) or malformed; the error text explains how.
fn parse_command(line: &str) -> Result<Option<UserCommand>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let (verb, rest) = match line.split_once(char::is_whitespace) {
        Some((v, r)) => (v, r.trim()),
        None => (line, ""),
    };

    let section = |name: &str| {
        SectionId::parse(name)
            .ok_or_else(|| format!("unknown section `{name}` (try `help` for the list)"))
    };

    match verb {
        "help" => {
            print_help();
            Ok(None)
        }
        "select" if !rest.is_empty() => Ok(Some(UserCommand::SelectPrompt(rest.to_string()))),
        "edit" => {
            let (name, text) = rest
                .split_once(char::is_whitespace)
                .ok_or_else(|| "usage: edit <section> <text>".to_string())?;
            Ok(Some(UserCommand::EditSection {
                section: section(name)?,
                text: text.trim().to_string(),
            }))
        }
        "paste" => {
            let (name, text) = rest
                .split_once(char::is_whitespace)
                .ok_or_else(|| "usage: paste <section> <text>".to_string())?;
            Ok(Some(UserCommand::PasteIntoSection {
                section: section(name)?,
                text: text.trim().to_string(),
            }))
        }
        "clear" if !rest.is_empty() => Ok(Some(UserCommand::ClearSection(section(rest)?))),
        "board-clear" => Ok(Some(UserCommand::ClearBoard)),
        "copy" => Ok(Some(UserCommand::CopyDraft)),
        "review" => Ok(Some(UserCommand::RunLocalReview)),
        "ai" => Ok(Some(UserCommand::RunRemoteReview)),
        "key" if !rest.is_empty() => Ok(Some(UserCommand::SetReviewerKey(rest.to_string()))),
        "model" => Ok(Some(UserCommand::SetReviewerModel(rest.to_string()))),
        "start" => Ok(Some(UserCommand::StartTimer)),
        "pause" => Ok(Some(UserCommand::PauseTimer)),
        "reset" => Ok(Some(UserCommand::ResetTimer)),
        "quit" | "q" | "exit" => Ok(Some(UserCommand::Quit)),
        "select" | "key" => Err(format!("usage: {verb} <value>")),
        _ => Err(format!("unknown command `{verb}` (try `help`)")),
    }
}

fn print_help() {
    println!("commands:");
    println!("  prompts                  list available design prompts");
    println!("  select <id>              switch to a prompt");
    println!("  edit <section> <text>    replace a section's text");
    println!("  paste <section> <text>   append text to a section");
    println!("  clear <section>          empty a section");
    println!("  board-clear              reset the architecture board");
    println!("  copy                     print the assembled draft document");
    println!("  review                   run the local review");
    println!("  ai                       run a remote review");
    println!("  key <value>              set the reviewer API key");
    println!("  model [value]            set (or reset) the reviewer model");
    println!("  start | pause | reset    control the session timer");
    println!("  quit                     exit");
    let keys: Vec<&str> = SectionId::ALL.iter().map(|id| id.key()).collect();
    println!("sections: {}", keys.join(", "));
}

// ---------------------------------------------------------------------------
// Update rendering
// ---------------------------------------------------------------------------

fn print_review(result: &ReviewResult) {
    println!("score: {}/100", result.score);
    println!("word count: {}", result.word_count);
    println!("requirements covered: {}", result.requirement_coverage);
    println!("strengths:");
    for item in &result.strengths {
        println!("  - {item}");
    }
    println!("areas to improve:");
    for item in &result.improvements {
        println!("  - {item}");
    }
}

fn print_update(update: &UiUpdate) {
    match update {
        UiUpdate::PromptSelected(view) => {
            println!(
                "[{}] {} — {}",
                view.difficulty.label(),
                view.title,
                view.summary
            );
            for req in &view.requirements {
                println!("  - {req}");
            }
            if view.restored {
                println!("(restored saved draft)");
            }
        }
        UiUpdate::PromptNotFound(id) => {
            println!("no prompt with id `{id}` — use `prompts` to list them");
        }
        UiUpdate::Status(text) => println!("{text}"),
        UiUpdate::DraftDocument(doc) => {
            // No clipboard in a plain terminal; printing is the export path.
            println!("{doc}");
        }
        UiUpdate::LocalReview(result) => print_review(result),
        UiUpdate::AiReviewStarted => println!("remote review running..."),
        UiUpdate::AiReviewToken(_) => {
            // Tokens are folded into the final AiReviewComplete text; echoing
            // each one would shred the prompt line.
        }
        UiUpdate::AiReviewComplete(text) => {
            println!("--- AI feedback ---");
            println!("{text}");
        }
        UiUpdate::AiReviewError(message) => println!("remote review failed: {message}"),
        UiUpdate::TimerTick(seconds) => {
            if seconds % 60 == 0 {
                println!("timer {}", format_elapsed(*seconds));
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Front-end loop
// ---------------------------------------------------------------------------

/// Run the front end until the user quits or the studio loop goes away.
///
/// `prompt_index` backs the `prompts` listing, the one command answered
/// locally.
pub async fn run(
    mut ui_rx: mpsc::Receiver<UiUpdate>,
    cmd_tx: mpsc::Sender<UserCommand>,
    prompt_index: Vec<PromptIndexEntry>,
) -> anyhow::Result<()> {
    // Printer task: renders studio updates as they arrive.
    let printer = tokio::spawn(async move {
        while let Some(update) = ui_rx.recv().await {
            print_update(&update);
        }
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("practice studio — type `help` for commands");

    while let Ok(Some(line)) = lines.next_line().await {
        if line.trim() == "prompts" {
            for (id, title, difficulty) in &prompt_index {
                println!("  {id}  [{difficulty}] {title}");
            }
            continue;
        }

        match parse_command(&line) {
            Ok(Some(cmd)) => {
                let is_quit = cmd == UserCommand::Quit;
                if cmd_tx.send(cmd).await.is_err() {
                    // Studio loop is gone; nothing left to drive.
                    break;
                }
                if is_quit {
                    break;
                }
            }
            Ok(None) => {}
            Err(message) => println!("{message}"),
        }
    }

    info!("Front end exiting");
    drop(cmd_tx);
    let _ = printer.await;
    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_lines_are_ignored() {
        assert_eq!(parse_command(""), Ok(None));
        assert_eq!(parse_command("   "), Ok(None));
    }

    #[test]
    fn select_takes_a_prompt_id() {
        assert_eq!(
            parse_command("select design-uber"),
            Ok(Some(UserCommand::SelectPrompt("design-uber".into())))
        );
    }

    #[test]
    fn edit_parses_section_and_text() {
        assert_eq!(
            parse_command("edit apis POST /rides with idempotency keys"),
            Ok(Some(UserCommand::EditSection {
                section: SectionId::Apis,
                text: "POST /rides with idempotency keys".into(),
            }))
        );
    }

    #[test]
    fn edit_rejects_unknown_section() {
        let err = parse_command("edit appendix some text").unwrap_err();
        assert!(err.contains("unknown section `appendix`"));
    }

    #[test]
    fn edit_without_text_is_usage_error() {
        let err = parse_command("edit apis").unwrap_err();
        assert!(err.contains("usage: edit"));
    }

    #[test]
    fn paste_parses_like_edit() {
        assert_eq!(
            parse_command("paste deepDive notes from elsewhere"),
            Ok(Some(UserCommand::PasteIntoSection {
                section: SectionId::DeepDive,
                text: "notes from elsewhere".into(),
            }))
        );
    }

    #[test]
    fn clear_takes_a_section() {
        assert_eq!(
            parse_command("clear tradeoffs"),
            Ok(Some(UserCommand::ClearSection(SectionId::Tradeoffs)))
        );
    }

    #[test]
    fn bare_model_resets_to_default() {
        assert_eq!(
            parse_command("model"),
            Ok(Some(UserCommand::SetReviewerModel(String::new())))
        );
        assert_eq!(
            parse_command("model some-model-id"),
            Ok(Some(UserCommand::SetReviewerModel("some-model-id".into())))
        );
    }

    #[test]
    fn timer_and_simple_commands() {
        assert_eq!(parse_command("start"), Ok(Some(UserCommand::StartTimer)));
        assert_eq!(parse_command("pause"), Ok(Some(UserCommand::PauseTimer)));
        assert_eq!(parse_command("reset"), Ok(Some(UserCommand::ResetTimer)));
        assert_eq!(parse_command("copy"), Ok(Some(UserCommand::CopyDraft)));
        assert_eq!(parse_command("review"), Ok(Some(UserCommand::RunLocalReview)));
        assert_eq!(parse_command("ai"), Ok(Some(UserCommand::RunRemoteReview)));
        assert_eq!(parse_command("board-clear"), Ok(Some(UserCommand::ClearBoard)));
    }

    #[test]
    fn quit_aliases() {
        assert_eq!(parse_command("quit"), Ok(Some(UserCommand::Quit)));
        assert_eq!(parse_command("q"), Ok(Some(UserCommand::Quit)));
        assert_eq!(parse_command("exit"), Ok(Some(UserCommand::Quit)));
    }

    #[test]
    fn unknown_verb_is_an_error() {
        let err = parse_command("launch").unwrap_err();
        assert!(err.contains("unknown command `launch`"));
    }
}
