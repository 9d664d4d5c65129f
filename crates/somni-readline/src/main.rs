//! Interactive REPL that drives the turn pipeline end to end.
//!
//! Run with `--offline` to use a scripted capability instead of real API
//! keys, and `--social` for the compact single-turn output mode.

mod scripted;

use std::sync::Arc;

use anyhow::Result;
use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use scripted::ScriptedCapability;
use somni_application::TurnUseCase;
use somni_core::capability::CompletionAgent;
use somni_core::knowledge::BuiltinKnowledge;
use somni_core::session::ChatMessage;
use somni_core::turn::{OutputMode, TurnRequest, TurnResponse};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = std::env::args().collect();
    let offline = args.iter().any(|a| a == "--offline");
    let social = args.iter().any(|a| a == "--social");

    let (fast, quality): (Arc<dyn CompletionAgent>, Arc<dyn CompletionAgent>) = if offline {
        let agent = Arc::new(ScriptedCapability);
        (agent.clone(), agent)
    } else {
        somni_interaction::agent_pair_from_env()?
    };
    let usecase = TurnUseCase::new(fast, quality, Arc::new(BuiltinKnowledge));

    let mut rl = DefaultEditor::new()?;

    println!("{}", "=== Somni ===".bright_magenta().bold());
    println!(
        "{}",
        "Tell me about your child's sleep. Answer chips by number or free text; 'quit' to exit."
            .bright_black()
    );
    println!();

    let mut messages: Vec<ChatMessage> = Vec::new();
    let mut session_id: Option<String> = None;
    let mut extracted_fields = None;
    let mut questions_asked = None;
    let mut last_chips: Vec<String> = Vec::new();

    loop {
        let line = match rl.readline(">> ") {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => {
                println!("{}", "Goodbye!".bright_green());
                break;
            }
            Err(err) => return Err(err.into()),
        };

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if trimmed == "quit" || trimmed == "exit" {
            println!("{}", "Goodbye!".bright_green());
            break;
        }
        let _ = rl.add_history_entry(trimmed);

        // A bare number picks the matching chip from the last question.
        let content = trimmed
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|i| last_chips.get(i).cloned())
            .unwrap_or_else(|| trimmed.to_string());

        messages.push(ChatMessage::user(content));

        let request = TurnRequest {
            messages: messages.clone(),
            session_id: session_id.clone(),
            extracted_fields: extracted_fields.clone(),
            questions_asked,
            output_mode: social.then_some(OutputMode::Social),
        };

        match usecase.handle_turn(request).await {
            TurnResponse::NeedsInfo {
                session_id: sid,
                extracted_fields: fields,
                follow_up_question,
                quick_replies,
                questions_asked: asked,
            } => {
                println!("{}", follow_up_question.bright_blue());
                for (i, chip) in quick_replies.iter().enumerate() {
                    println!("  {}", format!("{}. {}", i + 1, chip).yellow());
                }
                println!();
                messages.push(ChatMessage::assistant(&follow_up_question));
                session_id = Some(sid);
                extracted_fields = Some(fields);
                questions_asked = Some(asked);
                last_chips = quick_replies;
            }
            TurnResponse::Complete {
                intro_message,
                schedule_markdown,
                ..
            } => {
                println!("{}", intro_message.bright_blue());
                println!();
                for line in schedule_markdown.lines() {
                    println!("{line}");
                }
                println!();
                println!("{}", "Sleep well!".bright_green());
                break;
            }
            TurnResponse::Error { error } => {
                println!("{}", error.red());
                break;
            }
            TurnResponse::RateLimited { message, .. } => {
                println!("{}", message.yellow());
                break;
            }
        }
    }

    Ok(())
}
