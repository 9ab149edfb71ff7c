//! `cartmanify chat`: interactive session over stdin.

use std::io::Write;
use std::sync::Arc;

use cartmanify_core::message::{Message, Role};
use cartmanify_core::transform::{SensorLevel, Transformer};
use cartmanify_pipeline::TransformPipeline;
use cartmanify_session::{GatewayClient, Resolution, SessionOrchestrator, SubmitOutcome};
use tokio::io::{self, AsyncBufReadExt, BufReader};

use super::{CommandResult, load_config, open_stores, require_api_key};

/// One line of user input.
#[derive(Debug, PartialEq, Eq)]
enum ChatInput {
    Text(String),
    Level(String),
    History,
    Replay(usize),
    Forget(usize),
    Retry,
    Clear,
    ClearHistory,
    Help,
    Exit,
    Unknown(String),
}

fn parse_input(line: &str) -> Option<ChatInput> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    if !line.starts_with('/') {
        return Some(ChatInput::Text(line.to_string()));
    }

    let (command, arg) = match line.split_once(char::is_whitespace) {
        Some((command, arg)) => (command, arg.trim()),
        None => (line, ""),
    };
    let index = || arg.parse::<usize>().ok().filter(|n| *n > 0);

    let input = match command {
        "/level" if !arg.is_empty() => ChatInput::Level(arg.to_string()),
        "/history" => ChatInput::History,
        "/replay" => index().map_or(ChatInput::Unknown(line.to_string()), ChatInput::Replay),
        "/forget" => index().map_or(ChatInput::Unknown(line.to_string()), ChatInput::Forget),
        "/retry" => ChatInput::Retry,
        "/clear" => ChatInput::Clear,
        "/clear-history" => ChatInput::ClearHistory,
        "/help" => ChatInput::Help,
        "/exit" | "/quit" => ChatInput::Exit,
        _ => ChatInput::Unknown(line.to_string()),
    };
    Some(input)
}

fn print_help() {
    println!("  Commands:");
    println!("    /level <mild|medium|raw>  change the sensor level");
    println!("    /history                  list recent transforms");
    println!("    /replay <n>               load history entry n into the chat");
    println!("    /forget <n>               delete history entry n");
    println!("    /retry                    resend the last failed request");
    println!("    /clear                    clear the conversation");
    println!("    /clear-history            delete all history");
    println!("    /exit                     quit");
}

fn print_message(message: &Message) {
    let speaker = match message.role {
        Role::User => "You",
        Role::Assistant => "Cartman",
        Role::System => return,
    };
    let mood = message
        .emotion
        .map(|e| format!(" ({e})"))
        .unwrap_or_default();
    for line in message.content.lines() {
        println!("  {speaker}{mood} > {line}");
    }
}

fn report(resolution: Resolution, orchestrator: &SessionOrchestrator) {
    match resolution {
        Resolution::Applied(_) => {
            if let Some(reply) = orchestrator.snapshot().messages.last() {
                println!();
                print_message(reply);
                println!();
            }
        }
        Resolution::Failed(err) => {
            eprintln!("  [Error] {err}");
            if err.is_retryable() {
                eprintln!("  Type /retry to try again.");
            }
            println!();
        }
        Resolution::Discarded => {}
    }
}

async fn history_entry_id(orchestrator: &SessionOrchestrator, n: usize) -> Option<String> {
    let items = orchestrator.history().await.ok()?;
    items.get(n - 1).map(|item| item.id.clone())
}

pub async fn run(remote: Option<String>) -> CommandResult {
    let config = load_config()?;
    let stores = open_stores(&config).await?;

    let (transformer, backend): (Arc<dyn Transformer>, String) = match remote {
        Some(url) => {
            let client = GatewayClient::new(url);
            let backend = format!("gateway at {}", client.base_url());
            (Arc::new(client), backend)
        }
        None => {
            require_api_key(&config)?;
            let provider = cartmanify_providers::build_from_config(&config);
            let pipeline = TransformPipeline::from_config(provider, &config);
            let backend = format!("{} ({})", pipeline.provider_name(), pipeline.model());
            (Arc::new(pipeline), backend)
        }
    };

    let orchestrator = SessionOrchestrator::new(transformer, stores.history, stores.preferences);
    let history = orchestrator.start().await?;

    println!();
    println!("  Cartmanify: Interactive Mode");
    println!();
    println!("  Backend:   {backend}");
    println!("  Level:     {}", orchestrator.sensor_level());
    println!("  History:   {} saved transforms", history.len());
    println!();
    println!("  Type something and press Enter. /help lists commands.");
    println!();

    let mut lines = BufReader::new(io::stdin()).lines();

    loop {
        print!("  You > ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let Some(input) = parse_input(&line) else {
            continue;
        };

        match input {
            ChatInput::Text(text) => {
                orchestrator.set_draft(text.as_str());
                match orchestrator.submit(&text) {
                    SubmitOutcome::Dispatched(dispatch) => {
                        eprint!("  ...");
                        let resolution = dispatch.wait().await;
                        eprint!("\r     \r");
                        report(resolution, &orchestrator);
                    }
                    SubmitOutcome::Rejected(message) => eprintln!("  {message}"),
                    SubmitOutcome::Busy => eprintln!(
                        "  Still waiting on the last reply. Kept: {}",
                        orchestrator.snapshot().draft
                    ),
                }
            }
            ChatInput::Level(level) => match level.parse::<SensorLevel>() {
                Ok(level) => {
                    orchestrator.set_sensor_level(level).await?;
                    println!("  Sensor level set to {level}.");
                }
                Err(e) => eprintln!("  {e}"),
            },
            ChatInput::History => {
                let items = orchestrator.history().await?;
                if items.is_empty() {
                    println!("  No transforms yet.");
                }
                for (i, item) in items.iter().enumerate() {
                    println!("  {:>2}. [{}] {}", i + 1, item.sensor_level, item.original_text);
                }
            }
            ChatInput::Replay(n) => match history_entry_id(&orchestrator, n).await {
                Some(id) => {
                    if orchestrator.select_history(&id).await? {
                        for message in orchestrator.snapshot().messages.iter().rev().take(2).rev() {
                            print_message(message);
                        }
                        println!("  Sensor level is now {}.", orchestrator.sensor_level());
                    } else {
                        eprintln!("  Wait for the current reply first.");
                    }
                }
                None => eprintln!("  No history entry {n}."),
            },
            ChatInput::Forget(n) => match history_entry_id(&orchestrator, n).await {
                Some(id) => {
                    orchestrator.remove_history(&id).await?;
                    println!("  Removed history entry {n}.");
                }
                None => eprintln!("  No history entry {n}."),
            },
            ChatInput::Retry => match orchestrator.retry() {
                Some(dispatch) => {
                    eprint!("  ...");
                    let resolution = dispatch.wait().await;
                    eprint!("\r     \r");
                    report(resolution, &orchestrator);
                }
                None => eprintln!("  Nothing to retry."),
            },
            ChatInput::Clear => {
                orchestrator.clear();
                println!("  Conversation cleared.");
            }
            ChatInput::ClearHistory => {
                orchestrator.clear_history().await?;
                println!("  History cleared.");
            }
            ChatInput::Help => print_help(),
            ChatInput::Exit => break,
            ChatInput::Unknown(command) => {
                eprintln!("  Unknown command: {command}");
                print_help();
            }
        }
    }

    println!();
    println!("  Screw you guys, I'm going home!");
    println!();

    Ok(())
}
