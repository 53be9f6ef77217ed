//! Interactive chat for OpenAI- and Groq-served models.
//!
//! This binary provides a streaming REPL over the colloquy session
//! controller, with cost tracking and a one-shot image mode.
//!
//! # Usage
//!
//! ```bash
//! # Basic usage with default settings
//! colloquy-chat --api-key sk-...
//!
//! # Specify a model
//! colloquy-chat --model llama3-70b-8192
//!
//! # Load model pricing from a file
//! colloquy-chat --catalog pricing.yaml
//! ```
//!
//! # Commands
//!
//! While chatting, you can use slash commands:
//! - `/help` - Show available commands
//! - `/reset` - Clear conversation and cost
//! - `/regenerate` - Replace the last response
//! - `/model <id>` - Change the model
//! - `/image <prompt>` - Generate an image
//! - `/quit` - Exit the application

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use arrrg::CommandLine;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

use colloquy::chat::{
    ChatArgs, ChatCommand, ChatSession, SecretStore, SessionConfig, help_text, parse_command,
};
use colloquy::image::{ImageGenerator, ImageRequest};
use colloquy::render::PlainTextObserver;
use colloquy::types::{ModelCatalog, ProviderKind};

/// Main entry point for the colloquy-chat application.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let (args, _) = ChatArgs::from_command_line_relaxed("colloquy-chat [OPTIONS]");
    let catalog = match &args.catalog {
        Some(path) => ModelCatalog::from_yaml_file(path)?,
        None => ModelCatalog::builtin(),
    };
    let mut config = SessionConfig::from(args);
    let use_color = config.use_color;

    let supplied_key = config
        .api_key
        .clone()
        .or_else(|| std::env::var("COLLOQUY_API_KEY").ok())
        .unwrap_or_default();
    let kind = catalog.get(&config.model)?.provider;
    config.api_key = Some(resolve_key(&supplied_key, kind));

    let mut session = ChatSession::new(config, catalog)?;
    let mut observer = PlainTextObserver::with_color(use_color);
    let mut rl = DefaultEditor::new()?;

    // The stop flag: armed by Ctrl+C, consumed before the next
    // generation. It does not cancel a stream already in progress.
    let interrupted = Arc::new(AtomicBool::new(false));
    let interrupted_clone = interrupted.clone();
    ctrlc::set_handler(move || {
        interrupted_clone.store(true, Ordering::Relaxed);
    })?;

    println!("colloquy chat (model: {})", session.model_id());
    println!("Type /help for commands, /quit to exit\n");

    loop {
        if interrupted.swap(false, Ordering::Relaxed) {
            session.stop();
        }

        let readline = rl.readline("You: ");

        match readline {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }

                let _ = rl.add_history_entry(line);

                if let Some(cmd) = parse_command(line) {
                    match cmd {
                        ChatCommand::Quit => {
                            println!("Goodbye!");
                            break;
                        }
                        ChatCommand::Reset => {
                            session.reset();
                            observer.print_info("Conversation cleared.");
                        }
                        ChatCommand::DeleteLast => match session.delete_last() {
                            Ok(_) => observer.print_info("Last turn removed."),
                            Err(err) => observer.print_error(&err.to_string()),
                        },
                        ChatCommand::Regenerate => {
                            println!("Assistant:");
                            if let Err(e) = session.regenerate(&mut observer).await {
                                observer.print_error(&e.to_string());
                            }
                        }
                        ChatCommand::Model(model) => match session.set_model(&model) {
                            Ok(_) => {
                                observer.print_info(&format!("Model changed to: {model}"))
                            }
                            Err(err) => observer.print_error(&err.to_string()),
                        },
                        ChatCommand::Models => {
                            for id in session.available_models() {
                                println!("    {id}");
                            }
                        }
                        ChatCommand::System(prompt) => {
                            session.set_system_prompt(prompt.clone());
                            match prompt {
                                Some(p) => {
                                    observer.print_info(&format!("System prompt set to: {p}"))
                                }
                                None => observer.print_info("System prompt cleared."),
                            }
                        }
                        ChatCommand::Temperature(value) => {
                            match session.set_temperature(value) {
                                Ok(_) => observer
                                    .print_info(&format!("temperature set to {value:.2}")),
                                Err(err) => observer.print_error(&err.to_string()),
                            }
                        }
                        ChatCommand::MaxTokens(value) => {
                            session.set_max_tokens(value);
                            observer.print_info(&format!("max_tokens set to {value}"));
                        }
                        ChatCommand::Cost => {
                            println!("    Session cost: {}", session.formatted_cost());
                        }
                        ChatCommand::Image(prompt) => {
                            let key = resolve_key(&supplied_key, ProviderKind::OpenAi);
                            if let Err(e) = generate_image(&key, &prompt).await {
                                observer.print_error(&e.to_string());
                            }
                        }
                        ChatCommand::Stats => {
                            print_stats(&session);
                        }
                        ChatCommand::Help => {
                            for line in help_text().lines() {
                                println!("    {line}");
                            }
                        }
                        ChatCommand::Invalid(message) => {
                            observer.print_error(&message);
                        }
                    }
                    continue;
                }

                // Regular message - stream the response
                println!("Assistant:");
                if let Err(e) = session.submit_user_text(line, &mut observer).await {
                    observer.print_error(&e.to_string());
                }
            }
            Err(ReadlineError::Interrupted) => {
                // Ctrl+C at prompt - soft interrupt
                println!();
                continue;
            }
            Err(ReadlineError::Eof) => {
                // Ctrl+D - exit
                println!("\nGoodbye!");
                break;
            }
            Err(err) => {
                observer.print_error(&format!("Input error: {err}"));
                break;
            }
        }
    }

    Ok(())
}

/// Resolves the API key through the shared-password store when one is
/// configured in the environment.
fn resolve_key(supplied: &str, kind: ProviderKind) -> String {
    let secrets = SecretStore {
        password: std::env::var("COLLOQUY_PASSWORD").unwrap_or_default(),
        openai_api_key: std::env::var("COLLOQUY_OPENAI_API_KEY").unwrap_or_default(),
        groq_api_key: std::env::var("COLLOQUY_GROQ_API_KEY").unwrap_or_default(),
    };
    secrets.resolve_api_key(supplied, kind)
}

/// Generates one image and writes it next to the current directory.
async fn generate_image(api_key: &str, prompt: &str) -> colloquy::Result<()> {
    let generator = ImageGenerator::new(
        api_key.to_string(),
        None,
        std::time::Duration::from_secs(120),
    )?;
    println!("Generating...");
    let image = generator.generate(&ImageRequest::new(prompt)).await?;
    let bytes = image.decode()?;
    std::fs::write("colloquy-image.png", &bytes)
        .map_err(|err| colloquy::Error::io("failed to write image file", err))?;
    println!("Saved colloquy-image.png ({} bytes)", bytes.len());
    if !image.revised_prompt.is_empty() {
        println!("Revised prompt: {}", image.revised_prompt);
    }
    Ok(())
}

fn print_stats(session: &ChatSession) {
    let stats = session.stats();
    println!("    Session Statistics:");
    println!("      Model: {}", stats.model);
    println!("      Turns: {}", stats.turn_count);
    println!("      Temperature: {:.2}", stats.temperature);
    println!("      Max tokens: {}", stats.max_tokens);
    if let Some(prompt) = stats.system_prompt.as_deref() {
        println!("      System prompt: {prompt}");
    } else {
        println!("      System prompt: (none)");
    }
    println!("      Cost: {}", stats.formatted_cost);
    println!("      Last generation: {:?}", stats.state);
    if stats.dropped_blocks > 0 {
        println!(
            "      Image blocks dropped by this backend: {}",
            stats.dropped_blocks
        );
    }
}
