//! Slash command parsing for the chat REPL.
//!
//! Commands control the session without sending anything to the backend.

/// A parsed chat command.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatCommand {
    /// Clear the conversation and the running cost.
    Reset,

    /// Remove the last turn.
    DeleteLast,

    /// Discard the last assistant turn and generate a new response.
    Regenerate,

    /// Change the model.
    Model(String),

    /// List the models in the catalog.
    Models,

    /// Set or clear the system prompt.
    /// `None` clears the current system prompt.
    System(Option<String>),

    /// Set the sampling temperature.
    Temperature(f32),

    /// Set the maximum tokens per response.
    MaxTokens(u32),

    /// Show the running session cost.
    Cost,

    /// Generate an image from a prompt.
    Image(String),

    /// Display session statistics.
    Stats,

    /// Display help information.
    Help,

    /// Exit the chat application.
    Quit,

    /// Report a parsing error back to the caller.
    Invalid(String),
}

/// Parses user input for slash commands.
///
/// Returns `Some(ChatCommand)` if the input is a command, or `None` if it
/// should be treated as a regular message.
pub fn parse_command(input: &str) -> Option<ChatCommand> {
    let input = input.trim();

    if !input.starts_with('/') {
        return None;
    }

    let mut parts = input[1..].splitn(2, ' ');
    let command = parts.next()?.to_lowercase();
    let argument = parts.next().map(|s| s.trim()).filter(|s| !s.is_empty());

    let result = match command.as_str() {
        "reset" | "clear" => ChatCommand::Reset,
        "delete" => ChatCommand::DeleteLast,
        "regenerate" | "regen" => ChatCommand::Regenerate,
        "model" => match argument {
            Some(model) => ChatCommand::Model(model.to_string()),
            None => ChatCommand::Invalid("/model requires a model name".to_string()),
        },
        "models" => ChatCommand::Models,
        "system" => ChatCommand::System(argument.map(|s| s.to_string())),
        "temperature" | "temp" => match argument {
            Some(arg) => match arg.parse::<f32>() {
                Ok(value) if (0.0..=2.0).contains(&value) => ChatCommand::Temperature(value),
                Ok(_) => {
                    ChatCommand::Invalid("/temperature must be between 0.0 and 2.0".to_string())
                }
                Err(_) => ChatCommand::Invalid(format!("/temperature: '{arg}' is not a number")),
            },
            None => ChatCommand::Invalid("/temperature requires a value".to_string()),
        },
        "max_tokens" => match argument {
            Some(arg) => match arg.parse::<u32>() {
                Ok(value) if value > 0 => ChatCommand::MaxTokens(value),
                Ok(_) => ChatCommand::Invalid("/max_tokens must be positive".to_string()),
                Err(_) => ChatCommand::Invalid(format!("/max_tokens: '{arg}' is not a number")),
            },
            None => ChatCommand::Invalid("/max_tokens requires a value".to_string()),
        },
        "cost" => ChatCommand::Cost,
        "image" => match argument {
            Some(prompt) => ChatCommand::Image(prompt.to_string()),
            None => ChatCommand::Invalid("/image requires a prompt".to_string()),
        },
        "stats" | "status" => ChatCommand::Stats,
        "help" | "?" => ChatCommand::Help,
        "quit" | "exit" | "q" => ChatCommand::Quit,
        _ => ChatCommand::Invalid(format!("unknown command: /{command}")),
    };

    Some(result)
}

/// Help text listing every command.
pub fn help_text() -> &'static str {
    "Commands:
/reset              Clear the conversation and running cost
/delete             Remove the last turn
/regenerate         Discard the last response and generate a new one
/model <id>         Change the model
/models             List models in the catalog
/system [prompt]    Set or clear the system prompt
/temperature <v>    Set sampling temperature (0.0-2.0)
/max_tokens <n>     Set the response token ceiling
/cost               Show the running session cost
/image <prompt>     Generate an image from a prompt
/stats              Show session statistics
/help               Show this help
/quit               Exit"
}
