//! Command-line plumbing shared by every demo binary

use agentry_llm::{Client, ClientConfig, LlmResult, Provider};
use clap::Args;
use std::io::{self, BufRead, Write};
use tracing_subscriber::EnvFilter;

/// Model selection flags
#[derive(Debug, Clone, Args)]
pub struct ModelArgs {
    /// Chat model, defaults to the provider's configured model
    #[arg(long)]
    pub model: Option<String>,

    /// Hosted provider: openai or gemini
    #[arg(long, default_value = "openai")]
    pub provider: Provider,
}

impl ModelArgs {
    /// Client for the selected provider and model
    pub fn client(&self) -> LlmResult<Client> {
        let client = Client::new(ClientConfig::for_provider(self.provider)?)?;
        Ok(match &self.model {
            Some(model) => client.with_model(model),
            None => client,
        })
    }
}

/// Install a `tracing` subscriber honouring `RUST_LOG`, defaulting to `info`
pub fn init_tracing() {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();
}

/// Print `prompt` and read one trimmed line; `None` at end of input
pub fn prompt_line(prompt: &str) -> io::Result<Option<String>> {
    print!("{}", prompt);
    io::stdout().flush()?;

    let mut line = String::new();
    if io::stdin().lock().read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

/// Whether `input` asks to leave an interactive loop
pub fn is_exit(input: &str) -> bool {
    matches!(input.to_lowercase().as_str(), "exit" | "quit")
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        model: ModelArgs,
    }

    #[test]
    fn test_model_args_parse() {
        let cli = TestCli::parse_from(["demo", "--provider", "gemini", "--model", "gemini-2.0-flash"]);
        assert_eq!(cli.model.provider, Provider::Gemini);
        assert_eq!(cli.model.model.as_deref(), Some("gemini-2.0-flash"));

        let cli = TestCli::parse_from(["demo"]);
        assert_eq!(cli.model.provider, Provider::OpenAi);
        assert!(TestCli::try_parse_from(["demo", "--provider", "claude"]).is_err());
    }

    #[test]
    fn test_is_exit() {
        assert!(is_exit("exit"));
        assert!(is_exit("QUIT"));
        assert!(!is_exit("exit please"));
    }
}
