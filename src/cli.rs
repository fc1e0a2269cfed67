use crate::transport::TransportMode;
use clap::{Parser, Subcommand};

/// Send a prompt to the AI Fiesta multi-model chat API
#[derive(Debug, Parser)]
#[command(name = "fiesta")]
#[command(version)]
#[command(about = "Multi-model chat client and relay", long_about = None)]
pub struct Args {
    /// Bearer token (raw or "Bearer ..."); also read from FIESTA_TOKEN
    #[arg(long = "token", env = "FIESTA_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Model identifier (see `fiesta models`)
    #[arg(short = 'm', long = "model")]
    pub model: Option<String>,

    /// Title of the chat created for this prompt
    #[arg(long = "title")]
    pub title: Option<String>,

    /// Transport order (default: config, or direct-then-relay when a relay is set)
    #[arg(long = "mode", value_enum)]
    pub mode: Option<TransportMode>,

    /// Relay endpoint, e.g. http://127.0.0.1:3000/api/proxy
    #[arg(long = "relay-url")]
    pub relay_url: Option<String>,

    /// Print the result as relay-shaped JSON instead of rendering it
    #[arg(long = "json")]
    pub json: bool,

    /// Do not read or write saved form state
    #[arg(long = "no-save")]
    pub no_save: bool,

    #[command(subcommand)]
    pub cmd: Option<Command>,

    /// Prompt text (positional) (used when no subcommand is given)
    #[arg(value_name = "PROMPT")]
    pub prompt: Vec<String>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the relay endpoint (POST /api/proxy)
    Serve {
        /// Address to bind (default: config serve.bind or 127.0.0.1:3000)
        #[arg(long = "bind")]
        bind: Option<String>,
    },

    /// List known models
    Models,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_words_and_flags() {
        let a = Args::try_parse_from(["fiesta", "-m", "grok", "--mode", "direct-then-relay", "hello", "there"])
            .unwrap();
        assert_eq!(a.model.as_deref(), Some("grok"));
        assert_eq!(a.mode, Some(TransportMode::DirectThenRelay));
        assert_eq!(a.prompt, vec!["hello", "there"]);
        assert!(a.cmd.is_none());
    }

    #[test]
    fn serve_subcommand() {
        let a = Args::try_parse_from(["fiesta", "serve", "--bind", "0.0.0.0:9000"]).unwrap();
        assert!(matches!(a.cmd, Some(Command::Serve { bind: Some(ref b) }) if b == "0.0.0.0:9000"));
    }
}
