use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Aethel console - watch an autonomous agent work and answer when it asks.
#[derive(Parser, Debug)]
#[command(name = "aethel-console")]
#[command(version)]
#[command(about = "Live monitoring and human-in-the-loop console for the Aethel agent.", long_about = None)]
pub struct Cli {
    /// Backend base URL (overrides config and AETHEL_BACKEND_URL)
    #[arg(long, global = true)]
    pub backend: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// The console is the default when no subcommand is given.
    pub fn subcommand(&self) -> Commands {
        self.command.clone().unwrap_or(Commands::Console)
    }
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Open the full-screen console (default)
    Console,

    /// Print a one-line summary of every snapshot until Ctrl-C
    Tail,

    /// Send one response to the agent and exit
    Send {
        /// Text to send, verbatim
        text: String,
    },

    /// Upload an audio file to the agent and exit
    Upload {
        /// Audio file to send
        path: PathBuf,

        /// MIME type (guessed from the extension when omitted)
        #[arg(long)]
        mime: Option<String>,
    },
}

impl Commands {
    /// Whether the command takes over the terminal.
    pub fn is_interactive(&self) -> bool {
        matches!(self, Self::Console)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn console_is_default() {
        let cli = Cli::try_parse_from(["aethel-console"]).unwrap();
        assert_eq!(cli.subcommand(), Commands::Console);
        assert!(cli.subcommand().is_interactive());
        assert!(cli.backend.is_none());
    }

    #[test]
    fn send_takes_text_and_backend() {
        let cli =
            Cli::try_parse_from(["aethel-console", "send", "yes", "--backend", "http://h:1"])
                .unwrap();
        assert_eq!(cli.subcommand(), Commands::Send { text: "yes".into() });
        assert_eq!(cli.backend.as_deref(), Some("http://h:1"));
    }

    #[test]
    fn upload_accepts_mime() {
        let cli = Cli::try_parse_from([
            "aethel-console",
            "upload",
            "note.ogg",
            "--mime",
            "audio/ogg",
        ])
        .unwrap();
        assert_eq!(
            cli.subcommand(),
            Commands::Upload {
                path: PathBuf::from("note.ogg"),
                mime: Some("audio/ogg".into()),
            }
        );
    }

    #[test]
    fn send_requires_text() {
        assert!(Cli::try_parse_from(["aethel-console", "send"]).is_err());
    }
}
