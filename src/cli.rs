//! Command-line interface for multisum
//!
//! Provides argument parsing using clap derive macros.

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

/// Summarize text, PDF, audio and video files
#[derive(Parser, Debug)]
#[command(name = "multisum", version, about = "Summarize text, PDF, audio and video files")]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Suppress status output (errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose logging (-v: debug, -vv: trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Never download missing models
    #[arg(long, global = true)]
    pub no_download: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Summarize a file (.txt, .pdf, .mp3, .wav, .mp4, .avi, .mov)
    File {
        /// File to summarize
        path: PathBuf,

        /// Input type: text, pdf, audio or video (default: detected from the file name)
        #[arg(long = "type", short = 't', value_name = "TYPE")]
        file_type: Option<String>,
    },

    /// Summarize text given as an argument or on stdin
    Text {
        /// Text to summarize (reads stdin when omitted)
        text: Option<String>,
    },

    /// Manage models
    Models {
        /// Action to perform
        #[command(subcommand)]
        action: ModelsAction,
    },

    /// View configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Check system dependencies and installed models
    Check,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

/// Configuration actions
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Get a configuration value by key (e.g., summarizer.max_tokens)
    Get {
        /// Dotted key path (e.g., stt.model, document.blank_pages)
        key: String,
    },
    /// Show the effective configuration
    Show,
    /// Dump a commented configuration template
    Dump,
}

/// Model management actions
#[derive(Subcommand, Debug)]
pub enum ModelsAction {
    /// List Whisper speech models
    List,
    /// Download and install a Whisper model
    Install {
        /// Model name (e.g., base, small.en, tiny)
        name: String,
    },
    /// List summarization models
    Summarizers,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_file_command() {
        let cli = Cli::try_parse_from(["multisum", "file", "report.pdf"]).unwrap();
        match cli.command {
            Commands::File { path, file_type } => {
                assert_eq!(path, PathBuf::from("report.pdf"));
                assert!(file_type.is_none());
            }
            other => panic!("Expected File command, got {other:?}"),
        }
        assert!(!cli.quiet);
        assert_eq!(cli.verbose, 0);
        assert!(!cli.no_download);
        assert!(cli.config.is_none());
    }

    #[test]
    fn test_parse_file_with_type() {
        let cli = Cli::try_parse_from(["multisum", "file", "clip.bin", "--type", "video"]).unwrap();
        match cli.command {
            Commands::File { file_type, .. } => assert_eq!(file_type.as_deref(), Some("video")),
            other => panic!("Expected File command, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_file_type_short_flag() {
        let cli = Cli::try_parse_from(["multisum", "file", "a.txt", "-t", "text"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::File { file_type: Some(ref t), .. } if t == "text"
        ));
    }

    #[test]
    fn test_file_requires_path() {
        assert!(Cli::try_parse_from(["multisum", "file"]).is_err());
    }

    #[test]
    fn test_parse_text_argument() {
        let cli = Cli::try_parse_from(["multisum", "text", "The quick brown fox."]).unwrap();
        match cli.command {
            Commands::Text { text } => assert_eq!(text.as_deref(), Some("The quick brown fox.")),
            other => panic!("Expected Text command, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_text_from_stdin() {
        let cli = Cli::try_parse_from(["multisum", "text"]).unwrap();
        assert!(matches!(cli.command, Commands::Text { text: None }));
    }

    #[test]
    fn test_parse_verbose_levels() {
        let cli = Cli::try_parse_from(["multisum", "-v", "check"]).unwrap();
        assert_eq!(cli.verbose, 1);
        let cli = Cli::try_parse_from(["multisum", "-vv", "check"]).unwrap();
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_global_options_after_command() {
        let cli = Cli::try_parse_from([
            "multisum",
            "file",
            "talk.mp3",
            "--quiet",
            "--no-download",
            "--config",
            "/tmp/multisum.toml",
        ])
        .unwrap();
        assert!(cli.quiet);
        assert!(cli.no_download);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/multisum.toml")));
    }

    #[test]
    fn test_parse_models_actions() {
        let cli = Cli::try_parse_from(["multisum", "models", "list"]).unwrap();
        assert!(matches!(cli.command, Commands::Models { action: ModelsAction::List }));

        let cli = Cli::try_parse_from(["multisum", "models", "install", "small.en"]).unwrap();
        match cli.command {
            Commands::Models {
                action: ModelsAction::Install { name },
            } => assert_eq!(name, "small.en"),
            other => panic!("Expected Models Install, got {other:?}"),
        }

        let cli = Cli::try_parse_from(["multisum", "models", "summarizers"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Models { action: ModelsAction::Summarizers }
        ));
    }

    #[test]
    fn test_models_requires_subcommand() {
        assert!(Cli::try_parse_from(["multisum", "models"]).is_err());
        assert!(Cli::try_parse_from(["multisum", "models", "install"]).is_err());
    }

    #[test]
    fn test_parse_config_actions() {
        let cli = Cli::try_parse_from(["multisum", "config", "get", "stt.model"]).unwrap();
        match cli.command {
            Commands::Config {
                action: ConfigAction::Get { key },
            } => assert_eq!(key, "stt.model"),
            other => panic!("Expected Config Get, got {other:?}"),
        }
        assert!(Cli::try_parse_from(["multisum", "config", "show"]).is_ok());
        assert!(Cli::try_parse_from(["multisum", "config", "dump"]).is_ok());
    }

    #[test]
    fn test_parse_check_and_completions() {
        assert!(matches!(
            Cli::try_parse_from(["multisum", "check"]).unwrap().command,
            Commands::Check
        ));
        assert!(matches!(
            Cli::try_parse_from(["multisum", "completions", "bash"])
                .unwrap()
                .command,
            Commands::Completions { shell: Shell::Bash }
        ));
    }

    #[test]
    fn test_command_is_required() {
        assert!(Cli::try_parse_from(["multisum"]).is_err());
    }

    #[test]
    fn test_invalid_command_returns_error() {
        assert!(Cli::try_parse_from(["multisum", "record"]).is_err());
    }

    #[test]
    fn test_version_flag() {
        let err = Cli::try_parse_from(["multisum", "--version"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayVersion);
    }
}
