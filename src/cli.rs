use crate::commands;
use crate::common::{CommonParams, ImageParams};
use crate::log_debug;
use crate::mode::{EnhanceStyle, Mode};
use crate::ui;
use clap::builder::{Styles, styling::AnsiColor};
use clap::{Parser, Subcommand, crate_version};
use std::path::PathBuf;

const LOG_FILE: &str = "sketchboard-debug.log";

/// CLI structure defining the available commands and global arguments
#[derive(Parser)]
#[command(
    author,
    version = crate_version!(),
    about = "Sketchboard: describe sketches, solve formulas, write stories and generate images with AI",
    long_about = "Sketchboard sends a hand-drawn sketch or a photographed formula to a hosted multimodal model and shows what comes back: a description, a worked solution, a children's story or a newly generated image.",
    disable_version_flag = true,
    styles = get_styles(),
)]
pub struct Cli {
    /// Subcommands available for the CLI
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// API key for this run (overrides OPENAI_API_KEY and the config file)
    #[arg(long = "api-key", global = true, help = "API key for this run")]
    pub api_key: Option<String>,

    /// Log debug messages to a file
    #[arg(short = 'l', long = "log", global = true, help = "Log debug messages to a file")]
    pub log: bool,

    /// Specify a custom log file path
    #[arg(long = "log-file", global = true, help = "Specify a custom log file path")]
    pub log_file: Option<String>,

    /// Suppress non-essential output (spinners, headings)
    #[arg(short = 'q', long = "quiet", global = true, help = "Suppress non-essential output")]
    pub quiet: bool,

    /// Display the version
    #[arg(short = 'v', long = "version", global = true, help = "Display the version")]
    pub version: bool,
}

/// Enumeration of available subcommands
#[derive(Subcommand)]
#[command(subcommand_negates_reqs = true)]
#[command(subcommand_precedence_over_arg = true)]
pub enum Commands {
    /// Describe a sketch
    #[command(
        about = "Describe a sketch or image",
        long_about = "Render a sketch file (or upload an image) and ask the model for a brief description."
    )]
    Analyze {
        #[command(flatten)]
        common: CommonParams,

        #[command(flatten)]
        image: ImageParams,
    },

    /// Recognize and solve a formula
    #[command(
        about = "Recognize and solve a math formula",
        long_about = "Upload a photo of a handwritten formula; the model writes it in mathematical notation and solves it step by step."
    )]
    Solve {
        #[command(flatten)]
        common: CommonParams,

        #[command(flatten)]
        image: ImageParams,
    },

    /// Write a children's story
    #[command(about = "Write a short children's story from an idea")]
    Story {
        #[command(flatten)]
        common: CommonParams,

        /// Idea or theme for the story
        #[arg(long, help = "Idea or theme for the story")]
        idea: String,
    },

    /// Generate an enhanced image from a sketch
    #[command(
        about = "Generate a styled image from a sketch",
        long_about = "Generate a new image from a sketch description. Pass --description directly, or --sketch/--image to describe the sketch first."
    )]
    Enhance {
        #[command(flatten)]
        common: CommonParams,

        #[command(flatten)]
        image: ImageParams,

        /// What the sketch shows
        #[arg(long, help = "Description of the sketch to generate from")]
        description: Option<String>,

        /// Art style for the generated image
        #[arg(long, value_enum, default_value_t = EnhanceStyle::Realistic, help = "Art style")]
        style: EnhanceStyle,

        /// Download the generated image to this path
        #[arg(long, help = "Save the generated image to this path")]
        save: Option<PathBuf>,
    },

    /// Interactive board session
    #[command(
        about = "Start an interactive board session",
        long_about = "Draw strokes, upload images and trigger modes interactively. The session remembers the last analysis so stories and enhancements can reuse it."
    )]
    Board {
        #[command(flatten)]
        common: CommonParams,
    },

    /// Configure Sketchboard
    #[command(about = "Configure Sketchboard settings")]
    Config {
        /// Save an API key in the config file
        #[arg(long = "set-api-key", help = "Save an API key in the config file")]
        set_api_key: Option<String>,

        #[arg(long, help = "Set the chat model")]
        model: Option<String>,

        #[arg(long, help = "Set the image generation model")]
        image_model: Option<String>,

        #[arg(long, help = "Set the generated image size (e.g. 1024x1024)")]
        image_size: Option<String>,

        #[arg(long = "lang", help = "Set the answer language")]
        language: Option<String>,

        #[arg(long, help = "Set the base URL of an OpenAI-compatible API")]
        base_url: Option<String>,

        /// Print the current configuration
        #[arg(short, long, help = "Print the current configuration")]
        print: bool,
    },

    /// List enhancement styles
    #[command(about = "List available enhancement styles")]
    Styles,

    /// Describe the application
    #[command(about = "What Sketchboard can do")]
    About,
}

/// Define custom styles for Clap
fn get_styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::Magenta.on_default().bold())
        .usage(AnsiColor::Cyan.on_default().bold())
        .literal(AnsiColor::Green.on_default().bold())
        .placeholder(AnsiColor::Yellow.on_default())
        .valid(AnsiColor::Blue.on_default().bold())
        .invalid(AnsiColor::Red.on_default().bold())
        .error(AnsiColor::Red.on_default().bold())
}

/// Parse the command-line arguments
pub fn parse_args() -> Cli {
    Cli::parse()
}

/// Main function to parse arguments and handle the command
pub async fn main() -> anyhow::Result<()> {
    let cli = parse_args();

    if cli.version {
        ui::print_version(crate_version!());
        return Ok(());
    }

    if cli.log {
        crate::logger::enable_logging();
        let log_file = cli.log_file.as_deref().unwrap_or(LOG_FILE);
        crate::logger::set_log_file(log_file)?;
    } else {
        crate::logger::disable_logging();
    }

    if cli.quiet {
        ui::set_quiet_mode(true);
    }

    if let Some(command) = cli.command {
        handle_command(command, cli.api_key.as_deref()).await
    } else {
        let _ = Cli::parse_from(["sketchboard", "--help"]);
        Ok(())
    }
}

/// Handle the command based on parsed arguments
pub async fn handle_command(command: Commands, api_key: Option<&str>) -> anyhow::Result<()> {
    match command {
        Commands::Analyze { common, image } => {
            log_debug!("Handling 'analyze' command");
            commands::handle_image_command(Mode::SketchAnalysis, &common, &image, api_key).await
        }
        Commands::Solve { common, image } => {
            log_debug!("Handling 'solve' command");
            commands::handle_image_command(Mode::FormulaSolving, &common, &image, api_key).await
        }
        Commands::Story { common, idea } => {
            log_debug!("Handling 'story' command");
            commands::handle_story_command(&common, idea, api_key).await
        }
        Commands::Enhance {
            common,
            image,
            description,
            style,
            save,
        } => {
            log_debug!("Handling 'enhance' command with style {}", style);
            commands::handle_enhance_command(
                &common,
                &image,
                description,
                style,
                save.as_deref(),
                api_key,
            )
            .await
        }
        Commands::Board { common } => {
            ui::print_version(crate_version!());
            commands::handle_board_command(&common, api_key).await
        }
        Commands::Config {
            set_api_key,
            model,
            image_model,
            image_size,
            language,
            base_url,
            print,
        } => commands::handle_config_command(
            set_api_key,
            model,
            image_model,
            image_size,
            language,
            base_url,
            print,
        ),
        Commands::Styles => {
            commands::handle_list_styles_command();
            Ok(())
        }
        Commands::About => {
            commands::handle_about_command();
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_enhance_style() {
        let cli = Cli::try_parse_from([
            "sketchboard",
            "enhance",
            "--description",
            "a rocket",
            "--style",
            "digital-art",
        ])
        .expect("valid arguments");
        match cli.command {
            Some(Commands::Enhance { style, description, .. }) => {
                assert_eq!(style, EnhanceStyle::DigitalArt);
                assert_eq!(description.as_deref(), Some("a rocket"));
            }
            _ => panic!("expected enhance command"),
        }
    }

    #[test]
    fn test_sketch_and_image_conflict() {
        let result = Cli::try_parse_from([
            "sketchboard",
            "analyze",
            "--sketch",
            "a.json",
            "--image",
            "b.png",
        ]);
        assert!(result.is_err());
    }
}
