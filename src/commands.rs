use crate::board::{Board, run_board};
use crate::client::{OpenAiClient, RemoteModel};
use crate::common::{CommonParams, ImageParams};
use crate::config::Config;
use crate::mode::{EnhanceStyle, Mode};
use crate::orchestrator::{ActionError, ActionInput, Orchestrator, Outcome};
use crate::payload::select_source;
use crate::prompt::StorySource;
use crate::{log_debug, messages, ui};

use anyhow::{Context, Result};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use colored::Colorize;
use std::fs;
use std::path::Path;

/// Print a successful outcome
pub fn show_outcome(outcome: &Outcome) {
    let heading = messages::result_heading(outcome.mode());
    match outcome {
        Outcome::Text { text, .. } => ui::print_result(heading, text),
        Outcome::Image { url, .. } => ui::print_result(heading, url),
    }
}

/// Print an action failure according to its kind
pub fn show_action_error(err: &ActionError) {
    match err {
        ActionError::MissingCredential => ui::print_warning(&err.to_string()),
        ActionError::NeedsAnalysis => ui::print_info(&format!("ℹ️  {err}")),
        ActionError::MissingInput(_) | ActionError::Capture(_) | ActionError::Remote(_) => {
            ui::print_error(&format!("Error: {err}"));
        }
    }
}

/// Build an orchestrator wired to the OpenAI client
pub fn build_orchestrator(config: &Config, api_key: Option<&str>) -> Orchestrator<OpenAiClient> {
    let credential = config.credential(api_key);
    let client = OpenAiClient::new().with_base_url(&config.base_url);
    Orchestrator::new(client, config.settings(), credential)
}

fn load_config(common: &CommonParams) -> Result<Config> {
    let mut config = Config::load()?;
    common.apply_to_config(&mut config);
    Ok(config)
}

/// Run one action with a spinner; failures go back to the caller
async fn run_action<M: RemoteModel>(
    orchestrator: &mut Orchestrator<M>,
    mode: Mode,
    input: ActionInput<'_>,
) -> Result<Outcome> {
    let spinner = orchestrator
        .session()
        .has_credential()
        .then(|| ui::create_spinner(messages::get_waiting_message(mode)));
    let result = orchestrator.run_mode(mode, input).await;
    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }

    let outcome = result?;
    show_outcome(&outcome);
    Ok(outcome)
}

/// Handle `analyze` and `solve`
pub async fn handle_image_command(
    mode: Mode,
    common: &CommonParams,
    image: &ImageParams,
    api_key: Option<&str>,
) -> Result<()> {
    log_debug!("Handling {} with {:?}", mode, image);
    let config = load_config(common)?;
    let mut orchestrator = build_orchestrator(&config, api_key);

    let canvas = image.load_canvas()?;
    let input = ActionInput {
        image: select_source(&canvas, image.image.as_deref()),
        ..ActionInput::default()
    };
    run_action(&mut orchestrator, mode, input).await?;
    Ok(())
}

/// Handle `story`
pub async fn handle_story_command(
    common: &CommonParams,
    idea: String,
    api_key: Option<&str>,
) -> Result<()> {
    let config = load_config(common)?;
    let mut orchestrator = build_orchestrator(&config, api_key);
    let input = ActionInput {
        story: Some(StorySource::Idea(idea)),
        ..ActionInput::default()
    };
    run_action(&mut orchestrator, Mode::StoryGeneration, input).await?;
    Ok(())
}

/// Handle `enhance`: describe the sketch first when no description is given
pub async fn handle_enhance_command(
    common: &CommonParams,
    image: &ImageParams,
    description: Option<String>,
    style: EnhanceStyle,
    save: Option<&Path>,
    api_key: Option<&str>,
) -> Result<()> {
    let config = load_config(common)?;
    let mut orchestrator = build_orchestrator(&config, api_key);

    if description.is_none() && !image.is_empty() {
        let canvas = image.load_canvas()?;
        let input = ActionInput {
            image: select_source(&canvas, image.image.as_deref()),
            ..ActionInput::default()
        };
        run_action(&mut orchestrator, Mode::SketchAnalysis, input).await?;
        ui::print_newline();
    }

    let input = ActionInput {
        description,
        style,
        ..ActionInput::default()
    };
    let outcome = run_action(&mut orchestrator, Mode::ImageEnhancement, input).await?;

    if let (Some(path), Outcome::Image { url, .. }) = (save, &outcome) {
        let bytes = fetch_image(orchestrator.model(), url).await?;
        fs::write(path, bytes).with_context(|| format!("Failed to write {}", path.display()))?;
        ui::print_success(&format!("Image saved to {}", path.display()));
    }
    Ok(())
}

async fn fetch_image(client: &OpenAiClient, reference: &str) -> Result<Vec<u8>> {
    if let Some(encoded) = reference.strip_prefix("data:image/png;base64,") {
        return Ok(BASE64_STANDARD.decode(encoded)?);
    }
    Ok(client.download(reference).await?)
}

/// Handle `board`
pub async fn handle_board_command(common: &CommonParams, api_key: Option<&str>) -> Result<()> {
    let config = load_config(common)?;
    let orchestrator = build_orchestrator(&config, api_key);
    run_board(Board::new(orchestrator, &config.canvas)).await
}

/// Handle `config`
pub fn handle_config_command(
    api_key: Option<String>,
    model: Option<String>,
    image_model: Option<String>,
    image_size: Option<String>,
    language: Option<String>,
    base_url: Option<String>,
    print: bool,
) -> Result<()> {
    let mut config = Config::load()?;
    let changed = config.update(api_key, model, image_model, image_size, language, base_url);

    if changed {
        config.save()?;
        ui::print_success("Configuration updated successfully");
        ui::print_newline();
    }

    if print || !changed {
        print_configuration(&config);
    }
    Ok(())
}

fn print_configuration(config: &Config) {
    let key_state = if config.api_key.is_empty() {
        "not set (OPENAI_API_KEY is used if present)".yellow()
    } else {
        "set".green()
    };
    ui::print_message(&format!("{}", "Sketchboard configuration".bright_magenta().bold()));
    ui::print_message(&format!("  {} {}", "API key:".bold(), key_state));
    ui::print_message(&format!("  {} {}", "Model:".bold(), config.model));
    ui::print_message(&format!("  {} {}", "Image model:".bold(), config.image_model));
    ui::print_message(&format!("  {} {}", "Image size:".bold(), config.image_size));
    ui::print_message(&format!("  {} {}", "Language:".bold(), config.language));
    ui::print_message(&format!("  {} {}", "Base URL:".bold(), config.base_url));
    ui::print_message(&format!(
        "  {} {}x{}, width {}, {} on {}",
        "Canvas:".bold(),
        config.canvas.width,
        config.canvas.height,
        config.canvas.stroke_width,
        config.canvas.stroke_color,
        config.canvas.background
    ));
}

/// Handle `styles`
pub fn handle_list_styles_command() {
    ui::print_message(&format!("{}", "Enhancement styles".bright_magenta().bold()));
    for style in EnhanceStyle::ALL {
        ui::print_message(&format!("  {} {}", format!("{:<12}", style.to_string()).cyan(), style.phrase()));
    }
}

/// Handle `about`
pub fn handle_about_command() {
    ui::print_info(messages::ABOUT);
    for mode in Mode::ALL {
        ui::print_message(&format!("  {}", mode.label()));
    }
}
