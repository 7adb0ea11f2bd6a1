//! Interactive board session.
//!
//! Keeps one canvas, one optional upload and one story idea between actions, and
//! hands them to the orchestrator whenever the user triggers a mode.

use crate::canvas::{self, Canvas};
use crate::client::RemoteModel;
use crate::commands::{show_action_error, show_outcome};
use crate::config::CanvasConfig;
use crate::mode::{EnhanceStyle, Mode};
use crate::orchestrator::{ActionInput, Orchestrator, Outcome};
use crate::payload::{self, select_source};
use crate::prompt::StorySource;
use crate::session::Credential;
use crate::{log_debug, messages, ui};

use anyhow::Result;
use colored::Colorize;
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::history::DefaultHistory;
use rustyline::validate::Validator;
use rustyline::{Context, Editor, Helper};
use std::borrow::Cow::{self, Borrowed, Owned};
use std::fs;
use std::path::{Path, PathBuf};

const COMMANDS: &[&str] = &[
    "analyze", "about", "clear", "color", "enhance", "help", "idea", "key", "lang", "load", "mode",
    "quit", "run", "save", "solve", "status", "story", "stroke", "style", "upload", "width",
];

const HELP: &str = "\
mode <analyze|solve|enhance|story>  pick the active mode
key <api-key>                       set the API key for this session
lang <language>                     language for answers
width <1-30> | color <#RRGGBB>      pen settings
stroke x,y x,y ...                  draw a stroke on the canvas
clear                               wipe the canvas
load <sketch.json>                  replace the canvas with a sketch file
save <file.png>                     write the canvas to a PNG file
upload [file]                       use a PNG/JPEG instead of the canvas (no file clears it)
idea <text>                         idea for the next story
style <realistic|cartoon|anime|watercolor|digital-art>
run                                 trigger the active mode
analyze | solve | enhance           select and trigger in one step
story [reuse]                       write a story from the idea, or from the last analysis
status | about | help | quit";

/// A parsed board command
#[derive(Debug, Clone, PartialEq)]
pub enum BoardCommand {
    Help,
    About,
    Status,
    Quit,
    Mode(Mode),
    Key(String),
    Lang(String),
    Width(u32),
    Color(String),
    Stroke(Vec<(f32, f32)>),
    Clear,
    Load(PathBuf),
    Save(PathBuf),
    Upload(Option<PathBuf>),
    Idea(String),
    Style(EnhanceStyle),
    Run,
    Trigger(Mode),
    Story { reuse: bool },
}

/// Parse one input line
pub fn parse_command(line: &str) -> Result<BoardCommand, String> {
    let line = line.trim();
    let (name, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    let rest = rest.trim();
    let required = |what: &str| {
        if rest.is_empty() {
            Err(format!("'{name}' needs {what}"))
        } else {
            Ok(rest.to_string())
        }
    };

    match name.to_ascii_lowercase().as_str() {
        "help" | "?" => Ok(BoardCommand::Help),
        "about" => Ok(BoardCommand::About),
        "status" => Ok(BoardCommand::Status),
        "quit" | "exit" => Ok(BoardCommand::Quit),
        "mode" => rest
            .parse::<Mode>()
            .map(BoardCommand::Mode)
            .map_err(|_| format!("Unknown mode '{rest}'. Try analyze, solve, enhance or story")),
        "key" => required("an API key").map(BoardCommand::Key),
        "lang" => required("a language").map(BoardCommand::Lang),
        "width" => rest
            .parse::<u32>()
            .map(BoardCommand::Width)
            .map_err(|_| format!("Width must be a number between 1 and 30, got '{rest}'")),
        "color" => required("a colour like #000000").map(BoardCommand::Color),
        "stroke" => {
            let points = canvas::parse_points(rest)?;
            if points.is_empty() {
                return Err("'stroke' needs at least one x,y point".to_string());
            }
            Ok(BoardCommand::Stroke(points))
        }
        "clear" => Ok(BoardCommand::Clear),
        "load" => required("a sketch file").map(|p| BoardCommand::Load(PathBuf::from(p))),
        "save" => required("an output file").map(|p| BoardCommand::Save(PathBuf::from(p))),
        "upload" => Ok(BoardCommand::Upload(
            (!rest.is_empty()).then(|| PathBuf::from(rest)),
        )),
        "idea" => required("some text").map(BoardCommand::Idea),
        "style" => rest
            .parse::<EnhanceStyle>()
            .map(BoardCommand::Style)
            .map_err(|_| format!("Unknown style '{rest}'")),
        "run" => Ok(BoardCommand::Run),
        "analyze" => Ok(BoardCommand::Trigger(Mode::SketchAnalysis)),
        "solve" => Ok(BoardCommand::Trigger(Mode::FormulaSolving)),
        "enhance" => Ok(BoardCommand::Trigger(Mode::ImageEnhancement)),
        "story" => Ok(BoardCommand::Story {
            reuse: rest.eq_ignore_ascii_case("reuse"),
        }),
        other => Err(format!("Unknown command '{other}'. Type 'help' for a list")),
    }
}

/// Whether the loop should keep going
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Board state around the orchestrator
pub struct Board<M: RemoteModel> {
    orchestrator: Orchestrator<M>,
    canvas: Canvas,
    upload: Option<PathBuf>,
    idea: Option<String>,
    style: EnhanceStyle,
}

impl<M: RemoteModel> Board<M> {
    pub fn new(orchestrator: Orchestrator<M>, canvas_config: &CanvasConfig) -> Self {
        let mut canvas = Canvas::new(canvas_config.width, canvas_config.height).unwrap_or_default();
        canvas.set_pen_width(canvas_config.stroke_width);
        if let Err(e) = canvas.set_pen_color(&canvas_config.stroke_color) {
            log_debug!("Ignoring configured stroke colour: {}", e);
        }
        if let Err(e) = canvas.set_background(&canvas_config.background) {
            log_debug!("Ignoring configured background: {}", e);
        }
        Self {
            orchestrator,
            canvas,
            upload: None,
            idea: None,
            style: EnhanceStyle::default(),
        }
    }

    pub fn orchestrator(&self) -> &Orchestrator<M> {
        &self.orchestrator
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    pub fn upload(&self) -> Option<&Path> {
        self.upload.as_deref()
    }

    pub fn style(&self) -> EnhanceStyle {
        self.style
    }

    /// Apply one command; actions print their own results
    pub async fn execute(&mut self, command: BoardCommand) -> Flow {
        match command {
            BoardCommand::Help => ui::print_message(HELP),
            BoardCommand::About => ui::print_info(messages::ABOUT),
            BoardCommand::Status => self.print_status(),
            BoardCommand::Quit => return Flow::Quit,
            BoardCommand::Mode(mode) => {
                self.orchestrator.select_mode(mode);
                ui::print_info(&format!("Mode: {}", mode.label()));
            }
            BoardCommand::Key(key) => {
                self.orchestrator.set_credential(Credential::new(key));
                ui::print_success("API key set for this session");
            }
            BoardCommand::Lang(language) => {
                ui::print_info(&format!("Answers will be in {language}"));
                self.orchestrator.set_language(language);
            }
            BoardCommand::Width(width) => {
                self.canvas.set_pen_width(width);
                ui::print_info(&format!("Line width: {}", self.canvas.pen_width()));
            }
            BoardCommand::Color(color) => match self.canvas.set_pen_color(&color) {
                Ok(()) => ui::print_info(&format!("Line colour: {color}")),
                Err(e) => ui::print_error(&e.to_string()),
            },
            BoardCommand::Stroke(points) => {
                self.canvas.add_stroke(points);
                ui::print_message(&format!("{} stroke(s) on the canvas", self.canvas.strokes().len()));
            }
            BoardCommand::Clear => {
                self.canvas.clear();
                ui::print_info("Canvas cleared");
            }
            BoardCommand::Load(path) => match Canvas::load(&path) {
                Ok(canvas) => {
                    self.canvas = canvas;
                    ui::print_info(&format!("Loaded {} stroke(s)", self.canvas.strokes().len()));
                }
                Err(e) => ui::print_error(&e.to_string()),
            },
            BoardCommand::Save(path) => match self.canvas.to_png() {
                Ok(bytes) => match fs::write(&path, bytes) {
                    Ok(()) => ui::print_success(&format!("Canvas saved to {}", path.display())),
                    Err(e) => ui::print_error(&format!("Could not write {}: {e}", path.display())),
                },
                Err(e) => ui::print_error(&e.to_string()),
            },
            BoardCommand::Upload(path) => self.set_upload(path),
            BoardCommand::Idea(idea) => {
                self.idea = Some(idea);
                ui::print_info("Story idea noted");
            }
            BoardCommand::Style(style) => {
                self.style = style;
                ui::print_info(&format!("Style: {style}"));
            }
            BoardCommand::Run => {
                let mode = self.orchestrator.session().mode;
                self.act(mode, false).await;
            }
            BoardCommand::Trigger(mode) => {
                self.orchestrator.select_mode(mode);
                self.act(mode, false).await;
            }
            BoardCommand::Story { reuse } => {
                self.orchestrator.select_mode(Mode::StoryGeneration);
                self.act(Mode::StoryGeneration, reuse).await;
            }
        }
        Flow::Continue
    }

    fn set_upload(&mut self, path: Option<PathBuf>) {
        match path {
            None => {
                self.upload = None;
                ui::print_info("Upload cleared; the canvas will be used");
            }
            Some(path) => {
                if let Err(e) = payload::check_upload_extension(&path) {
                    ui::print_error(&e.to_string());
                } else if !path.is_file() {
                    ui::print_error(&format!("File not found: {}", path.display()));
                } else {
                    ui::print_info(&format!("Using upload {}", path.display()));
                    self.upload = Some(path);
                }
            }
        }
    }

    /// Trigger the mode once and show what came back
    pub async fn act(&mut self, mode: Mode, reuse: bool) -> Option<Outcome> {
        let story = (mode == Mode::StoryGeneration).then(|| match (&self.idea, reuse) {
            (_, true) => StorySource::FromAnalysis,
            (idea, false) => StorySource::Idea(idea.clone().unwrap_or_default()),
        });
        let input = ActionInput {
            image: select_source(&self.canvas, self.upload.as_deref()),
            story,
            description: None,
            style: self.style,
        };

        let spinner = self
            .orchestrator
            .session()
            .has_credential()
            .then(|| ui::create_spinner(messages::get_waiting_message(mode)));
        let result = self.orchestrator.trigger(input).await;
        if let Some(spinner) = spinner {
            spinner.finish_and_clear();
        }

        match result {
            Ok(outcome) => {
                show_outcome(&outcome);
                Some(outcome)
            }
            Err(e) => {
                show_action_error(&e);
                None
            }
        }
    }

    fn print_status(&self) {
        let session = self.orchestrator.session();
        let yes_no = |b: bool| if b { "yes".green() } else { "no".red() };
        ui::print_message(&format!("{} {}", "Mode:".bold(), session.mode.label()));
        ui::print_message(&format!("{} {}", "Phase:".bold(), session.phase));
        ui::print_message(&format!("{} {}", "API key:".bold(), yes_no(session.has_credential())));
        ui::print_message(&format!(
            "{} {} stroke(s), width {}",
            "Canvas:".bold(),
            self.canvas.strokes().len(),
            self.canvas.pen_width()
        ));
        ui::print_message(&format!(
            "{} {}",
            "Upload:".bold(),
            self.upload
                .as_ref()
                .map_or_else(|| "none".to_string(), |p| p.display().to_string())
        ));
        ui::print_message(&format!("{} {}", "Analysis done:".bold(), yes_no(session.analysis_done)));
        ui::print_message(&format!("{} {}", "Style:".bold(), self.style));
    }
}

/// Completion and hints for board commands
struct BoardHelper;

impl Helper for BoardHelper {}

impl Completer for BoardHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let line = line.get(..pos).unwrap_or(line);
        if line.contains(' ') {
            return Ok((0, vec![]));
        }
        let candidates = COMMANDS
            .iter()
            .filter(|cmd| cmd.starts_with(line))
            .map(|cmd| Pair {
                display: (*cmd).to_string(),
                replacement: (*cmd).to_string(),
            })
            .collect();
        Ok((0, candidates))
    }
}

impl Hinter for BoardHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<String> {
        let line = line.get(..pos)?;
        if line.is_empty() || line.contains(' ') {
            return None;
        }
        COMMANDS
            .iter()
            .find(|cmd| cmd.starts_with(line) && cmd.len() > line.len())
            .and_then(|cmd| cmd.get(line.len()..))
            .map(ToString::to_string)
    }
}

impl Highlighter for BoardHelper {
    fn highlight_hint<'h>(&self, hint: &'h str) -> Cow<'h, str> {
        Owned(hint.bright_black().to_string())
    }

    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        Borrowed(line)
    }
}

impl Validator for BoardHelper {}

/// Run the interactive loop until `quit` or end of input
pub async fn run_board<M: RemoteModel>(mut board: Board<M>) -> Result<()> {
    ui::print_info(messages::ABOUT);
    ui::print_message("Type 'help' for commands.");
    if !board.orchestrator().session().has_credential() {
        ui::print_warning("Please enter your OpenAI API key with 'key <api-key>' to use the board.");
    }

    let mut rl: Editor<BoardHelper, DefaultHistory> = Editor::new()?;
    rl.set_helper(Some(BoardHelper));

    loop {
        let prompt = format!("{} ", format!("[{}]>", board.orchestrator().session().mode).magenta());
        match rl.readline(&prompt) {
            Ok(line) => {
                if line.trim().is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(line.as_str());
                match parse_command(&line) {
                    Ok(command) => {
                        if board.execute(command).await == Flow::Quit {
                            break;
                        }
                    }
                    Err(e) => ui::print_error(&e),
                }
            }
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
            Err(e) => return Err(e.into()),
        }
    }

    ui::print_message("Bye!");
    Ok(())
}
