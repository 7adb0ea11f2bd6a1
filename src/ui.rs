use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use parking_lot::Mutex;
use std::time::Duration;

/// Width results are wrapped to
const WRAP_WIDTH: usize = 80;

static QUIET_MODE: std::sync::LazyLock<Mutex<bool>> =
    std::sync::LazyLock::new(|| Mutex::new(false));

/// Enable or disable quiet mode
pub fn set_quiet_mode(enabled: bool) {
    *QUIET_MODE.lock() = enabled;
}

pub fn is_quiet_mode() -> bool {
    *QUIET_MODE.lock()
}

pub fn create_spinner(message: &str) -> ProgressBar {
    if is_quiet_mode() {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_chars("✦✧✶✷✸✹✺✻✼✽")
            .template("{spinner} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

pub fn print_info(message: &str) {
    if !is_quiet_mode() {
        println!("{}", message.cyan().bold());
    }
}

pub fn print_warning(message: &str) {
    if !is_quiet_mode() {
        println!("{}", format!("⚠️  {message}").yellow().bold());
    }
}

pub fn print_error(message: &str) {
    // Errors print even in quiet mode
    eprintln!("{}", message.red().bold());
}

pub fn print_success(message: &str) {
    if !is_quiet_mode() {
        println!("{}", message.green().bold());
    }
}

pub fn print_version(version: &str) {
    if !is_quiet_mode() {
        println!(
            "{} {} {}",
            "🧠 Sketchboard".magenta().bold(),
            "version".cyan(),
            version.green()
        );
    }
}

/// Print a heading followed by wrapped content between rules
pub fn print_result(heading: &str, content: &str) {
    if !is_quiet_mode() {
        println!("{}", heading.bright_purple().bold());
        println!("{}", "━".repeat(50).bright_purple());
    }
    // Results always reach stdout so they can be piped
    println!("{}", wrap(content));
    if !is_quiet_mode() {
        println!("{}", "━".repeat(50).bright_purple());
    }
}

pub fn print_message(message: &str) {
    if !is_quiet_mode() {
        println!("{message}");
    }
}

pub fn print_newline() {
    if !is_quiet_mode() {
        println!();
    }
}

/// Wrap each paragraph of model output to the terminal-friendly width
pub fn wrap(content: &str) -> String {
    content
        .lines()
        .map(|line| {
            if line.chars().count() <= WRAP_WIDTH {
                line.to_string()
            } else {
                textwrap::fill(line, WRAP_WIDTH)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
