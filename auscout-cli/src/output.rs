//! Human-readable terminal output.
//!
//! JSON output bypasses this module entirely; see `commands::emit`.

use owo_colors::OwoColorize;
use std::fmt::Display;

/// Print a heading with colored styling and clear separation
pub fn print_heading(text: &str) {
    let line = "=".repeat(50);

    println!("\n{}", line.bright_blue());
    println!("{}", format!(" {text} ").bold().bright_white());
    println!("{}\n", line.bright_blue());
}

/// Print a section heading (smaller than main heading) with colored styling
pub fn print_section(text: &str) {
    let line = "-".repeat(40);

    println!("\n{}", line.blue());
    println!("{}", format!(" {text} ").bold().white());
    println!("{}", line.blue());
}

/// Print an info line with label and value, with the label colored
pub fn print_info<T: Display>(label: &str, value: T) {
    println!("  {}: {}", label.bright_cyan(), value);
}

/// Print a yes/no verdict; `true` means a defect was found.
pub fn print_flag(label: &str, defect: bool) {
    if defect {
        println!("  {}: {}", label.bright_cyan(), "yes".bright_red().bold());
    } else {
        println!("  {}: {}", label.bright_cyan(), "no".green());
    }
}

/// Print an optional measurement, `n/a` when it could not be taken
pub fn print_measurement(label: &str, value: Option<f64>, unit: &str) {
    match value {
        Some(v) => print_info(label, format!("{v:.1} {unit}")),
        None => print_info(label, "n/a".dimmed()),
    }
}

/// Print an error message with red styling
pub fn print_error(message: &str) {
    eprintln!("{} {}", "Error:".bold().bright_red(), message);
}

/// Print a warning message with yellow styling
pub fn print_warning(message: &str) {
    println!("{} {}", "Warning:".yellow().bold(), message.yellow());
}
