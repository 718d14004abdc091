//! Console messages for the interactive user.
//!
//! Diagnostics go through `tracing`; these are the lines a user reads.

use console::style;

pub fn info(msg: &str) {
    println!("{} {}", style("###").cyan().bold(), msg);
}

pub fn success(msg: &str) {
    println!("{} {}", style("[OK]").green().bold(), msg);
}

pub fn warn(msg: &str) {
    eprintln!("{} {}", style("[WARN]").yellow().bold(), msg);
}

pub fn error(msg: &str) {
    eprintln!("{} {}", style("[ERROR]").red().bold(), msg);
}

/// Framed confirmation shown once an operation completed
pub fn confirm(msg: &str) {
    let bar = "=".repeat(msg.chars().count() + 4);
    println!("{}", style(&bar).green());
    println!("{}", style(format!("  {}  ", msg)).green().bold());
    println!("{}", style(&bar).green());
}

#[macro_export]
macro_rules! out_info {
    ($($arg:tt)*) => { $crate::output::info(&format!($($arg)*)) };
}

#[macro_export]
macro_rules! out_success {
    ($($arg:tt)*) => { $crate::output::success(&format!($($arg)*)) };
}

#[macro_export]
macro_rules! out_warn {
    ($($arg:tt)*) => { $crate::output::warn(&format!($($arg)*)) };
}

#[macro_export]
macro_rules! out_error {
    ($($arg:tt)*) => { $crate::output::error(&format!($($arg)*)) };
}

#[macro_export]
macro_rules! out_confirm {
    ($($arg:tt)*) => { $crate::output::confirm(&format!($($arg)*)) };
}
