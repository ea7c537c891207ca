//! Styling for headless output.

use ::console::style;
use std::fmt::Display;

pub fn success<D: Display>(text: D) -> String {
    style(text).green().bold().to_string()
}

pub fn header<D: Display>(text: D) -> String {
    style(text).white().bold().to_string()
}

pub fn dim<D: Display>(text: D) -> String {
    style(text).dim().to_string()
}

pub fn warning<D: Display>(text: D) -> String {
    style(text).yellow().to_string()
}

pub fn error<D: Display>(text: D) -> String {
    style(text).red().bold().to_string()
}

pub fn accent<D: Display>(text: D) -> String {
    style(text).cyan().bold().to_string()
}
