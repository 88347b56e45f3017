//! Notification message templates.
//!
//! Bodies use Jinja syntax. Built-in defaults are compiled into the binary and
//! any `.jinja` file under `templates/notifications/` replaces the default of
//! the same name at startup.

pub mod engine;

pub use engine::{render_template, template_exists, TemplateError};
