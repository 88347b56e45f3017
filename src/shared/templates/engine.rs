use minijinja::Environment;
use serde::Serialize;
use std::path::Path;
use std::sync::OnceLock;
use thiserror::Error;

/// Global template environment
static TEMPLATE_ENV: OnceLock<Environment<'static>> = OnceLock::new();

/// Override directory relative to the working directory
const TEMPLATE_DIR: &str = "templates/notifications";

const BUILTIN_TEMPLATES: &[(&str, &str)] = &[
    (
        "booking_confirmed",
        include_str!("../../../templates/notifications/booking_confirmed.jinja"),
    ),
    (
        "agent_assigned",
        include_str!("../../../templates/notifications/agent_assigned.jinja"),
    ),
    (
        "job_started",
        include_str!("../../../templates/notifications/job_started.jinja"),
    ),
    (
        "awaiting_verification",
        include_str!("../../../templates/notifications/awaiting_verification.jinja"),
    ),
    (
        "job_completed",
        include_str!("../../../templates/notifications/job_completed.jinja"),
    ),
    (
        "booking_cancelled",
        include_str!("../../../templates/notifications/booking_cancelled.jinja"),
    ),
    (
        "booking_reminder",
        include_str!("../../../templates/notifications/booking_reminder.jinja"),
    ),
];

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("Template '{0}' not found")]
    NotFound(String),

    #[error("Failed to render template: {0}")]
    RenderError(String),
}

fn init_environment() -> Environment<'static> {
    let mut env = Environment::new();

    for (name, source) in BUILTIN_TEMPLATES {
        if let Err(e) = env.add_template(name, source) {
            tracing::error!("Built-in template {} is invalid: {}", name, e);
        }
    }

    let dir = Path::new(TEMPLATE_DIR);
    if dir.is_dir() {
        load_overrides(&mut env, dir);
    }

    env
}

/// Load `<name>.jinja` files, replacing built-ins with the same name
fn load_overrides(env: &mut Environment<'static>, dir: &Path) {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };

    for path in entries.flatten().map(|entry| entry.path()) {
        if !path.extension().is_some_and(|ext| ext == "jinja") {
            continue;
        }

        let Some(name) = path.file_stem().map(|s| s.to_string_lossy().to_string()) else {
            continue;
        };

        match std::fs::read_to_string(&path) {
            Ok(content) => {
                // Templates live for the whole process
                let static_name: &'static str = Box::leak(name.clone().into_boxed_str());
                let static_content: &'static str = Box::leak(content.into_boxed_str());
                if let Err(e) = env.add_template(static_name, static_content) {
                    tracing::warn!("Failed to load template {}: {}", name, e);
                } else {
                    tracing::debug!("Loaded template override: {}", name);
                }
            }
            Err(e) => tracing::warn!("Failed to read template {}: {}", path.display(), e),
        }
    }
}

fn get_environment() -> &'static Environment<'static> {
    TEMPLATE_ENV.get_or_init(init_environment)
}

/// Render a named notification template with a serializable context.
///
/// # Example
/// ```ignore
/// let body = render_template(
///     "booking_confirmed",
///     minijinja::context! { reference_number => "BK-2026-0000042" },
/// )?;
/// ```
pub fn render_template<S: Serialize>(name: &str, ctx: S) -> Result<String, TemplateError> {
    let template = get_environment()
        .get_template(name)
        .map_err(|_| TemplateError::NotFound(name.to_string()))?;

    template
        .render(ctx)
        .map(|body| body.trim().to_string())
        .map_err(|e| TemplateError::RenderError(e.to_string()))
}

pub fn template_exists(name: &str) -> bool {
    get_environment().get_template(name).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use minijinja::context;

    #[test]
    fn test_builtins_are_registered() {
        for (name, _) in BUILTIN_TEMPLATES {
            assert!(template_exists(name), "missing template {}", name);
        }
        assert!(!template_exists("definitely_not_a_real_template"));
    }

    #[test]
    fn test_render_confirmed() {
        let body = render_template(
            "booking_confirmed",
            context! {
                reference_number => "BK-2026-0000042",
                service_name => "Deep cleaning",
                scheduled_at => "2026-03-14 09:00",
            },
        )
        .unwrap();

        assert!(body.contains("BK-2026-0000042"));
        assert!(body.contains("Deep cleaning"));
    }

    #[test]
    fn test_render_cancelled_omits_zero_fee() {
        let body = render_template(
            "booking_cancelled",
            context! { reference_number => "BK-2026-0000001" },
        )
        .unwrap();
        assert!(!body.contains("fee"));

        let body = render_template(
            "booking_cancelled",
            context! { reference_number => "BK-2026-0000001", fee => "$20.00", refund => "$30.00" },
        )
        .unwrap();
        assert!(body.contains("Cancellation fee: $20.00"));
        assert!(body.contains("Refund: $30.00"));
    }

    #[test]
    fn test_render_assigned_without_agent_name() {
        let body = render_template(
            "agent_assigned",
            context! {
                reference_number => "BK-2026-0000001",
                scheduled_at => "Sat 14 Mar 2026, 09:00",
                agent_name => None::<String>,
            },
        )
        .unwrap();
        assert!(body.starts_with("ServiceHub: a service agent has been assigned"));
        assert!(!body.contains("None"));
        assert!(!body.contains("none"));

        let body = render_template(
            "agent_assigned",
            context! {
                reference_number => "BK-2026-0000001",
                scheduled_at => "Sat 14 Mar 2026, 09:00",
                agent_name => Some("Dana Reyes"),
            },
        )
        .unwrap();
        assert!(body.starts_with("ServiceHub: Dana Reyes has been assigned"));
    }

    #[test]
    fn test_render_missing_template() {
        let result = render_template("nonexistent", context! {});
        assert!(matches!(result, Err(TemplateError::NotFound(_))));
    }
}
