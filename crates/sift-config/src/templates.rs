//! Configuration templates for `sift init`.
//!
//! Templates are kept as valid TOML files and handed out commented out, so a fresh
//! `.sift.toml` changes nothing until the user uncomments a setting.

/// Per-deployment template (valid TOML).
const LOCAL_TEMPLATE: &str = include_str!("../templates/config.toml");

/// Global template (valid TOML).
const GLOBAL_TEMPLATE: &str = include_str!("../templates/config-global.toml");

/// Returns the per-deployment template, commented out.
pub fn local_template() -> String {
    comment_template(LOCAL_TEMPLATE)
}

/// Returns the global template, commented out.
pub fn global_template() -> String {
    comment_template(GLOBAL_TEMPLATE)
}

/// Prefixes every setting line with `# `, keeping comments and blank lines as they are.
fn comment_template(template: &str) -> String {
    template
        .lines()
        .map(|line| {
            if line.is_empty() || line.starts_with('#') {
                format!("{line}\n")
            } else {
                format!("# {line}\n")
            }
        })
        .collect()
}
