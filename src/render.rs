//! Literal template substitution for generated artifacts
//!
//! Generated workspace files and the shell alias block carry `{{TOKEN}}`
//! placeholders that are substituted with family-specific strings (the
//! update/search/install/cleanup command lines). Substitution is exact text
//! replacement; values are never evaluated by a shell, which closes the
//! injection hole a naive `eval`-style rendering would open.

use crate::error::{NetrigError, Result};

/// Substitute every `{{KEY}}` placeholder in `template` with its value.
///
/// # Errors
///
/// `Validation` if a placeholder remains after substitution: a template
/// with an unbound token must never reach the filesystem.
pub fn render(template: &str, substitutions: &[(&str, &str)]) -> Result<String> {
    let mut out = template.to_string();
    for (key, value) in substitutions {
        let token = format!("{{{{{}}}}}", key);
        out = out.replace(&token, value);
    }

    if let Some(start) = out.find("{{") {
        let tail: String = out[start..].chars().take(32).collect();
        return Err(NetrigError::validation(format!(
            "unbound template placeholder near: {}",
            tail
        )));
    }

    Ok(out)
}
