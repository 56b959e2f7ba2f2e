use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum InterpolationError {
    #[error("Required environment variable not found: {0}")]
    RequiredVarNotFound(String),
}

pub type InterpolationResult<T> = Result<T, InterpolationError>;

static VAR_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)(?::-([^}]*))?\}").expect("Invalid regex pattern")
});

/// Expands `${VAR}` and `${VAR:-default}` in a single pass. Substituted
/// values and defaults are inserted verbatim.
pub fn interpolate(input: &str) -> InterpolationResult<String> {
    interpolate_with(input, &|name| std::env::var(name).ok())
}

fn interpolate_with(
    input: &str, lookup: &dyn Fn(&str) -> Option<String>,
) -> InterpolationResult<String> {
    let mut result = String::with_capacity(input.len());
    let mut last_end = 0;

    for cap in VAR_PATTERN.captures_iter(input) {
        let (Some(full_match), Some(var_name)) = (cap.get(0), cap.get(1)) else {
            continue;
        };

        let replacement = match lookup(var_name.as_str()) {
            Some(value) => value,
            None => match cap.get(2) {
                Some(default) => default.as_str().to_string(),
                None => {
                    return Err(InterpolationError::RequiredVarNotFound(
                        var_name.as_str().to_string(),
                    ));
                }
            },
        };

        result.push_str(&input[last_end..full_match.start()]);
        result.push_str(&replacement);
        last_end = full_match.end();
    }

    result.push_str(&input[last_end..]);
    Ok(result)
}

/// Interpolates every string in a parsed TOML document in place
pub fn interpolate_toml(value: &mut toml::Value) -> InterpolationResult<()> {
    match value {
        toml::Value::String(s) => {
            *s = interpolate(s)?;
        }
        toml::Value::Array(arr) => {
            for item in arr {
                interpolate_toml(item)?;
            }
        }
        toml::Value::Table(table) => {
            for (_, v) in table.iter_mut() {
                interpolate_toml(v)?;
            }
        }
        _ => {}
    }
    Ok(())
}

pub fn has_variables(input: &str) -> bool {
    VAR_PATTERN.is_match(input)
}
