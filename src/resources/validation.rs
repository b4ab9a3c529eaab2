//! Required-field checks shared by the resource handlers.

use crate::http::ApiError;

/// Minimum length, in characters, of every required field.
pub const MIN_LENGTH: usize = 3;

/// Check that every field is present, non-empty and at least [`MIN_LENGTH`] long.
///
/// The message names all checked fields, e.g. `"name e email são obrigatórios"`.
pub fn require(fields: &[(&str, Option<&str>)]) -> Result<(), ApiError> {
    let names = join_names(fields.iter().map(|(name, _)| *name));

    if fields
        .iter()
        .any(|(_, value)| value.map_or(true, str::is_empty))
    {
        return Err(ApiError::Validation(format!("{names} são obrigatórios")));
    }

    if fields
        .iter()
        .any(|(_, value)| value.map_or(0, |v| v.chars().count()) < MIN_LENGTH)
    {
        return Err(ApiError::Validation(format!(
            "{names} devem ter pelo menos {MIN_LENGTH} caracteres"
        )));
    }

    Ok(())
}

/// `a`, `a e b`, `a, b e c`.
fn join_names<'a>(names: impl Iterator<Item = &'a str>) -> String {
    let names: Vec<_> = names.collect();
    match names.split_last() {
        None => String::new(),
        Some((last, [])) => last.to_string(),
        Some((last, rest)) => format!("{} e {}", rest.join(", "), last),
    }
}
