// src/common/db_utils.rs

use crate::common::error::AppError;

// ---
// Helper ILIKE: busca "contém", sem diferenciar maiúsculas
// ---
/// Monta o padrão `%termo%` escapando os curingas do LIKE.
/// Usar sempre com `ESCAPE '\'` na query.
pub(crate) fn contains_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for ch in term.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped.push('%');
    escaped
}

// ---
// Helper de erros de constraint
// ---
/// Converte violações de UNIQUE/FK em erros amigáveis; o resto vira DatabaseError.
pub(crate) fn map_constraint_error(
    e: sqlx::Error,
    on_unique: impl FnOnce() -> AppError,
    on_foreign_key: impl FnOnce() -> AppError,
) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_unique_violation() {
            return on_unique();
        }
        if db_err.is_foreign_key_violation() {
            return on_foreign_key();
        }
    }
    e.into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_terms_are_wrapped() {
        assert_eq!(contains_pattern("denver"), "%denver%");
    }

    #[test]
    fn like_wildcards_are_escaped() {
        assert_eq!(contains_pattern("50%_off\\"), "%50\\%\\_off\\\\%");
    }
}
