//! SQL fragments shared by the search queries

/// Constraint backing the one-open-loan-per-book rule
pub const OPEN_LOAN_INDEX: &str = "loans_one_open_per_book";

/// `%filter%` pattern for ILIKE with `\` as escape character
pub fn like_pattern(filter: &str) -> String {
    let mut escaped = String::with_capacity(filter.len() + 2);
    escaped.push('%');
    for c in filter.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

/// ORDER BY clause: the sort column, then the id as tiebreaker
pub fn order_by(column: &str, id_column: &str) -> String {
    format!("ORDER BY {} ASC NULLS LAST, {} ASC", column, id_column)
}

/// True when a database error is a violation of `constraint`
pub fn is_constraint_violation(err: &sqlx::Error, constraint: &str) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.constraint() == Some(constraint),
        _ => false,
    }
}
