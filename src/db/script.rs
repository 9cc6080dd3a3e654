//! Splits editor text into individual SQL statements.
//!
//! Uses the sqlparser tokenizer to find the semicolons that end statements, so
//! those inside string literals and comments are skipped, then slices the
//! original text at them.

use sqlparser::dialect::SQLiteDialect;
use sqlparser::tokenizer::{Location, Token, TokenWithLocation, Tokenizer};
use tracing::debug;

/// Splits a script into statements, dropping empty and comment-only ones.
///
/// Statements are slices of the original text, so literals reach the engine
/// exactly as typed. If the text cannot be tokenized it is returned whole, so
/// the engine gets to report the problem in its own words.
pub fn split_statements(sql: &str) -> Vec<String> {
    let dialect = SQLiteDialect {};
    let tokens = match Tokenizer::new(&dialect, sql).tokenize_with_location() {
        Ok(tokens) => tokens,
        Err(e) => {
            debug!("Tokenizer rejected script, executing as one statement: {}", e);
            return whole(sql);
        }
    };

    let lines = line_starts(sql);
    let mut statements = Vec::new();
    let mut start = 0;
    let mut has_content = false;

    for TokenWithLocation { token, location } in tokens {
        match token {
            Token::SemiColon => {
                let Some(end) = semicolon_offset(sql, &lines, &location) else {
                    debug!("Could not place semicolon at {:?}, executing as one statement", location);
                    return whole(sql);
                };
                if has_content {
                    statements.push(sql[start..end].trim().to_string());
                }
                start = end + 1;
                has_content = false;
            }
            Token::EOF | Token::Whitespace(_) => {}
            _ => has_content = true,
        }
    }

    if has_content {
        statements.push(sql[start..].trim().to_string());
    }

    statements
}

fn whole(sql: &str) -> Vec<String> {
    if sql.trim().is_empty() {
        Vec::new()
    } else {
        vec![sql.trim().to_string()]
    }
}

/// Byte offset of the first character of each line.
fn line_starts(sql: &str) -> Vec<usize> {
    std::iter::once(0)
        .chain(sql.match_indices('\n').map(|(i, _)| i + 1))
        .collect()
}

/// Converts a one-based line/column (counted in characters) to the byte
/// offset of the `;` it points at.
fn semicolon_offset(sql: &str, lines: &[usize], location: &Location) -> Option<usize> {
    let line_start = *lines.get(usize::try_from(location.line).ok()?.checked_sub(1)?)?;
    let column = usize::try_from(location.column).ok()?.checked_sub(1)?;
    let offset = sql[line_start..]
        .char_indices()
        .nth(column)
        .map(|(i, _)| line_start + i)?;

    sql[offset..].starts_with(';').then_some(offset)
}
