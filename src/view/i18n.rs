//! User-facing strings in both supported locales.

use crate::config::Locale;

/// Shown in place of the grid before any rows exist.
pub fn empty_state(locale: Locale) -> &'static str {
    match locale {
        Locale::Ru => "Выполните запрос, чтобы увидеть результаты",
        Locale::En => "Run a query to see results",
    }
}

/// Shown while the remote query is in flight.
pub fn loading(locale: Locale) -> &'static str {
    match locale {
        Locale::Ru => "Загрузка данных из Cube.js...",
        Locale::En => "Loading data from Cube.js...",
    }
}

/// Local execution failure with an engine message.
pub fn query_error(locale: Locale, message: &str) -> String {
    match locale {
        Locale::Ru => format!("Произошла ошибка: {}", message),
        Locale::En => format!("Error: {}", message),
    }
}

/// Local execution failure without any message.
pub fn unknown_error(locale: Locale) -> &'static str {
    match locale {
        Locale::Ru => "Произошла неизвестная ошибка",
        Locale::En => "An unknown error occurred",
    }
}

/// Error reported by the remote analytics client.
pub fn remote_error(locale: Locale, message: &str) -> String {
    match locale {
        Locale::Ru => format!("Ошибка Cube.js: {}", message),
        Locale::En => format!("Cube.js error: {}", message),
    }
}

/// Label for rows whose employee is missing.
pub fn unknown_employee(locale: Locale) -> &'static str {
    match locale {
        Locale::Ru => "Неизвестный сотрудник",
        Locale::En => "Unknown employee",
    }
}

/// Status line after a local query.
pub fn local_summary(locale: Locale, rows: usize, millis: u128) -> String {
    match locale {
        Locale::Ru => format!("Строк: {} ({} мс)", rows, millis),
        Locale::En => format!("{} rows ({} ms)", rows, millis),
    }
}

/// Status line while the remote report is shown.
pub fn remote_summary(locale: Locale, rows: usize) -> String {
    match locale {
        Locale::Ru => format!("Строк из Cube.js: {}", rows),
        Locale::En => format!("{} rows from Cube.js", rows),
    }
}
