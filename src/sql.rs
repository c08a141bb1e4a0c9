/// SQL Text Builders
///
/// Builds the INSERT and UPDATE statements behind the client's convenience
/// helpers. Values always travel as `?` bind parameters. Table names, column
/// names and the UPDATE condition are pasted into the text verbatim with no
/// quoting or escaping, so they must come from trusted, internal input.

/// Builds `INSERT INTO {table} ({c1}, {c2}) VALUES (?, ?)`.
///
/// # Examples
///
/// ```
/// let sql = quantdb::sql::insert_statement("stocks", &["code", "price"]);
/// assert_eq!(sql, "INSERT INTO stocks (code, price) VALUES (?, ?)");
/// ```
pub fn insert_statement<S: AsRef<str>>(table: &str, columns: &[S]) -> String {
    let column_list = columns
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(", ");
    let placeholders = vec!["?"; columns.len()].join(", ");
    format!("INSERT INTO {} ({}) VALUES ({})", table, column_list, placeholders)
}

/// Builds `UPDATE {table} SET {c1}=?, {c2}=? WHERE {condition}`.
///
/// # Examples
///
/// ```
/// let sql = quantdb::sql::update_statement("stocks", &["price"], "code='AAPL'");
/// assert_eq!(sql, "UPDATE stocks SET price=? WHERE code='AAPL'");
/// ```
pub fn update_statement<S: AsRef<str>>(table: &str, columns: &[S], condition: &str) -> String {
    let assignments = columns
        .iter()
        .map(|c| format!("{}=?", c.as_ref()))
        .collect::<Vec<_>>()
        .join(", ");
    format!("UPDATE {} SET {} WHERE {}", table, assignments, condition)
}
