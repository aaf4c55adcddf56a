use serde::Serialize;

pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print a two-column report: a left-aligned name column, then the value.
pub fn print_pairs(header: (&str, &str), rows: &[(&str, String)]) {
    let width = rows
        .iter()
        .map(|(name, _)| name.len())
        .chain([header.0.len()])
        .max()
        .unwrap_or(0);
    println!("{:width$}  {}", header.0, header.1);
    println!("{}  {}", "-".repeat(width), "-".repeat(header.1.len()));
    for (name, value) in rows {
        println!("{name:width$}  {value}");
    }
}
