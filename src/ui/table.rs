use tabled::builder::Builder;
use tabled::settings::{Padding, Style};

use crate::ui::widgets::TableSpec;

pub fn render_table(spec: &TableSpec) -> String {
    let mut builder = Builder::default();
    if !spec.headers.is_empty() {
        builder.push_record(spec.headers.iter().map(String::as_str));
    }
    for row in &spec.rows {
        builder.push_record(row.iter().map(String::as_str));
    }
    let mut table = builder.build();
    table.with(Style::blank());
    table.with(Padding::new(0, 2, 0, 0));
    table.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_headers_and_rows_as_aligned_columns() {
        let rendered = render_table(&TableSpec::new(
            vec!["#".to_owned(), "script".to_owned()],
            vec![
                vec!["1".to_owned(), "alpha.script".to_owned()],
                vec!["2".to_owned(), "beta.script".to_owned()],
            ],
        ));
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with('#'));
        assert_eq!(lines[1].find("alpha"), lines[2].find("beta"));
    }

    #[test]
    fn headerless_tables_render_rows_only() {
        let rendered = render_table(&TableSpec::new(
            Vec::new(),
            vec![vec!["scape-console stop".to_owned(), "Stop the current run".to_owned()]],
        ));
        assert_eq!(rendered.lines().count(), 1);
        assert!(rendered.contains("Stop the current run"));
    }
}
