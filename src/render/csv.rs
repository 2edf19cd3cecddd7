use crate::render::rows::{Row, HEADER};

/// Header line followed by one record per row, RFC 4180 quoting.
pub fn render_csv(rows: &[Row]) -> String {
    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(csv_record(HEADER));
    for row in rows {
        lines.push(csv_record(row.cells()));
    }
    lines.join("\n")
}

fn csv_record(cells: [&str; 4]) -> String {
    cells.iter().map(|c| escape_field(c)).collect::<Vec<_>>().join(",")
}

fn escape_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hardware::fixtures;
    use crate::render::rows::build_rows;
    use crate::render::table::render_table;

    /// Minimal reader for records without embedded newlines.
    fn parse_record(line: &str) -> Vec<String> {
        let mut fields = Vec::new();
        let mut field = String::new();
        let mut quoted = false;
        let mut chars = line.chars().peekable();
        while let Some(c) = chars.next() {
            match c {
                '"' if quoted && chars.peek() == Some(&'"') => {
                    field.push('"');
                    chars.next();
                }
                '"' => quoted = !quoted,
                ',' if !quoted => fields.push(std::mem::take(&mut field)),
                _ => field.push(c),
            }
        }
        fields.push(field);
        fields
    }

    #[test]
    fn test_escape_field() {
        assert_eq!(escape_field("plain"), "plain");
        assert_eq!(escape_field("a,b"), "\"a,b\"");
        assert_eq!(escape_field("say \"hi\""), "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn test_header_first() {
        let csv = render_csv(&[]);
        assert_eq!(csv, "TYPE,ID,DESCRIPTION,VALUE");
    }

    #[test]
    fn test_csv_matches_table_rows() {
        let rows = build_rows(&fixtures::complete_snapshot());
        let csv = render_csv(&rows);
        let table = render_table(&rows);

        let records: Vec<Vec<String>> = csv.lines().skip(1).map(parse_record).collect();
        // table: 3 header lines + rows + closing separator
        assert_eq!(records.len(), table.lines().count() - 4);
        assert_eq!(records.len(), rows.len());

        for (record, row) in records.iter().zip(&rows) {
            assert_eq!(record.len(), 4);
            assert_eq!(record[0], row.kind);
            assert_eq!(record[1], row.id);
            assert_eq!(record[2], row.description);
            assert_eq!(record[3], row.value);
        }
    }

    #[test]
    fn test_summary_with_commas_is_quoted() {
        let rows = build_rows(&fixtures::complete_snapshot());
        let csv = render_csv(&rows);
        assert!(csv
            .lines()
            .any(|l| l == "MEMORY,,INFO,\"memory (16GB physical, 15GB usable)\""));
    }
}
