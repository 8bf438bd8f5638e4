//! Line-oriented parser for fixed-layout product reports
//!
//! A report carries a `Razón Social: <name>` metadata line somewhere in its
//! text and a table introduced by a header line naming the four columns
//! `Código`, `Descripción`, `Cantidad` and `Descuento`. Rows follow the
//! header until a section terminator. Lines that do not fit the row layout
//! are ignored, since reports interleave narrative text with the table.

use crate::record::Record;
use regex::Regex;
use std::sync::LazyLock;

/// Marker phrase of the metadata line
const ENTITY_MARKER: &str = "Razón Social";

/// Tokens that must all appear on the table header line
const HEADER_TOKENS: [&str; 4] = ["Código", "Descripción", "Cantidad", "Descuento"];

static ENTITY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Razón Social\s*:\s*(.+)").expect("valid regex"));

static SEPARATOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-{5,}").expect("valid regex"));

static TERMINATOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[*=-]{3,}").expect("valid regex"));

// ASCII digits only: a code is exactly ten of them.
static ROW_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*([0-9]{10})\s+(.+?)\s+([0-9]+)\s+([0-9.]+)\s*$").expect("valid regex")
});

/// Parse one report into records
///
/// `source_id` is attached to every record as its originating document.
/// Never fails: a report without a table yields an empty vector.
pub fn parse_report(text: &str, source_id: &str) -> Vec<Record> {
    let lines: Vec<&str> = text.split('\n').collect();
    let entity_name = find_entity_name(&lines);

    let mut records = Vec::new();
    let mut in_table = false;
    let mut discarded = 0usize;

    for line in &lines {
        if is_header(line) {
            in_table = true;
            continue;
        }

        if !in_table || SEPARATOR_RE.is_match(line) || line.trim().is_empty() {
            continue;
        }

        if is_terminator(line) {
            break;
        }

        match parse_row(line) {
            Some((code, description, quantity, discount)) => records.push(Record {
                source_document: source_id.to_string(),
                entity_name: entity_name.clone(),
                code,
                description,
                quantity,
                discount,
            }),
            None => discarded += 1,
        }
    }

    tracing::debug!(
        document = source_id,
        records = records.len(),
        discarded,
        "parsed report"
    );

    records
}

/// The report's `Razón Social` value, empty if the report has none
pub fn entity_name(text: &str) -> String {
    let lines: Vec<&str> = text.split('\n').collect();
    find_entity_name(&lines)
}

/// First `Razón Social: ...` value in the report, trimmed
fn find_entity_name(lines: &[&str]) -> String {
    lines
        .iter()
        .filter(|line| line.contains(ENTITY_MARKER))
        .find_map(|line| ENTITY_RE.captures(line))
        .map(|caps| caps[1].trim().to_string())
        .unwrap_or_default()
}

/// A header line names all four table columns, in any order
fn is_header(line: &str) -> bool {
    HEADER_TOKENS.iter().all(|token| line.contains(token))
}

/// Lines that close the table section
fn is_terminator(line: &str) -> bool {
    TERMINATOR_RE.is_match(line) || line.contains("* ")
}

/// Split a row line into (code, description, quantity, discount)
fn parse_row(line: &str) -> Option<(String, String, String, String)> {
    let caps = ROW_RE.captures(line)?;
    Some((
        caps[1].trim().to_string(),
        caps[2].trim().to_string(),
        caps[3].trim().to_string(),
        caps[4].trim().to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    const REPORT: &str = "\
REPORTE DE CONDICIONES COMERCIALES
Razón Social: Acme Corp
Fecha: 2024-01-31

Código      Descripción                 Cantidad   Descuento
----------------------------------------------------------
1234567890  Widget A Plus               42         12.50
0987654321  Gadget  B                   7          5

*** FIN ***
1111111111  After terminator            1          1
";

    #[test]
    fn test_parse_simple_report() {
        let records = parse_report(REPORT, "acme.txt");

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].source_document, "acme.txt");
        assert_eq!(records[0].code, "1234567890");
        assert_eq!(records[0].description, "Widget A Plus");
        assert_eq!(records[0].quantity, "42");
        assert_eq!(records[0].discount, "12.50");
        assert_eq!(records[1].description, "Gadget  B");
        assert_eq!(records[1].discount, "5");
    }

    #[test]
    fn test_entity_name_propagates() {
        let records = parse_report(REPORT, "acme.txt");
        assert!(records.iter().all(|r| r.entity_name == "Acme Corp"));
    }

    #[test]
    fn test_first_entity_name_wins() {
        let text = "Razón Social :   First SA  \nRazón Social: Second SA\n\
                    Código Descripción Cantidad Descuento\n1234567890 Item 1 2\n";
        let records = parse_report(text, "x.txt");
        assert_eq!(records[0].entity_name, "First SA");
    }

    #[test]
    fn test_missing_entity_name_is_empty() {
        let text = "Código Descripción Cantidad Descuento\n1234567890 Item 1 2\n";
        let records = parse_report(text, "x.txt");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].entity_name, "");
    }

    #[test]
    fn test_entity_marker_without_colon_is_skipped() {
        let text = "Razón Social Acme\nRazón Social: Beta\n\
                    Código Descripción Cantidad Descuento\n1234567890 Item 1 2\n";
        let records = parse_report(text, "x.txt");
        assert_eq!(records[0].entity_name, "Beta");
    }

    #[test]
    fn test_no_header_yields_nothing() {
        let text = "Razón Social: Acme\n1234567890  Widget  42  12.50\n";
        assert!(parse_report(text, "x.txt").is_empty());
    }

    #[test]
    fn test_rows_before_header_are_ignored() {
        let text = "1111111111  Early  1  1\n\
                    Código Descripción Cantidad Descuento\n\
                    2222222222  Late  2  2\n";
        let records = parse_report(text, "x.txt");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].code, "2222222222");
    }

    #[test]
    fn test_wrong_code_length_is_not_captured() {
        let text = "Código Descripción Cantidad Descuento\n\
                    123456789  Nine digits  1  1\n\
                    12345678901  Eleven digits  1  1\n\
                    1234567890  Ten digits  1  1\n";
        let records = parse_report(text, "x.txt");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].description, "Ten digits");
    }

    #[test]
    fn test_blank_and_narrative_lines_do_not_end_table() {
        let text = "Código Descripción Cantidad Descuento\n\
                    1234567890  First  1  1\n\
                    \n   \t\n\
                    Observaciones generales del periodo\n\
                    2234567890  Second  2  2.5\n";
        let records = parse_report(text, "x.txt");
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn test_short_dash_line_terminates() {
        let text = "Código Descripción Cantidad Descuento\n\
                    -----\n\
                    1234567890  First  1  1\n\
                    ---\n\
                    2234567890  Second  2  2\n";
        let records = parse_report(text, "x.txt");
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_asterisk_space_terminates() {
        let text = "Código Descripción Cantidad Descuento\n\
                    1234567890  First  1  1\n\
                    Nota: * ver anexo\n\
                    2234567890  Second  2  2\n";
        let records = parse_report(text, "x.txt");
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_crlf_line_endings() {
        let text = "Razón Social: Acme\r\nCódigo Descripción Cantidad Descuento\r\n\
                    1234567890  Widget  3  1.5\r\n";
        let records = parse_report(text, "x.txt");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].entity_name, "Acme");
        assert_eq!(records[0].discount, "1.5");
    }

    #[test]
    fn test_header_line_is_not_a_record() {
        let text = "1234567890 Código Descripción Cantidad Descuento 1 1\n";
        assert!(parse_report(text, "x.txt").is_empty());
    }

    #[test]
    fn test_second_header_is_skipped_not_parsed() {
        let text = "Código Descripción Cantidad Descuento\n\
                    1234567890  First  1  1\n\
                    1234567890 Código Descripción Cantidad Descuento 2 2\n\
                    2234567890  Second  2  2\n";
        let records = parse_report(text, "x.txt");
        let descriptions: Vec<&str> = records.iter().map(|r| r.description.as_str()).collect();
        assert_eq!(descriptions, vec!["First", "Second"]);
    }

    #[test]
    fn test_indented_rule_does_not_terminate() {
        let text = "Código Descripción Cantidad Descuento\n\
                    1234567890  First  1  1\n\
                    \x20  ===\n\
                    2234567890  Second  2  2\n";
        let records = parse_report(text, "x.txt");
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn test_entity_name_without_table() {
        let text = "Razón Social:  Acme Corp \nSin tabla\n";
        assert!(parse_report(text, "x.txt").is_empty());
        assert_eq!(entity_name(text), "Acme Corp");
        assert_eq!(entity_name("no metadata"), "");
    }

    #[test]
    fn test_parse_is_idempotent() {
        assert_eq!(parse_report(REPORT, "a"), parse_report(REPORT, "a"));
    }
}
