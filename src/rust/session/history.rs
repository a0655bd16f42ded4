use std::collections::HashMap;

/// Download name of the exported history table.
pub const REPORT_FILE_NAME: &str = "cyberbullying_report.csv";

/// MIME type of the exported history table.
pub const REPORT_MIME_TYPE: &str = "text/csv";

const CSV_HEADER: [&str; 2] = ["Comment", "Classification"];

/// One analyzed comment and the category it was assigned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassificationRecord {
    comment: String,
    label: String,
}

impl ClassificationRecord {
    pub fn new(comment: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            comment: comment.into(),
            label: label.into(),
        }
    }

    /// The comment as the user typed it
    pub fn comment(&self) -> &str {
        &self.comment
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

/// Label counts over a history, most frequent first.
///
/// Labels with equal counts keep the order in which they first appeared.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Distribution {
    entries: Vec<(String, usize)>,
}

impl Distribution {
    fn from_records(records: &[ClassificationRecord]) -> Self {
        let mut positions: HashMap<&str, usize> = HashMap::new();
        let mut entries: Vec<(String, usize)> = Vec::new();
        for record in records {
            match positions.get(record.label()) {
                Some(&pos) => entries[pos].1 += 1,
                None => {
                    positions.insert(record.label(), entries.len());
                    entries.push((record.label().to_string(), 1));
                }
            }
        }
        // stable sort keeps first-appearance order among equal counts
        entries.sort_by(|a, b| b.1.cmp(&a.1));
        Self { entries }
    }

    pub fn get(&self, label: &str) -> usize {
        self.entries.iter()
            .find(|(l, _)| l == label)
            .map_or(0, |(_, count)| *count)
    }

    pub fn total(&self) -> usize {
        self.entries.iter().map(|(_, count)| count).sum()
    }

    pub fn entries(&self) -> &[(String, usize)] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A file ready to be handed to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub file_name: &'static str,
    pub mime_type: &'static str,
    pub bytes: Vec<u8>,
}

/// The ordered, append-only table of classifications made during one session.
#[derive(Debug, Clone, Default)]
pub struct SessionHistory {
    records: Vec<ClassificationRecord>,
}

impl SessionHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a record at the end of the history.
    pub fn append(&mut self, comment: impl Into<String>, label: impl Into<String>) -> &ClassificationRecord {
        self.records.push(ClassificationRecord::new(comment, label));
        &self.records[self.records.len() - 1]
    }

    /// All records in the order they were appended
    pub fn snapshot(&self) -> &[ClassificationRecord] {
        &self.records
    }

    pub fn distribution(&self) -> Distribution {
        Distribution::from_records(&self.records)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Serializes the history as UTF-8 CSV with a `Comment,Classification` header.
    ///
    /// Every row, including the last, ends with `\n`. Fields containing a
    /// comma, a double quote or a line break are quoted, with inner quotes
    /// doubled.
    pub fn export_csv(&self) -> Vec<u8> {
        let mut out = String::new();
        write_row(&mut out, &CSV_HEADER);
        for record in &self.records {
            write_row(&mut out, &[record.comment(), record.label()]);
        }
        out.into_bytes()
    }

    /// The CSV export packaged as `cyberbullying_report.csv`.
    pub fn export_report(&self) -> Report {
        Report {
            file_name: REPORT_FILE_NAME,
            mime_type: REPORT_MIME_TYPE,
            bytes: self.export_csv(),
        }
    }
}

fn write_row(out: &mut String, fields: &[&str]) {
    for (i, field) in fields.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        write_field(out, field);
    }
    out.push('\n');
}

fn write_field(out: &mut String, field: &str) {
    if field.contains([',', '"', '\n', '\r']) {
        out.push('"');
        out.push_str(&field.replace('"', "\"\""));
        out.push('"');
    } else {
        out.push_str(field);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Minimal reader for the dialect `export_csv` writes.
    fn parse_csv(text: &str) -> Vec<Vec<String>> {
        let mut rows = Vec::new();
        let mut row = Vec::new();
        let mut field = String::new();
        let mut quoted = false;
        let mut chars = text.chars().peekable();
        while let Some(c) = chars.next() {
            match (quoted, c) {
                (true, '"') if chars.peek() == Some(&'"') => {
                    chars.next();
                    field.push('"');
                }
                (true, '"') => quoted = false,
                (true, c) => field.push(c),
                (false, '"') => quoted = true,
                (false, ',') => row.push(std::mem::take(&mut field)),
                (false, '\n') => {
                    row.push(std::mem::take(&mut field));
                    rows.push(std::mem::take(&mut row));
                }
                (false, c) => field.push(c),
            }
        }
        rows
    }

    fn sample_history() -> SessionHistory {
        let mut history = SessionHistory::new();
        history.append("Have a nice day", "NOT_CYBERBULLYING");
        history.append("you people, always the same", "ETHNICITY");
        history.append("she said \"go away\"", "GENDER");
        history.append("line one\nline two", "NOT_CYBERBULLYING");
        history.append("Have a nice day", "NOT_CYBERBULLYING");
        history
    }

    #[test]
    fn test_append_keeps_call_order() {
        let mut history = SessionHistory::new();
        assert!(history.is_empty());
        for i in 0..7 {
            let record = history.append(format!("comment {}", i), "AGE");
            assert_eq!(record.comment(), format!("comment {}", i));
            assert_eq!(history.len(), i + 1);
        }
        let comments: Vec<_> = history.snapshot().iter().map(|r| r.comment().to_string()).collect();
        assert_eq!(comments, (0..7).map(|i| format!("comment {}", i)).collect::<Vec<_>>());
    }

    #[test]
    fn test_duplicates_are_kept() {
        let history = sample_history();
        assert_eq!(history.snapshot()[0], history.snapshot()[4]);
        assert_eq!(history.len(), 5);
    }

    #[test]
    fn test_distribution_counts_and_order() {
        let history = sample_history();
        let distribution = history.distribution();
        assert_eq!(
            distribution.entries(),
            &[
                ("NOT_CYBERBULLYING".to_string(), 3),
                ("ETHNICITY".to_string(), 1),
                ("GENDER".to_string(), 1),
            ]
        );
        assert_eq!(distribution.get("GENDER"), 1);
        assert_eq!(distribution.get("RELIGION"), 0);
        assert_eq!(distribution.total(), history.snapshot().len());
    }

    #[test]
    fn test_empty_history() {
        let history = SessionHistory::new();
        assert!(history.distribution().is_empty());
        assert_eq!(history.distribution().total(), 0);
        assert_eq!(history.export_csv(), b"Comment,Classification\n".to_vec());
    }

    #[test]
    fn test_csv_quotes_only_when_needed() {
        let csv = String::from_utf8(sample_history().export_csv()).unwrap();
        let expected = concat!(
            "Comment,Classification\n",
            "Have a nice day,NOT_CYBERBULLYING\n",
            "\"you people, always the same\",ETHNICITY\n",
            "\"she said \"\"go away\"\"\",GENDER\n",
            "\"line one\nline two\",NOT_CYBERBULLYING\n",
            "Have a nice day,NOT_CYBERBULLYING\n",
        );
        assert_eq!(csv, expected);
    }

    #[test]
    fn test_csv_parses_back_to_snapshot() {
        let history = sample_history();
        let text = String::from_utf8(history.export_csv()).unwrap();
        let rows = parse_csv(&text);

        assert_eq!(rows[0], vec!["Comment", "Classification"]);
        let parsed: Vec<ClassificationRecord> = rows[1..]
            .iter()
            .map(|row| ClassificationRecord::new(row[0].clone(), row[1].clone()))
            .collect();
        assert_eq!(parsed, history.snapshot());
    }

    #[test]
    fn test_report_metadata() {
        let report = sample_history().export_report();
        assert_eq!(report.file_name, "cyberbullying_report.csv");
        assert_eq!(report.mime_type, "text/csv");
        assert!(report.bytes.starts_with(b"Comment,Classification\n"));
    }

    #[test]
    fn test_unicode_survives_export() {
        let mut history = SessionHistory::new();
        history.append("¡Qué tonta eres! 😡", "GENDER");
        let text = String::from_utf8(history.export_csv()).unwrap();
        assert!(text.contains("¡Qué tonta eres! 😡,GENDER\n"));
    }
}
