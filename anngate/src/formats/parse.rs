//! Dataset parsers.
//!
//! Each parser turns raw upload bytes into [`NewDocument`]s. Parsing is
//! all-or-nothing: every offending record is reported, and nothing is stored
//! when any record is invalid, so re-uploading a corrected file never
//! duplicates the valid prefix of a previous attempt.

use super::Format;
use crate::store::{Annotation, NewDocument};
use serde::Deserialize;
use serde_json::Value;

/// Parse `bytes` according to `format`.
///
/// On failure returns one problem string per offending record/line, in file
/// order.
pub fn parse(format: Format, bytes: &[u8]) -> Result<Vec<NewDocument>, Vec<String>> {
    let text = match std::str::from_utf8(bytes) {
        Ok(text) => text,
        Err(_) => return Err(vec!["File must be valid UTF-8 text".to_string()]),
    };

    match format {
        Format::Plain => Ok(parse_plain(text)),
        Format::Csv => parse_csv(text),
        Format::Json => parse_json_lines(text),
        Format::Conll => parse_conll(text),
    }
}

fn parse_plain(text: &str) -> Vec<NewDocument> {
    text.lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| NewDocument {
            text: line.to_string(),
            annotations: Vec::new(),
            meta: Value::Null,
        })
        .collect()
}

fn parse_csv(text: &str) -> Result<Vec<NewDocument>, Vec<String>> {
    let mut reader = csv::Reader::from_reader(text.as_bytes());

    let headers = match reader.headers() {
        Ok(headers) => headers.clone(),
        Err(e) => return Err(vec![format!("invalid CSV header: {e}")]),
    };
    let text_idx = match headers.iter().position(|h| h == "text") {
        Some(idx) => idx,
        None => return Err(vec!["CSV file must have a `text` column".to_string()]),
    };
    let label_idx = headers.iter().position(|h| h == "label");

    let mut documents = Vec::new();
    let mut problems = Vec::new();

    for (i, record) in reader.records().enumerate() {
        // Line 1 is the header row.
        let line = i + 2;
        match record {
            Ok(record) => match record.get(text_idx).filter(|t| !t.is_empty()) {
                Some(doc_text) => {
                    let annotations = label_idx
                        .and_then(|idx| record.get(idx))
                        .filter(|label| !label.is_empty())
                        .map(|label| vec![Annotation::document_level(label)])
                        .unwrap_or_default();
                    documents.push(NewDocument {
                        text: doc_text.to_string(),
                        annotations,
                        meta: Value::Null,
                    });
                }
                None => problems.push(format!("line {line}: missing value for `text` column")),
            },
            Err(e) => problems.push(format!("line {line}: {e}")),
        }
    }

    if problems.is_empty() { Ok(documents) } else { Err(problems) }
}

#[derive(Deserialize)]
struct JsonRecord {
    text: String,
    #[serde(default)]
    labels: Vec<JsonLabel>,
    #[serde(default)]
    meta: Value,
}

/// A label entry in a JSON-lines record: either a `[start, end, "LABEL"]`
/// span triple or a bare label name.
#[derive(Deserialize)]
#[serde(untagged)]
enum JsonLabel {
    Span(usize, usize, String),
    Name(String),
}

impl From<JsonLabel> for Annotation {
    fn from(label: JsonLabel) -> Self {
        match label {
            JsonLabel::Span(start, end, name) => Annotation::span(name, start, end),
            JsonLabel::Name(name) => Annotation::document_level(name),
        }
    }
}

fn parse_json_lines(text: &str) -> Result<Vec<NewDocument>, Vec<String>> {
    let mut documents = Vec::new();
    let mut problems = Vec::new();

    for (i, line) in text.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        match serde_json::from_str::<JsonRecord>(trimmed) {
            Ok(record) => documents.push(NewDocument {
                text: record.text,
                annotations: record.labels.into_iter().map(Annotation::from).collect(),
                meta: record.meta,
            }),
            Err(e) => problems.push(format!("Invalid JSON on line {}: {e}", i + 1)),
        }
    }

    if problems.is_empty() { Ok(documents) } else { Err(problems) }
}

fn parse_conll(text: &str) -> Result<Vec<NewDocument>, Vec<String>> {
    let mut documents = Vec::new();
    let mut problems = Vec::new();
    let mut tokens: Vec<(String, String)> = Vec::new();

    for (i, line) in text.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            if let Some(doc) = flush_sentence(&mut tokens) {
                documents.push(doc);
            }
            continue;
        }
        if trimmed.starts_with("-DOCSTART-") {
            continue;
        }

        let mut columns = trimmed.split_whitespace();
        let token = columns.next();
        let tag = columns.next_back();
        match (token, tag) {
            (Some(token), Some(tag)) => tokens.push((token.to_string(), tag.to_string())),
            _ => problems.push(format!("line {}: expected `token ... tag` columns", i + 1)),
        }
    }
    if let Some(doc) = flush_sentence(&mut tokens) {
        documents.push(doc);
    }

    if problems.is_empty() { Ok(documents) } else { Err(problems) }
}

/// Join a sentence's tokens with single spaces and convert BIO tags into
/// character-offset spans over the joined text.
fn flush_sentence(tokens: &mut Vec<(String, String)>) -> Option<NewDocument> {
    if tokens.is_empty() {
        return None;
    }

    let mut text = String::new();
    let mut annotations = Vec::new();
    // (start, end, label) of the span currently being extended
    let mut open: Option<(usize, usize, String)> = None;
    let mut cursor = 0usize;

    for (i, (token, tag)) in tokens.iter().enumerate() {
        if i > 0 {
            text.push(' ');
            cursor += 1;
        }
        let start = cursor;
        text.push_str(token);
        cursor += token.chars().count();
        let end = cursor;

        if let Some(label) = tag.strip_prefix("B-") {
            if let Some((s, e, l)) = open.take() {
                annotations.push(Annotation::span(l, s, e));
            }
            open = Some((start, end, label.to_string()));
        } else if let Some(label) = tag.strip_prefix("I-") {
            match open.as_mut() {
                Some((_, e, l)) if l == label => *e = end,
                // A dangling I- tag opens a new span rather than being dropped.
                _ => {
                    if let Some((s, e, l)) = open.take() {
                        annotations.push(Annotation::span(l, s, e));
                    }
                    open = Some((start, end, label.to_string()));
                }
            }
        } else if let Some((s, e, l)) = open.take() {
            annotations.push(Annotation::span(l, s, e));
        }
    }
    if let Some((s, e, l)) = open.take() {
        annotations.push(Annotation::span(l, s, e));
    }

    tokens.clear();
    Some(NewDocument {
        text,
        annotations,
        meta: Value::Null,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn plain_one_document_per_line() {
        let docs = parse(Format::Plain, b"first line\n\nsecond line\n").unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].text, "first line");
        assert_eq!(docs[1].text, "second line");
        assert!(docs[0].annotations.is_empty());
    }

    #[test]
    fn non_utf8_rejected() {
        let problems = parse(Format::Plain, &[0xff, 0xfe, 0x00]).unwrap_err();
        assert_eq!(problems, vec!["File must be valid UTF-8 text".to_string()]);
    }

    #[test]
    fn csv_text_and_label_columns() {
        let input = "text,label\nterrible movie,negative\ngreat movie,positive\n";
        let docs = parse(Format::Csv, input.as_bytes()).unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].text, "terrible movie");
        assert_eq!(docs[0].annotations, vec![Annotation::document_level("negative")]);
    }

    #[test]
    fn csv_without_text_column_rejected() {
        let problems = parse(Format::Csv, b"body,label\nhello,x\n").unwrap_err();
        assert_eq!(problems, vec!["CSV file must have a `text` column".to_string()]);
    }

    #[test]
    fn csv_reports_each_bad_row() {
        let input = "text,label\n,negative\nok row,positive\n,also-empty\n";
        let problems = parse(Format::Csv, input.as_bytes()).unwrap_err();
        assert_eq!(
            problems,
            vec![
                "line 2: missing value for `text` column".to_string(),
                "line 4: missing value for `text` column".to_string(),
            ]
        );
    }

    #[test]
    fn json_lines_with_span_and_name_labels() {
        let input = concat!(
            r#"{"text": "EU rejects German call", "labels": [[0, 2, "ORG"], [11, 17, "MISC"]]}"#,
            "\n",
            r#"{"text": "great movie", "labels": ["positive"], "meta": {"source": "imdb"}}"#,
            "\n",
        );
        let docs = parse(Format::Json, input.as_bytes()).unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].annotations[0], Annotation::span("ORG", 0, 2));
        assert_eq!(docs[1].annotations[0], Annotation::document_level("positive"));
        assert_eq!(docs[1].meta, json!({"source": "imdb"}));
    }

    #[test]
    fn json_lines_reports_line_numbers() {
        let input = "{\"text\": \"ok\"}\nnot json\n{\"missing\": true}\n";
        let problems = parse(Format::Json, input.as_bytes()).unwrap_err();
        assert_eq!(problems.len(), 2);
        assert!(problems[0].starts_with("Invalid JSON on line 2:"));
        assert!(problems[1].starts_with("Invalid JSON on line 3:"));
    }

    #[test]
    fn conll_bio_spans() {
        let input = "\
-DOCSTART- -X- O O

EU NNP B-ORG
rejects VBZ O
German JJ B-MISC
call NN O

Peter NNP B-PER
Blackburn NNP I-PER
";
        let docs = parse(Format::Conll, input.as_bytes()).unwrap();
        assert_eq!(docs.len(), 2);

        assert_eq!(docs[0].text, "EU rejects German call");
        assert_eq!(
            docs[0].annotations,
            vec![Annotation::span("ORG", 0, 2), Annotation::span("MISC", 11, 17)]
        );

        assert_eq!(docs[1].text, "Peter Blackburn");
        assert_eq!(docs[1].annotations, vec![Annotation::span("PER", 0, 15)]);
    }

    #[test]
    fn conll_single_column_line_is_a_problem() {
        let problems = parse(Format::Conll, b"EU B-ORG\nbroken\n").unwrap_err();
        assert_eq!(problems, vec!["line 2: expected `token ... tag` columns".to_string()]);
    }
}
