//! Export painters.
//!
//! Renders a project's documents for download. The `json` painter prints raw
//! annotation records, while `json1` resolves annotations into
//! `[[start, end, "LABEL"], ...]` span triples; both emit JSON-lines. The
//! `csv` painter emits one row per (document, annotation) pair.

use super::ExportFormat;
use crate::store::Document;
use serde_json::{Value, json};

/// Render `docs` with the selected painter, returning the body and its
/// content type.
pub fn render(docs: &[Document], format: ExportFormat) -> anyhow::Result<(Vec<u8>, &'static str)> {
    match format {
        ExportFormat::Csv => render_csv(docs),
        ExportFormat::Json => render_json_lines(docs, paint_annotations),
        ExportFormat::Json1 => render_json_lines(docs, paint_labels),
    }
}

fn paint_annotations(doc: &Document) -> Value {
    json!({
        "id": doc.id,
        "text": doc.text,
        "annotations": doc.annotations,
        "meta": doc.meta,
    })
}

fn paint_labels(doc: &Document) -> Value {
    let labels: Vec<Value> = doc
        .annotations
        .iter()
        .map(|a| match (a.start_offset, a.end_offset) {
            (Some(start), Some(end)) => json!([start, end, a.label]),
            _ => json!(a.label),
        })
        .collect();
    json!({
        "id": doc.id,
        "text": doc.text,
        "labels": labels,
        "meta": doc.meta,
    })
}

fn render_json_lines(docs: &[Document], paint: fn(&Document) -> Value) -> anyhow::Result<(Vec<u8>, &'static str)> {
    let mut out = Vec::new();
    for doc in docs {
        serde_json::to_writer(&mut out, &paint(doc))?;
        out.push(b'\n');
    }
    Ok((out, "application/x-ndjson"))
}

fn render_csv(docs: &[Document]) -> anyhow::Result<(Vec<u8>, &'static str)> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(["id", "text", "label", "start_offset", "end_offset", "user"])?;

    for doc in docs {
        let id = doc.id.to_string();
        if doc.annotations.is_empty() {
            writer.write_record([id.as_str(), doc.text.as_str(), "", "", "", ""])?;
            continue;
        }
        for annotation in &doc.annotations {
            let start = annotation.start_offset.map(|o| o.to_string()).unwrap_or_default();
            let end = annotation.end_offset.map(|o| o.to_string()).unwrap_or_default();
            writer.write_record([
                id.as_str(),
                doc.text.as_str(),
                annotation.label.as_str(),
                start.as_str(),
                end.as_str(),
                annotation.user.as_deref().unwrap_or(""),
            ])?;
        }
    }

    let out = writer.into_inner().map_err(|e| anyhow::anyhow!("failed to flush CSV writer: {e}"))?;
    Ok((out, "text/csv"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Annotation;
    use chrono::Utc;
    use uuid::Uuid;

    fn doc(text: &str, annotations: Vec<Annotation>) -> Document {
        Document {
            id: Uuid::new_v4(),
            text: text.to_string(),
            annotations,
            meta: Value::Null,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn json_paints_raw_annotations() {
        let docs = vec![doc("EU rejects German call", vec![Annotation::span("ORG", 0, 2)])];
        let (body, content_type) = render(&docs, ExportFormat::Json).unwrap();
        assert_eq!(content_type, "application/x-ndjson");

        let line: Value = serde_json::from_slice(body.split(|&b| b == b'\n').next().unwrap()).unwrap();
        assert_eq!(line["text"], "EU rejects German call");
        assert_eq!(line["annotations"][0]["label"], "ORG");
        assert_eq!(line["annotations"][0]["start_offset"], 0);
        assert!(line.get("labels").is_none());
    }

    #[test]
    fn json1_paints_label_triples() {
        let docs = vec![doc(
            "EU rejects German call",
            vec![Annotation::span("ORG", 0, 2), Annotation::document_level("news")],
        )];
        let (body, _) = render(&docs, ExportFormat::Json1).unwrap();

        let line: Value = serde_json::from_slice(body.split(|&b| b == b'\n').next().unwrap()).unwrap();
        assert_eq!(line["labels"][0], json!([0, 2, "ORG"]));
        assert_eq!(line["labels"][1], json!("news"));
        assert!(line.get("annotations").is_none());
    }

    #[test]
    fn csv_one_row_per_annotation() {
        let docs = vec![
            doc("great movie", vec![Annotation::document_level("positive")]),
            doc("no labels yet", vec![]),
        ];
        let (body, content_type) = render(&docs, ExportFormat::Csv).unwrap();
        assert_eq!(content_type, "text/csv");

        let text = String::from_utf8(body).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "id,text,label,start_offset,end_offset,user");
        assert!(lines[1].contains("great movie"));
        assert!(lines[1].contains("positive"));
        assert!(lines[2].contains("no labels yet"));
    }

    #[test]
    fn empty_project_renders_empty_jsonl() {
        let (body, _) = render(&[], ExportFormat::Json).unwrap();
        assert!(body.is_empty());
    }
}
