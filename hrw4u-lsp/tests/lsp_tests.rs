//! Editor behaviour tests
//!
//! These drive [`LanguageService`] through LSP method names and JSON params,
//! the way a transport would.

use hrw4u_lsp::LanguageService;
use lsp_types::notification::{DidChangeTextDocument, DidOpenTextDocument, Notification};
use lsp_types::request::{Completion, HoverRequest, Request};
use lsp_types::{CompletionItemKind, DiagnosticSeverity, Position};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

const URI: &str = "file:///etc/trafficserver/rules.hrw4u";

const RULES: &str = r#"VARS {
    retried: bool;
}

REMAP {
    if inbound.url.path ~ /^\/api/ {
        inbound.req.X-Api = "1";
    }
}

SEND_RESPONSE {
    if inbound.status > 399 {
        inbound.resp.X-Error = "yes";
    }
}
"#;

fn service_with(text: &str) -> LanguageService {
    let mut service = LanguageService::default();
    service
        .handle_notification(
            DidOpenTextDocument::METHOD,
            json!({
                "textDocument": { "uri": URI, "languageId": "hrw4u", "version": 1, "text": text }
            }),
        )
        .unwrap();
    service
}

fn complete(service: &LanguageService, line: u32, character: u32) -> Vec<Value> {
    let result = service
        .handle_request(
            Completion::METHOD,
            json!({
                "textDocument": { "uri": URI },
                "position": { "line": line, "character": character },
            }),
        )
        .unwrap();
    result.as_array().cloned().unwrap_or_default()
}

fn label_set(items: &[Value]) -> Vec<String> {
    items
        .iter()
        .filter_map(|i| i["label"].as_str().map(str::to_string))
        .collect()
}

// ============================================================
// Completion
// ============================================================

#[test]
fn completion_follows_enclosing_section() {
    let service = service_with(RULES);

    // blank column at the start of the REMAP body line
    let remap = label_set(&complete(&service, 6, 8));
    assert!(remap.contains(&"inbound.req.".to_string()));
    assert!(remap.contains(&"retried".to_string()));
    assert!(!remap.contains(&"inbound.resp.".to_string()));

    let send = label_set(&complete(&service, 12, 8));
    assert!(send.contains(&"inbound.resp.".to_string()));
    assert!(!send.contains(&"outbound.req.".to_string()));
}

#[test]
fn completion_between_sections_offers_section_names() {
    let service = service_with(RULES);
    let items = complete(&service, 3, 0);
    let labels = label_set(&items);
    assert!(labels.contains(&"REMAP".to_string()));
    assert!(labels.contains(&"TXN_CLOSE".to_string()));
    assert!(!labels.contains(&"inbound.req.".to_string()));

    let kind = serde_json::to_value(CompletionItemKind::MODULE).unwrap();
    assert!(items.iter().all(|i| i["kind"] == kind));
}

#[test]
fn completion_narrows_by_namespace() {
    let service = service_with("REMAP {\n    if geo.c\n}\n");
    let labels = label_set(&complete(&service, 1, 12));
    assert_eq!(labels, vec!["geo.country", "geo.country-iso"]);
}

#[test]
fn completion_tracks_document_changes() {
    let mut service = service_with("REMAP {\n}\n");
    service
        .handle_notification(
            DidChangeTextDocument::METHOD,
            json!({
                "textDocument": { "uri": URI, "version": 2 },
                "contentChanges": [{ "text": "VARS {\n    hits: int8;\n}\nREMAP {\n    hi\n}\n" }],
            }),
        )
        .unwrap();

    let labels = label_set(&complete(&service, 4, 6));
    assert_eq!(labels, vec!["hits"]);
}

// ============================================================
// Hover
// ============================================================

#[test]
fn hover_shows_native_form_and_docs() {
    let service = service_with(RULES);
    let result = service
        .handle_request(
            HoverRequest::METHOD,
            json!({
                "textDocument": { "uri": URI },
                "position": { "line": 11, "character": 12 },
            }),
        )
        .unwrap();

    let value = result["contents"]["value"].as_str().unwrap();
    assert!(value.starts_with("**inbound.status** (condition)"));
    assert!(value.contains("`%{STATUS}`"));

    let range = &result["range"];
    assert_eq!(range["start"], json!({ "line": 11, "character": 7 }));
    assert_eq!(range["end"], json!({ "line": 11, "character": 21 }));
}

// ============================================================
// Diagnostics
// ============================================================

#[test]
fn diagnostics_cover_every_error() {
    let mut service = LanguageService::default();
    let published = service
        .handle_notification(
            DidOpenTextDocument::METHOD,
            json!({
                "textDocument": {
                    "uri": URI,
                    "languageId": "hrw4u",
                    "version": 7,
                    "text": "REMAP {\n    inbound.resp.X = \"1\";\n    counter(\"a\", \"b\");\n}\n",
                }
            }),
        )
        .unwrap()
        .unwrap();

    assert_eq!(published.version, Some(7));
    let lines: Vec<u32> = published.diagnostics.iter().map(|d| d.range.start.line).collect();
    assert_eq!(lines, vec![1, 2]);
    assert!(published
        .diagnostics
        .iter()
        .all(|d| d.severity == Some(DiagnosticSeverity::ERROR)));
}

#[test]
fn requests_for_unknown_documents_are_empty() {
    let service = LanguageService::default();
    assert!(service.completion("file:///nope", Position::new(0, 0)).is_empty());
    assert!(service.hover("file:///nope", Position::new(0, 0)).is_none());
    assert!(service.diagnostics("file:///nope").is_empty());
}
