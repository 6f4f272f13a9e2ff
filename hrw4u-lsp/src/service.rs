//! Request and notification dispatch
//!
//! [`LanguageService`] owns the open documents and answers LSP messages
//! given as a method name and JSON params. Reading and writing the
//! JSON-RPC frames is left to whatever transport hosts it.

use crate::completion::compute_completions;
use crate::diagnostics::compute_diagnostics;
use crate::document::{Document, DocumentStore};
use crate::hover::compute_hover;
use hrw4u_core::{Settings, SymbolTables};
use lsp_types::notification::{
    DidChangeTextDocument, DidCloseTextDocument, DidOpenTextDocument, Notification as _,
};
use lsp_types::request::{Completion, HoverRequest, Request as _};
use lsp_types::{
    CompletionItem, CompletionOptions, CompletionParams, CompletionResponse, Diagnostic,
    DidChangeTextDocumentParams, DidCloseTextDocumentParams, DidOpenTextDocumentParams, Hover,
    HoverParams, HoverProviderCapability, Position, PublishDiagnosticsParams, ServerCapabilities,
    TextDocumentSyncCapability, TextDocumentSyncKind, Uri,
};
use serde_json::Value;
use tracing::{debug, info, warn};

/// Dispatch error
#[derive(Debug, thiserror::Error)]
pub enum LspError {
    #[error("invalid params: {0}")]
    Params(#[from] serde_json::Error),

    #[error("method not found: {0}")]
    MethodNotFound(String),
}

/// Result type alias for dispatch
pub type Result<T> = std::result::Result<T, LspError>;

pub struct LanguageService {
    tables: &'static SymbolTables,
    settings: Settings,
    documents: DocumentStore,
}

impl LanguageService {
    pub fn new(settings: Settings) -> Self {
        Self {
            tables: SymbolTables::global(),
            settings,
            documents: DocumentStore::new(),
        }
    }

    /// What this service answers, for the `initialize` response
    pub fn capabilities() -> ServerCapabilities {
        ServerCapabilities {
            text_document_sync: Some(TextDocumentSyncCapability::Kind(TextDocumentSyncKind::FULL)),
            completion_provider: Some(CompletionOptions {
                trigger_characters: Some(vec![".".to_string()]),
                resolve_provider: Some(false),
                ..Default::default()
            }),
            hover_provider: Some(HoverProviderCapability::Simple(true)),
            ..Default::default()
        }
    }

    pub fn documents(&self) -> &DocumentStore {
        &self.documents
    }

    // ========================================
    // Operations
    // ========================================

    pub fn completion(&self, uri: &str, position: Position) -> Vec<CompletionItem> {
        match self.documents.get(uri) {
            Some(doc) => compute_completions(self.tables, doc, position),
            None => Vec::new(),
        }
    }

    pub fn hover(&self, uri: &str, position: Position) -> Option<Hover> {
        compute_hover(self.tables, self.documents.get(uri)?, position)
    }

    pub fn diagnostics(&self, uri: &str) -> Vec<Diagnostic> {
        match self.documents.get(uri) {
            Some(doc) => compute_diagnostics(doc, uri, &self.settings),
            None => Vec::new(),
        }
    }

    // ========================================
    // Dispatch
    // ========================================

    /// Answer a request; the value is the `result` member of the response
    pub fn handle_request(&self, method: &str, params: Value) -> Result<Value> {
        match method {
            m if m == Completion::METHOD => {
                let params: CompletionParams = serde_json::from_value(params)?;
                let at = params.text_document_position;
                let items = self.completion(at.text_document.uri.as_str(), at.position);
                Ok(serde_json::to_value(CompletionResponse::Array(items))?)
            }
            m if m == HoverRequest::METHOD => {
                let params: HoverParams = serde_json::from_value(params)?;
                let at = params.text_document_position_params;
                let hover = self.hover(at.text_document.uri.as_str(), at.position);
                Ok(serde_json::to_value(hover)?)
            }
            _ => Err(LspError::MethodNotFound(method.to_string())),
        }
    }

    /// Apply a notification; document changes yield diagnostics to publish
    pub fn handle_notification(
        &mut self,
        method: &str,
        params: Value,
    ) -> Result<Option<PublishDiagnosticsParams>> {
        match method {
            m if m == DidOpenTextDocument::METHOD => {
                let params: DidOpenTextDocumentParams = serde_json::from_value(params)?;
                let doc = params.text_document;
                info!("📂 opened {}", doc.uri.as_str());
                self.documents.open(doc.uri.as_str(), doc.text, doc.version);
                Ok(Some(self.publish(doc.uri)))
            }
            m if m == DidChangeTextDocument::METHOD => {
                let params: DidChangeTextDocumentParams = serde_json::from_value(params)?;
                let uri = params.text_document.uri;
                // full sync: the last change carries the whole text
                let Some(change) = params.content_changes.into_iter().last() else {
                    return Ok(None);
                };
                if !self
                    .documents
                    .change(uri.as_str(), change.text, params.text_document.version)
                {
                    warn!("⚠️ change for unopened document {}", uri.as_str());
                    return Ok(None);
                }
                Ok(Some(self.publish(uri)))
            }
            m if m == DidCloseTextDocument::METHOD => {
                let params: DidCloseTextDocumentParams = serde_json::from_value(params)?;
                let uri = params.text_document.uri;
                self.documents.close(uri.as_str());
                Ok(Some(PublishDiagnosticsParams::new(uri, Vec::new(), None)))
            }
            _ => {
                debug!("ignoring notification {}", method);
                Ok(None)
            }
        }
    }

    fn publish(&self, uri: Uri) -> PublishDiagnosticsParams {
        let diagnostics = self.diagnostics(uri.as_str());
        let version = self.documents.get(uri.as_str()).map(Document::version);
        debug!("{} diagnostic(s) for {}", diagnostics.len(), uri.as_str());
        PublishDiagnosticsParams::new(uri, diagnostics, version)
    }
}

impl Default for LanguageService {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const URI: &str = "file:///rules/a.hrw4u";

    fn open(service: &mut LanguageService, text: &str) -> PublishDiagnosticsParams {
        service
            .handle_notification(
                DidOpenTextDocument::METHOD,
                json!({
                    "textDocument": {
                        "uri": URI,
                        "languageId": "hrw4u",
                        "version": 1,
                        "text": text,
                    }
                }),
            )
            .unwrap()
            .unwrap()
    }

    #[test]
    fn test_open_publishes_diagnostics() {
        let mut service = LanguageService::default();
        let published = open(&mut service, "REMAP {\n    bogus;\n}\n");
        assert_eq!(published.uri.as_str(), URI);
        assert_eq!(published.version, Some(1));
        assert_eq!(published.diagnostics.len(), 1);
    }

    #[test]
    fn test_change_and_close() {
        let mut service = LanguageService::default();
        open(&mut service, "REMAP {\n    bogus;\n}\n");

        let published = service
            .handle_notification(
                DidChangeTextDocument::METHOD,
                json!({
                    "textDocument": { "uri": URI, "version": 2 },
                    "contentChanges": [{ "text": "REMAP {\n    set-debug;\n}\n" }],
                }),
            )
            .unwrap()
            .unwrap();
        assert!(published.diagnostics.is_empty());
        assert_eq!(published.version, Some(2));

        let closed = service
            .handle_notification(
                DidCloseTextDocument::METHOD,
                json!({ "textDocument": { "uri": URI } }),
            )
            .unwrap()
            .unwrap();
        assert!(closed.diagnostics.is_empty());
        assert!(service.documents().is_empty());
    }

    #[test]
    fn test_completion_request() {
        let mut service = LanguageService::default();
        open(&mut service, "REMAP {\n    set-d\n}\n");

        let result = service
            .handle_request(
                Completion::METHOD,
                json!({
                    "textDocument": { "uri": URI },
                    "position": { "line": 1, "character": 9 },
                }),
            )
            .unwrap();
        let labels: Vec<&str> = result
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|item| item["label"].as_str())
            .collect();
        assert!(labels.contains(&"set-debug"));
    }

    #[test]
    fn test_hover_request() {
        let mut service = LanguageService::default();
        open(&mut service, "REMAP {\n    set-debug;\n}\n");

        let result = service
            .handle_request(
                HoverRequest::METHOD,
                json!({
                    "textDocument": { "uri": URI },
                    "position": { "line": 1, "character": 6 },
                }),
            )
            .unwrap();
        assert_eq!(result["contents"]["kind"], "markdown");

        let missing = service
            .handle_request(
                HoverRequest::METHOD,
                json!({
                    "textDocument": { "uri": "file:///other.hrw4u" },
                    "position": { "line": 0, "character": 0 },
                }),
            )
            .unwrap();
        assert!(missing.is_null());
    }

    #[test]
    fn test_unknown_method_and_bad_params() {
        let mut service = LanguageService::default();
        assert!(matches!(
            service.handle_request("textDocument/rename", Value::Null),
            Err(LspError::MethodNotFound(_))
        ));
        assert!(matches!(
            service.handle_request(Completion::METHOD, json!({ "bogus": 1 })),
            Err(LspError::Params(_))
        ));
        assert!(service.handle_notification("$/cancelRequest", json!({})).unwrap().is_none());
    }
}
