/// LSP server trait implementation.
///
/// This module contains the `impl LanguageServer for Backend` block,
/// which handles all LSP protocol messages (initialize, didOpen, didChange,
/// didClose, completion, definition, hover).
use tower_lsp::LanguageServer;
use tower_lsp::jsonrpc::Result;
use tower_lsp::lsp_types::*;

use crate::Backend;
use crate::config::Config;
use crate::workspace;

#[tower_lsp::async_trait]
impl LanguageServer for Backend {
    async fn initialize(&self, params: InitializeParams) -> Result<InitializeResult> {
        // Extract and store the workspace root path
        let workspace_root = params
            .root_uri
            .as_ref()
            .and_then(|uri| uri.to_file_path().ok());

        self.set_config(Config::load(workspace_root.as_deref()));

        if let Some(root) = workspace_root
            && let Ok(mut wr) = self.workspace_root.lock()
        {
            *wr = Some(root);
        }

        Ok(InitializeResult {
            capabilities: ServerCapabilities {
                completion_provider: Some(CompletionOptions {
                    resolve_provider: Some(false),
                    trigger_characters: Some(vec![
                        ">".to_string(),
                        "'".to_string(),
                        "\"".to_string(),
                    ]),
                    ..CompletionOptions::default()
                }),
                text_document_sync: Some(TextDocumentSyncCapability::Kind(
                    TextDocumentSyncKind::FULL,
                )),
                definition_provider: Some(OneOf::Left(true)),
                hover_provider: Some(HoverProviderCapability::Simple(true)),
                ..ServerCapabilities::default()
            },
            server_info: Some(ServerInfo {
                name: self.name.clone(),
                version: Some(self.version.clone()),
            }),
        })
    }

    async fn initialized(&self, _: InitializedParams) {
        let Some(root) = self.workspace_root() else {
            self.log(MessageType::INFO, "phake-lsp initialized!".to_string())
                .await;
            return;
        };

        let index = self.index.clone();
        let exclude = self.config().index.exclude;
        let skip = self.open_uris();
        let scan_root = root.clone();
        let scanned = tokio::task::spawn_blocking(move || {
            workspace::index_into(&index, &scan_root, &exclude, &skip)
        })
        .await;

        let message = match scanned {
            Ok(Ok(count)) => format!(
                "phake-lsp initialized! Indexed {} PHP file(s) under {}",
                count,
                root.display()
            ),
            Ok(Err(e)) => {
                tracing::error!("workspace scan failed: {}", e);
                format!("phake-lsp initialized, but the workspace scan failed: {}", e)
            }
            Err(e) => {
                tracing::error!("workspace scan task failed: {}", e);
                "phake-lsp initialized, but the workspace scan did not finish".to_string()
            }
        };
        tracing::info!("{}", message);
        self.log(MessageType::INFO, message).await;
    }

    async fn shutdown(&self) -> Result<()> {
        Ok(())
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        let doc = params.text_document;
        let uri = doc.uri.to_string();
        let text = doc.text;

        // Store file content
        if let Ok(mut files) = self.open_files.lock() {
            files.insert(uri.clone(), text.clone());
        }

        self.update_ast(&uri, &text);

        self.log(MessageType::INFO, format!("Opened file: {}", uri))
            .await;
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        let uri = params.text_document.uri.to_string();

        if let Some(change) = params.content_changes.first() {
            let text = &change.text;

            // Update stored content
            if let Ok(mut files) = self.open_files.lock() {
                files.insert(uri.clone(), text.clone());
            }

            self.update_ast(&uri, text);
        }
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        let uri = params.text_document.uri.to_string();

        if let Ok(mut files) = self.open_files.lock() {
            files.remove(&uri);
        }
        self.forget_document(&uri);

        self.log(MessageType::INFO, format!("Closed file: {}", uri))
            .await;
    }

    async fn goto_definition(
        &self,
        params: GotoDefinitionParams,
    ) -> Result<Option<GotoDefinitionResponse>> {
        let uri = params
            .text_document_position_params
            .text_document
            .uri
            .to_string();
        let position = params.text_document_position_params.position;

        let Some(content) = self.open_file(&uri) else {
            return Ok(None);
        };

        Ok(self
            .resolve_definition(&uri, &content, position)
            .map(|mut locations| {
                if locations.len() == 1 {
                    GotoDefinitionResponse::Scalar(locations.remove(0))
                } else {
                    GotoDefinitionResponse::Array(locations)
                }
            }))
    }

    async fn completion(&self, params: CompletionParams) -> Result<Option<CompletionResponse>> {
        let uri = params.text_document_position.text_document.uri.to_string();
        let position = params.text_document_position.position;

        let Some(content) = self.open_file(&uri) else {
            return Ok(None);
        };

        Ok(self
            .completion_items(&uri, &content, position)
            .map(CompletionResponse::Array))
    }

    async fn hover(&self, params: HoverParams) -> Result<Option<Hover>> {
        let uri = params
            .text_document_position_params
            .text_document
            .uri
            .to_string();
        let position = params.text_document_position_params.position;

        let Some(content) = self.open_file(&uri) else {
            return Ok(None);
        };

        Ok(self.hover_at(&uri, &content, position))
    }
}
