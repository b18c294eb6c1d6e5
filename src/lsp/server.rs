//! LSP server main loop using lsp-server.

use super::capabilities::server_capabilities;
use super::handlers::ServerState;
use crate::analysis::AnalysisContext;
use anyhow::Result;
use lsp_server::{Connection, ErrorCode, ExtractError, Message, Notification, Request, Response};
use lsp_types::{
    notification::{
        DidChangeTextDocument, DidCloseTextDocument, DidOpenTextDocument, DidSaveTextDocument,
        Notification as _, PublishDiagnostics,
    },
    InitializeParams, PublishDiagnosticsParams,
};

/// Run the LSP server over stdin/stdout.
pub fn run_server(context: AnalysisContext) -> Result<()> {
    tracing::info!("Starting disposal-lint LSP server...");

    let (connection, io_threads) = Connection::stdio();

    let server_capabilities = serde_json::to_value(server_capabilities())?;

    let initialization_params = match connection.initialize(server_capabilities) {
        Ok(params) => params,
        Err(e) => {
            if e.channel_is_disconnected() {
                io_threads.join()?;
            }
            return Err(e.into());
        }
    };

    let _params: InitializeParams = serde_json::from_value(initialization_params)?;
    tracing::info!("Server initialized");

    main_loop(connection, ServerState::new(context))?;

    io_threads.join()?;
    tracing::info!("Server shutdown complete");

    Ok(())
}

fn main_loop(connection: Connection, mut state: ServerState) -> Result<()> {
    for msg in &connection.receiver {
        match msg {
            Message::Request(req) => {
                if connection.handle_shutdown(&req)? {
                    return Ok(());
                }
                handle_request(&connection, req)?;
            }
            Message::Response(_resp) => {
                // We don't send requests, so we don't expect responses
            }
            Message::Notification(not) => {
                let published = handle_notification(&mut state, not)?;
                publish(&connection, published)?;
            }
        }
    }

    Ok(())
}

fn handle_request(connection: &Connection, req: Request) -> Result<()> {
    tracing::warn!("Unhandled request: {:?}", req.method);
    let resp = Response::new_err(
        req.id,
        ErrorCode::MethodNotFound as i32,
        format!("unsupported request: {}", req.method),
    );
    connection.sender.send(Message::Response(resp))?;
    Ok(())
}

fn handle_notification(
    state: &mut ServerState,
    not: Notification,
) -> Result<Vec<PublishDiagnosticsParams>> {
    let not = match cast_notification::<DidOpenTextDocument>(not) {
        Ok(params) => {
            tracing::info!("Document opened: {}", params.text_document.uri.as_str());
            return Ok(state.open_document(params.text_document.uri, params.text_document.text));
        }
        Err(ExtractError::MethodMismatch(not)) => not,
        Err(e) => return Err(e.into()),
    };

    let not = match cast_notification::<DidChangeTextDocument>(not) {
        Ok(params) => {
            tracing::debug!("Document changed: {}", params.text_document.uri.as_str());
            // Full sync: the last change carries the whole document
            return Ok(match params.content_changes.into_iter().last() {
                Some(change) => state.update_document(params.text_document.uri, change.text),
                None => Vec::new(),
            });
        }
        Err(ExtractError::MethodMismatch(not)) => not,
        Err(e) => return Err(e.into()),
    };

    let not = match cast_notification::<DidSaveTextDocument>(not) {
        Ok(params) => {
            tracing::debug!("Document saved: {}", params.text_document.uri.as_str());
            return Ok(state.save_document(params.text_document.uri, params.text));
        }
        Err(ExtractError::MethodMismatch(not)) => not,
        Err(e) => return Err(e.into()),
    };

    let not = match cast_notification::<DidCloseTextDocument>(not) {
        Ok(params) => {
            tracing::info!("Document closed: {}", params.text_document.uri.as_str());
            return Ok(state.close_document(&params.text_document.uri));
        }
        Err(ExtractError::MethodMismatch(not)) => not,
        Err(e) => return Err(e.into()),
    };

    tracing::trace!("Unhandled notification: {:?}", not.method);
    Ok(Vec::new())
}

fn publish(connection: &Connection, published: Vec<PublishDiagnosticsParams>) -> Result<()> {
    for params in published {
        let not = Notification::new(PublishDiagnostics::METHOD.to_string(), params);
        connection.sender.send(Message::Notification(not))?;
    }
    Ok(())
}

fn cast_notification<N>(not: Notification) -> Result<N::Params, ExtractError<Notification>>
where
    N: lsp_types::notification::Notification,
    N::Params: serde::de::DeserializeOwned,
{
    not.extract(N::METHOD)
}
