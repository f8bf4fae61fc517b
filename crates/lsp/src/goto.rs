use crate::LspServer;
use crate::util::{to_core_position, to_lsp_location};
use cdda_lsp_core::DocumentId;
use tower_lsp::jsonrpc::Result;
use tower_lsp::lsp_types::*;

pub async fn definition(
    server: &LspServer,
    params: GotoDefinitionParams,
) -> Result<Option<GotoDefinitionResponse>> {
    let uri = params.text_document_position_params.text_document.uri;
    let position = to_core_position(params.text_document_position_params.position);

    let Some(engine) = server.engine().await else {
        return Ok(None);
    };
    let locations = match engine.definition_query(&DocumentId::new(uri), position) {
        Ok(locations) => locations,
        Err(e) => {
            tracing::debug!("Definition query skipped: {}", e);
            return Ok(None);
        }
    };

    let mut locations: Vec<Location> = locations.into_iter().map(to_lsp_location).collect();
    match locations.len() {
        0 => Ok(None),
        1 => Ok(locations.pop().map(GotoDefinitionResponse::Scalar)),
        _ => Ok(Some(GotoDefinitionResponse::Array(locations))),
    }
}

pub async fn references(server: &LspServer, params: ReferenceParams) -> Result<Option<Vec<Location>>> {
    let uri = params.text_document_position.text_document.uri;
    let position = to_core_position(params.text_document_position.position);

    let Some(engine) = server.engine().await else {
        return Ok(None);
    };
    let locations = match engine.references_query(&DocumentId::new(uri), position) {
        Ok(locations) => locations,
        Err(e) => {
            tracing::debug!("References query skipped: {}", e);
            return Ok(None);
        }
    };

    if locations.is_empty() {
        return Ok(None);
    }
    Ok(Some(locations.into_iter().map(to_lsp_location).collect()))
}
