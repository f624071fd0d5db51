use serde::{Deserialize, Serialize};

use crate::catalog::CatalogError;
use crate::contract::{
    CommandListResponse, CompleteResponse, CoreRequest, CoreResponse, ExecuteResponse,
    HistoryResponse,
};
use crate::core_service::CoreService;
use crate::resolver::ResolveError;
use crate::session::error_chain_message;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    InvalidJson,
    Catalog,
    Template,
    Process,
    Open,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorResponse {
    pub code: ErrorCode,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TransportResponse {
    Ok { response: CoreResponse },
    Err { error: ErrorResponse },
}

pub fn handle_request(service: &mut CoreService, request: CoreRequest) -> TransportResponse {
    let result = match request {
        CoreRequest::ListCommands => service
            .list_commands()
            .map(|catalog| {
                CoreResponse::ListCommands(CommandListResponse {
                    commands: catalog.names().to_vec(),
                })
            })
            .map_err(map_catalog_error),
        CoreRequest::Complete(request) => Ok(CoreResponse::Complete(CompleteResponse::from(
            service.complete(&request.text),
        ))),
        CoreRequest::Execute(request) => service
            .execute(&request.text)
            .map(|handled| {
                CoreResponse::Execute(ExecuteResponse {
                    text: request.text.clone(),
                    handled,
                })
            })
            .map_err(map_resolve_error),
        CoreRequest::History => Ok(CoreResponse::History(HistoryResponse {
            entries: service.history().entries().to_vec(),
        })),
    };

    match result {
        Ok(response) => TransportResponse::Ok { response },
        Err(error) => TransportResponse::Err { error },
    }
}

pub fn handle_json(service: &mut CoreService, payload: &str) -> String {
    let response = match serde_json::from_str::<CoreRequest>(payload) {
        Ok(request) => handle_request(service, request),
        Err(error) => TransportResponse::Err {
            error: ErrorResponse {
                code: ErrorCode::InvalidJson,
                message: error.to_string(),
            },
        },
    };

    encode_response(&response)
}

pub fn encode_response(response: &TransportResponse) -> String {
    serde_json::to_string(response).unwrap_or_else(|error| {
        format!(
            r#"{{"status":"err","error":{{"code":"invalid_json","message":"{}"}}}}"#,
            error.to_string().replace('"', "'")
        )
    })
}

fn map_catalog_error(error: CatalogError) -> ErrorResponse {
    ErrorResponse {
        code: ErrorCode::Catalog,
        message: error_chain_message(&error),
    }
}

fn map_resolve_error(error: ResolveError) -> ErrorResponse {
    let code = match &error {
        ResolveError::Catalog(_) => ErrorCode::Catalog,
        ResolveError::Template(_) => ErrorCode::Template,
        ResolveError::Process(_) => ErrorCode::Process,
        ResolveError::Open(_) => ErrorCode::Open,
    };
    ErrorResponse {
        code,
        message: error_chain_message(&error),
    }
}
