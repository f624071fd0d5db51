use quickcuts_core::autocomplete::AutoCompleteResult;
use quickcuts_core::contract::{
    CompleteResponse, CoreRequest, CoreResponse, ExecuteRequest, ExecuteResponse,
};

#[test]
fn requests_use_kind_and_payload_tags() {
    let encoded = serde_json::to_string(&CoreRequest::Execute(ExecuteRequest {
        text: "build".into(),
    }))
    .unwrap();
    assert_eq!(encoded, r#"{"kind":"Execute","payload":{"text":"build"}}"#);

    let list: CoreRequest = serde_json::from_str(r#"{"kind":"ListCommands"}"#).unwrap();
    assert_eq!(list, CoreRequest::ListCommands);
}

#[test]
fn unknown_request_kind_is_rejected() {
    let parsed = serde_json::from_str::<CoreRequest>(r#"{"kind":"Launch","payload":{}}"#);
    assert!(parsed.is_err());
}

#[test]
fn complete_response_is_built_from_autocomplete_result() {
    let response = CompleteResponse::from(AutoCompleteResult {
        input_text: "bu".into(),
        output_text: "build".into(),
    });
    assert_eq!(response.output_text, "build");

    let encoded = serde_json::to_string(&CoreResponse::Execute(ExecuteResponse {
        text: "build".into(),
        handled: true,
    }))
    .unwrap();
    assert!(encoded.contains(r#""handled":true"#));
}
