use super::*;
use serde_json::json;

#[test]
fn request_omits_absent_fields() {
    let request = CdpRequest {
        id: 1,
        method: "Page.enable".to_string(),
        params: None,
        session_id: None,
    };
    let json = serde_json::to_value(&request).unwrap();
    assert_eq!(json["method"], "Page.enable");
    assert!(json.get("params").is_none());
    assert!(json.get("sessionId").is_none());
}

#[test]
fn request_renames_session_id() {
    let request = CdpRequest {
        id: 2,
        method: "Runtime.evaluate".to_string(),
        params: Some(json!({"expression": "1"})),
        session_id: Some("S1".to_string()),
    };
    let json = serde_json::to_value(&request).unwrap();
    assert_eq!(json["sessionId"], "S1");
}

#[test]
fn parses_response_and_event() {
    let response: CdpResponse =
        serde_json::from_str(r#"{"id": 3, "result": {"frameId": "F"}}"#).unwrap();
    assert_eq!(response.id, Some(3));
    assert!(response.method.is_none());

    let event: CdpResponse = serde_json::from_str(
        r#"{"method": "Target.targetCreated", "params": {"targetInfo": {"targetId": "T", "type": "page", "title": "", "url": "about:blank"}}}"#,
    )
    .unwrap();
    assert_eq!(event.id, None);
    assert_eq!(event.method.as_deref(), Some("Target.targetCreated"));
    let info: TargetInfo =
        serde_json::from_value(event.params.unwrap()["targetInfo"].clone()).unwrap();
    assert_eq!(info.target_id, "T");
    assert_eq!(info.target_type, "page");
}

#[test]
fn parses_protocol_error() {
    let response: CdpResponse = serde_json::from_str(
        r#"{"id": 4, "error": {"code": -32000, "message": "Node not found"}}"#,
    )
    .unwrap();
    let error = response.error.unwrap();
    assert_eq!(error.code, -32000);
    assert_eq!(error.message, "Node not found");
}

#[test]
fn parses_browser_version_pascal_case() {
    let version: BrowserVersion = serde_json::from_str(
        r#"{
            "Browser": "Chrome/130.0.0.0",
            "Protocol-Version": "1.3",
            "User-Agent": "Mozilla/5.0",
            "webSocketDebuggerUrl": "ws://127.0.0.1:9222/devtools/browser/abc"
        }"#,
    )
    .unwrap();
    assert!(version.browser.starts_with("Chrome"));
    assert!(version.web_socket_debugger_url.starts_with("ws://"));
}
