use crate::tool_system::ToolError;

#[test]
fn test_tool_error_message_strips_prefix() {
    let err = ToolError::Setup("port 8080 in use".to_string());
    assert_eq!(err.to_string(), "setup failed: port 8080 in use");
    assert_eq!(err.message(), "port 8080 in use");

    assert_eq!(ToolError::Wiring("no bus".into()).to_string(), "wiring failed: no bus");
    assert_eq!(ToolError::Shutdown("stuck".into()).message(), "stuck");
    assert_eq!(ToolError::Other("plain".into()).to_string(), "plain");
}
