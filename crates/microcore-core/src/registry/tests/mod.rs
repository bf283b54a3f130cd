
#[cfg(test)]
mod tests {
    use crate::registry::{HealthRecord, HealthStatus, PluginStatus};

    #[test]
    fn test_status_labels() {
        assert_eq!(HealthStatus::Ok.to_string(), "OK");
        assert_eq!(HealthStatus::Degraded.to_string(), "DEGRADED");
        assert_eq!(PluginStatus::Dead.to_string(), "DEAD");
        assert_eq!(serde_json::to_value(HealthStatus::Fail).unwrap(), "FAIL");
        assert_eq!(serde_json::to_value(PluginStatus::Ready).unwrap(), "READY");
    }

    #[test]
    fn test_not_initialized_record() {
        let record = HealthRecord::not_initialized();
        assert_eq!(record.status, HealthStatus::Fail);
        assert_eq!(record.message.as_deref(), Some("Not initialized"));
        assert!(!record.is_ok());
    }

    #[test]
    fn test_alive_statuses() {
        assert!(PluginStatus::Running.is_alive());
        assert!(PluginStatus::Ready.is_alive());
        assert!(!PluginStatus::Booting.is_alive());
        assert!(!PluginStatus::Dead.is_alive());
    }
}
