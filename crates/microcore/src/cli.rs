//! Console rendering of kernel results.
use std::time::Duration;

use microcore_core::registry::{PluginStatus, Registry, SystemSnapshot};
use microcore_core::{BootReport, Container, PluginResponse};

/// Give a freshly started plugin a moment to finish `on_boot` before it is
/// invoked. Plugins that keep booting (long-running loops) are invoked anyway.
pub async fn wait_until_settled(registry: &Registry, plugin: &str) {
    let settle = async {
        loop {
            match registry.get_system_dump().plugin(plugin).map(|record| record.status) {
                Some(PluginStatus::Running) => tokio::time::sleep(Duration::from_millis(10)).await,
                _ => break,
            }
        }
    };
    let _ = tokio::time::timeout(Duration::from_millis(500), settle).await;
}

pub fn print_response(response: &PluginResponse) {
    println!("{}", response.to_json());
}

pub fn print_boot_summary(report: &BootReport) {
    println!("Boot: {}", report.summary());
    for (tool, message) in &report.tools_failed {
        println!("  tool {} FAIL: {}", tool, message);
    }
    for (plugin, error) in &report.plugins_dead {
        println!("  plugin {} DEAD: {}", plugin, error);
    }
}

pub fn print_dump(snapshot: &SystemSnapshot) {
    match serde_json::to_string_pretty(snapshot) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Cannot serialize registry snapshot: {}", e),
    }
}

pub fn print_tools(container: &Container) {
    for name in container.list() {
        let health = container.get_health(&name);
        match &health.message {
            Some(message) => println!("{} [{}] {}", name, health.status, message),
            None => println!("{} [{}]", name, health.status),
        }
        if let Ok(tool) = container.get(&name) {
            for line in tool.interface_description().lines() {
                println!("    {}", line);
            }
        }
    }
}
