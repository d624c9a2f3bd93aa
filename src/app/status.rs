use zos_lens::config::{Config, NetworkEnv};

pub fn render_status(config: &Config, demo: bool) -> String {
    let endpoints = config.network_config();
    let mut lines = vec![
        "◆ zos-lens status".to_string(),
        String::new(),
        format!("Version     {}", env!("CARGO_PKG_VERSION")),
        format!("Config      {}", config.config_path.display()),
        String::new(),
        format!("  Network     {} ({})", config.network, endpoints.name),
        format!("   Relay      {}", endpoints.relay_url),
        format!("   Chain      {}", endpoints.substrate_url),
        format!("   Gridproxy  {}", endpoints.grid_proxy_url),
        format!(
            "  Identity    {}",
            if config.mnemonic.is_some() {
                "✓ secret phrase stored"
            } else {
                "✗ not configured"
            }
        ),
        format!("  Target      {}", describe_selection(config)),
        String::new(),
        "RMB".to_string(),
        format!(
            "  Session     {} ({})",
            config.rmb.session, config.rmb.key_type
        ),
        format!(
            "  Requests    expire after {}min, retries={}, timeout={}s",
            config.rmb.expiration_minutes, config.rmb.retries, config.rmb.read_timeout_secs
        ),
        format!(
            "  Transport   {}",
            if demo || config.rmb.demo {
                "demo (canned replies)"
            } else {
                "none linked"
            }
        ),
        format!(
            "  Secrets     {}",
            if config.secrets.encrypt {
                "encrypted at rest"
            } else {
                "plaintext"
            }
        ),
    ];

    lines.push(String::new());
    lines.push("Networks".to_string());
    for (env, label) in NetworkEnv::all() {
        let marker = if env == config.network { "●" } else { " " };
        lines.push(format!("  {marker} {env:5} {label}"));
    }

    lines.join("\n")
}

fn describe_selection(config: &Config) -> String {
    match (config.selected_node_id, config.selected_twin_id) {
        (Some(node), Some(twin)) => format!("node {node} (twin {twin})"),
        (Some(node), None) => format!("node {node} (twin unknown)"),
        _ => "no node selected".to_string(),
    }
}
