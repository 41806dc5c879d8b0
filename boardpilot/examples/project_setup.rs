//! Set up a workspace, a project, and a handful of tasks in one run.
//!
//! Expects the app on http://localhost:3000 and a Chrome binary on PATH:
//! `cargo run --example project_setup`

use boardpilot::{Driver, DriverConfig, TaskSpec};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let driver = Driver::launch(DriverConfig::with_base_url("http://localhost:3000"))?;

    let probe = driver.initialize().await;
    println!("initialize: {}", serde_json::to_string_pretty(&probe)?);

    let login = driver.login("demo@example.com", "demo-password", false).await;
    println!("login: {}", login.message);
    if !login.success {
        anyhow::bail!("login failed: {:?}", login.error);
    }

    let tasks = vec![
        TaskSpec {
            title: "Draft landing page copy".to_string(),
            description: None,
        },
        TaskSpec {
            title: "Wireframe the checkout flow".to_string(),
            description: Some("Mobile first".to_string()),
        },
        TaskSpec {
            title: "Set up CI".to_string(),
            description: None,
        },
    ];
    let setup = driver
        .complete_project_setup(
            "Acme Rockets",
            Some("Everything rocket-related"),
            "Website Redesign",
            None,
            &tasks,
        )
        .await;
    println!("setup: {}", serde_json::to_string_pretty(&setup)?);

    Ok(())
}
