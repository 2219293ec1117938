use portal_shell::models::ModuleIcon;
use portal_shell::router::{ViewBody, ViewLoader};
use portal_shell::{AppShell, Env, Resolution, ShellConfig};
use tokio::sync::broadcast::error::RecvError;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// main
///
/// A headless walk through the whole shell against a real backend: sign in,
/// load the module tree, resolve and load every module's default view, sign
/// out. Useful as a smoke test and as a reference for embedding the shell.
#[tokio::main]
async fn main() {
    // 1. Configuration & Environment Loading (Fail-Fast)
    // Loads .env file settings before configuration can be read.
    dotenv::dotenv().ok();
    // ShellConfig::load() implements the fail-fast principle for missing Production settings.
    let config = ShellConfig::load();

    // 2. Logging Filter Setup
    // Prioritizes the RUST_LOG environment variable, falling back to sensible
    // defaults for local development.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "portal_shell=debug,reqwest=info".into());

    // 3. Initialize Logging based on Environment
    // The structured logging format is dynamically selected based on the APP_ENV.
    match config.env {
        Env::Local => {
            // LOCAL: Pretty print output for human readability during local debugging.
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
        Env::Production => {
            // PROD: JSON format output for ingestion by centralized log aggregators.
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
    }

    tracing::info!("Portal shell starting in {:?} mode", config.env);

    // 4. Shell Assembly
    let shell = AppShell::new(config).expect("FATAL: Failed to assemble the application shell.");

    // 5. Background Issue Reporter
    // Subscribes to the report bus and escalates every server-error report to
    // the backend issue tracker. Submission failures are logged and dropped so
    // a broken tracker can never take down the shell.
    let reporter = shell.clone();
    let mut reports = shell.reports.subscribe();
    tokio::spawn(async move {
        loop {
            match reports.recv().await {
                Ok(report) => match reporter.admin().report_issue(&report, None).await {
                    Ok(ack) => {
                        tracing::info!(issue_id = ack.id, url = %report.url, "server error filed as issue");
                    }
                    Err(err) => {
                        tracing::warn!(error = %err, url = %report.url, "issue submission failed; report dropped");
                    }
                },
                Err(RecvError::Lagged(missed)) => {
                    tracing::warn!(missed, "issue reporter fell behind the report bus");
                }
                Err(RecvError::Closed) => break,
            }
        }
    });

    // 6. Sign In
    let email = std::env::var("PORTAL_DEMO_EMAIL")
        .expect("FATAL: PORTAL_DEMO_EMAIL must be set to run the demo.");
    let password = std::env::var("PORTAL_DEMO_PASSWORD")
        .expect("FATAL: PORTAL_DEMO_PASSWORD must be set to run the demo.");

    let user = shell
        .auth()
        .login(&email, &password)
        .await
        .expect("FATAL: Sign-in failed. Check the demo credentials and PORTAL_API_BASE.");
    tracing::info!(user = %user.display_name(), "signed in");

    // 7. Module Tree Walk
    // Loads the navigation tree, then resolves and loads each module's default
    // view exactly the way an interactive host would.
    shell.modules.load().await;
    if let Some(error) = shell.modules.error() {
        tracing::error!(error = %error, "module tree failed to load");
    }

    for module in shell.modules.tree() {
        tracing::info!(
            code = %module.code,
            name = %module.name,
            icon = ?ModuleIcon::resolve(module.icon.as_deref()),
            tabs = module.tabs.len(),
            "module"
        );

        let Some(mut path) = shell.modules.get_default_path(&module.code) else {
            tracing::warn!(code = %module.code, "module has no navigable default path");
            continue;
        };

        // Follow registry redirects to the concrete view. The shipped table
        // is one level deep; the bound guards against a future cycle.
        let mut hops = 0;
        loop {
            match shell.registry.resolve(&path) {
                Resolution::Redirect(target) if hops < 4 && target != path => {
                    hops += 1;
                    path = target;
                }
                Resolution::Redirect(target) => {
                    tracing::warn!(code = %module.code, target = %target, "route did not settle on a view");
                    break;
                }
                Resolution::View(view) => {
                    match view.load(&shell).await {
                        Ok(loaded) => match loaded.body {
                            ViewBody::Table(table) => {
                                tracing::info!(
                                    view = %loaded.title,
                                    path = %path,
                                    rows = table.rows.len(),
                                    total = table.total,
                                    "view loaded"
                                );
                            }
                            ViewBody::Text(text) => {
                                tracing::info!(view = %loaded.title, path = %path, text = %text, "view loaded");
                            }
                        },
                        Err(err) => {
                            tracing::error!(view = %view.title(), path = %path, error = %err, "view failed to load");
                        }
                    }
                    break;
                }
            }
        }
    }

    // 8. Sign Out
    shell.auth().logout().await;
    tracing::info!(path = %shell.navigator.current_path(), "signed out");
}
