//! Manual smoke harness for the notification pipeline.
//!
//! Never mounted on the HTTP router — run it explicitly against the real
//! store and email provider:
//!
//!   notify-smoke <user-id>                  send a tagged test email to the
//!                                           user's registered contacts
//!   notify-smoke <user-id> --check [date]   run the real dispatch routine for
//!                                           the given reference date
//!                                           (defaults to yesterday, UTC)

use std::sync::Arc;
use std::time::Duration;

use chrono::{Duration as ChronoDuration, NaiveDate, Utc};
use uuid::Uuid;

use equilibrius_notify::config::Config;
use equilibrius_notify::db;
use equilibrius_notify::email::resend::ResendMailer;
use equilibrius_notify::email::throttle::EmailThrottle;
use equilibrius_notify::email::{Mailer, OutboundEmail};
use equilibrius_notify::notify::dispatcher::{DispatchOptions, Dispatcher};
use equilibrius_notify::store::pg::PgStore;
use equilibrius_notify::store::Store;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "equilibrius_notify=info".into()),
        )
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(user_arg) = args.first() else {
        eprintln!("usage: notify-smoke <user-id> [--check [YYYY-MM-DD]]");
        std::process::exit(2);
    };
    let user_id: Uuid = user_arg.parse()?;

    let config = Config::from_env();
    anyhow::ensure!(config.email_configured(), "RESEND_API_KEY must be set");

    let db = db::create_pool(&config.database_url).await;
    let store: Arc<dyn Store> = Arc::new(PgStore::new(db));
    let mailer: Arc<dyn Mailer> = Arc::new(ResendMailer::new(
        config.resend_api_key.clone(),
        EmailThrottle::new(config.email_max_per_minute),
    ));

    if args.iter().any(|a| a == "--check") {
        let reference_date: NaiveDate = match args
            .iter()
            .position(|a| a == "--check")
            .and_then(|i| args.get(i + 1))
        {
            Some(d) if !d.starts_with("--") => d.parse()?,
            _ => Utc::now().date_naive() - ChronoDuration::days(1),
        };

        let dispatcher = Dispatcher::new(
            store,
            mailer,
            DispatchOptions {
                from_email: config.email_from.clone(),
                concurrency: config.sweep_concurrency,
                run_timeout: Duration::from_secs(config.sweep_timeout_secs),
            },
        );

        let report = dispatcher.run_single(user_id, reference_date).await;
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    // Plain mode: deliverability check only, no mood data involved.
    let identity = store
        .user_identity(user_id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("user {} not found", user_id))?;
    let contacts = store.contacts_for(user_id).await?;
    anyhow::ensure!(
        !contacts.is_empty(),
        "user {} has no registered family members",
        user_id
    );

    let user_name = identity.display_name();
    for contact in &contacts {
        let email = OutboundEmail {
            from: config.email_from.clone(),
            to: contact.email.clone(),
            subject: format!("[TESTE] Alerta de bem-estar: {}", user_name),
            html: format!(
                "<p>Olá {},</p>\
                 <p><strong>Este é um e-mail de TESTE do app Equilibrius.</strong></p>\
                 <p>Se você está recebendo esta mensagem, as notificações sobre {} estão configuradas corretamente.</p>\
                 <p>Atenciosamente,</p>\
                 <p>Equipe Equilibrius</p>",
                contact.name, user_name
            ),
        };

        match mailer.send(&email).await {
            Ok(()) => println!("test email sent to {}", contact.email),
            Err(e) => eprintln!("failed to send to {}: {:#}", contact.email, e),
        }
    }

    Ok(())
}
