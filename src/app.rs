use crate::api::{FiestaClient, DEFAULT_BASE_URL, DEFAULT_MODEL_COUNT};
use crate::cli::Args;
use crate::config::{self, Config};
use crate::present::{self, ViewState};
use crate::relay::{self, server::RelayServer};
use crate::request::Credential;
use crate::store::{FormState, FormUpdate, JsonFileStore, KvStore, NullStore};
use crate::transport::{
    DirectTransport, FallbackTransport, RelayTransport, Transport, TransportMode,
};
use crate::{models, paths};
use anyhow::{bail, Context};
use reqwest::Url;
use std::net::SocketAddr;
use std::process::ExitCode;
use std::time::Duration;

pub const DEFAULT_CHAT_TITLE: &str = "New Chat";
pub const MISSING_FIELDS: &str = "Please fill in Bearer Token and Prompt";

pub fn build_http(cfg: Option<&Config>) -> anyhow::Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder()
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")));
    if let Some(secs) = cfg.and_then(|c| c.transport.timeout_secs) {
        builder = builder.timeout(Duration::from_secs(secs));
    }
    builder.build().context("failed to build HTTP client")
}

pub fn build_direct(http: &reqwest::Client, cfg: Option<&Config>) -> DirectTransport {
    let headers = cfg.map(|c| c.headers.profile()).unwrap_or_default();
    let detector = cfg.map(|c| c.transport.detector()).unwrap_or_default();
    DirectTransport::new(http.clone(), headers, detector)
}

pub fn build_transport(
    http: &reqwest::Client,
    cfg: Option<&Config>,
    mode_override: Option<TransportMode>,
    relay_override: Option<String>,
) -> anyhow::Result<Box<dyn Transport>> {
    let transport_cfg = cfg.map(|c| c.transport.clone()).unwrap_or_default();
    let relay_url = relay_override.or_else(|| transport_cfg.relay_url.clone());
    let mode = mode_override.unwrap_or_else(|| transport_cfg.resolved_mode(relay_url.as_deref()));

    let relay = |url: Option<String>| -> anyhow::Result<RelayTransport> {
        let url = url.context("relay mode needs a relay URL (--relay-url or transport.relay_url)")?;
        let endpoint = Url::parse(&url).with_context(|| format!("invalid relay URL: {url}"))?;
        Ok(RelayTransport::new(http.clone(), endpoint, transport_cfg.detector()))
    };

    tracing::debug!(?mode, relay = ?relay_url, "selected transport");
    let t: Box<dyn Transport> = match mode {
        TransportMode::Direct => Box::new(build_direct(http, cfg)),
        TransportMode::Relay => Box::new(relay(relay_url)?),
        TransportMode::DirectThenRelay => Box::new(FallbackTransport::new(
            Box::new(build_direct(http, cfg)),
            Box::new(relay(relay_url)?),
        )),
    };
    Ok(t)
}

fn pick(form_value: &str, cfg_value: Option<&str>, default: &str) -> String {
    if !form_value.trim().is_empty() {
        form_value.to_string()
    } else {
        cfg_value.unwrap_or(default).to_string()
    }
}

/// Checked before any request is built.
fn required_fields(form: &FormState) -> anyhow::Result<(Credential, String)> {
    match Credential::new(&form.auth_token) {
        Some(credential) if !form.prompt.trim().is_empty() => Ok((credential, form.prompt.clone())),
        _ => bail!(MISSING_FIELDS),
    }
}

pub async fn cmd_ask(args: Args, cfg: Option<&Config>) -> anyhow::Result<ExitCode> {
    let store: Box<dyn KvStore> = if args.no_save {
        Box::new(NullStore)
    } else {
        Box::new(JsonFileStore::new(paths::form_state_path()?))
    };

    let mut form = FormState::load(store.as_ref());
    let prompt = args.prompt.join(" ");
    let changed = form.update(FormUpdate {
        auth_token: args.token.clone(),
        model: args.model.clone(),
        chat_title: args.title.clone(),
        prompt: (!prompt.trim().is_empty()).then_some(prompt),
    });
    if changed {
        if let Err(e) = form.save(store.as_ref()) {
            tracing::warn!(error = %e, "failed to save form state");
        }
    }

    let model = pick(&form.model, cfg.and_then(|c| c.model.as_deref()), models::DEFAULT_MODEL);
    let title = pick(&form.chat_title, cfg.and_then(|c| c.chat_title.as_deref()), DEFAULT_CHAT_TITLE);
    let label = models::label(&model).to_string();
    if models::find(&model).is_none() {
        tracing::warn!(%model, "unknown model, sending as-is");
    }

    let mut stderr = std::io::stderr();
    let mut stdout = std::io::stdout();

    let (credential, prompt) = match required_fields(&form) {
        Ok(fields) => fields,
        Err(e) => {
            present::render(&mut stderr, &label, ViewState::Failed(&e.to_string()))?;
            return Ok(ExitCode::FAILURE);
        }
    };

    let http = build_http(cfg)?;
    let transport = build_transport(&http, cfg, args.mode, args.relay_url.clone())?;
    tracing::info!(transport = transport.name(), %model, "sending prompt");

    let client = FiestaClient::new(
        transport,
        cfg.and_then(|c| c.base_url.as_deref()).unwrap_or(DEFAULT_BASE_URL),
        Some(credential),
        cfg.and_then(|c| c.model_count).unwrap_or(DEFAULT_MODEL_COUNT),
    )?;

    present::render(&mut stderr, &label, ViewState::Loading)?;

    // Dropping the request future on Ctrl-C releases the connection.
    let result = tokio::select! {
        r = client.ask(&title, &prompt, &model) => r,
        _ = tokio::signal::ctrl_c() => bail!("cancelled"),
    };

    match result {
        Ok(outcome) if args.json => {
            let v = relay::encode_outcome(&outcome);
            println!("{}", serde_json::to_string_pretty(&v)?);
            Ok(ExitCode::SUCCESS)
        }
        Ok(outcome) => {
            present::render(&mut stdout, &label, ViewState::Done(&outcome))?;
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            tracing::debug!(error = ?e, "request failed");
            present::render(&mut stderr, &label, ViewState::Failed(&format!("{e:#}")))?;
            Ok(ExitCode::FAILURE)
        }
    }
}

pub async fn cmd_serve(bind: Option<String>, cfg: Option<&Config>) -> anyhow::Result<ExitCode> {
    let bind = bind
        .or_else(|| cfg.and_then(|c| c.serve.bind.clone()))
        .unwrap_or_else(|| config::DEFAULT_BIND.to_string());
    let addr: SocketAddr = bind
        .parse()
        .with_context(|| format!("invalid bind address: {bind}"))?;

    let http = build_http(cfg)?;
    RelayServer::run(addr, build_direct(&http, cfg)).await?;
    Ok(ExitCode::SUCCESS)
}

pub fn cmd_models() -> anyhow::Result<ExitCode> {
    models::list(&mut std::io::stdout())?;
    Ok(ExitCode::SUCCESS)
}
