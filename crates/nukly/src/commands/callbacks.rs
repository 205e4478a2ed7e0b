//! `nukly callbacks`

use serde::Serialize;
use tabled::Tabled;

use nukly_config::Config;
use nukly_core::{BridgeId, CallbackOutcome, CoreError};

use crate::cli::{CallbacksArgs, GlobalOpts};
use crate::error::CliError;
use crate::output;

#[derive(Serialize)]
struct CallbackView {
    bridge: BridgeId,
    id: Option<u32>,
    url: String,
}

#[derive(Tabled)]
struct CallbackRow {
    #[tabled(rename = "Bridge")]
    bridge: String,
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "URL")]
    url: String,
}

pub async fn handle(
    args: &CallbacksArgs,
    cfg: &Config,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let adapter = super::session(crate::config::adapter_config(cfg, global)?).await?;
    let ids: Vec<BridgeId> = adapter.bridges().all().map(|b| b.id()).collect();

    if args.ensure {
        let mut results = Vec::with_capacity(ids.len());
        for &id in &ids {
            results.push((id, adapter.ensure_callback(id).await));
        }
        for (id, outcome) in super::per_bridge(results, "callback registration failed")? {
            match outcome {
                CallbackOutcome::Registered { url } if !global.quiet => {
                    eprintln!("bridge {id}: registered {url}");
                }
                CallbackOutcome::AlreadyRegistered { url } if !global.quiet => {
                    eprintln!("bridge {id}: {url} already registered");
                }
                _ => {}
            }
        }
    }

    let mut results = Vec::with_capacity(ids.len());
    for &id in &ids {
        let listed = async {
            Ok::<_, CoreError>(adapter.bridge_client(id)?.list_callbacks().await?)
        }
        .await;
        results.push((id, listed));
    }

    let views: Vec<CallbackView> = super::per_bridge(results, "listing callbacks failed")?
        .into_iter()
        .flat_map(|(id, entries)| {
            entries.into_iter().map(move |cb| CallbackView {
                bridge: id,
                id: cb.id,
                url: cb.url,
            })
        })
        .collect();

    let out = output::render_list(
        &global.output,
        &views,
        |v| CallbackRow {
            bridge: v.bridge.to_string(),
            id: v.id.map_or_else(|| "-".into(), |id| id.to_string()),
            url: v.url.clone(),
        },
        |v| v.url.clone(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}
