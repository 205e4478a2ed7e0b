//! `nukly action <nuki-id> <level>`

use serde::Serialize;

use nukly_config::Config;
use nukly_core::{CommandOutcome, DeviceRole, LockAction, NukiId, translate};

use crate::cli::{ActionArgs, GlobalOpts};
use crate::error::CliError;
use crate::output;

#[derive(Serialize)]
struct ActionResult {
    nuki_id: NukiId,
    action: LockAction,
    code: u8,
    shown: &'static str,
}

pub async fn handle(args: &ActionArgs, cfg: &Config, global: &GlobalOpts) -> Result<(), CliError> {
    if translate(args.level).is_none() {
        return Err(CliError::Validation {
            field: "level".into(),
            reason: format!(
                "{} maps to no lock action (use 10/40 lock, 20/30 unlock, 50/70 unlatch, 60 lock 'n' go)",
                args.level
            ),
        });
    }

    let mut adapter = super::session(crate::config::adapter_config(cfg, global)?).await?;
    super::list_all(&mut adapter).await?;

    let nuki_id = NukiId(args.nuki_id);
    let outcome = adapter
        .command(nuki_id, DeviceRole::Status, args.level)
        .await?;

    let CommandOutcome::Sent { action, door_state } = outcome else {
        return Ok(());
    };
    let result = ActionResult {
        nuki_id,
        action,
        code: action.code(),
        shown: DeviceRole::Status.label(DeviceRole::Status.ordinal(Some(door_state))),
    };

    let out = output::render_single(
        &global.output,
        &result,
        |r| format!("{} sent to lock {} (now showing \"{}\")", r.action, r.nuki_id, r.shown),
        |r| r.action.code().to_string(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}
