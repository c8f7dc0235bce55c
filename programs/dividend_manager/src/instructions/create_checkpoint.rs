use anchor_lang::prelude::*;

use crate::context::OperatorContext;
use crate::event::*;
use crate::state::*;
use crate::utils::DividendAction;

/**
 * Takes a new balance snapshot on the security token
 *
 * @param ctx - Operation context
 * @param checkpoints - Local checkpoint registry, extended on success
 *
 * @returns The checkpoint confirmed by the `CheckpointCreated` event
 *
 * Checkpoints created by other participants since the last sync leave a gap in
 * the registry; it is then reloaded from the balance oracle.
 */
pub fn handle_create_checkpoint(
    ctx: &mut OperatorContext,
    checkpoints: &mut CheckpointRegistry,
) -> Result<Checkpoint> {
    let receipt = ctx.submit(DividendAction::CreateCheckpoint)?;
    let created: CheckpointCreated = receipt.event()?;
    let checkpoint = Checkpoint {
        id: created.checkpoint_id,
        timestamp: created.timestamp,
    };

    if !checkpoints.record(checkpoint) {
        checkpoints.sync(ctx.oracle)?;
    }

    msg!("Checkpoint {} created at {}", checkpoint.id, checkpoint.timestamp);

    Ok(checkpoint)
}
