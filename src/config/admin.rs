//! Administrative replacement of the policy snapshot.

use std::sync::Arc;

use tracing::{info, warn};

use crate::error::EngineResult;
use crate::models::Identity;
use crate::store::DocumentStore;

use super::types::PolicyConfig;

/// Validates `policy` and installs it as the new snapshot.
///
/// Only administrators may update the policy. Operations already holding
/// the previous snapshot finish with it; every later operation sees the new
/// one.
pub fn update_policy(
    store: &dyn DocumentStore,
    actor: &Identity,
    policy: PolicyConfig,
) -> EngineResult<Arc<PolicyConfig>> {
    actor.require_admin()?;
    policy.validate().inspect_err(|e| {
        warn!(actor = %actor.user_id, error = %e, "Policy update rejected");
    })?;

    let snapshot = store.replace_policy(policy)?;
    info!(
        actor = %actor.user_id,
        utc_offset_minutes = snapshot.utc_offset_minutes,
        radius_meters = snapshot.geofence.radius_meters,
        enforce_geofence = snapshot.punch.enforce_geofence,
        "Policy updated"
    );
    Ok(snapshot)
}
