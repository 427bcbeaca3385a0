//! Recording clock-in and clock-out punches.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use crate::clock::Clock;
use crate::config::PolicyConfig;
use crate::error::{EngineError, EngineResult};
use crate::models::{PunchEvent, PunchKind, PunchLocation};
use crate::store::DocumentStore;

/// Builds an immutable punch from a staff member's request.
///
/// The calendar date is the office-local day of `at`, and the fence verdict
/// is attached for reporting. When the policy enforces the geofence a punch
/// outside it fails with `OutsideGeofence`; when it caps GPS accuracy a
/// coarser fix fails with `InaccurateLocation`.
///
/// Without a policy the date is the UTC day and the fence verdict is false.
pub fn build_punch_event(
    policy: Option<&PolicyConfig>,
    user_id: &str,
    kind: PunchKind,
    location: PunchLocation,
    at: DateTime<Utc>,
) -> EngineResult<PunchEvent> {
    let (calendar_date, within_fence) = match policy {
        Some(policy) => {
            let fence = &policy.geofence;
            let within_fence = fence.contains(&location);

            if policy.punch.enforce_geofence && !within_fence {
                return Err(EngineError::OutsideGeofence {
                    distance_meters: fence.distance_to(&location),
                    radius_meters: fence.radius_meters,
                });
            }
            if let Some(max_accuracy_meters) = policy.punch.max_accuracy_meters {
                if location.accuracy_meters > max_accuracy_meters {
                    return Err(EngineError::InaccurateLocation {
                        accuracy_meters: location.accuracy_meters,
                        max_accuracy_meters,
                    });
                }
            }
            (policy.local_date(at), within_fence)
        }
        None => (at.date_naive(), false),
    };

    Ok(PunchEvent {
        id: Uuid::new_v4(),
        user_id: user_id.to_string(),
        kind,
        timestamp: at,
        location,
        calendar_date,
        within_fence,
    })
}

/// Stamps punches with the current time and appends them to the store.
#[derive(Debug, Clone)]
pub struct PunchRecorder {
    store: Arc<dyn DocumentStore>,
    clock: Arc<dyn Clock>,
}

impl PunchRecorder {
    /// Creates a recorder over `store`.
    pub fn new(store: Arc<dyn DocumentStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Records a punch for `user_id` at the current instant.
    pub fn record(
        &self,
        user_id: &str,
        kind: PunchKind,
        location: PunchLocation,
    ) -> EngineResult<PunchEvent> {
        let policy = self.store.policy()?;
        let at = self.clock.now();

        let event = match build_punch_event(policy.as_deref(), user_id, kind, location, at) {
            Ok(event) => event,
            Err(e) => {
                warn!(user_id = %user_id, kind = ?kind, error = %e, "Punch rejected");
                return Err(e);
            }
        };

        self.store.append_punch(event.clone())?;

        info!(
            punch_id = %event.id,
            user_id = %event.user_id,
            kind = ?event.kind,
            calendar_date = %event.calendar_date,
            within_fence = event.within_fence,
            "Punch recorded"
        );

        Ok(event)
    }
}
