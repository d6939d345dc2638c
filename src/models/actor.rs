use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::Role;

/// A registered identity: patient, doctor or admin. Credentials are
/// out of scope — the registry only holds a bearer-token hash, and the
/// core consumes an actor purely as "caller X with role R".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Actor {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}
