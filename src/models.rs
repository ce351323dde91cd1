use serde::{Deserialize, Serialize};
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::session::{Role, SessionContext};

/// SessionProfile
///
/// Output schema describing the session a protected page was served under
/// (GET /me, /dashboard, /admin/dashboard).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct SessionProfile {
    pub authenticated: bool,
    pub role: Role,
    // Absent for development sessions, which have no backing account.
    pub subject: Option<Uuid>,
    // Which area of the portal produced the response ("user" or "admin").
    pub area: String,
}

impl SessionProfile {
    pub fn from_session(session: &SessionContext, area: &str) -> Self {
        Self {
            authenticated: session.is_authenticated,
            role: session.role,
            subject: session.subject,
            area: area.to_string(),
        }
    }
}
