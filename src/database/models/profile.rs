use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Person record from the `pessoas` table.
///
/// Owned by the surrounding application; this service only attaches the
/// identity-provider account id (`user_id`) and flips `deve_trocar_senha`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Profile {
    pub id: Uuid,
    pub nome: String,
    pub telefone: Option<String>,
    pub igreja_id: Option<Uuid>,
    /// Opaque id of the linked identity-provider account, if any
    pub user_id: Option<String>,
    pub deve_trocar_senha: bool,
}
