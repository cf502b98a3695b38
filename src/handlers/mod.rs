pub mod common;
pub mod marcas;
pub mod modelos;

use crate::db::DbPool;
use crate::services::{MarcaService, ModeloService};
use std::sync::Arc;

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer that encapsulates business logic used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub marcas: Arc<MarcaService>,
    pub modelos: Arc<ModeloService>,
}

impl AppServices {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self {
            marcas: Arc::new(MarcaService::new(db_pool.clone())),
            modelos: Arc::new(ModeloService::new(db_pool)),
        }
    }
}
