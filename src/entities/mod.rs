pub mod marca;
pub mod modelo;

pub use marca::{Entity as MarcaEntity, Model as MarcaModel};
pub use modelo::{Entity as ModeloEntity, Model as ModeloModel};
