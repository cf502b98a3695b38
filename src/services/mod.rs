// Entity services
pub mod marcas;
pub mod modelos;

pub use marcas::MarcaService;
pub use modelos::ModeloService;

/// A slice of an ordered list plus the size of the whole list.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
}

/// Largest row offset the database drivers bind (a signed 64-bit integer).
pub const MAX_ROW_OFFSET: u64 = i64::MAX as u64;

/// Offset of the first row of `page`, capped at [`MAX_ROW_OFFSET`].
pub fn row_offset(page: u64, size: u64) -> u64 {
    page.saturating_mul(size).min(MAX_ROW_OFFSET)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_offset_never_exceeds_a_signed_bind() {
        assert_eq!(row_offset(3, 20), 60);
        assert_eq!(row_offset(u64::MAX, 1), MAX_ROW_OFFSET);
        assert_eq!(row_offset(i64::MAX as u64, 2), MAX_ROW_OFFSET);
    }
}
