use super::{Identifiable, Marca};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// A vehicle model, optionally belonging to one [`Marca`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
pub struct Modelo {
    /// Database identifier, unset until persisted
    #[serde(default)]
    #[schema(example = 7)]
    pub id: Option<i64>,

    /// Model name
    #[serde(default)]
    #[validate(
        required,
        length(min = 5, max = 50, message = "modelo must be between 5 and 50 characters")
    )]
    #[schema(example = "Civic Type R")]
    pub modelo: Option<String>,

    #[serde(default)]
    pub color: Option<String>,

    /// Engine power
    #[serde(default)]
    pub potencia: Option<i32>,

    /// Seat count
    #[serde(default)]
    pub plazas: Option<i32>,

    #[serde(default)]
    pub precio: Option<f64>,

    /// Referenced brand, embedded by value
    #[serde(default)]
    pub marca: Option<Marca>,

    /// Serial number
    #[serde(default)]
    pub numero_serie: Option<String>,
}

impl Modelo {
    /// Persisted-entity identity: both ids set and equal.
    pub fn same_entity(&self, other: &Modelo) -> bool {
        matches!((self.id, other.id), (Some(a), Some(b)) if a == b)
    }
}

impl Identifiable for Modelo {
    fn identifier(&self) -> Option<i64> {
        self.id
    }
}

pub fn get_modelo_identifier(modelo: &Modelo) -> Option<i64> {
    modelo.id
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(None, false)]
    #[case(Some(""), false)]
    #[case(Some("Ibiz"), false)]
    #[case(Some("Ibiza"), true)]
    #[case(Some("Clase E Coupé"), true)]
    fn modelo_name_bounds(#[case] name: Option<&str>, #[case] valid: bool) {
        let modelo = Modelo {
            modelo: name.map(str::to_string),
            ..Default::default()
        };
        assert_eq!(modelo.validate().is_ok(), valid);
    }

    #[test]
    fn fifty_characters_is_the_upper_bound() {
        let mut modelo = Modelo {
            modelo: Some("x".repeat(50)),
            ..Default::default()
        };
        assert!(modelo.validate().is_ok());
        modelo.modelo = Some("x".repeat(51));
        assert!(modelo.validate().is_err());
    }

    #[test]
    fn embedded_marca_round_trips_through_json() {
        let json = r#"{
            "id": 7,
            "modelo": "Civic",
            "color": null,
            "marca": {"id": 3, "marca": "Honda"},
            "numero_serie": "SN-1"
        }"#;
        let modelo: Modelo = serde_json::from_str(json).unwrap();
        assert_eq!(get_modelo_identifier(&modelo), Some(7));
        assert_eq!(modelo.marca, Some(Marca::new(Some(3), "Honda")));
        assert_eq!(modelo.numero_serie.as_deref(), Some("SN-1"));
        assert_eq!(modelo.potencia, None);
    }

    #[test]
    fn same_entity_ignores_field_values() {
        let a = Modelo {
            id: Some(1),
            modelo: Some("Leon FR".into()),
            ..Default::default()
        };
        let b = Modelo {
            id: Some(1),
            modelo: Some("Leon Cupra".into()),
            ..Default::default()
        };
        assert!(a.same_entity(&b));
        assert!(!Modelo::default().same_entity(&Modelo::default()));
    }
}
