use crate::models::{Marca, Modelo};
use std::borrow::Cow;
use validator::{Validate, ValidationError, ValidationErrors};

/// A constraint attached to one form field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    /// Value must be present and non-empty
    Required,
    /// Minimum length in characters; empty values are not checked
    MinLength(usize),
    /// Maximum length in characters; empty values are not checked
    MaxLength(usize),
}

/// Values a [`Field`] can hold.
pub trait FieldValue {
    /// An empty string counts as missing for [`Rule::Required`].
    fn is_blank(&self) -> bool {
        false
    }

    /// Length used by the length rules; `None` for values without one.
    fn length(&self) -> Option<usize> {
        None
    }
}

impl FieldValue for String {
    fn is_blank(&self) -> bool {
        self.is_empty()
    }

    fn length(&self) -> Option<usize> {
        Some(self.chars().count())
    }
}

impl FieldValue for i32 {}
impl FieldValue for i64 {}
impl FieldValue for f64 {}
impl FieldValue for Marca {}

/// One form control: a nullable value plus the rules it must satisfy.
#[derive(Debug, Clone, PartialEq)]
pub struct Field<T> {
    value: Option<T>,
    rules: &'static [Rule],
}

impl<T> Default for Field<T> {
    fn default() -> Self {
        Self::unconstrained()
    }
}

impl<T> Field<T> {
    pub fn unconstrained() -> Self {
        Self::with_rules(&[])
    }

    pub fn with_rules(rules: &'static [Rule]) -> Self {
        Self { value: None, rules }
    }

    pub fn value(&self) -> Option<&T> {
        self.value.as_ref()
    }

    pub fn set(&mut self, value: Option<T>) {
        self.value = value;
    }

    pub fn rules(&self) -> &'static [Rule] {
        self.rules
    }
}

impl<T: Clone> Field<T> {
    pub fn get(&self) -> Option<T> {
        self.value.clone()
    }
}

impl<T: FieldValue> Field<T> {
    fn is_empty(&self) -> bool {
        self.value.as_ref().map_or(true, FieldValue::is_blank)
    }

    /// Records every violated rule under `name`.
    fn check(&self, name: &'static str, errors: &mut ValidationErrors) {
        for rule in self.rules {
            let violation = match *rule {
                Rule::Required if self.is_empty() => {
                    let mut err = ValidationError::new("required");
                    err.message = Some(Cow::Borrowed("this field is required"));
                    Some(err)
                }
                Rule::MinLength(min) => match self.checked_length() {
                    Some(actual) if actual < min => {
                        let mut err = ValidationError::new("minlength");
                        err.message = Some(Cow::Owned(format!(
                            "this field must be at least {} characters",
                            min
                        )));
                        err.add_param(Cow::Borrowed("min"), &min);
                        err.add_param(Cow::Borrowed("actual"), &actual);
                        Some(err)
                    }
                    _ => None,
                },
                Rule::MaxLength(max) => match self.checked_length() {
                    Some(actual) if actual > max => {
                        let mut err = ValidationError::new("maxlength");
                        err.message = Some(Cow::Owned(format!(
                            "this field cannot be longer than {} characters",
                            max
                        )));
                        err.add_param(Cow::Borrowed("max"), &max);
                        err.add_param(Cow::Borrowed("actual"), &actual);
                        Some(err)
                    }
                    _ => None,
                },
                Rule::Required => None,
            };

            if let Some(err) = violation {
                errors.add(name, err);
            }
        }
    }

    fn checked_length(&self) -> Option<usize> {
        if self.is_empty() {
            return None;
        }
        self.value.as_ref().and_then(FieldValue::length)
    }
}

const MODELO_RULES: &[Rule] = &[Rule::Required, Rule::MinLength(5), Rule::MaxLength(50)];

/// Edit form for a [`Modelo`].
///
/// Only `modelo` carries rules; everything else is checked server-side.
#[derive(Debug, Clone, PartialEq)]
pub struct ModeloForm {
    pub id: Field<i64>,
    pub modelo: Field<String>,
    pub color: Field<String>,
    pub potencia: Field<i32>,
    pub plazas: Field<i32>,
    pub precio: Field<f64>,
    pub marca: Field<Marca>,
    pub numero_serie: Field<String>,
}

impl Default for ModeloForm {
    fn default() -> Self {
        Self::new()
    }
}

impl ModeloForm {
    pub fn new() -> Self {
        Self {
            id: Field::unconstrained(),
            modelo: Field::with_rules(MODELO_RULES),
            color: Field::unconstrained(),
            potencia: Field::unconstrained(),
            plazas: Field::unconstrained(),
            precio: Field::unconstrained(),
            marca: Field::unconstrained(),
            numero_serie: Field::unconstrained(),
        }
    }

    /// Overwrites every field from `record`; absent values clear the field.
    pub fn patch_value(&mut self, record: &Modelo) {
        self.id.set(record.id);
        self.modelo.set(record.modelo.clone());
        self.color.set(record.color.clone());
        self.potencia.set(record.potencia);
        self.plazas.set(record.plazas);
        self.precio.set(record.precio);
        self.marca.set(record.marca.clone());
        self.numero_serie.set(record.numero_serie.clone());
    }

    /// Builds a record from the current values, passed through unmodified.
    pub fn to_modelo(&self) -> Modelo {
        Modelo {
            id: self.id.get(),
            modelo: self.modelo.get(),
            color: self.color.get(),
            potencia: self.potencia.get(),
            plazas: self.plazas.get(),
            precio: self.precio.get(),
            marca: self.marca.get(),
            numero_serie: self.numero_serie.get(),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }
}

impl Validate for ModeloForm {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        self.id.check("id", &mut errors);
        self.modelo.check("modelo", &mut errors);
        self.color.check("color", &mut errors);
        self.potencia.check("potencia", &mut errors);
        self.plazas.check("plazas", &mut errors);
        self.precio.check("precio", &mut errors);
        self.marca.check("marca", &mut errors);
        self.numero_serie.check("numero_serie", &mut errors);

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
