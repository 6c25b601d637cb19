//! Form validation for toys, orders and elves.
//!
//! Each validator returns a map from field name to message; an empty map means
//! the form is valid. Keys use the same camelCase spelling as the stored
//! documents so clients can attach messages to their inputs directly.

use std::collections::BTreeMap;

use serde::Serialize;
use thiserror::Error;

use santas_workshop_core::{Difficulty, Energy, ToyId};

use crate::models::{ElfForm, NewElf, NewOrder, NewToy, OrderForm, ToyForm};

/// Field name to error message.
pub type FieldErrors = BTreeMap<&'static str, &'static str>;

pub const TOY_NAME: &str = "Toy name must be at least 2 characters";
pub const TOY_CATEGORY: &str = "Category is required";
pub const TOY_DIFFICULTY: &str = "Difficulty must be Easy, Medium, or Hard";
pub const ORDER_CHILD_NAME: &str = "Child name must be at least 2 characters";
pub const ORDER_COUNTRY: &str = "Country is required";
pub const ORDER_TOY: &str = "Please select a toy";
pub const ELF_NAME: &str = "Elf name must be at least 2 characters";
pub const ELF_ROLE: &str = "Role is required";
pub const ELF_ENERGY: &str = "Energy must be between 0 and 100";

const MIN_NAME_CHARS: usize = 2;

/// A rejected form, with one message per offending field.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("validation failed for: {}", field_list(.errors))]
pub struct ValidationError {
    pub errors: FieldErrors,
}

fn field_list(errors: &FieldErrors) -> String {
    errors.keys().copied().collect::<Vec<_>>().join(", ")
}

fn too_short(value: &str) -> bool {
    value.trim().chars().count() < MIN_NAME_CHARS
}

fn blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// Check a toy form.
#[must_use]
pub fn validate_toy(form: &ToyForm) -> FieldErrors {
    let mut errors = FieldErrors::new();
    if too_short(&form.name) {
        errors.insert("name", TOY_NAME);
    }
    if blank(&form.category) {
        errors.insert("category", TOY_CATEGORY);
    }
    if form.difficulty.parse::<Difficulty>().is_err() {
        errors.insert("difficulty", TOY_DIFFICULTY);
    }
    errors
}

/// Check an order form.
#[must_use]
pub fn validate_order(form: &OrderForm) -> FieldErrors {
    let mut errors = FieldErrors::new();
    if too_short(&form.child_name) {
        errors.insert("childName", ORDER_CHILD_NAME);
    }
    if blank(&form.country) {
        errors.insert("country", ORDER_COUNTRY);
    }
    if form.toy_id.is_empty() {
        errors.insert("toyId", ORDER_TOY);
    }
    errors
}

/// Check an elf form.
#[must_use]
pub fn validate_elf(form: &ElfForm) -> FieldErrors {
    let mut errors = FieldErrors::new();
    if too_short(&form.name) {
        errors.insert("name", ELF_NAME);
    }
    if blank(&form.role) {
        errors.insert("role", ELF_ROLE);
    }
    if !form.energy.is_some_and(Energy::in_range) {
        errors.insert("energy", ELF_ENERGY);
    }
    errors
}

impl ToyForm {
    /// Validate and convert into a create payload.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` with every failing field.
    pub fn validate(self) -> Result<NewToy, ValidationError> {
        let errors = validate_toy(&self);
        match self.difficulty.parse::<Difficulty>() {
            Ok(difficulty) if errors.is_empty() => Ok(NewToy {
                name: self.name,
                category: self.category,
                difficulty,
                in_stock: self.in_stock,
            }),
            _ => Err(ValidationError { errors }),
        }
    }
}

impl OrderForm {
    /// Validate and convert into a create payload.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` with every failing field.
    pub fn validate(self) -> Result<NewOrder, ValidationError> {
        let errors = validate_order(&self);
        if !errors.is_empty() {
            return Err(ValidationError { errors });
        }
        Ok(NewOrder {
            child_name: self.child_name,
            country: self.country,
            toy_id: ToyId::new(self.toy_id),
            priority: self.priority.unwrap_or_default(),
        })
    }
}

impl ElfForm {
    /// Validate and convert into a create payload.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` with every failing field.
    pub fn validate(self) -> Result<NewElf, ValidationError> {
        let errors = validate_elf(&self);
        if !errors.is_empty() {
            return Err(ValidationError { errors });
        }
        Ok(NewElf {
            name: self.name,
            role: self.role,
            energy: self.energy,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn toy() -> ToyForm {
        ToyForm {
            name: "Robot".to_string(),
            category: "Tech".to_string(),
            difficulty: "Medium".to_string(),
            in_stock: None,
        }
    }

    fn order() -> OrderForm {
        OrderForm {
            child_name: "Mia".to_string(),
            country: "Norway".to_string(),
            toy_id: "t1".to_string(),
            ..OrderForm::default()
        }
    }

    fn elf() -> ElfForm {
        ElfForm {
            name: "Buddy".to_string(),
            role: "Builder".to_string(),
            energy: Some(70),
        }
    }

    #[test]
    fn test_valid_forms_have_no_errors() {
        assert!(validate_toy(&toy()).is_empty());
        assert!(validate_order(&order()).is_empty());
        assert!(validate_elf(&elf()).is_empty());
    }

    #[test]
    fn test_toy_single_violation_reports_only_that_key() {
        let form = ToyForm {
            name: " A ".to_string(),
            ..toy()
        };
        let errors = validate_toy(&form);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors["name"], TOY_NAME);

        let form = ToyForm {
            category: "   ".to_string(),
            ..toy()
        };
        assert_eq!(validate_toy(&form), FieldErrors::from([("category", TOY_CATEGORY)]));

        let form = ToyForm {
            difficulty: "Extreme".to_string(),
            ..toy()
        };
        assert_eq!(
            validate_toy(&form),
            FieldErrors::from([("difficulty", TOY_DIFFICULTY)])
        );
    }

    #[test]
    fn test_empty_toy_reports_every_field() {
        let errors = validate_toy(&ToyForm::default());
        assert_eq!(
            errors.keys().copied().collect::<Vec<_>>(),
            vec!["category", "difficulty", "name"]
        );
    }

    #[test]
    fn test_order_messages() {
        let errors = validate_order(&OrderForm::default());
        assert_eq!(errors["childName"], ORDER_CHILD_NAME);
        assert_eq!(errors["country"], ORDER_COUNTRY);
        assert_eq!(errors["toyId"], ORDER_TOY);
    }

    #[test]
    fn test_elf_energy_bounds() {
        for energy in [0, 100] {
            let form = ElfForm {
                energy: Some(energy),
                ..elf()
            };
            assert!(validate_elf(&form).is_empty(), "energy {energy}");
        }
        for energy in [Some(-1), Some(101), None] {
            let form = ElfForm { energy, ..elf() };
            assert_eq!(
                validate_elf(&form),
                FieldErrors::from([("energy", ELF_ENERGY)])
            );
        }
    }

    #[test]
    fn test_validate_converts_forms() {
        let new_toy = toy().validate().unwrap();
        assert_eq!(new_toy.difficulty, Difficulty::Medium);
        assert_eq!(new_toy.in_stock, None);

        let new_order = order().validate().unwrap();
        assert_eq!(new_order.toy_id.as_str(), "t1");

        let err = ElfForm::default().validate().unwrap_err();
        assert_eq!(err.to_string(), "validation failed for: energy, name, role");
    }
}
