use crate::error::{Field, ValidationError};
use crate::models::{Gender, HealthInput};

pub const NAME_MIN_CHARS: usize = 2;
pub const AGE_RANGE: (u32, u32) = (1, 120);
pub const HEIGHT_RANGE_CM: (f64, f64) = (50.0, 250.0);
pub const WEIGHT_RANGE_KG: (f64, f64) = (10.0, 300.0);

/// Raw form state as typed by the user
#[derive(Debug, Clone, Default)]
pub struct HealthForm {
    pub name: Option<String>,
    pub age: Option<String>,
    pub gender: Option<String>,
    pub height: Option<String>,
    pub weight: Option<String>,
}

impl HealthForm {
    /// Checks every field and returns all failures at once.
    /// Runs before any request is built.
    pub fn validate(&self) -> Result<HealthInput, Vec<ValidationError>> {
        let mut errors = Vec::new();

        let name = match non_empty(&self.name) {
            None => {
                errors.push(ValidationError::MissingField(Field::Name));
                None
            }
            Some(name) if name.chars().count() < NAME_MIN_CHARS => {
                errors.push(ValidationError::OutOfRange {
                    field: Field::Name,
                    min: NAME_MIN_CHARS as f64,
                    max: f64::INFINITY,
                });
                None
            }
            Some(name) => Some(name.to_string()),
        };

        let age = parse_field::<u32>(&self.age, Field::Age, &mut errors).and_then(|age| {
            check_range(f64::from(age), Field::Age, (AGE_RANGE.0.into(), AGE_RANGE.1.into()), &mut errors)
                .map(|_| age)
        });

        let gender = match non_empty(&self.gender) {
            None => {
                errors.push(ValidationError::MissingField(Field::Gender));
                None
            }
            Some(raw) => match parse_gender(raw) {
                Some(gender) => Some(gender),
                None => {
                    errors.push(ValidationError::Invalid(Field::Gender));
                    None
                }
            },
        };

        let height = parse_field::<f64>(&self.height, Field::Height, &mut errors)
            .and_then(|h| check_range(h, Field::Height, HEIGHT_RANGE_CM, &mut errors));
        let weight = parse_field::<f64>(&self.weight, Field::Weight, &mut errors)
            .and_then(|w| check_range(w, Field::Weight, WEIGHT_RANGE_KG, &mut errors));

        match (name, age, gender, height, weight) {
            (Some(name), Some(age), Some(gender), Some(height), Some(weight))
                if errors.is_empty() =>
            {
                Ok(HealthInput {
                    name,
                    age,
                    gender,
                    height,
                    weight,
                })
            }
            _ => Err(errors),
        }
    }

    /// Inline check for one field while the user types. Empty input is not
    /// flagged, so untouched fields stay neutral.
    pub fn field_is_valid(&self, field: Field) -> bool {
        let mut scratch = Vec::new();
        let raw = match field {
            Field::Name => &self.name,
            Field::Age => &self.age,
            Field::Gender => &self.gender,
            Field::Height => &self.height,
            Field::Weight => &self.weight,
        };
        let Some(value) = non_empty(raw) else {
            return true;
        };
        match field {
            Field::Name => value.chars().count() >= NAME_MIN_CHARS,
            Field::Gender => parse_gender(value).is_some(),
            Field::Age => parse_field::<u32>(raw, field, &mut scratch)
                .and_then(|age| {
                    check_range(
                        f64::from(age),
                        field,
                        (AGE_RANGE.0.into(), AGE_RANGE.1.into()),
                        &mut scratch,
                    )
                })
                .is_some(),
            Field::Height => parse_field::<f64>(raw, field, &mut scratch)
                .and_then(|h| check_range(h, field, HEIGHT_RANGE_CM, &mut scratch))
                .is_some(),
            Field::Weight => parse_field::<f64>(raw, field, &mut scratch)
                .and_then(|w| check_range(w, field, WEIGHT_RANGE_KG, &mut scratch))
                .is_some(),
        }
    }
}

impl TryFrom<&HealthForm> for HealthInput {
    type Error = Vec<ValidationError>;

    fn try_from(form: &HealthForm) -> Result<Self, Self::Error> {
        form.validate()
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn parse_gender(raw: &str) -> Option<Gender> {
    match raw.trim().to_lowercase().as_str() {
        "male" | "m" | "laki-laki" => Some(Gender::Male),
        "female" | "f" | "perempuan" => Some(Gender::Female),
        _ => None,
    }
}

fn parse_field<T: std::str::FromStr>(
    raw: &Option<String>,
    field: Field,
    errors: &mut Vec<ValidationError>,
) -> Option<T> {
    match non_empty(raw) {
        None => {
            errors.push(ValidationError::MissingField(field));
            None
        }
        Some(value) => match value.parse::<T>() {
            Ok(parsed) => Some(parsed),
            Err(_) => {
                errors.push(ValidationError::Invalid(field));
                None
            }
        },
    }
}

fn check_range(
    value: f64,
    field: Field,
    (min, max): (f64, f64),
    errors: &mut Vec<ValidationError>,
) -> Option<f64> {
    if value.is_finite() && value >= min && value <= max {
        Some(value)
    } else {
        errors.push(ValidationError::OutOfRange { field, min, max });
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(name: &str, age: &str, gender: &str, height: &str, weight: &str) -> HealthForm {
        HealthForm {
            name: Some(name.to_string()),
            age: Some(age.to_string()),
            gender: Some(gender.to_string()),
            height: Some(height.to_string()),
            weight: Some(weight.to_string()),
        }
    }

    #[test]
    fn test_valid_form() {
        let input = form("Ana", "30", "female", "165", "60").validate().unwrap();
        assert_eq!(input.name, "Ana");
        assert_eq!(input.age, 30);
        assert_eq!(input.gender, Gender::Female);
        assert_eq!(input.height, 165.0);
        assert_eq!(input.weight, 60.0);
    }

    #[test]
    fn test_boundaries_are_inclusive() {
        for (age, height, weight) in [("1", "50", "10"), ("120", "250", "300"), ("60", "172.5", "70.25")] {
            for gender in ["male", "female"] {
                let result = form("Jo", age, gender, height, weight).validate();
                assert!(result.is_ok(), "{age} {height} {weight} {gender} should pass");
            }
        }
    }

    #[test]
    fn test_out_of_range_values() {
        let cases = [
            form("Ana", "0", "female", "165", "60"),
            form("Ana", "121", "female", "165", "60"),
            form("Ana", "30", "female", "49.9", "60"),
            form("Ana", "30", "female", "250.1", "60"),
            form("Ana", "30", "female", "165", "9.99"),
            form("Ana", "30", "female", "165", "300.5"),
            form("A", "30", "female", "165", "60"),
        ];
        for case in cases {
            let errors = case.validate().unwrap_err();
            assert_eq!(errors.len(), 1, "{case:?}");
            assert!(matches!(errors[0], ValidationError::OutOfRange { .. }));
        }
    }

    #[test]
    fn test_collects_every_error() {
        let errors = HealthForm::default().validate().unwrap_err();
        let fields: Vec<Field> = errors.iter().map(ValidationError::field).collect();
        assert_eq!(
            fields,
            vec![Field::Name, Field::Age, Field::Gender, Field::Height, Field::Weight]
        );
        assert!(
            errors
                .iter()
                .all(|e| matches!(e, ValidationError::MissingField(_)))
        );
    }

    #[test]
    fn test_invalid_values() {
        let errors = form("Ana", "thirty", "other", "NaN", "60")
            .validate()
            .unwrap_err();
        assert_eq!(
            errors,
            vec![
                ValidationError::Invalid(Field::Age),
                ValidationError::Invalid(Field::Gender),
                ValidationError::OutOfRange {
                    field: Field::Height,
                    min: 50.0,
                    max: 250.0
                },
            ]
        );
    }

    #[test]
    fn test_name_is_trimmed() {
        let input = form("  Ana  ", "30", "female", "165", "60").validate().unwrap();
        assert_eq!(input.name, "Ana");
        assert!(form(" A ", "30", "female", "165", "60").validate().is_err());
    }

    #[test]
    fn test_field_is_valid_ignores_empty_input() {
        let mut form = HealthForm::default();
        assert!(form.field_is_valid(Field::Age));
        form.age = Some("200".to_string());
        assert!(!form.field_is_valid(Field::Age));
        form.height = Some("180".to_string());
        assert!(form.field_is_valid(Field::Height));
    }
}
