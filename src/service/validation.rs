//! Request validation against the data model rules.

use crate::dto::{BirdRequest, SightingRequest, UpdateBirdRequest, UpdateSightingRequest};
use crate::error::AppError;

pub struct RequestValidator;

impl RequestValidator {
    pub fn validate_bird(body: &BirdRequest) -> Result<(), AppError> {
        require_text("name", &body.name)?;
        require_text("color", &body.color)?;
        require_positive("weight", body.weight)?;
        require_positive("height", body.height)
    }

    /// Validate only the fields present (for PATCH).
    pub fn validate_bird_update(body: &UpdateBirdRequest) -> Result<(), AppError> {
        if let Some(name) = &body.name {
            require_text("name", name)?;
        }
        if let Some(color) = &body.color {
            require_text("color", color)?;
        }
        if let Some(weight) = body.weight {
            require_positive("weight", weight)?;
        }
        if let Some(height) = body.height {
            require_positive("height", height)?;
        }
        Ok(())
    }

    pub fn validate_sighting(body: &SightingRequest) -> Result<(), AppError> {
        require_text("location", &body.location)
    }

    pub fn validate_sighting_update(body: &UpdateSightingRequest) -> Result<(), AppError> {
        match &body.location {
            Some(location) => require_text("location", location),
            None => Ok(()),
        }
    }
}

fn require_text(field: &str, value: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{} must not be empty", field)));
    }
    Ok(())
}

fn require_positive(field: &str, value: f64) -> Result<(), AppError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(AppError::Validation(format!(
            "{} must be a positive number",
            field
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn robin() -> BirdRequest {
        BirdRequest {
            name: "American Robin".into(),
            color: "Red".into(),
            weight: 77.5,
            height: 25.0,
        }
    }

    #[test]
    fn accepts_a_complete_bird() {
        assert!(RequestValidator::validate_bird(&robin()).is_ok());
    }

    #[test]
    fn rejects_blank_text_and_non_positive_numbers() {
        let blank = BirdRequest {
            name: "  ".into(),
            ..robin()
        };
        assert!(matches!(
            RequestValidator::validate_bird(&blank),
            Err(AppError::Validation(m)) if m.contains("name")
        ));
        let zero = BirdRequest {
            weight: 0.0,
            ..robin()
        };
        assert!(RequestValidator::validate_bird(&zero).is_err());
        let nan = BirdRequest {
            height: f64::NAN,
            ..robin()
        };
        assert!(RequestValidator::validate_bird(&nan).is_err());
    }

    #[test]
    fn partial_updates_check_present_fields_only() {
        assert!(RequestValidator::validate_bird_update(&UpdateBirdRequest::default()).is_ok());
        let update = UpdateBirdRequest {
            weight: Some(-1.0),
            ..Default::default()
        };
        assert!(RequestValidator::validate_bird_update(&update).is_err());
        let update = UpdateSightingRequest {
            location: Some(String::new()),
            ..Default::default()
        };
        assert!(RequestValidator::validate_sighting_update(&update).is_err());
    }
}
