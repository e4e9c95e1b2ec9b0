pub mod health;
pub mod pricing;
pub mod usage;

use std::sync::Arc;

use crate::error::AppError;
use crate::metering::MeteringBackend;
use crate::pricing::CostCalculator;

/// State shared by the API handlers
#[derive(Clone)]
pub struct AppState {
    pub calculator: Arc<CostCalculator>,
    pub metering: Arc<dyn MeteringBackend>,
}

impl AppState {
    pub fn new(calculator: Arc<CostCalculator>, metering: Arc<dyn MeteringBackend>) -> Self {
        Self {
            calculator,
            metering,
        }
    }
}

/// Reject quantities that are negative, NaN or infinite
pub(crate) fn validate_quantity(field: &str, value: f64) -> Result<f64, AppError> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(AppError::ValidationError(format!(
            "{} must be a non-negative number",
            field
        )))
    }
}
