use crate::config::PricingConfig;
use crate::pricing::models::{PricingModel, PricingStrategy, Tier};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

/// Invalid pricing catalog configuration
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("pricing catalog contains no models")]
    Empty,

    #[error("duplicate pricing model id '{0}'")]
    DuplicateId(String),

    #[error("pricing model '{0}' has no tiers")]
    NoTiers(String),

    #[error("flat-rate pricing model '{model}' must have exactly one tier, found {count}")]
    FlatRateTierCount { model: String, count: usize },

    #[error("pricing model '{model}' has a negative or non-finite {field}")]
    InvalidAmount { model: String, field: String },

    #[error("tier '{tier}' of pricing model '{model}' ends before it starts")]
    InvertedTier { model: String, tier: String },

    #[error("only the last tier of pricing model '{model}' may be unbounded, but '{tier}' is")]
    UnboundedBeforeLast { model: String, tier: String },

    #[error(
        "tiers of pricing model '{model}' are not contiguous: '{previous}' ends at {end}, '{next}' starts at {start}"
    )]
    NotContiguous {
        model: String,
        previous: String,
        end: u64,
        next: String,
        start: u64,
    },

    #[error("failed to read pricing catalog {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse pricing catalog: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Immutable table of pricing models, built once at start-up
#[derive(Debug, Clone)]
pub struct PricingCatalog {
    models: Vec<PricingModel>,
}

impl PricingCatalog {
    /// Build a catalog, rejecting models that break tier invariants
    pub fn new(models: Vec<PricingModel>) -> Result<Self, CatalogError> {
        if models.is_empty() {
            return Err(CatalogError::Empty);
        }

        let mut seen = HashSet::new();
        for model in &models {
            if !seen.insert(model.id.as_str()) {
                return Err(CatalogError::DuplicateId(model.id.clone()));
            }
            validate_model(model)?;
        }

        Ok(Self { models })
    }

    /// The demo catalog: per-unit, tiered and hybrid
    pub fn builtin() -> Self {
        Self {
            models: builtin_models(),
        }
    }

    /// Parse a JSON array of models
    pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
        let models: Vec<PricingModel> = serde_json::from_str(json)?;
        Self::new(models)
    }

    pub fn from_file(path: &Path) -> Result<Self, CatalogError> {
        let content = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&content)
    }

    /// Load the catalog named by configuration, falling back to the built-in one
    pub fn load(config: &PricingConfig) -> Result<Self, CatalogError> {
        let catalog = match &config.catalog_path {
            Some(path) => {
                let catalog = Self::from_file(path)?;
                info!(path = %path.display(), models = catalog.len(), "Loaded pricing catalog");
                catalog
            }
            None => {
                let catalog = Self::builtin();
                info!(models = catalog.len(), "Using built-in pricing catalog");
                catalog
            }
        };

        Ok(catalog)
    }

    /// Look up a model by id
    pub fn get(&self, id: &str) -> Option<&PricingModel> {
        self.models.iter().find(|model| model.id == id)
    }

    pub fn models(&self) -> &[PricingModel] {
        &self.models
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

/// Check a single model against the tier invariants
pub fn validate_model(model: &PricingModel) -> Result<(), CatalogError> {
    if model.tiers.is_empty() {
        return Err(CatalogError::NoTiers(model.id.clone()));
    }

    check_amount(model, "base_price", model.base_price)?;
    for tier in &model.tiers {
        check_amount(model, &format!("price_per_unit of tier '{}'", tier.name), tier.price_per_unit)?;
        check_amount(model, &format!("flat_fee of tier '{}'", tier.name), tier.flat_fee)?;

        if let Some(end) = tier.end_quantity {
            if end < tier.start_quantity {
                return Err(CatalogError::InvertedTier {
                    model: model.id.clone(),
                    tier: tier.name.clone(),
                });
            }
        }
    }

    match model.strategy {
        PricingStrategy::FlatRate => {
            if model.tiers.len() != 1 {
                return Err(CatalogError::FlatRateTierCount {
                    model: model.id.clone(),
                    count: model.tiers.len(),
                });
            }
        }
        PricingStrategy::Tiered | PricingStrategy::Hybrid => check_contiguous(model)?,
    }

    Ok(())
}

fn check_amount(model: &PricingModel, field: &str, value: f64) -> Result<(), CatalogError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(CatalogError::InvalidAmount {
            model: model.id.clone(),
            field: field.to_string(),
        })
    }
}

fn check_contiguous(model: &PricingModel) -> Result<(), CatalogError> {
    for pair in model.tiers.windows(2) {
        let (previous, next) = (&pair[0], &pair[1]);

        let Some(end) = previous.end_quantity else {
            return Err(CatalogError::UnboundedBeforeLast {
                model: model.id.clone(),
                tier: previous.name.clone(),
            });
        };

        if end.checked_add(1) != Some(next.start_quantity) {
            return Err(CatalogError::NotContiguous {
                model: model.id.clone(),
                previous: previous.name.clone(),
                end,
                next: next.name.clone(),
                start: next.start_quantity,
            });
        }
    }

    Ok(())
}

fn builtin_models() -> Vec<PricingModel> {
    vec![
        PricingModel {
            id: "per-unit".to_string(),
            name: "Per Unit".to_string(),
            description: "Fixed price per unit of usage".to_string(),
            strategy: PricingStrategy::FlatRate,
            base_price: 10.0,
            tiers: vec![Tier {
                id: 1,
                name: "All Units".to_string(),
                start_quantity: 0,
                end_quantity: None,
                price_per_unit: 0.01,
                flat_fee: 0.0,
            }],
        },
        PricingModel {
            id: "tiered".to_string(),
            name: "Tiered".to_string(),
            description: "Different rates for different usage volumes".to_string(),
            strategy: PricingStrategy::Tiered,
            base_price: 0.0,
            tiers: vec![
                Tier {
                    id: 1,
                    name: "Tier 1".to_string(),
                    start_quantity: 0,
                    end_quantity: Some(1000),
                    price_per_unit: 0.02,
                    flat_fee: 0.0,
                },
                Tier {
                    id: 2,
                    name: "Tier 2".to_string(),
                    start_quantity: 1001,
                    end_quantity: Some(10000),
                    price_per_unit: 0.01,
                    flat_fee: 0.0,
                },
                Tier {
                    id: 3,
                    name: "Tier 3".to_string(),
                    start_quantity: 10001,
                    end_quantity: None,
                    price_per_unit: 0.005,
                    flat_fee: 0.0,
                },
            ],
        },
        PricingModel {
            id: "hybrid".to_string(),
            name: "Hybrid".to_string(),
            description: "Base fee plus usage-based charges".to_string(),
            strategy: PricingStrategy::Hybrid,
            base_price: 49.99,
            tiers: vec![
                Tier {
                    id: 1,
                    name: "Included".to_string(),
                    start_quantity: 0,
                    end_quantity: Some(5000),
                    price_per_unit: 0.0,
                    flat_fee: 0.0,
                },
                Tier {
                    id: 2,
                    name: "Overage".to_string(),
                    start_quantity: 5001,
                    end_quantity: None,
                    price_per_unit: 0.008,
                    flat_fee: 0.0,
                },
            ],
        },
    ]
}
