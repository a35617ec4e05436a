//! Type Registry: per-catalog configuration records.

use crate::error::{DimError, Result};
use crate::model::{normalize_code, DimensionType, TypeSpec};
use crate::store::DataStore;
use tracing::info;

use super::helpers::{clean_name, resolve_type};

fn validate_spec(spec: &TypeSpec) -> Result<TypeSpec> {
    let code = normalize_code(&spec.code);
    if code.is_empty() {
        return Err(DimError::validation("Dimension type code must not be blank"));
    }
    if spec.max_depth == 0 {
        return Err(DimError::validation("Max depth must be positive"));
    }
    Ok(TypeSpec {
        code,
        name: clean_name(&spec.name)?,
        ..spec.clone()
    })
}

pub fn create<S: DataStore>(store: &mut S, spec: &TypeSpec, actor: &str) -> Result<DimensionType> {
    let spec = validate_spec(spec)?;
    let dim_type = DimensionType::from_spec(spec, actor);
    store.insert_type(&dim_type)?;
    info!("Registered dimension type {}", dim_type.code);
    Ok(dim_type)
}

/// Replace everything but the code and creation audit fields.
pub fn update<S: DataStore>(
    store: &mut S,
    code: &str,
    spec: &TypeSpec,
    actor: &str,
) -> Result<DimensionType> {
    let mut existing = resolve_type(store, code)?;
    let spec = validate_spec(spec)?;
    if spec.code != existing.code {
        return Err(DimError::validation("Dimension type code cannot be changed"));
    }

    existing.name = spec.name;
    existing.description = spec.description;
    existing.hierarchical = spec.hierarchical;
    existing.max_depth = spec.max_depth;
    existing.entry_behavior = spec.entry_behavior;
    existing.updated_at = chrono::Utc::now();
    existing.updated_by = actor.to_string();

    store.replace_type(&existing)?;
    info!("Updated dimension type {}", existing.code);
    Ok(existing)
}

pub fn get<S: DataStore>(store: &S, code: &str) -> Result<DimensionType> {
    resolve_type(store, code)
}

pub fn list<S: DataStore>(store: &S) -> Result<Vec<DimensionType>> {
    store.list_types()
}
