//! Field aggregation across an inheritance hierarchy
//!
//! 1. Linearize the ancestry (C3, most derived first)
//! 2. Walk it from the most ancestral base to the type itself
//! 3. At each step merge the local fields (later wins), then apply removals
//!
//! A removal only affects what came before it: a closer ancestor may
//! declare the name again.

use std::sync::Arc;

use crate::schema::{FieldMapping, SchemaError, SchemaResult};

use super::declaration::LocalFields;
use super::record::TypeRecord;

/// C3 linearization of a new type over its bases.
///
/// Returns the ancestry with `local` first and the most ancestral type last.
///
/// # Errors
///
/// Returns a declaration error if no consistent order exists, which includes
/// listing the same base twice.
pub fn linearize(
    local: &Arc<LocalFields>,
    bases: &[Arc<TypeRecord>],
) -> SchemaResult<Vec<Arc<LocalFields>>> {
    let mut sequences: Vec<Vec<Arc<LocalFields>>> =
        bases.iter().map(|base| base.ancestry().to_vec()).collect();
    sequences.push(bases.iter().map(|base| Arc::clone(base.local())).collect());

    let mut result = vec![Arc::clone(local)];

    loop {
        sequences.retain(|seq| !seq.is_empty());
        if sequences.is_empty() {
            return Ok(result);
        }

        let next = sequences
            .iter()
            .map(|seq| &seq[0])
            .find(|&head| {
                !sequences
                    .iter()
                    .any(|seq| seq[1..].iter().any(|item| Arc::ptr_eq(item, head)))
            })
            .cloned();

        let next = match next {
            Some(next) => next,
            None => {
                let names: Vec<&str> = bases.iter().map(|b| b.name()).collect();
                return Err(SchemaError::declaration_failed(format!(
                    "Cannot build a consistent ancestry for '{}' from bases [{}]",
                    local.type_name(),
                    names.join(", ")
                ))
                .with_type_name(local.type_name()));
            }
        };

        for seq in sequences.iter_mut() {
            if Arc::ptr_eq(&seq[0], &next) {
                seq.remove(0);
            }
        }
        result.push(next);
    }
}

/// Merge an ancestry into one flat field mapping.
///
/// `ancestry` is ordered most derived first, as returned by [`linearize`].
/// With `strict_removals`, the type itself may only remove names that some
/// ancestor actually provides.
pub fn aggregate(ancestry: &[Arc<LocalFields>], strict_removals: bool) -> SchemaResult<FieldMapping> {
    let mut fields = FieldMapping::new();
    let last = ancestry.len().saturating_sub(1);

    for (depth, layer) in ancestry.iter().rev().enumerate() {
        for (name, descriptor) in layer.declared() {
            fields.insert(name.clone(), descriptor.clone());
        }

        for name in layer.removed() {
            let existed = fields.remove(name).is_some();
            if !existed && strict_removals && depth == last {
                return Err(SchemaError::declaration_failed(format!(
                    "'{}' removes field '{}' but no ancestor declares it",
                    layer.type_name(),
                    name
                ))
                .with_type_name(layer.type_name()));
            }
        }
    }

    Ok(fields)
}
