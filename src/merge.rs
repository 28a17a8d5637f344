use crate::compiler::CompiledBlock;
use crate::value::Value;
use ahash::AHashMap;
use indexmap::{IndexMap, IndexSet};

/// Collapses alias fields into one value per output parameter.
///
/// `values` holds the coerced value of each field, keyed by field key. For every
/// output key the first active field in declaration order whose value is non-blank
/// wins; fields without a canonical key pass through under their own key. Parameters
/// with no usable value are left out. The result follows declaration order.
pub fn merge_aliases(
    block: &CompiledBlock,
    active: &IndexSet<String>,
    values: &AHashMap<String, Value>,
) -> IndexMap<String, Value> {
    let fields = block.fields();
    block
        .groups()
        .iter()
        .filter_map(|(output_key, members)| {
            members
                .iter()
                .map(|&i| &fields[i].key)
                .filter(|key| active.contains(*key))
                .find_map(|key| values.get(key).filter(|v| !v.is_blank()))
                .map(|winner| (output_key.clone(), winner.clone()))
        })
        .collect()
}
