use crate::compiler::CompiledBlock;
use crate::condition;
use crate::value::RawInputMap;
use indexmap::IndexSet;
use tracing::trace;

/// Computes the set of currently active field keys, in declaration order.
///
/// Unconditional fields are always active. A conditional field is active when its
/// condition holds against `values`. When the condition reads another conditional
/// field, that field must itself be active; fields are visited in the compiled
/// dependency order so this is decided in one pass.
pub fn resolve_active_fields(block: &CompiledBlock, values: &RawInputMap) -> IndexSet<String> {
    let fields = block.fields();
    let mut active = vec![false; fields.len()];

    for &i in block.evaluation_order() {
        let field = &fields[i];
        active[i] = match &field.visibility_condition {
            None => true,
            Some(condition) => {
                let dependency_active = block
                    .field_index(&condition.on_field)
                    .map(|dep| fields[dep].visibility_condition.is_none() || active[dep])
                    .unwrap_or(false);
                dependency_active && condition::evaluate(condition, values)
            }
        };
    }

    let keys: IndexSet<String> = fields
        .iter()
        .zip(&active)
        .filter(|(_, on)| **on)
        .map(|(f, _)| f.key.clone())
        .collect();

    trace!(
        block = block.block_type(),
        active = keys.len(),
        total = fields.len(),
        "resolved active fields"
    );
    keys
}
