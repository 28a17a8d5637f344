use crate::error::SchemaError;
use crate::schema::BlockSchema;
use ahash::AHashMap;
use std::collections::VecDeque;

/// Orders field indices so that a field always comes after the field its visibility
/// condition reads. Ties keep declaration order. Fails on cyclic conditions.
pub(super) fn condition_order(
    schema: &BlockSchema,
    index: &AHashMap<String, usize>,
) -> Result<Vec<usize>, SchemaError> {
    let count = schema.fields.len();
    let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); count];
    let mut pending = vec![0usize; count];

    for (i, field) in schema.fields.iter().enumerate() {
        if let Some(condition) = &field.visibility_condition {
            if let Some(&dep) = index.get(&condition.on_field) {
                dependents[dep].push(i);
                pending[i] += 1;
            }
        }
    }

    let mut ready: VecDeque<usize> = (0..count).filter(|&i| pending[i] == 0).collect();
    let mut order = Vec::with_capacity(count);
    while let Some(i) = ready.pop_front() {
        order.push(i);
        for &next in &dependents[i] {
            pending[next] -= 1;
            if pending[next] == 0 {
                ready.push_back(next);
            }
        }
    }

    if order.len() < count {
        let start = (0..count).find(|&i| pending[i] > 0).unwrap_or(0);
        return Err(SchemaError::ConditionCycle {
            fields: trace_cycle(schema, index, start),
        });
    }
    Ok(order)
}

/// Walks condition references from `start` until a field repeats, returning the loop.
fn trace_cycle(schema: &BlockSchema, index: &AHashMap<String, usize>, start: usize) -> Vec<String> {
    let mut path: Vec<usize> = Vec::new();
    let mut current = start;
    loop {
        if let Some(pos) = path.iter().position(|&p| p == current) {
            let mut cycle: Vec<String> = path[pos..]
                .iter()
                .map(|&i| schema.fields[i].key.clone())
                .collect();
            cycle.push(schema.fields[current].key.clone());
            return cycle;
        }
        path.push(current);
        let next = schema.fields[current]
            .visibility_condition
            .as_ref()
            .and_then(|c| index.get(&c.on_field).copied());
        match next {
            Some(next) => current = next,
            None => return path.iter().map(|&i| schema.fields[i].key.clone()).collect(),
        }
    }
}
