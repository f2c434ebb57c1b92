//! Default and environment resolution.
//!
//! Runs before the argument pass and writes every field of the record, so
//! the pass only ever layers explicit values on top. Operates on a
//! pre-captured [`EnvSnapshot`]; no I/O happens here. Per field:
//!
//! 1. Reset to the zero value
//! 2. Apply declared defaults in order (sequences and maps accumulate)
//! 3. If the bound variable is set, replace the value with the environment
//!    value, split on the field's delimiter when it has one
//!
//! Default and environment literals are used as-is; unquoting only applies
//! to command-line values.

use tracing::debug;

use crate::env::EnvSnapshot;
use crate::error::FlagfigError;
use crate::schema::Schema;

/// Fill `target` from defaults and the environment.
///
/// Returns, per field id, whether the environment supplied its value.
pub(crate) fn resolve<C: 'static>(
    schema: &Schema<C>,
    target: &mut C,
    env: &EnvSnapshot,
) -> Result<Vec<bool>, FlagfigError> {
    let mut from_env = vec![false; schema.fields.len()];

    for (id, entry) in schema.fields.iter().enumerate() {
        let field = &entry.field;
        field.reset(target);
        for literal in &field.spec.defaults {
            field.assign(target, literal, &entry.flag)?;
        }

        let Some(raw) = field.spec.env.as_deref().and_then(|name| env.get(name)) else {
            continue;
        };
        debug!(flag = %entry.flag, "using environment value");

        if field.kind().is_collection() {
            field.reset(target);
            match field.spec.env_delim {
                Some(delim) => {
                    for part in raw.split(delim) {
                        field.assign(target, part, &entry.flag)?;
                    }
                }
                None => field.assign(target, raw, &entry.flag)?,
            }
        } else {
            field.assign(target, raw, &entry.flag)?;
        }
        from_env[id] = true;
    }
    Ok(from_env)
}
