//! Step definitions.
//!
//! Each function is the body of one step phrase. Arguments arrive already
//! transformed by [`crate::params::transform`]; the host runner owns the
//! phrase-to-function registration.

pub mod element;
pub mod memory;
pub mod validation;

use crate::result::{StepError, StepResult};
use crate::token::ValueToken;
use crate::value::Value;
use crate::world::World;

/// Raw cells of a Gherkin data table
pub type DataTable = [Vec<String>];

/// Resolve the first cell of every row as a value token
pub fn data_table_to_array(world: &World, table: &DataTable) -> StepResult<Vec<Value>> {
    table
        .iter()
        .filter_map(|row| row.first())
        .map(|cell| world.value(&ValueToken::new(cell)))
        .collect()
}

/// Resolve a token that must hold an array
pub(crate) fn array_value(world: &World, token: &ValueToken, message: &str) -> StepResult<Vec<Value>> {
    match world.value(token)? {
        Value::Array(items) => Ok(items),
        _ => Err(StepError::type_error(message.replace("{}", token.expression()))),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::driver::MockDriver;
    use crate::page_object::PageObject;

    #[test]
    fn test_data_table_cells_are_resolved() {
        let mut world = World::new(PageObject::new(), Box::new(MockDriver::new()));
        world.set_value("price", 11.99);
        let table = vec![vec!["free".to_string()], vec!["$price".to_string()], vec![]];
        let values = data_table_to_array(&world, &table).unwrap();
        assert_eq!(values, vec![Value::from("free"), Value::from(11.99)]);
    }
}
