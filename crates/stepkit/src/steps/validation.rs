//! Value validation steps.

use super::{array_value, data_table_to_array, DataTable};
use crate::assertion::{all_of, any_of, at_least_n, every_element, sorted_by};
use crate::grammar::NormalizedValidation;
use crate::result::StepResult;
use crate::token::ValueToken;
use crate::world::World;

/// `I expect {value} {validation} {value}`
pub fn expect_value(
    world: &mut World,
    actual: &ValueToken,
    validation: &NormalizedValidation,
    expected: &ValueToken,
) -> StepResult<()> {
    let actual = world.value(actual)?;
    let expected = world.value(expected)?;
    world.validate(validation, &actual, &expected)
}

/// `I expect at least {int} element(s) in {value} array {validation} {value}`
pub fn expect_at_least_n(
    world: &mut World,
    n: usize,
    array: &ValueToken,
    validation: &NormalizedValidation,
    expected: &ValueToken,
) -> StepResult<()> {
    let values = array_value(world, array, "'{}' is not an array")?;
    let expected = world.value(expected)?;
    let result = at_least_n(n, &values, &expected, validation);
    world.settle(validation, result)
}

/// `I expect every element in {value} array {validation} {value}`
pub fn expect_every_element(
    world: &mut World,
    array: &ValueToken,
    validation: &NormalizedValidation,
    expected: &ValueToken,
) -> StepResult<()> {
    let values = array_value(world, array, "'{}' is not an array")?;
    let expected = world.value(expected)?;
    let result = every_element(&values, &expected, validation);
    world.settle(validation, result)
}

/// `I expect {value} array to be sorted by {value}`
pub fn expect_sorted_by(world: &mut World, array: &ValueToken, comparator: &ValueToken) -> StepResult<()> {
    let values = world.value(array)?;
    let compare = world.value(comparator)?;
    sorted_by(&values, array.expression(), &compare, comparator.expression())
}

/// `I expect {value} array {validation}:` with a single-column table
pub fn expect_array_table(
    world: &mut World,
    array: &ValueToken,
    validation: &NormalizedValidation,
    table: &DataTable,
) -> StepResult<()> {
    let actual = world.value(array)?;
    let members = data_table_to_array(world, table)?;
    world.validate(validation, &actual, &members.into())
}

/// `I expect {value} {validation} at least one of {value}`
pub fn expect_any_of(
    world: &mut World,
    actual: &ValueToken,
    validation: &NormalizedValidation,
    expected: &ValueToken,
) -> StepResult<()> {
    let actual = world.value(actual)?;
    let candidates = array_value(world, expected, "'{}' parameter is not an array")?;
    let result = any_of(&actual, &candidates, validation);
    world.settle(validation, result)
}

/// `I expect {value} {validation} at least one of:` with a single-column table
pub fn expect_any_of_table(
    world: &mut World,
    actual: &ValueToken,
    validation: &NormalizedValidation,
    table: &DataTable,
) -> StepResult<()> {
    let actual = world.value(actual)?;
    let candidates = data_table_to_array(world, table)?;
    let result = any_of(&actual, &candidates, validation);
    world.settle(validation, result)
}

/// `I expect {value} {validation} all of {value}`
pub fn expect_all_of(
    world: &mut World,
    actual: &ValueToken,
    validation: &NormalizedValidation,
    expected: &ValueToken,
) -> StepResult<()> {
    let actual = world.value(actual)?;
    let candidates = array_value(world, expected, "'{}' parameter is not an array")?;
    let result = all_of(&actual, &candidates, validation, world.config().all_of_mode);
    world.settle(validation, result)
}

/// `I expect {value} {validation} all of:` with a single-column table
pub fn expect_all_of_table(
    world: &mut World,
    actual: &ValueToken,
    validation: &NormalizedValidation,
    table: &DataTable,
) -> StepResult<()> {
    let actual = world.value(actual)?;
    let candidates = data_table_to_array(world, table)?;
    let result = all_of(&actual, &candidates, validation, world.config().all_of_mode);
    world.settle(validation, result)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::assertion::AllOfMode;
    use crate::config::EngineConfig;
    use crate::driver::MockDriver;
    use crate::memory::Memory;
    use crate::page_object::PageObject;
    use crate::result::StepError;
    use crate::value::Value;

    fn world() -> World {
        let memory = Memory::from_yaml_str(
            r"
plans: [paid, free, trial]
prices: [1, 2, 30, 40]
letters: [a, a, a]
sortedNums: [1, 2, 3]
notArray: text
",
        )
        .unwrap();
        let mut world = World::new(PageObject::new(), Box::new(MockDriver::new())).with_memory(memory);
        world.memory_mut().register_fn("asc", |args| {
            Ok(Value::Number(args[0].to_number() - args[1].to_number()))
        });
        world
    }

    fn v(phrase: &str) -> NormalizedValidation {
        NormalizedValidation::parse(phrase).unwrap()
    }

    fn t(raw: &str) -> ValueToken {
        ValueToken::new(raw)
    }

    fn table(cells: &[&str]) -> Vec<Vec<String>> {
        cells.iter().map(|c| vec![(*c).to_string()]).collect()
    }

    mod simple_tests {
        use super::*;

        #[test]
        fn test_expect_value() {
            let mut world = world();
            world.set_value("count", 5);
            assert!(expect_value(&mut world, &t("$count"), &v("equals"), &t("5")).is_ok());
            assert!(expect_value(&mut world, &t("$count"), &v("to strictly equal"), &t("5")).is_err());
            assert!(expect_value(&mut world, &t("$count"), &v("is greater than"), &t("4")).is_ok());
        }

        #[test]
        fn test_soft_value_validation() {
            let mut world = world();
            expect_value(&mut world, &t("a"), &v("to softly equal"), &t("b")).unwrap();
            assert!(world.verify_soft().is_err());
        }
    }

    mod array_tests {
        use super::*;

        #[test]
        fn test_at_least_n() {
            let mut world = world();
            assert!(expect_at_least_n(&mut world, 2, &t("$prices"), &v("to be above"), &t("10")).is_ok());
            assert!(expect_at_least_n(&mut world, 3, &t("$prices"), &v("to be above"), &t("10")).is_err());
        }

        #[test]
        fn test_every_element() {
            let mut world = world();
            assert!(expect_every_element(&mut world, &t("$letters"), &v("to equal"), &t("a")).is_ok());
            let err = expect_every_element(&mut world, &t("$notArray"), &v("to equal"), &t("a")).unwrap_err();
            assert_eq!(err.to_string(), "'$notArray' is not an array");
        }

        #[test]
        fn test_sorted_by() {
            let mut world = world();
            assert!(expect_sorted_by(&mut world, &t("$sortedNums"), &t("$asc")).is_ok());
            assert!(expect_sorted_by(&mut world, &t("$prices"), &t("$asc")).is_ok());
            let err = expect_sorted_by(&mut world, &t("$plans"), &t("$missingFn")).unwrap_err();
            assert!(matches!(err, StepError::Resolution { .. }));
        }

        #[test]
        fn test_members_from_table() {
            let mut world = world();
            let members = table(&["trial", "paid", "free"]);
            assert!(expect_array_table(&mut world, &t("$plans"), &v("to have members"), &members).is_ok());
            let subset = table(&["free"]);
            assert!(expect_array_table(&mut world, &t("$plans"), &v("to include members"), &subset).is_ok());
            assert!(expect_array_table(&mut world, &t("$plans"), &v("to have members"), &subset).is_err());
        }
    }

    mod set_tests {
        use super::*;

        #[test]
        fn test_any_of() {
            let mut world = world();
            assert!(expect_any_of(&mut world, &t("free"), &v("to equal"), &t("$plans")).is_ok());
            let err = expect_any_of(&mut world, &t("free"), &v("to equal"), &t("$notArray")).unwrap_err();
            assert_eq!(err.to_string(), "'$notArray' parameter is not an array");
        }

        #[test]
        fn test_any_of_table() {
            let mut world = world();
            let candidates = table(&["paid", "trial"]);
            let err = expect_any_of_table(&mut world, &t("free"), &v("to equal"), &candidates).unwrap_err();
            assert_eq!(err.to_string().lines().count(), 2);
        }

        #[test]
        fn test_all_of_follows_configured_mode() {
            let mut world = world();
            let candidates = table(&["free", "paid"]);
            assert!(expect_all_of_table(&mut world, &t("free"), &v("to equal"), &candidates).is_ok());

            let mut strict = world.with_config(EngineConfig::new().with_all_of_mode(AllOfMode::Every));
            assert!(expect_all_of_table(&mut strict, &t("free"), &v("to equal"), &candidates).is_err());
            assert!(expect_all_of(&mut strict, &t("free"), &v("not to equal"), &t("$letters")).is_ok());
        }
    }
}
