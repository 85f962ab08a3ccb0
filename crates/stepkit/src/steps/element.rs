//! Element and page assertion steps.
//!
//! Every check runs inside [`World::should`], so the driver retries it
//! against fresh snapshots until it holds or the configured timeout elapses.

use crate::assertion::every_element;
use crate::driver::ElementHandle;
use crate::grammar::{NormalizedCondition, NormalizedValidation};
use crate::result::StepResult;
use crate::token::{LocatorToken, ValueToken};
use crate::value::{Callable, Value};
use crate::world::{require_elements, subject, World};

/// Concatenated text of every element
fn text_of(elements: &[ElementHandle]) -> Value {
    Value::String(elements.iter().map(|e| e.text_content.as_str()).collect())
}

fn first_or_undefined(elements: &[ElementHandle], read: impl Fn(&ElementHandle) -> Value) -> Value {
    elements.first().map_or(Value::Undefined, read)
}

fn elements_value(elements: &[ElementHandle]) -> Value {
    Value::Array(elements.iter().map(ElementHandle::to_value).collect())
}

/// Validate a value read from the locator's elements
fn expect_element_value(
    world: &mut World,
    locator: &LocatorToken,
    validation: &NormalizedValidation,
    expected: &ValueToken,
    read: &dyn Fn(&[ElementHandle]) -> StepResult<Value>,
) -> StepResult<()> {
    let locator = world.element(locator)?;
    let expected = world.value(expected)?;
    let result = world.should(&locator, &|elements| validation.validate(&read(elements)?, &expected));
    world.settle(validation, result)
}

/// Validate a page-level value
fn expect_page_value(
    world: &mut World,
    validation: &NormalizedValidation,
    expected: &ValueToken,
    read: &dyn Fn(&World) -> StepResult<String>,
) -> StepResult<()> {
    let expected = world.value(expected)?;
    let result = {
        let world = &*world;
        world.poll(&|| validation.validate(&Value::String(read(world)?), &expected))
    };
    world.settle(validation, result)
}

/// Validate a value read from each element in turn.
///
/// An empty collection fails like a missing element.
fn expect_every_element_value(
    world: &mut World,
    locator: &LocatorToken,
    validation: &NormalizedValidation,
    expected: &ValueToken,
    read: &dyn Fn(&ElementHandle) -> StepResult<Value>,
) -> StepResult<()> {
    let locator = world.element(locator)?;
    let expected = world.value(expected)?;
    let result = world.should(&locator, &|elements| {
        require_elements(&locator, elements)?;
        let values = elements.iter().map(read).collect::<StepResult<Vec<_>>>()?;
        every_element(&values, &expected, validation)
    });
    world.settle(validation, result)
}

fn callable(world: &World, token: &ValueToken) -> StepResult<Callable> {
    token.callable(world.memory())
}

/// `I expect {locator} {condition}`
pub fn expect_condition(world: &mut World, locator: &LocatorToken, condition: &NormalizedCondition) -> StepResult<()> {
    let locator = world.element(locator)?;
    let viewport = world.config().viewport;
    let name = subject(&locator);
    world.should(&locator, &|elements| condition.check(&name, elements, viewport))
}

/// `I expect every element in {locator} collection {condition}`
///
/// An empty collection fails like a missing element.
pub fn expect_every_element_condition(
    world: &mut World,
    locator: &LocatorToken,
    condition: &NormalizedCondition,
) -> StepResult<()> {
    let locator = world.element(locator)?;
    let viewport = world.config().viewport;
    let name = subject(&locator);
    world.should(&locator, &|elements| {
        require_elements(&locator, elements)?;
        elements
            .iter()
            .try_for_each(|element| condition.check(&name, std::slice::from_ref(element), viewport))
    })
}

/// `I expect text of {locator} {validation} {value}`
pub fn expect_text(
    world: &mut World,
    locator: &LocatorToken,
    validation: &NormalizedValidation,
    expected: &ValueToken,
) -> StepResult<()> {
    expect_element_value(world, locator, validation, expected, &|elements| Ok(text_of(elements)))
}

/// `I expect value of {locator} {validation} {value}`
pub fn expect_input_value(
    world: &mut World,
    locator: &LocatorToken,
    validation: &NormalizedValidation,
    expected: &ValueToken,
) -> StepResult<()> {
    expect_element_value(world, locator, validation, expected, &|elements| {
        Ok(first_or_undefined(elements, |e| e.property("value")))
    })
}

/// `I expect {value} property of {locator} {validation} {value}`
pub fn expect_property(
    world: &mut World,
    property: &ValueToken,
    locator: &LocatorToken,
    validation: &NormalizedValidation,
    expected: &ValueToken,
) -> StepResult<()> {
    let name = world.value(property)?.to_js_string();
    expect_element_value(world, locator, validation, expected, &|elements| {
        Ok(first_or_undefined(elements, |e| e.property(&name)))
    })
}

/// `I expect {value} attribute of {locator} {validation} {value}`
pub fn expect_attribute(
    world: &mut World,
    attribute: &ValueToken,
    locator: &LocatorToken,
    validation: &NormalizedValidation,
    expected: &ValueToken,
) -> StepResult<()> {
    let name = world.value(attribute)?.to_js_string();
    expect_element_value(world, locator, validation, expected, &|elements| {
        Ok(first_or_undefined(elements, |e| e.attribute(&name)))
    })
}

/// `I expect {value} custom property of {locator} {validation} {value}`
///
/// The function from memory receives every matched element.
pub fn expect_custom_property(
    world: &mut World,
    script: &ValueToken,
    locator: &LocatorToken,
    validation: &NormalizedValidation,
    expected: &ValueToken,
) -> StepResult<()> {
    let func = callable(world, script)?;
    expect_element_value(world, locator, validation, expected, &|elements| {
        func.call(&[elements_value(elements)])
    })
}

/// `I expect {value} css property of {locator} {validation} {value}`
pub fn expect_css_property(
    world: &mut World,
    property: &ValueToken,
    locator: &LocatorToken,
    validation: &NormalizedValidation,
    expected: &ValueToken,
) -> StepResult<()> {
    let name = world.value(property)?.to_js_string();
    expect_element_value(world, locator, validation, expected, &|elements| {
        Ok(first_or_undefined(elements, |e| e.css_property(&name)))
    })
}

/// `I expect number of elements in {locator} collection {validation} {value}`
pub fn expect_count(
    world: &mut World,
    locator: &LocatorToken,
    validation: &NormalizedValidation,
    expected: &ValueToken,
) -> StepResult<()> {
    expect_element_value(world, locator, validation, expected, &|elements| Ok(elements.len().into()))
}

/// `I expect current url {validation} {value}`
pub fn expect_current_url(world: &mut World, validation: &NormalizedValidation, expected: &ValueToken) -> StepResult<()> {
    expect_page_value(world, validation, expected, &|world| world.driver().current_url())
}

/// `I expect page title {validation} {value}`
pub fn expect_page_title(world: &mut World, validation: &NormalizedValidation, expected: &ValueToken) -> StepResult<()> {
    expect_page_value(world, validation, expected, &|world| world.driver().title())
}

/// `I expect text of alert {validation} {value}`
pub fn expect_alert_text(world: &mut World, validation: &NormalizedValidation, expected: &ValueToken) -> StepResult<()> {
    expect_page_value(world, validation, expected, &|world| world.driver().alert_text())
}

/// `I expect text of every element in {locator} collection {validation} {value}`
pub fn expect_every_text(
    world: &mut World,
    locator: &LocatorToken,
    validation: &NormalizedValidation,
    expected: &ValueToken,
) -> StepResult<()> {
    expect_every_element_value(world, locator, validation, expected, &|e| {
        Ok(Value::String(e.text_content.clone()))
    })
}

/// `I expect {value} attribute of every element in {locator} collection {validation} {value}`
pub fn expect_every_attribute(
    world: &mut World,
    attribute: &ValueToken,
    locator: &LocatorToken,
    validation: &NormalizedValidation,
    expected: &ValueToken,
) -> StepResult<()> {
    let name = world.value(attribute)?.to_js_string();
    expect_every_element_value(world, locator, validation, expected, &|e| Ok(e.attribute(&name)))
}

/// `I expect {value} property of every element in {locator} collection {validation} {value}`
pub fn expect_every_property(
    world: &mut World,
    property: &ValueToken,
    locator: &LocatorToken,
    validation: &NormalizedValidation,
    expected: &ValueToken,
) -> StepResult<()> {
    let name = world.value(property)?.to_js_string();
    expect_every_element_value(world, locator, validation, expected, &|e| Ok(e.property(&name)))
}

/// `I expect {value} custom property of every element in {locator} collection {validation} {value}`
pub fn expect_every_custom_property(
    world: &mut World,
    script: &ValueToken,
    locator: &LocatorToken,
    validation: &NormalizedValidation,
    expected: &ValueToken,
) -> StepResult<()> {
    let func = callable(world, script)?;
    expect_every_element_value(world, locator, validation, expected, &|e| func.call(&[e.to_value()]))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::driver::MockDriver;
    use crate::locator::BoundingRect;
    use crate::page_object::PageObject;
    use crate::result::StepError;

    const PAGE: &str = r##"
App:
  Header: h1
  Search: "#search"
  Submit: "button[type=submit]"
  Todo List:
    selector: "#todos"
    component: TodoList
  Banner: ".banner"
  Rows: tr
TodoList:
  Items: li
  Item:
    template: "li:nth-child({})"
"##;

    fn world() -> World {
        let driver = MockDriver::new()
            .with_url("https://example.test/todos?filter=all")
            .with_title("Todos")
            .with_alert("Are you sure?")
            .with_element(
                &["h1"],
                ElementHandle::new("h", "h1")
                    .with_text("Todos")
                    .with_css("color", "rgb(0, 0, 0)")
                    .with_rect(BoundingRect::new(0.0, 0.0, 200.0, 40.0)),
            )
            .with_element(&["#search"], ElementHandle::new("s", "input").with_value("milk"))
            .with_element(&["button[type=submit]"], ElementHandle::new("b", "button").disabled())
            .with_element(
                &["#todos", "li"],
                ElementHandle::new("t1", "li")
                    .with_text("Buy milk")
                    .with_attribute("class", "todo")
                    .with_property("checked", true),
            )
            .with_element(
                &["#todos", "li"],
                ElementHandle::new("t2", "li")
                    .with_text("Walk dog")
                    .with_attribute("class", "todo done")
                    .with_property("checked", true),
            )
            .with_element(
                &["#todos", "li:nth-child(2)"],
                ElementHandle::new("t2", "li").with_text("Walk dog"),
            )
            .with_element(&[".banner"], ElementHandle::new("x", "div").hidden());
        let mut world = World::new(PageObject::from_yaml_str(PAGE).unwrap(), Box::new(driver))
            .with_config(
                EngineConfig::new()
                    .with_viewport(800.0, 600.0)
                    .with_timeout_ms(20)
                    .with_poll_interval_ms(1),
            );
        world.memory_mut().register_fn("firstId", |args| Ok(args[0].property("0").property("id")));
        world.memory_mut().register_fn("upperText", |args| {
            Ok(Value::String(args[0].property("textContent").to_js_string().to_uppercase()))
        });
        world
    }

    fn v(phrase: &str) -> NormalizedValidation {
        NormalizedValidation::parse(phrase).unwrap()
    }

    fn c(phrase: &str) -> NormalizedCondition {
        NormalizedCondition::parse(phrase).unwrap()
    }

    fn t(raw: &str) -> ValueToken {
        ValueToken::new(raw)
    }

    fn l(raw: &str) -> LocatorToken {
        LocatorToken::new(raw)
    }

    mod condition_tests {
        use super::*;

        #[test]
        fn test_conditions() {
            let mut world = world();
            assert!(expect_condition(&mut world, &l("Header"), &c("to be visible")).is_ok());
            assert!(expect_condition(&mut world, &l("Header"), &c("to be in viewport")).is_ok());
            assert!(expect_condition(&mut world, &l("Submit"), &c("to be disabled")).is_ok());
            assert!(expect_condition(&mut world, &l("Banner"), &c("to be invisible")).is_ok());
            let err = expect_condition(&mut world, &l("Banner"), &c("to be visible")).unwrap_err();
            assert!(err.to_string().contains("'Banner' to be visible"));
        }

        #[test]
        fn test_every_element_condition() {
            let mut world = world();
            assert!(expect_every_element_condition(&mut world, &l("Todo List > Items"), &c("to be enabled")).is_ok());
            assert!(expect_every_element_condition(&mut world, &l("Todo List > Items"), &c("to be disabled")).is_err());
        }

        #[test]
        fn test_every_element_condition_on_empty_collection() {
            let mut world = world();
            let err = expect_every_element_condition(&mut world, &l("Rows"), &c("to be visible")).unwrap_err();
            assert_eq!(err.to_string(), "expected to find element 'Rows'");
        }

        #[test]
        fn test_unknown_alias() {
            let mut world = world();
            let err = expect_condition(&mut world, &l("Footer"), &c("to be visible")).unwrap_err();
            assert!(matches!(err, StepError::AliasNotFound { .. }));
        }
    }

    mod element_value_tests {
        use super::*;

        #[test]
        fn test_text() {
            let mut world = world();
            assert!(expect_text(&mut world, &l("Header"), &v("to equal"), &t("Todos")).is_ok());
            assert!(expect_text(&mut world, &l("Todo List > Items"), &v("to equal"), &t("Buy milkWalk dog")).is_ok());
            assert!(expect_text(&mut world, &l("Todo List > Item(2)"), &v("to contain"), &t("dog")).is_ok());
        }

        #[test]
        fn test_value_property_attribute_css() {
            let mut world = world();
            assert!(expect_input_value(&mut world, &l("Search"), &v("to equal"), &t("milk")).is_ok());
            assert!(expect_property(&mut world, &t("checked"), &l("Todo List > Items"), &v("to strictly equal"), &t("$truthy")).is_err());
            world.set_value("truthy", true);
            assert!(expect_property(&mut world, &t("checked"), &l("Todo List > Items"), &v("to strictly equal"), &t("$truthy")).is_ok());
            assert!(expect_attribute(&mut world, &t("class"), &l("Todo List > Items"), &v("to equal"), &t("todo")).is_ok());
            assert!(expect_css_property(&mut world, &t("color"), &l("Header"), &v("to equal"), &t("rgb(0, 0, 0)")).is_ok());
        }

        #[test]
        fn test_custom_property() {
            let mut world = world();
            assert!(expect_custom_property(&mut world, &t("$firstId"), &l("Todo List > Items"), &v("to equal"), &t("t1")).is_ok());
            let err = expect_custom_property(&mut world, &t("notAFunction"), &l("Header"), &v("to equal"), &t("x")).unwrap_err();
            assert!(matches!(err, StepError::Type { .. }));
        }

        #[test]
        fn test_count() {
            let mut world = world();
            assert!(expect_count(&mut world, &l("Todo List > Items"), &v("to equal"), &t("2")).is_ok());
            assert!(expect_count(&mut world, &l("Todo List > Items"), &v("to be above"), &t("2")).is_err());
        }

        #[test]
        fn test_soft_element_validation() {
            let mut world = world();
            expect_text(&mut world, &l("Header"), &v("to softly equal"), &t("Other")).unwrap();
            assert_eq!(world.soft_assertions().failure_count(), 1);
        }
    }

    mod page_tests {
        use super::*;

        #[test]
        fn test_url_title_alert() {
            let mut world = world();
            assert!(expect_current_url(&mut world, &v("to contain"), &t("filter=all")).is_ok());
            assert!(expect_page_title(&mut world, &v("to equal"), &t("Todos")).is_ok());
            assert!(expect_alert_text(&mut world, &v("to match"), &t("^Are you")).is_ok());
            assert!(expect_page_title(&mut world, &v("not to equal"), &t("Todos")).is_err());
        }
    }

    mod every_element_tests {
        use super::*;

        #[test]
        fn test_every_text_attribute_property() {
            let mut world = world();
            assert!(expect_every_text(&mut world, &l("Todo List > Items"), &v("to match"), &t("^[A-Z]")).is_ok());
            assert!(expect_every_attribute(&mut world, &t("class"), &l("Todo List > Items"), &v("to contain"), &t("todo")).is_ok());
            assert!(expect_every_attribute(&mut world, &t("class"), &l("Todo List > Items"), &v("to contain"), &t("done")).is_err());
            assert!(expect_every_property(&mut world, &t("tagName"), &l("Todo List > Items"), &v("to equal"), &t("LI")).is_ok());
        }

        #[test]
        fn test_every_custom_property() {
            let mut world = world();
            let err = expect_every_custom_property(
                &mut world,
                &t("$upperText"),
                &l("Todo List > Items"),
                &v("to equal"),
                &t("BUY MILK"),
            )
            .unwrap_err();
            assert_eq!(err.to_string(), "expected 'WALK DOG' to equal 'BUY MILK'");
        }

        #[test]
        fn test_every_element_on_empty_collection() {
            let mut world = world();
            let err = expect_every_text(&mut world, &l("Rows"), &v("to equal"), &t("x")).unwrap_err();
            assert_eq!(err.to_string(), "expected to find element 'Rows'");
            let err = expect_every_attribute(&mut world, &t("class"), &l("Rows"), &v("not to equal"), &t("x"))
                .unwrap_err();
            assert!(matches!(err, StepError::Assertion { .. }));
        }

        #[test]
        fn test_soft_every_element_on_empty_collection_is_recorded() {
            let mut world = world();
            expect_every_text(&mut world, &l("Rows"), &v("to softly equal"), &t("x")).unwrap();
            assert_eq!(world.soft_assertions().failure_count(), 1);
        }
    }
}
