//! Steps that save page state into memory.

use crate::driver::ElementHandle;
use crate::locator::BoundingRect;
use crate::result::StepResult;
use crate::token::{LocatorToken, ValueToken};
use crate::value::Value;
use crate::world::World;

fn first_elements(world: &World, locator: &LocatorToken) -> StepResult<Vec<ElementHandle>> {
    let locator = world.element(locator)?;
    world.elements(&locator)
}

fn rect_value(rect: BoundingRect) -> Value {
    Value::object([
        ("x", Value::Number(rect.left)),
        ("y", Value::Number(rect.top)),
        ("top", Value::Number(rect.top)),
        ("left", Value::Number(rect.left)),
        ("right", Value::Number(rect.right)),
        ("bottom", Value::Number(rect.bottom)),
        ("width", Value::Number(rect.width())),
        ("height", Value::Number(rect.height())),
    ])
}

/// `I save text of {locator} as {value}`
pub fn save_text(world: &mut World, locator: &LocatorToken, key: &ValueToken) -> StepResult<()> {
    let elements = first_elements(world, locator)?;
    let text: String = elements.iter().map(|e| e.text_content.as_str()).collect();
    key.set(world.memory_mut(), text);
    Ok(())
}

/// `I save {value} property of {locator} as {value}`
pub fn save_property(
    world: &mut World,
    property: &ValueToken,
    locator: &LocatorToken,
    key: &ValueToken,
) -> StepResult<()> {
    let name = world.value(property)?.to_js_string();
    let elements = first_elements(world, locator)?;
    let value = elements.first().map_or(Value::Undefined, |e| e.property(&name));
    key.set(world.memory_mut(), value);
    Ok(())
}

/// `I save {value} attribute of {locator} as {value}`
pub fn save_attribute(
    world: &mut World,
    attribute: &ValueToken,
    locator: &LocatorToken,
    key: &ValueToken,
) -> StepResult<()> {
    let name = world.value(attribute)?.to_js_string();
    let elements = first_elements(world, locator)?;
    let value = elements.first().map_or(Value::Undefined, |e| e.attribute(&name));
    key.set(world.memory_mut(), value);
    Ok(())
}

/// `I save {value} css property of {locator} as {value}`
pub fn save_css_property(
    world: &mut World,
    property: &ValueToken,
    locator: &LocatorToken,
    key: &ValueToken,
) -> StepResult<()> {
    let name = world.value(property)?.to_js_string();
    let elements = first_elements(world, locator)?;
    let value = elements.first().map_or(Value::Undefined, |e| e.css_property(&name));
    key.set(world.memory_mut(), value);
    Ok(())
}

/// `I save number of elements in {locator} collection as {value}`
///
/// An empty collection saves zero.
pub fn save_count(world: &mut World, locator: &LocatorToken, key: &ValueToken) -> StepResult<()> {
    let locator = world.element(locator)?;
    let count = world.driver().query(&locator)?.len();
    key.set(world.memory_mut(), count);
    Ok(())
}

/// `I save text of every element of {locator} collection as {value}`
pub fn save_every_text(world: &mut World, locator: &LocatorToken, key: &ValueToken) -> StepResult<()> {
    let elements = first_elements(world, locator)?;
    let texts: Vec<Value> = elements.iter().map(|e| Value::String(e.text_content.clone())).collect();
    key.set(world.memory_mut(), texts);
    Ok(())
}

/// `I save {value} attribute of every element of {locator} collection as {value}`
pub fn save_every_attribute(
    world: &mut World,
    attribute: &ValueToken,
    locator: &LocatorToken,
    key: &ValueToken,
) -> StepResult<()> {
    let name = world.value(attribute)?.to_js_string();
    let elements = first_elements(world, locator)?;
    let values: Vec<Value> = elements.iter().map(|e| e.attribute(&name)).collect();
    key.set(world.memory_mut(), values);
    Ok(())
}

/// `I save {value} property of every element of {locator} collection as {value}`
pub fn save_every_property(
    world: &mut World,
    property: &ValueToken,
    locator: &LocatorToken,
    key: &ValueToken,
) -> StepResult<()> {
    let name = world.value(property)?.to_js_string();
    let elements = first_elements(world, locator)?;
    let values: Vec<Value> = elements.iter().map(|e| e.property(&name)).collect();
    key.set(world.memory_mut(), values);
    Ok(())
}

/// `I save current url as {value}`
pub fn save_current_url(world: &mut World, key: &ValueToken) -> StepResult<()> {
    let url = world.driver().current_url()?;
    key.set(world.memory_mut(), url);
    Ok(())
}

/// `I save page title as {value}`
pub fn save_title(world: &mut World, key: &ValueToken) -> StepResult<()> {
    let title = world.driver().title()?;
    key.set(world.memory_mut(), title);
    Ok(())
}

/// `I save bounding rect of {locator} as {value}`
///
/// An element that is not rendered reports an all-zero rect.
pub fn save_bounding_rect(world: &mut World, locator: &LocatorToken, key: &ValueToken) -> StepResult<()> {
    let elements = first_elements(world, locator)?;
    let rect = elements
        .first()
        .and_then(|e| e.bounding_rect)
        .unwrap_or_default();
    key.set(world.memory_mut(), rect_value(rect));
    Ok(())
}
