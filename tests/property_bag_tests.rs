mod common;

use common::*;
use sovran_propbag::{
    KeyComparer, PropertyBag, PropertyDescriptor, PropertyError, RawValue, StringSet,
    TypedPropertyBag,
};
use std::sync::atomic::{AtomicUsize, Ordering};

#[test]
fn test_try_convert_from_string() -> Result<(), PropertyError> {
    let mut bag = PropertyBag::new();
    bag.set("TestValue", Some("15"));

    assert_eq!(bag.try_get_property::<i32>("TestValue")?, Some(15));
    Ok(())
}

#[test]
fn test_no_cache() -> Result<(), PropertyError> {
    let mut bag = PropertyBag::new();

    let value = bag.get_property_with(&TEST_ENUM_OPTION_TWO, false)?;

    assert_eq!(value, TEST_ENUM_OPTION_TWO.default_value());
    assert_eq!(bag.len(), 0);
    Ok(())
}

#[test]
fn test_cached_default_is_not_counted() -> Result<(), PropertyError> {
    let mut bag = PropertyBag::new();

    assert_eq!(bag.get_property(&TEST_ENUM_OPTION_TWO)?, TestEnum::ValueTwo);
    assert_eq!(bag.len(), 0);
    assert_eq!(bag.get_property(&TEST_ENUM_OPTION_TWO)?, TestEnum::ValueTwo);
    assert_eq!(bag.len(), 0);
    assert!(!bag.contains_key(&TEST_ENUM_OPTION_TWO.key()));
    Ok(())
}

#[test]
fn test_typed_property_bag_no_cache() -> Result<(), PropertyError> {
    let mut bag = TestEnumPropertyBag::new();

    let value = bag.get_property_with(&TEST_ENUM_OPTION_TWO, false)?;

    assert_eq!(value, TEST_ENUM_OPTION_TWO.default_value());
    assert_eq!(bag.len(), 0);
    Ok(())
}

#[test]
fn test_initialize_from_property_bag() -> Result<(), PropertyError> {
    let expected = 72;
    let mut bag = PropertyBag::new();
    bag.set("TestValue", Some(expected.to_string().as_str()));

    let copied = PropertyBag::copy_with_comparer(&bag, KeyComparer::OrdinalIgnoreCase);

    assert_eq!(bag.try_get_property::<i32>("TestValue")?, Some(expected));
    assert_eq!(bag.try_get_property::<i32>("testvalue")?, None);

    assert_eq!(copied.try_get_property::<i32>("TestValue")?, Some(expected));
    assert_eq!(copied.try_get_property::<i32>("testvalue")?, Some(expected));
    assert_eq!(copied.comparer(), KeyComparer::OrdinalIgnoreCase);
    assert_eq!(copied.len(), bag.len());
    Ok(())
}

#[test]
fn test_copy_preserves_nested_entries() -> Result<(), PropertyError> {
    let mut data = TestData::new();
    let mut bag = PropertyBag::new();
    data.initialize(&mut bag)?;

    let mut copied = PropertyBag::copy_with_comparer(&bag, KeyComparer::OrdinalIgnoreCase);
    data.validate(&mut copied)?;
    Ok(())
}

#[test]
fn test_set_property() -> Result<(), PropertyError> {
    let descriptor = PropertyDescriptor::new("feature", "name", "defaultValue".to_string());
    let mut bag = PropertyBag::new();

    bag.set_property(&descriptor, "value".to_string())?;
    assert_eq!(bag.get_property(&descriptor)?, "value");

    bag.set_property(&descriptor, "defaultValue".to_string())?;
    assert_eq!(bag.get_property(&descriptor)?, "defaultValue");
    assert!(bag.is_empty());
    Ok(())
}

#[test]
fn test_set_null_string_property_resets() -> Result<(), PropertyError> {
    let descriptor = PropertyDescriptor::new("feature", "name", Some("defaultValue".to_string()));
    let mut bag = PropertyBag::new();

    bag.set_property(&descriptor, Some("value".to_string()))?;
    assert_eq!(bag.get_property(&descriptor)?.as_deref(), Some("value"));
    assert_eq!(bag.len(), 1);

    bag.set_property(&descriptor, None)?;
    assert_eq!(bag.get_property(&descriptor)?.as_deref(), Some("defaultValue"));
    assert_eq!(bag.len(), 0);

    let mut bag = PropertyBag::new();
    assert_eq!(bag.get_property(&STRING_OPTION)?, None);
    bag.set_property(&STRING_OPTION, Some(String::new()))?;
    assert_eq!(bag.get("TestFeature.StringOption").as_deref(), Some(""));
    Ok(())
}

#[test]
fn test_set_to_default_removes_entry() -> Result<(), PropertyError> {
    let mut bag = PropertyBag::new();
    bag.set("Other.Key", Some("kept"));
    let before = bag.len();

    bag.set_property(&STRING_SET_OPTION, StringSet::from_iter(["x"]))?;
    assert_eq!(bag.len(), before + 1);

    // same elements, other order: still the default
    bag.set_property(&STRING_SET_OPTION, StringSet::from_iter(["two", "one"]))?;
    assert_eq!(bag.len(), before);
    assert_eq!(bag.get(&STRING_SET_OPTION.key()), None);
    Ok(())
}

#[test]
fn test_remove_from_typed_property_bag() -> Result<(), PropertyError> {
    let mut typed = TypedPropertyBag::<PropertyBag>::new();
    let mut nested = typed.get_property(&PROPERTY_BAG_OPTION)?;
    assert_eq!(typed.len(), 0);

    nested.set_property(&BOOLEAN_OPTION, true)?;
    typed.set_property(&PROPERTY_BAG_OPTION, nested)?;
    assert_eq!(typed.len(), 1);

    typed.set_property(&PROPERTY_BAG_OPTION, PropertyBag::new())?;
    assert_eq!(typed.len(), 0);
    Ok(())
}

#[test]
fn test_set_null_key() -> Result<(), PropertyError> {
    let mut bag = PropertyBag::new();
    bag.set("test", None);

    assert_eq!(bag.try_get_property::<String>("test")?, None);
    assert_eq!(bag.try_get_property::<Option<String>>("test")?, None);
    Ok(())
}

#[test]
fn test_unsupported_type_conversion() {
    let mut bag = PropertyBag::new();
    bag.set("test", None);
    bag.set("test", Some("ThisStringCannotBeConvertedToAPropertyBag"));

    let result = bag.try_get_property::<PropertyBag>("test");
    assert!(matches!(result, Err(PropertyError::Unsupported { .. })));

    // absent is not an error
    assert!(matches!(bag.try_get_property::<PropertyBag>("absent"), Ok(None)));
}

#[test]
fn test_nested_bag_read_as_scalar_is_unsupported() -> Result<(), PropertyError> {
    let mut data = TestData::new();
    let mut bag = PropertyBag::new();
    data.initialize(&mut bag)?;

    let err = bag
        .try_get_property::<f64>(&PROPERTY_BAG_OPTION.key())
        .unwrap_err();
    assert!(matches!(err, PropertyError::Unsupported { .. }));

    // the raw indexer renders the nested bag as an inline table
    let text = bag.get(&PROPERTY_BAG_OPTION.key()).unwrap();
    assert!(text.starts_with('{'));
    let parsed: PropertyBag = sovran_propbag::string_to_value(&text)?;
    assert_eq!(parsed, data.property_bag_value);
    Ok(())
}

#[test]
fn test_conversion_error_leaves_state_unchanged() {
    let mut bag = PropertyBag::new();
    bag.set(&DOUBLE_OPTION.key(), Some("not a number"));

    let err = bag.get_property(&DOUBLE_OPTION).unwrap_err();
    assert!(matches!(err, PropertyError::Format { .. }));
    assert_eq!(bag.len(), 1);
    assert_eq!(bag.get(&DOUBLE_OPTION.key()).as_deref(), Some("not a number"));
}

static NAME_FACTORY_CALLS: AtomicUsize = AtomicUsize::new(0);

fn counted_names() -> StringSet {
    NAME_FACTORY_CALLS.fetch_add(1, Ordering::SeqCst);
    StringSet::from_iter(["default"])
}

static NAMES_OPTION: PropertyDescriptor<StringSet> =
    PropertyDescriptor::with_factory(TEST_FEATURE, "Names", counted_names);

#[test]
fn test_composite_defaults_are_not_shared() -> Result<(), PropertyError> {
    let before = NAME_FACTORY_CALLS.load(Ordering::SeqCst);
    let mut first = PropertyBag::new();
    let mut second = PropertyBag::new();

    let mut names = first.get_property(&NAMES_OPTION)?;
    names.insert("mutated");
    assert_eq!(first.get_property(&NAMES_OPTION)?, StringSet::from_iter(["default"]));
    assert_eq!(second.get_property(&NAMES_OPTION)?, StringSet::from_iter(["default"]));

    // one materialization per bag
    assert_eq!(NAME_FACTORY_CALLS.load(Ordering::SeqCst) - before, 2);
    Ok(())
}

#[test]
fn test_with_property_mut_edits_in_place() -> Result<(), PropertyError> {
    let mut bag = PropertyBag::new();

    bag.with_property_mut(&TYPED_PROPERTY_BAG_OPTION, |typed| {
        typed.set_property(&TEST_ENUM_OPTION_THREE, TestEnum::ValueOne)
    })??;
    assert_eq!(bag.len(), 1);

    let mut typed = bag.get_property(&TYPED_PROPERTY_BAG_OPTION)?;
    assert_eq!(typed.get_property(&TEST_ENUM_OPTION_THREE)?, TestEnum::ValueOne);

    bag.with_property_mut(&TYPED_PROPERTY_BAG_OPTION, |typed| {
        typed.reset_property(&TEST_ENUM_OPTION_THREE)
    })?;
    assert!(bag.is_empty());
    Ok(())
}

#[test]
fn test_raw_round_trip_through_nested_form() -> Result<(), PropertyError> {
    let mut inner = PropertyBag::new();
    inner.set_property(&BOOLEAN_OPTION, true)?;
    let mut bag = PropertyBag::new();
    bag.set_raw("Holder.Inner", Some(RawValue::Nested(inner.clone())));

    let typed: Option<TypedPropertyBag<bool>> = bag.try_get_property("Holder.Inner")?;
    let mut typed = typed.unwrap();
    assert!(typed.get_property(&BOOLEAN_OPTION)?);
    assert_eq!(typed.into_bag(), inner);
    Ok(())
}
