#![allow(dead_code)]

use sovran_propbag::{
    property_enum, PropertyBag, PropertyDescriptor, Result, StringSet, TypedPropertyBag,
};

pub const TEST_FEATURE: &str = "TestFeature";

property_enum! {
    pub enum TestEnum {
        ValueOne = 1,
        ValueTwo,
        ValueThree,
    }
}

pub type TestEnumPropertyBag = TypedPropertyBag<TestEnum>;

fn default_string_set() -> StringSet {
    StringSet::from_iter(["one", "two"])
}

pub static BOOLEAN_OPTION: PropertyDescriptor<bool> =
    PropertyDescriptor::new(TEST_FEATURE, "BooleanOption", false);

pub static DOUBLE_OPTION: PropertyDescriptor<f64> =
    PropertyDescriptor::new(TEST_FEATURE, "DoubleOption", 4.7);

pub static PROPERTY_BAG_OPTION: PropertyDescriptor<PropertyBag> =
    PropertyDescriptor::with_factory(TEST_FEATURE, "PropertyBagOption", PropertyBag::new);

pub static TEST_ENUM_OPTION_TWO: PropertyDescriptor<TestEnum> =
    PropertyDescriptor::new(TEST_FEATURE, "TestEnumOptionTwo", TestEnum::ValueTwo);

pub static TEST_ENUM_OPTION_THREE: PropertyDescriptor<TestEnum> =
    PropertyDescriptor::new(TEST_FEATURE, "TestEnumOptionThree", TestEnum::ValueThree);

pub static STRING_SET_OPTION: PropertyDescriptor<StringSet> =
    PropertyDescriptor::with_factory(TEST_FEATURE, "StringSetOption", default_string_set);

pub static STRING_OPTION: PropertyDescriptor<Option<String>> =
    PropertyDescriptor::new(TEST_FEATURE, "StringOption", None);

pub static TYPED_PROPERTY_BAG_OPTION: PropertyDescriptor<TestEnumPropertyBag> =
    PropertyDescriptor::with_factory(TEST_FEATURE, "TypedPropertyBagOption", TestEnumPropertyBag::new);

/// Values written into a bag by `initialize` and checked by `validate`
pub struct TestData {
    pub boolean_value: bool,
    pub double_value: f64,
    pub test_enum_value: TestEnum,
    pub string_set_value: StringSet,

    pub embedded_boolean_value: bool,
    pub embedded_double_value: f64,
    pub embedded_test_enum_value: TestEnum,
    pub embedded_string_set_value: StringSet,

    pub property_bag_value: PropertyBag,
    pub typed_property_bag_value: TestEnumPropertyBag,
}

impl TestData {
    pub fn new() -> Self {
        Self {
            boolean_value: true,
            double_value: f64::MAX,
            test_enum_value: TestEnum::ValueTwo,
            string_set_value: StringSet::from_iter(["v1", "v2"]),

            embedded_boolean_value: false,
            embedded_double_value: f64::MIN,
            embedded_test_enum_value: TestEnum::ValueTwo,
            embedded_string_set_value: StringSet::from_iter(["v3", "v4"]),

            property_bag_value: PropertyBag::new(),
            typed_property_bag_value: TestEnumPropertyBag::new(),
        }
    }

    pub fn initialize(&mut self, bag: &mut PropertyBag) -> Result<()> {
        bag.set_property(&DOUBLE_OPTION, self.double_value)?;
        bag.set_property(&BOOLEAN_OPTION, self.boolean_value)?;
        bag.set_property(&TEST_ENUM_OPTION_THREE, self.test_enum_value)?;
        bag.set_property(&STRING_SET_OPTION, self.string_set_value.clone())?;

        let mut embedded = PropertyBag::new();
        embedded.set_property(&DOUBLE_OPTION, self.embedded_double_value)?;
        embedded.set_property(&BOOLEAN_OPTION, self.embedded_boolean_value)?;
        embedded.set_property(&TEST_ENUM_OPTION_THREE, self.embedded_test_enum_value)?;
        embedded.set_property(&STRING_SET_OPTION, self.embedded_string_set_value.clone())?;
        self.property_bag_value = embedded.clone();
        bag.set_property(&PROPERTY_BAG_OPTION, embedded)?;

        let mut typed = bag.get_property(&TYPED_PROPERTY_BAG_OPTION)?;
        typed.set_property(&TEST_ENUM_OPTION_THREE, self.embedded_test_enum_value)?;
        self.typed_property_bag_value = typed.clone();
        bag.set_property(&TYPED_PROPERTY_BAG_OPTION, typed)?;

        Ok(())
    }

    pub fn validate(&self, bag: &mut PropertyBag) -> Result<()> {
        assert_eq!(bag.len(), 6);
        assert_eq!(bag.get_property(&DOUBLE_OPTION)?, self.double_value);
        assert_eq!(bag.get_property(&BOOLEAN_OPTION)?, self.boolean_value);
        assert_eq!(bag.get_property(&TEST_ENUM_OPTION_THREE)?, self.test_enum_value);
        assert_eq!(bag.get_property(&STRING_SET_OPTION)?, self.string_set_value);

        let mut embedded = bag.get_property(&PROPERTY_BAG_OPTION)?;
        assert_eq!(embedded.get_property(&DOUBLE_OPTION)?, self.embedded_double_value);
        assert_eq!(embedded.get_property(&BOOLEAN_OPTION)?, self.embedded_boolean_value);
        assert_eq!(
            embedded.get_property(&TEST_ENUM_OPTION_THREE)?,
            self.embedded_test_enum_value
        );
        assert_eq!(
            embedded.get_property(&STRING_SET_OPTION)?,
            self.embedded_string_set_value
        );
        assert_eq!(embedded, self.property_bag_value);

        let typed = bag.get_property(&TYPED_PROPERTY_BAG_OPTION)?;
        assert_eq!(typed, self.typed_property_bag_value);
        assert_eq!(typed.len(), 1);

        Ok(())
    }
}
