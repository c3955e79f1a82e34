use std::fmt;

use crate::argument::Argument;
use crate::slot::Slot;

mod sealed {
    pub trait Sealed {}
}

/// Value types an argument slot can hold.
///
/// This trait is sealed. The supported types are `String`, `i32` and `bool`,
/// matching the three kinds of arguments the parser can declare.
#[diagnostic::on_unimplemented(
    message = "`{Self}` cannot be stored in an argslot argument",
    label = "unsupported value type",
    note = "supported value types are `String`, `i32` and `bool`"
)]
pub trait ArgValue: sealed::Sealed + Clone + Default + fmt::Display + Sized + 'static {
    /// The type label shown in help, e.g. `--count=<int>`. Empty for flags.
    const TYPE_NAME: &'static str;

    /// Whether this is the boolean type, which may take no value token.
    const IS_FLAG: bool = false;

    /// Parse a whole token. `None` if it is not a valid value.
    fn parse_token(s: &str) -> Option<Self>;

    fn into_value(self) -> Value;

    #[doc(hidden)]
    fn into_slot(arg: Argument<'_, Self>) -> Slot<'_>;

    #[doc(hidden)]
    fn from_slot<'s, 'a>(slot: &'s Slot<'a>) -> Option<&'s Argument<'a, Self>>;

    #[doc(hidden)]
    fn from_slot_mut<'s, 'a>(slot: &'s mut Slot<'a>) -> Option<&'s mut Argument<'a, Self>>;
}

macro_rules! impl_slot_variant {
    ($variant:ident) => {
        fn into_slot(arg: Argument<'_, Self>) -> Slot<'_> {
            Slot::$variant(arg)
        }

        fn from_slot<'s, 'a>(slot: &'s Slot<'a>) -> Option<&'s Argument<'a, Self>> {
            match slot {
                Slot::$variant(arg) => Some(arg),
                _ => None,
            }
        }

        fn from_slot_mut<'s, 'a>(slot: &'s mut Slot<'a>) -> Option<&'s mut Argument<'a, Self>> {
            match slot {
                Slot::$variant(arg) => Some(arg),
                _ => None,
            }
        }
    };
}

impl sealed::Sealed for String {}
impl ArgValue for String {
    const TYPE_NAME: &'static str = "string";

    fn parse_token(s: &str) -> Option<Self> {
        Some(s.to_owned())
    }

    fn into_value(self) -> Value {
        Value::String(self)
    }

    impl_slot_variant!(Str);
}

impl sealed::Sealed for i32 {}
impl ArgValue for i32 {
    const TYPE_NAME: &'static str = "int";

    fn parse_token(s: &str) -> Option<Self> {
        // `from_str` accepts an explicit plus sign, which we do not.
        if s.starts_with('+') {
            return None;
        }
        s.parse().ok()
    }

    fn into_value(self) -> Value {
        Value::Int(self)
    }

    impl_slot_variant!(Int);
}

impl sealed::Sealed for bool {}
impl ArgValue for bool {
    const TYPE_NAME: &'static str = "";
    const IS_FLAG: bool = true;

    fn parse_token(s: &str) -> Option<Self> {
        match s {
            "1" | "true" => Some(true),
            "0" | "false" => Some(false),
            _ => None,
        }
    }

    fn into_value(self) -> Value {
        Value::Bool(self)
    }

    impl_slot_variant!(Flag);
}

/// A dynamically typed argument value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    String(String),
    Int(i32),
    Bool(bool),
}

impl Value {
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::String(_) => "string",
            Value::Int(_) => "int",
            Value::Bool(_) => "bool",
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_int(&self) -> Option<i32> {
        match *self {
            Value::Int(v) => Some(v),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match *self {
            Value::Bool(v) => Some(v),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => f.write_str(s),
            Value::Int(v) => fmt::Display::fmt(v, f),
            Value::Bool(v) => fmt::Display::fmt(v, f),
        }
    }
}

#[test]
fn parse_tokens() {
    assert_eq!(String::parse_token("-x y"), Some("-x y".to_owned()));
    assert_eq!(String::parse_token(""), Some(String::new()));

    assert_eq!(i32::parse_token("42"), Some(42));
    assert_eq!(i32::parse_token("-7"), Some(-7));
    assert_eq!(i32::parse_token("+7"), None);
    assert_eq!(i32::parse_token("12abc"), None);
    assert_eq!(i32::parse_token(" 1"), None);
    assert_eq!(i32::parse_token("99999999999"), None);
    assert_eq!(i32::parse_token(""), None);

    assert_eq!(bool::parse_token("1"), Some(true));
    assert_eq!(bool::parse_token("true"), Some(true));
    assert_eq!(bool::parse_token("0"), Some(false));
    assert_eq!(bool::parse_token("false"), Some(false));
    assert_eq!(bool::parse_token("maybe"), None);
    assert_eq!(bool::parse_token("TRUE"), None);
}

#[test]
fn value_accessors() {
    let v = 3i32.into_value();
    assert_eq!(v, Value::Int(3));
    assert_eq!(v.as_int(), Some(3));
    assert_eq!(v.as_str(), None);
    assert_eq!(v.type_name(), "int");
    assert_eq!(Value::Bool(true).to_string(), "true");
    assert_eq!("a".to_owned().into_value().as_str(), Some("a"));
}
