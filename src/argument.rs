use std::ffi::OsStr;
use std::mem;

use crate::error::ErrorStatus;
use crate::runtime::{Consumed, Cursor};
use crate::values::ArgValue;

/// Declared properties of an argument, plus its status after a parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgumentMetadata {
    /// The unique long name, matched by `--name`.
    pub name: String,
    pub short_name: Option<char>,
    pub description: String,
    pub has_default: bool,
    /// Minimum number of parsed values. An argument left at its default
    /// always satisfies it.
    pub minimum_args: usize,
    /// The values live in caller-owned storage.
    pub is_stored_outside: bool,
    pub is_positional: bool,
    pub is_multi_value: bool,
    /// The value type is `bool`. A flag that is not multi-valued takes no value token.
    pub is_flag: bool,
    pub error_status: Option<ErrorStatus>,
}

/// Where a value lives: owned by the argument or borrowed from the caller.
#[derive(Debug)]
enum Place<'a, T> {
    Owned(T),
    Bound(&'a mut T),
}

impl<T> Place<'_, T> {
    fn get(&self) -> &T {
        match self {
            Place::Owned(v) => v,
            Place::Bound(v) => v,
        }
    }

    fn get_mut(&mut self) -> &mut T {
        match self {
            Place::Owned(v) => v,
            Place::Bound(v) => v,
        }
    }
}

#[derive(Debug)]
enum Storage<'a, T> {
    Single(Place<'a, T>),
    Multi(Place<'a, Vec<T>>),
}

/// A declared argument holding values of type `T`.
///
/// Returned by the `add_*` methods of [`ArgParser`](crate::ArgParser) for
/// builder-style configuration before parsing:
///
/// ```
/// # use argslot::ArgParser;
/// let mut parser = ArgParser::new("app");
/// parser.add_int_argument(('n', "nums"), "Numbers to sum")?.multi_value(2).positional();
/// # Ok::<(), argslot::Error>(())
/// ```
#[derive(Debug)]
pub struct Argument<'a, T> {
    meta: ArgumentMetadata,
    storage: Storage<'a, T>,
    default: Option<T>,
    /// Successfully parsed values. A default counts as one.
    parsed: usize,
    /// Command line occurrences that produced a value.
    occurrences: usize,
    /// A default is seeded into multi-value storage and not yet replaced.
    seeded: bool,
}

impl<'a, T: ArgValue> Argument<'a, T> {
    pub(crate) fn new(short_name: Option<char>, name: String, description: String) -> Self {
        Self {
            meta: ArgumentMetadata {
                name,
                short_name,
                description,
                has_default: false,
                minimum_args: 1,
                is_stored_outside: false,
                is_positional: false,
                is_multi_value: false,
                is_flag: T::IS_FLAG,
                error_status: None,
            },
            storage: Storage::Single(Place::Owned(T::default())),
            default: None,
            parsed: 0,
            occurrences: 0,
            seeded: false,
        }
    }

    #[must_use]
    pub fn metadata(&self) -> &ArgumentMetadata {
        &self.meta
    }

    /// How many times this argument received a value from the command line.
    #[must_use]
    pub fn occurrences(&self) -> usize {
        self.occurrences
    }

    /// All stored values. A single-valued argument always has exactly one.
    #[must_use]
    pub fn values(&self) -> &[T] {
        match &self.storage {
            Storage::Single(place) => std::slice::from_ref(place.get()),
            Storage::Multi(place) => place.get(),
        }
    }

    #[must_use]
    pub fn value(&self, index: usize) -> Option<&T> {
        self.values().get(index)
    }

    /// Set the value used when the argument is absent from the command line.
    ///
    /// An argument left at its default passes validation whatever its
    /// minimum arity. On a multi-valued argument
    /// the default is replaced, not appended to, by the first value parsed.
    pub fn default_value(&mut self, value: T) -> &mut Self {
        self.meta.has_default = true;
        self.parsed = 1;
        self.default = Some(value.clone());
        match &mut self.storage {
            Storage::Single(place) => *place.get_mut() = value,
            Storage::Multi(place) => {
                let values = place.get_mut();
                values.clear();
                values.push(value);
                self.seeded = true;
            }
        }
        self
    }

    /// Write the value through to caller-owned storage.
    ///
    /// A default set earlier is copied into `place`. Ignored on a
    /// multi-valued argument, use [`Self::store_values`] there.
    pub fn store_value(&mut self, place: &'a mut T) -> &mut Self {
        match &mut self.storage {
            Storage::Single(old) => {
                if let Some(default) = &self.default {
                    place.clone_from(default);
                }
                *old = Place::Bound(place);
                self.meta.is_stored_outside = true;
            }
            Storage::Multi(_) => {
                tracing::warn!(
                    arg = %self.meta.name,
                    "ignoring single-value storage bound to a multi-value argument",
                );
            }
        }
        self
    }

    /// Append values to caller-owned storage. Implies [`Self::multi_value`].
    pub fn store_values(&mut self, place: &'a mut Vec<T>) -> &mut Self {
        self.multi_value(1);
        if let Storage::Multi(old) = &mut self.storage {
            if self.seeded {
                place.clear();
                place.extend_from_slice(old.get());
            }
            *old = Place::Bound(place);
        }
        self.meta.is_stored_outside = true;
        self
    }

    /// Accept a sequence of values, requiring at least `minimum_args` of them.
    ///
    /// Idempotent once the argument is multi-valued. Otherwise the single
    /// value storage is dropped, including any caller-owned binding, and a
    /// default carries over as the first value.
    pub fn multi_value(&mut self, minimum_args: usize) -> &mut Self {
        if self.meta.is_multi_value {
            return self;
        }
        self.meta.is_multi_value = true;
        self.meta.minimum_args = minimum_args.max(1);
        self.meta.is_stored_outside = false;
        let values = self.default.iter().cloned().collect();
        self.seeded = self.default.is_some();
        self.storage = Storage::Multi(Place::Owned(values));
        self
    }

    /// Allow bare tokens to be assigned to this argument.
    pub fn positional(&mut self) -> &mut Self {
        self.meta.is_positional = true;
        self
    }

    /// Parse one token into a value, marking the argument as failed if it is invalid.
    pub fn parse_single_value(&mut self, token: &OsStr) -> Option<T> {
        let value = token.to_str().and_then(T::parse_token);
        if value.is_none() {
            self.fail(ErrorStatus::ParsingError);
        }
        value
    }

    /// Check the argument after a parse.
    ///
    /// Fails if an error was recorded, or if fewer values than the minimum
    /// were parsed and the argument is not left at its default.
    pub fn is_correct(&mut self) -> bool {
        // An absent switch is a valid `false`. A multi-valued flag needs values.
        let switch = T::IS_FLAG && !self.meta.is_multi_value;
        let defaulted = (self.meta.has_default || switch) && self.occurrences == 0;
        if self.parsed < self.meta.minimum_args && !defaulted {
            self.fail(ErrorStatus::TooFewArguments);
        }
        self.meta.error_status.is_none()
    }

    /// Consume `first` as the value at `index`, then for a multi-valued
    /// argument keep consuming the following tokens until one fails to
    /// parse or the run ends.
    ///
    /// Values parsed before a failure stay stored and their positions are
    /// returned.
    pub(crate) fn consume_from<'s>(
        &mut self,
        first: &'s OsStr,
        index: usize,
        cursor: &Cursor<'s, '_>,
    ) -> Consumed<'s> {
        let Some(value) = self.parse_single_value(first) else {
            return Consumed::rejected(index, first);
        };
        self.occurrences += 1;

        if let Storage::Single(place) = &mut self.storage {
            *place.get_mut() = value;
            self.parsed = 1;
            return Consumed::single(index);
        }

        self.push(value);
        let mut consumed = Consumed::single(index);
        let mut k = index + 1;
        while let Some(token) = cursor.continuation(k) {
            match self.parse_single_value(token) {
                Some(value) => {
                    self.push(value);
                    consumed.positions.push(k);
                    k += 1;
                }
                None => {
                    consumed.rejected = Some((k, token));
                    break;
                }
            }
        }
        consumed
    }

    fn push(&mut self, value: T) {
        if let Storage::Multi(place) = &mut self.storage {
            let values = place.get_mut();
            if mem::take(&mut self.seeded) {
                values.clear();
                self.parsed = 0;
            }
            values.push(value);
            self.parsed += 1;
        }
    }

    pub(crate) fn fail(&mut self, status: ErrorStatus) {
        // The first recorded error sticks for the rest of the parse.
        if self.meta.error_status.is_none() {
            self.meta.error_status = Some(status);
        }
    }

    pub(crate) fn wants_positional(&self) -> bool {
        self.meta.is_positional
            && self.meta.error_status.is_none()
            && (self.meta.is_multi_value || self.occurrences == 0)
    }

    pub(crate) fn default_string(&self) -> Option<String> {
        self.default.as_ref().map(ToString::to_string)
    }
}

impl Argument<'_, bool> {
    /// Switch on a flag given without a value.
    pub(crate) fn raise(&mut self) {
        debug_assert!(!self.meta.is_multi_value, "a multi-valued flag takes value tokens");
        self.occurrences += 1;
        if let Storage::Single(place) = &mut self.storage {
            *place.get_mut() = true;
            self.parsed = 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::ffi::OsString;

    use super::*;
    use crate::runtime::Argv;

    fn argv(args: &[&str]) -> Vec<OsString> {
        args.iter().map(OsString::from).collect()
    }

    fn string_arg<'a>() -> Argument<'a, String> {
        Argument::new(None, "name".into(), String::new())
    }

    #[test]
    fn single_value_consumes_one_token() {
        let args = argv(&["prog", "a", "b"]);
        let argv = Argv::new(&args);
        let used = [true, false, false];
        let cursor = Cursor::new(argv, &used);

        let mut arg = string_arg();
        let consumed = arg.consume_from("a".as_ref(), 1, &cursor);
        assert_eq!(consumed.positions, [1]);
        assert!(consumed.rejected.is_none());
        assert_eq!(arg.values(), ["a"]);
        assert!(arg.is_correct());
    }

    #[test]
    fn multi_value_keeps_prefix_on_failure() {
        let args = argv(&["prog", "--nums", "1", "2", "x", "3"]);
        let argv = Argv::new(&args);
        let used = [true, true, false, false, false, false];
        let cursor = Cursor::new(argv, &used);

        let mut arg = Argument::<i32>::new(None, "nums".into(), String::new());
        arg.multi_value(1);
        let consumed = arg.consume_from("1".as_ref(), 2, &cursor);
        assert_eq!(consumed.positions, [2, 3]);
        assert_eq!(consumed.rejected.map(|(k, _)| k), Some(4));
        assert_eq!(arg.values(), [1, 2]);
        assert_eq!(arg.metadata().error_status, Some(ErrorStatus::ParsingError));
        assert!(!arg.is_correct());
    }

    #[test]
    fn multi_value_stops_at_option_and_used_token() {
        let args = argv(&["prog", "1", "2", "--flag", "3"]);
        let argv = Argv::new(&args);
        let used = [true, false, false, false, false];
        let cursor = Cursor::new(argv, &used);

        let mut arg = Argument::<i32>::new(None, "nums".into(), String::new());
        arg.multi_value(2);
        assert_eq!(arg.consume_from("1".as_ref(), 1, &cursor).positions, [1, 2]);

        let used = [true, false, true, false, false];
        let cursor = Cursor::new(argv, &used);
        let mut arg = Argument::<i32>::new(None, "nums".into(), String::new());
        arg.multi_value(2);
        assert_eq!(arg.consume_from("1".as_ref(), 1, &cursor).positions, [1]);
        assert!(!arg.is_correct());
        assert_eq!(arg.metadata().error_status, Some(ErrorStatus::TooFewArguments));
    }

    #[test]
    fn rejected_first_value_consumes_nothing() {
        let args = argv(&["prog", "abc"]);
        let used = [true, false];
        let cursor = Cursor::new(Argv::new(&args), &used);

        let mut arg = Argument::<i32>::new(None, "count".into(), String::new());
        let consumed = arg.consume_from("abc".as_ref(), 1, &cursor);
        assert!(consumed.positions.is_empty());
        assert_eq!(consumed.rejected.map(|(k, _)| k), Some(1));
        assert_eq!(arg.occurrences(), 0);
        assert!(!arg.is_correct());
        // A more specific error is not overwritten by the arity check.
        assert_eq!(arg.metadata().error_status, Some(ErrorStatus::ParsingError));
    }

    #[test]
    fn default_satisfies_arity() {
        let mut arg = string_arg();
        assert!(!arg.is_correct());

        let mut arg = string_arg();
        arg.default_value("x".into());
        assert!(arg.is_correct());
        assert_eq!(arg.value(0).map(String::as_str), Some("x"));
        assert_eq!(arg.default_string().as_deref(), Some("x"));
    }

    #[test]
    fn multi_value_default_is_replaced() {
        let args = argv(&["prog", "7", "8"]);
        let used = [true, false, false];
        let cursor = Cursor::new(Argv::new(&args), &used);

        let mut arg = Argument::<i32>::new(None, "nums".into(), String::new());
        arg.default_value(5).multi_value(2);
        assert_eq!(arg.values(), [5]);
        arg.consume_from("7".as_ref(), 1, &cursor);
        assert_eq!(arg.values(), [7, 8]);
        assert!(arg.is_correct());
    }

    #[test]
    fn flags_start_valid() {
        let mut flag = Argument::<bool>::new(Some('f'), "flag".into(), String::new());
        assert!(flag.metadata().is_flag);
        assert!(flag.is_correct());
        assert_eq!(flag.values(), [false]);
        flag.raise();
        assert_eq!(flag.values(), [true]);
        assert_eq!(flag.occurrences(), 1);

        let mut bits = Argument::<bool>::new(None, "bits".into(), String::new());
        bits.multi_value(2);
        assert!(!bits.is_correct());
        assert_eq!(bits.metadata().error_status, Some(ErrorStatus::TooFewArguments));
    }

    #[test]
    fn bound_storage() {
        let mut out = String::from("untouched");
        let mut outs = Vec::new();
        let mut ignored = 0;
        {
            let mut arg = string_arg();
            arg.default_value("dflt".into()).store_value(&mut out);
            assert!(arg.metadata().is_stored_outside);

            let mut multi = Argument::<i32>::new(None, "nums".into(), String::new());
            multi.store_values(&mut outs).store_value(&mut ignored);
            assert!(multi.metadata().is_multi_value);
            multi.push(1);
            multi.push(2);
            assert_eq!(multi.values(), [1, 2]);
        }
        assert_eq!(out, "dflt");
        assert_eq!(outs, [1, 2]);
        assert_eq!(ignored, 0);
    }
}
