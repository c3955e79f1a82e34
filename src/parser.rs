use std::collections::HashMap;
use std::ffi::OsString;

use crate::argument::Argument;
use crate::error::{Error, ErrorKind, ErrorStatus};
use crate::runtime::Argv;
use crate::slot::Slot;
use crate::values::{ArgValue, Value};
use crate::Result;

/// The names an argument is declared with: a long name, optionally with a
/// single-character short alias.
///
/// ```
/// # use argslot::ArgParser;
/// let mut parser = ArgParser::new("app");
/// parser.add_flag("verbose", "Long name only")?;
/// parser.add_flag(('q', "quiet"), "With `-q` as alias")?;
/// # Ok::<(), argslot::Error>(())
/// ```
pub trait ArgNames {
    fn into_names(self) -> (Option<char>, String);
}

impl ArgNames for &str {
    fn into_names(self) -> (Option<char>, String) {
        (None, self.to_owned())
    }
}

impl ArgNames for String {
    fn into_names(self) -> (Option<char>, String) {
        (None, self)
    }
}

impl ArgNames for (char, &str) {
    fn into_names(self) -> (Option<char>, String) {
        (Some(self.0), self.1.to_owned())
    }
}

impl ArgNames for (char, String) {
    fn into_names(self) -> (Option<char>, String) {
        (Some(self.0), self.1)
    }
}

/// A registry of declared arguments and the parser over them.
///
/// Arguments are kept in declaration order, which is the order positional
/// arguments are filled in and the order of help lines. Values may be
/// written through to caller-owned storage living for `'a`.
#[derive(Debug, Default)]
pub struct ArgParser<'a> {
    name: String,
    help_keyword: Option<String>,
    pub(crate) slots: Vec<Slot<'a>>,
    /// Short alias to long name.
    aliases: HashMap<char, String>,
}

impl<'a> ArgParser<'a> {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), ..Self::default() }
    }

    /// The program name shown in help.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declare an argument holding values of type `T`.
    ///
    /// Fails if the name or short alias is already taken, or is not a valid
    /// name: empty, starting with `-`, or containing `=`.
    pub fn add_argument<T: ArgValue>(
        &mut self,
        names: impl ArgNames,
        description: impl Into<String>,
    ) -> Result<&mut Argument<'a, T>> {
        let (short, name) = names.into_names();
        self.check_names(short, &name)?;
        Ok(self.insert(short, name, description.into()))
    }

    pub fn add_string_argument(
        &mut self,
        names: impl ArgNames,
        description: impl Into<String>,
    ) -> Result<&mut Argument<'a, String>> {
        self.add_argument(names, description)
    }

    pub fn add_int_argument(
        &mut self,
        names: impl ArgNames,
        description: impl Into<String>,
    ) -> Result<&mut Argument<'a, i32>> {
        self.add_argument(names, description)
    }

    /// Declare a boolean flag. It is `false` unless given, and `--name` or
    /// `-n` alone sets it.
    pub fn add_flag(
        &mut self,
        names: impl ArgNames,
        description: impl Into<String>,
    ) -> Result<&mut Argument<'a, bool>> {
        self.add_argument(names, description)
    }

    /// Declare the help flag. When it is set, parsing always succeeds.
    ///
    /// Its description is the program description in the help text.
    pub fn add_help(
        &mut self,
        names: impl ArgNames,
        description: impl Into<String>,
    ) -> Result<&mut Argument<'a, bool>> {
        let (short, name) = names.into_names();
        self.check_names(short, &name)?;
        self.help_keyword = Some(name.clone());
        Ok(self.insert(short, name, description.into()))
    }

    fn check_names(&self, short: Option<char>, name: &str) -> Result<()> {
        if name.is_empty() || name.starts_with('-') || name.contains('=') {
            return Err(ErrorKind::InvalidName.with_input(name));
        }
        if self.find(name).is_some() {
            return Err(ErrorKind::DuplicateName.with_arg(name));
        }
        if let Some(ch) = short {
            if matches!(ch, '-' | '=') || ch.is_whitespace() {
                return Err(ErrorKind::InvalidName.with_arg(name).with_input(format!("-{ch}")));
            }
            if let Some(prev) = self.aliases.get(&ch) {
                tracing::debug!(short = %ch, taken_by = %prev, "short name collision");
                return Err(ErrorKind::DuplicateShortName.with_arg(name).with_input(format!("-{ch}")));
            }
        }
        Ok(())
    }

    fn insert<T: ArgValue>(
        &mut self,
        short: Option<char>,
        name: String,
        description: String,
    ) -> &mut Argument<'a, T> {
        if let Some(ch) = short {
            self.aliases.insert(ch, name.clone());
        }
        self.slots.push(T::into_slot(Argument::new(short, name, description)));
        match self.slots.last_mut().and_then(T::from_slot_mut) {
            Some(arg) => arg,
            None => unreachable!("a {} slot was just pushed", T::TYPE_NAME),
        }
    }

    /// Index of the argument with exactly this long name.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<usize> {
        self.slots.iter().position(|slot| slot.name() == name)
    }

    pub(crate) fn find_short(&self, short: char) -> Option<usize> {
        self.aliases.get(&short).and_then(|name| self.find(name))
    }

    /// Declared arguments in declaration order.
    pub fn slots(&self) -> impl ExactSizeIterator<Item = &Slot<'a>> {
        self.slots.iter()
    }

    /// Parse an argument vector whose first element is the program name.
    ///
    /// Returns `Ok(())` when every token was consumed and every argument is
    /// valid, or whenever help was requested. Otherwise returns the first
    /// failure. Values and error statuses are updated either way, and are
    /// not reset by a later parse.
    pub fn parse_from<I, T>(&mut self, args: I) -> Result<()>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        let args = args.into_iter().map(Into::into).collect::<Vec<OsString>>();
        if args.is_empty() {
            return Err(ErrorKind::MissingArg0.into());
        }
        let ret = self.parse_argv(Argv::new(&args));
        if ret.is_err() && self.help() {
            tracing::debug!("help requested, skipping validation");
            return Ok(());
        }
        ret
    }

    /// Parse the arguments of the current process.
    pub fn parse_env(&mut self) -> Result<()> {
        self.parse_from(std::env::args_os())
    }

    /// Whether the help flag is declared and set.
    #[must_use]
    pub fn help(&self) -> bool {
        self.help_keyword
            .as_deref()
            .and_then(|name| self.get::<bool>(name, 0).ok())
            .unwrap_or(false)
    }

    #[cfg_attr(not(feature = "help"), allow(dead_code))]
    pub(crate) fn help_slot(&self) -> Option<&Slot<'a>> {
        let name = self.help_keyword.as_deref()?;
        self.slot(name).ok()
    }

    pub fn slot(&self, name: &str) -> Result<&Slot<'a>> {
        match self.find(name) {
            Some(idx) => Ok(&self.slots[idx]),
            None => Err(ErrorKind::NoSuchArgument.with_arg(name)),
        }
    }

    fn slot_mut(&mut self, name: &str) -> Result<&mut Slot<'a>> {
        match self.find(name) {
            Some(idx) => Ok(&mut self.slots[idx]),
            None => Err(ErrorKind::NoSuchArgument.with_arg(name)),
        }
    }

    /// The typed argument named `name`.
    pub fn argument<T: ArgValue>(&self, name: &str) -> Result<&Argument<'a, T>> {
        let slot = self.slot(name)?;
        T::from_slot(slot).ok_or_else(|| wrong_type(name, slot))
    }

    /// The typed argument named `name`, for configuration after declaration.
    pub fn argument_mut<T: ArgValue>(&mut self, name: &str) -> Result<&mut Argument<'a, T>> {
        let slot = self.slot_mut(name)?;
        let actual = slot.value_type();
        match T::from_slot_mut(slot) {
            Some(arg) => Ok(arg),
            None => Err(ErrorKind::WrongType.with_arg(name).with_input(actual)),
        }
    }

    /// The value at `index` of argument `name`.
    ///
    /// Fails with [`ErrorKind::NoSuchArgument`] for an undeclared name and
    /// [`ErrorKind::WrongType`] if the argument holds another type.
    pub fn get<T: ArgValue>(&self, name: &str, index: usize) -> Result<T> {
        self.argument::<T>(name)?
            .value(index)
            .cloned()
            .ok_or_else(|| ErrorKind::IndexOutOfRange.with_arg(name).with_input(index.to_string()))
    }

    /// All values of argument `name`.
    pub fn values<T: ArgValue>(&self, name: &str) -> Result<&[T]> {
        Ok(self.argument::<T>(name)?.values())
    }

    pub fn get_value(&self, name: &str, index: usize) -> Result<Value> {
        self.slot(name)?
            .value(index)
            .ok_or_else(|| ErrorKind::IndexOutOfRange.with_arg(name).with_input(index.to_string()))
    }

    pub fn get_string_value(&self, name: &str) -> Result<String> {
        self.get(name, 0)
    }

    pub fn get_int_value(&self, name: &str) -> Result<i32> {
        self.get(name, 0)
    }

    pub fn get_flag(&self, name: &str) -> Result<bool> {
        self.get(name, 0)
    }

    /// The error recorded on argument `name` by the last parse, if any.
    pub fn error_status(&self, name: &str) -> Result<Option<ErrorStatus>> {
        Ok(self.slot(name)?.metadata().error_status)
    }
}

fn wrong_type(name: &str, slot: &Slot<'_>) -> Error {
    ErrorKind::WrongType.with_arg(name).with_input(slot.value_type())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registration_rejects_collisions() {
        let mut p = ArgParser::new("app");
        p.add_string_argument(('o', "output"), "").unwrap();

        let err = p.add_int_argument("output", "").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DuplicateName);

        let err = p.add_flag(('o', "overwrite"), "").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DuplicateShortName);
        assert_eq!(err.input(), Some("-o"));
        // A rejected declaration leaves nothing behind.
        assert_eq!(p.find("overwrite"), None);
        assert_eq!(p.find_short('o'), Some(0));

        for bad in ["", "-x", "a=b"] {
            assert_eq!(p.add_flag(bad, "").unwrap_err().kind(), ErrorKind::InvalidName);
        }
        assert_eq!(p.add_flag(('=', "eq"), "").unwrap_err().kind(), ErrorKind::InvalidName);
    }

    #[test]
    fn lookup_is_exact() {
        let mut p = ArgParser::new("app");
        p.add_flag("verbose", "").unwrap();
        assert_eq!(p.find("verbose"), Some(0));
        assert_eq!(p.find("verb"), None);
        assert_eq!(p.find("Verbose"), None);
    }

    #[test]
    fn typed_lookup() {
        let mut p = ArgParser::new("app");
        p.add_int_argument("count", "").unwrap().default_value(3);

        assert_eq!(p.get::<i32>("count", 0).unwrap(), 3);
        assert_eq!(p.get_value("count", 0).unwrap(), Value::Int(3));

        let err = p.get_string_value("count").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::WrongType);
        assert_eq!(err.input(), Some("int"));
        assert_eq!(p.argument_mut::<bool>("count").unwrap_err().kind(), ErrorKind::WrongType);

        assert_eq!(p.get_int_value("missing").unwrap_err().kind(), ErrorKind::NoSuchArgument);
        assert_eq!(p.get::<i32>("count", 1).unwrap_err().kind(), ErrorKind::IndexOutOfRange);
    }

    #[test]
    fn help_flag() {
        let mut p = ArgParser::new("app");
        assert!(!p.help());
        p.add_help(('h', "help"), "Does things.").unwrap();
        assert!(!p.help());
        assert_eq!(p.help_slot().map(Slot::name), Some("help"));
    }
}
