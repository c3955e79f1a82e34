//! The token scan: option resolution, value consumption and positional backfill.
use std::ffi::{OsStr, OsString};

use os_str_bytes::OsStrBytesExt;
use ref_cast::RefCast;

use crate::error::{Error, ErrorKind, ErrorStatus};
use crate::parser::ArgParser;
use crate::Result;

/// The raw argument vector. Index 0 is the program name.
#[derive(Debug, RefCast)]
#[repr(transparent)]
pub(crate) struct Argv([OsString]);

impl Argv {
    pub(crate) fn new(args: &[OsString]) -> &Self {
        Self::ref_cast(args)
    }

    pub(crate) fn len(&self) -> usize {
        self.0.len()
    }

    pub(crate) fn get(&self, i: usize) -> Option<&OsStr> {
        self.0.get(i).map(OsString::as_os_str)
    }
}

#[derive(Debug, PartialEq)]
enum Token<'a> {
    /// "--"
    DashDash,
    /// Long name and an inlined value (excluding `=`).
    ///
    /// - "--long" => ("long", None)
    /// - "--long=value" => ("long", Some("value"))
    Long(&'a OsStr, Option<&'a OsStr>),
    /// Short names and an inlined value.
    ///
    /// - "-abc" => ("abc", None)
    /// - "-abc=value" => ("abc", Some("value"))
    Short(&'a OsStr, Option<&'a OsStr>),
    /// Anything else, including a lone "-".
    Bare,
}

fn classify(raw: &OsStr) -> Token<'_> {
    fn split_value(s: &OsStr) -> (&OsStr, Option<&OsStr>) {
        match s.split_once('=') {
            Some((name, value)) => (name, Some(value)),
            None => (s, None),
        }
    }

    if raw == "--" {
        return Token::DashDash;
    }
    if let Some(rest) = raw.strip_prefix("--") {
        let (name, value) = split_value(rest);
        return Token::Long(name, value);
    }
    match raw.strip_prefix('-') {
        Some(rest) if !rest.is_empty() => {
            let (names, value) = split_value(rest);
            Token::Short(names, value)
        }
        _ => Token::Bare,
    }
}

/// A read-only view for consuming a run of values.
pub(crate) struct Cursor<'s, 'u> {
    argv: &'s Argv,
    used: &'u [bool],
    /// Index of the `--` separator, or the length of argv.
    options_end: usize,
}

impl<'s, 'u> Cursor<'s, 'u> {
    #[cfg(test)]
    pub(crate) fn new(argv: &'s Argv, used: &'u [bool]) -> Self {
        Self { argv, used, options_end: argv.len() }
    }

    /// The token at `k`, if a multi-value run may continue into it.
    ///
    /// A run stops at the end of input, at a token already claimed, and at
    /// anything that looks like an option before `--`.
    pub(crate) fn continuation(&self, k: usize) -> Option<&'s OsStr> {
        let token = self.argv.get(k)?;
        if self.used[k] || (k < self.options_end && token.starts_with('-')) {
            return None;
        }
        Some(token)
    }
}

/// Token positions consumed by one value run.
#[derive(Debug)]
pub(crate) struct Consumed<'s> {
    pub(crate) positions: Vec<usize>,
    /// The token that stopped the run by failing to parse.
    pub(crate) rejected: Option<(usize, &'s OsStr)>,
}

impl<'s> Consumed<'s> {
    pub(crate) fn single(index: usize) -> Self {
        Self { positions: vec![index], rejected: None }
    }

    pub(crate) fn rejected(index: usize, token: &'s OsStr) -> Self {
        Self { positions: Vec::new(), rejected: Some((index, token)) }
    }
}

struct Positions {
    used: Vec<bool>,
    options_end: usize,
}

impl Positions {
    fn new(len: usize) -> Self {
        let mut used = vec![false; len];
        // The program name is never matched.
        if let Some(arg0) = used.first_mut() {
            *arg0 = true;
        }
        Self { used, options_end: len }
    }

    fn is_used(&self, i: usize) -> bool {
        self.used.get(i).copied().unwrap_or(true)
    }

    /// Claim the option token itself.
    fn claim(&mut self, i: usize) {
        self.used[i] = true;
    }

    /// Runs never cross a used position, see [`Cursor::continuation`].
    fn mark(&mut self, positions: &[usize]) {
        for &pos in positions {
            self.used[pos] = true;
        }
    }

    fn cursor<'s>(&self, argv: &'s Argv) -> Cursor<'s, '_> {
        Cursor { argv, used: &self.used, options_end: self.options_end }
    }

    fn unused(&self) -> impl Iterator<Item = usize> + '_ {
        self.used.iter().enumerate().filter(|(_, used)| !**used).map(|(i, _)| i)
    }
}

/// Non-fatal failures collected during one parse, in discovery order.
#[derive(Default)]
struct Failures(Vec<Error>);

impl Failures {
    fn push(&mut self, err: Error) {
        tracing::debug!(error = %err, "argument rejected");
        self.0.push(err);
    }

    fn finish(self) -> Result<()> {
        match self.0.into_iter().next() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

fn decode(raw: &OsStr, i: usize) -> Result<&str> {
    raw.to_str().ok_or_else(|| Error::from(ErrorKind::InvalidUtf8).with_os_input(raw).at(i))
}

impl ArgParser<'_> {
    /// The outlined main logic of parser.
    ///
    /// Fatal errors return early. Everything else is recorded on the
    /// argument, scanning continues, and the first failure is returned.
    pub(crate) fn parse_argv(&mut self, argv: &Argv) -> Result<()> {
        let mut pos = Positions::new(argv.len());
        let mut failures = Failures::default();

        for i in 1..argv.len() {
            if pos.is_used(i) {
                continue;
            }
            let Some(raw) = argv.get(i) else { break };
            let token = classify(raw);
            tracing::trace!(position = i, ?token, "classified");
            match token {
                Token::DashDash => {
                    pos.claim(i);
                    pos.options_end = i;
                    break;
                }
                Token::Long(name, value) => {
                    self.feed_long(argv, &mut pos, &mut failures, i, name, value)?;
                }
                Token::Short(names, value) => {
                    self.feed_short(argv, &mut pos, &mut failures, i, names, value)?;
                }
                Token::Bare => {}
            }
        }

        self.backfill(argv, &mut pos, &mut failures);

        for k in pos.unused() {
            let err = Error::from(ErrorKind::UnconsumedToken).at(k);
            failures.push(match argv.get(k) {
                Some(raw) => err.with_os_input(raw),
                None => err,
            });
        }
        for slot in &mut self.slots {
            if !slot.is_correct() {
                let status = slot.metadata().error_status.unwrap_or(ErrorStatus::ParsingError);
                // Value failures were reported when they happened.
                if status == ErrorStatus::TooFewArguments {
                    failures.push(ErrorKind::TooFewArguments.with_arg(slot.name()));
                }
            }
        }
        failures.finish()
    }

    fn feed_long<'s>(
        &mut self,
        argv: &'s Argv,
        pos: &mut Positions,
        failures: &mut Failures,
        i: usize,
        name: &'s OsStr,
        value: Option<&'s OsStr>,
    ) -> Result<()> {
        let name = decode(name, i)?;
        if value.is_some_and(OsStr::is_empty) {
            return Err(ErrorKind::EmptyInlineValue.with_input(format!("--{name}=")).at(i));
        }
        let idx = self
            .find(name)
            .ok_or_else(|| ErrorKind::UnknownArgument.with_input(format!("--{name}")).at(i))?;

        match value {
            Some(value) => {
                self.feed(idx, value, i, argv, pos, failures);
                pos.claim(i);
            }
            None if self.slots[idx].is_switch() => {
                self.slots[idx].raise();
                pos.claim(i);
            }
            None => {
                pos.claim(i);
                self.feed_next(idx, i, argv, pos, failures);
            }
        }
        Ok(())
    }

    /// Every name in a cluster but the last must be a switch. The last one
    /// takes the inlined value, or the next token if it needs a value.
    fn feed_short<'s>(
        &mut self,
        argv: &'s Argv,
        pos: &mut Positions,
        failures: &mut Failures,
        i: usize,
        names: &'s OsStr,
        value: Option<&'s OsStr>,
    ) -> Result<()> {
        let names = decode(names, i)?;
        if value.is_some_and(OsStr::is_empty) {
            return Err(ErrorKind::EmptyInlineValue.with_input(format!("-{names}=")).at(i));
        }
        if names.is_empty() {
            return Err(ErrorKind::UnknownArgument.with_input("-").at(i));
        }

        let mut chars = names.chars().peekable();
        while let Some(ch) = chars.next() {
            let is_last = chars.peek().is_none();
            let idx = self
                .find_short(ch)
                .ok_or_else(|| ErrorKind::UnknownArgument.with_input(format!("-{ch}")).at(i))?;
            match value {
                Some(value) if is_last => self.feed(idx, value, i, argv, pos, failures),
                _ if self.slots[idx].is_switch() => self.slots[idx].raise(),
                _ if !is_last => {
                    return Err(ErrorKind::ShortClusterValue
                        .with_arg(self.slots[idx].name())
                        .with_input(format!("-{names}"))
                        .at(i));
                }
                _ => self.feed_next(idx, i, argv, pos, failures),
            }
        }
        pos.claim(i);
        Ok(())
    }

    /// Feed the token after the option at `i` as its value.
    fn feed_next(
        &mut self,
        idx: usize,
        i: usize,
        argv: &Argv,
        pos: &mut Positions,
        failures: &mut Failures,
    ) {
        match argv.get(i + 1).filter(|_| !pos.is_used(i + 1)) {
            Some(value) => self.feed(idx, value, i + 1, argv, pos, failures),
            None => {
                let slot = &mut self.slots[idx];
                slot.fail(ErrorStatus::ParsingError);
                failures.push(ErrorKind::MissingValue.with_arg(slot.name()).at(i));
            }
        }
    }

    fn feed<'s>(
        &mut self,
        idx: usize,
        value: &'s OsStr,
        at: usize,
        argv: &'s Argv,
        pos: &mut Positions,
        failures: &mut Failures,
    ) {
        let slot = &mut self.slots[idx];
        let consumed = slot.consume_from(value, at, &pos.cursor(argv));
        pos.mark(&consumed.positions);
        if let Some((k, token)) = consumed.rejected {
            failures.push(
                ErrorKind::ParsingError.with_arg(slot.name()).with_os_input(token).at(k),
            );
        }
    }

    /// Assign each unused token, in order, to the first positional argument
    /// still wanting a value.
    fn backfill(&mut self, argv: &Argv, pos: &mut Positions, failures: &mut Failures) {
        for k in 1..argv.len() {
            if pos.is_used(k) {
                continue;
            }
            let Some(idx) = self.slots.iter().position(|slot| slot.wants_positional()) else {
                break;
            };
            let Some(token) = argv.get(k) else { break };
            self.feed(idx, token, k, argv, pos, failures);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_tokens() {
        let os = |s: &'static str| OsStr::new(s);
        assert_eq!(classify(os("--")), Token::DashDash);
        assert_eq!(classify(os("--name")), Token::Long(os("name"), None));
        assert_eq!(classify(os("--name=a=b")), Token::Long(os("name"), Some(os("a=b"))));
        assert_eq!(classify(os("--name=")), Token::Long(os("name"), Some(os(""))));
        assert_eq!(classify(os("-abc")), Token::Short(os("abc"), None));
        assert_eq!(classify(os("-o=out")), Token::Short(os("o"), Some(os("out"))));
        assert_eq!(classify(os("-")), Token::Bare);
        assert_eq!(classify(os("")), Token::Bare);
        assert_eq!(classify(os("file.txt")), Token::Bare);
    }

    #[test]
    fn positions() {
        let mut pos = Positions::new(4);
        assert!(pos.is_used(0));
        assert!(!pos.is_used(1));
        assert!(pos.is_used(4));
        pos.mark(&[1, 2]);
        assert_eq!(pos.unused().collect::<Vec<_>>(), [3]);
    }

    #[test]
    fn continuation_respects_separator() {
        let args: Vec<OsString> = ["prog", "--", "-x", "y"].map(OsString::from).into();
        let argv = Argv::new(&args);
        let used = [true, true, false, false];
        let mut cursor = Cursor::new(argv, &used);
        assert_eq!(cursor.continuation(2), None);
        cursor.options_end = 1;
        assert_eq!(cursor.continuation(2), Some(OsStr::new("-x")));
        assert_eq!(cursor.continuation(3), Some(OsStr::new("y")));
        assert_eq!(cursor.continuation(4), None);
    }
}
